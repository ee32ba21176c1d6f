//! The operator's line-oriented debug console: `lstiles`, `showhost`,
//! `showbank`, `showerrors`, and `reset`.
//!
//! Output formats match the original firmware's monitor verbatim, since
//! they are the external vocabulary any host-side tooling parses.

use crate::snapshot::SnapshotStore;
use crate::transport::ConsoleIo;

/// Runs the console loop to completion (until `io.read_line()` returns
/// `None`). `reboot` is invoked once per `reset` command, after the reset
/// line has been cycled, so the caller can re-enter the enumeration
/// pipeline the way the original firmware's `reset` handler calls
/// `esp_restart()`. It takes no arguments because everything it needs
/// (the bus, the CPLD, the reset line, the snapshot store) is the caller's
/// to capture by reference.
pub fn run<IO>(io: &mut IO, snapshot: &SnapshotStore, mut reboot: impl FnMut())
where
    IO: ConsoleIo,
{
    while let Some(line) = io.read_line() {
        dispatch(line.trim(), io, snapshot, &mut reboot);
    }
}

fn dispatch<IO>(line: &str, io: &mut IO, snapshot: &SnapshotStore, reboot: &mut impl FnMut())
where
    IO: ConsoleIo,
{
    match line {
        "lstiles" => cmd_lstiles(io, snapshot),
        "showhost" => cmd_showhost(io, snapshot),
        "showbank" => cmd_showbank(io, snapshot),
        "showerrors" => cmd_showerrors(io, snapshot),
        "reset" => cmd_reset(io, reboot),
        "" => {}
        other => io.write_line(&format!("unknown command: {other}")),
    }
}

/// `tiles: count=<N>` followed by one line per non-empty peripheral
/// instance across every slot, in slot-then-instance order.
fn cmd_lstiles<IO: ConsoleIo>(io: &mut IO, snapshot: &SnapshotStore) {
    let snap = snapshot.read();
    let count: usize = snap
        .tiles
        .iter()
        .flatten()
        .map(|t| t.non_empty_instances().count())
        .sum();
    io.write_line(&format!("tiles: count={count}"));
    for (slot, tile) in snap.tiles.iter().enumerate() {
        let Some(dev) = tile else { continue };
        for inst in dev.non_empty_instances() {
            io.write_line(&format!(
                "slot={slot} func=0x{:02X} inst={} dbw={} abw={} int_mask=0x{:02X} name={:16}",
                inst.function.0,
                inst.instance.0,
                inst.data_bus_width,
                inst.addr_bus_width,
                inst.int_channel.bits(),
                inst.name,
            ));
        }
    }
}

/// `host: …` followed by one `win[<i>]:` line per non-empty CPU window and
/// one `irq[<i>]:` line per non-empty CPU route, both in raw descriptor
/// table order (index `<i>` is the table slot, not the post-mapping order).
fn cmd_showhost<IO: ConsoleIo>(io: &mut IO, snapshot: &SnapshotStore) {
    let snap = snapshot.read();
    let Some(cpu) = snap.cpu else {
        io.write_line("host: no cpu descriptor (enumeration did not succeed)");
        return;
    };
    io.write_line(&format!(
        "host: dbw={} abw={} int_ack_mode=0x{:02X} platform={} cpu_type=0x{:02X}",
        cpu.data_bus_width,
        cpu.addr_bus_width,
        cpu.int_ack_mode,
        cpu.platform_id_str(),
        cpu.cpu_type
    ));
    for (i, w) in cpu.non_empty_windows() {
        io.write_line(&format!(
            "win[{i}]: func=0x{:02X} inst={} iowin=0x{:08X} mask=0x{:08X} opsel=0x{:02X} flags=0x{:02X}",
            w.function.0,
            w.instance.0,
            w.base,
            w.mask,
            w.opsel.to_byte(),
            w.flags.bits(),
        ));
    }
    for (i, r) in cpu.non_empty_routes() {
        io.write_line(&format!(
            "irq[{i}]: func=0x{:02X} inst={} chan=0x{:02X} dest=0x{:02X} mode={} stretch={}",
            r.function.0,
            r.instance.0,
            r.channel.bits(),
            r.dest_pin,
            r.mode.to_byte(),
            r.stretch_us,
        ));
    }
}

fn cmd_showbank<IO: ConsoleIo>(io: &mut IO, snapshot: &SnapshotStore) {
    let snap = snapshot.read();
    match snap.bank {
        Some(bank) => io.write_line(&format!(
            "bank: vendor={} board={} rev=0x{:02X} ram_aw={} rom_aw={} dbw={}",
            bank.vendor_id_str(),
            bank.board_id_str(),
            bank.revision,
            bank.ram_addr_width,
            bank.rom_addr_width,
            bank.data_bus_width
        )),
        None => io.write_line("bank: no bank descriptor (enumeration did not succeed)"),
    }
}

/// `enum success=<0|1> reason=<token>` followed by one `winbind[<i>]:` line
/// per derived decode binding, in the already specificity-sorted emission
/// order (index `<i>` is the binding's position in that list).
fn cmd_showerrors<IO: ConsoleIo>(io: &mut IO, snapshot: &SnapshotStore) {
    let snap = snapshot.read();
    io.write_line(&format!(
        "enum success={} reason={}",
        snap.succeeded() as u8,
        snap.reason.token()
    ));
    for (i, binding) in snap.windows.iter().enumerate() {
        io.write_line(&format!(
            "winbind[{i}]: func=0x{:02X} inst={} slot={} mask_pop={} width_ok={}",
            binding.function.0,
            binding.instance.0,
            binding.slot,
            binding.mask.count_ones(),
            1,
        ));
    }
}

fn cmd_reset(io: &mut impl ConsoleIo, reboot: &mut impl FnMut()) {
    io.write_line("resetting...");
    reboot();
}
