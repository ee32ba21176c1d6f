//! In-memory implementations of the four transport traits, plus raw-byte
//! fixture builders for the codec layer. Used by this crate's own test
//! suite and by the demo binary; a hardware deployment would swap in real
//! I2C/GPIO/UART backends behind the same traits and never touch this
//! module.

use crate::constants::*;
use crate::ids::{ChannelMask, Function, Instance, OpSelect, WindowFlags};
use crate::transport::{CfgBusError, CfgBusTransport, ConsoleIo, CpldTransport, ResetLine};
use std::collections::VecDeque;

/// A configuration bus backed by a fixed table of card addresses to raw
/// descriptor bytes. Any address not present in the table answers
/// [`CfgBusError::NoDevice`].
#[derive(Default)]
pub struct SimBus {
    cards: std::collections::HashMap<u8, Vec<u8>>,
    fault_at: std::collections::HashSet<u8>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, card_address: u8, bytes: Vec<u8>) {
        self.cards.insert(card_address, bytes);
    }

    pub fn fault(&mut self, card_address: u8) {
        self.fault_at.insert(card_address);
    }
}

impl CfgBusTransport for SimBus {
    fn read(&mut self, card_address: u8, out: &mut [u8]) -> Result<(), CfgBusError> {
        if self.fault_at.contains(&card_address) {
            return Err(CfgBusError::Fault);
        }
        match self.cards.get(&card_address) {
            Some(bytes) if bytes.len() == out.len() => {
                out.copy_from_slice(bytes);
                Ok(())
            }
            Some(_) => Err(CfgBusError::Fault),
            None => Err(CfgBusError::NoDevice),
        }
    }
}

/// Records every CPLD programming write, in order, for assertions.
#[derive(Default)]
pub struct SimCpld {
    pub dec_writes: Vec<(u8, u8)>,
    pub irq_writes: Vec<(u8, u8)>,
}

impl CpldTransport for SimCpld {
    fn dec_write(&mut self, addr: u8, byte: u8) {
        self.dec_writes.push((addr, byte));
    }

    fn irq_write(&mut self, addr: u8, byte: u8) {
        self.irq_writes.push((addr, byte));
    }
}

/// Tracks reset-line state transitions for assertions.
#[derive(Default)]
pub struct SimReset {
    pub initialized: bool,
    pub asserted: bool,
    pub released: bool,
}

impl ResetLine for SimReset {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn assert(&mut self) {
        self.asserted = true;
        self.released = false;
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// A line-queue console: `write_line` appends to an output log, `read_line`
/// drains a pre-loaded input queue.
#[derive(Default)]
pub struct SimConsole {
    pub input: VecDeque<String>,
    pub output: Vec<String>,
}

impl SimConsole {
    pub fn with_input<I: IntoIterator<Item = &'static str>>(lines: I) -> Self {
        SimConsole {
            input: lines.into_iter().map(String::from).collect(),
            output: Vec::new(),
        }
    }
}

impl ConsoleIo for SimConsole {
    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

/// A complete simulated backplane: bus, CPLD, and reset line bundled
/// together for orchestrator tests, plus named scenario constructors
/// mirroring the spec's testable-property scenarios.
pub struct SimBackplane {
    pub bus: SimBus,
    pub cpld: SimCpld,
    pub reset: SimReset,
}

impl SimBackplane {
    /// An empty backplane with no cards installed; callers populate `bus`
    /// directly for scenarios the named constructors below don't cover.
    pub fn empty() -> Self {
        SimBackplane {
            bus: SimBus::new(),
            cpld: SimCpld::default(),
            reset: SimReset::default(),
        }
    }

    fn base() -> Self {
        Self::empty()
    }

    /// CPU + matching bank + one tile satisfying the CPU's sole required
    /// window and its one declared interrupt channel.
    pub fn happy_path() -> Self {
        let mut sim = Self::base();
        sim.bus.install(CPU_ADDR, fixture::cpu_bytes_single_window().to_vec());
        sim.bus.install(BANK_ADDR, fixture::bank_bytes(16).to_vec());
        sim.bus.install(
            TILE_BASE_ADDR,
            fixture::peripheral_bytes(&[(Function(0x20), Instance(0), 16, ChannelMask::INT_CH0, "disk0")])
                .to_vec(),
        );
        sim
    }

    /// CPU descriptor declares a required window with no device present on
    /// any tile to satisfy it.
    pub fn missing_required_device() -> Self {
        let mut sim = Self::base();
        sim.bus.install(CPU_ADDR, fixture::cpu_bytes_single_window().to_vec());
        sim.bus.install(BANK_ADDR, fixture::bank_bytes(16).to_vec());
        sim
    }

    /// Bank descriptor's data-bus width disagrees with the CPU's.
    pub fn bank_width_mismatch() -> Self {
        let mut sim = Self::base();
        sim.bus.install(CPU_ADDR, fixture::cpu_bytes_single_window().to_vec());
        sim.bus.install(BANK_ADDR, fixture::bank_bytes(8).to_vec());
        sim
    }

    /// A tile declares an interrupt channel the CPU's route table never
    /// mentions.
    pub fn missing_route() -> Self {
        let mut sim = Self::base();
        sim.bus.install(CPU_ADDR, fixture::cpu_bytes_no_windows().to_vec());
        sim.bus.install(BANK_ADDR, fixture::bank_bytes(16).to_vec());
        sim.bus.install(
            TILE_BASE_ADDR,
            fixture::peripheral_bytes(&[(Function(0x20), Instance(0), 16, ChannelMask::INT_CH1, "disk0")])
                .to_vec(),
        );
        sim
    }
}

/// Raw-byte descriptor builders shared by the codec layer's unit tests and
/// the scenario constructors above.
pub mod fixture {
    use super::*;

    fn magic_and_type(buf: &mut [u8], type_tag: u8) {
        buf[0..4].copy_from_slice(&MAGIC);
        buf[5] = type_tag;
    }

    fn write_window_entry(
        buf: &mut [u8],
        function: Function,
        instance: Instance,
        base: u32,
        mask: u32,
        opsel: OpSelect,
        flags: WindowFlags,
    ) {
        buf[0] = function.0;
        buf[1] = instance.0;
        buf[2..6].copy_from_slice(&base.to_le_bytes());
        buf[6..10].copy_from_slice(&mask.to_le_bytes());
        buf[10] = opsel.to_byte();
        buf[11] = flags.bits();
    }

    fn write_route_entry(
        buf: &mut [u8],
        function: Function,
        instance: Instance,
        channel: ChannelMask,
        dest_pin: u8,
    ) {
        buf[0] = function.0;
        buf[1] = instance.0;
        buf[2] = channel.bits();
        buf[3] = dest_pin;
        buf[4] = 0; // edge-triggered
        buf[5] = 0; // no stretch
    }

    /// A CPU descriptor with one required window (function 0x20, instance 0,
    /// base 0xE000 mask 0xFFFFF000) and one matching INT_CH0 route to pin 2.
    pub fn cpu_bytes_single_window() -> [u8; CPU_DESC_LEN] {
        let mut buf = cpu_bytes_no_windows();
        write_window_entry(
            &mut buf[64..64 + 14],
            Function(0x20),
            Instance(0),
            0x0000_E000,
            0xFFFF_F000,
            OpSelect::Any,
            WindowFlags::REQUIRED,
        );
        write_route_entry(
            &mut buf[288..288 + 8],
            Function(0x20),
            Instance(0),
            ChannelMask::INT_CH0,
            0x02,
        );
        buf
    }

    /// A bare CPU descriptor (16-bit buses, no windows, no routes).
    pub fn cpu_bytes_no_windows() -> [u8; CPU_DESC_LEN] {
        let mut buf = [0u8; CPU_DESC_LEN];
        magic_and_type(&mut buf, TYPE_CPU);
        buf[61] = 16; // data_bus_width
        buf[62] = 16; // addr_bus_width
        buf
    }

    /// A bank descriptor with the given data-bus width and plausible
    /// address widths.
    pub fn bank_bytes(data_bus_width: u8) -> [u8; BANK_DESC_LEN] {
        let mut buf = [0u8; BANK_DESC_LEN];
        magic_and_type(&mut buf, TYPE_BANK);
        buf[4] = BANK_SPEC_VERSION;
        buf[49] = 16; // ram_addr_width
        buf[50] = 16; // rom_addr_width
        buf[51] = data_bus_width;
        buf
    }

    /// A peripheral descriptor whose instance table holds `insts`, in order.
    pub fn peripheral_bytes(
        insts: &[(Function, Instance, u8, ChannelMask, &str)],
    ) -> [u8; DEV_DESC_LEN] {
        let mut buf = [0u8; DEV_DESC_LEN];
        magic_and_type(&mut buf, TYPE_PERIPHERAL);
        for (i, (function, instance, dbw, channel, name)) in insts.iter().enumerate() {
            let off = 16 + i * 31;
            let rec = &mut buf[off..off + 31];
            rec[0] = function.0;
            rec[1] = instance.0;
            rec[2] = *dbw;
            rec[3] = 16; // addr_bus_width
            rec[4] = 0; // int_ack_mode
            rec[5] = channel.bits();
            rec[6] = 1; // hw_revision
            rec[7] = 1; // fw_revision
            let name_bytes = name.as_bytes();
            let len = name_bytes.len().min(16);
            rec[8..8 + len].copy_from_slice(&name_bytes[..len]);
        }
        buf
    }
}
