//! The boot-time enumeration pipeline: reads the CPU and bank descriptors,
//! probes every tile slot, validates and maps windows and interrupt routes,
//! programs the CPLD, and publishes the outcome.
//!
//! Mirrors the original firmware's `main()` boot sequence step for step.
//! Any failing step short-circuits straight to `set_failure` and the
//! `done:` cleanup, which always releases reset regardless of outcome.

use crate::codec;
use crate::constants::MAX_TILES;
use crate::descriptors::PeripheralDescriptor;
use crate::ids::ChannelMask;
use crate::irq_map;
use crate::reason::EnumReason;
use crate::snapshot::SnapshotStore;
use crate::transport::{CfgBusError, CfgBusTransport, CpldTransport, ResetLine};
use crate::validator;
use crate::window_map;

/// Runs one full enumeration pass against the given transports, publishing
/// the result to `snapshot` before returning. Returns the final reason for
/// convenience; the snapshot is the authoritative record.
pub fn run_enumeration<B, C, R>(
    bus: &mut B,
    cpld: &mut C,
    reset: &mut R,
    snapshot: &SnapshotStore,
) -> EnumReason
where
    B: CfgBusTransport,
    C: CpldTransport,
    R: ResetLine,
{
    snapshot.reset();
    reset.init();
    reset.assert();

    let reason = (|| -> Result<(), EnumReason> {
        let cpu = read_cpu_step(bus)?;
        validator::cpu_ok(&cpu)?;

        let bank = read_bank_step(bus)?;
        validator::bank_ok_vs_cpu(&bank, &cpu)?;

        let tiles = probe_tiles(bus, cpu.data_bus_width)?;

        validator::windows_unique(&cpu)?;
        let bindings = window_map::bind_windows(&cpu, &tiles)?;
        let bindings = window_map::sort_and_clamp(bindings);

        validator::routes_unique(&cpu)?;
        let declared = declared_channels(&tiles);
        let irqs = irq_map::bind_irqs(&cpu, &declared)?;
        let irqs = irq_map::sort_and_clamp(irqs);

        program_cpld(cpld, &bindings, &irqs);

        snapshot.publish(cpu, bank, tiles, bindings, irqs);
        Ok(())
    })();

    reset.release();

    match reason {
        Ok(()) => EnumReason::Ok,
        Err(r) => {
            log::error!("enumeration failed: {r}");
            snapshot.set_failure(r);
            r
        }
    }
}

fn read_cpu_step<B: CfgBusTransport>(
    bus: &mut B,
) -> Result<crate::descriptors::CpuDescriptor, EnumReason> {
    log::debug!("reading cpu descriptor");
    codec::read_cpu(bus).map_err(|e| codec_to_reason(e, EnumReason::CpuDescBad))
}

fn read_bank_step<B: CfgBusTransport>(
    bus: &mut B,
) -> Result<crate::descriptors::BankDescriptor, EnumReason> {
    log::debug!("reading bank descriptor");
    codec::read_bank(bus).map_err(|e| codec_to_reason(e, EnumReason::BankDescBad))
}

fn codec_to_reason(e: crate::codec::CodecError, bad: EnumReason) -> EnumReason {
    match e {
        crate::codec::CodecError::Bus(_) => EnumReason::I2cError,
        crate::codec::CodecError::BadDescriptor => bad,
    }
}

/// Probes every tile slot in order. A [`CfgBusError::NoDevice`] response
/// means the slot is empty and is not an error; any other transport fault
/// is reported as [`EnumReason::I2cError`]. Each accepted descriptor's
/// non-empty instances are checked against `cpu_data_bus_width` as soon as
/// they are read, so a device wider than the host bus fails enumeration at
/// probe time rather than surfacing later during window binding.
fn probe_tiles<B: CfgBusTransport>(
    bus: &mut B,
    cpu_data_bus_width: u8,
) -> Result<[Option<PeripheralDescriptor>; MAX_TILES], EnumReason> {
    let mut tiles: [Option<PeripheralDescriptor>; MAX_TILES] = Default::default();
    for (slot, tile) in tiles.iter_mut().enumerate() {
        log::debug!("probing tile slot {slot}");
        match codec::read_peripheral(bus, slot as u8) {
            Ok(dev) => {
                for inst in dev.non_empty_instances() {
                    if inst.data_bus_width > cpu_data_bus_width {
                        log::warn!("slot {slot} instance bus width exceeds host bus");
                        return Err(EnumReason::DevWidthIncompat);
                    }
                }
                *tile = Some(dev);
            }
            Err(crate::codec::CodecError::Bus(CfgBusError::NoDevice)) => {
                log::debug!("slot {slot} empty");
            }
            Err(crate::codec::CodecError::Bus(CfgBusError::Fault)) => {
                return Err(EnumReason::I2cError)
            }
            Err(crate::codec::CodecError::BadDescriptor) => {
                log::warn!("slot {slot} descriptor rejected");
                return Err(EnumReason::I2cError);
            }
        }
    }
    Ok(tiles)
}

/// Flattens each tile's instance records into the `(slot, function,
/// instance, channel-mask)` tuples the IRQ mapper consumes, in
/// slot-then-instance order.
fn declared_channels(
    tiles: &[Option<PeripheralDescriptor>],
) -> Vec<(usize, crate::ids::Function, crate::ids::Instance, ChannelMask)> {
    let mut out = Vec::new();
    for (slot, tile) in tiles.iter().enumerate() {
        let Some(tile) = tile else { continue };
        for inst in tile.non_empty_instances() {
            if !inst.int_channel.is_empty() {
                out.push((slot, inst.function, inst.instance, inst.int_channel));
            }
        }
    }
    out
}

/// Programs the CPLD's decoder and IRQ-router address spaces. Programming
/// index is the binding's position in the already-sorted array, not its
/// original descriptor-table index, matching the original firmware.
///
/// Decoder region layout (§6): base and mask each occupy four consecutive
/// little-endian bytes per window (`0x00+4w..0x03+4w`, `0x40+4w..0x43+4w`);
/// slot and op-select each occupy one byte per window at `0x80+w`/`0x90+w`.
/// IRQ-router layout: maskable channels are indexed by `slot*2+ch`; NMI
/// entries occupy one byte per slot starting at `2*NUM_SLOTS`.
fn program_cpld<C: CpldTransport>(
    cpld: &mut C,
    windows: &[window_map::DecodeBinding],
    irqs: &[irq_map::IrqBinding],
) {
    const DEC_BASE: u8 = 0x00;
    const DEC_MASK: u8 = 0x40;
    const DEC_SLOT: u8 = 0x80;
    const DEC_OP: u8 = 0x90;

    for (w, binding) in windows.iter().enumerate() {
        let w = w as u8;
        for (i, &byte) in binding.base.to_le_bytes().iter().enumerate() {
            cpld.dec_write(DEC_BASE + w * 4 + i as u8, byte);
        }
        for (i, &byte) in binding.mask.to_le_bytes().iter().enumerate() {
            cpld.dec_write(DEC_MASK + w * 4 + i as u8, byte);
        }
        cpld.dec_write(DEC_SLOT + w, binding.slot as u8);
        cpld.dec_write(DEC_OP + w, binding.opsel.to_cpld_op());
    }

    let num_slots = crate::constants::NUM_SLOTS as u8;
    for binding in irqs {
        let slot = binding.slot as u8;
        if binding.channel.contains(ChannelMask::NMI) {
            let idx = num_slots * 2 + slot;
            cpld.irq_write(idx, 0x80 | (binding.nmi_dest() & 0x0F));
        } else {
            let ch = if binding.channel.contains(ChannelMask::INT_CH1) {
                1u8
            } else {
                0u8
            };
            let idx = slot * 2 + ch;
            cpld.irq_write(idx, 0x80 | (binding.dest_pin & 0x0F));
        }
    }
}
