//! Binds each CPU decode window to the device instance that occupies it.
//!
//! For every non-empty window entry, the first peripheral instance (searched
//! tile-by-tile, instance-by-instance, in descriptor order) whose
//! (function, instance) matches the window's target is bound to it. A window
//! with no match is silently dropped unless its `Required` flag is set, in
//! which case enumeration fails outright. Bound windows are finally sorted
//! stable-descending by mask popcount, so the CPLD decoder programs its most
//! specific (narrowest) windows first.

use crate::constants::MAX_WINDOW_BINDINGS;
use crate::descriptors::{CpuDescriptor, PeripheralDescriptor};
use crate::ids::{Function, Instance, OpSelect};
use crate::reason::EnumReason;

/// One fully-resolved decode window, ready for CPLD programming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeBinding {
    pub slot: usize,
    pub function: Function,
    pub instance: Instance,
    pub base: u32,
    pub mask: u32,
    pub opsel: OpSelect,
    pub data_bus_width: u8,
}

/// Binds every window in `cpu.window` against the tiles in `tiles` (indexed
/// by physical slot; `None` for an empty slot). Returns bindings in
/// descriptor order on success; the caller sorts separately so width
/// checking happens before sort order is decided.
pub fn bind_windows(
    cpu: &CpuDescriptor,
    tiles: &[Option<PeripheralDescriptor>],
) -> Result<Vec<DecodeBinding>, EnumReason> {
    let mut out = Vec::new();
    for (_, w) in cpu.non_empty_windows() {
        let found = find_instance(tiles, w.target());
        match found {
            Some((slot, inst)) => {
                if inst.data_bus_width > cpu.data_bus_width {
                    return Err(EnumReason::DevWidthIncompat);
                }
                out.push(DecodeBinding {
                    slot,
                    function: w.function,
                    instance: w.instance,
                    base: w.base,
                    mask: w.mask,
                    opsel: w.opsel,
                    data_bus_width: inst.data_bus_width,
                });
            }
            None if w.required() => return Err(EnumReason::RequiredWindowMissing),
            None => {}
        }
    }
    Ok(out)
}

fn find_instance(
    tiles: &[Option<PeripheralDescriptor>],
    target: (Function, Instance),
) -> Option<(usize, crate::descriptors::InstanceRecord)> {
    for (slot, tile) in tiles.iter().enumerate() {
        let Some(dev) = tile else { continue };
        for inst in dev.non_empty_instances() {
            if inst.function == target.0 && inst.instance == target.1 {
                return Some((slot, *inst));
            }
        }
    }
    None
}

/// Sorts bindings descending by mask popcount (most specific decode first),
/// stably so ties keep descriptor order, and truncates to the snapshot's
/// capacity.
pub fn sort_and_clamp(mut bindings: Vec<DecodeBinding>) -> Vec<DecodeBinding> {
    bindings.sort_by_key(|b| core::cmp::Reverse(b.mask.count_ones()));
    bindings.truncate(MAX_WINDOW_BINDINGS);
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{InstanceRecord, WindowEntry};
    use crate::ids::{ChannelMask, Name16, WindowFlags};

    fn tile_with(function: Function, instance: Instance, dbw: u8) -> PeripheralDescriptor {
        let mut dev = PeripheralDescriptor::default();
        dev.inst[0] = InstanceRecord {
            function,
            instance,
            data_bus_width: dbw,
            addr_bus_width: 16,
            int_ack_mode: 0,
            int_channel: ChannelMask::empty(),
            hw_revision: 0,
            fw_revision: 0,
            name: Name16::default(),
        };
        dev
    }

    #[test]
    fn required_window_missing_fails_hard() {
        let mut cpu = CpuDescriptor::default();
        cpu.window[0] = WindowEntry {
            function: Function(0x20),
            instance: Instance(0),
            base: 0x1000,
            mask: 0xF000,
            opsel: OpSelect::Any,
            flags: WindowFlags::REQUIRED,
        };
        let tiles: Vec<Option<PeripheralDescriptor>> = vec![None; 5];
        assert_eq!(
            bind_windows(&cpu, &tiles),
            Err(EnumReason::RequiredWindowMissing)
        );
    }

    #[test]
    fn optional_window_missing_is_dropped_silently() {
        let mut cpu = CpuDescriptor::default();
        cpu.window[0] = WindowEntry {
            function: Function(0x20),
            instance: Instance(0),
            base: 0x1000,
            mask: 0xF000,
            opsel: OpSelect::Any,
            flags: WindowFlags::empty(),
        };
        let tiles: Vec<Option<PeripheralDescriptor>> = vec![None; 5];
        assert_eq!(bind_windows(&cpu, &tiles), Ok(vec![]));
    }

    #[test]
    fn device_wider_than_cpu_bus_is_rejected() {
        let mut cpu = CpuDescriptor {
            data_bus_width: 8,
            ..Default::default()
        };
        cpu.window[0] = WindowEntry {
            function: Function(0x20),
            instance: Instance(0),
            base: 0x1000,
            mask: 0xF000,
            opsel: OpSelect::Any,
            flags: WindowFlags::empty(),
        };
        let mut tiles: Vec<Option<PeripheralDescriptor>> = vec![None; 5];
        tiles[0] = Some(tile_with(Function(0x20), Instance(0), 16));
        assert_eq!(bind_windows(&cpu, &tiles), Err(EnumReason::DevWidthIncompat));
    }

    #[test]
    fn sort_and_clamp_orders_narrowest_mask_first() {
        let wide = DecodeBinding {
            slot: 0,
            function: Function(0x20),
            instance: Instance(0),
            base: 0,
            mask: 0xF000_0000,
            opsel: OpSelect::Any,
            data_bus_width: 8,
        };
        let narrow = DecodeBinding {
            mask: 0xFFFF_F000,
            ..wide
        };
        let sorted = sort_and_clamp(vec![wide, narrow]);
        assert_eq!(sorted[0], narrow);
        assert_eq!(sorted[1], wide);
    }
}
