//! Binds each declared device interrupt channel to a route entry in the
//! CPU's interrupt table.
//!
//! Unlike window binding, an unmatched channel is always a hard failure:
//! every channel a device instance declares (`INT_CH0`, `INT_CH1`, `NMI`, in
//! that order) must have a corresponding route, or enumeration fails with
//! [`EnumReason::RouteMissing`]. Bound routes are then sorted
//! stable-descending by channel popcount, mirroring the window mapper's
//! specificity ordering.

use crate::constants::MAX_IRQ_BINDINGS;
use crate::descriptors::CpuDescriptor;
use crate::ids::{ChannelMask, Function, Instance};
use crate::reason::EnumReason;

/// One fully-resolved interrupt route, ready for CPLD programming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqBinding {
    pub slot: usize,
    pub function: Function,
    pub instance: Instance,
    pub channel: ChannelMask,
    pub dest_pin: u8,
}

impl IrqBinding {
    /// Destination pin translated to the CPLD's NMI index space (0/1), for
    /// bindings whose channel is the NMI bit. Mirrors
    /// [`crate::descriptors::InterruptRouteEntry::nmi_dest`].
    pub fn nmi_dest(&self) -> u8 {
        if self.dest_pin >= crate::constants::NMI_DEST_BASE {
            self.dest_pin - crate::constants::NMI_DEST_BASE
        } else {
            self.dest_pin
        }
    }
}

/// For each `(slot, function, instance, channel)` a device declares (via
/// `declared`), finds the matching entry in `cpu.introute` and binds it.
/// `declared` is produced by the orchestrator from the per-tile instance
/// records that survived window binding; `slot` is the tile's physical
/// position, carried through so the CPLD router write can address its
/// per-slot entries.
pub fn bind_irqs(
    cpu: &CpuDescriptor,
    declared: &[(usize, Function, Instance, ChannelMask)],
) -> Result<Vec<IrqBinding>, EnumReason> {
    let mut out = Vec::new();
    for &(slot, function, instance, channels) in declared {
        for &bit in ChannelMask::DECLARABLE.iter() {
            if !channels.contains(bit) {
                continue;
            }
            match find_route(cpu, function, instance, bit) {
                // `route.channel` is the matched route's full channel mask,
                // not just the single declared bit `bit` matched against —
                // a route naming multiple channels must keep its full
                // popcount for the specificity sort below.
                Some(route) => out.push(IrqBinding {
                    slot,
                    function,
                    instance,
                    channel: route.channel,
                    dest_pin: route.dest_pin,
                }),
                None => return Err(EnumReason::RouteMissing),
            }
        }
    }
    Ok(out)
}

fn find_route(
    cpu: &CpuDescriptor,
    function: Function,
    instance: Instance,
    channel: ChannelMask,
) -> Option<crate::descriptors::InterruptRouteEntry> {
    cpu.non_empty_routes()
        .map(|(_, r)| *r)
        .find(|r| r.function == function && r.instance == instance && r.channel.contains(channel))
}

/// Sorts bindings descending by channel-bit popcount, stably, and truncates
/// to the snapshot's capacity.
pub fn sort_and_clamp(mut bindings: Vec<IrqBinding>) -> Vec<IrqBinding> {
    bindings.sort_by_key(|b| core::cmp::Reverse(b.channel.bits().count_ones()));
    bindings.truncate(MAX_IRQ_BINDINGS);
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::InterruptRouteEntry;

    #[test]
    fn missing_route_for_declared_channel_fails_hard() {
        let cpu = CpuDescriptor::default();
        let declared = vec![(0usize, Function(0x20), Instance(0), ChannelMask::INT_CH0)];
        assert_eq!(bind_irqs(&cpu, &declared), Err(EnumReason::RouteMissing));
    }

    #[test]
    fn matching_route_binds_dest_pin_and_slot() {
        let mut cpu = CpuDescriptor::default();
        cpu.introute[0] = InterruptRouteEntry {
            function: Function(0x20),
            instance: Instance(0),
            channel: ChannelMask::INT_CH0,
            dest_pin: 0x02,
            ..Default::default()
        };
        let declared = vec![(3usize, Function(0x20), Instance(0), ChannelMask::INT_CH0)];
        let bound = bind_irqs(&cpu, &declared).expect("route found");
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].dest_pin, 0x02);
        assert_eq!(bound[0].slot, 3);
    }

    #[test]
    fn matching_route_binding_carries_the_routes_full_channel_mask() {
        // The route names both maskable channels; the instance only
        // declares INT_CH0. The emitted binding must still carry the
        // route's full mask so its specificity (popcount) is correct,
        // not just the single bit that was matched against.
        let mut cpu = CpuDescriptor::default();
        cpu.introute[0] = InterruptRouteEntry {
            function: Function(0x20),
            instance: Instance(0),
            channel: ChannelMask::INT_CH0 | ChannelMask::INT_CH1,
            dest_pin: 0x03,
            ..Default::default()
        };
        let declared = vec![(0usize, Function(0x20), Instance(0), ChannelMask::INT_CH0)];
        let bound = bind_irqs(&cpu, &declared).expect("route found");
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].channel, ChannelMask::INT_CH0 | ChannelMask::INT_CH1);
        assert_eq!(bound[0].channel.bits().count_ones(), 2);
    }

    #[test]
    fn nmi_dest_maps_pins_0x10_and_0x11_down_to_0_and_1() {
        let binding = IrqBinding {
            slot: 0,
            function: Function(0x20),
            instance: Instance(0),
            channel: ChannelMask::NMI,
            dest_pin: 0x11,
        };
        assert_eq!(binding.nmi_dest(), 1);
    }

    #[test]
    fn sort_and_clamp_orders_nmi_plus_maskable_before_single_channel() {
        let single = IrqBinding {
            slot: 0,
            function: Function(0x20),
            instance: Instance(0),
            channel: ChannelMask::INT_CH0,
            dest_pin: 0x00,
        };
        let combo = IrqBinding {
            channel: ChannelMask::INT_CH0 | ChannelMask::INT_CH1,
            ..single
        };
        let sorted = sort_and_clamp(vec![single, combo]);
        assert_eq!(sorted[0], combo);
        assert_eq!(sorted[1], single);
    }

    #[test]
    fn bind_irqs_then_sort_orders_a_real_multi_channel_route_first() {
        // Two distinct devices: one declares a single channel bound to a
        // single-channel route, the other declares only NMI but is routed
        // through an entry whose own mask also covers INT_CH0 — a route
        // table is free to name more channels than any one device declares.
        let mut cpu = CpuDescriptor::default();
        cpu.introute[0] = InterruptRouteEntry {
            function: Function(0x20),
            instance: Instance(0),
            channel: ChannelMask::INT_CH0,
            dest_pin: 0x00,
            ..Default::default()
        };
        cpu.introute[1] = InterruptRouteEntry {
            function: Function(0x21),
            instance: Instance(0),
            channel: ChannelMask::INT_CH0 | ChannelMask::NMI,
            dest_pin: 0x10,
            ..Default::default()
        };
        let declared = vec![
            (0usize, Function(0x20), Instance(0), ChannelMask::INT_CH0),
            (1usize, Function(0x21), Instance(0), ChannelMask::NMI),
        ];
        let bound = bind_irqs(&cpu, &declared).expect("both routes found");
        assert_eq!(bound.len(), 2);

        let sorted = sort_and_clamp(bound);
        assert_eq!(sorted[0].function, Function(0x21));
        assert_eq!(sorted[0].channel.bits().count_ones(), 2);
        assert_eq!(sorted[1].function, Function(0x20));
        assert_eq!(sorted[1].channel.bits().count_ones(), 1);
    }
}
