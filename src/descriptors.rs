//! Typed descriptor records, decoded from the raw blobs read off the
//! configuration bus. See `codec.rs` for the byte-layout parsing and
//! `constants.rs` for the fixed on-wire lengths.

use crate::constants::{INSTANCES_PER_PERIPHERAL, ROUTES_PER_CPU, WINDOWS_PER_CPU};
use crate::ids::{ChannelMask, Function, Instance, Name16, OpSelect, WindowFlags};

/// One entry in the CPU's 16-slot decode-window table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    pub function: Function,
    pub instance: Instance,
    pub base: u32,
    pub mask: u32,
    pub opsel: OpSelect,
    pub flags: WindowFlags,
}

impl WindowEntry {
    pub fn is_empty(&self) -> bool {
        self.function.is_empty()
    }

    pub fn required(&self) -> bool {
        self.flags.contains(WindowFlags::REQUIRED)
    }

    /// (function, instance) this window targets.
    pub fn target(&self) -> (Function, Instance) {
        (self.function, self.instance)
    }

    /// Decode key this window occupies: entries sharing a decode key must
    /// agree on (function, instance), per the window-collision invariant.
    pub fn decode_key(&self) -> (u32, u32, OpSelect) {
        (self.base, self.mask, self.opsel)
    }
}

impl Default for WindowEntry {
    fn default() -> Self {
        WindowEntry {
            function: Function::EMPTY,
            instance: Instance::default(),
            base: 0,
            mask: 0,
            opsel: OpSelect::Write,
            flags: WindowFlags::empty(),
        }
    }
}

/// One entry in the CPU's 16-slot interrupt-routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptRouteEntry {
    pub function: Function,
    pub instance: Instance,
    pub channel: ChannelMask,
    pub dest_pin: u8,
    pub mode: InterruptMode,
    pub stretch_us: u8,
}

impl InterruptRouteEntry {
    pub fn is_empty(&self) -> bool {
        self.function.is_empty()
    }

    pub fn target(&self) -> (Function, Instance) {
        (self.function, self.instance)
    }

    /// Collision key: two non-empty routes may not share all of
    /// (function, instance, channel).
    pub fn collision_key(&self) -> (Function, Instance, ChannelMask) {
        (self.function, self.instance, self.channel)
    }

    /// Destination pin translated to the CPLD's NMI index space (0/1), for
    /// routes whose channel includes the NMI bit. Dest pins below
    /// `NMI_DEST_BASE` pass through unchanged, matching the original
    /// firmware's `nmi_entry` helper.
    pub fn nmi_dest(&self) -> u8 {
        if self.dest_pin >= crate::constants::NMI_DEST_BASE {
            self.dest_pin - crate::constants::NMI_DEST_BASE
        } else {
            self.dest_pin
        }
    }
}

impl Default for InterruptRouteEntry {
    fn default() -> Self {
        InterruptRouteEntry {
            function: Function::EMPTY,
            instance: Instance::default(),
            channel: ChannelMask::empty(),
            dest_pin: 0,
            mode: InterruptMode::Edge,
            stretch_us: 0,
        }
    }
}

/// Interrupt trigger mode carried by a route entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptMode {
    #[default]
    Edge = 0,
    Level = 1,
}

impl InterruptMode {
    pub fn from_byte(b: u8) -> InterruptMode {
        if b == 1 {
            InterruptMode::Level
        } else {
            InterruptMode::Edge
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// The host CPU card's self-description.
#[derive(Debug, Clone, Copy)]
pub struct CpuDescriptor {
    pub platform_id: [u8; 28],
    pub cpu_type: u8,
    pub data_bus_width: u8,
    pub addr_bus_width: u8,
    pub int_ack_mode: u8,
    pub window: [WindowEntry; WINDOWS_PER_CPU],
    pub introute: [InterruptRouteEntry; ROUTES_PER_CPU],
}

impl CpuDescriptor {
    pub fn platform_id_str(&self) -> &str {
        let len = self
            .platform_id
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.platform_id.len());
        core::str::from_utf8(&self.platform_id[..len]).unwrap_or("")
    }

    pub fn non_empty_windows(&self) -> impl Iterator<Item = (usize, &WindowEntry)> {
        self.window
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.is_empty())
    }

    pub fn non_empty_routes(&self) -> impl Iterator<Item = (usize, &InterruptRouteEntry)> {
        self.introute
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
    }
}

impl Default for CpuDescriptor {
    fn default() -> Self {
        CpuDescriptor {
            platform_id: [0; 28],
            cpu_type: 0,
            data_bus_width: 0,
            addr_bus_width: 0,
            int_ack_mode: 0,
            window: [WindowEntry::default(); WINDOWS_PER_CPU],
            introute: [InterruptRouteEntry::default(); ROUTES_PER_CPU],
        }
    }
}

/// The memory-bank card's self-description.
#[derive(Debug, Clone, Copy, Default)]
pub struct BankDescriptor {
    pub vendor_id: [u8; 16],
    pub board_id: [u8; 16],
    pub revision: u8,
    pub ram_addr_width: u8,
    pub rom_addr_width: u8,
    pub data_bus_width: u8,
}

impl BankDescriptor {
    pub fn vendor_id_str(&self) -> &str {
        bytes_to_str(&self.vendor_id)
    }

    pub fn board_id_str(&self) -> &str {
        bytes_to_str(&self.board_id)
    }
}

fn bytes_to_str(b: &[u8]) -> &str {
    let len = b.iter().position(|&x| x == 0).unwrap_or(b.len());
    core::str::from_utf8(&b[..len]).unwrap_or("")
}

/// One occurrence of a function on a peripheral tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceRecord {
    pub function: Function,
    pub instance: Instance,
    pub data_bus_width: u8,
    pub addr_bus_width: u8,
    pub int_ack_mode: u8,
    pub int_channel: ChannelMask,
    pub hw_revision: u8,
    pub fw_revision: u8,
    pub name: Name16,
}

impl InstanceRecord {
    pub fn is_empty(&self) -> bool {
        self.function.is_empty()
    }
}

impl Default for InstanceRecord {
    fn default() -> Self {
        InstanceRecord {
            function: Function::EMPTY,
            instance: Instance::default(),
            data_bus_width: 0,
            addr_bus_width: 0,
            int_ack_mode: 0,
            int_channel: ChannelMask::empty(),
            hw_revision: 0,
            fw_revision: 0,
            name: Name16::default(),
        }
    }
}

/// A single peripheral tile's self-description: up to 7 instance sub-records.
#[derive(Debug, Clone, Copy)]
pub struct PeripheralDescriptor {
    pub inst: [InstanceRecord; INSTANCES_PER_PERIPHERAL],
}

impl PeripheralDescriptor {
    pub fn non_empty_instances(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.inst.iter().filter(|i| !i.is_empty())
    }
}

impl Default for PeripheralDescriptor {
    fn default() -> Self {
        PeripheralDescriptor {
            inst: [InstanceRecord::default(); INSTANCES_PER_PERIPHERAL],
        }
    }
}
