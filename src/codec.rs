//! Descriptor codec: blind fixed-length reads off the configuration bus,
//! decoded into typed records.
//!
//! Byte layout follows the original firmware's packed C structs exactly
//! (little-endian integers, no implicit padding). This module does no
//! semantic validation beyond magic/type/(bank) spec-version — the validator
//! owns everything else.

use crate::constants::*;
use crate::descriptors::{
    BankDescriptor, CpuDescriptor, InstanceRecord, InterruptRouteEntry, PeripheralDescriptor,
    WindowEntry,
};
use crate::ids::{ChannelMask, Function, Instance, Name16, OpSelect, WindowFlags};
use crate::transport::{CfgBusError, CfgBusTransport};

/// Failure decoding a descriptor blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The configuration bus transaction itself failed.
    Bus(CfgBusError),
    /// The blob decoded but failed magic/type/version verification.
    BadDescriptor,
}

impl From<CfgBusError> for CodecError {
    fn from(e: CfgBusError) -> Self {
        CodecError::Bus(e)
    }
}

fn magic_ok(b: &[u8]) -> bool {
    b[0..4] == MAGIC
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn read_window_entry(b: &[u8]) -> WindowEntry {
    WindowEntry {
        function: Function(b[0]),
        instance: Instance(b[1]),
        base: le_u32(&b[2..6]),
        mask: le_u32(&b[6..10]),
        opsel: OpSelect::from_byte(b[10]),
        flags: WindowFlags::from_bits_truncate(b[11]),
    }
}

fn read_route_entry(b: &[u8]) -> InterruptRouteEntry {
    InterruptRouteEntry {
        function: Function(b[0]),
        instance: Instance(b[1]),
        channel: ChannelMask::from_bits_truncate(b[2]),
        dest_pin: b[3],
        mode: crate::descriptors::InterruptMode::from_byte(b[4]),
        stretch_us: b[5],
    }
}

fn read_name16(b: &[u8]) -> Name16 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&b[..16]);
    Name16(buf)
}

/// Byte offsets within the 416-byte CPU descriptor blob.
mod cpu_layout {
    pub const MANUFACTURER: usize = 16;
    pub const PLATFORM_ID: usize = 32;
    pub const PLATFORM_ID_LEN: usize = 28;
    pub const CPU_TYPE: usize = 60;
    pub const DATA_BUS_WIDTH: usize = 61;
    pub const ADDR_BUS_WIDTH: usize = 62;
    pub const INT_ACK_MODE: usize = 63;
    pub const WINDOW_TABLE: usize = 64;
    pub const WINDOW_ENTRY_LEN: usize = 14;
    pub const ROUTE_TABLE: usize = 64 + 16 * WINDOW_ENTRY_LEN;
    pub const ROUTE_ENTRY_LEN: usize = 8;
}

/// Byte offsets within the 256-byte peripheral descriptor blob.
mod dev_layout {
    pub const INST_TABLE: usize = 16;
    pub const INST_ENTRY_LEN: usize = 31;
    pub const INST_NAME_OFFSET: usize = 8;
}

/// Byte offsets within the 256-byte bank descriptor blob.
mod bank_layout {
    pub const SPEC_VERSION: usize = 4;
    pub const VENDOR_ID: usize = 16;
    pub const BOARD_ID: usize = 32;
    pub const BANK_REVISION: usize = 48;
    pub const RAM_ADDR_WIDTH: usize = 49;
    pub const ROM_ADDR_WIDTH: usize = 50;
    pub const DATA_BUS_WIDTH: usize = 51;
}

fn decode_cpu(buf: &[u8; CPU_DESC_LEN]) -> Option<CpuDescriptor> {
    if !magic_ok(buf) || buf[5] != TYPE_CPU {
        return None;
    }
    let _ = cpu_layout::MANUFACTURER; // reserved for future manufacturer-field consumers
    let mut platform_id = [0u8; cpu_layout::PLATFORM_ID_LEN];
    platform_id.copy_from_slice(
        &buf[cpu_layout::PLATFORM_ID..cpu_layout::PLATFORM_ID + cpu_layout::PLATFORM_ID_LEN],
    );

    let mut window = [WindowEntry::default(); WINDOWS_PER_CPU];
    for (i, slot) in window.iter_mut().enumerate() {
        let off = cpu_layout::WINDOW_TABLE + i * cpu_layout::WINDOW_ENTRY_LEN;
        *slot = read_window_entry(&buf[off..off + cpu_layout::WINDOW_ENTRY_LEN]);
    }

    let mut introute = [InterruptRouteEntry::default(); ROUTES_PER_CPU];
    for (i, slot) in introute.iter_mut().enumerate() {
        let off = cpu_layout::ROUTE_TABLE + i * cpu_layout::ROUTE_ENTRY_LEN;
        *slot = read_route_entry(&buf[off..off + cpu_layout::ROUTE_ENTRY_LEN]);
    }

    Some(CpuDescriptor {
        platform_id,
        cpu_type: buf[cpu_layout::CPU_TYPE],
        data_bus_width: buf[cpu_layout::DATA_BUS_WIDTH],
        addr_bus_width: buf[cpu_layout::ADDR_BUS_WIDTH],
        int_ack_mode: buf[cpu_layout::INT_ACK_MODE],
        window,
        introute,
    })
}

fn decode_bank(buf: &[u8; BANK_DESC_LEN]) -> Option<BankDescriptor> {
    if !magic_ok(buf)
        || buf[5] != TYPE_BANK
        || buf[bank_layout::SPEC_VERSION] != BANK_SPEC_VERSION
    {
        return None;
    }
    let mut vendor_id = [0u8; 16];
    vendor_id.copy_from_slice(&buf[bank_layout::VENDOR_ID..bank_layout::VENDOR_ID + 16]);
    let mut board_id = [0u8; 16];
    board_id.copy_from_slice(&buf[bank_layout::BOARD_ID..bank_layout::BOARD_ID + 16]);

    Some(BankDescriptor {
        vendor_id,
        board_id,
        revision: buf[bank_layout::BANK_REVISION],
        ram_addr_width: buf[bank_layout::RAM_ADDR_WIDTH],
        rom_addr_width: buf[bank_layout::ROM_ADDR_WIDTH],
        data_bus_width: buf[bank_layout::DATA_BUS_WIDTH],
    })
}

fn decode_peripheral(buf: &[u8; DEV_DESC_LEN]) -> Option<PeripheralDescriptor> {
    if !magic_ok(buf) || buf[5] != TYPE_PERIPHERAL {
        return None;
    }
    let mut inst = [InstanceRecord::default(); INSTANCES_PER_PERIPHERAL];
    for (i, slot) in inst.iter_mut().enumerate() {
        let off = dev_layout::INST_TABLE + i * dev_layout::INST_ENTRY_LEN;
        let rec = &buf[off..off + dev_layout::INST_ENTRY_LEN];
        *slot = InstanceRecord {
            function: Function(rec[0]),
            instance: Instance(rec[1]),
            data_bus_width: rec[2],
            addr_bus_width: rec[3],
            int_ack_mode: rec[4],
            int_channel: ChannelMask::from_bits_truncate(rec[5]),
            hw_revision: rec[6],
            fw_revision: rec[7],
            name: read_name16(
                &rec[dev_layout::INST_NAME_OFFSET..dev_layout::INST_NAME_OFFSET + 16],
            ),
        };
    }
    Some(PeripheralDescriptor { inst })
}

/// Read and decode the CPU descriptor at [`CPU_ADDR`].
pub fn read_cpu(transport: &mut impl CfgBusTransport) -> Result<CpuDescriptor, CodecError> {
    let mut buf = [0u8; CPU_DESC_LEN];
    transport.read(CPU_ADDR, &mut buf)?;
    decode_cpu(&buf).ok_or(CodecError::BadDescriptor)
}

/// Read and decode the bank descriptor at [`BANK_ADDR`].
pub fn read_bank(transport: &mut impl CfgBusTransport) -> Result<BankDescriptor, CodecError> {
    let mut buf = [0u8; BANK_DESC_LEN];
    transport.read(BANK_ADDR, &mut buf)?;
    decode_bank(&buf).ok_or(CodecError::BadDescriptor)
}

/// Read and decode the peripheral descriptor for `slot` (card address
/// `TILE_BASE_ADDR + slot`). A [`CfgBusError::NoDevice`] propagates
/// unchanged so the caller can treat it as an empty slot rather than a fault.
pub fn read_peripheral(
    transport: &mut impl CfgBusTransport,
    slot: u8,
) -> Result<PeripheralDescriptor, CodecError> {
    let mut buf = [0u8; DEV_DESC_LEN];
    transport.read(TILE_BASE_ADDR + slot, &mut buf)?;
    decode_peripheral(&buf).ok_or(CodecError::BadDescriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixture;

    #[test]
    fn decode_cpu_rejects_bad_magic() {
        let mut buf = fixture::cpu_bytes_single_window();
        buf[0] = b'X';
        assert!(decode_cpu(&buf).is_none());
    }

    #[test]
    fn decode_cpu_rejects_wrong_type() {
        let mut buf = fixture::cpu_bytes_single_window();
        buf[5] = TYPE_BANK;
        assert!(decode_cpu(&buf).is_none());
    }

    #[test]
    fn decode_cpu_round_trips_window_and_route_fields() {
        let buf = fixture::cpu_bytes_single_window();
        let cpu = decode_cpu(&buf).expect("valid cpu descriptor");
        assert_eq!(cpu.data_bus_width, 16);
        let (idx, w) = cpu.non_empty_windows().next().expect("one window");
        assert_eq!(idx, 0);
        assert_eq!(w.function, Function(0x20));
        assert_eq!(w.base, 0x0000_E000);
        assert_eq!(w.mask, 0xFFFF_F000);
        assert!(w.required());
        let (_, r) = cpu.non_empty_routes().next().expect("one route");
        assert_eq!(r.channel, ChannelMask::INT_CH0);
        assert_eq!(r.dest_pin, 0x02);
    }

    #[test]
    fn decode_bank_rejects_spec_version_mismatch() {
        let mut buf = fixture::bank_bytes(16);
        buf[bank_layout::SPEC_VERSION] = 2;
        assert!(decode_bank(&buf).is_none());
    }

    #[test]
    fn decode_peripheral_round_trips_name_and_width() {
        let buf = fixture::peripheral_bytes(&[(Function(0x20), Instance(0), 8, ChannelMask::INT_CH0, "disk0")]);
        let dev = decode_peripheral(&buf).expect("valid peripheral descriptor");
        let inst = dev.non_empty_instances().next().expect("one instance");
        assert_eq!(inst.data_bus_width, 8);
        assert_eq!(inst.name.as_str(), "disk0");
    }
}
