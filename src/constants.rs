//! Wire-format and capacity constants.
//!
//! Mirrors the original firmware's `ubitz_enumerator.h` `#define`s. These are
//! fixed by the CPLD's address-decode layout (§6/§9 of the spec) and by the
//! descriptor ROM sizes on each card, not runtime configuration.

/// Magic tag that opens every descriptor blob: the four bytes `U`, `P`, `C`, `I`.
pub const MAGIC: [u8; 4] = *b"UPCI";

/// CPU descriptor type tag.
pub const TYPE_CPU: u8 = 1;
/// Peripheral descriptor type tag.
pub const TYPE_PERIPHERAL: u8 = 2;
/// Memory-bank descriptor type tag.
pub const TYPE_BANK: u8 = 3;

/// Bank descriptor spec-version byte this codec understands.
pub const BANK_SPEC_VERSION: u8 = 1;

/// On-wire length of the CPU descriptor blob.
pub const CPU_DESC_LEN: usize = 416;
/// On-wire length of a peripheral descriptor blob.
pub const DEV_DESC_LEN: usize = 256;
/// On-wire length of the bank descriptor blob.
pub const BANK_DESC_LEN: usize = 256;

/// Window entries per CPU descriptor.
pub const WINDOWS_PER_CPU: usize = 16;
/// Interrupt-route entries per CPU descriptor.
pub const ROUTES_PER_CPU: usize = 16;
/// Instance sub-records per peripheral descriptor.
pub const INSTANCES_PER_PERIPHERAL: usize = 7;

/// Maximum peripheral tiles the backplane can host.
pub const MAX_TILES: usize = 5;
/// Maximum decode bindings the snapshot retains.
pub const MAX_WINDOW_BINDINGS: usize = 16;
/// Maximum IRQ bindings the snapshot retains.
pub const MAX_IRQ_BINDINGS: usize = 32;

/// Card address of the CPU descriptor EEPROM.
pub const CPU_ADDR: u8 = 0x50;
/// Card address of the memory-bank descriptor EEPROM.
pub const BANK_ADDR: u8 = 0x51;
/// Base card address of tile slot 0; slot `s` lives at `TILE_BASE_ADDR + s`.
pub const TILE_BASE_ADDR: u8 = 0x52;

/// Channel bit for maskable interrupt channel 0.
pub const CHAN_INT0: u8 = 0x01;
/// Channel bit for maskable interrupt channel 1.
pub const CHAN_INT1: u8 = 0x02;
/// Channel bit for the non-maskable channel.
pub const CHAN_NMI: u8 = 0x10;

/// Destination pins below this value are maskable CPU interrupt pins (0-3);
/// at or above it, they are NMI pins (0x10-0x11).
pub const NMI_DEST_BASE: u8 = 0x10;

/// Number of physical backplane slots the IRQ router's address layout assumes.
pub const NUM_SLOTS: usize = MAX_TILES;
