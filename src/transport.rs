//! Trait boundary for the four external collaborators the spec names but does
//! not further specify: the configuration (descriptor) bus, the CPLD
//! programming bus, the platform reset line, and the operator console's text
//! transport. Real hardware backends (I2C EEPROM reads, GPIO-bit-banged CPLD
//! writes, a UART line reader) live outside this crate; `sim.rs` provides an
//! in-memory implementation of each trait for tests and the demo binary.

use std::string::String;

/// Distinguishes a genuinely absent card from any other bus fault, so slot
/// probing can treat "nothing answered" as an empty slot rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgBusError {
    /// No card acknowledged at this address.
    NoDevice,
    /// The bus transaction failed for any other reason (NACK mid-transfer,
    /// timeout, arbitration loss, ...).
    Fault,
}

/// Blind, fixed-length reads of a card's descriptor ROM.
pub trait CfgBusTransport {
    /// Fill `out` completely from the card at `card_address`, starting at
    /// offset 0. `out.len()` is the fixed length for the descriptor kind
    /// being read (see `constants::{CPU,BANK,DEV}_DESC_LEN`).
    fn read(&mut self, card_address: u8, out: &mut [u8]) -> Result<(), CfgBusError>;
}

/// Two-region latched-write programming bus for the CPLD.
pub trait CpldTransport {
    /// Latch `byte` at `addr` in the decoder-region address space (§6: base
    /// 0x00..0x3F, mask 0x40..0x7F, slot 0x80..0x8F, op 0x90..0x9F).
    fn dec_write(&mut self, addr: u8, byte: u8);

    /// Latch `byte` at `addr` in the IRQ-router address space (§6: maskable
    /// entries at `slot*2+ch`, NMI entries at `NUM_SLOTS*2+slot`).
    fn irq_write(&mut self, addr: u8, byte: u8);
}

/// The platform reset line. Asserted throughout ingestion/validation/mapping,
/// released once the outcome (success or failure) is known.
pub trait ResetLine {
    fn init(&mut self);
    fn assert(&mut self);
    fn release(&mut self);
}

/// Line-oriented text transport for the operator console.
pub trait ConsoleIo {
    /// Returns the next input line with trailing newline stripped, or `None`
    /// at end of input.
    fn read_line(&mut self) -> Option<String>;
    /// Writes one line, with a trailing newline appended.
    fn write_line(&mut self, line: &str);
}
