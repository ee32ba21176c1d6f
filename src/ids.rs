//! Small newtypes and bitflags shared by the descriptor and mapping layers.

use core::fmt;

/// An 8-bit peripheral class code. Zero means "empty slot in a fixed-size table".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Function(pub u8);

impl Function {
    pub const EMPTY: Function = Function(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// An 8-bit index distinguishing multiple occurrences of the same [`Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instance(pub u8);

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical backplane tile position, 0..[`crate::constants::MAX_TILES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Slot(pub u8);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address-decode operation a window entry matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSelect {
    Write,
    Read,
    Any,
}

impl OpSelect {
    /// Decode the on-wire byte. Any value other than `0x00`/`0x01` is treated
    /// as `Any`, matching the original firmware's `op_encode` (which only
    /// special-cases READ and WRITE and falls through to `0xFF` otherwise).
    pub fn from_byte(b: u8) -> OpSelect {
        match b {
            0x00 => OpSelect::Write,
            0x01 => OpSelect::Read,
            _ => OpSelect::Any,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            OpSelect::Write => 0x00,
            OpSelect::Read => 0x01,
            OpSelect::Any => 0xFF,
        }
    }

    /// The byte the CPLD decoder's op-select region expects.
    pub fn to_cpld_op(self) -> u8 {
        self.to_byte()
    }
}

bitflags::bitflags! {
    /// Window entry flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u8 {
        /// Enumeration must fail if no device instance matches this window.
        const REQUIRED = 0x01;
    }
}

bitflags::bitflags! {
    /// Interrupt channel bitmask: low two bits are maskable channels, bit 4 is NMI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChannelMask: u8 {
        const INT_CH0 = 0x01;
        const INT_CH1 = 0x02;
        const NMI = 0x10;
    }
}

impl ChannelMask {
    /// The three channel bits this spec understands, in the order they are
    /// matched: INT_CH0, INT_CH1, then NMI.
    pub const DECLARABLE: [ChannelMask; 3] =
        [ChannelMask::INT_CH0, ChannelMask::INT_CH1, ChannelMask::NMI];
}

/// A fixed 16-byte ASCII name field, as stored in a peripheral instance record.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Name16(pub [u8; 16]);

impl Name16 {
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(16);
        core::str::from_utf8(&self.0[..len]).unwrap_or("")
    }
}

impl fmt::Debug for Name16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Name16").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Name16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `f.pad` (rather than `write_str`) so width specifiers like
        // `format!("{:16}", name)` actually pad the console's fixed-width
        // name column.
        f.pad(self.as_str())
    }
}

impl Default for Name16 {
    fn default() -> Self {
        Name16([0u8; 16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_empty_is_zero() {
        assert!(Function::EMPTY.is_empty());
        assert!(!Function(0x20).is_empty());
    }

    #[test]
    fn opselect_roundtrips_known_bytes() {
        assert_eq!(OpSelect::from_byte(0x00), OpSelect::Write);
        assert_eq!(OpSelect::from_byte(0x01), OpSelect::Read);
        assert_eq!(OpSelect::from_byte(0xFF), OpSelect::Any);
        assert_eq!(OpSelect::Write.to_byte(), 0x00);
        assert_eq!(OpSelect::Read.to_byte(), 0x01);
        assert_eq!(OpSelect::Any.to_byte(), 0xFF);
    }

    #[test]
    fn name16_truncates_at_first_nul() {
        let mut buf = [0u8; 16];
        buf[..4].copy_from_slice(b"tty0");
        let name = Name16(buf);
        assert_eq!(name.as_str(), "tty0");
    }
}
