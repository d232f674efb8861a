//! Control opcodes
//!
//! The dispatched set is deliberately tiny: four opcodes drive frame
//! transitions and slot updates. Byte values are fixed by the wire
//! protocol and match the peer's instruction table.

/// Record opcode (byte 0 of every record).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Stream start marker; no effect
    Init = 0x02,
    /// Pop the navigation stack
    Return = 0x53,
    /// Decode a slot payload into the active frame, then enter a nested frame
    Call = 0x83,
    /// Write a consts index into a slot position
    MakeBinding = 0x84,
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x02 => Ok(Opcode::Init),
            0x53 => Ok(Opcode::Return),
            0x83 => Ok(Opcode::Call),
            0x84 => Ok(Opcode::MakeBinding),
            _ => Err(()),
        }
    }
}

impl Opcode {
    /// Mnemonic used in traces.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Init => "INIT",
            Opcode::Return => "RETURN",
            Opcode::Call => "CALL",
            Opcode::MakeBinding => "MAKE_BINDING",
        }
    }
}
