//! Fixed-length X9 command payload.
//!
//! Every command is 8 bytes:
//! - byte 0: header (0x07)
//! - byte 1: sub-opcode (command family)
//! - bytes 2..: command-specific, zero padded

use crate::tables::opcodes;

/// Payload length for every X9 command.
pub const PAYLOAD_LEN: usize = 8;

/// An encoded 8-byte command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload([u8; PAYLOAD_LEN]);

impl Payload {
    /// Build a payload from a command opcode and its argument bytes.
    ///
    /// Arguments beyond the 6 available bytes are a programming error in
    /// an encoder; they are truncated.
    pub(crate) fn new(opcode: u8, args: &[u8]) -> Self {
        let mut buf = [0u8; PAYLOAD_LEN];
        buf[0] = opcodes::HEADER;
        buf[1] = opcode;
        for (slot, &b) in buf[2..].iter_mut().zip(args) {
            *slot = b;
        }
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    /// Command family byte.
    pub fn opcode(&self) -> u8 {
        self.0[1]
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X?}", self.0)
    }
}
