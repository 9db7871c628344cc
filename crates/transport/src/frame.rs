//! Standard CAN Frame

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest 11-bit identifier
pub const MAX_STANDARD_ID: u16 = 0x7FF;

/// Maximum classic CAN payload
pub const MAX_PAYLOAD_LEN: usize = 8;

/// Received or outbound standard CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    id: u16,
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
}

impl Frame {
    /// Create a frame, rejecting identifiers above 0x7FF and payloads over 8 bytes
    pub fn new(id: u16, payload: &[u8]) -> Result<Self, TransportError> {
        if id > MAX_STANDARD_ID {
            return Err(TransportError::InvalidFrame(format!(
                "identifier {id:#x} exceeds 11 bits"
            )));
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(TransportError::InvalidFrame(format!(
                "payload of {} bytes exceeds {MAX_PAYLOAD_LEN}",
                payload.len()
            )));
        }

        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            data,
        })
    }

    /// 11-bit identifier
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Payload length
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload byte 0, if present
    pub fn first_byte(&self) -> Option<u8> {
        self.payload().first().copied()
    }
}

/// `cansend`-style rendering, e.g. `165#02`
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}#", self.id)?;
        for byte in self.payload() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
