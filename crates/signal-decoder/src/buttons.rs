//! Steering-Wheel Buttons

use serde::{Deserialize, Serialize};

/// Fixed identifier of the steering-wheel control frame
pub const STEERING_WHEEL_ID: u16 = 0x165;

/// Steering-wheel buttons and their bit codes in byte 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SteeringButton {
    Source = 0x01,
    VolumeUp = 0x02,
    VolumeDown = 0x04,
    SeekUp = 0x08,
    SeekDown = 0x10,
    Ok = 0x40,
    End = 0x80,
}

impl SteeringButton {
    /// All buttons
    pub const ALL: [SteeringButton; 7] = [
        SteeringButton::Source,
        SteeringButton::VolumeUp,
        SteeringButton::VolumeDown,
        SteeringButton::SeekUp,
        SteeringButton::SeekDown,
        SteeringButton::Ok,
        SteeringButton::End,
    ];

    /// Bit code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Host-facing name
    pub fn name(&self) -> &'static str {
        match self {
            SteeringButton::Source => "SRC",
            SteeringButton::VolumeUp => "VOL+",
            SteeringButton::VolumeDown => "VOL-",
            SteeringButton::SeekUp => "SEEK+",
            SteeringButton::SeekDown => "SEEK-",
            SteeringButton::Ok => "OK",
            SteeringButton::End => "END",
        }
    }

    /// Look up a received code; combined or unknown codes yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() == code)
    }

    /// Look up a host-facing name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}
