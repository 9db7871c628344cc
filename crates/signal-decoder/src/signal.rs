//! Signal Definitions and Bit Decoding

use host_protocol::ResponseKind;
use serde::{Deserialize, Serialize};
use transport::Frame;

/// Number of configurable signals
pub const SIGNAL_COUNT: usize = 5;

/// Configurable, debounced vehicle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Ignition mode (default 0x036)
    Ignition,
    /// Low-beam / dashboard illumination (default 0x128)
    Illumination,
    /// Parking brake applied (default 0x128)
    Park,
    /// Reverse gear engaged (default 0x0F6)
    Reverse,
    /// Front-left door open (default 0x220)
    Door,
}

impl Signal {
    /// All signals, in classification priority order
    pub const ALL: [Signal; SIGNAL_COUNT] = [
        Signal::Ignition,
        Signal::Illumination,
        Signal::Park,
        Signal::Reverse,
        Signal::Door,
    ];

    /// Canonical config key
    pub fn key(&self) -> &'static str {
        match self {
            Signal::Ignition => "ignition",
            Signal::Illumination => "illumination",
            Signal::Reverse => "reverse",
            Signal::Park => "park",
            Signal::Door => "door",
        }
    }

    /// Resolve a config key (canonical names, any case, or legacy `*_src` aliases)
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        match key.as_str() {
            "ignition" | "ign_src" => Some(Signal::Ignition),
            "illumination" | "illum_src" => Some(Signal::Illumination),
            "reverse" | "rev_src" => Some(Signal::Reverse),
            "park" | "park_src" => Some(Signal::Park),
            "door" | "door_src" => Some(Signal::Door),
            _ => None,
        }
    }

    /// Default bus identifier
    pub fn default_id(&self) -> u16 {
        match self {
            Signal::Ignition => 0x036,
            Signal::Illumination => 0x128,
            Signal::Reverse => 0x0F6,
            Signal::Park => 0x128,
            Signal::Door => 0x220,
        }
    }

    /// Position in [`Signal::ALL`]
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Response kind used to report this signal
    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Signal::Ignition => ResponseKind::Ignition,
            Signal::Illumination => ResponseKind::Illumination,
            Signal::Reverse => ResponseKind::Reverse,
            Signal::Park => ResponseKind::Park,
            Signal::Door => ResponseKind::Door,
        }
    }

    /// Report value for a decoded state
    pub fn state_label(&self, active: bool) -> &'static str {
        match (self, active) {
            (Signal::Door, true) => "OPEN",
            (Signal::Door, false) => "CLOSE",
            (_, true) => "ON",
            (_, false) => "OFF",
        }
    }

    /// Decode the signal's boolean state from byte 0; `None` for empty payloads
    pub fn decode(&self, frame: &Frame) -> Option<bool> {
        let byte = frame.first_byte()?;
        let active = match self {
            Signal::Ignition => IgnitionMode::from_byte(byte).is_on(),
            Signal::Illumination => byte & 0x10 != 0,
            Signal::Reverse => byte & 0x04 != 0,
            Signal::Park => byte & 0x80 != 0,
            Signal::Door => byte & 0x80 != 0,
        };
        Some(active)
    }
}

/// Ignition mode carried in the low three bits of byte 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionMode {
    Off,
    Accessory,
    On,
    Start,
    /// Any other 3-bit value
    Unknown(u8),
}

impl IgnitionMode {
    /// Extract the mode from a payload byte
    pub fn from_byte(byte: u8) -> Self {
        match byte & 0x07 {
            0x00 => IgnitionMode::Off,
            0x01 => IgnitionMode::Accessory,
            0x02 => IgnitionMode::On,
            0x03 => IgnitionMode::Start,
            other => IgnitionMode::Unknown(other),
        }
    }

    /// Accessory, on and start count as ignition on; everything else is off
    pub fn is_on(&self) -> bool {
        matches!(
            self,
            IgnitionMode::Accessory | IgnitionMode::On | IgnitionMode::Start
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(byte: u8) -> Frame {
        Frame::new(0x100, &[byte]).unwrap()
    }

    #[test]
    fn test_ignition_modes() {
        assert_eq!(IgnitionMode::from_byte(0xF8), IgnitionMode::Off);
        assert_eq!(IgnitionMode::from_byte(0x01), IgnitionMode::Accessory);
        assert_eq!(IgnitionMode::from_byte(0x0A), IgnitionMode::On);
        assert_eq!(IgnitionMode::from_byte(0x03), IgnitionMode::Start);
        assert_eq!(IgnitionMode::from_byte(0x05), IgnitionMode::Unknown(5));
        assert!(!IgnitionMode::Unknown(7).is_on());
    }

    #[test]
    fn test_bit_decoding() {
        assert_eq!(Signal::Illumination.decode(&frame(0x10)), Some(true));
        assert_eq!(Signal::Illumination.decode(&frame(0xEF)), Some(false));
        assert_eq!(Signal::Reverse.decode(&frame(0x04)), Some(true));
        assert_eq!(Signal::Park.decode(&frame(0x80)), Some(true));
        assert_eq!(Signal::Door.decode(&frame(0x7F)), Some(false));
    }

    #[test]
    fn test_empty_payload_undecodable() {
        let empty = Frame::new(0x036, &[]).unwrap();
        for signal in Signal::ALL {
            assert_eq!(signal.decode(&empty), None);
        }
    }

    #[test]
    fn test_keys_and_aliases() {
        for signal in Signal::ALL {
            assert_eq!(Signal::from_key(signal.key()), Some(signal));
        }
        assert_eq!(Signal::from_key("IGNITION"), Some(Signal::Ignition));
        assert_eq!(Signal::from_key("rev_src"), Some(Signal::Reverse));
        assert_eq!(Signal::from_key("steering"), None);
    }

    #[test]
    fn test_index_matches_order() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.index(), i);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Signal::Door.state_label(true), "OPEN");
        assert_eq!(Signal::Door.state_label(false), "CLOSE");
        assert_eq!(Signal::Park.state_label(true), "ON");
    }
}
