//! Runtime Signal Configuration
//!
//! Identifier table mutated by `CFG SET` and read on every frame. Lives in
//! memory only; a restart brings back the defaults.

use crate::error::ConfigError;
use crate::signal::{Signal, SIGNAL_COUNT};
use serde::{Deserialize, Serialize};
use tracing::info;
use transport::MAX_STANDARD_ID;

/// Signal → bus identifier table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    ids: [u16; SIGNAL_COUNT],
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ids: Signal::ALL.map(|s| s.default_id()),
        }
    }
}

impl SignalConfig {
    /// Identifier currently bound to `signal`
    pub fn get(&self, signal: Signal) -> u16 {
        self.ids[signal.index()]
    }

    /// Rebind `signal` to `id`
    pub fn set(&mut self, signal: Signal, id: u32) -> Result<u16, ConfigError> {
        let id = u16::try_from(id)
            .ok()
            .filter(|id| *id <= MAX_STANDARD_ID)
            .ok_or(ConfigError::IdentifierOutOfRange(id))?;

        info!("Config {} -> {:#x}", signal.key(), id);
        self.ids[signal.index()] = id;
        Ok(id)
    }

    /// Resolve a key and read its identifier
    pub fn get_key(&self, key: &str) -> Result<(Signal, u16), ConfigError> {
        let signal = Signal::from_key(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok((signal, self.get(signal)))
    }

    /// Resolve a key and rebind it
    pub fn set_key(&mut self, key: &str, id: u32) -> Result<(Signal, u16), ConfigError> {
        let signal = Signal::from_key(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok((signal, self.set(signal, id)?))
    }

    /// Signal that owns frames with `id`
    ///
    /// When several signals share an identifier only the first in
    /// [`Signal::ALL`] order is decoded from it.
    pub fn signal_for(&self, id: u16) -> Option<Signal> {
        Signal::ALL.into_iter().find(|s| self.get(*s) == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SignalConfig::default();
        assert_eq!(config.get(Signal::Ignition), 0x036);
        assert_eq!(config.get(Signal::Illumination), 0x128);
        assert_eq!(config.get(Signal::Reverse), 0x0F6);
        assert_eq!(config.get(Signal::Park), 0x128);
        assert_eq!(config.get(Signal::Door), 0x220);
    }

    #[test]
    fn test_shared_identifier() {
        let config = SignalConfig::default();
        assert_eq!(config.signal_for(0x128), Some(Signal::Illumination));
        assert_eq!(config.signal_for(0x165), None);

        let mut config = config;
        config.set(Signal::Illumination, 0x300).unwrap();
        assert_eq!(config.signal_for(0x128), Some(Signal::Park));
    }

    #[test]
    fn test_set_key() {
        let mut config = SignalConfig::default();
        assert_eq!(
            config.set_key("ignition", 0x99),
            Ok((Signal::Ignition, 0x99))
        );
        assert_eq!(config.get_key("ign_src"), Ok((Signal::Ignition, 0x99)));
        assert_eq!(config.signal_for(0x036), None);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let mut config = SignalConfig::default();
        assert_eq!(
            config.set_key("ignition", 0x800),
            Err(ConfigError::IdentifierOutOfRange(0x800))
        );
        assert_eq!(
            config.set_key("ignition", 0x1_0036),
            Err(ConfigError::IdentifierOutOfRange(0x1_0036))
        );
        assert_eq!(
            config.get_key("wipers"),
            Err(ConfigError::UnknownKey("wipers".to_string()))
        );
        assert_eq!(config, SignalConfig::default());
    }
}
