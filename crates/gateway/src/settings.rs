//! Gateway Settings
//!
//! Transport and logging settings, layered from built-in defaults, an
//! optional `canbox.toml` in the working directory and `CANBOX_*`
//! environment variables (`CANBOX_SERIAL__DEVICE=/dev/ttyS1`).
//!
//! Signal identifiers are not settings: they always start from the
//! built-in defaults and only change through `CFG SET`.

use crate::error::GatewayError;
use serde::Deserialize;
use std::time::Duration;

/// Build profile the gateway presents itself as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Serial TTY host link
    Hardware,
    /// stdin/stdout host link
    #[default]
    Simulation,
}

impl Profile {
    /// Version string reported by `VER`
    pub fn version(&self) -> String {
        match self {
            Profile::Hardware => format!("HW_VER_{}", env!("CARGO_PKG_VERSION")),
            Profile::Simulation => format!("SIM_VER_{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Bus transport variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// Linux SocketCAN interface (physical or vcan)
    SocketCan,
    /// In-process loopback
    Loopback,
}

impl Default for BusKind {
    fn default() -> Self {
        if cfg!(target_os = "linux") {
            BusKind::SocketCan
        } else {
            BusKind::Loopback
        }
    }
}

/// Serial host link settings (hardware profile)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path
    pub device: String,
    /// Line speed
    pub baud_rate: u32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 38400,
        }
    }
}

/// Bus transport settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Transport variant
    pub kind: BusKind,
    /// SocketCAN interface; defaults to `can0` (hardware) or `vcan0` (simulation)
    pub interface: Option<String>,
}

impl BusSettings {
    /// Interface to open for `profile`
    pub fn interface(&self, profile: Profile) -> &str {
        match (&self.interface, profile) {
            (Some(interface), _) => interface,
            (None, Profile::Hardware) => "can0",
            (None, Profile::Simulation) => "vcan0",
        }
    }
}

/// Fault recovery timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    /// Pause after the final diagnostic line so it can flush (ms)
    pub flush_delay_ms: u64,
    /// Pause before rebuilding peripherals (ms)
    pub restart_delay_ms: u64,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            flush_delay_ms: 100,
            restart_delay_ms: 500,
        }
    }
}

impl RecoverySettings {
    /// Flush delay as a duration
    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    /// Restart delay as a duration
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

/// Complete gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: Profile,
    pub serial: SerialSettings,
    pub bus: BusSettings,
    pub recovery: RecoverySettings,
    /// Maximum log level (`trace` .. `error`)
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            serial: SerialSettings::default(),
            bus: BusSettings::default(),
            recovery: RecoverySettings::default(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Settings {
    /// Load settings from `canbox.toml` (optional) and the environment
    pub fn load() -> Result<Self, GatewayError> {
        let sources = config::Config::builder()
            .add_source(config::File::with_name("canbox").required(false))
            .add_source(
                config::Environment::with_prefix("CANBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(sources)
    }

    fn from_config(sources: config::Config) -> Result<Self, GatewayError> {
        Ok(sources.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_defaults() {
        let sources = Config::builder().build().unwrap();
        let settings = Settings::from_config(sources).unwrap();
        assert_eq!(settings.profile, Profile::Simulation);
        assert_eq!(settings.serial.baud_rate, 38400);
        assert_eq!(settings.bus.interface(settings.profile), "vcan0");
        assert_eq!(settings.recovery.flush_delay(), Duration::from_millis(100));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            profile = "hardware"
            log_level = "debug"

            [serial]
            device = "/dev/ttyS1"

            [bus]
            kind = "loopback"

            [recovery]
            flush_delay_ms = 20
        "#;
        let sources = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        let settings = Settings::from_config(sources).unwrap();

        assert_eq!(settings.profile, Profile::Hardware);
        assert_eq!(settings.serial.device, "/dev/ttyS1");
        assert_eq!(settings.serial.baud_rate, 38400);
        assert_eq!(settings.bus.kind, BusKind::Loopback);
        assert_eq!(settings.bus.interface(settings.profile), "can0");
        assert_eq!(settings.recovery.flush_delay_ms, 20);
        assert_eq!(settings.recovery.restart_delay_ms, 500);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let sources = Config::builder()
            .add_source(File::from_str("profile = \"desktop\"", FileFormat::Toml))
            .build()
            .unwrap();
        let result = Settings::from_config(sources);
        assert!(matches!(result, Err(GatewayError::Settings(_))));
    }

    #[test]
    fn test_version_strings_differ_per_profile() {
        assert!(Profile::Hardware.version().starts_with("HW_VER_"));
        assert!(Profile::Simulation.version().starts_with("SIM_VER_"));
    }
}
