//! Host Commands

use crate::error::ProtocolError;
use crate::wire::{MAX_VALUE_LEN, SEPARATOR, TOKEN_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands understood by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// `RST` - full reinitialization
    Reset,
    /// `KEY` - simulate a steering-wheel button press on the bus
    Key,
    /// `VER` - report firmware version
    Version,
    /// `CFG` - read or change a signal identifier
    Config,
}

impl CommandKind {
    /// Resolve a wire token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "RST" => Some(CommandKind::Reset),
            "KEY" => Some(CommandKind::Key),
            "VER" => Some(CommandKind::Version),
            "CFG" => Some(CommandKind::Config),
            _ => None,
        }
    }

    /// Wire token for this command
    pub fn token(&self) -> &'static str {
        match self {
            CommandKind::Reset => "RST",
            CommandKind::Key => "KEY",
            CommandKind::Version => "VER",
            CommandKind::Config => "CFG",
        }
    }
}

/// One parsed host command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    token: String,
    value: String,
}

impl Command {
    /// Build a command, clamping token and value to their wire widths
    pub fn new(token: &str, value: &str) -> Self {
        Self {
            token: token.chars().take(TOKEN_LEN).collect(),
            value: value.chars().take(MAX_VALUE_LEN).collect(),
        }
    }

    /// Raw command token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value following the `:` separator (empty when absent)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Recognized command kind
    pub fn kind(&self) -> Result<CommandKind, ProtocolError> {
        CommandKind::from_token(&self.token)
            .ok_or_else(|| ProtocolError::UnknownCommand(self.token.clone()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "!{}", self.token)
        } else {
            write!(f, "!{}:{}", self.token, self.value)
        }
    }
}

/// Value of a `CFG` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRequest {
    /// `GET:<key>`
    Get { key: String },
    /// `SET:<key>:<hex>`
    Set { key: String, value: u32 },
}

impl ConfigRequest {
    /// Parse the value of a `CFG` command
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        let mut parts = value.splitn(3, SEPARATOR);
        let action = parts.next().unwrap_or_default();
        let key = parts
            .next()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProtocolError::InvalidConfig(format!("missing key in {value:?}")))?;

        match (action, parts.next()) {
            ("GET", None) => Ok(ConfigRequest::Get {
                key: key.to_string(),
            }),
            ("SET", Some(raw)) => Ok(ConfigRequest::Set {
                key: key.to_string(),
                value: parse_hex(raw)?,
            }),
            _ => Err(ProtocolError::InvalidConfig(format!(
                "unsupported request {value:?}"
            ))),
        }
    }

    /// Key the request refers to
    pub fn key(&self) -> &str {
        match self {
            ConfigRequest::Get { key } | ConfigRequest::Set { key, .. } => key,
        }
    }
}

/// Parse an unsigned hexadecimal value with optional `0x` prefix
fn parse_hex(raw: &str) -> Result<u32, ProtocolError> {
    let digits = raw
        .trim()
        .strip_prefix("0x")
        .or_else(|| raw.trim().strip_prefix("0X"))
        .unwrap_or_else(|| raw.trim());

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProtocolError::InvalidConfig(format!(
            "not a hex value: {raw:?}"
        )));
    }

    u32::from_str_radix(digits, 16)
        .map_err(|e| ProtocolError::InvalidConfig(format!("{raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_tokens() {
        for kind in [
            CommandKind::Reset,
            CommandKind::Key,
            CommandKind::Version,
            CommandKind::Config,
        ] {
            assert_eq!(CommandKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(CommandKind::from_token("rst"), None);
    }

    #[test]
    fn test_unknown_command() {
        let command = Command::new("XYZ", "foo");
        assert_eq!(
            command.kind(),
            Err(ProtocolError::UnknownCommand("XYZ".to_string()))
        );
    }

    #[test]
    fn test_value_truncated() {
        let long = "A".repeat(50);
        let command = Command::new("KEYS", &long);
        assert_eq!(command.token(), "KEY");
        assert_eq!(command.value().len(), MAX_VALUE_LEN);
    }

    #[test]
    fn test_parse_get() {
        assert_eq!(
            ConfigRequest::parse("GET:ignition").unwrap(),
            ConfigRequest::Get {
                key: "ignition".to_string()
            }
        );
    }

    #[test]
    fn test_parse_set_hex_forms() {
        for raw in ["0x99", "99", "0X99"] {
            let request = ConfigRequest::parse(&format!("SET:ignition:{raw}")).unwrap();
            assert_eq!(
                request,
                ConfigRequest::Set {
                    key: "ignition".to_string(),
                    value: 0x99
                }
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in [
            "",
            "GET",
            "GET:",
            "SET:ignition",
            "SET:ignition:zz",
            "SET:ignition:0x",
            "SET:ignition:-1",
            "GET:ignition:0x36",
            "DEL:ignition",
            "get:ignition",
        ] {
            let err = ConfigRequest::parse(value).unwrap_err();
            assert!(
                matches!(err, ProtocolError::InvalidConfig(_)),
                "{value:?} -> {err:?}"
            );
        }
    }
}
