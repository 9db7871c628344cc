//! Outbound Response Lines

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response kinds sent to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKind {
    Ok,
    Key,
    Ignition,
    Illumination,
    Reverse,
    Park,
    Door,
    Version,
    Config,
    Error,
}

impl ResponseKind {
    /// Wire token for this response
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Ok => "OK",
            ResponseKind::Key => "KEY",
            ResponseKind::Ignition => "IGN",
            ResponseKind::Illumination => "ILL",
            ResponseKind::Reverse => "REV",
            ResponseKind::Park => "PARK",
            ResponseKind::Door => "DOOR",
            ResponseKind::Version => "VER",
            ResponseKind::Config => "CFG",
            ResponseKind::Error => "ERR",
        }
    }
}

/// One response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub kind: ResponseKind,
    pub value: String,
}

impl Response {
    /// Create a response
    pub fn new(kind: ResponseKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// `!OK:<value>`
    pub fn ok(value: impl Into<String>) -> Self {
        Self::new(ResponseKind::Ok, value)
    }

    /// `!ERR:<code>`
    pub fn error(code: ErrorCode) -> Self {
        Self::new(ResponseKind::Error, code.as_str())
    }

    /// Serialize to the wire form, including the trailing newline
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}:{}", self.kind.as_str(), self.value)
    }
}
