//! Host Protocol Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes reported to the host in `!ERR:<code>` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Unknown command token
    InvalidCommand,
    /// Malformed or rejected `CFG` request
    InvalidConfig,
    /// Bus transport failure
    CanError,
}

impl ErrorCode {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCommand => "INVALID_CMD",
            ErrorCode::InvalidConfig => "INVALID_CFG",
            ErrorCode::CanError => "CAN_ERROR",
        }
    }
}

/// User-level errors raised while handling a host command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Command token not recognized
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    /// Config request could not be parsed or applied
    #[error("Invalid config request: {0}")]
    InvalidConfig(String),
}

impl ProtocolError {
    /// Error code reported to the host
    pub fn code(&self) -> ErrorCode {
        match self {
            ProtocolError::UnknownCommand(_) => ErrorCode::InvalidCommand,
            ProtocolError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }
}
