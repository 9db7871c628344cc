//! Signal Configuration Error Types

use thiserror::Error;

/// Errors raised while reading or changing the signal configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Key does not name a configurable signal
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Identifier does not fit in 11 bits
    #[error("Identifier {0:#x} exceeds 0x7FF")]
    IdentifierOutOfRange(u32),
}
