//! Gateway Error Types

use thiserror::Error;
use transport::TransportError;

/// Errors that stop the gateway process
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Transport could not be opened
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Logging could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
