//! Transport Error Types

use thiserror::Error;

/// Errors raised by bus and host-link transports
#[derive(Debug, Error)]
pub enum TransportError {
    /// Serial port could not be opened or written
    #[error("Serial port error: {0}")]
    Serial(String),

    /// CAN interface error
    #[error("CAN bus error: {0}")]
    Bus(String),

    /// Generic I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame outside the 11-bit / 8-byte envelope
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Peer or device went away
    #[error("{0} closed")]
    Closed(&'static str),

    /// Failure requested through a loopback or memory handle
    #[error("Injected transport failure")]
    InjectedFailure,
}

impl From<tokio_serial::Error> for TransportError {
    fn from(err: tokio_serial::Error) -> Self {
        TransportError::Serial(err.to_string())
    }
}
