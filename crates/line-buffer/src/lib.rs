//! Lock-Free Line Buffer
//!
//! Bounded single-producer/single-consumer byte queue. The serial receive
//! path pushes bytes one at a time, the command framer drains them.
//! A full buffer rejects the push and records an overflow instead of
//! overwriting unread bytes.

mod buffer;

pub use buffer::{channel, ByteConsumer, ByteProducer, LineBuffer, DEFAULT_CAPACITY};

use thiserror::Error;

/// Errors raised by the line buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Push attempted while the buffer was full
    #[error("Line buffer overflow (capacity {capacity} bytes)")]
    Overflow { capacity: usize },
}
