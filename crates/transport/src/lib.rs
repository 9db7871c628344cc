//! Gateway Transports
//!
//! The gateway core reaches the outside world through two narrow
//! capabilities: [`BusTransport`] ("transmit one bus frame") and
//! [`HostLink`] ("transmit one response line"). Concrete variants cover
//! real hardware (SocketCAN + serial TTY) and simulation (stdio, loopback).
//! Inbound traffic is delivered by producer tasks through [`ingress`].

mod error;
mod frame;
mod ingress;
mod loopback;
mod memory;
mod serial;
#[cfg(target_os = "linux")]
mod socketcan_bus;
mod stdio;

pub use error::TransportError;
pub use frame::{Frame, MAX_PAYLOAD_LEN, MAX_STANDARD_ID};
pub use ingress::{
    ingress, BusIngress, HostIngress, Ingress, LinkEvent, Producer, FRAME_QUEUE_DEPTH,
    STALL_TIMEOUT,
};
pub use loopback::{LoopbackBus, LoopbackHandle};
pub use memory::{MemoryLink, MemoryLinkHandle};
pub use serial::SerialLink;
#[cfg(target_os = "linux")]
pub use socketcan_bus::SocketCanBus;
pub use stdio::StdioLink;

use std::future::Future;

/// Outbound bus capability
pub trait BusTransport: Send {
    /// Transmit one frame. Failures are fatal to the caller.
    fn transmit(
        &mut self,
        frame: &Frame,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Outbound host capability
pub trait HostLink: Send {
    /// Send one already-encoded response line (including `\n`)
    fn send_line(&mut self, line: &str)
        -> impl Future<Output = Result<(), TransportError>> + Send;
}
