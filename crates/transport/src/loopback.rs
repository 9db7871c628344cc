//! In-process loopback bus
//!
//! Records every transmitted frame and can optionally echo it back to the
//! bus ingress, like a controller in loopback mode. Used by the simulation
//! profile when no SocketCAN interface is available, and by tests.

use crate::error::TransportError;
use crate::frame::Frame;
use crate::ingress::BusIngress;
use crate::BusTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Loopback bus transport
pub struct LoopbackBus {
    echo: Option<BusIngress>,
    handle: LoopbackHandle,
}

/// Inspection and fault-injection handle for a [`LoopbackBus`]
#[derive(Clone, Default)]
pub struct LoopbackHandle {
    sent: Arc<Mutex<Vec<Frame>>>,
    fail_transmit: Arc<AtomicBool>,
}

impl LoopbackBus {
    /// Create a bus that only records frames
    pub fn new() -> (Self, LoopbackHandle) {
        let handle = LoopbackHandle::default();
        (
            Self {
                echo: None,
                handle: handle.clone(),
            },
            handle,
        )
    }

    /// Create a bus that also feeds transmitted frames back as received frames
    pub fn with_echo(ingress: BusIngress) -> (Self, LoopbackHandle) {
        let (mut bus, handle) = Self::new();
        bus.echo = Some(ingress);
        (bus, handle)
    }
}

impl BusTransport for LoopbackBus {
    async fn transmit(&mut self, frame: &Frame) -> Result<(), TransportError> {
        if self.handle.fail_transmit.load(Ordering::SeqCst) {
            warn!("Loopback transmit of {} failed (injected)", frame);
            return Err(TransportError::InjectedFailure);
        }

        info!("Loopback TX {}", frame);
        if let Ok(mut sent) = self.handle.sent.lock() {
            sent.push(*frame);
        }
        if let Some(echo) = &self.echo {
            // Never wait here: the consumer that drains the queue is the caller.
            echo.try_deliver(*frame);
        }
        Ok(())
    }
}

impl LoopbackHandle {
    /// Frames transmitted so far
    pub fn sent(&self) -> Vec<Frame> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Make subsequent transmits fail (or succeed again)
    pub fn fail_transmit(&self, fail: bool) {
        self.fail_transmit.store(fail, Ordering::SeqCst);
    }
}
