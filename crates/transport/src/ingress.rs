//! Producer-side plumbing
//!
//! Reader tasks only enqueue: host bytes go into the lock-free line buffer
//! (followed by a wake-up), bus frames into a bounded channel. Everything
//! else happens in the consumer loop.
//!
//! Host bytes are paced against the consumer: a reader holding more than
//! fits waits for the consumer to drain before queueing the rest. Only a
//! consumer stalled for [`STALL_TIMEOUT`] makes the buffer fail closed.

use crate::error::TransportError;
use crate::frame::Frame;
use line_buffer::{ByteConsumer, ByteProducer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Depth of the inbound frame queue
pub const FRAME_QUEUE_DEPTH: usize = 64;

/// How long a host reader waits for buffer space before dropping bytes
pub const STALL_TIMEOUT: Duration = Duration::from_millis(500);

/// Out-of-band events raised by producer tasks
#[derive(Debug)]
pub enum LinkEvent {
    /// Host input ended cleanly (e.g. stdin EOF)
    HostClosed,
    /// Host link failed
    HostFailed(TransportError),
    /// Bus reader failed
    BusFailed(TransportError),
}

/// Producer handle for the host byte stream
pub struct HostIngress {
    bytes: ByteProducer,
    ready: Arc<Notify>,
    space: Arc<Notify>,
    events: mpsc::UnboundedSender<LinkEvent>,
}

impl HostIngress {
    /// Queue received bytes, waiting for the consumer whenever the line
    /// buffer fills up
    pub async fn deliver(&self, mut bytes: &[u8]) {
        loop {
            let accepted = self.bytes.push_available(bytes);
            bytes = &bytes[accepted..];
            self.ready.notify_one();
            if bytes.is_empty() {
                return;
            }

            trace!("Line buffer full, {} bytes waiting", bytes.len());
            if tokio::time::timeout(STALL_TIMEOUT, self.space.notified())
                .await
                .is_err()
            {
                self.try_deliver(bytes);
                return;
            }
        }
    }

    /// Queue received bytes without waiting. Whatever does not fit is
    /// dropped and flagged as an overflow; returns the dropped count.
    pub fn try_deliver(&self, bytes: &[u8]) -> usize {
        let rejected = self.bytes.push_slice(bytes);
        if rejected > 0 {
            debug!("Line buffer full, dropped {} bytes", rejected);
        }
        self.ready.notify_one();
        rejected
    }

    /// Report a clean end of input
    pub fn close(&self) {
        let _ = self.events.send(LinkEvent::HostClosed);
        self.ready.notify_one();
    }

    /// Report a host link failure
    pub fn fail(&self, err: TransportError) {
        let _ = self.events.send(LinkEvent::HostFailed(err));
        self.ready.notify_one();
    }
}

/// Producer handle for received bus frames
#[derive(Clone)]
pub struct BusIngress {
    frames: mpsc::Sender<Frame>,
    events: mpsc::UnboundedSender<LinkEvent>,
}

impl BusIngress {
    /// Queue a frame, waiting for room. Returns `false` once the consumer is gone.
    pub async fn deliver(&self, frame: Frame) -> bool {
        self.frames.send(frame).await.is_ok()
    }

    /// Queue a frame without waiting. Returns `false` if it was dropped.
    pub fn try_deliver(&self, frame: Frame) -> bool {
        match self.frames.try_send(frame) {
            Ok(()) => true,
            Err(e) => {
                debug!("Dropping frame {}: {}", frame, e);
                false
            }
        }
    }

    /// Report a bus reader failure
    pub fn fail(&self, err: TransportError) {
        let _ = self.events.send(LinkEvent::BusFailed(err));
    }
}

/// Consumer side of all producer paths
pub struct Ingress {
    /// Host bytes awaiting framing
    pub bytes: ByteConsumer,
    /// Signalled whenever host bytes or events arrive
    pub ready: Arc<Notify>,
    /// Signal after draining host bytes to release a waiting reader
    pub space: Arc<Notify>,
    /// Received bus frames
    pub frames: mpsc::Receiver<Frame>,
    /// Producer events
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Create fresh producer/consumer plumbing over a line buffer of `capacity` bytes
pub fn ingress(capacity: usize) -> (HostIngress, BusIngress, Ingress) {
    let (producer, consumer) = line_buffer::channel(capacity);
    let ready = Arc::new(Notify::new());
    let space = Arc::new(Notify::new());
    let (frames_tx, frames_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    (
        HostIngress {
            bytes: producer,
            ready: Arc::clone(&ready),
            space: Arc::clone(&space),
            events: events_tx.clone(),
        },
        BusIngress {
            frames: frames_tx,
            events: events_tx,
        },
        Ingress {
            bytes: consumer,
            ready,
            space,
            frames: frames_rx,
            events: events_rx,
        },
    )
}

/// Background reader task; aborted when stopped or dropped
pub struct Producer {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl Producer {
    /// Wrap a spawned reader task
    pub fn new(name: &'static str, task: JoinHandle<()>) -> Self {
        Self {
            name,
            task: Some(task),
        }
    }

    /// Producer with no background task (loopback, memory)
    pub fn idle(name: &'static str) -> Self {
        Self { name, task: None }
    }

    /// Stop delivering input
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Stopping {} producer", self.name);
            task.abort();
        }
    }

    /// Producer name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.stop();
    }
}
