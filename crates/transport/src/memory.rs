//! In-memory host link

use crate::error::TransportError;
use crate::HostLink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Host link that collects response lines in memory
pub struct MemoryLink {
    handle: MemoryLinkHandle,
}

/// Inspection handle for a [`MemoryLink`]
#[derive(Clone, Default)]
pub struct MemoryLinkHandle {
    lines: Arc<Mutex<Vec<String>>>,
    fail_send: Arc<AtomicBool>,
}

impl MemoryLink {
    /// Create a link and its inspection handle
    pub fn new() -> (Self, MemoryLinkHandle) {
        let handle = MemoryLinkHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }
}

impl HostLink for MemoryLink {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        if self.handle.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::InjectedFailure);
        }
        if let Ok(mut lines) = self.handle.lines.lock() {
            lines.push(line.to_string());
        }
        Ok(())
    }
}

impl MemoryLinkHandle {
    /// All lines sent so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Remove and return all lines sent so far
    pub fn take_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut l| std::mem::take(&mut *l))
            .unwrap_or_default()
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }
}
