//! Lock-Free Line Buffer Implementation

use crate::BufferError;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default buffer capacity in bytes (one slot is kept free, so 127 are usable)
pub const DEFAULT_CAPACITY: usize = 128;

/// Lock-free SPSC ring buffer of bytes
///
/// `head` is only written by the producer and `tail` only by the consumer.
/// One slot of slack distinguishes "full" from "empty" without a counter.
pub struct LineBuffer {
    /// Pre-allocated storage
    storage: Box<[AtomicU8]>,
    /// Capacity of the buffer
    capacity: usize,
    /// Head position (write pointer)
    head: AtomicUsize,
    /// Tail position (read pointer)
    tail: AtomicUsize,
    /// Set by a rejected push, cleared by the consumer
    overflow: AtomicBool,
    /// Total rejected pushes (for statistics)
    overflow_count: AtomicUsize,
}

impl LineBuffer {
    /// Create a new line buffer with given capacity (minimum 2)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let storage: Vec<AtomicU8> = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Self {
            storage: storage.into_boxed_slice(),
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflow: AtomicBool::new(false),
            overflow_count: AtomicUsize::new(0),
        }
    }

    /// Create a buffer with default capacity (128 bytes)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a byte into the buffer.
    ///
    /// Fails closed when full: the byte is dropped, existing contents stay
    /// intact and the overflow flag is raised. Producer side only.
    pub fn push(&self, byte: u8) -> Result<(), BufferError> {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = (head + 1) % self.capacity;

        if next_head == self.tail.load(Ordering::Acquire) {
            self.overflow.store(true, Ordering::Release);
            self.overflow_count.fetch_add(1, Ordering::Relaxed);
            return Err(BufferError::Overflow {
                capacity: self.capacity,
            });
        }

        self.storage[head].store(byte, Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        Ok(())
    }

    /// Pop the oldest byte. Consumer side only.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        let byte = self.storage[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) % self.capacity, Ordering::Release);
        Some(byte)
    }

    /// Read and clear the overflow flag
    pub fn take_overflow(&self) -> bool {
        self.overflow.swap(false, Ordering::AcqRel)
    }

    /// Get the number of bytes currently in the buffer
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head - tail
        } else {
            self.capacity - tail + head
        }
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity - 1
    }

    /// Bytes that can be pushed before the buffer is full
    pub fn free(&self) -> usize {
        self.capacity - 1 - self.len()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total pushes rejected because the buffer was full
    pub fn overflow_count(&self) -> usize {
        self.overflow_count.load(Ordering::Relaxed)
    }

    /// Discard everything currently queued. Consumer side only.
    pub fn clear(&self) {
        self.tail
            .store(self.head.load(Ordering::Acquire), Ordering::Release);
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Create a connected producer/consumer pair over a fresh buffer.
///
/// The halves are not `Clone`, which keeps the queue single-producer and
/// single-consumer.
pub fn channel(capacity: usize) -> (ByteProducer, ByteConsumer) {
    let buffer = Arc::new(LineBuffer::new(capacity));
    (
        ByteProducer {
            buffer: Arc::clone(&buffer),
        },
        ByteConsumer { buffer },
    )
}

/// Write half, owned by the serial receive path
pub struct ByteProducer {
    buffer: Arc<LineBuffer>,
}

impl ByteProducer {
    /// Push one byte
    pub fn push(&self, byte: u8) -> Result<(), BufferError> {
        self.buffer.push(byte)
    }

    /// Push a chunk, returning how many bytes were rejected
    pub fn push_slice(&self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter(|&&byte| self.buffer.push(byte).is_err())
            .count()
    }

    /// Push as much of `bytes` as fits without overflowing, returning the
    /// number accepted. Never raises the overflow flag.
    pub fn push_available(&self, bytes: &[u8]) -> usize {
        // Only the consumer frees space, so this count cannot shrink under us
        let fits = bytes.len().min(self.buffer.free());
        bytes[..fits]
            .iter()
            .take_while(|&&byte| self.buffer.push(byte).is_ok())
            .count()
    }
}

/// Read half, owned by the command framer
pub struct ByteConsumer {
    buffer: Arc<LineBuffer>,
}

impl ByteConsumer {
    /// Pop one byte
    pub fn pop(&self) -> Option<u8> {
        self.buffer.pop()
    }

    /// Read and clear the overflow flag
    pub fn take_overflow(&self) -> bool {
        self.buffer.take_overflow()
    }

    /// Discard queued bytes
    pub fn clear(&self) {
        self.buffer.clear()
    }

    /// Shared view of the underlying buffer (statistics)
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }
}
