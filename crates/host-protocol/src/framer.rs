//! Command Framing
//!
//! Turns the raw serial byte stream into discrete [`Command`]s. Bytes are
//! accumulated until the `\n` delimiter, then the line is parsed as
//! `!TOK[:value]`. Lines without the `!` sentinel are channel noise.
//!
//! An over-long line is dropped up to and including its delimiter. A line
//! buffer overflow drops the partial line together with everything still
//! queued behind it. The bytes that were lost could have included the
//! delimiter, so the framer then also accepts a sentinel as the start of
//! the next line.

use crate::command::Command;
use crate::wire::{DELIMITER, MAX_LINE_LEN, SENTINEL, TOKEN_LEN};
use line_buffer::ByteConsumer;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Collecting bytes of the current line
    Accumulating,
    /// Dropping the rest of an over-long line
    SkipLine,
    /// Dropping bytes after a line buffer overflow
    Resync,
}

/// Byte-at-a-time line framer
#[derive(Debug)]
pub struct LineFramer {
    line: Vec<u8>,
    state: State,
    discarded_lines: usize,
}

impl LineFramer {
    /// Create a framer with an empty line
    pub fn new() -> Self {
        Self {
            line: Vec::with_capacity(MAX_LINE_LEN),
            state: State::Accumulating,
            discarded_lines: 0,
        }
    }

    /// Feed one byte; yields a command when a valid line completes
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::SkipLine => {
                if byte == DELIMITER {
                    self.state = State::Accumulating;
                }
                None
            }
            State::Resync => {
                if byte == DELIMITER {
                    self.state = State::Accumulating;
                } else if byte == SENTINEL {
                    self.state = State::Accumulating;
                    self.line.push(byte);
                }
                None
            }
            State::Accumulating if byte == DELIMITER => {
                let command = parse_line(&self.line);
                if command.is_none() {
                    self.discarded_lines += 1;
                    trace!(
                        "Discarding noise line: {:?}",
                        String::from_utf8_lossy(&self.line)
                    );
                }
                self.line.clear();
                command
            }
            State::Accumulating => {
                if self.line.len() >= MAX_LINE_LEN {
                    debug!("Line exceeds {} bytes, skipping to delimiter", MAX_LINE_LEN);
                    self.line.clear();
                    self.state = State::SkipLine;
                    self.discarded_lines += 1;
                } else {
                    self.line.push(byte);
                }
                None
            }
        }
    }

    /// Drop the partial line after input was lost; resume at `\n` or `!`
    pub fn resynchronize(&mut self) {
        self.line.clear();
        self.state = State::Resync;
        self.discarded_lines += 1;
    }

    /// Lines dropped as noise or because of overflow
    pub fn discarded_lines(&self) -> usize {
        self.discarded_lines
    }

    /// Whether a partial line is pending
    pub fn has_partial_line(&self) -> bool {
        !self.line.is_empty()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one complete line (delimiter already removed)
fn parse_line(line: &[u8]) -> Option<Command> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let body = line.strip_prefix(&[SENTINEL])?;

    let token_len = body
        .iter()
        .take(TOKEN_LEN)
        .position(|&b| b == b':')
        .unwrap_or_else(|| body.len().min(TOKEN_LEN));
    if token_len == 0 {
        return None;
    }

    let (token, rest) = body.split_at(token_len);
    let value = rest.strip_prefix(b":").unwrap_or_default();

    Some(Command::new(
        &String::from_utf8_lossy(token),
        &String::from_utf8_lossy(value),
    ))
}

/// Framer bound to the consumer half of the line buffer
pub struct CommandFramer {
    consumer: ByteConsumer,
    framer: LineFramer,
}

impl CommandFramer {
    /// Create a framer draining the given buffer
    pub fn new(consumer: ByteConsumer) -> Self {
        Self {
            consumer,
            framer: LineFramer::new(),
        }
    }

    /// Drain buffered bytes until a command completes or the buffer is empty
    pub fn next_command(&mut self) -> Option<Command> {
        loop {
            if self.consumer.take_overflow() {
                debug!(
                    "Line buffer overflowed ({} bytes rejected so far), dropping queued input",
                    self.overflow_count()
                );
                self.consumer.clear();
                self.framer.resynchronize();
            }

            let byte = self.consumer.pop()?;
            if let Some(command) = self.framer.feed(byte) {
                return Some(command);
            }
        }
    }

    /// Access the underlying line framer
    pub fn framer(&self) -> &LineFramer {
        &self.framer
    }

    /// Bytes the line buffer has rejected since it was created
    pub fn overflow_count(&self) -> usize {
        self.consumer.buffer().overflow_count()
    }
}
