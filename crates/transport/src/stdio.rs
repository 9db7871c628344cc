//! Standard input/output host link (simulation profile)
//!
//! Blocking stdin reads cannot be cancelled, so a single process-wide pump
//! thread owns stdin and forwards chunks to whichever link is currently
//! attached. A restart detaches the old link and attaches the new one.

use crate::error::TransportError;
use crate::ingress::{HostIngress, Producer};
use crate::HostLink;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const READ_CHUNK: usize = 256;

enum StdinChunk {
    Data(Vec<u8>),
    Eof,
    Failed(String),
}

type PumpTarget = Mutex<Option<mpsc::UnboundedSender<StdinChunk>>>;

static PUMP_TARGET: OnceLock<PumpTarget> = OnceLock::new();
static STDIN_EOF: AtomicBool = AtomicBool::new(false);

fn pump_target() -> &'static PumpTarget {
    PUMP_TARGET.get_or_init(|| {
        std::thread::spawn(run_pump);
        Mutex::new(None)
    })
}

fn run_pump() {
    let mut stdin = std::io::stdin();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let item = match stdin.read(&mut chunk) {
            Ok(0) => StdinChunk::Eof,
            Ok(n) => StdinChunk::Data(chunk[..n].to_vec()),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => StdinChunk::Failed(e.to_string()),
        };
        let finished = !matches!(item, StdinChunk::Data(_));
        if finished {
            STDIN_EOF.store(true, Ordering::SeqCst);
        }

        if let Ok(mut target) = pump_target().lock() {
            if let Some(tx) = target.as_ref() {
                if tx.send(item).is_err() {
                    debug!("Stdin consumer detached, dropping chunk");
                    *target = None;
                }
            }
        }

        if finished {
            break;
        }
    }
}

/// Host link over the process's stdin/stdout
pub struct StdioLink {
    stdout: Stdout,
}

impl StdioLink {
    /// Attach to the stdin pump and spawn the forwarding task
    pub fn open(ingress: HostIngress) -> Result<(Self, Producer), TransportError> {
        info!("Using stdin/stdout host link");

        let (tx, mut rx) = mpsc::unbounded_channel();
        match pump_target().lock() {
            Ok(mut target) => *target = Some(tx),
            Err(_) => return Err(TransportError::Closed("stdin pump")),
        }
        // The pump raises the flag before looking for a target, so checking
        // after attaching cannot miss the end of input.
        if STDIN_EOF.load(Ordering::SeqCst) {
            ingress.close();
        }

        let task = tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match item {
                    StdinChunk::Data(bytes) => ingress.deliver(&bytes).await,
                    StdinChunk::Eof => {
                        info!("Stdin closed");
                        ingress.close();
                        break;
                    }
                    StdinChunk::Failed(e) => {
                        error!("Stdin read failed: {}", e);
                        ingress.fail(TransportError::Io(std::io::Error::other(e)));
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                stdout: tokio::io::stdout(),
            },
            Producer::new("stdio", task),
        ))
    }
}

impl HostLink for StdioLink {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.stdout.write_all(line.as_bytes()).await?;
        self.stdout.flush().await?;
        Ok(())
    }
}
