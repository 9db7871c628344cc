//! Serial TTY host link (hardware profile)

use crate::error::TransportError;
use crate::ingress::{HostIngress, Producer};
use crate::HostLink;
use tokio::io::{AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{error, info};

/// Read chunk size for the receive task
const READ_CHUNK: usize = 64;

/// Host link over a serial port
pub struct SerialLink {
    device: String,
    writer: WriteHalf<SerialStream>,
}

impl SerialLink {
    /// Open the port and spawn the receive task feeding `ingress`
    ///
    /// # Arguments
    /// * `device` - Serial port device path (e.g. "/dev/ttyUSB0")
    /// * `baud_rate` - Line speed
    pub fn open(
        device: &str,
        baud_rate: u32,
        ingress: HostIngress,
    ) -> Result<(Self, Producer), TransportError> {
        info!("Opening serial host link {} at {} baud", device, baud_rate);
        let port = tokio_serial::new(device, baud_rate).open_native_async()?;
        let (mut reader, writer) = tokio::io::split(port);

        let label = device.to_string();
        let task = tokio::spawn(async move {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => {
                        error!("Serial port {} returned EOF", label);
                        ingress.fail(TransportError::Closed("serial port"));
                        break;
                    }
                    Ok(n) => ingress.deliver(&chunk[..n]).await,
                    Err(e) => {
                        error!("Serial read on {} failed: {}", label, e);
                        ingress.fail(e.into());
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                device: device.to_string(),
                writer,
            },
            Producer::new("serial", task),
        ))
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl HostLink for SerialLink {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
