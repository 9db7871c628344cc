//! SocketCAN bus transport (Linux)
//!
//! Works with physical controllers (`can0`) and with the virtual `vcan`
//! driver used for desktop simulation:
//!
//! ```text
//! sudo ip link add dev vcan0 type vcan && sudo ip link set up vcan0
//! cansend vcan0 036#02
//! ```

use crate::error::TransportError;
use crate::frame::Frame;
use crate::ingress::{BusIngress, Producer};
use crate::BusTransport;
use socketcan::tokio::CanSocket;
use socketcan::{CanDataFrame, CanFrame, EmbeddedFrame, Id, StandardId};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Bus transport over a SocketCAN interface
pub struct SocketCanBus {
    interface: String,
    socket: Arc<CanSocket>,
}

impl SocketCanBus {
    /// Open `interface` and spawn the receive task feeding `ingress`
    pub fn open(interface: &str, ingress: BusIngress) -> Result<(Self, Producer), TransportError> {
        info!("Opening SocketCAN interface {}", interface);
        let socket = CanSocket::open(interface)
            .map_err(|e| TransportError::Bus(format!("{interface}: {e}")))?;
        let socket = Arc::new(socket);

        let reader = Arc::clone(&socket);
        let label = interface.to_string();
        let task = tokio::spawn(async move {
            loop {
                match reader.read_frame().await {
                    Ok(CanFrame::Data(data)) => match to_frame(&data) {
                        Some(frame) => {
                            if !ingress.deliver(frame).await {
                                debug!("Frame consumer gone, stopping {} reader", label);
                                break;
                            }
                        }
                        None => trace!("Ignoring extended frame on {}", label),
                    },
                    Ok(CanFrame::Remote(_)) => trace!("Ignoring remote frame on {}", label),
                    Ok(CanFrame::Error(e)) => debug!("Error frame on {}: {:?}", label, e),
                    Err(e) => {
                        error!("CAN read on {} failed: {}", label, e);
                        ingress.fail(TransportError::Bus(format!("{label}: {e}")));
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                interface: interface.to_string(),
                socket,
            },
            Producer::new("socketcan", task),
        ))
    }

    /// Interface name
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

/// Convert a received data frame; extended identifiers are not supported
fn to_frame(data: &CanDataFrame) -> Option<Frame> {
    match data.id() {
        Id::Standard(id) => Frame::new(id.as_raw(), data.data()).ok(),
        Id::Extended(_) => None,
    }
}

impl BusTransport for SocketCanBus {
    async fn transmit(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let id = StandardId::new(frame.id())
            .ok_or_else(|| TransportError::InvalidFrame(format!("identifier {:#x}", frame.id())))?;
        let can_frame = CanFrame::new(id, frame.payload())
            .ok_or_else(|| TransportError::InvalidFrame(frame.to_string()))?;

        trace!("TX {} on {}", frame, self.interface);
        self.socket
            .write_frame(can_frame)
            .await
            .map_err(|e| TransportError::Bus(format!("{}: {e}", self.interface)))
    }
}
