//! Transport Composition
//!
//! Picks the concrete host link and bus transport for the configured
//! profile. The gateway loop only ever sees the two capabilities.

use crate::settings::{BusKind, Profile, Settings};
use tracing::info;
use transport::{
    BusIngress, BusTransport, Frame, HostIngress, HostLink, LoopbackBus, Producer, SerialLink,
    StdioLink, TransportError,
};

#[cfg(target_os = "linux")]
use transport::SocketCanBus;

/// Host link chosen at startup
pub enum AnyHost {
    Serial(SerialLink),
    Stdio(StdioLink),
}

impl AnyHost {
    /// Open the host link for `settings.profile`
    pub fn open(settings: &Settings, ingress: HostIngress) -> Result<(Self, Producer), TransportError> {
        match settings.profile {
            Profile::Hardware => {
                let (link, producer) =
                    SerialLink::open(&settings.serial.device, settings.serial.baud_rate, ingress)?;
                info!("Host link ready on {}", link.device());
                Ok((AnyHost::Serial(link), producer))
            }
            Profile::Simulation => {
                let (link, producer) = StdioLink::open(ingress)?;
                Ok((AnyHost::Stdio(link), producer))
            }
        }
    }
}

impl HostLink for AnyHost {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        match self {
            AnyHost::Serial(link) => link.send_line(line).await,
            AnyHost::Stdio(link) => link.send_line(line).await,
        }
    }
}

/// Bus transport chosen at startup
pub enum AnyBus {
    #[cfg(target_os = "linux")]
    SocketCan(SocketCanBus),
    Loopback(LoopbackBus),
}

impl AnyBus {
    /// Open the bus transport for `settings.bus`
    pub fn open(settings: &Settings, ingress: BusIngress) -> Result<(Self, Producer), TransportError> {
        match settings.bus.kind {
            BusKind::SocketCan => Self::open_socketcan(settings, ingress),
            BusKind::Loopback => {
                info!("Using loopback bus");
                let (bus, _handle) = LoopbackBus::with_echo(ingress);
                Ok((AnyBus::Loopback(bus), Producer::idle("loopback")))
            }
        }
    }

    #[cfg(target_os = "linux")]
    fn open_socketcan(
        settings: &Settings,
        ingress: BusIngress,
    ) -> Result<(Self, Producer), TransportError> {
        let (bus, producer) = SocketCanBus::open(settings.bus.interface(settings.profile), ingress)?;
        info!("Bus ready on {}", bus.interface());
        Ok((AnyBus::SocketCan(bus), producer))
    }

    #[cfg(not(target_os = "linux"))]
    fn open_socketcan(
        _settings: &Settings,
        _ingress: BusIngress,
    ) -> Result<(Self, Producer), TransportError> {
        Err(TransportError::Bus(
            "SocketCAN is only available on Linux".to_string(),
        ))
    }
}

impl BusTransport for AnyBus {
    async fn transmit(&mut self, frame: &Frame) -> Result<(), TransportError> {
        match self {
            #[cfg(target_os = "linux")]
            AnyBus::SocketCan(bus) => bus.transmit(frame).await,
            AnyBus::Loopback(bus) => bus.transmit(frame).await,
        }
    }
}
