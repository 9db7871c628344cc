//! Gateway Consumer Loop

use crate::dispatcher::{Action, CommandDispatcher};
use crate::fault::{self, FaultCause, FaultController};
use host_protocol::{Command, Response};
use signal_decoder::{BusClassifier, SignalConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, trace, warn};
use transport::{BusTransport, Frame, HostLink, Ingress, LinkEvent, Producer};

/// How a gateway run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Recovery finished; rebuild peripherals and start again
    Restart(FaultCause),
    /// Host input ended cleanly
    Shutdown,
}

/// Consumer side of one power-on cycle
///
/// Owns both transports, the signal configuration and the debounce
/// latches. Everything here is dropped when [`Gateway::run`] returns, so
/// a restart always begins from defaults.
pub struct Gateway<B, H> {
    bus: B,
    host: H,
    commands: host_protocol::CommandFramer,
    ready: Arc<Notify>,
    space: Arc<Notify>,
    frames: mpsc::Receiver<Frame>,
    events: mpsc::UnboundedReceiver<LinkEvent>,
    producers: Vec<Producer>,
    config: SignalConfig,
    classifier: BusClassifier,
    dispatcher: CommandDispatcher,
    fault: FaultController,
}

impl<B: BusTransport, H: HostLink> Gateway<B, H> {
    /// Assemble a gateway over opened transports
    ///
    /// # Arguments
    /// * `ingress` - Consumer side of the producers feeding this gateway
    /// * `producers` - Reader tasks to stop on recovery
    /// * `version` - String reported by `VER`
    /// * `flush_delay` - Pause after the final diagnostic line
    pub fn new(
        bus: B,
        host: H,
        ingress: Ingress,
        producers: Vec<Producer>,
        version: impl Into<String>,
        flush_delay: Duration,
    ) -> Self {
        Self {
            bus,
            host,
            commands: host_protocol::CommandFramer::new(ingress.bytes),
            ready: ingress.ready,
            space: ingress.space,
            frames: ingress.frames,
            events: ingress.events,
            producers,
            config: SignalConfig::default(),
            classifier: BusClassifier::new(),
            dispatcher: CommandDispatcher::new(version),
            fault: FaultController::new(flush_delay),
        }
    }

    /// Run until recovery or a clean end of host input
    pub async fn run(mut self) -> Exit {
        info!("Gateway starting ({})", self.dispatcher.version());

        if let Err(cause) = self.announce().await {
            return self.recover(cause).await;
        }

        loop {
            if let Err(cause) = self.drain_commands().await {
                return self.recover(cause).await;
            }

            tokio::select! {
                biased;

                Some(event) = self.events.recv() => {
                    let cause = match event {
                        LinkEvent::HostClosed => {
                            info!("Host input closed");
                            match self.drain_commands().await {
                                Ok(()) => return Exit::Shutdown,
                                Err(cause) => cause,
                            }
                        }
                        LinkEvent::HostFailed(e) => {
                            error!("Host link failed: {}", e);
                            FaultCause::HostLinkFailed
                        }
                        LinkEvent::BusFailed(e) => {
                            error!("Bus failed: {}", e);
                            FaultCause::BusFailed
                        }
                    };
                    return self.recover(cause).await;
                }
                Some(frame) = self.frames.recv() => {
                    if let Err(cause) = self.handle_frame(&frame).await {
                        return self.recover(cause).await;
                    }
                }
                _ = self.ready.notified() => {
                    trace!("Host bytes ready");
                }
            }
        }
    }

    async fn announce(&mut self) -> Result<(), FaultCause> {
        let version = Response::new(
            host_protocol::ResponseKind::Version,
            self.dispatcher.version(),
        );
        self.send(version).await?;
        self.send(Response::ok("INIT")).await
    }

    async fn drain_commands(&mut self) -> Result<(), FaultCause> {
        while let Some(command) = self.commands.next_command() {
            self.handle_command(&command).await?;
        }
        self.space.notify_one();
        Ok(())
    }

    async fn handle_command(&mut self, command: &Command) -> Result<(), FaultCause> {
        debug!("Command {}", command);
        match self.dispatcher.dispatch(command, &mut self.config) {
            Action::Respond(response) => self.send(response).await,
            Action::Transmit(frame) => self.bus.transmit(&frame).await.map_err(|e| {
                error!("Transmit of {} failed: {}", frame, e);
                FaultCause::TransmitFailed
            }),
            Action::Reset => {
                info!("Reset requested by host");
                Err(FaultCause::ResetRequested)
            }
            Action::None => Ok(()),
        }
    }

    async fn handle_frame(&mut self, frame: &Frame) -> Result<(), FaultCause> {
        trace!("RX {}", frame);
        match self.classifier.classify(frame, &self.config) {
            Some(response) => self.send(response).await,
            None => Ok(()),
        }
    }

    async fn send(&mut self, response: Response) -> Result<(), FaultCause> {
        self.host.send_line(&response.encode()).await.map_err(|e| {
            error!("Sending {} failed: {}", response, e);
            FaultCause::HostLinkFailed
        })
    }

    async fn recover(mut self, cause: FaultCause) -> Exit {
        let config = &mut self.config;
        let classifier = &mut self.classifier;
        let frames = &mut self.frames;
        let commands = &self.commands;
        let teardown = || {
            debug!(
                "Tearing down; framer discarded {} lines, line buffer rejected {} bytes",
                commands.framer().discarded_lines(),
                commands.overflow_count()
            );
            *config = SignalConfig::default();
            classifier.reset();
            frames.close();
            let dropped = std::iter::from_fn(|| frames.try_recv().ok()).count();
            if dropped > 0 {
                warn!("Dropped {} unprocessed frames", dropped);
            }
        };

        let cause = fault::recover(
            &mut self.fault,
            cause,
            Some(&mut self.host),
            &mut self.producers,
            teardown,
        )
        .await;
        Exit::Restart(cause)
    }
}
