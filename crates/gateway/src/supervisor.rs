//! Restart Supervisor
//!
//! Each cycle builds fresh plumbing and transports, runs the gateway and
//! decides what to do with the exit. Nothing survives a cycle except the
//! settings.

use crate::error::GatewayError;
use crate::fault::{self, FaultCause, FaultController};
use crate::gateway::{Exit, Gateway};
use crate::peripherals::{AnyBus, AnyHost};
use crate::settings::Settings;
use line_buffer::DEFAULT_CAPACITY;
use tracing::{error, info, warn};

/// Run gateway cycles until the host input ends
pub async fn supervise(settings: &Settings) -> Result<(), GatewayError> {
    let version = settings.profile.version();
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        info!("Starting cycle {} ({:?} profile)", cycle, settings.profile);

        match run_cycle(settings, &version).await {
            Exit::Shutdown => {
                info!("Gateway shut down after {} cycle(s)", cycle);
                return Ok(());
            }
            Exit::Restart(cause) => {
                warn!(
                    "Cycle {} ended ({}), restarting in {:?}",
                    cycle,
                    cause,
                    settings.recovery.restart_delay()
                );
                tokio::time::sleep(settings.recovery.restart_delay()).await;
            }
        }
    }
}

/// One power-on cycle; peripheral-init failures are recovered here
async fn run_cycle(settings: &Settings, version: &str) -> Exit {
    let (host_ingress, bus_ingress, ingress) = transport::ingress(DEFAULT_CAPACITY);
    let mut fault = FaultController::new(settings.recovery.flush_delay());

    let (mut host, host_producer) = match AnyHost::open(settings, host_ingress) {
        Ok(opened) => opened,
        Err(e) => {
            error!("Host link init failed: {}", e);
            let cause = fault::recover(
                &mut fault,
                FaultCause::PeripheralInit,
                None::<&mut AnyHost>,
                &mut [],
                || {},
            )
            .await;
            return Exit::Restart(cause);
        }
    };

    let (bus, bus_producer) = match AnyBus::open(settings, bus_ingress) {
        Ok(opened) => opened,
        Err(e) => {
            error!("Bus init failed: {}", e);
            let cause = fault::recover(
                &mut fault,
                FaultCause::PeripheralInit,
                Some(&mut host),
                &mut [host_producer],
                || {},
            )
            .await;
            return Exit::Restart(cause);
        }
    };

    let gateway = Gateway::new(
        bus,
        host,
        ingress,
        vec![host_producer, bus_producer],
        version,
        settings.recovery.flush_delay(),
    );
    gateway.run().await
}
