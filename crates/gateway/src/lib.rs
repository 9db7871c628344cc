//! CAN-box Gateway
//!
//! Wires the host protocol, signal decoding and transports into the
//! running gateway: one consumer loop per power-on cycle, a fault
//! controller that always ends in a restart, and a supervisor that builds
//! the transports for the configured profile.

mod dispatcher;
mod error;
mod fault;
mod gateway;
mod peripherals;
mod settings;
mod supervisor;

pub use dispatcher::{Action, CommandDispatcher};
pub use error::GatewayError;
pub use fault::{recover, FaultCause, FaultController, FaultState, RecoveryStep};
pub use gateway::{Exit, Gateway};
pub use peripherals::{AnyBus, AnyHost};
pub use settings::{BusKind, BusSettings, Profile, RecoverySettings, SerialSettings, Settings};
pub use supervisor::supervise;

use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber
///
/// Logs go to stderr; stdout belongs to the host protocol in simulation.
pub fn init_logging(settings: &Settings) -> Result<(), GatewayError> {
    let parsed = settings.log_level.parse::<Level>();
    let builder = FmtSubscriber::builder()
        .with_max_level(parsed.as_ref().copied().unwrap_or(Level::INFO))
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if settings.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| GatewayError::Logging(e.to_string()))?;

    if parsed.is_err() {
        warn!("Unknown log level {:?}, using info", settings.log_level);
    }
    Ok(())
}
