//! Fault Controller
//!
//! Every fatal condition ends in the same sequence: stop the producers,
//! tell the host (best effort), give the line time to drain, tear the
//! transports down and restart from power-on state. There is no path back
//! to `Running` other than a full restart.

use host_protocol::{ErrorCode, Response};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use transport::{HostLink, Producer};

/// Why recovery was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCause {
    /// Bus transmit failed
    TransmitFailed,
    /// Host link write or read failed
    HostLinkFailed,
    /// Bus reader failed
    BusFailed,
    /// A transport could not be opened
    PeripheralInit,
    /// Host sent `RST`
    ResetRequested,
}

impl FaultCause {
    /// Final diagnostic line for the host
    pub fn notification(&self) -> Response {
        match self {
            FaultCause::ResetRequested => Response::ok("RST"),
            _ => Response::error(ErrorCode::CanError),
        }
    }
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FaultCause::TransmitFailed => "bus transmit failed",
            FaultCause::HostLinkFailed => "host link failed",
            FaultCause::BusFailed => "bus reader failed",
            FaultCause::PeripheralInit => "peripheral init failed",
            FaultCause::ResetRequested => "reset requested",
        };
        f.write_str(text)
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultState {
    Running,
    /// Producers being stopped, host being notified
    Faulting(FaultCause),
    /// Flushing and tearing down
    Recovering(FaultCause),
    /// Ready to restart; terminal for this controller
    Restarting(FaultCause),
}

/// One step of the recovery sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStep {
    StopProducers,
    NotifyHost(Response),
    Flush(Duration),
    Teardown,
    Restart(FaultCause),
}

/// Recovery state machine
#[derive(Debug)]
pub struct FaultController {
    state: FaultState,
    flush_delay: Duration,
    pending: VecDeque<RecoveryStep>,
}

impl FaultController {
    /// Create a controller in the running state
    pub fn new(flush_delay: Duration) -> Self {
        Self {
            state: FaultState::Running,
            flush_delay,
            pending: VecDeque::new(),
        }
    }

    /// Enter recovery. Returns `false` if recovery is already under way.
    pub fn trigger(&mut self, cause: FaultCause) -> bool {
        if self.state != FaultState::Running {
            debug!("Ignoring {} while {:?}", cause, self.state);
            return false;
        }

        warn!("Entering recovery: {}", cause);
        self.state = FaultState::Faulting(cause);
        self.pending = VecDeque::from([
            RecoveryStep::StopProducers,
            RecoveryStep::NotifyHost(cause.notification()),
            RecoveryStep::Flush(self.flush_delay),
            RecoveryStep::Teardown,
            RecoveryStep::Restart(cause),
        ]);
        true
    }

    /// Take the next recovery step, advancing the state
    pub fn next_step(&mut self) -> Option<RecoveryStep> {
        let step = self.pending.pop_front()?;
        let cause = self.cause()?;
        self.state = match step {
            RecoveryStep::StopProducers | RecoveryStep::NotifyHost(_) => {
                FaultState::Faulting(cause)
            }
            RecoveryStep::Flush(_) | RecoveryStep::Teardown => FaultState::Recovering(cause),
            RecoveryStep::Restart(_) => FaultState::Restarting(cause),
        };
        Some(step)
    }

    /// Current state
    pub fn state(&self) -> FaultState {
        self.state
    }

    /// Cause of the recovery in progress
    pub fn cause(&self) -> Option<FaultCause> {
        match self.state {
            FaultState::Running => None,
            FaultState::Faulting(cause)
            | FaultState::Recovering(cause)
            | FaultState::Restarting(cause) => Some(cause),
        }
    }
}

/// Run the full recovery sequence for `cause` and return the restart cause.
///
/// `host` is `None` when the host link never came up. `teardown` releases
/// whatever state the caller owns besides the producers.
pub async fn recover<H: HostLink>(
    fault: &mut FaultController,
    cause: FaultCause,
    mut host: Option<&mut H>,
    producers: &mut [Producer],
    teardown: impl FnOnce(),
) -> FaultCause {
    fault.trigger(cause);
    let mut teardown = Some(teardown);

    while let Some(step) = fault.next_step() {
        match step {
            RecoveryStep::StopProducers => {
                for producer in producers.iter_mut() {
                    producer.stop();
                }
            }
            RecoveryStep::NotifyHost(response) => match host.as_deref_mut() {
                Some(host) => {
                    if let Err(e) = host.send_line(&response.encode()).await {
                        error!("Could not report {} to host: {}", response, e);
                    }
                }
                None => debug!("No host link to report {}", response),
            },
            RecoveryStep::Flush(delay) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            RecoveryStep::Teardown => {
                if let Some(teardown) = teardown.take() {
                    teardown();
                }
            }
            RecoveryStep::Restart(cause) => {
                info!("Restarting after {}", cause);
                return cause;
            }
        }
    }

    fault.cause().unwrap_or(cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transport::MemoryLink;

    #[test]
    fn test_step_sequence() {
        let mut fault = FaultController::new(Duration::from_millis(100));
        assert_eq!(fault.next_step(), None);
        assert!(fault.trigger(FaultCause::TransmitFailed));

        let mut states = Vec::new();
        let mut steps = Vec::new();
        while let Some(step) = fault.next_step() {
            steps.push(step);
            states.push(fault.state());
        }

        let cause = FaultCause::TransmitFailed;
        assert_eq!(
            steps,
            vec![
                RecoveryStep::StopProducers,
                RecoveryStep::NotifyHost(Response::error(ErrorCode::CanError)),
                RecoveryStep::Flush(Duration::from_millis(100)),
                RecoveryStep::Teardown,
                RecoveryStep::Restart(cause),
            ]
        );
        assert_eq!(
            states,
            vec![
                FaultState::Faulting(cause),
                FaultState::Faulting(cause),
                FaultState::Recovering(cause),
                FaultState::Recovering(cause),
                FaultState::Restarting(cause),
            ]
        );
    }

    #[test]
    fn test_first_cause_wins() {
        let mut fault = FaultController::new(Duration::ZERO);
        assert!(fault.trigger(FaultCause::ResetRequested));
        assert!(!fault.trigger(FaultCause::BusFailed));
        assert_eq!(fault.cause(), Some(FaultCause::ResetRequested));

        while fault.next_step().is_some() {}
        assert!(!fault.trigger(FaultCause::BusFailed));
        assert_eq!(
            fault.state(),
            FaultState::Restarting(FaultCause::ResetRequested)
        );
    }

    #[test]
    fn test_notifications() {
        assert_eq!(
            FaultCause::ResetRequested.notification().to_string(),
            "!OK:RST"
        );
        for cause in [
            FaultCause::TransmitFailed,
            FaultCause::HostLinkFailed,
            FaultCause::BusFailed,
            FaultCause::PeripheralInit,
        ] {
            assert_eq!(cause.notification().to_string(), "!ERR:CAN_ERROR");
        }
    }

    #[tokio::test]
    async fn test_recover_notifies_and_tears_down() {
        let (mut link, handle) = MemoryLink::new();
        let mut fault = FaultController::new(Duration::ZERO);
        let mut torn_down = false;

        let cause = recover(
            &mut fault,
            FaultCause::ResetRequested,
            Some(&mut link),
            &mut [Producer::idle("test")],
            || torn_down = true,
        )
        .await;

        assert_eq!(cause, FaultCause::ResetRequested);
        assert!(torn_down);
        assert_eq!(handle.lines(), vec!["!OK:RST\n"]);
    }

    #[tokio::test]
    async fn test_recover_survives_dead_host() {
        let (mut link, handle) = MemoryLink::new();
        handle.fail_send(true);
        let mut fault = FaultController::new(Duration::ZERO);

        let cause = recover(
            &mut fault,
            FaultCause::HostLinkFailed,
            Some(&mut link),
            &mut [],
            || {},
        )
        .await;

        assert_eq!(cause, FaultCause::HostLinkFailed);
        assert!(handle.lines().is_empty());
        assert_eq!(
            fault.state(),
            FaultState::Restarting(FaultCause::HostLinkFailed)
        );
    }

    #[tokio::test]
    async fn test_recover_without_host() {
        let mut fault = FaultController::new(Duration::ZERO);
        let cause = recover(
            &mut fault,
            FaultCause::PeripheralInit,
            None::<&mut MemoryLink>,
            &mut [],
            || {},
        )
        .await;
        assert_eq!(cause, FaultCause::PeripheralInit);
    }
}
