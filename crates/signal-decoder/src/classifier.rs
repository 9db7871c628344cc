//! Bus Frame Classifier

use crate::buttons::{SteeringButton, STEERING_WHEEL_ID};
use crate::config::SignalConfig;
use crate::latch::DebounceLatches;
use host_protocol::{Response, ResponseKind};
use tracing::{debug, trace};
use transport::Frame;

/// Turns received frames into host reports
///
/// Owns the debounce latches; the identifier table is passed in so the
/// command dispatcher can keep mutating it between frames.
#[derive(Debug, Default)]
pub struct BusClassifier {
    latches: DebounceLatches,
}

impl BusClassifier {
    /// Create a classifier with power-on latches
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one frame into at most one report.
    ///
    /// Steering-wheel frames report every recognized press. Otherwise the
    /// frame belongs to the first signal bound to its identifier, which
    /// reports only when the decoded state differs from its latch.
    pub fn classify(&mut self, frame: &Frame, config: &SignalConfig) -> Option<Response> {
        if frame.id() == STEERING_WHEEL_ID {
            return Self::classify_button(frame);
        }

        let signal = config.signal_for(frame.id())?;
        let state = signal.decode(frame)?;
        if !self.latches.update(signal, state) {
            return None;
        }
        debug!("{} -> {}", signal.key(), signal.state_label(state));
        Some(Response::new(
            signal.response_kind(),
            signal.state_label(state),
        ))
    }

    fn classify_button(frame: &Frame) -> Option<Response> {
        let code = frame.first_byte()?;
        match SteeringButton::from_code(code) {
            Some(button) => Some(Response::new(ResponseKind::Key, button.name())),
            None => {
                trace!("Unmapped steering-wheel code {:#04x}", code);
                None
            }
        }
    }

    /// Current latch states
    pub fn latches(&self) -> &DebounceLatches {
        &self.latches
    }

    /// Forget every reported state
    pub fn reset(&mut self) {
        self.latches.reset();
    }
}
