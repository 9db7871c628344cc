//! Host Command Dispatcher

use host_protocol::{Command, CommandKind, ConfigRequest, ErrorCode, Response, ResponseKind};
use signal_decoder::{SignalConfig, SteeringButton, STEERING_WHEEL_ID};
use tracing::{debug, warn};
use transport::Frame;

/// What the gateway loop must do for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a response line
    Respond(Response),
    /// Put a frame on the bus
    Transmit(Frame),
    /// Run the reset recovery path
    Reset,
    /// Nothing to do
    None,
}

/// Maps parsed host commands to actions
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    version: String,
}

impl CommandDispatcher {
    /// Create a dispatcher reporting `version` for `VER`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Version string reported by `VER`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Decide the action for `command`; `CFG SET` updates `config` in place
    pub fn dispatch(&self, command: &Command, config: &mut SignalConfig) -> Action {
        let kind = match command.kind() {
            Ok(kind) => kind,
            Err(e) => {
                debug!("{}", e);
                return Action::Respond(Response::error(e.code()));
            }
        };

        match kind {
            CommandKind::Reset => Action::Reset,
            CommandKind::Key => Self::key(command.value()),
            CommandKind::Version => {
                Action::Respond(Response::new(ResponseKind::Version, self.version.as_str()))
            }
            CommandKind::Config => Action::Respond(Self::config(command.value(), config)),
        }
    }

    fn key(name: &str) -> Action {
        let Some(button) = SteeringButton::from_name(name) else {
            debug!("Ignoring unknown button {:?}", name);
            return Action::None;
        };

        match Frame::new(STEERING_WHEEL_ID, &[button.code()]) {
            Ok(frame) => Action::Transmit(frame),
            Err(e) => {
                warn!("Cannot build frame for {}: {}", button.name(), e);
                Action::None
            }
        }
    }

    fn config(value: &str, config: &mut SignalConfig) -> Response {
        let request = match ConfigRequest::parse(value) {
            Ok(request) => request,
            Err(e) => {
                debug!("{}", e);
                return Response::error(e.code());
            }
        };

        let result = match &request {
            ConfigRequest::Get { key } => config.get_key(key),
            ConfigRequest::Set { key, value } => config.set_key(key, *value),
        };

        match result {
            Ok((signal, id)) => {
                Response::new(ResponseKind::Config, format!("{}:{:#x}", signal.key(), id))
            }
            Err(e) => {
                debug!("Rejected {:?}: {}", request, e);
                Response::error(ErrorCode::InvalidConfig)
            }
        }
    }
}
