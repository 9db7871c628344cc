//! Vehicle Signal Decoding
//!
//! Maps received body-CAN frames to semantic vehicle-state reports:
//! ignition, illumination, reverse gear, parking brake, door and
//! steering-wheel buttons. Level signals are debounced so the host only
//! hears about transitions.

mod buttons;
mod classifier;
mod config;
mod error;
mod latch;
mod signal;

pub use buttons::{SteeringButton, STEERING_WHEEL_ID};
pub use classifier::BusClassifier;
pub use config::SignalConfig;
pub use error::ConfigError;
pub use latch::DebounceLatches;
pub use signal::{IgnitionMode, Signal};
