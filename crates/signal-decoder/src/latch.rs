//! Debounce Latches

use crate::signal::{Signal, SIGNAL_COUNT};

/// Last reported state of each debounced signal (power-on: all off)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceLatches {
    states: [bool; SIGNAL_COUNT],
}

impl DebounceLatches {
    /// Fresh latches, everything off
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported state
    pub fn get(&self, signal: Signal) -> bool {
        self.states[signal.index()]
    }

    /// Record `state`; returns `true` when it differs from the latch
    pub fn update(&mut self, signal: Signal, state: bool) -> bool {
        let latch = &mut self.states[signal.index()];
        if *latch == state {
            return false;
        }
        *latch = state;
        true
    }

    /// Back to power-on state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_reports_transitions_only() {
        let mut latches = DebounceLatches::new();
        assert!(!latches.update(Signal::Park, false));
        assert!(latches.update(Signal::Park, true));
        assert!(!latches.update(Signal::Park, true));
        assert!(latches.get(Signal::Park));
        assert!(!latches.get(Signal::Door));
    }

    #[test]
    fn test_reset() {
        let mut latches = DebounceLatches::new();
        latches.update(Signal::Ignition, true);
        latches.reset();
        assert_eq!(latches, DebounceLatches::new());
    }
}
