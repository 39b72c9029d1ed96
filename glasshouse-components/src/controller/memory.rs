use uom::{ConstZero, si::f64::Time};

use super::SwitchState;

/// Time elapsed since the heater last switched on and last switched off.
///
/// `None` means no such transition has been seen since the controller was
/// (re-)initialized, which satisfies any dwell requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerTimers {
    pub since_on: Option<Time>,
    pub since_off: Option<Time>,
}

impl ControllerTimers {
    /// Whether the heater has been on for at least `min_on`.
    #[must_use]
    pub fn on_dwell_elapsed(&self, min_on: Time) -> bool {
        self.since_on.is_none_or(|elapsed| elapsed >= min_on)
    }

    /// Whether the heater has been off for at least `min_off`.
    #[must_use]
    pub fn off_dwell_elapsed(&self, min_off: Time) -> bool {
        self.since_off.is_none_or(|elapsed| elapsed >= min_off)
    }

    /// Restarts the timer matching a transition into `state`.
    pub(crate) fn record_transition(&mut self, state: SwitchState) {
        match state {
            SwitchState::On => self.since_on = Some(Time::ZERO),
            SwitchState::Off => self.since_off = Some(Time::ZERO),
        }
    }

    /// Moves every running timer forward by `step`.
    pub(crate) fn advance(&mut self, step: Time) {
        for timer in [&mut self.since_on, &mut self.since_off] {
            if let Some(elapsed) = timer {
                *elapsed += step;
            }
        }
    }
}

/// Everything the controller remembers between decisions.
///
/// The default is the state of a freshly initialized controller: heater off
/// and no transitions seen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerMemory {
    pub heater: SwitchState,
    pub timers: ControllerTimers,
}
