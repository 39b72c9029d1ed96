//! Predictive heating and ventilation control.
//!
//! [`PredictiveController`] decides, once per decision step, whether the
//! heater runs and how far the vents open. It projects the greenhouse forward
//! with the heater off through the same [`ThermalEngine`](crate::engine::ThermalEngine)
//! the simulation uses, applies hysteresis with a preheat lead time, and then
//! enforces minimum on and off dwell times.
//!
//! The controller itself is immutable. Its hysteresis state lives in an
//! explicit [`ControllerMemory`] value that each decision consumes and
//! returns. [`ControllerSession`] wraps the two for callers that prefer to
//! hold mutable state.

mod config;
mod decision;
mod error;
mod lookahead;
mod memory;
mod predictive;
mod session;
mod types;

pub use config::ControllerConfig;
pub use decision::{Decision, DecisionInput, HeatingReason, VentingReason};
pub use error::ControllerConfigError;
pub use lookahead::{Lookahead, LookaheadCoverage};
pub use memory::{ControllerMemory, ControllerTimers};
pub use predictive::PredictiveController;
pub use session::ControllerSession;
pub use types::SwitchState;
