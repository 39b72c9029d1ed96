use serde::Serialize;

use crate::{
    engine::{ActuatorCommand, ThermalState},
    forecast::ForecastSample,
};

use super::{ControllerMemory, Lookahead};

/// Everything a single decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'f> {
    pub state: ThermalState,
    /// Forecast from the current hour onward; `forecast[0]` is "now".
    pub forecast: &'f [ForecastSample],
    pub memory: ControllerMemory,
}

/// Why the heater ended up in its commanded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingReason {
    /// Air is below the lower switching point.
    Reactive,
    /// The no-heat projection breaches the low band within the lead time.
    Preheat,
    /// Air is above the upper switching point.
    Satisfied,
    /// Inside the deadband; previous state kept.
    Hold,
    /// An off request was overridden by the minimum on time.
    MinOnDwell,
    /// An on request was overridden by the minimum off time.
    MinOffDwell,
}

/// Which term set the vent rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VentingReason {
    /// Infiltration only.
    Baseline,
    /// Proportional to the current excess over the high band.
    Reactive,
    /// Proportional to a projected excess within the lead time.
    Predictive,
    /// Shedding stored heat to cooler night air.
    NightPurge,
}

/// The outcome of one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub command: ActuatorCommand,
    /// Memory to pass into the next decision.
    pub memory: ControllerMemory,
    pub heating: HeatingReason,
    pub venting: VentingReason,
    pub lookahead: Lookahead,
}
