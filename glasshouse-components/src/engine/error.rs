use glasshouse_core::units::AirChangeRate;
use thiserror::Error;

/// Errors raised by [`ThermalEngine`](super::ThermalEngine) at call time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("time step must be strictly positive, got {seconds} s")]
    NonPositiveTimeStep { seconds: f64 },

    #[error("vent command {vent} exceeds the design maximum {design}")]
    VentAboveDesign {
        vent: AirChangeRate,
        design: AirChangeRate,
    },

    #[error("thermal state is not finite")]
    NonFiniteState,
}
