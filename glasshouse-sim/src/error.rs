use glasshouse_components::{
    controller::ControllerConfigError, engine::EngineError, forecast::ForecastError,
    greenhouse::GeometryError, tariff::TariffError,
};
use glasshouse_core::constraint::ConstraintError;
use thiserror::Error;

/// Errors raised while loading or converting simulation inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration file")]
    Toml(#[from] toml::de::Error),

    #[error("invalid forecast file")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` is invalid: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error("the {surface} sets both an R-value and a U-value")]
    ConflictingResistance { surface: &'static str },

    #[error("forecast record {index} mixes solar inputs: {reason}")]
    Solar { index: usize, reason: &'static str },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Controller(#[from] ControllerConfigError),

    #[error(transparent)]
    Tariff(#[from] TariffError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl ConfigError {
    pub(crate) fn field(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::Invalid { field, source }
    }
}

/// Errors raised while running a simulation.
///
/// A forecast shorter than the controller's horizon is not an error; the
/// look-ahead is truncated and the step is reported as such.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("controller configuration rejected")]
    Controller(#[from] ControllerConfigError),

    #[error("thermal engine failed at step {step}")]
    Engine {
        step: usize,
        #[source]
        source: EngineError,
    },
}
