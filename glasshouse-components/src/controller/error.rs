use glasshouse_core::{constraint::ConstraintError, units::AirChangeRate};
use thiserror::Error;

/// Errors raised while building a [`PredictiveController`](super::PredictiveController).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerConfigError {
    #[error("`{field}` is invalid: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error("lead time of {lead_time_h} h is longer than the {horizon_h} h look-ahead horizon")]
    LeadTimeBeyondHorizon { lead_time_h: f64, horizon_h: f64 },

    #[error("maximum vent rate {vent_max} exceeds the greenhouse design rate {design}")]
    VentMaxAboveDesign {
        vent_max: AirChangeRate,
        design: AirChangeRate,
    },

    #[error("maximum vent rate {vent_max} is below the leakage rate {leak}")]
    VentMaxBelowLeak {
        vent_max: AirChangeRate,
        leak: AirChangeRate,
    },

    #[error("night purge rate {purge} exceeds the maximum vent rate {vent_max}")]
    PurgeAboveVentMax {
        purge: AirChangeRate,
        vent_max: AirChangeRate,
    },
}

impl ControllerConfigError {
    pub(crate) fn field(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::Invalid { field, source }
    }
}
