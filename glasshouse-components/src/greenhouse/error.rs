use glasshouse_core::{constraint::ConstraintError, units::AirChangeRate};
use thiserror::Error;

/// Errors raised while resolving a [`GeometryConfig`](super::GeometryConfig).
///
/// Every variant is a configuration error: fatal, raised at construction,
/// and never silently clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("`{field}` is invalid: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error("sidewall height ({sidewall_m} m) exceeds ridge height ({ridge_m} m)")]
    SidewallAboveRidge { sidewall_m: f64, ridge_m: f64 },

    #[error("design ventilation rate ({design}) is below the leakage rate ({leak})")]
    DesignVentBelowLeak {
        design: AirChangeRate,
        leak: AirChangeRate,
    },
}

impl GeometryError {
    /// Builds a closure that tags a [`ConstraintError`] with the offending field.
    pub(crate) fn field(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::Invalid { field, source }
    }
}
