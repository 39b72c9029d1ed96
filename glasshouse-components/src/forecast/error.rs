use glasshouse_core::constraint::ConstraintError;
use jiff::civil::DateTime;
use thiserror::Error;

/// Errors raised while validating a [`Forecast`](super::Forecast).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("forecast contains no samples")]
    Empty,

    #[error("sample {index} at {current} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        previous: DateTime,
        current: DateTime,
    },

    #[error("sample {index} has a non-finite `{field}`")]
    NonFinite { index: usize, field: &'static str },

    #[error("sample {index} has an invalid `{field}`: {source}")]
    Invalid {
        index: usize,
        field: &'static str,
        #[source]
        source: ConstraintError,
    },
}
