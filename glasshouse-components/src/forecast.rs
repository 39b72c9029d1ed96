//! Hourly weather and solar forecasts.
//!
//! The forecast is an external input: an ordered record produced by a weather
//! client and only ever read here. The engine consumes one
//! [`ForecastSample`] per step and the controller reads a contiguous window of
//! samples for its look-ahead.

mod error;
mod sample;
mod solar;

pub use error::ForecastError;
pub use sample::ForecastSample;
pub use solar::{SolarInput, SunPosition, clear_sky_transmittance};

/// A validated, time-ordered sequence of forecast samples.
///
/// Holds at least one sample, with strictly increasing timestamps and finite
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    samples: Vec<ForecastSample>,
}

impl Forecast {
    /// Validates and wraps `samples`.
    ///
    /// # Errors
    ///
    /// Returns a [`ForecastError`] if `samples` is empty, if any timestamp
    /// does not strictly follow its predecessor, or if a sample carries a
    /// non-finite or out-of-range value.
    pub fn new(samples: Vec<ForecastSample>) -> Result<Self, ForecastError> {
        if samples.is_empty() {
            return Err(ForecastError::Empty);
        }
        for (index, sample) in samples.iter().enumerate() {
            sample.validate(index)?;
        }
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(ForecastError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0].time,
                    current: pair[1].time,
                });
            }
        }
        Ok(Self { samples })
    }

    #[must_use]
    pub fn samples(&self) -> &[ForecastSample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no samples, which construction never allows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Up to `len` samples starting at `start`.
    ///
    /// The window is cut short at the end of the forecast, and is empty when
    /// `start` is past the end.
    #[must_use]
    pub fn window(&self, start: usize, len: usize) -> &[ForecastSample] {
        let start = start.min(self.samples.len());
        let end = start.saturating_add(len).min(self.samples.len());
        &self.samples[start..end]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastSample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a Forecast {
    type Item = &'a ForecastSample;
    type IntoIter = std::slice::Iter<'a, ForecastSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
