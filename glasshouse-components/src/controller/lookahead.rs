use uom::si::f64::{ThermodynamicTemperature, Time};

use crate::{
    engine::{ActuatorCommand, EngineError, ThermalEngine, ThermalState},
    forecast::ForecastSample,
};

/// How much of the requested horizon the forecast could cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookaheadCoverage {
    Full,
    /// The forecast ran out after `available` of `requested` steps.
    Truncated { requested: usize, available: usize },
}

/// The no-heat projection of the air temperature.
///
/// `projected[i]` is the air temperature after stepping through forecast
/// sample `i` with the heater off and only infiltration for ventilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookahead {
    pub projected: Vec<ThermodynamicTemperature>,
    pub coverage: LookaheadCoverage,
}

impl Lookahead {
    /// Projects `state` through up to `requested` samples of `forecast`.
    ///
    /// A forecast shorter than `requested` is used as far as it goes and
    /// reported as [`LookaheadCoverage::Truncated`].
    pub(crate) fn project(
        engine: &ThermalEngine<'_>,
        state: ThermalState,
        forecast: &[ForecastSample],
        requested: usize,
        step: Time,
    ) -> Result<Self, EngineError> {
        let idle = ActuatorCommand::idle(engine.config().leak());
        let samples = &forecast[..requested.min(forecast.len())];

        let mut state = state;
        let mut projected = Vec::with_capacity(samples.len());
        for sample in samples {
            state = engine.step(state, &idle, sample, step)?.state;
            projected.push(state.air);
        }

        let coverage = if projected.len() < requested {
            LookaheadCoverage::Truncated {
                requested,
                available: projected.len(),
            }
        } else {
            LookaheadCoverage::Full
        };

        Ok(Self {
            projected,
            coverage,
        })
    }

    /// The first `steps` projected temperatures, or fewer if the projection is short.
    #[must_use]
    pub fn lead_window(&self, steps: usize) -> &[ThermodynamicTemperature] {
        &self.projected[..steps.min(self.projected.len())]
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self.coverage, LookaheadCoverage::Truncated { .. })
    }
}
