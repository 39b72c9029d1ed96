use glasshouse_core::constraint::{ConstraintError, NonNegative, UnitInterval};
use jiff::civil::DateTime;
use uom::si::f64::{Ratio, ThermodynamicTemperature, Velocity};

use super::{ForecastError, SolarInput};

/// One hourly forecast record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSample {
    /// Local civil time at the start of the hour.
    pub time: DateTime,
    /// Outside dry-bulb temperature.
    pub outside: ThermodynamicTemperature,
    /// Ground temperature below the slab; the floor sees `outside` when absent.
    pub ground: Option<ThermodynamicTemperature>,
    pub solar: SolarInput,
    pub wind_speed: Option<Velocity>,
    pub relative_humidity: Option<Ratio>,
    /// Fraction of the sky covered by cloud, used to scale clear-sky components.
    pub cloud_cover: Option<Ratio>,
}

impl ForecastSample {
    /// A sample with only the required fields set.
    #[must_use]
    pub fn new(time: DateTime, outside: ThermodynamicTemperature, solar: SolarInput) -> Self {
        Self {
            time,
            outside,
            ground: None,
            solar,
            wind_speed: None,
            relative_humidity: None,
            cloud_cover: None,
        }
    }

    /// The boundary temperature seen by the floor.
    #[must_use]
    pub fn floor_boundary(&self) -> ThermodynamicTemperature {
        self.ground.unwrap_or(self.outside)
    }

    pub(super) fn validate(&self, index: usize) -> Result<(), ForecastError> {
        let non_finite = |field: &'static str| ForecastError::NonFinite { index, field };
        let invalid = |field: &'static str| {
            move |source: ConstraintError| ForecastError::Invalid {
                index,
                field,
                source,
            }
        };

        if !self.outside.is_finite() {
            return Err(non_finite("outside"));
        }
        if self.ground.is_some_and(|t| !t.is_finite()) {
            return Err(non_finite("ground"));
        }
        if let Some(field) = self.solar.non_finite_field() {
            return Err(non_finite(field));
        }
        if let Some(wind) = self.wind_speed {
            if !wind.is_finite() {
                return Err(non_finite("wind_speed"));
            }
            NonNegative::new(wind).map_err(invalid("wind_speed"))?;
        }
        if let Some(humidity) = self.relative_humidity {
            UnitInterval::new(humidity).map_err(invalid("relative_humidity"))?;
        }
        if let Some(cloud) = self.cloud_cover {
            UnitInterval::new(cloud).map_err(invalid("cloud_cover"))?;
        }
        Ok(())
    }
}
