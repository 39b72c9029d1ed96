use glasshouse_core::{
    constraint::{ConstraintError, NonNegative, StrictlyPositive, UnitInterval},
    units::AirChangeRate,
};
use uom::si::{
    f64::{Power, TemperatureInterval, ThermodynamicTemperature, Time},
    power::watt,
    ratio::ratio,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::degree_celsius,
    time::hour,
};

use crate::greenhouse::GeometryConfig;

use super::ControllerConfigError;

/// Tuning of the predictive controller.
///
/// All values are supplied up front; nothing in the decision logic falls back
/// to a hidden default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub setpoint: ThermodynamicTemperature,
    /// Full width of the hysteresis band centred on the setpoint.
    pub deadband: TemperatureInterval,
    /// Extra margin below the band that the no-heat projection must not cross.
    pub safety_margin: TemperatureInterval,
    /// Extra margin above the band before venting starts.
    pub buffer: TemperatureInterval,
    /// How far ahead a projected breach triggers preheating or early venting.
    pub lead_time: Time,
    /// Length of the no-heat look-ahead projection.
    pub horizon: Time,
    /// Interval between decisions, also the look-ahead step.
    pub step: Time,
    pub min_on_time: Time,
    pub min_off_time: Time,
    /// Highest vent rate the controller will command.
    pub vent_max: AirChangeRate,
    /// Proportional vent gain, in air changes per hour per kelvin of excess.
    pub vent_gain: f64,
    /// Vent rate used to shed heat at night when outside air is cooler.
    pub night_purge: AirChangeRate,
    /// Solar gain at or below which the sun counts as down.
    pub night_solar_threshold: Power,
    /// Factor applied to proportional venting when outside air is no cooler.
    pub hot_outside_scale: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            setpoint: ThermodynamicTemperature::new::<degree_celsius>(18.0),
            deadband: TemperatureInterval::new::<delta_kelvin>(3.0),
            safety_margin: TemperatureInterval::new::<delta_kelvin>(0.5),
            buffer: TemperatureInterval::new::<delta_kelvin>(5.0),
            lead_time: Time::new::<hour>(3.0),
            horizon: Time::new::<hour>(24.0),
            step: Time::new::<hour>(1.0),
            min_on_time: Time::new::<hour>(3.0),
            min_off_time: Time::new::<hour>(3.0),
            vent_max: AirChangeRate::from_const(2.0),
            vent_gain: 0.5,
            night_purge: AirChangeRate::from_const(0.5),
            night_solar_threshold: Power::new::<watt>(50.0),
            hot_outside_scale: 0.25,
        }
    }
}

impl ControllerConfig {
    /// Checks the tuning against itself and against the greenhouse.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerConfigError`] naming the first invalid value.
    pub fn validate(&self, geometry: &GeometryConfig) -> Result<(), ControllerConfigError> {
        for (field, finite) in [
            ("setpoint", self.setpoint.is_finite()),
            ("vent_gain", self.vent_gain.is_finite()),
        ] {
            if !finite {
                return Err(ControllerConfigError::Invalid {
                    field,
                    source: ConstraintError::NotANumber,
                });
            }
        }
        NonNegative::new(self.deadband).map_err(ControllerConfigError::field("deadband"))?;
        NonNegative::new(self.safety_margin)
            .map_err(ControllerConfigError::field("safety_margin"))?;
        NonNegative::new(self.buffer).map_err(ControllerConfigError::field("buffer"))?;
        NonNegative::new(self.lead_time).map_err(ControllerConfigError::field("lead_time"))?;
        NonNegative::new(self.horizon).map_err(ControllerConfigError::field("horizon"))?;
        StrictlyPositive::new(self.step).map_err(ControllerConfigError::field("step"))?;
        NonNegative::new(self.min_on_time).map_err(ControllerConfigError::field("min_on_time"))?;
        NonNegative::new(self.min_off_time)
            .map_err(ControllerConfigError::field("min_off_time"))?;
        NonNegative::new(self.vent_gain).map_err(ControllerConfigError::field("vent_gain"))?;
        NonNegative::new(self.night_solar_threshold)
            .map_err(ControllerConfigError::field("night_solar_threshold"))?;
        UnitInterval::new(self.hot_outside_scale)
            .map_err(ControllerConfigError::field("hot_outside_scale"))?;

        if self.lead_time > self.horizon {
            return Err(ControllerConfigError::LeadTimeBeyondHorizon {
                lead_time_h: self.lead_time.get::<hour>(),
                horizon_h: self.horizon.get::<hour>(),
            });
        }
        if self.vent_max > geometry.design_vent() {
            return Err(ControllerConfigError::VentMaxAboveDesign {
                vent_max: self.vent_max,
                design: geometry.design_vent(),
            });
        }
        if self.vent_max < geometry.leak() {
            return Err(ControllerConfigError::VentMaxBelowLeak {
                vent_max: self.vent_max,
                leak: geometry.leak(),
            });
        }
        if self.night_purge > self.vent_max {
            return Err(ControllerConfigError::PurgeAboveVentMax {
                purge: self.night_purge,
                vent_max: self.vent_max,
            });
        }
        Ok(())
    }

    /// Half the deadband, the distance from setpoint to either switching point.
    pub(crate) fn half_band(&self) -> TemperatureInterval {
        self.deadband * 0.5
    }

    /// Number of decision steps needed to cover `span`, rounded up.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn steps_in(&self, span: Time) -> usize {
        (span / self.step).get::<ratio>().ceil().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::greenhouse::{GreenhouseSpec, MaterialTable};

    fn geometry() -> GeometryConfig {
        GeometryConfig::resolve(&GreenhouseSpec::default(), &MaterialTable::default()).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ControllerConfig::default().validate(&geometry()).is_ok());
    }

    #[test]
    fn steps_round_up() {
        let config = ControllerConfig::default();
        assert_eq!(config.steps_in(Time::new::<hour>(2.0)), 2);
        assert_eq!(config.steps_in(Time::new::<hour>(2.5)), 3);
        assert_eq!(config.steps_in(Time::new::<hour>(0.0)), 0);
    }

    #[test]
    fn rejects_negative_deadband() {
        let config = ControllerConfig {
            deadband: TemperatureInterval::new::<delta_kelvin>(-1.0),
            ..ControllerConfig::default()
        };
        assert_eq!(
            config.validate(&geometry()),
            Err(ControllerConfigError::Invalid {
                field: "deadband",
                source: ConstraintError::Negative,
            })
        );
    }

    #[test]
    fn rejects_zero_step() {
        let config = ControllerConfig {
            step: Time::new::<hour>(0.0),
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(&geometry()),
            Err(ControllerConfigError::Invalid { field: "step", .. })
        ));
    }

    #[test]
    fn lead_time_must_fit_in_the_horizon() {
        let config = ControllerConfig {
            lead_time: Time::new::<hour>(6.0),
            horizon: Time::new::<hour>(4.0),
            ..ControllerConfig::default()
        };
        assert_eq!(
            config.validate(&geometry()),
            Err(ControllerConfigError::LeadTimeBeyondHorizon {
                lead_time_h: 6.0,
                horizon_h: 4.0,
            })
        );

        let equal = ControllerConfig {
            lead_time: Time::new::<hour>(4.0),
            ..config
        };
        assert!(equal.validate(&geometry()).is_ok());
    }

    #[test]
    fn vent_limits_respect_the_greenhouse() {
        let geometry = geometry();

        let too_high = ControllerConfig {
            vent_max: AirChangeRate::from_const(3.0),
            ..ControllerConfig::default()
        };
        assert!(matches!(
            too_high.validate(&geometry),
            Err(ControllerConfigError::VentMaxAboveDesign { .. })
        ));

        let too_low = ControllerConfig {
            vent_max: AirChangeRate::from_const(0.1),
            night_purge: AirChangeRate::ZERO,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            too_low.validate(&geometry),
            Err(ControllerConfigError::VentMaxBelowLeak { .. })
        ));

        let purge = ControllerConfig {
            vent_max: AirChangeRate::from_const(1.0),
            night_purge: AirChangeRate::from_const(1.5),
            ..ControllerConfig::default()
        };
        assert!(matches!(
            purge.validate(&geometry),
            Err(ControllerConfigError::PurgeAboveVentMax { .. })
        ));
    }

    #[test]
    fn rejects_scale_outside_unit_interval() {
        let config = ControllerConfig {
            hot_outside_scale: 1.5,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(&geometry()),
            Err(ControllerConfigError::Invalid {
                field: "hot_outside_scale",
                ..
            })
        ));
    }
}
