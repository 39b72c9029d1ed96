//! Unit helpers layered on top of `uom`.
//!
//! `uom` covers almost every quantity the greenhouse model needs. This module
//! fills the remaining gaps:
//!
//! - [`TemperatureOps::minus`] for signed differences of absolute temperatures.
//! - [`ThermalResistance`] and [`TemperatureRate`] aliases for derived units
//!   `uom` does not name.
//! - [`AirChangeRate`] for ventilation and infiltration expressed in air
//!   changes per hour.

use std::fmt;

use uom::{
    si::{
        Quantity, ISQ, SI,
        f64::{TemperatureInterval, ThermodynamicTemperature, Volume, VolumeRate},
        temperature_interval::kelvin as delta_kelvin,
        thermodynamic_temperature::kelvin as abs_kelvin,
        volume::cubic_meter,
        volume_rate::cubic_meter_per_second,
    },
    typenum::{N1, P1, P3, Z0},
};

use crate::constraint::ConstraintError;

/// Temperature rate of change, K/s in SI.
pub type TemperatureRate = Quantity<ISQ<Z0, Z0, N1, Z0, P1, Z0, Z0>, SI<f64>, f64>;

/// Area-specific thermal resistance (R-value), m²·K/W in SI.
///
/// The reciprocal of a U-value. Dividing an area by a resistance yields a
/// thermal conductance.
pub type ThermalResistance = Quantity<ISQ<Z0, N1, P3, Z0, P1, Z0, Z0>, SI<f64>, f64>;

/// Seconds in one hour, for converting air changes per hour.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Extension method for `ThermodynamicTemperature` to compute a temperature difference.
pub trait TemperatureOps {
    /// Computes the signed difference `self - other`.
    ///
    /// A `TemperatureInterval` (a temperature change) is distinct from a
    /// `ThermodynamicTemperature` (a specific temperature value), and `uom`
    /// does not subtract absolute temperatures directly.
    fn minus(self, other: Self) -> TemperatureInterval;
}

impl TemperatureOps for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }
}

/// An outdoor-air exchange rate, in air changes per hour (ACH).
///
/// Guaranteed finite and non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct AirChangeRate(f64);

impl AirChangeRate {
    /// No exchange at all.
    pub const ZERO: Self = Self(0.0);

    /// Creates a rate from a value in air changes per hour.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value is negative or not finite.
    pub fn per_hour(ach: f64) -> Result<Self, ConstraintError> {
        if ach.is_nan() {
            Err(ConstraintError::NotANumber)
        } else if ach < 0.0 {
            Err(ConstraintError::Negative)
        } else if ach.is_infinite() {
            Err(ConstraintError::AboveMaximum)
        } else {
            Ok(Self(ach))
        }
    }

    /// Creates a rate from a literal, checked at compile time when used in a
    /// `const` context.
    ///
    /// # Panics
    ///
    /// Panics if `ach` is negative or not finite.
    #[must_use]
    pub const fn from_const(ach: f64) -> Self {
        assert!(ach.is_finite() && ach >= 0.0, "air change rate must be finite and non-negative");
        Self(ach)
    }

    /// Returns the rate in air changes per hour.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns the volumetric flow that exchanges `volume` at this rate.
    #[must_use]
    pub fn volume_rate(self, volume: Volume) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_second>(
            volume.get::<cubic_meter>() * self.0 / SECONDS_PER_HOUR,
        )
    }

    /// Returns the larger of two rates.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 { other } else { self }
    }

    /// Returns the smaller of two rates.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }

    /// Restricts the rate to `[floor, ceiling]`.
    ///
    /// The floor wins if the bounds are inverted.
    #[must_use]
    pub fn clamp(self, floor: Self, ceiling: Self) -> Self {
        self.min(ceiling).max(floor)
    }
}

impl fmt::Display for AirChangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ACH", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        area::square_meter,
        f64::{Area, ThermalConductance},
        temperature_interval::degree_celsius as delta_celsius,
        thermal_conductance::watt_per_kelvin,
        thermodynamic_temperature::{degree_celsius, degree_fahrenheit},
    };

    #[test]
    fn subtract_temperatures() {
        let t1 = ThermodynamicTemperature::new::<abs_kelvin>(300.0);
        let t2 = ThermodynamicTemperature::new::<abs_kelvin>(310.0);

        assert_relative_eq!(t2.minus(t1).get::<delta_kelvin>(), 10.0);
        assert_relative_eq!(t1.minus(t2).get::<delta_celsius>(), -10.0);

        // 25°C and 77°F are the same temperature.
        let t_in_c = ThermodynamicTemperature::new::<degree_celsius>(25.0);
        let t_in_f = ThermodynamicTemperature::new::<degree_fahrenheit>(77.0);
        assert_relative_eq!(
            t_in_f.minus(t_in_c).get::<delta_celsius>(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn area_over_resistance_is_conductance() {
        let area = Area::new::<square_meter>(10.0);
        let u: ThermalConductance = area / (area / ThermalConductance::new::<watt_per_kelvin>(5.0));
        assert_relative_eq!(u.get::<watt_per_kelvin>(), 5.0);
    }

    #[test]
    fn air_change_rate_validation() {
        assert!(AirChangeRate::per_hour(0.3).is_ok());
        assert_eq!(AirChangeRate::per_hour(-0.1), Err(ConstraintError::Negative));
        assert_eq!(
            AirChangeRate::per_hour(f64::NAN),
            Err(ConstraintError::NotANumber)
        );
        assert_eq!(
            AirChangeRate::per_hour(f64::INFINITY),
            Err(ConstraintError::AboveMaximum)
        );
    }

    #[test]
    fn air_change_rate_volume_flow() {
        let ach = AirChangeRate::per_hour(2.0).unwrap();
        let flow = ach.volume_rate(Volume::new::<cubic_meter>(180.0));
        assert_relative_eq!(flow.get::<cubic_meter_per_second>(), 0.1);
    }

    #[test]
    fn air_change_rate_clamp() {
        let floor = AirChangeRate::per_hour(0.3).unwrap();
        let ceiling = AirChangeRate::per_hour(2.0).unwrap();

        assert_eq!(AirChangeRate::ZERO.clamp(floor, ceiling), floor);
        assert_eq!(
            AirChangeRate::per_hour(5.0).unwrap().clamp(floor, ceiling),
            ceiling
        );
        let mid = AirChangeRate::per_hour(1.2).unwrap();
        assert_eq!(mid.clamp(floor, ceiling), mid);
    }

    #[test]
    fn const_rates() {
        const LEAK: AirChangeRate = AirChangeRate::from_const(0.3);
        assert_eq!(LEAK, AirChangeRate::per_hour(0.3).unwrap());
    }

    #[test]
    #[should_panic(expected = "finite and non-negative")]
    fn const_rate_rejects_negative() {
        let _ = AirChangeRate::from_const(-1.0);
    }
}
