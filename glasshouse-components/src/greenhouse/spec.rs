use glasshouse_core::{
    constraint::{ConstraintError, StrictlyPositive},
    units::{AirChangeRate, ThermalResistance},
};
use uom::si::{
    angle::degree,
    f64::{Angle, HeatTransfer, Length, Power, TemperatureInterval},
    heat_transfer::watt_per_square_meter_kelvin,
    length::foot,
    temperature_interval::kelvin as delta_kelvin,
};

/// Site coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: Angle,
    pub longitude: Angle,
}

impl Location {
    #[must_use]
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude: Angle::new::<degree>(latitude_deg),
            longitude: Angle::new::<degree>(longitude_deg),
        }
    }
}

/// An envelope surface's insulation, as the user knows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resistance {
    /// An imperial R-value in ft²·°F·h/BTU, as printed on insulation.
    Ip(f64),
    /// An overall heat transfer coefficient.
    UValue(HeatTransfer),
}

impl Resistance {
    /// Converts to an SI area-specific resistance.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value is not strictly positive.
    pub fn to_si(self, r_ip_to_si: f64) -> Result<ThermalResistance, ConstraintError> {
        let u_value = match self {
            Self::Ip(r) => {
                let r = StrictlyPositive::new(r)?.into_inner();
                HeatTransfer::new::<watt_per_square_meter_kelvin>(r_ip_to_si / r)
            }
            Self::UValue(u) => StrictlyPositive::new(u)?.into_inner(),
        };
        Ok(u_value.recip())
    }
}

/// The user-facing description of a greenhouse.
///
/// Lengths are plan dimensions of a gable house with fully glazed walls and
/// a curved roof. [`GreenhouseSpec::default`] is a 37'8" × 18'11" house with
/// 8 ft sidewalls and a 12 ft ridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreenhouseSpec {
    pub location: Location,
    pub length: Length,
    pub width: Length,
    /// Height at the ridge.
    pub ridge_height: Length,
    pub sidewall_height: Length,
    /// Azimuth the main wall faces, clockwise from north.
    pub orientation: Angle,
    /// Tilt of the glazing used for solar transposition (90° is vertical).
    pub surface_tilt: Angle,
    pub wall: Resistance,
    pub roof: Resistance,
    pub floor: Resistance,
    pub footings: u32,
    /// Infiltration with every vent closed.
    pub leak: AirChangeRate,
    /// Exchange rate with every vent fully open.
    pub design_vent: AirChangeRate,
    /// Inside-outside difference the heater is sized for.
    pub design_temperature_difference: TemperatureInterval,
    /// Nominal heater input power; sized from design loads when `None`.
    pub heater_power: Option<Power>,
}

impl Default for GreenhouseSpec {
    fn default() -> Self {
        Self {
            location: Location::new(40.4406, -79.9959),
            length: Length::new::<foot>(37.6666),
            width: Length::new::<foot>(18.95),
            ridge_height: Length::new::<foot>(12.0),
            sidewall_height: Length::new::<foot>(8.0),
            orientation: Angle::new::<degree>(135.0),
            surface_tilt: Angle::new::<degree>(90.0),
            wall: Resistance::Ip(3.0),
            roof: Resistance::Ip(1.8),
            floor: Resistance::Ip(8.0),
            footings: 8,
            leak: AirChangeRate::from_const(0.30),
            design_vent: AirChangeRate::from_const(2.0),
            design_temperature_difference: TemperatureInterval::new::<delta_kelvin>(25.0),
            heater_power: None,
        }
    }
}
