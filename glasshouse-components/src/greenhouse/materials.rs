use glasshouse_core::constraint::{NonNegative, StrictlyPositive, UnitInterval};
use uom::si::{
    f64::{Length, Mass, MassDensity, SpecificHeatCapacity, ThermalConductance, Time, Volume},
    length::meter,
    mass::kilogram,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductance::watt_per_kelvin,
    time::minute,
    volume::cubic_foot,
};

use super::GeometryError;

/// Named physical constants used to resolve a greenhouse configuration.
///
/// Built once at startup and passed by reference into
/// [`GeometryConfig::resolve`](super::GeometryConfig::resolve).
/// [`MaterialTable::default`] carries the reference values; override fields
/// with struct update syntax when a site differs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialTable {
    /// Density of footing concrete.
    pub concrete_density: MassDensity,
    /// Density of the soil under the floor.
    pub soil_density: MassDensity,
    /// Fraction of the soil mass thermally linked to the house.
    pub soil_coupling: f64,
    /// Plants, benches, and other contents.
    pub auxiliary_mass: Mass,
    /// Specific heat of the lumped mass (concrete and soil).
    pub mass_specific_heat: SpecificHeatCapacity,
    /// Extra roof area of a curved roof relative to its plan area.
    pub arch_factor: f64,
    /// Fraction of incident irradiance that passes the glazing as heat.
    pub solar_transmittance: f64,
    /// Ground reflectance used when transposing irradiance components.
    pub albedo: f64,
    /// Divide an IP R-value (ft²·°F·h/BTU) by this to get m²·K/W.
    pub r_ip_to_si: f64,
    pub air_density: MassDensity,
    pub air_specific_heat: SpecificHeatCapacity,
    /// Conductance between the air node and the lumped mass node.
    pub mass_coupling: ThermalConductance,
    /// Concrete volume of a single footing.
    pub footing_volume: Volume,
    /// Depth of soil considered part of the thermal mass.
    pub soil_depth: Length,
    /// Fraction of heater input power delivered to the air.
    pub heater_efficiency: f64,
    /// Oversizing applied when the heater capacity is derived from design loads.
    pub heater_safety_factor: f64,
    /// Fractional increase of envelope losses per m/s of wind.
    pub wind_coefficient: f64,
    /// Fraction of the solar gain absorbed directly by the mass node.
    pub solar_to_mass: f64,
    /// Longest explicit sub-step the engine takes inside one call.
    pub max_substep: Time,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self {
            concrete_density: MassDensity::new::<kilogram_per_cubic_meter>(2400.0),
            soil_density: MassDensity::new::<kilogram_per_cubic_meter>(1600.0),
            soil_coupling: 0.30,
            auxiliary_mass: Mass::new::<kilogram>(200.0),
            mass_specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(920.0),
            arch_factor: 1.15,
            solar_transmittance: 0.78,
            albedo: 0.20,
            r_ip_to_si: 5.678_263,
            air_density: MassDensity::new::<kilogram_per_cubic_meter>(1.225),
            air_specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(1005.0),
            mass_coupling: ThermalConductance::new::<watt_per_kelvin>(1500.0),
            footing_volume: Volume::new::<cubic_foot>(12.0),
            soil_depth: Length::new::<meter>(0.61),
            heater_efficiency: 0.90,
            heater_safety_factor: 1.60,
            wind_coefficient: 0.05,
            solar_to_mass: 0.0,
            max_substep: Time::new::<minute>(15.0),
        }
    }
}

impl MaterialTable {
    /// Checks every constant against its physical range.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Invalid`] naming the first offending constant.
    pub fn validate(&self) -> Result<(), GeometryError> {
        StrictlyPositive::new(self.concrete_density)
            .map_err(GeometryError::field("concrete_density"))?;
        StrictlyPositive::new(self.soil_density).map_err(GeometryError::field("soil_density"))?;
        UnitInterval::new(self.soil_coupling).map_err(GeometryError::field("soil_coupling"))?;
        StrictlyPositive::new(self.mass_specific_heat)
            .map_err(GeometryError::field("mass_specific_heat"))?;
        StrictlyPositive::new(self.arch_factor).map_err(GeometryError::field("arch_factor"))?;
        UnitInterval::new(self.solar_transmittance)
            .map_err(GeometryError::field("solar_transmittance"))?;
        UnitInterval::new(self.albedo).map_err(GeometryError::field("albedo"))?;
        StrictlyPositive::new(self.r_ip_to_si).map_err(GeometryError::field("r_ip_to_si"))?;
        StrictlyPositive::new(self.air_density).map_err(GeometryError::field("air_density"))?;
        StrictlyPositive::new(self.air_specific_heat)
            .map_err(GeometryError::field("air_specific_heat"))?;
        StrictlyPositive::new(self.mass_coupling).map_err(GeometryError::field("mass_coupling"))?;
        StrictlyPositive::new(self.heater_efficiency)
            .map_err(GeometryError::field("heater_efficiency"))?;
        UnitInterval::new(self.heater_efficiency)
            .map_err(GeometryError::field("heater_efficiency"))?;
        StrictlyPositive::new(self.heater_safety_factor)
            .map_err(GeometryError::field("heater_safety_factor"))?;
        UnitInterval::new(self.solar_to_mass).map_err(GeometryError::field("solar_to_mass"))?;
        StrictlyPositive::new(self.max_substep).map_err(GeometryError::field("max_substep"))?;

        // Zero is allowed for these: no footings' worth of concrete, no soil,
        // no contents, or a wind-insensitive envelope.
        NonNegative::new(self.auxiliary_mass)
            .map_err(GeometryError::field("auxiliary_mass"))?;
        NonNegative::new(self.footing_volume)
            .map_err(GeometryError::field("footing_volume"))?;
        NonNegative::new(self.soil_depth)
            .map_err(GeometryError::field("soil_depth"))?;
        NonNegative::new(self.wind_coefficient)
            .map_err(GeometryError::field("wind_coefficient"))?;

        Ok(())
    }
}
