use glasshouse_core::{
    constraint::StrictlyPositive,
    units::{AirChangeRate, ThermalResistance},
};
use serde::Serialize;
use uom::si::{
    angle::degree,
    area::square_meter,
    f64::{
        Angle, Area, HeatCapacity, Length, Mass, MassDensity, Power, SpecificHeatCapacity,
        TemperatureInterval, ThermalConductance, Time, Volume,
    },
    length::meter,
    mass::kilogram,
    power::watt,
    thermal_conductance::watt_per_kelvin,
    volume::cubic_meter,
};

use super::{GeometryError, GreenhouseSpec, Location, MaterialTable};

/// Envelope surface areas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAreas {
    pub wall: Area,
    pub roof: Area,
    pub floor: Area,
    /// Area that admits sunlight.
    pub glazing: Area,
}

/// Area-specific thermal resistances of the envelope surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResistances {
    pub wall: ThermalResistance,
    pub roof: ThermalResistance,
    pub floor: ThermalResistance,
}

/// The resolved, immutable physical description of a greenhouse.
///
/// Built once by [`GeometryConfig::resolve`] and shared read-only by the
/// thermal engine and the controller. Every area, resistance, and capacity is
/// strictly positive, and `design_vent >= leak`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    pub(crate) location: Location,
    pub(crate) length: Length,
    pub(crate) width: Length,
    pub(crate) ridge_height: Length,
    pub(crate) orientation: Angle,
    pub(crate) surface_tilt: Angle,
    pub(crate) areas: SurfaceAreas,
    pub(crate) resistances: SurfaceResistances,
    pub(crate) volume: Volume,
    pub(crate) leak: AirChangeRate,
    pub(crate) design_vent: AirChangeRate,
    pub(crate) mass: Mass,
    pub(crate) mass_specific_heat: SpecificHeatCapacity,
    pub(crate) mass_coupling: ThermalConductance,
    pub(crate) heater_power: Power,
    pub(crate) heater_efficiency: f64,
    pub(crate) air_density: MassDensity,
    pub(crate) air_specific_heat: SpecificHeatCapacity,
    pub(crate) solar_transmittance: f64,
    pub(crate) solar_to_mass: f64,
    pub(crate) albedo: f64,
    pub(crate) wind_coefficient: f64,
    pub(crate) max_substep: Time,
    pub(crate) design_temperature_difference: TemperatureInterval,
}

impl GeometryConfig {
    /// Derives every physical constant of the greenhouse from user inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if a geometric input or material constant
    /// is out of range, if the sidewall is taller than the ridge, or if the
    /// design ventilation rate is below the leakage rate.
    pub fn resolve(spec: &GreenhouseSpec, materials: &MaterialTable) -> Result<Self, GeometryError> {
        materials.validate()?;

        let length = StrictlyPositive::new(spec.length)
            .map_err(GeometryError::field("length"))?
            .into_inner();
        let width = StrictlyPositive::new(spec.width)
            .map_err(GeometryError::field("width"))?
            .into_inner();
        let ridge = StrictlyPositive::new(spec.ridge_height)
            .map_err(GeometryError::field("ridge_height"))?
            .into_inner();
        let sidewall = StrictlyPositive::new(spec.sidewall_height)
            .map_err(GeometryError::field("sidewall_height"))?
            .into_inner();
        if sidewall > ridge {
            return Err(GeometryError::SidewallAboveRidge {
                sidewall_m: sidewall.get::<meter>(),
                ridge_m: ridge.get::<meter>(),
            });
        }
        if spec.design_vent < spec.leak {
            return Err(GeometryError::DesignVentBelowLeak {
                design: spec.design_vent,
                leak: spec.leak,
            });
        }

        let floor: Area = length * width;
        let wall: Area = 2.0 * (length + width) * sidewall;
        let roof = floor * materials.arch_factor;
        let areas = SurfaceAreas {
            wall,
            roof,
            floor,
            glazing: wall + roof,
        };
        let volume: Volume = floor * ((ridge - sidewall) / 2.0 + sidewall);

        let resistances = SurfaceResistances {
            wall: spec
                .wall
                .to_si(materials.r_ip_to_si)
                .map_err(GeometryError::field("wall"))?,
            roof: spec
                .roof
                .to_si(materials.r_ip_to_si)
                .map_err(GeometryError::field("roof"))?,
            floor: spec
                .floor
                .to_si(materials.r_ip_to_si)
                .map_err(GeometryError::field("floor"))?,
        };

        let concrete: Mass =
            f64::from(spec.footings) * materials.footing_volume * materials.concrete_density;
        let soil: Mass =
            floor * materials.soil_depth * materials.soil_density * materials.soil_coupling;
        let mass = StrictlyPositive::new(concrete + soil + materials.auxiliary_mass)
            .map_err(GeometryError::field("mass"))?
            .into_inner();

        let design_temperature_difference =
            StrictlyPositive::new(spec.design_temperature_difference)
                .map_err(GeometryError::field("design_temperature_difference"))?
                .into_inner();

        let mut config = Self {
            location: spec.location,
            length,
            width,
            ridge_height: ridge,
            orientation: spec.orientation,
            surface_tilt: spec.surface_tilt,
            areas,
            resistances,
            volume,
            leak: spec.leak,
            design_vent: spec.design_vent,
            mass,
            mass_specific_heat: materials.mass_specific_heat,
            mass_coupling: materials.mass_coupling,
            heater_power: Power::new::<watt>(0.0),
            heater_efficiency: materials.heater_efficiency,
            air_density: materials.air_density,
            air_specific_heat: materials.air_specific_heat,
            solar_transmittance: materials.solar_transmittance,
            solar_to_mass: materials.solar_to_mass,
            albedo: materials.albedo,
            wind_coefficient: materials.wind_coefficient,
            max_substep: materials.max_substep,
            design_temperature_difference,
        };

        config.heater_power = match spec.heater_power {
            Some(power) => StrictlyPositive::new(power)
                .map_err(GeometryError::field("heater_power"))?
                .into_inner(),
            None => config.design_heater_power(materials.heater_safety_factor),
        };

        Ok(config)
    }

    /// Heater input needed to hold the design temperature difference with
    /// every vent open, oversized by `safety` and truncated to whole watts.
    fn design_heater_power(&self, safety: f64) -> Power {
        let dt = self.design_temperature_difference;
        let conduction: Power = self.envelope_ua() * dt;
        let ventilation: Power = self.air_exchange_conductance(self.design_vent) * dt;
        Power::new::<watt>(((conduction + ventilation) * safety).get::<watt>().trunc())
    }

    /// Sum of area over resistance for the wall, roof, and floor.
    #[must_use]
    pub fn envelope_ua(&self) -> ThermalConductance {
        let SurfaceAreas {
            wall, roof, floor, ..
        } = self.areas;
        let r = &self.resistances;
        wall / r.wall + roof / r.roof + floor / r.floor
    }

    /// Conductance of exchanging the whole air volume with outdoors at `rate`.
    #[must_use]
    pub fn air_exchange_conductance(&self, rate: AirChangeRate) -> ThermalConductance {
        rate.volume_rate(self.volume) * self.air_density * self.air_specific_heat
    }

    /// Heat capacity of the air volume.
    #[must_use]
    pub fn air_heat_capacity(&self) -> HeatCapacity {
        self.volume * self.air_density * self.air_specific_heat
    }

    /// Heat capacity of the lumped thermal mass.
    #[must_use]
    pub fn mass_heat_capacity(&self) -> HeatCapacity {
        self.mass * self.mass_specific_heat
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn areas(&self) -> SurfaceAreas {
        self.areas
    }

    #[must_use]
    pub fn resistances(&self) -> SurfaceResistances {
        self.resistances
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[must_use]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Infiltration with every vent closed; the floor of any vent command.
    #[must_use]
    pub fn leak(&self) -> AirChangeRate {
        self.leak
    }

    /// Exchange rate with every vent fully open; the ceiling of any vent command.
    #[must_use]
    pub fn design_vent(&self) -> AirChangeRate {
        self.design_vent
    }

    /// Nominal heater input power.
    #[must_use]
    pub fn heater_power(&self) -> Power {
        self.heater_power
    }

    #[must_use]
    pub fn summary(&self) -> GreenhouseSummary {
        GreenhouseSummary {
            latitude_deg: self.location.latitude.get::<degree>(),
            longitude_deg: self.location.longitude.get::<degree>(),
            length_m: self.length.get::<meter>(),
            width_m: self.width.get::<meter>(),
            ridge_height_m: self.ridge_height.get::<meter>(),
            floor_area_m2: self.areas.floor.get::<square_meter>(),
            glazing_area_m2: self.areas.glazing.get::<square_meter>(),
            volume_m3: self.volume.get::<cubic_meter>(),
            thermal_mass_kg: self.mass.get::<kilogram>(),
            ua_envelope_w_per_k: self.envelope_ua().get::<watt_per_kelvin>(),
            heater_capacity_w: self.heater_power.get::<watt>(),
        }
    }
}

/// Headline figures of a resolved greenhouse, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GreenhouseSummary {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub ridge_height_m: f64,
    pub floor_area_m2: f64,
    pub glazing_area_m2: f64,
    pub volume_m3: f64,
    pub thermal_mass_kg: f64,
    pub ua_envelope_w_per_k: f64,
    pub heater_capacity_w: f64,
}
