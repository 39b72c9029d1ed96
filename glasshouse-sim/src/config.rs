//! The TOML run configuration.
//!
//! Every field is a plain number whose name carries its unit. Omitted fields
//! keep the defaults of the typed configs they override, so an empty file is
//! a valid configuration of the reference greenhouse.

use glasshouse_components::{
    controller::ControllerConfig,
    engine::ThermalState,
    greenhouse::{GreenhouseSpec, Location, MaterialTable, Resistance},
    tariff::{DailySchedule, Segment, TariffPeriod, TimeOfUseTariff},
};
use glasshouse_core::units::AirChangeRate;
use jiff::civil::Time as TimeOfDay;
use serde::Deserialize;
use uom::si::{
    angle::degree,
    f64::{
        Angle, HeatTransfer, Length, Mass, MassDensity, Power, SpecificHeatCapacity,
        TemperatureInterval, ThermalConductance, ThermodynamicTemperature, Time, Volume,
    },
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    mass::kilogram,
    mass_density::kilogram_per_cubic_meter,
    power::watt,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    temperature_interval::kelvin as delta_kelvin,
    thermal_conductance::watt_per_kelvin,
    thermodynamic_temperature::degree_celsius,
    time::{hour, minute},
    volume::cubic_meter,
};

use crate::ConfigError;

/// Ventilation fan draw at full opening when the file does not set one.
pub const DEFAULT_FAN_POWER_W: f64 = 500.0;

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub greenhouse: GreenhouseSection,
    pub materials: MaterialsSection,
    pub controller: ControllerSection,
    pub tariff: Option<TariffSection>,
    pub initial: Option<InitialSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GreenhouseSection {
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub length_m: Option<f64>,
    pub width_m: Option<f64>,
    pub ridge_height_m: Option<f64>,
    pub sidewall_height_m: Option<f64>,
    pub orientation_deg: Option<f64>,
    pub surface_tilt_deg: Option<f64>,
    pub wall_r_ip: Option<f64>,
    pub wall_u_w_per_m2_k: Option<f64>,
    pub roof_r_ip: Option<f64>,
    pub roof_u_w_per_m2_k: Option<f64>,
    pub floor_r_ip: Option<f64>,
    pub floor_u_w_per_m2_k: Option<f64>,
    pub footings: Option<u32>,
    pub leak_ach: Option<f64>,
    pub design_vent_ach: Option<f64>,
    pub design_delta_t_k: Option<f64>,
    pub heater_w: Option<f64>,
    pub fan_power_w: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialsSection {
    pub concrete_density_kg_m3: Option<f64>,
    pub soil_density_kg_m3: Option<f64>,
    pub soil_coupling: Option<f64>,
    pub auxiliary_mass_kg: Option<f64>,
    pub mass_specific_heat_j_kg_k: Option<f64>,
    pub arch_factor: Option<f64>,
    pub solar_transmittance: Option<f64>,
    pub albedo: Option<f64>,
    pub air_density_kg_m3: Option<f64>,
    pub air_specific_heat_j_kg_k: Option<f64>,
    pub mass_coupling_w_k: Option<f64>,
    pub footing_volume_m3: Option<f64>,
    pub soil_depth_m: Option<f64>,
    pub heater_efficiency: Option<f64>,
    pub heater_safety_factor: Option<f64>,
    pub wind_coefficient_per_m_s: Option<f64>,
    pub solar_to_mass: Option<f64>,
    pub max_substep_min: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerSection {
    pub setpoint_c: Option<f64>,
    pub deadband_k: Option<f64>,
    pub safety_margin_k: Option<f64>,
    pub buffer_k: Option<f64>,
    pub lead_time_h: Option<f64>,
    pub horizon_h: Option<f64>,
    pub step_h: Option<f64>,
    pub min_on_time_h: Option<f64>,
    pub min_off_time_h: Option<f64>,
    pub vent_max_ach: Option<f64>,
    pub vent_gain_ach_per_k: Option<f64>,
    pub night_purge_ach: Option<f64>,
    pub night_solar_threshold_w: Option<f64>,
    pub hot_outside_scale: Option<f64>,
}

/// A tariff replacing the default one entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffSection {
    pub fallback: TariffPeriod,
    #[serde(default)]
    pub weekday: Vec<TariffSegment>,
    #[serde(default)]
    pub weekend: Vec<TariffSegment>,
}

/// One priced range of the day; `end` before `start` wraps past midnight.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffSegment {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub name: String,
    pub price_per_kwh: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialSection {
    pub air_c: f64,
    /// Defaults to the air temperature.
    pub mass_c: Option<f64>,
}

/// Typed inputs for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    pub greenhouse: GreenhouseSpec,
    pub materials: MaterialTable,
    pub controller: ControllerConfig,
    pub tariff: TimeOfUseTariff,
    pub fan_power: Power,
    pub initial: ThermalState,
}

impl ConfigFile {
    /// Parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed TOML or unknown fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Converts the file into typed configs.
    ///
    /// Range checks that need the resolved geometry happen later, when the
    /// simulation is built.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for values the typed configs cannot hold.
    pub fn into_setup(self) -> Result<SimulationSetup, ConfigError> {
        let controller = self.controller.apply(ControllerConfig::default())?;
        let setpoint_c = controller.setpoint.get::<degree_celsius>();
        let initial = self.initial.map_or_else(
            || ThermalState::uniform(celsius(setpoint_c)),
            |initial| ThermalState {
                air: celsius(initial.air_c),
                mass: celsius(initial.mass_c.unwrap_or(initial.air_c)),
            },
        );
        let tariff = match self.tariff {
            Some(section) => section.into_tariff()?,
            None => TimeOfUseTariff::default(),
        };

        Ok(SimulationSetup {
            greenhouse: self.greenhouse.apply(GreenhouseSpec::default())?,
            materials: self.materials.apply(MaterialTable::default()),
            controller,
            tariff,
            fan_power: Power::new::<watt>(
                self.greenhouse.fan_power_w.unwrap_or(DEFAULT_FAN_POWER_W),
            ),
            initial,
        })
    }
}

impl SimulationSetup {
    /// Replaces the initial air temperature, leaving the mass where it was.
    #[must_use]
    pub fn with_initial_air(mut self, air_c: f64) -> Self {
        self.initial.air = celsius(air_c);
        self
    }
}

impl GreenhouseSection {
    fn apply(&self, mut spec: GreenhouseSpec) -> Result<GreenhouseSpec, ConfigError> {
        if self.latitude_deg.is_some() || self.longitude_deg.is_some() {
            spec.location = Location::new(
                self.latitude_deg
                    .unwrap_or(spec.location.latitude.get::<degree>()),
                self.longitude_deg
                    .unwrap_or(spec.location.longitude.get::<degree>()),
            );
        }
        set(&mut spec.length, self.length_m, Length::new::<meter>);
        set(&mut spec.width, self.width_m, Length::new::<meter>);
        set(&mut spec.ridge_height, self.ridge_height_m, Length::new::<meter>);
        set(&mut spec.sidewall_height, self.sidewall_height_m, Length::new::<meter>);
        set(&mut spec.orientation, self.orientation_deg, Angle::new::<degree>);
        set(&mut spec.surface_tilt, self.surface_tilt_deg, Angle::new::<degree>);

        spec.wall = resistance("wall", spec.wall, self.wall_r_ip, self.wall_u_w_per_m2_k)?;
        spec.roof = resistance("roof", spec.roof, self.roof_r_ip, self.roof_u_w_per_m2_k)?;
        spec.floor = resistance("floor", spec.floor, self.floor_r_ip, self.floor_u_w_per_m2_k)?;

        if let Some(footings) = self.footings {
            spec.footings = footings;
        }
        if let Some(ach) = self.leak_ach {
            spec.leak = AirChangeRate::per_hour(ach).map_err(ConfigError::field("leak_ach"))?;
        }
        if let Some(ach) = self.design_vent_ach {
            spec.design_vent =
                AirChangeRate::per_hour(ach).map_err(ConfigError::field("design_vent_ach"))?;
        }
        set(
            &mut spec.design_temperature_difference,
            self.design_delta_t_k,
            TemperatureInterval::new::<delta_kelvin>,
        );
        if let Some(watts) = self.heater_w {
            spec.heater_power = Some(Power::new::<watt>(watts));
        }
        Ok(spec)
    }
}

impl MaterialsSection {
    fn apply(&self, mut table: MaterialTable) -> MaterialTable {
        let density = MassDensity::new::<kilogram_per_cubic_meter>;
        let specific_heat = SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>;

        set(&mut table.concrete_density, self.concrete_density_kg_m3, density);
        set(&mut table.soil_density, self.soil_density_kg_m3, density);
        set(&mut table.soil_coupling, self.soil_coupling, identity);
        set(&mut table.auxiliary_mass, self.auxiliary_mass_kg, Mass::new::<kilogram>);
        set(&mut table.mass_specific_heat, self.mass_specific_heat_j_kg_k, specific_heat);
        set(&mut table.arch_factor, self.arch_factor, identity);
        set(&mut table.solar_transmittance, self.solar_transmittance, identity);
        set(&mut table.albedo, self.albedo, identity);
        set(&mut table.air_density, self.air_density_kg_m3, density);
        set(&mut table.air_specific_heat, self.air_specific_heat_j_kg_k, specific_heat);
        set(
            &mut table.mass_coupling,
            self.mass_coupling_w_k,
            ThermalConductance::new::<watt_per_kelvin>,
        );
        set(&mut table.footing_volume, self.footing_volume_m3, Volume::new::<cubic_meter>);
        set(&mut table.soil_depth, self.soil_depth_m, Length::new::<meter>);
        set(&mut table.heater_efficiency, self.heater_efficiency, identity);
        set(&mut table.heater_safety_factor, self.heater_safety_factor, identity);
        set(&mut table.wind_coefficient, self.wind_coefficient_per_m_s, identity);
        set(&mut table.solar_to_mass, self.solar_to_mass, identity);
        set(&mut table.max_substep, self.max_substep_min, Time::new::<minute>);
        table
    }
}

impl ControllerSection {
    fn apply(&self, mut config: ControllerConfig) -> Result<ControllerConfig, ConfigError> {
        let interval = TemperatureInterval::new::<delta_kelvin>;
        let hours = Time::new::<hour>;

        set(&mut config.setpoint, self.setpoint_c, celsius);
        set(&mut config.deadband, self.deadband_k, interval);
        set(&mut config.safety_margin, self.safety_margin_k, interval);
        set(&mut config.buffer, self.buffer_k, interval);
        set(&mut config.lead_time, self.lead_time_h, hours);
        set(&mut config.horizon, self.horizon_h, hours);
        set(&mut config.step, self.step_h, hours);
        set(&mut config.min_on_time, self.min_on_time_h, hours);
        set(&mut config.min_off_time, self.min_off_time_h, hours);
        if let Some(ach) = self.vent_max_ach {
            config.vent_max =
                AirChangeRate::per_hour(ach).map_err(ConfigError::field("vent_max_ach"))?;
        }
        set(&mut config.vent_gain, self.vent_gain_ach_per_k, identity);
        if let Some(ach) = self.night_purge_ach {
            config.night_purge =
                AirChangeRate::per_hour(ach).map_err(ConfigError::field("night_purge_ach"))?;
        }
        set(
            &mut config.night_solar_threshold,
            self.night_solar_threshold_w,
            Power::new::<watt>,
        );
        set(&mut config.hot_outside_scale, self.hot_outside_scale, identity);
        Ok(config)
    }
}

impl TariffSection {
    fn into_tariff(self) -> Result<TimeOfUseTariff, ConfigError> {
        let schedule = |segments: Vec<TariffSegment>| {
            DailySchedule::new(
                segments
                    .into_iter()
                    .map(|segment| Segment {
                        start: segment.start,
                        end: segment.end,
                        value: TariffPeriod::new(segment.name, segment.price_per_kwh),
                    })
                    .collect(),
            )
        };
        Ok(TimeOfUseTariff::new(
            schedule(self.weekday)?,
            schedule(self.weekend)?,
            self.fallback,
        )?)
    }
}

fn set<T>(target: &mut T, value: Option<f64>, convert: impl FnOnce(f64) -> T) {
    if let Some(value) = value {
        *target = convert(value);
    }
}

fn identity(value: f64) -> f64 {
    value
}

fn celsius(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(value)
}

fn resistance(
    surface: &'static str,
    current: Resistance,
    r_ip: Option<f64>,
    u_value: Option<f64>,
) -> Result<Resistance, ConfigError> {
    match (r_ip, u_value) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingResistance { surface }),
        (Some(r), None) => Ok(Resistance::Ip(r)),
        (None, Some(u)) => Ok(Resistance::UValue(
            HeatTransfer::new::<watt_per_square_meter_kelvin>(u),
        )),
        (None, None) => Ok(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use jiff::civil::date;

    #[test]
    fn empty_file_is_the_reference_setup() {
        let setup = ConfigFile::from_toml_str("").unwrap().into_setup().unwrap();

        assert_eq!(setup.greenhouse, GreenhouseSpec::default());
        assert_eq!(setup.materials, MaterialTable::default());
        assert_eq!(setup.controller, ControllerConfig::default());
        assert_eq!(setup.tariff, TimeOfUseTariff::default());
        assert_relative_eq!(setup.fan_power.get::<watt>(), DEFAULT_FAN_POWER_W);
        assert_relative_eq!(setup.initial.air.get::<degree_celsius>(), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn overrides_are_converted_from_display_units() {
        let text = r#"
            [greenhouse]
            length_m = 10.0
            wall_u_w_per_m2_k = 5.0
            leak_ach = 0.5
            heater_w = 12000.0

            [materials]
            auxiliary_mass_kg = 500.0
            max_substep_min = 5.0

            [controller]
            setpoint_c = 16.0
            lead_time_h = 2.0
            vent_max_ach = 1.5

            [initial]
            air_c = 12.0
            mass_c = 10.0
        "#;
        let setup = ConfigFile::from_toml_str(text).unwrap().into_setup().unwrap();

        assert_relative_eq!(setup.greenhouse.length.get::<meter>(), 10.0);
        assert_eq!(
            setup.greenhouse.wall,
            Resistance::UValue(HeatTransfer::new::<watt_per_square_meter_kelvin>(5.0))
        );
        assert_eq!(setup.greenhouse.roof, Resistance::Ip(1.8));
        assert_relative_eq!(setup.greenhouse.leak.get(), 0.5);
        assert_relative_eq!(setup.greenhouse.heater_power.unwrap().get::<watt>(), 12000.0);
        assert_relative_eq!(setup.materials.auxiliary_mass.get::<kilogram>(), 500.0);
        assert_relative_eq!(setup.materials.max_substep.get::<minute>(), 5.0);
        assert_relative_eq!(
            setup.controller.setpoint.get::<degree_celsius>(),
            16.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(setup.controller.lead_time.get::<hour>(), 2.0);
        assert_relative_eq!(setup.controller.vent_max.get(), 1.5);
        assert_relative_eq!(setup.initial.air.get::<degree_celsius>(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(setup.initial.mass.get::<degree_celsius>(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = ConfigFile::from_toml_str("[controller]\nsetpoint = 18.0\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn both_resistance_forms_conflict() {
        let text = "[greenhouse]\nroof_r_ip = 2.0\nroof_u_w_per_m2_k = 3.0\n";
        let result = ConfigFile::from_toml_str(text).unwrap().into_setup();
        assert!(matches!(
            result,
            Err(ConfigError::ConflictingResistance { surface: "roof" })
        ));
    }

    #[test]
    fn negative_exchange_rate_names_the_field() {
        let text = "[controller]\nnight_purge_ach = -1.0\n";
        let result = ConfigFile::from_toml_str(text).unwrap().into_setup();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "night_purge_ach",
                ..
            })
        ));
    }

    #[test]
    fn tariff_section_replaces_the_default() {
        let text = r#"
            [tariff]
            fallback = { name = "day", price_per_kwh = 0.2 }
            weekday = [
                { start = "22:00:00", end = "06:00:00", name = "night", price_per_kwh = 0.1 },
            ]
        "#;
        let setup = ConfigFile::from_toml_str(text).unwrap().into_setup().unwrap();

        // 2025-01-15 is a Wednesday, 2025-01-18 a Saturday.
        assert_eq!(setup.tariff.period_at(date(2025, 1, 15).at(2, 0, 0, 0)).name, "night");
        assert_eq!(setup.tariff.period_at(date(2025, 1, 15).at(12, 0, 0, 0)).name, "day");
        assert_eq!(setup.tariff.period_at(date(2025, 1, 18).at(2, 0, 0, 0)).name, "day");
    }

    #[test]
    fn overlapping_tariff_segments_are_rejected() {
        let text = r#"
            [tariff]
            fallback = { name = "day", price_per_kwh = 0.2 }
            weekday = [
                { start = "08:00:00", end = "12:00:00", name = "a", price_per_kwh = 0.1 },
                { start = "11:00:00", end = "13:00:00", name = "b", price_per_kwh = 0.1 },
            ]
        "#;
        let result = ConfigFile::from_toml_str(text).unwrap().into_setup();
        assert!(matches!(result, Err(ConfigError::Tariff(_))));
    }

    #[test]
    fn initial_air_override_keeps_the_mass() {
        let text = "[initial]\nair_c = 15.0\nmass_c = 14.0\n";
        let setup = ConfigFile::from_toml_str(text)
            .unwrap()
            .into_setup()
            .unwrap()
            .with_initial_air(9.0);
        assert_relative_eq!(setup.initial.air.get::<degree_celsius>(), 9.0, epsilon = 1e-9);
        assert_relative_eq!(setup.initial.mass.get::<degree_celsius>(), 14.0, epsilon = 1e-9);
    }
}
