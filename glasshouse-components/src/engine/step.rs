use std::ops::AddAssign;

use glasshouse_core::{
    Component, TimeIntegrable,
    constraint::StrictlyPositive,
    units::{TemperatureOps, TemperatureRate},
};
use uom::{
    ConstZero,
    si::{
        f64::{Energy, Power, ThermalConductance, Time},
        ratio::ratio,
        time::second,
        velocity::meter_per_second,
    },
};

use crate::{forecast::ForecastSample, greenhouse::GeometryConfig};

use super::{ActuatorCommand, EngineError, ThermalState};

/// Steps a greenhouse's air and mass temperatures through time.
///
/// The engine borrows its [`GeometryConfig`] and holds no other state, so a
/// single instance can serve the live simulation and any number of
/// look-ahead projections.
///
/// Each call splits `dt` into equal explicit sub-steps no longer than the
/// configured maximum, holding the forecast sample and command fixed. Light
/// masses get more sub-steps: no sub-step may move a node by more than its
/// own time constant, which keeps every update a weighted average of the
/// temperatures around it. The air
/// node balances solar gain, delivered heat, envelope conduction, outdoor-air
/// exchange, and exchange with the mass node. Its effective capacity is the
/// air capacity plus the mass capacity. The mass node only exchanges heat
/// with the air (plus any solar fraction absorbed directly).
#[derive(Debug, Clone, Copy)]
pub struct ThermalEngine<'a> {
    config: &'a GeometryConfig,
}

/// Inputs to one engine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub state: ThermalState,
    pub command: ActuatorCommand,
    pub sample: ForecastSample,
    pub dt: Time,
}

/// The result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    pub state: ThermalState,
    /// Energy drawn by the heater over the step (input, not delivered).
    pub heater_energy: Energy,
    /// Mean heat flows over the step.
    pub flows: HeatFlows,
}

/// Heat flows at the air node, signed as named.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatFlows {
    pub solar_gain: Power,
    /// Heat delivered to the air, after heater losses.
    pub heater_output: Power,
    /// Loss through wall, roof, and floor.
    pub conduction_loss: Power,
    /// Loss to infiltration and ventilation air.
    pub air_exchange_loss: Power,
    /// Heat moving from the air into the mass.
    pub mass_uptake: Power,
}

impl HeatFlows {
    pub const ZERO: Self = Self {
        solar_gain: Power::ZERO,
        heater_output: Power::ZERO,
        conduction_loss: Power::ZERO,
        air_exchange_loss: Power::ZERO,
        mass_uptake: Power::ZERO,
    };

    /// Net heat into the air node.
    #[must_use]
    pub fn net_to_air(&self) -> Power {
        self.solar_gain + self.heater_output
            - self.conduction_loss
            - self.air_exchange_loss
            - self.mass_uptake
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            solar_gain: self.solar_gain * factor,
            heater_output: self.heater_output * factor,
            conduction_loss: self.conduction_loss * factor,
            air_exchange_loss: self.air_exchange_loss * factor,
            mass_uptake: self.mass_uptake * factor,
        }
    }
}

impl AddAssign for HeatFlows {
    fn add_assign(&mut self, rhs: Self) {
        self.solar_gain += rhs.solar_gain;
        self.heater_output += rhs.heater_output;
        self.conduction_loss += rhs.conduction_loss;
        self.air_exchange_loss += rhs.air_exchange_loss;
        self.mass_uptake += rhs.mass_uptake;
    }
}

impl<'a> ThermalEngine<'a> {
    #[must_use]
    pub fn new(config: &'a GeometryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &'a GeometryConfig {
        self.config
    }

    /// Advances `state` by `dt` under `command` and `sample`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if `dt` is not strictly positive, if the
    /// vent command exceeds the design ventilation rate, or if `state` is not
    /// finite.
    pub fn step(
        &self,
        state: ThermalState,
        command: &ActuatorCommand,
        sample: &ForecastSample,
        dt: Time,
    ) -> Result<StepOutput, EngineError> {
        let dt = StrictlyPositive::new(dt)
            .map_err(|_| EngineError::NonPositiveTimeStep {
                seconds: dt.get::<second>(),
            })?
            .into_inner();

        let config = self.config;
        if command.vent > config.design_vent {
            return Err(EngineError::VentAboveDesign {
                vent: command.vent,
                design: config.design_vent,
            });
        }
        if !state.is_finite() {
            return Err(EngineError::NonFiniteState);
        }

        let wind_factor = 1.0
            + config.wind_coefficient
                * sample
                    .wind_speed
                    .map_or(0.0, |speed| speed.get::<meter_per_second>());

        let areas = config.areas;
        let resistances = config.resistances;
        let above_ground: ThermalConductance =
            (areas.wall / resistances.wall + areas.roof / resistances.roof) * wind_factor;
        let ground_contact: ThermalConductance = areas.floor / resistances.floor;
        let exchange = config.air_exchange_conductance(config.leak.max(command.vent)) * wind_factor;

        let solar_gain = sample.solar.gain(config, sample.cloud_cover);
        let solar_to_mass = solar_gain * config.solar_to_mass;
        let heater_input = config.heater_power * command.heater_fraction();
        let heater_output = heater_input * config.heater_efficiency;

        let mass_capacity = config.mass_heat_capacity();
        let air_capacity = config.air_heat_capacity() + mass_capacity;

        let air_conductance = above_ground + ground_contact + exchange + config.mass_coupling;
        let substeps = substep_count(dt, config.max_substep)
            .max(substep_count(dt, air_capacity / air_conductance))
            .max(substep_count(dt, mass_capacity / config.mass_coupling));
        let h = dt / f64::from(substeps);

        let mut state = state;
        let mut totals = HeatFlows::ZERO;
        for _ in 0..substeps {
            let flows = HeatFlows {
                solar_gain,
                heater_output,
                conduction_loss: above_ground * state.air.minus(sample.outside)
                    + ground_contact * state.air.minus(sample.floor_boundary()),
                air_exchange_loss: exchange * state.air.minus(sample.outside),
                mass_uptake: config.mass_coupling * state.air.minus(state.mass),
            };

            let air_rate: TemperatureRate = (flows.net_to_air() - solar_to_mass) / air_capacity;
            let mass_rate: TemperatureRate = (flows.mass_uptake + solar_to_mass) / mass_capacity;

            state = ThermalState {
                air: state.air.step_by_time(air_rate, h),
                mass: state.mass.step_by_time(mass_rate, h),
            };
            totals += flows;
        }

        Ok(StepOutput {
            state,
            heater_energy: heater_input * dt,
            flows: totals.scaled(1.0 / f64::from(substeps)),
        })
    }
}

impl Component for ThermalEngine<'_> {
    type Input = StepInput;
    type Output = StepOutput;
    type Error = EngineError;

    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        self.step(input.state, &input.command, &input.sample, input.dt)
    }
}

/// Number of equal sub-steps needed to keep each one within `limit`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn substep_count(dt: Time, limit: Time) -> u32 {
    // Float-to-int casts saturate, so absurd steps cannot wrap.
    ((dt / limit).get::<ratio>().ceil() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use glasshouse_core::{constraint::UnitInterval, units::AirChangeRate};
    use jiff::civil::date;
    use uom::si::{
        energy::kilowatt_hour,
        f64::{Length, Mass, ThermodynamicTemperature, Velocity},
        length::meter,
        mass::kilogram,
        power::watt,
        thermodynamic_temperature::degree_celsius,
        time::{hour, minute},
    };

    use crate::{
        controller::SwitchState,
        forecast::SolarInput,
        greenhouse::{GreenhouseSpec, MaterialTable},
    };

    fn celsius(value: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_celsius>(value)
    }

    fn reference() -> GeometryConfig {
        GeometryConfig::resolve(&GreenhouseSpec::default(), &MaterialTable::default()).unwrap()
    }

    /// A small, light house that reacts quickly.
    fn light_house() -> GeometryConfig {
        let spec = GreenhouseSpec {
            length: Length::new::<meter>(4.0),
            width: Length::new::<meter>(3.0),
            ridge_height: Length::new::<meter>(2.5),
            sidewall_height: Length::new::<meter>(1.8),
            footings: 0,
            ..GreenhouseSpec::default()
        };
        let materials = MaterialTable {
            soil_depth: Length::new::<meter>(0.0),
            auxiliary_mass: Mass::new::<kilogram>(2000.0),
            ..MaterialTable::default()
        };
        GeometryConfig::resolve(&spec, &materials).unwrap()
    }

    fn sample(outside_c: f64) -> ForecastSample {
        ForecastSample::new(
            date(2025, 1, 15).at(3, 0, 0, 0),
            celsius(outside_c),
            SolarInput::none(),
        )
    }

    fn hour_step() -> Time {
        Time::new::<hour>(1.0)
    }

    #[test]
    fn equilibrium_is_preserved() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand::idle(config.leak());
        let sample = sample(15.0);

        let mut state = ThermalState::uniform(celsius(15.0));
        for _ in 0..48 {
            let output = engine.step(state, &command, &sample, hour_step()).unwrap();
            state = output.state;
            assert_eq!(output.heater_energy.get::<kilowatt_hour>(), 0.0);
        }

        assert_relative_eq!(state.air.get::<degree_celsius>(), 15.0, epsilon = 1e-12);
        assert_relative_eq!(state.mass.get::<degree_celsius>(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn heater_never_lowers_the_next_temperature() {
        for config in [reference(), light_house()] {
            let engine = ThermalEngine::new(&config);
            for (outside, air, mass) in [(-10.0, 5.0, 5.0), (5.0, 18.0, 12.0), (30.0, 25.0, 28.0)] {
                let state = ThermalState {
                    air: celsius(air),
                    mass: celsius(mass),
                };
                let sample = sample(outside);
                let off = ActuatorCommand::idle(config.leak());
                let on = ActuatorCommand::full_heat(config.leak());

                let cold = engine.step(state, &off, &sample, hour_step()).unwrap();
                let warm = engine.step(state, &on, &sample, hour_step()).unwrap();

                assert!(warm.state.air >= cold.state.air);
                assert!(warm.state.mass >= cold.state.mass);
            }
        }
    }

    #[test]
    fn no_heat_trajectory_cools_toward_outside() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand::idle(config.leak());

        let outside = [15.0, 15.0 - 10.0 / 3.0, 15.0 - 20.0 / 3.0, 5.0];
        let expected = [18.7509, 18.3513, 17.8271, 17.1950];

        let mut state = ThermalState::uniform(celsius(19.0));
        for (outside, expected) in outside.into_iter().zip(expected) {
            state = engine
                .step(state, &command, &sample(outside), hour_step())
                .unwrap()
                .state;
            assert_relative_eq!(state.air.get::<degree_celsius>(), expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn heater_energy_is_input_energy() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand {
            heater: SwitchState::On,
            part_load: UnitInterval::new(0.5).unwrap(),
            vent: config.leak(),
        };

        let output = engine
            .step(
                ThermalState::uniform(celsius(10.0)),
                &command,
                &sample(10.0),
                Time::new::<hour>(2.0),
            )
            .unwrap();

        let expected_kwh = config.heater_power().get::<watt>() * 0.5 * 2.0 / 1000.0;
        assert_relative_eq!(output.heater_energy.get::<kilowatt_hour>(), expected_kwh);
        assert_relative_eq!(
            output.flows.heater_output.get::<watt>(),
            config.heater_power().get::<watt>() * 0.5 * 0.9
        );
    }

    #[test]
    fn infiltration_stays_on_with_vents_closed() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let state = ThermalState::uniform(celsius(20.0));
        let sample = sample(0.0);

        let closed = ActuatorCommand {
            vent: AirChangeRate::ZERO,
            ..ActuatorCommand::idle(config.leak())
        };
        let leaking = ActuatorCommand::idle(config.leak());

        let closed = engine.step(state, &closed, &sample, hour_step()).unwrap();
        let leaking = engine.step(state, &leaking, &sample, hour_step()).unwrap();

        assert_eq!(closed, leaking);
        assert!(closed.flows.air_exchange_loss.get::<watt>() > 0.0);
    }

    #[test]
    fn venting_and_wind_increase_losses() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let state = ThermalState::uniform(celsius(20.0));
        let calm = sample(0.0);
        let windy = ForecastSample {
            wind_speed: Some(Velocity::new::<meter_per_second>(8.0)),
            ..calm
        };

        let idle = ActuatorCommand::idle(config.leak());
        let vented = ActuatorCommand {
            vent: config.design_vent(),
            ..idle
        };

        let base = engine.step(state, &idle, &calm, hour_step()).unwrap();
        let open = engine.step(state, &vented, &calm, hour_step()).unwrap();
        let gusty = engine.step(state, &idle, &windy, hour_step()).unwrap();

        assert!(open.state.air < base.state.air);
        assert!(gusty.state.air < base.state.air);
        assert!(gusty.flows.conduction_loss > base.flows.conduction_loss);
    }

    #[test]
    fn solar_gain_warms_the_air() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let state = ThermalState::uniform(celsius(15.0));
        let sunny = ForecastSample {
            solar: SolarInput::Gain(Power::new::<watt>(20_000.0)),
            ..sample(15.0)
        };

        let output = engine
            .step(state, &ActuatorCommand::idle(config.leak()), &sunny, hour_step())
            .unwrap();

        assert!(output.state.air > state.air);
        assert!(output.state.mass > state.mass);
        assert_relative_eq!(output.flows.solar_gain.get::<watt>(), 20_000.0);
    }

    #[test]
    fn ground_temperature_drives_the_floor() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let state = ThermalState::uniform(celsius(15.0));
        let warm_ground = ForecastSample {
            ground: Some(celsius(25.0)),
            ..sample(15.0)
        };

        let output = engine
            .step(state, &ActuatorCommand::idle(config.leak()), &warm_ground, hour_step())
            .unwrap();

        assert!(output.flows.conduction_loss.get::<watt>() < 0.0);
        assert!(output.state.air > state.air);
    }

    #[test]
    fn long_steps_match_repeated_short_steps() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand::full_heat(config.leak());
        let sample = sample(-5.0);
        let start = ThermalState::uniform(celsius(12.0));

        let long = engine
            .step(start, &command, &sample, Time::new::<hour>(2.0))
            .unwrap();

        let mut short = start;
        for _ in 0..8 {
            short = engine
                .step(short, &command, &sample, Time::new::<minute>(15.0))
                .unwrap()
                .state;
        }

        assert_relative_eq!(
            long.state.air.get::<degree_celsius>(),
            short.air.get::<degree_celsius>(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn light_mass_stays_between_its_neighbours() {
        let spec = GreenhouseSpec {
            footings: 0,
            ..GreenhouseSpec::default()
        };
        let materials = MaterialTable {
            soil_depth: Length::new::<meter>(0.0),
            auxiliary_mass: Mass::new::<kilogram>(200.0),
            ..MaterialTable::default()
        };
        let config = GeometryConfig::resolve(&spec, &materials).unwrap();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand::idle(config.leak());
        let sample = sample(10.0);

        let mut state = ThermalState {
            air: celsius(20.0),
            mass: celsius(15.0),
        };
        for _ in 0..24 {
            state = engine.step(state, &command, &sample, hour_step()).unwrap().state;
            for node in [state.air, state.mass] {
                let node = node.get::<degree_celsius>();
                assert!((10.0 - 1e-9..=20.0 + 1e-9).contains(&node), "left bounds: {node}");
            }
        }

        assert_relative_eq!(state.air.get::<degree_celsius>(), 10.0, epsilon = 0.1);
        assert_relative_eq!(state.mass.get::<degree_celsius>(), 10.0, epsilon = 0.1);
    }

    #[test]
    fn substeps_follow_the_tighter_limit() {
        let dt = Time::new::<hour>(1.0);
        assert_eq!(substep_count(dt, Time::new::<minute>(15.0)), 4);
        assert_eq!(substep_count(dt, Time::new::<second>(123.0)), 30);
        assert_eq!(substep_count(Time::new::<minute>(5.0), Time::new::<minute>(15.0)), 1);
    }

    #[test]
    fn rejects_non_positive_time_step() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let state = ThermalState::uniform(celsius(15.0));
        let command = ActuatorCommand::idle(config.leak());

        for dt in [0.0, -1.0, f64::NAN] {
            let result = engine.step(state, &command, &sample(5.0), Time::new::<hour>(dt));
            assert!(matches!(
                result,
                Err(EngineError::NonPositiveTimeStep { .. })
            ));
        }
    }

    #[test]
    fn rejects_vent_above_design() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let command = ActuatorCommand {
            vent: AirChangeRate::from_const(5.0),
            ..ActuatorCommand::idle(config.leak())
        };

        let result = engine.step(
            ThermalState::uniform(celsius(15.0)),
            &command,
            &sample(5.0),
            hour_step(),
        );
        assert!(matches!(result, Err(EngineError::VentAboveDesign { .. })));
    }

    #[test]
    fn call_matches_step() {
        let config = reference();
        let engine = ThermalEngine::new(&config);
        let input = StepInput {
            state: ThermalState::uniform(celsius(19.0)),
            command: ActuatorCommand::full_heat(config.leak()),
            sample: sample(2.0),
            dt: hour_step(),
        };

        let called = engine.call(input).unwrap();
        let stepped = engine
            .step(input.state, &input.command, &input.sample, input.dt)
            .unwrap();
        assert_eq!(called, stepped);
    }
}
