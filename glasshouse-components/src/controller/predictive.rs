use glasshouse_core::units::{AirChangeRate, TemperatureOps};
use tracing::{debug, warn};
use uom::si::{
    f64::ThermodynamicTemperature, temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::degree_celsius,
};

use crate::{
    engine::{ActuatorCommand, EngineError, ThermalEngine, ThermalState},
    forecast::ForecastSample,
    greenhouse::GeometryConfig,
};

use super::{
    ControllerConfig, ControllerConfigError, ControllerMemory, Decision, DecisionInput,
    HeatingReason, Lookahead, LookaheadCoverage, SwitchState, VentingReason,
};

/// Lead-time predictive controller for one greenhouse.
///
/// Heating follows a hysteresis band around the setpoint, switches on early
/// when the no-heat projection dips below the band minus the safety margin
/// within the lead time, and never switches inside a dwell window.
///
/// Venting is continuous: the largest of a reactive term, a predictive term,
/// and a night purge, clamped between the leakage and maximum vent rates.
/// Proportional terms are scaled down when outside air is no cooler than
/// inside.
#[derive(Debug, Clone, Copy)]
pub struct PredictiveController<'a> {
    config: ControllerConfig,
    engine: ThermalEngine<'a>,
}

impl<'a> PredictiveController<'a> {
    /// Creates a controller for the greenhouse described by `geometry`.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerConfigError`] if `config` is invalid on its own
    /// or inconsistent with `geometry`.
    pub fn new(
        config: ControllerConfig,
        geometry: &'a GeometryConfig,
    ) -> Result<Self, ControllerConfigError> {
        config.validate(geometry)?;
        Ok(Self {
            config,
            engine: ThermalEngine::new(geometry),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The engine used for look-ahead projections.
    #[must_use]
    pub fn engine(&self) -> &ThermalEngine<'a> {
        &self.engine
    }

    /// Decides the actuator command for the current step.
    ///
    /// A forecast shorter than the look-ahead horizon is projected as far as
    /// it goes; with no forecast at all the controller heats and vents on the
    /// air temperature alone.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] only if the engine rejects the state, which
    /// means the air or mass temperature is not finite.
    pub fn decide(&self, input: DecisionInput<'_>) -> Result<Decision, EngineError> {
        let DecisionInput {
            state,
            forecast,
            memory,
        } = input;
        let config = &self.config;

        let lookahead = Lookahead::project(
            &self.engine,
            state,
            forecast,
            config.steps_in(config.horizon),
            config.step,
        )?;
        if let LookaheadCoverage::Truncated {
            requested,
            available,
        } = lookahead.coverage
        {
            warn!(
                requested,
                available, "forecast is shorter than the look-ahead horizon"
            );
        }
        let lead = lookahead.lead_window(config.steps_in(config.lead_time));

        let (heater, heating) = self.heating(state.air, lead, memory);
        let (vent, venting) = self.venting(state, forecast.first(), lead);

        let mut timers = memory.timers;
        if heater != memory.heater {
            timers.record_transition(heater);
        }
        timers.advance(config.step);

        let command = match heater {
            SwitchState::On => ActuatorCommand::full_heat(vent),
            SwitchState::Off => ActuatorCommand {
                vent,
                ..ActuatorCommand::idle(self.engine.config().leak())
            },
        };

        debug!(
            air_c = state.air.get::<degree_celsius>(),
            heater = %heater,
            ?heating,
            vent_ach = vent.get(),
            ?venting,
            "controller decision"
        );

        Ok(Decision {
            command,
            memory: ControllerMemory { heater, timers },
            heating,
            venting,
            lookahead,
        })
    }

    fn heating(
        &self,
        air: ThermodynamicTemperature,
        lead: &[ThermodynamicTemperature],
        memory: ControllerMemory,
    ) -> (SwitchState, HeatingReason) {
        let config = &self.config;
        let on_below = config.setpoint - config.half_band();
        let off_above = config.setpoint + config.half_band();
        let low_band = on_below - config.safety_margin;

        let (requested, reason) = if air < on_below {
            (SwitchState::On, HeatingReason::Reactive)
        } else if lead.iter().any(|&projected| projected < low_band) {
            (SwitchState::On, HeatingReason::Preheat)
        } else if air > off_above {
            (SwitchState::Off, HeatingReason::Satisfied)
        } else {
            (memory.heater, HeatingReason::Hold)
        };

        match (memory.heater, requested) {
            (SwitchState::Off, SwitchState::On)
                if !memory.timers.off_dwell_elapsed(config.min_off_time) =>
            {
                (SwitchState::Off, HeatingReason::MinOffDwell)
            }
            (SwitchState::On, SwitchState::Off)
                if !memory.timers.on_dwell_elapsed(config.min_on_time) =>
            {
                (SwitchState::On, HeatingReason::MinOnDwell)
            }
            _ => (requested, reason),
        }
    }

    fn venting(
        &self,
        state: ThermalState,
        now: Option<&ForecastSample>,
        lead: &[ThermodynamicTemperature],
    ) -> (AirChangeRate, VentingReason) {
        let config = &self.config;
        let geometry = self.engine.config();
        let leak = geometry.leak();

        let air = state.air;
        let high_band = config.setpoint + config.half_band() + config.buffer;
        let excess = |t: ThermodynamicTemperature| t.minus(high_band).get::<delta_kelvin>().max(0.0);
        let vent_max = config.vent_max.get();
        // Without a current sample only the reactive term applies, unscaled.
        let scale = match now {
            Some(now) if now.outside >= air => config.hot_outside_scale,
            _ => 1.0,
        };

        let reactive = (config.vent_gain * excess(air)).min(vent_max) * scale;
        let lead_excess = lead.iter().copied().map(excess).fold(0.0, f64::max);
        let predictive = (config.vent_gain * lead_excess).min(vent_max) * scale;

        let purge = match now {
            Some(now)
                if now.outside < air
                    && now.solar.gain(geometry, now.cloud_cover)
                        <= config.night_solar_threshold =>
            {
                config.night_purge.get()
            }
            _ => 0.0,
        };

        let (target, reason) = [
            (reactive, VentingReason::Reactive),
            (predictive, VentingReason::Predictive),
            (purge, VentingReason::NightPurge),
        ]
        .into_iter()
        .fold((0.0, VentingReason::Baseline), |best, term| {
            if term.0 > best.0 { term } else { best }
        });

        if target <= leak.get() {
            return (leak, VentingReason::Baseline);
        }
        let vent = AirChangeRate::per_hour(target)
            .unwrap_or(leak)
            .clamp(leak, config.vent_max);
        (vent, reason)
    }
}
