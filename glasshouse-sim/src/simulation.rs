use glasshouse_components::{
    controller::{ControllerConfig, ControllerSession, PredictiveController},
    engine::ThermalState,
    forecast::Forecast,
    greenhouse::GeometryConfig,
    tariff::TimeOfUseTariff,
};
use glasshouse_core::units::AirChangeRate;
use tracing::info;
use uom::{
    ConstZero,
    si::{
        energy::kilowatt_hour,
        f64::{Energy, Power, Time},
        power::watt,
        thermodynamic_temperature::degree_celsius,
        time::hour,
    },
};

use crate::{
    SimulationError, config::DEFAULT_FAN_POWER_W, report::SimulationReport,
    report::SimulationTotals, report::StepRecord,
};

/// The closed loop: one controller decision and one engine step per forecast
/// sample, with energy priced by a time-of-use tariff.
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    session: ControllerSession<'a>,
    tariff: TimeOfUseTariff,
    fan_power: Power,
}

impl<'a> Simulation<'a> {
    /// Creates a simulation with the default tariff and fan power.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Controller`] if `controller` is invalid for
    /// `geometry`.
    pub fn new(
        geometry: &'a GeometryConfig,
        controller: ControllerConfig,
    ) -> Result<Self, SimulationError> {
        let controller = PredictiveController::new(controller, geometry)?;
        Ok(Self {
            session: ControllerSession::new(controller),
            tariff: TimeOfUseTariff::default(),
            fan_power: Power::new::<watt>(DEFAULT_FAN_POWER_W),
        })
    }

    #[must_use]
    pub fn with_tariff(mut self, tariff: TimeOfUseTariff) -> Self {
        self.tariff = tariff;
        self
    }

    /// Sets the fan draw at full opening.
    #[must_use]
    pub fn with_fan_power(mut self, fan_power: Power) -> Self {
        self.fan_power = fan_power;
        self
    }

    /// Runs the loop over every sample of `forecast`, starting from `initial`.
    ///
    /// Each run starts from fresh controller memory, so repeated runs over
    /// the same inputs give identical reports. Near the end of the forecast
    /// the controller sees fewer samples than its horizon and projects as
    /// far as they go.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Engine`] if the state stops being finite.
    pub fn run(
        &mut self,
        initial: ThermalState,
        forecast: &Forecast,
    ) -> Result<SimulationReport, SimulationError> {
        self.session.reset();
        let controller = *self.session.controller();
        let config = controller.config();
        let engine = controller.engine();
        let dt = config.step;
        let on_below = config.setpoint - config.deadband * 0.5;

        info!(
            steps = forecast.len(),
            start = %forecast.samples()[0].time,
            air_c = initial.air.get::<degree_celsius>(),
            "starting simulation"
        );

        let mut state = initial;
        let mut totals = SimulationTotals::new(initial.air.get::<degree_celsius>());
        let mut steps = Vec::with_capacity(forecast.len());

        for (index, sample) in forecast.iter().enumerate() {
            let engine_error = |source| SimulationError::Engine {
                step: index,
                source,
            };
            let was_on = self.session.memory().heater.is_on();

            let decision = self
                .session
                .decide(state, forecast.window(index, forecast.len()))
                .map_err(engine_error)?;
            let output = engine
                .step(state, &decision.command, sample, dt)
                .map_err(engine_error)?;
            state = output.state;

            let fan_energy = self.fan_energy(decision.command.vent, config.vent_max, dt);
            let period = self.tariff.period_at(sample.time);
            let record = StepRecord {
                time: sample.time,
                outside_c: sample.outside.get::<degree_celsius>(),
                air_c: state.air.get::<degree_celsius>(),
                mass_c: state.mass.get::<degree_celsius>(),
                heater: decision.command.heater,
                heating: decision.heating,
                vent_ach: decision.command.vent.get(),
                venting: decision.venting,
                solar_gain_w: output.flows.solar_gain.get::<watt>(),
                heater_kwh: output.heater_energy.get::<kilowatt_hour>(),
                fan_kwh: fan_energy.get::<kilowatt_hour>(),
                tariff_period: period.name.clone(),
                cost: period.cost(output.heater_energy + fan_energy),
                lookahead_truncated: decision.lookahead.is_truncated(),
            };

            totals.record(&record, !was_on && record.heater.is_on());
            if state.air < on_below {
                totals.hours_below_comfort += dt.get::<hour>();
            }
            steps.push(record);
        }

        info!(
            steps = totals.steps,
            min_air_c = totals.min_air_c,
            max_air_c = totals.max_air_c,
            energy_kwh = totals.energy_kwh,
            cost = totals.cost,
            heater_starts = totals.heater_starts,
            "simulation finished"
        );

        Ok(SimulationReport {
            greenhouse: engine.config().summary(),
            totals,
            steps,
        })
    }

    /// Fan energy for a step, proportional to how far the vents are opened
    /// above infiltration.
    fn fan_energy(&self, vent: AirChangeRate, vent_max: AirChangeRate, dt: Time) -> Energy {
        let leak = self.session.controller().engine().config().leak().get();
        let span = vent_max.get() - leak;
        if span <= 0.0 {
            return Energy::ZERO;
        }
        let opening = ((vent.get() - leak) / span).clamp(0.0, 1.0);
        self.fan_power * dt * opening
    }
}
