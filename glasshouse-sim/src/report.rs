use glasshouse_components::{
    controller::{HeatingReason, SwitchState, VentingReason},
    greenhouse::GreenhouseSummary,
};
use jiff::civil::DateTime;
use serde::Serialize;

/// What happened during one simulated step, in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub time: DateTime,
    pub outside_c: f64,
    /// Air temperature at the end of the step.
    pub air_c: f64,
    pub mass_c: f64,
    pub heater: SwitchState,
    pub heating: HeatingReason,
    pub vent_ach: f64,
    pub venting: VentingReason,
    pub solar_gain_w: f64,
    pub heater_kwh: f64,
    pub fan_kwh: f64,
    pub tariff_period: String,
    pub cost: f64,
    pub lookahead_truncated: bool,
}

/// Run-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationTotals {
    pub steps: usize,
    pub heater_kwh: f64,
    pub fan_kwh: f64,
    pub energy_kwh: f64,
    pub cost: f64,
    pub heater_on_steps: usize,
    pub heater_starts: usize,
    pub min_air_c: f64,
    pub max_air_c: f64,
    /// Time spent below the lower hysteresis switching point.
    pub hours_below_comfort: f64,
    pub truncated_lookaheads: usize,
}

impl SimulationTotals {
    pub(crate) fn new(initial_air_c: f64) -> Self {
        Self {
            steps: 0,
            heater_kwh: 0.0,
            fan_kwh: 0.0,
            energy_kwh: 0.0,
            cost: 0.0,
            heater_on_steps: 0,
            heater_starts: 0,
            min_air_c: initial_air_c,
            max_air_c: initial_air_c,
            hours_below_comfort: 0.0,
            truncated_lookaheads: 0,
        }
    }

    pub(crate) fn record(&mut self, step: &StepRecord, started: bool) {
        self.steps += 1;
        self.heater_kwh += step.heater_kwh;
        self.fan_kwh += step.fan_kwh;
        self.energy_kwh = self.heater_kwh + self.fan_kwh;
        self.cost += step.cost;
        if step.heater.is_on() {
            self.heater_on_steps += 1;
        }
        if started {
            self.heater_starts += 1;
        }
        self.min_air_c = self.min_air_c.min(step.air_c);
        self.max_air_c = self.max_air_c.max(step.air_c);
        if step.lookahead_truncated {
            self.truncated_lookaheads += 1;
        }
    }
}

/// The full result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub greenhouse: GreenhouseSummary,
    pub totals: SimulationTotals,
    pub steps: Vec<StepRecord>,
}
