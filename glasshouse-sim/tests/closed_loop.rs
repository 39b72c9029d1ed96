use approx::assert_relative_eq;
use glasshouse_components::{
    controller::{ControllerConfig, HeatingReason, SwitchState, VentingReason},
    engine::ThermalState,
    forecast::{Forecast, ForecastSample, SolarInput},
    greenhouse::{GeometryConfig, GreenhouseSpec, MaterialTable},
};
use glasshouse_sim::{ConfigFile, Simulation, SimulationReport, parse_forecast};
use jiff::{ToSpan, civil::date};
use uom::si::{
    f64::{Power, TemperatureInterval, ThermodynamicTemperature, Time},
    power::{kilowatt, watt},
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::degree_celsius,
    time::hour,
};

fn celsius(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(value)
}

fn geometry() -> GeometryConfig {
    GeometryConfig::resolve(&GreenhouseSpec::default(), &MaterialTable::default()).unwrap()
}

/// Hourly samples from midnight on Wednesday 2025-01-15.
fn forecast(hours: &[(f64, Power)]) -> Forecast {
    let start = date(2025, 1, 15).at(0, 0, 0, 0);
    Forecast::new(
        hours
            .iter()
            .enumerate()
            .map(|(h, &(outside_c, solar))| {
                let time = start.checked_add((h as i64).hours()).unwrap();
                ForecastSample::new(time, celsius(outside_c), SolarInput::Gain(solar))
            })
            .collect(),
    )
    .unwrap()
}

fn dark(outside_c: &[f64]) -> Forecast {
    forecast(
        &outside_c
            .iter()
            .map(|&t| (t, Power::new::<watt>(0.0)))
            .collect::<Vec<_>>(),
    )
}

fn run(forecast: &Forecast, initial_c: f64) -> SimulationReport {
    let geometry = geometry();
    Simulation::new(&geometry, ControllerConfig::default())
        .unwrap()
        .run(ThermalState::uniform(celsius(initial_c)), forecast)
        .unwrap()
}

#[test]
fn heater_starts_before_a_cold_front_arrives() {
    // Mild for six hours, then a hard freeze.
    let mut outside = vec![18.0; 6];
    outside.extend([-25.0; 24]);
    let report = run(&dark(&outside), 18.5);

    for step in &report.steps[..4] {
        assert_eq!(step.heater, SwitchState::Off);
        assert_eq!(step.heating, HeatingReason::Hold);
    }
    let first_on = &report.steps[4];
    assert_eq!(first_on.heater, SwitchState::On);
    assert_eq!(first_on.heating, HeatingReason::Preheat);

    // The air was still inside the band when the heater came on.
    assert!(report.steps[3].air_c > 16.5);
}

#[test]
fn preheat_beats_a_falling_outside_temperature() {
    // Outside falls from 15 °C to 5 °C over three hours, then holds.
    let mut outside = vec![15.0, 15.0 - 10.0 / 3.0, 15.0 - 20.0 / 3.0];
    outside.extend([5.0; 21]);
    let config = ControllerConfig {
        setpoint: celsius(18.0),
        deadband: TemperatureInterval::new::<delta_kelvin>(2.0),
        safety_margin: TemperatureInterval::new::<delta_kelvin>(0.5),
        lead_time: Time::new::<hour>(2.0),
        ..ControllerConfig::default()
    };
    let geometry = geometry();
    let report = Simulation::new(&geometry, config)
        .unwrap()
        .run(ThermalState::uniform(celsius(19.0)), &dark(&outside))
        .unwrap();

    let first_on = report
        .steps
        .iter()
        .position(|step| step.heater.is_on())
        .unwrap();
    assert_eq!(first_on, 4);
    assert_eq!(report.steps[first_on].heating, HeatingReason::Preheat);
    // Air entering the switching hour had not yet crossed the lower switching point.
    assert!(report.steps[first_on - 1].air_c > 17.0);
}

#[test]
fn cool_dark_hours_purge_warm_air() {
    let report = run(&dark(&[18.0; 4]), 18.5);
    for step in &report.steps {
        assert_eq!(step.venting, VentingReason::NightPurge);
        assert_relative_eq!(step.vent_ach, 0.5);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let outside: Vec<f64> = (0..48_i32)
        .map(|h| 5.0 + 12.0 * (f64::from(h) * std::f64::consts::PI / 12.0).sin())
        .collect();
    let forecast = dark(&outside);
    let geometry = geometry();
    let mut simulation = Simulation::new(&geometry, ControllerConfig::default()).unwrap();
    let initial = ThermalState::uniform(celsius(17.0));

    let first = simulation.run(initial, &forecast).unwrap();
    let second = simulation.run(initial, &forecast).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, run(&forecast, 17.0));
}

#[test]
fn heater_transitions_respect_dwell_times() {
    // A swinging outside temperature that would chatter a plain thermostat.
    let outside: Vec<f64> = (0..72)
        .map(|h| if (h / 2) % 2 == 0 { -15.0 } else { 20.0 })
        .collect();
    let report = run(&dark(&outside), 17.0);

    let transitions: Vec<usize> = report
        .steps
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].heater != pair[1].heater)
        .map(|(i, _)| i + 1)
        .collect();
    assert!(!transitions.is_empty());
    for pair in transitions.windows(2) {
        assert!(pair[1] - pair[0] >= 3, "transitions at {pair:?}");
    }
}

#[test]
fn vents_stay_between_leakage_and_maximum() {
    let hours: Vec<(f64, Power)> = (0..24)
        .map(|h| {
            let sun = if (8..18).contains(&h) { 30.0 } else { 0.0 };
            (if h % 3 == 0 { 32.0 } else { 12.0 }, Power::new::<kilowatt>(sun))
        })
        .collect();
    let report = run(&forecast(&hours), 24.0);

    assert!(report.steps.iter().any(|step| step.vent_ach > 0.3));
    for step in &report.steps {
        assert!((0.3..=2.0).contains(&step.vent_ach), "vent {}", step.vent_ach);
    }
}

#[test]
fn energy_and_cost_add_up() {
    let report = run(&dark(&[-10.0; 36]), 15.0);
    let heater_kwh = report.greenhouse.heater_capacity_w / 1000.0;

    for step in &report.steps {
        let expected = if step.heater.is_on() { heater_kwh } else { 0.0 };
        assert_relative_eq!(step.heater_kwh, expected, epsilon = 1e-9);
    }
    assert_relative_eq!(
        report.totals.cost,
        report.steps.iter().map(|step| step.cost).sum::<f64>(),
        epsilon = 1e-9
    );
    assert_eq!(
        report.totals.heater_on_steps,
        report.steps.iter().filter(|step| step.heater.is_on()).count()
    );
    // Only the last 23 decisions see less than a full day ahead.
    assert_eq!(report.totals.truncated_lookaheads, 23);
}

#[test]
fn files_drive_a_run_end_to_end() {
    let config = r#"
        [greenhouse]
        heater_w = 15000.0

        [controller]
        setpoint_c = 16.0

        [initial]
        air_c = 14.0
    "#;
    let forecast = r#"[
        { "time": "2025-01-18T00:00:00", "outside_c": -4.0, "wind_speed_m_s": 3.0 },
        { "time": "2025-01-18T01:00:00", "outside_c": -4.5 },
        { "time": "2025-01-18T02:00:00", "outside_c": -5.0, "ground_c": 4.0 }
    ]"#;

    let setup = ConfigFile::from_toml_str(config).unwrap().into_setup().unwrap();
    let forecast = parse_forecast(forecast).unwrap();
    let geometry = GeometryConfig::resolve(&setup.greenhouse, &setup.materials).unwrap();
    let report = Simulation::new(&geometry, setup.controller)
        .unwrap()
        .with_tariff(setup.tariff)
        .with_fan_power(setup.fan_power)
        .run(setup.initial, &forecast)
        .unwrap();

    assert_relative_eq!(report.greenhouse.heater_capacity_w, 15000.0);
    assert_eq!(report.steps[0].heating, HeatingReason::Reactive);
    // Saturday night is super off-peak.
    assert_eq!(report.steps[0].tariff_period, "super_off_peak");
    assert_relative_eq!(report.steps[0].heater_kwh, 15.0, epsilon = 1e-9);
    assert_relative_eq!(
        report.steps[0].cost,
        (report.steps[0].heater_kwh + report.steps[0].fan_kwh) * 0.0787,
        epsilon = 1e-9
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["steps"][0]["heater"], "on");
    assert_eq!(json["steps"][0]["heating"], "reactive");
    assert_eq!(json["steps"][0]["time"], "2025-01-18T00:00:00");
}
