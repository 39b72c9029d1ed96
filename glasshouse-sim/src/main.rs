use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glasshouse_components::greenhouse::GeometryConfig;
use glasshouse_sim::{ConfigFile, Simulation, SimulationReport, parse_forecast};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Simulate a greenhouse under the predictive heat and vent controller.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML run configuration; the reference greenhouse when omitted.
    #[arg(long, env = "GLASSHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of hourly forecast records.
    #[arg(long)]
    forecast: PathBuf,

    /// Initial air temperature in °C, overriding the configuration.
    #[arg(long, allow_negative_numbers = true)]
    initial_air_c: Option<f64>,

    /// Print the full report as JSON instead of a summary.
    #[arg(long)]
    report_json: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let file = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ConfigFile::from_toml_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ConfigFile::default(),
    };
    let mut setup = file.into_setup().context("invalid configuration")?;
    if let Some(air_c) = cli.initial_air_c {
        setup = setup.with_initial_air(air_c);
    }

    let text = fs::read_to_string(&cli.forecast)
        .with_context(|| format!("failed to read forecast {}", cli.forecast.display()))?;
    let forecast = parse_forecast(&text)
        .with_context(|| format!("failed to load forecast {}", cli.forecast.display()))?;

    let geometry = GeometryConfig::resolve(&setup.greenhouse, &setup.materials)
        .context("invalid greenhouse description")?;
    let report = Simulation::new(&geometry, setup.controller)?
        .with_tariff(setup.tariff)
        .with_fan_power(setup.fan_power)
        .run(setup.initial, &forecast)?;

    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &SimulationReport) {
    let house = &report.greenhouse;
    let totals = &report.totals;

    println!(
        "greenhouse: {:.1} m² floor, {:.1} m³, UA {:.0} W/K, heater {:.0} W",
        house.floor_area_m2, house.volume_m3, house.ua_envelope_w_per_k, house.heater_capacity_w
    );
    println!(
        "{} steps, air {:.1} to {:.1} °C, {:.1} h below comfort",
        totals.steps, totals.min_air_c, totals.max_air_c, totals.hours_below_comfort
    );
    println!(
        "heater on {} steps ({} starts), {:.2} kWh; fans {:.2} kWh",
        totals.heater_on_steps, totals.heater_starts, totals.heater_kwh, totals.fan_kwh
    );
    println!("energy {:.2} kWh, cost {:.2}", totals.energy_kwh, totals.cost);
    if totals.truncated_lookaheads > 0 {
        println!(
            "{} decisions saw less forecast than the look-ahead horizon",
            totals.truncated_lookaheads
        );
    }
}
