//! Closed-loop greenhouse simulation.
//!
//! Loads a TOML run configuration and a JSON forecast, drives the predictive
//! controller and thermal engine one forecast hour at a time, and reports
//! temperatures, energy and cost.

pub mod config;
mod error;
pub mod records;
mod report;
mod simulation;

pub use config::{ConfigFile, SimulationSetup};
pub use error::{ConfigError, SimulationError};
pub use records::{ForecastRecord, parse_forecast};
pub use report::{SimulationReport, SimulationTotals, StepRecord};
pub use simulation::Simulation;
