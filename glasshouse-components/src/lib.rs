//! Greenhouse thermal model and climate controller.
//!
//! - [`greenhouse`] resolves a physical description into a [`GeometryConfig`].
//! - [`forecast`] holds validated weather samples and solar transposition.
//! - [`engine`] advances the two-node air and thermal-mass model.
//! - [`controller`] decides heater and vent commands from a forecast.
//! - [`tariff`] prices electricity by time of use.
//!
//! [`GeometryConfig`]: greenhouse::GeometryConfig

pub mod controller;
pub mod engine;
pub mod forecast;
pub mod greenhouse;
pub mod tariff;
