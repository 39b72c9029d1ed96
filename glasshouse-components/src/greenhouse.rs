//! Greenhouse geometry and physical constants.
//!
//! A [`GreenhouseSpec`] holds the handful of values a grower knows about their
//! house (plan dimensions, orientation, insulation, footings). A
//! [`MaterialTable`] holds the named physical constants. [`GeometryConfig::resolve`]
//! combines the two exactly once into the immutable configuration shared by
//! the thermal engine and the controller.

mod config;
mod error;
mod materials;
mod spec;

pub use config::{GeometryConfig, GreenhouseSummary, SurfaceAreas, SurfaceResistances};
pub use error::GeometryError;
pub use materials::MaterialTable;
pub use spec::{GreenhouseSpec, Location, Resistance};
