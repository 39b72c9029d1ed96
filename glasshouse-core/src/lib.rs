//! Shared building blocks for greenhouse thermal models.
//!
//! This crate holds the vocabulary every other crate in the workspace speaks:
//!
//! - [`Component`]: a deterministic input-to-output transformation.
//! - [`constraint`]: type-level numeric invariants checked at construction.
//! - [`units`]: `uom` helpers for temperature differences and air exchange.
//! - [`TimeIntegrable`]: explicit (forward Euler) stepping of quantities.

mod component;
pub mod constraint;
mod time;
pub mod units;

pub use component::Component;
pub use time::{TimeDerivative, TimeIntegrable};
