//! The two-node greenhouse thermal model.
//!
//! One air node and one lumped thermal-mass node, coupled through a fixed
//! conductance. [`ThermalEngine`] is the only implementation of the physics:
//! the simulation driver advances the live state with it, and the controller
//! runs its look-ahead through the same stepping function on a copy.

mod command;
mod error;
mod state;
mod step;

pub use command::ActuatorCommand;
pub use error::EngineError;
pub use state::ThermalState;
pub use step::{HeatFlows, StepInput, StepOutput, ThermalEngine};
