use crate::{
    engine::{EngineError, ThermalState},
    forecast::ForecastSample,
};

use super::{ControllerMemory, Decision, DecisionInput, PredictiveController};

/// A [`PredictiveController`] paired with the memory it threads between
/// decisions.
#[derive(Debug, Clone)]
pub struct ControllerSession<'a> {
    controller: PredictiveController<'a>,
    memory: ControllerMemory,
}

impl<'a> ControllerSession<'a> {
    /// Starts a session with a freshly initialized memory.
    #[must_use]
    pub fn new(controller: PredictiveController<'a>) -> Self {
        Self {
            controller,
            memory: ControllerMemory::default(),
        }
    }

    /// Decides the next command and keeps the updated memory.
    ///
    /// # Errors
    ///
    /// Propagates the [`EngineError`] from [`PredictiveController::decide`].
    pub fn decide(
        &mut self,
        state: ThermalState,
        forecast: &[ForecastSample],
    ) -> Result<Decision, EngineError> {
        let decision = self.controller.decide(DecisionInput {
            state,
            forecast,
            memory: self.memory,
        })?;
        self.memory = decision.memory;
        Ok(decision)
    }

    #[must_use]
    pub fn memory(&self) -> ControllerMemory {
        self.memory
    }

    #[must_use]
    pub fn controller(&self) -> &PredictiveController<'a> {
        &self.controller
    }

    /// Forgets the heater state and every timer, as at the start of a new run.
    pub fn reset(&mut self) {
        self.memory = ControllerMemory::default();
    }
}
