use glasshouse_core::{
    constraint::{Constrained, UnitInterval},
    units::AirChangeRate,
};

use crate::controller::SwitchState;

/// What the actuators do for one step.
///
/// `vent` is the total outdoor-air exchange rate. The engine never applies
/// less than the greenhouse's leakage rate, so a zero `vent` still leaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand {
    pub heater: SwitchState,
    /// Fraction of nominal heater power while the heater is on.
    pub part_load: Constrained<f64, UnitInterval>,
    pub vent: AirChangeRate,
}

impl ActuatorCommand {
    /// Heater off and vents closed, leaving only infiltration.
    #[must_use]
    pub fn idle(leak: AirChangeRate) -> Self {
        Self {
            heater: SwitchState::Off,
            part_load: UnitInterval::zero(),
            vent: leak,
        }
    }

    /// Heater on at full power.
    #[must_use]
    pub fn full_heat(vent: AirChangeRate) -> Self {
        Self {
            heater: SwitchState::On,
            part_load: UnitInterval::one(),
            vent,
        }
    }

    /// Fraction of nominal heater power actually drawn.
    #[must_use]
    pub fn heater_fraction(&self) -> f64 {
        match self.heater {
            SwitchState::On => self.part_load.into_inner(),
            SwitchState::Off => 0.0,
        }
    }
}
