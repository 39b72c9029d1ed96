use uom::si::f64::ThermodynamicTemperature;

/// Temperatures of the air node and the lumped mass node.
///
/// Only the engine produces new states; everyone else works on copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalState {
    pub air: ThermodynamicTemperature,
    pub mass: ThermodynamicTemperature,
}

impl ThermalState {
    /// Both nodes at `temperature`.
    #[must_use]
    pub fn uniform(temperature: ThermodynamicTemperature) -> Self {
        Self {
            air: temperature,
            mass: temperature,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.air.is_finite() && self.mass.is_finite()
    }
}
