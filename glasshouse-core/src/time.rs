use std::ops::{Add, Div, Mul};

use uom::si::f64::Time;

/// The time derivative of a quantity `T`.
///
/// # Examples
///
/// - `TimeDerivative<Length>` = `Velocity`
/// - `TimeDerivative<ThermodynamicTemperature>` = kelvin per second
pub type TimeDerivative<T> = <T as Div<Time>>::Output;

/// Trait for types that can be stepped through time using their derivative.
///
/// The thermal engine advances both of its nodes with this trait, so the
/// integration scheme lives in exactly one place.
pub trait TimeIntegrable: Sized + Div<Time> {
    /// Steps the value by a time increment `dt`.
    #[must_use]
    fn step_by_time(self, derivative: TimeDerivative<Self>, dt: Time) -> Self;
}

/// Blanket implementation of [`TimeIntegrable`] using the explicit Euler method.
///
/// Applies to any type that supports division by time, multiplication of its
/// derivative by time, and addition of the result back to itself:
///
/// ```text
/// next = self + derivative * dt
/// ```
impl<T> TimeIntegrable for T
where
    T: Div<Time>,
    TimeDerivative<T>: Mul<Time>,
    T: Add<<TimeDerivative<T> as Mul<Time>>::Output, Output = T>,
{
    fn step_by_time(self, derivative: TimeDerivative<Self>, dt: Time) -> Self {
        self + derivative * dt
    }
}
