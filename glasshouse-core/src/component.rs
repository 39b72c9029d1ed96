/// The core trait for defining components.
///
/// A `Component` takes an input and produces an output. Components must be
/// deterministic, always producing the same result for a given input, so that
/// a simulated run can be reproduced exactly and a look-ahead projection sees
/// the same physics as the live run.
///
/// ## Implementing `Component`
///
/// Implement the [`call()`] method, which takes an input and returns either an
/// output or an error.
///
/// ```
/// use std::convert::Infallible;
/// use glasshouse_core::Component;
///
/// struct Double;
///
/// impl Component for Double {
///     type Input = f64;
///     type Output = f64;
///     type Error = Infallible;
///
///     fn call(&self, input: f64) -> Result<f64, Self::Error> {
///         Ok(input * 2.0)
///     }
/// }
///
/// assert_eq!(Double.call(1.5).unwrap(), 3.0);
/// ```
///
/// [`call()`]: Component::call
pub trait Component {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the component with the given input and returns a result.
    ///
    /// # Errors
    ///
    /// Each component defines its own `Error` type, allowing it to determine
    /// what constitutes a failure within its domain.
    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
