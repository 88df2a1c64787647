//! Double-well free energy potentials.
use crate::Real;
use numeric_literals::replace_float_literals;

/// A double-well potential `W(u)` driving phase separation.
///
/// Only the first two derivatives enter the discrete equations: `W'` in the residual and `W''`
/// in its linearization.
pub trait DoubleWellPotential<T: Real> {
    fn energy(&self, u: T) -> T;

    /// `W'(u)`.
    fn derivative(&self, u: T) -> T;

    /// `W''(u)`.
    fn second_derivative(&self, u: T) -> T;
}

impl<T: Real, P: DoubleWellPotential<T>> DoubleWellPotential<T> for &P {
    fn energy(&self, u: T) -> T {
        P::energy(self, u)
    }

    fn derivative(&self, u: T) -> T {
        P::derivative(self, u)
    }

    fn second_derivative(&self, u: T) -> T {
        P::second_derivative(self, u)
    }
}

/// The quartic potential `W(u) = (u² - 1)² / 4` with wells at `u = ±1`.
///
/// Its derivative `W'(u) = u³ - u` vanishes exactly at `-1`, `0` and `1`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct QuarticDoubleWell;

impl<T: Real> DoubleWellPotential<T> for QuarticDoubleWell {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn energy(&self, u: T) -> T {
        let s = u * u - 1.0;
        0.25 * s * s
    }

    fn derivative(&self, u: T) -> T {
        u * u * u - u
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn second_derivative(&self, u: T) -> T {
        3.0 * u * u - 1.0
    }
}
