use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of independent variable ids. Ids are unique within the process, so
/// values built in different places never share a variable by accident; this
/// counter is the only state shared between calls and holds nothing else.
static NEXT_VARIABLE: AtomicU64 = AtomicU64::new(0);

/// A value with a standard error, propagated to first order.
///
/// Each value remembers its linear dependence on the independent variables it
/// was computed from, so correlations are respected: `&x - &x` is exactly zero
/// with zero error, while the difference of two independent values adds their
/// errors in quadrature.
#[derive(Debug, Clone, PartialEq)]
pub struct UFloat {
    nominal: f64,
    // derivative with respect to each independent variable, times its std dev
    components: BTreeMap<u64, f64>,
}

impl UFloat {
    /// A new independent variable.
    ///
    /// Every call gets a fresh id, so two values built from the same numbers
    /// are still uncorrelated; only values derived from one another share ids.
    pub fn new(nominal: f64, std_dev: f64) -> Self {
        let id = NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed);
        let mut components = BTreeMap::new();
        components.insert(id, std_dev.abs());
        UFloat {
            nominal,
            components,
        }
    }

    /// A value without uncertainty.
    pub fn exact(nominal: f64) -> Self {
        UFloat {
            nominal,
            components: BTreeMap::new(),
        }
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn std_dev(&self) -> f64 {
        self.components.values().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Apply a function with the given value and derivative at `self.nominal`.
    fn apply(&self, value: f64, derivative: f64) -> Self {
        UFloat {
            nominal: value,
            components: self
                .components
                .iter()
                .map(|(id, c)| (*id, derivative * c))
                .collect(),
        }
    }

    fn combine(&self, other: &UFloat, sign: f64) -> Self {
        let mut components = self.components.clone();
        for (id, c) in other.components.iter() {
            *components.entry(*id).or_insert(0.0) += sign * c;
        }
        UFloat {
            nominal: self.nominal + sign * other.nominal,
            components,
        }
    }

    pub fn exp(&self) -> Self {
        let value = self.nominal.exp();
        self.apply(value, value)
    }

    pub fn ln(&self) -> Self {
        self.apply(self.nominal.ln(), 1.0 / self.nominal)
    }

    pub fn log10(&self) -> Self {
        self.apply(
            self.nominal.log10(),
            1.0 / (self.nominal * std::f64::consts::LN_10),
        )
    }
}

impl From<(f64, f64)> for UFloat {
    fn from((nominal, std_dev): (f64, f64)) -> Self {
        UFloat::new(nominal, std_dev)
    }
}

impl fmt::Display for UFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+/-{}", self.nominal, self.std_dev())
    }
}

impl<'a> Add<&'a UFloat> for &'a UFloat {
    type Output = UFloat;

    fn add(self, other: &'a UFloat) -> UFloat {
        self.combine(other, 1.0)
    }
}

impl<'a> Sub<&'a UFloat> for &'a UFloat {
    type Output = UFloat;

    fn sub(self, other: &'a UFloat) -> UFloat {
        self.combine(other, -1.0)
    }
}

impl Add for UFloat {
    type Output = UFloat;

    fn add(self, other: UFloat) -> UFloat {
        &self + &other
    }
}

impl Sub for UFloat {
    type Output = UFloat;

    fn sub(self, other: UFloat) -> UFloat {
        &self - &other
    }
}

impl Neg for &UFloat {
    type Output = UFloat;

    fn neg(self) -> UFloat {
        self.apply(-self.nominal, -1.0)
    }
}

impl Neg for UFloat {
    type Output = UFloat;

    fn neg(self) -> UFloat {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_errors_add_in_quadrature() {
        let a = UFloat::new(3.0, 0.3);
        let b = UFloat::new(1.0, 0.4);
        let diff = &a - &b;
        assert_abs_diff_eq!(diff.nominal(), 2.0);
        assert_abs_diff_eq!(diff.std_dev(), 0.5, epsilon = 1e-12);
        let sum = a + b;
        assert_abs_diff_eq!(sum.nominal(), 4.0);
        assert_abs_diff_eq!(sum.std_dev(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_correlated_values_cancel() {
        let a = UFloat::new(3.0, 0.3);
        let zero = &a - &a;
        assert_eq!(zero.nominal(), 0.0);
        assert_eq!(zero.std_dev(), 0.0);
        let double = &a + &a;
        assert_abs_diff_eq!(double.std_dev(), 0.6, epsilon = 1e-12);
        let b = -&a;
        assert_abs_diff_eq!((&a + &b).std_dev(), 0.0);
    }

    #[test]
    fn test_functions() {
        let x = UFloat::new(2.0, 0.1);
        let e = x.exp();
        assert_relative_eq!(e.nominal(), 2f64.exp(), max_relative = 1e-12);
        assert_relative_eq!(e.std_dev(), 0.1 * 2f64.exp(), max_relative = 1e-12);

        let l = e.ln();
        assert_relative_eq!(l.nominal(), 2.0, max_relative = 1e-12);
        assert_relative_eq!(l.std_dev(), 0.1, max_relative = 1e-12);

        let l10 = e.log10();
        assert_relative_eq!(l10.nominal(), 2.0 / std::f64::consts::LN_10, max_relative = 1e-12);
        assert_relative_eq!(l10.std_dev(), 0.1 / std::f64::consts::LN_10, max_relative = 1e-12);
    }

    #[test]
    fn test_equal_inputs_are_still_independent() {
        let a = UFloat::new(-100.0, 0.5);
        let b = UFloat::new(-100.0, 0.5);
        assert_ne!(a, b);
        let diff = &a - &b;
        assert_eq!(diff.nominal(), 0.0);
        assert_abs_diff_eq!(diff.std_dev(), 0.5 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_exact_and_display() {
        let x = UFloat::exact(1.5);
        assert_eq!(x.std_dev(), 0.0);
        assert_eq!(UFloat::from((1.0, -0.5)).std_dev(), 0.5);
        assert_eq!(format!("{}", UFloat::new(1.0, 0.25)), "1+/-0.25");
    }
}
