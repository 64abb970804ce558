//! Dimensional analysis types
//!
//! Each physical quantity has dimensions represented as a 7-element vector:
//! [mass, length, time, current, luminous intensity, temperature, amount]
//!
//! Exponents are real numbers so that roots of quantities stay representable
//! (the square root of an area has length exponent 0.5).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Dimension indices for the 7 SI base quantities
pub const MASS: usize = 0;
pub const LENGTH: usize = 1;
pub const TIME: usize = 2;
pub const CURRENT: usize = 3;
pub const LUMINOUS_INTENSITY: usize = 4;
pub const TEMPERATURE: usize = 5;
pub const AMOUNT: usize = 6;

/// Number of SI base dimensions
pub const BASE_DIMENSIONS: usize = 7;

/// Symbols of the SI base units, in dimension-vector order
pub const BASE_SYMBOLS: [&str; BASE_DIMENSIONS] = ["kg", "m", "s", "A", "cd", "K", "mol"];

/// Exponents of the 7 SI base dimensions.
///
/// Two vectors are equal only if all seven components are exactly equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionVector {
    exponents: [f64; BASE_DIMENSIONS],
}

impl DimensionVector {
    /// Dimensionless (all exponents zero). Never the dimension of a Quantity.
    pub const DIMENSIONLESS: DimensionVector = DimensionVector::new([0.0; 7]);

    /// Mass [M]
    pub const MASS: DimensionVector = DimensionVector::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    /// Length [L]
    pub const LENGTH: DimensionVector = DimensionVector::new([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    /// Time [T]
    pub const TIME: DimensionVector = DimensionVector::new([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);

    /// Electric current [I]
    pub const CURRENT: DimensionVector = DimensionVector::new([0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);

    /// Luminous intensity [J]
    pub const LUMINOUS_INTENSITY: DimensionVector =
        DimensionVector::new([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Temperature [Θ]
    pub const TEMPERATURE: DimensionVector =
        DimensionVector::new([0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

    /// Amount of substance [N]
    pub const AMOUNT: DimensionVector = DimensionVector::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    /// Force [M L T^-2]
    pub const FORCE: DimensionVector = DimensionVector::new([1.0, 1.0, -2.0, 0.0, 0.0, 0.0, 0.0]);

    /// Area [L^2]
    pub const AREA: DimensionVector = DimensionVector::new([0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    /// Frequency [T^-1]
    pub const FREQUENCY: DimensionVector =
        DimensionVector::new([0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]);

    /// Create a new dimension from exponents
    pub const fn new(exponents: [f64; BASE_DIMENSIONS]) -> Self {
        DimensionVector { exponents }
    }

    /// Build from a slice; `None` unless it has exactly 7 components.
    pub fn from_slice(exponents: &[f64]) -> Option<Self> {
        let exponents: [f64; BASE_DIMENSIONS] = exponents.try_into().ok()?;
        Some(DimensionVector { exponents })
    }

    /// Unit vector along one base dimension
    pub fn base(index: usize) -> Option<Self> {
        if index >= BASE_DIMENSIONS {
            return None;
        }
        let mut exponents = [0.0; BASE_DIMENSIONS];
        exponents[index] = 1.0;
        Some(DimensionVector { exponents })
    }

    pub fn exponents(&self) -> &[f64; BASE_DIMENSIONS] {
        &self.exponents
    }

    pub fn component(&self, index: usize) -> Option<f64> {
        self.exponents.get(index).copied()
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0.0)
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &DimensionVector) -> DimensionVector {
        self.zip_with(other, |a, b| a + b)
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &DimensionVector) -> DimensionVector {
        self.zip_with(other, |a, b| a - b)
    }

    /// Raise to a real power (scale exponents)
    pub fn power(&self, exp: f64) -> DimensionVector {
        let mut exponents = self.exponents;
        for e in &mut exponents {
            *e *= exp;
        }
        DimensionVector { exponents }
    }

    /// Invert dimensions (negate exponents)
    pub fn invert(&self) -> DimensionVector {
        self.power(-1.0)
    }

    fn zip_with(&self, other: &DimensionVector, f: impl Fn(f64, f64) -> f64) -> DimensionVector {
        let mut exponents = [0.0; BASE_DIMENSIONS];
        for (i, e) in exponents.iter_mut().enumerate() {
            *e = f(self.exponents[i], other.exponents[i]);
        }
        DimensionVector { exponents }
    }
}

// Exponents come from validated definitions and finite arithmetic, so the
// exact comparison is reflexive in practice.
impl Eq for DimensionVector {}

impl Hash for DimensionVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for e in &self.exponents {
            // -0.0 == 0.0, so both must hash alike
            let normalized = if *e == 0.0 { 0.0f64 } else { *e };
            normalized.to_bits().hash(state);
        }
    }
}

impl Default for DimensionVector {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}

impl Add for DimensionVector {
    type Output = DimensionVector;

    fn add(self, rhs: DimensionVector) -> DimensionVector {
        self.multiply(&rhs)
    }
}

impl Sub for DimensionVector {
    type Output = DimensionVector;

    fn sub(self, rhs: DimensionVector) -> DimensionVector {
        self.divide(&rhs)
    }
}

impl Mul<f64> for DimensionVector {
    type Output = DimensionVector;

    fn mul(self, rhs: f64) -> DimensionVector {
        self.power(rhs)
    }
}

impl Neg for DimensionVector {
    type Output = DimensionVector;

    fn neg(self) -> DimensionVector {
        self.invert()
    }
}

/// Renders the SI base-unit composition, e.g. `kg m^-1 s^-2`.
impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        for (i, &exp) in self.exponents.iter().enumerate() {
            if exp == 0.0 {
                continue;
            }
            if exp == 1.0 {
                parts.push(BASE_SYMBOLS[i].to_string());
            } else {
                parts.push(format!("{}^{}", BASE_SYMBOLS[i], exp));
            }
        }

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_dimensionless() {
        assert!(DimensionVector::DIMENSIONLESS.is_dimensionless());
        assert!(!DimensionVector::LENGTH.is_dimensionless());
    }

    #[test]
    fn test_force() {
        let acceleration = DimensionVector::LENGTH.divide(&DimensionVector::TIME.power(2.0));
        let force = DimensionVector::MASS.multiply(&acceleration);
        assert_eq!(force, DimensionVector::FORCE);
    }

    #[test]
    fn test_fractional_power() {
        let root = DimensionVector::AREA.power(0.5);
        assert_eq!(root, DimensionVector::LENGTH);

        let half = DimensionVector::LENGTH.power(0.5);
        assert_eq!(half.component(LENGTH), Some(0.5));
        assert_ne!(half, DimensionVector::LENGTH);
    }

    #[test]
    fn test_from_slice_requires_seven() {
        assert!(DimensionVector::from_slice(&[1.0, 0.0, 0.0]).is_none());
        assert_eq!(
            DimensionVector::from_slice(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Some(DimensionVector::LENGTH)
        );
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        let a = DimensionVector::new([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = DimensionVector::new([-0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a, b);

        let set: HashSet<DimensionVector> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DimensionVector::DIMENSIONLESS), "1");
        assert_eq!(format!("{}", DimensionVector::LENGTH), "m");
        assert_eq!(format!("{}", DimensionVector::FORCE), "kg m s^-2");
        assert_eq!(format!("{}", DimensionVector::LENGTH.power(0.5)), "m^0.5");
    }

    #[test]
    fn test_serde_as_plain_array() {
        let json = serde_json::to_string(&DimensionVector::LENGTH).unwrap();
        assert_eq!(json, "[0.0,1.0,0.0,0.0,0.0,0.0,0.0]");
    }
}
