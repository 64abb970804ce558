//! Quantity type - an SI magnitude tied to a dimension vector
//!
//! Quantities are immutable: every operation returns a new value. The
//! magnitude is always stored in SI base units; the conversion factor only
//! records which non-SI unit the value came from.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use quanta_core::number::{self, is_close, is_zero};
use quanta_core::{DimensionVector, QuantaError, Result};

use crate::operand::{AssignOp, Operand};
use crate::settings::DEFAULT_SIGNIFICANT_DIGITS;
use crate::{Representation, UnitRegistry};

/// A physical quantity: SI magnitude, dimension vector, conversion factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity", into = "RawQuantity")]
pub struct Quantity {
    magnitude: f64,
    dimensions: DimensionVector,
    conv_factor: f64,
}

#[derive(Serialize, Deserialize)]
struct RawQuantity {
    magnitude: f64,
    dimensions: DimensionVector,
    #[serde(default = "unit_factor")]
    conv_factor: f64,
}

fn unit_factor() -> f64 {
    1.0
}

impl TryFrom<RawQuantity> for Quantity {
    type Error = QuantaError;

    fn try_from(raw: RawQuantity) -> Result<Self> {
        Quantity::with_conv_factor(raw.magnitude, raw.dimensions, raw.conv_factor)
    }
}

impl From<Quantity> for RawQuantity {
    fn from(q: Quantity) -> Self {
        RawQuantity {
            magnitude: q.magnitude,
            dimensions: q.dimensions,
            conv_factor: q.conv_factor,
        }
    }
}

impl Quantity {
    /// Create an SI quantity. Fails for a dimensionless vector (use a plain
    /// number instead) or a non-finite magnitude.
    pub fn new(magnitude: f64, dimensions: DimensionVector) -> Result<Self> {
        Self::with_conv_factor(magnitude, dimensions, 1.0)
    }

    /// Create a quantity remembering the non-SI unit it came from
    pub fn with_conv_factor(
        magnitude: f64,
        dimensions: DimensionVector,
        conv_factor: f64,
    ) -> Result<Self> {
        if dimensions.is_dimensionless() {
            return Err(QuantaError::InvalidOperand {
                op: "construct a Quantity",
                operand: "a dimensionless vector (use a plain number instead)".to_string(),
            });
        }
        if !magnitude.is_finite() {
            return Err(QuantaError::InvalidOperand {
                op: "construct a Quantity",
                operand: format!("non-finite magnitude {}", magnitude),
            });
        }
        if !(conv_factor.is_finite() && conv_factor > 0.0) {
            return Err(QuantaError::InvalidOperand {
                op: "construct a Quantity",
                operand: format!("conversion factor {}", conv_factor),
            });
        }
        Ok(Self::from_parts(magnitude, dimensions, conv_factor))
    }

    /// Callers guarantee a non-dimensionless vector.
    pub(crate) fn from_parts(magnitude: f64, dimensions: DimensionVector, conv_factor: f64) -> Self {
        debug_assert!(!dimensions.is_dimensionless());
        Quantity {
            magnitude,
            dimensions,
            conv_factor,
        }
    }

    /// Decays to a plain number when the dimensions cancel out
    fn product(magnitude: f64, dimensions: DimensionVector, conv_factor: f64) -> Operand {
        if dimensions.is_dimensionless() {
            Operand::Number(magnitude)
        } else {
            Operand::Quantity(Self::from_parts(magnitude, dimensions, conv_factor))
        }
    }

    /// Magnitude in SI base units
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn dimensions(&self) -> DimensionVector {
        self.dimensions
    }

    /// SI base units per unit of the originating unit
    pub fn conv_factor(&self) -> f64 {
        self.conv_factor
    }

    /// True when the quantity was built from an SI unit
    pub fn is_si(&self) -> bool {
        self.conv_factor == 1.0
    }

    /// Approximately zero
    pub fn is_zero(&self) -> bool {
        is_zero(self.magnitude)
    }

    /// Like `product`, for results of fallible arithmetic: a magnitude or
    /// conversion factor that left the finite range is an error.
    fn checked(
        op: &'static str,
        magnitude: f64,
        dimensions: DimensionVector,
        conv_factor: f64,
    ) -> Result<Operand> {
        if !magnitude.is_finite() {
            return Err(out_of_range(op, "magnitude", magnitude));
        }
        if !(conv_factor.is_finite() && conv_factor > 0.0) {
            return Err(out_of_range(op, "conversion factor", conv_factor));
        }
        Ok(Self::product(magnitude, dimensions, conv_factor))
    }

    fn scaled(&self, factor: f64) -> Quantity {
        Self::from_parts(self.magnitude * factor, self.dimensions, self.conv_factor)
    }

    /// `self * factor`, failing on a non-finite factor or result
    pub fn scale(&self, factor: f64) -> Result<Quantity> {
        if !factor.is_finite() {
            return Err(invalid("multiply", factor));
        }
        let magnitude = self.magnitude * factor;
        if !magnitude.is_finite() {
            return Err(out_of_range("multiply", "magnitude", magnitude));
        }
        Ok(Self::from_parts(magnitude, self.dimensions, self.conv_factor))
    }

    fn mismatch(&self, op: &'static str, other: &Quantity) -> QuantaError {
        QuantaError::DimensionMismatch {
            op,
            left: self.dimensions,
            right: other.dimensions,
        }
    }

    // ========== Arithmetic ==========

    /// Add a quantity of equal dimensions, or the number 0.
    /// The result keeps this quantity's conversion factor.
    pub fn add(&self, rhs: impl Into<Operand>) -> Result<Quantity> {
        match rhs.into() {
            Operand::Number(n) if n == 0.0 => Ok(*self),
            Operand::Number(n) => Err(invalid("add", n)),
            Operand::Quantity(other) => {
                if self.dimensions != other.dimensions {
                    return Err(self.mismatch("add", &other));
                }
                let magnitude = self.magnitude + other.magnitude;
                if !magnitude.is_finite() {
                    return Err(out_of_range("add", "magnitude", magnitude));
                }
                Ok(Self::from_parts(magnitude, self.dimensions, self.conv_factor))
            }
        }
    }

    /// Subtract a quantity of equal dimensions, or the number 0.
    pub fn sub(&self, rhs: impl Into<Operand>) -> Result<Quantity> {
        match rhs.into() {
            Operand::Number(n) if n == 0.0 => Ok(*self),
            Operand::Number(n) => Err(invalid("subtract", n)),
            Operand::Quantity(other) => {
                if self.dimensions != other.dimensions {
                    return Err(self.mismatch("subtract", &other));
                }
                let magnitude = self.magnitude - other.magnitude;
                if !magnitude.is_finite() {
                    return Err(out_of_range("subtract", "magnitude", magnitude));
                }
                Ok(Self::from_parts(magnitude, self.dimensions, self.conv_factor))
            }
        }
    }

    /// Multiply by a number or another quantity; a dimensionless product
    /// comes back as a plain number.
    pub fn mul(&self, rhs: impl Into<Operand>) -> Result<Operand> {
        match rhs.into() {
            Operand::Number(n) => self.scale(n).map(Operand::Quantity),
            Operand::Quantity(other) => Self::checked(
                "multiply",
                self.magnitude * other.magnitude,
                self.dimensions.multiply(&other.dimensions),
                self.conv_factor * other.conv_factor,
            ),
        }
    }

    /// Divide by a number or another quantity. A zero-valued divisor, bare
    /// or quantity, fails with `DivideByZero`; a zero dividend does not.
    pub fn div(&self, rhs: impl Into<Operand>) -> Result<Operand> {
        match rhs.into() {
            Operand::Number(n) => {
                if n == 0.0 {
                    return Err(QuantaError::DivideByZero);
                }
                if !n.is_finite() {
                    return Err(invalid("divide", n));
                }
                Self::checked(
                    "divide",
                    self.magnitude / n,
                    self.dimensions,
                    self.conv_factor,
                )
            }
            Operand::Quantity(other) => {
                if other.magnitude == 0.0 {
                    return Err(QuantaError::DivideByZero);
                }
                Self::checked(
                    "divide",
                    self.magnitude / other.magnitude,
                    self.dimensions.divide(&other.dimensions),
                    self.conv_factor / other.conv_factor,
                )
            }
        }
    }

    /// `n / self`. Zero over a quantity is a zero quantity of the inverse
    /// dimensions.
    pub fn rdiv(&self, numerator: f64) -> Result<Quantity> {
        if self.magnitude == 0.0 {
            return Err(QuantaError::DivideByZero);
        }
        if !numerator.is_finite() {
            return Err(invalid("divide", numerator));
        }
        let magnitude = numerator / self.magnitude;
        if !magnitude.is_finite() {
            return Err(out_of_range("divide", "magnitude", magnitude));
        }
        Ok(Self::from_parts(
            magnitude,
            self.dimensions.invert(),
            1.0 / self.conv_factor,
        ))
    }

    /// Raise to a real power. Raising to a quantity is always an error.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<Operand> {
        let exp = match exponent.into() {
            Operand::Number(e) => e,
            Operand::Quantity(q) => {
                return Err(QuantaError::InvalidOperand {
                    op: "raise a Quantity to the power of",
                    operand: format!("the Quantity {}", q),
                })
            }
        };
        if !exp.is_finite() {
            return Err(invalid("raise a Quantity to the power of", exp));
        }

        let magnitude = self.magnitude.powf(exp);
        if !magnitude.is_finite() {
            return Err(QuantaError::InvalidOperand {
                op: "raise a Quantity to the power of",
                operand: format!("{} (result {} is not a real number)", exp, magnitude),
            });
        }
        Self::checked(
            "raise a Quantity to the power of",
            magnitude,
            self.dimensions.power(exp),
            self.conv_factor.powf(exp),
        )
    }

    pub fn sqrt(&self) -> Result<Operand> {
        self.pow(0.5)
    }

    /// n-th root
    pub fn root(&self, n: f64) -> Result<Operand> {
        if n == 0.0 {
            return Err(QuantaError::DivideByZero);
        }
        self.pow(1.0 / n)
    }

    /// Flip the sign only when negative
    pub fn abs(&self) -> Quantity {
        if self.magnitude < 0.0 {
            -*self
        } else {
            *self
        }
    }

    /// Round the SI magnitude to `ndigits` decimal places
    pub fn round(&self, ndigits: i32) -> Quantity {
        Self::from_parts(
            number::round_to(self.magnitude, ndigits),
            self.dimensions,
            self.conv_factor,
        )
    }

    /// Compound assignment always fails; quantities are immutable.
    pub fn assign(&self, op: AssignOp, _rhs: impl Into<Operand>) -> Result<Quantity> {
        Err(QuantaError::ImmutableMutation {
            op: op.symbol(),
            binary: op.binary().symbol(),
        })
    }

    // ========== Comparison ==========

    /// Compare against a quantity of equal dimensions or the number 0.
    ///
    /// Against 0 a magnitude within `ABS_TOL` compares `Equal`. Between two
    /// quantities only the relative tolerance applies, so small-scale values
    /// such as picofarads still order correctly.
    pub fn try_cmp(&self, rhs: impl Into<Operand>) -> Result<std::cmp::Ordering> {
        let (other, equal) = match rhs.into() {
            Operand::Number(n) if n == 0.0 => (0.0, is_zero(self.magnitude)),
            Operand::Number(n) => return Err(invalid("compare", n)),
            Operand::Quantity(other) => {
                if self.dimensions != other.dimensions {
                    return Err(self.mismatch("compare", &other));
                }
                (other.magnitude, is_close(self.magnitude, other.magnitude))
            }
        };

        if equal {
            return Ok(std::cmp::Ordering::Equal);
        }
        Ok(self.magnitude.total_cmp(&other))
    }

    pub fn try_eq(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_eq())
    }

    pub fn try_ne(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_ne())
    }

    pub fn try_lt(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_lt())
    }

    pub fn try_le(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_le())
    }

    pub fn try_gt(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_gt())
    }

    pub fn try_ge(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.try_cmp(rhs)?.is_ge())
    }

    // ========== Conversion ==========

    /// Render in `unit` (or the registry's pick when `None`).
    /// `Ok(None)` means the conversion failed under the print policy.
    pub fn to(&self, registry: &UnitRegistry, unit: Option<&str>) -> Result<Option<String>> {
        registry.formatter().to(self, unit)
    }

    /// Paired (value, unit) representation in `unit`
    pub fn represent(&self, registry: &UnitRegistry, unit: &str) -> Result<Option<Representation>> {
        registry.formatter().represent(self, unit)
    }
}

fn invalid(op: &'static str, n: f64) -> QuantaError {
    QuantaError::InvalidOperand {
        op,
        operand: format!("the number {}", n),
    }
}

fn out_of_range(op: &'static str, what: &str, value: f64) -> QuantaError {
    QuantaError::InvalidOperand {
        op,
        operand: format!("a result whose {} is {} (not a finite real number)", what, value),
    }
}

impl std::ops::Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.scaled(-1.0)
    }
}

/// Unchecked scaling for building values from units. Use [`Quantity::scale`]
/// or [`Quantity::mul`] when the factor is untrusted.
impl std::ops::Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.scaled(rhs)
    }
}

/// `2.0 * unit`, the usual way to build a quantity
impl std::ops::Mul<Quantity> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        rhs.scaled(self)
    }
}

/// Field-wise identity, consistent with `Hash`. Tolerance-based equality
/// is `try_eq`; two quantities equal under it may still differ here.
impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude.to_bits() == other.magnitude.to_bits()
            && self.dimensions == other.dimensions
            && self.conv_factor.to_bits() == other.conv_factor.to_bits()
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.magnitude.to_bits().hash(state);
        self.dimensions.hash(state);
        self.conv_factor.to_bits().hash(state);
    }
}

/// SI rendering without a registry, e.g. `2450 kg s^-2`
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            number::format_significant(self.magnitude, DEFAULT_SIGNIFICANT_DIGITS),
            self.dimensions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quanta_core::codes;
    use std::cmp::Ordering;

    fn meter() -> Quantity {
        Quantity::new(1.0, DimensionVector::LENGTH).unwrap()
    }

    fn second() -> Quantity {
        Quantity::new(1.0, DimensionVector::TIME).unwrap()
    }

    fn foot() -> Quantity {
        Quantity::with_conv_factor(0.3048, DimensionVector::LENGTH, 0.3048).unwrap()
    }

    fn mass(v: f64) -> Quantity {
        Quantity::new(v, DimensionVector::MASS).unwrap()
    }

    #[test]
    fn test_dimensionless_construction_rejected() {
        let err = Quantity::new(5.0, DimensionVector::DIMENSIONLESS).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_OPERAND);
        assert!(Quantity::new(f64::NAN, DimensionVector::MASS).is_err());
        assert!(Quantity::with_conv_factor(1.0, DimensionVector::MASS, 0.0).is_err());
    }

    #[test]
    fn test_neg_and_abs() {
        let q = mass(5.2);
        let neg = -q;
        assert_eq!(neg.magnitude(), -5.2);
        assert_eq!(neg.dimensions(), q.dimensions());

        assert_eq!(neg.abs().magnitude(), 5.2);
        assert_eq!(q.abs(), q);
        assert!(neg.abs().try_eq(q).unwrap());
        assert_eq!(-(-q), q);
    }

    #[test]
    fn test_add_zero_identity() {
        let q = mass(5.2);
        assert_eq!(q.add(0.0).unwrap(), q);
        assert_eq!(q.sub(0).unwrap(), q);
    }

    #[test]
    fn test_add_rejects_non_zero_number() {
        let err = mass(5.2).add(5.0).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_OPERAND);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let err = mass(1.0).add(meter()).unwrap_err();
        assert!(matches!(err, QuantaError::DimensionMismatch { .. }));
        let err = mass(1.0).sub(meter()).unwrap_err();
        assert!(matches!(err, QuantaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_add_keeps_left_conv_factor() {
        let sum = foot().add(meter()).unwrap();
        assert_eq!(sum.conv_factor(), 0.3048);
        assert_relative_eq!(sum.magnitude(), 1.3048, max_relative = 1e-12);

        let sum = meter().add(foot()).unwrap();
        assert!(sum.is_si());
    }

    #[test]
    fn test_mul_by_number() {
        let q = foot().mul(3.0).unwrap().as_quantity().unwrap();
        assert_relative_eq!(q.magnitude(), 0.9144, max_relative = 1e-12);
        assert_eq!(q.conv_factor(), 0.3048);

        let q = 3.0 * foot();
        assert_relative_eq!(q.magnitude(), 0.9144, max_relative = 1e-12);
    }

    #[test]
    fn test_mul_adds_dimensions() {
        let area = meter().mul(meter()).unwrap().as_quantity().unwrap();
        assert_eq!(area.dimensions(), DimensionVector::AREA);
    }

    #[test]
    fn test_mul_decays_to_number() {
        let hz = second().rdiv(1.0).unwrap();
        let product = (5.0 * second()).mul(hz).unwrap();
        assert_eq!(product, Operand::Number(5.0));
    }

    #[test]
    fn test_div_subtracts_dimensions() {
        let speed = (100.0 * meter()).div(10.0 * second()).unwrap();
        let speed = speed.as_quantity().unwrap();
        assert_eq!(speed.magnitude(), 10.0);
        assert_eq!(
            speed.dimensions(),
            DimensionVector::LENGTH.divide(&DimensionVector::TIME)
        );

        let ratio = (3.0 * meter()).div(2.0 * meter()).unwrap();
        assert_eq!(ratio, Operand::Number(1.5));
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(meter().div(0.0).unwrap_err(), QuantaError::DivideByZero);
        assert_eq!(
            meter().div(0.0 * meter()).unwrap_err(),
            QuantaError::DivideByZero
        );
        assert_eq!(
            (0.0 * meter()).div(0.0 * meter()).unwrap_err(),
            QuantaError::DivideByZero
        );
    }

    #[test]
    fn test_zero_dividend_is_allowed() {
        assert_eq!((0.0 * meter()).div(2.0 * meter()).unwrap(), Operand::Number(0.0));
        let zero = (0.0 * meter()).div(second()).unwrap().as_quantity().unwrap();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_tiny_divisor_is_not_zero() {
        let rate = meter().div(1e-13 * second()).unwrap().as_quantity().unwrap();
        assert_relative_eq!(rate.magnitude(), 1e13, max_relative = 1e-12);
        let hz = (1e-13 * second()).rdiv(1.0).unwrap();
        assert_relative_eq!(hz.magnitude(), 1e13, max_relative = 1e-12);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let big = 1e200 * meter();
        let err = big.mul(big).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_OPERAND);
        assert!(big.mul(1e200).is_err());
        assert!(meter().div(1e-320).is_err());
        assert!(big.div(1e-200 * second()).is_err());
        assert!(second().rdiv(1e-320).is_ok());
        assert!((1e-320 * second()).rdiv(1.0).is_err());
        let max = f64::MAX * meter();
        assert!(max.add(max).is_err());
        assert!((-max).sub(max).is_err());
        assert!(big.pow(2.0).is_err());
    }

    #[test]
    fn test_non_finite_factor_is_an_error() {
        assert!(meter().mul(f64::NAN).is_err());
        assert!(meter().mul(f64::INFINITY).is_err());
        assert!(meter().scale(f64::NAN).is_err());
        assert!(meter().div(f64::INFINITY).is_err());
        assert!(second().rdiv(f64::NAN).is_err());
        assert_relative_eq!(meter().scale(2.5).unwrap().magnitude(), 2.5);
    }

    #[test]
    fn test_conv_factor_out_of_range_is_an_error() {
        let tiny = Quantity::with_conv_factor(1.0, DimensionVector::LENGTH, 1e-200).unwrap();
        let err = tiny.mul(tiny).unwrap_err();
        assert!(err.to_string().contains("conversion factor"));
    }

    #[test]
    fn test_zero_over_quantity_is_inverse_zero() {
        let q = second().rdiv(0.0).unwrap();
        assert!(q.is_zero());
        assert_eq!(q.dimensions(), DimensionVector::FREQUENCY);
    }

    #[test]
    fn test_pow() {
        let area = (4.0 * meter()).pow(2.0).unwrap().as_quantity().unwrap();
        assert_eq!(area.magnitude(), 16.0);
        assert_eq!(area.dimensions(), DimensionVector::AREA);

        let side = (4.0 * meter()).pow(2.0).unwrap();
        let side = side.as_quantity().unwrap().sqrt().unwrap();
        assert!(side.as_quantity().unwrap().try_eq(4.0 * meter()).unwrap());

        let volume = (8.0 * meter()).pow(3.0).unwrap().as_quantity().unwrap();
        let edge = volume.root(3.0).unwrap().as_quantity().unwrap();
        assert_eq!(edge.dimensions(), DimensionVector::LENGTH);
        assert_relative_eq!(edge.magnitude(), 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_pow_fractional_exponent() {
        let q = (9.0 * meter()).sqrt().unwrap().as_quantity().unwrap();
        assert_relative_eq!(q.magnitude(), 3.0, max_relative = 1e-12);
        assert_eq!(q.dimensions().component(1), Some(0.5));
    }

    #[test]
    fn test_pow_zero_decays() {
        assert_eq!(meter().pow(0.0).unwrap(), Operand::Number(1.0));
    }

    #[test]
    fn test_pow_by_quantity_fails() {
        let err = meter().pow(second()).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_OPERAND);
    }

    #[test]
    fn test_pow_conv_factor() {
        let sq_ft = foot().pow(2.0).unwrap().as_quantity().unwrap();
        assert_relative_eq!(sq_ft.conv_factor(), 0.09290304, max_relative = 1e-12);
        assert!(!sq_ft.is_si());
    }

    #[test]
    fn test_comparisons() {
        let a = 1.0 * meter();
        let b = 1000.0 * Quantity::new(0.001, DimensionVector::LENGTH).unwrap();
        assert!(a.try_eq(b).unwrap());
        assert!(a.try_le(b).unwrap());
        assert!(!a.try_lt(b).unwrap());
        assert!(a.try_gt(foot()).unwrap());
        assert!(foot().try_lt(a).unwrap());
        assert!(a.try_ne(foot()).unwrap());
    }

    #[test]
    fn test_compare_with_zero() {
        assert!(meter().try_gt(0.0).unwrap());
        assert!((-meter()).try_lt(0).unwrap());
        assert!((1e-13 * meter()).try_eq(0.0).unwrap());
        assert_eq!(meter().try_cmp(0.0).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_small_magnitudes_compare_relatively() {
        let a = 1e-13 * second();
        let b = 9e-13 * second();
        assert!(a.try_lt(b).unwrap());
        assert!(!a.try_eq(b).unwrap());
        assert!(b.try_gt(a).unwrap());
        assert!((1e-12 * second()).try_ne(2e-12 * second()).unwrap());

        let pf = Quantity::new(1e-12, DimensionVector::TIME).unwrap();
        assert!(pf.try_eq(1e-12 * (1.0 + 1e-12) * second()).unwrap());

        // Against 0 the absolute tolerance still applies
        assert!(a.try_eq(0.0).unwrap());
        assert_eq!(b.try_cmp(0).unwrap(), Ordering::Equal);
        assert!((2e-12 * second()).try_gt(0.0).unwrap());
    }

    #[test]
    fn test_compare_errors() {
        let err = meter().try_eq(2.0).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_OPERAND);
        let err = meter().try_lt(second()).unwrap_err();
        assert_eq!(err.code(), codes::DIMENSION_MISMATCH);
    }

    #[test]
    fn test_ordering_is_symmetric_for_non_si() {
        let inch = Quantity::with_conv_factor(0.0254, DimensionVector::LENGTH, 0.0254).unwrap();
        let three_cm = 3.0 * Quantity::with_conv_factor(0.01, DimensionVector::LENGTH, 1.0).unwrap();
        assert!(three_cm.try_gt(inch).unwrap());
        assert!(inch.try_lt(three_cm).unwrap());
    }

    #[test]
    fn test_round() {
        let q = 2.4345635 * Quantity::new(1000.0, DimensionVector::FORCE).unwrap();
        let r = q.round(1);
        assert_eq!(r.magnitude(), 2434.6);
        assert_eq!(r.dimensions(), DimensionVector::FORCE);

        let q = 240.545 * Quantity::new(1000.0, DimensionVector::FORCE).unwrap();
        assert_eq!(q.round(-3).magnitude(), 241000.0);
    }

    #[test]
    fn test_assign_is_rejected() {
        let q = 2.0 * meter();
        let before = q;
        let err = q.assign(AssignOp::Add, meter()).unwrap_err();
        assert_eq!(err.code(), codes::IMMUTABLE);
        assert!(err.to_string().contains("a = a + b"));
        assert_eq!(q, before);

        for op in [AssignOp::Sub, AssignOp::Mul, AssignOp::Div] {
            assert!(q.assign(op, 1.0).is_err());
        }
    }

    #[test]
    fn test_hash_follows_fields() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |q: &Quantity| {
            let mut h = DefaultHasher::new();
            q.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&(2.0 * meter())), hash(&(2.0 * meter())));
        assert_ne!(hash(&meter()), hash(&foot()));
    }

    #[test]
    fn test_display_si() {
        let q = Quantity::new(2450.0, DimensionVector::FORCE).unwrap();
        assert_eq!(q.to_string(), "2450 kg m s^-2");
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&meter()).unwrap();
        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meter());

        let bad = r#"{"magnitude":1.0,"dimensions":[0,0,0,0,0,0,0]}"#;
        assert!(serde_json::from_str::<Quantity>(bad).is_err());
    }
}
