//! Structured errors for quantity arithmetic and unit resolution
//!
//! Every failure is surfaced synchronously at the point of violation. Each
//! variant carries a machine-readable code and, where one exists, a hint
//! the caller can act on.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DimensionVector;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const INVALID_OPERAND: &str = "INVALID_OPERAND";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const IMMUTABLE: &str = "IMMUTABLE";
    pub const UNIT_NOT_FOUND: &str = "UNIT_NOT_FOUND";
    pub const AMBIGUOUS_UNIT: &str = "AMBIGUOUS_UNIT";
    pub const REGISTRY_VALIDATION: &str = "REGISTRY_VALIDATION";
    pub const SOURCE_NOT_FOUND: &str = "SOURCE_NOT_FOUND";
    pub const SOURCE_PARSE: &str = "SOURCE_PARSE";
    pub const INVALID_SETTING: &str = "INVALID_SETTING";
    pub const PARSE_QUANTITY: &str = "PARSE_QUANTITY";
}

/// One problem found in a unit definition batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the offending unit
    pub unit: String,
    /// What is wrong with it
    pub problem: String,
}

impl Violation {
    pub fn new(unit: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            problem: problem.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.unit, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantaError {
    #[error("cannot {op} quantities of dimension {left} and {right}: dimensions are incompatible (not equal)")]
    DimensionMismatch {
        op: &'static str,
        left: DimensionVector,
        right: DimensionVector,
    },

    #[error("cannot {op} with {operand}: only a Quantity or the number 0 is allowed here")]
    InvalidOperand { op: &'static str, operand: String },

    #[error("cannot divide by zero")]
    DivideByZero,

    #[error("cannot apply `{op}` to a Quantity because it is immutable; use `a = a {binary} b` to make the operation explicit")]
    ImmutableMutation {
        op: &'static str,
        binary: &'static str,
    },

    #[error("{}", conversion_message(.candidates))]
    UnitNotFound {
        requested: Option<String>,
        dimension: Option<DimensionVector>,
        candidates: Vec<String>,
    },

    #[error("unit '{requested}' is defined more than once ({}); {}", .matches.join(", "), conversion_message(.candidates))]
    AmbiguousUnit {
        requested: String,
        matches: Vec<String>,
        candidates: Vec<String>,
    },

    #[error("invalid unit definitions, {} violation(s): {}", .0.len(), join_violations(.0))]
    RegistryValidation(Vec<Violation>),

    #[error("unit definition source not found at {}", .0.display())]
    RegistrySourceNotFound(PathBuf),

    #[error("unit definition source is not valid JSON: {0}")]
    SourceParse(String),

    #[error("invalid value for setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("cannot parse '{input}' as a quantity: {reason}")]
    ParseQuantity { input: String, reason: String },
}

pub type Result<T, E = QuantaError> = std::result::Result<T, E>;

fn conversion_message(candidates: &[String]) -> String {
    if candidates.is_empty() {
        return "Conversion not possible. No unit is defined for this dimension".to_string();
    }
    let quoted: Vec<String> = candidates.iter().map(|c| format!("\"{}\"", c)).collect();
    format!("Conversion not possible. Possible values to use are: {}", quoted.join(", "))
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serializable snapshot of an error for programmatic consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Violation>,
}

impl QuantaError {
    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            QuantaError::DimensionMismatch { .. } => codes::DIMENSION_MISMATCH,
            QuantaError::InvalidOperand { .. } => codes::INVALID_OPERAND,
            QuantaError::DivideByZero => codes::DIV_ZERO,
            QuantaError::ImmutableMutation { .. } => codes::IMMUTABLE,
            QuantaError::UnitNotFound { .. } => codes::UNIT_NOT_FOUND,
            QuantaError::AmbiguousUnit { .. } => codes::AMBIGUOUS_UNIT,
            QuantaError::RegistryValidation(_) => codes::REGISTRY_VALIDATION,
            QuantaError::RegistrySourceNotFound(_) => codes::SOURCE_NOT_FOUND,
            QuantaError::SourceParse(_) => codes::SOURCE_PARSE,
            QuantaError::InvalidSetting { .. } => codes::INVALID_SETTING,
            QuantaError::ParseQuantity { .. } => codes::PARSE_QUANTITY,
        }
    }

    /// Suggestion for fixing the error, when there is an obvious one
    pub fn suggestion(&self) -> Option<String> {
        match self {
            QuantaError::DimensionMismatch { .. } => {
                Some("Convert both operands to the same dimension first".to_string())
            }
            QuantaError::InvalidOperand { .. } => {
                Some("Multiply the number by a unit to make it a Quantity".to_string())
            }
            QuantaError::DivideByZero => Some("Ensure divisor is not zero".to_string()),
            QuantaError::UnitNotFound {
                dimension: Some(dimension),
                ..
            } => Some(format!(
                "Load a unit with dimension {} or pick one of the listed units",
                dimension
            )),
            QuantaError::UnitNotFound { dimension: None, .. } => {
                Some("Load an environment that defines this unit".to_string())
            }
            QuantaError::AmbiguousUnit { .. } => {
                Some("Request the unit by its name instead of its symbol".to_string())
            }
            QuantaError::RegistrySourceNotFound(_) => {
                Some("Check the environment name and directory".to_string())
            }
            QuantaError::ParseQuantity { .. } => {
                Some("Write a number and a unit separated by a space, e.g. \"1.00 km\"".to_string())
            }
            _ => None,
        }
    }

    /// Structured snapshot for logging or serialization
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
            violations: match self {
                QuantaError::RegistryValidation(v) => v.clone(),
                _ => Vec::new(),
            },
        }
    }
}
