//! Display and failure-handling settings of a registry
//!
//! Every field is validated on assignment, so a `Settings` value is always
//! usable as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use quanta_core::number::MAX_SIGNIFICANT_DIGITS;
use quanta_core::{QuantaError, Result};

pub const DEFAULT_SIGNIFICANT_DIGITS: u8 = 3;

/// What `to` does when the target unit is absent or ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Return the error
    #[default]
    Raise,
    /// Print the message and return no value
    Print,
}

/// Tie-break among candidate units when none is preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintUnit {
    /// Unit with the smallest SI magnitude (largest printed number)
    #[default]
    Smallest,
    /// Unit with the largest SI magnitude
    Largest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct Settings {
    to_fails: FailurePolicy,
    significant_digits: u8,
    print_unit: PrintUnit,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawSettings {
    to_fails: FailurePolicy,
    significant_digits: u8,
    print_unit: PrintUnit,
}

impl Default for RawSettings {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for RawSettings {
    fn from(s: Settings) -> Self {
        RawSettings {
            to_fails: s.to_fails,
            significant_digits: s.significant_digits,
            print_unit: s.print_unit,
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = QuantaError;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let mut settings = Settings::default();
        settings.set_significant_digits(raw.significant_digits)?;
        settings.to_fails = raw.to_fails;
        settings.print_unit = raw.print_unit;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            to_fails: FailurePolicy::Raise,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            print_unit: PrintUnit::Smallest,
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 3] = ["to_fails", "significant_digits", "print_unit"];

    pub fn to_fails(&self) -> FailurePolicy {
        self.to_fails
    }

    pub fn significant_digits(&self) -> u8 {
        self.significant_digits
    }

    pub fn print_unit(&self) -> PrintUnit {
        self.print_unit
    }

    pub fn set_to_fails(&mut self, policy: FailurePolicy) {
        self.to_fails = policy;
    }

    pub fn set_print_unit(&mut self, print_unit: PrintUnit) {
        self.print_unit = print_unit;
    }

    /// Accepts 1..=17
    pub fn set_significant_digits(&mut self, digits: u8) -> Result<()> {
        if digits == 0 || digits > MAX_SIGNIFICANT_DIGITS {
            return Err(QuantaError::InvalidSetting {
                key: "significant_digits".to_string(),
                reason: format!(
                    "expected an integer between 1 and {}, got {}",
                    MAX_SIGNIFICANT_DIGITS, digits
                ),
            });
        }
        self.significant_digits = digits;
        Ok(())
    }

    /// Set a setting from its textual key and value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "to_fails" => self.to_fails = parse_setting(key, value)?,
            "print_unit" => self.print_unit = parse_setting(key, value)?,
            "significant_digits" => {
                let digits: u8 = parse_setting(key, value)?;
                self.set_significant_digits(digits)?;
            }
            _ => {
                return Err(QuantaError::InvalidSetting {
                    key: key.to_string(),
                    reason: format!("unknown setting, expected one of {}", Self::KEYS.join(", ")),
                })
            }
        }
        Ok(())
    }

    /// Textual value of a setting
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "to_fails" => Some(self.to_fails.to_string()),
            "print_unit" => Some(self.print_unit.to_string()),
            "significant_digits" => Some(self.significant_digits.to_string()),
            _ => None,
        }
    }
}

fn parse_setting<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| QuantaError::InvalidSetting {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "raise" => Ok(FailurePolicy::Raise),
            "print" => Ok(FailurePolicy::Print),
            _ => Err(format!("expected 'raise' or 'print', got '{}'", s)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Raise => write!(f, "raise"),
            FailurePolicy::Print => write!(f, "print"),
        }
    }
}

impl FromStr for PrintUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "smallest" => Ok(PrintUnit::Smallest),
            "largest" => Ok(PrintUnit::Largest),
            _ => Err(format!("expected 'smallest' or 'largest', got '{}'", s)),
        }
    }
}

impl fmt::Display for PrintUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintUnit::Smallest => write!(f, "smallest"),
            PrintUnit::Largest => write!(f, "largest"),
        }
    }
}
