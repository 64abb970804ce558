//! Unit definition sources and their validation
//!
//! A source is a JSON object keyed by unit name:
//!
//! ```json
//! { "kN_m": { "Dimension": [1, 0, -2, 0, 0, 0, 0], "Value": 1000, "Symbol": "kN/m" } }
//! ```
//!
//! `Value` and `Factor` default to 1 and `Symbol` defaults to the unit name.
//! A batch is validated as a whole; every problem found is reported.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use quanta_core::{DimensionVector, QuantaError, Result, Violation, BASE_DIMENSIONS};

use crate::UnitEntry;

/// Unit definitions in source order. Duplicate names are kept so that
/// validation can report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitDefinitions {
    entries: Vec<(String, JsonValue)>,
}

impl UnitDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a raw definition record
    pub fn with_unit(mut self, name: impl Into<String>, record: JsonValue) -> Self {
        self.entries.push((name.into(), record));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| QuantaError::SourceParse(e.to_string()))
    }

    /// Build from an already parsed JSON object
    pub fn from_json_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(UnitDefinitions {
                entries: map.into_iter().collect(),
            }),
            other => Err(QuantaError::SourceParse(format!(
                "expected an object keyed by unit name, got {}",
                json_type(&other)
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for UnitDefinitions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DefinitionsVisitor;

        impl<'de> Visitor<'de> for DefinitionsVisitor {
            type Value = UnitDefinitions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an object keyed by unit name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, record)) = map.next_entry::<String, JsonValue>()? {
                    entries.push((name, record));
                }
                Ok(UnitDefinitions { entries })
            }
        }

        deserializer.deserialize_map(DefinitionsVisitor)
    }
}

/// Unit environments shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Structural engineering: mm, kN, kNm, kN/m, kN/m2, MPa...
    Structural,
    /// US customary: inch, ft, yard, mile, lb, lbf, kip, psi...
    UsCustomary,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Structural, Environment::UsCustomary];

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Structural => "structural",
            Environment::UsCustomary => "us_customary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|env| env.name() == name)
    }

    fn json(&self) -> &'static str {
        match self {
            Environment::Structural => include_str!("../environments/structural.json"),
            Environment::UsCustomary => include_str!("../environments/us_customary.json"),
        }
    }
}

/// Where a batch of unit definitions comes from
#[derive(Debug, Clone)]
pub enum UnitSource {
    Definitions(UnitDefinitions),
    Json(String),
    Path(PathBuf),
    Builtin(Environment),
}

impl UnitSource {
    /// `<dir>/<name>.json`, the extension being optional in `name`
    pub fn file(dir: impl AsRef<Path>, name: &str) -> Self {
        let file = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };
        UnitSource::Path(dir.as_ref().join(file))
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            UnitSource::Definitions(defs) => format!("{} inline definition(s)", defs.len()),
            UnitSource::Json(_) => "JSON text".to_string(),
            UnitSource::Path(path) => path.display().to_string(),
            UnitSource::Builtin(env) => format!("builtin environment '{}'", env.name()),
        }
    }

    pub(crate) fn into_definitions(self) -> Result<UnitDefinitions> {
        match self {
            UnitSource::Definitions(defs) => Ok(defs),
            UnitSource::Json(text) => UnitDefinitions::from_json_str(&text),
            UnitSource::Builtin(env) => UnitDefinitions::from_json_str(env.json()),
            UnitSource::Path(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        QuantaError::RegistrySourceNotFound(path.clone())
                    } else {
                        QuantaError::SourceParse(format!("{}: {}", path.display(), e))
                    }
                })?;
                UnitDefinitions::from_json_str(&text)
            }
        }
    }
}

impl From<UnitDefinitions> for UnitSource {
    fn from(defs: UnitDefinitions) -> Self {
        UnitSource::Definitions(defs)
    }
}

impl From<Environment> for UnitSource {
    fn from(env: Environment) -> Self {
        UnitSource::Builtin(env)
    }
}

impl From<PathBuf> for UnitSource {
    fn from(path: PathBuf) -> Self {
        UnitSource::Path(path)
    }
}

/// Validate a whole batch. Either every definition is valid and all entries
/// are returned, or every violation found is.
pub fn validate(defs: &UnitDefinitions) -> Result<Vec<UnitEntry>> {
    let mut violations = Vec::new();
    let mut entries = Vec::with_capacity(defs.len());
    let mut seen = HashSet::new();

    for (name, record) in defs.iter() {
        if !seen.insert(name) {
            violations.push(Violation::new(name, "defined more than once in this batch"));
            continue;
        }
        match validate_record(name, record) {
            Ok(entry) => entries.push(entry),
            Err(mut found) => violations.append(&mut found),
        }
    }

    if violations.is_empty() {
        Ok(entries)
    } else {
        Err(QuantaError::RegistryValidation(violations))
    }
}

fn validate_record(name: &str, record: &JsonValue) -> Result<UnitEntry, Vec<Violation>> {
    let mut violations = Vec::new();

    if name.trim().is_empty() {
        violations.push(Violation::new(name, "unit name must not be empty"));
    }

    let record = match record.as_object() {
        Some(map) => map,
        None => {
            violations.push(Violation::new(
                name,
                format!("definition must be an object, got {}", json_type(record)),
            ));
            return Err(violations);
        }
    };

    let dimensions = match record.get("Dimension") {
        None => {
            violations.push(Violation::new(name, "Dimension is missing"));
            None
        }
        Some(value) => match parse_dimension(value) {
            Ok(dims) => Some(dims),
            Err(problem) => {
                violations.push(Violation::new(name, problem));
                None
            }
        },
    };

    let symbol = match record.get("Symbol") {
        None => Some(name.to_string()),
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::new(
                name,
                format!("Symbol must be text, got {}", json_type(other)),
            ));
            None
        }
    };

    let value = positive_number(name, record.get("Value"), "Value", &mut violations);
    let factor = positive_number(name, record.get("Factor"), "Factor", &mut violations);
    if let (Some(value), Some(factor)) = (value, factor) {
        let si = value * factor;
        if !(si.is_finite() && si > 0.0) {
            violations.push(Violation::new(
                name,
                format!(
                    "Value times Factor must be a finite positive number, got {} x {} = {}",
                    value, factor, si
                ),
            ));
        }
    }

    match (dimensions, symbol, value, factor) {
        (Some(dimensions), Some(symbol), Some(value), Some(factor)) if violations.is_empty() => {
            Ok(UnitEntry::new(name, &symbol, dimensions, value, factor))
        }
        _ => Err(violations),
    }
}

fn parse_dimension(value: &JsonValue) -> std::result::Result<DimensionVector, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("Dimension must be a list of {} numbers", BASE_DIMENSIONS))?;

    if items.len() != BASE_DIMENSIONS {
        return Err(format!(
            "Dimension must have exactly {} components, found {}",
            BASE_DIMENSIONS,
            items.len()
        ));
    }

    let exponents: Vec<f64> = items
        .iter()
        .map(|item| item.as_f64().filter(|e| e.is_finite()))
        .collect::<Option<_>>()
        .ok_or_else(|| "Dimension components must be finite numbers".to_string())?;

    let dims = DimensionVector::from_slice(&exponents)
        .ok_or_else(|| format!("Dimension must have exactly {} components", BASE_DIMENSIONS))?;

    if dims.is_dimensionless() {
        return Err("Dimension must not be all zeros (dimensionless)".to_string());
    }
    Ok(dims)
}

/// Absent means 1
fn positive_number(
    unit: &str,
    value: Option<&JsonValue>,
    key: &str,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    let value = match value {
        None => return Some(1.0),
        Some(v) => v,
    };
    match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => Some(n),
        Some(n) => {
            violations.push(Violation::new(
                unit,
                format!("{} must be strictly positive, got {}", key, n),
            ));
            None
        }
        None => {
            violations.push(Violation::new(
                unit,
                format!("{} must be numeric, got {}", key, json_type(value)),
            ));
            None
        }
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "text",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}
