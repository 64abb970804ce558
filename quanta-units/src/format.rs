//! Projection of SI quantities onto registry units
//!
//! Resolution order for a quantity of dimension `d`:
//! 1. the registry units of dimension `d` are the candidates; none is a failure
//! 2. a requested unit must be among them (by name or symbol)
//! 3. otherwise the preferred unit for `d`, then `print_unit` by SI magnitude
//!
//! Failures follow the registry's `to_fails` policy.

use serde::{Deserialize, Serialize};
use quanta_core::number::format_significant;
use quanta_core::{QuantaError, Result};
use tracing::{trace, warn};

use crate::registry::select_match;
use crate::settings::{FailurePolicy, PrintUnit};
use crate::{Quantity, UnitEntry, UnitRegistry};

/// A quantity expressed in a unit: `value` of `unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    pub value: f64,
    /// Display symbol of the unit
    pub unit: String,
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Renders quantities against a borrowed registry
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a> {
    registry: &'a UnitRegistry,
}

impl<'a> Formatter<'a> {
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Formatter { registry }
    }

    /// Pick the unit `quantity` is displayed in
    pub fn resolve(&self, quantity: &Quantity, unit: Option<&str>) -> Result<&'a UnitEntry> {
        let dimensions = quantity.dimensions();
        let candidates = self.registry.candidates(dimensions);
        let candidate_names = || self.registry.candidate_names(dimensions);

        if candidates.is_empty() {
            return Err(QuantaError::UnitNotFound {
                requested: unit.map(str::to_string),
                dimension: Some(dimensions),
                candidates: Vec::new(),
            });
        }

        let entry = match unit {
            Some(target) => {
                let matches: Vec<&UnitEntry> = candidates
                    .iter()
                    .copied()
                    .filter(|e| e.matches(target))
                    .collect();
                select_match(target, &matches, candidate_names).map_err(|e| match e {
                    QuantaError::UnitNotFound {
                        requested,
                        candidates,
                        ..
                    } => QuantaError::UnitNotFound {
                        requested,
                        dimension: Some(dimensions),
                        candidates,
                    },
                    other => other,
                })?
            }
            None => match self.registry.preferred(dimensions) {
                Some(preferred) => preferred,
                None => pick_by_magnitude(&candidates, self.registry.settings().print_unit())
                    .ok_or_else(|| QuantaError::UnitNotFound {
                        requested: None,
                        dimension: Some(dimensions),
                        candidates: Vec::new(),
                    })?,
            },
        };

        trace!(unit = %entry.name, dimension = %dimensions, requested = ?unit, "resolved display unit");
        Ok(entry)
    }

    /// Render as `"<number> <symbol>"`.
    ///
    /// `Ok(None)` means the conversion failed under the `print` policy; the
    /// message has already been written to stderr.
    pub fn to(&self, quantity: &Quantity, unit: Option<&str>) -> Result<Option<String>> {
        match self.resolve(quantity, unit) {
            Ok(entry) => Ok(Some(self.render(quantity, entry))),
            Err(e) => self.fail(e),
        }
    }

    /// Value and symbol of `quantity` in `unit`, unrounded
    pub fn represent(&self, quantity: &Quantity, unit: &str) -> Result<Option<Representation>> {
        match self.resolve(quantity, Some(unit)) {
            Ok(entry) => Ok(Some(Representation {
                value: quantity.magnitude() / entry.si_magnitude(),
                unit: entry.symbol.clone(),
            })),
            Err(e) => self.fail(e),
        }
    }

    /// Best-effort rendering that never fails: SI base units when no
    /// registry unit fits
    pub fn display(&self, quantity: &Quantity) -> String {
        match self.resolve(quantity, None) {
            Ok(entry) => self.render(quantity, entry),
            Err(_) => quantity.to_string(),
        }
    }

    fn render(&self, quantity: &Quantity, entry: &UnitEntry) -> String {
        let value = quantity.magnitude() / entry.si_magnitude();
        let digits = self.registry.settings().significant_digits();
        format!("{} {}", format_significant(value, digits), entry.symbol)
    }

    fn fail<T>(&self, error: QuantaError) -> Result<Option<T>> {
        match self.registry.settings().to_fails() {
            FailurePolicy::Raise => Err(error),
            FailurePolicy::Print => {
                warn!(code = error.code(), "conversion failed: {}", error);
                eprintln!("{}", error);
                Ok(None)
            }
        }
    }
}

/// First unit with the smallest (or largest) SI magnitude
fn pick_by_magnitude<'a>(candidates: &[&'a UnitEntry], print_unit: PrintUnit) -> Option<&'a UnitEntry> {
    let mut best: Option<&'a UnitEntry> = None;
    for &entry in candidates {
        let better = match best {
            None => true,
            Some(current) => match print_unit {
                PrintUnit::Smallest => entry.si_magnitude() < current.si_magnitude(),
                PrintUnit::Largest => entry.si_magnitude() > current.si_magnitude(),
            },
        };
        if better {
            best = Some(entry);
        }
    }
    best
}
