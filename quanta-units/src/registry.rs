//! Unit registry - named units, display settings and preferred units
//!
//! The seven SI base units are always present. Everything else comes from
//! [`UnitRegistry::load`], which validates a whole batch before touching the
//! registry: a failed load leaves it exactly as it was.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use quanta_core::number::is_close;
use quanta_core::{DimensionVector, QuantaError, Result};
use tracing::{debug, info, warn};

use crate::namespace::{Destination, UnitTable};
use crate::parse::split_str;
use crate::source::{validate, UnitSource};
use crate::{Formatter, Quantity, Settings, UnitEntry};

/// How a load combines with the units already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadMode {
    /// Merge onto the current units; same-named units are overwritten
    #[default]
    Extend,
    /// Drop every non-base unit first
    Replace,
}

#[derive(Debug, Clone)]
pub struct UnitRegistry {
    base: BTreeMap<String, UnitEntry>,
    units: BTreeMap<String, UnitEntry>,
    preferred: HashMap<DimensionVector, String>,
    settings: Settings,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Registry holding only the SI base units
    pub fn new() -> Self {
        let base = UnitEntry::si_base_units()
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        UnitRegistry {
            base,
            units: BTreeMap::new(),
            preferred: HashMap::new(),
            settings: Settings::default(),
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        UnitRegistry {
            settings,
            ..Self::new()
        }
    }

    /// Load a batch of unit definitions.
    ///
    /// Returns the table of every unit known afterwards, tagged with
    /// `destination` for the caller to bind wherever it wants.
    pub fn load(
        &mut self,
        source: impl Into<UnitSource>,
        mode: LoadMode,
        destination: Destination,
    ) -> Result<UnitTable> {
        let source = source.into();
        let origin = source.describe();

        let entries = source
            .into_definitions()
            .and_then(|defs| validate(&defs))
            .map_err(|e| {
                warn!(source = %origin, code = e.code(), "unit load rejected: {}", e);
                e
            })?;

        if mode == LoadMode::Replace {
            let removed = std::mem::take(&mut self.units);
            debug!(count = removed.len(), "removed non-base units");
            let base = &self.base;
            let before = self.preferred.len();
            // Preferences must point at a unit that will still exist
            self.preferred.retain(|_, name| {
                base.contains_key(name.as_str()) || entries.iter().any(|e| e.name == *name)
            });
            if self.preferred.len() != before {
                debug!(count = before - self.preferred.len(), "dropped stale unit preferences");
            }
        }

        let loaded = entries.len();
        for entry in entries {
            self.units.insert(entry.name.clone(), entry);
        }

        info!(
            source = %origin,
            ?mode,
            ?destination,
            loaded,
            total = self.len(),
            "loaded unit definitions"
        );
        Ok(self.unit_table(destination))
    }

    // ========== Lookup ==========

    /// Entry by unit name
    pub fn entry(&self, name: &str) -> Option<&UnitEntry> {
        self.units.get(name).or_else(|| self.base.get(name))
    }

    /// Unit quantity by name, ready for `number * unit`
    pub fn get(&self, name: &str) -> Option<Quantity> {
        self.entry(name).map(UnitEntry::quantity)
    }

    /// Like [`get`](Self::get), but also matches symbols and reports failure
    pub fn unit(&self, target: &str) -> Result<Quantity> {
        self.lookup(target).map(UnitEntry::quantity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Every unit: base units (unless shadowed by a loaded unit) then loaded ones
    pub fn entries(&self) -> impl Iterator<Item = &UnitEntry> {
        self.base
            .values()
            .filter(|b| !self.units.contains_key(&b.name))
            .chain(self.units.values())
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units sharing exactly this dimension vector
    pub fn candidates(&self, dimensions: DimensionVector) -> Vec<&UnitEntry> {
        self.entries().filter(|e| e.dimensions == dimensions).collect()
    }

    /// Sorted names and symbols usable for this dimension
    pub fn candidate_names(&self, dimensions: DimensionVector) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .candidates(dimensions)
            .into_iter()
            .flat_map(|e| [e.name.as_str(), e.symbol.as_str()])
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Find a unit by name or symbol across all dimensions
    pub fn lookup(&self, target: &str) -> Result<&UnitEntry> {
        let matches: Vec<&UnitEntry> = self.entries().filter(|e| e.matches(target)).collect();
        select_match(target, &matches, Vec::new)
    }

    // ========== Settings & preferences ==========

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Make `unit` the display unit for its dimension, overriding `print_unit`
    pub fn prefer(&mut self, unit: &str) -> Result<()> {
        let entry = self.lookup(unit)?;
        let (dimensions, name) = (entry.dimensions, entry.name.clone());
        debug!(unit = %name, dimension = %dimensions, "set preferred unit");
        self.preferred.insert(dimensions, name);
        Ok(())
    }

    /// Returns the name of the unit that was preferred, if any
    pub fn clear_preference(&mut self, dimensions: DimensionVector) -> Option<String> {
        self.preferred.remove(&dimensions)
    }

    pub fn preferred(&self, dimensions: DimensionVector) -> Option<&UnitEntry> {
        self.preferred
            .get(&dimensions)
            .and_then(|name| self.entry(name))
            .filter(|e| e.dimensions == dimensions)
    }

    // ========== Output ==========

    /// Every known unit as a quantity
    pub fn unit_table(&self, destination: Destination) -> UnitTable {
        let units = self
            .entries()
            .map(|e| (e.name.clone(), e.quantity()))
            .collect();
        UnitTable::new(destination, units)
    }

    pub fn formatter(&self) -> Formatter<'_> {
        Formatter::new(self)
    }

    /// Parse a rendered quantity such as `"1.00 km"` or `"2450 N/m"`
    pub fn parse_quantity(&self, text: &str) -> Result<Quantity> {
        let parse_error = |reason: &str| QuantaError::ParseQuantity {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let (number, unit) = split_str(text).ok_or_else(|| parse_error("expected a number and a unit"))?;
        let value: f64 = number
            .parse()
            .map_err(|_| parse_error("the number part is not a valid number"))?;
        if !value.is_finite() {
            return Err(parse_error("the number part must be finite"));
        }

        let unit = self.unit(unit)?;
        Ok(value * unit)
    }
}

/// Pick one entry among those matching `target`.
///
/// Several matches are only acceptable when they are interchangeable: the
/// same SI magnitude and the same symbol.
pub(crate) fn select_match<'a>(
    target: &str,
    matches: &[&'a UnitEntry],
    candidates: impl FnOnce() -> Vec<String>,
) -> Result<&'a UnitEntry> {
    match matches {
        [] => Err(QuantaError::UnitNotFound {
            requested: Some(target.to_string()),
            dimension: None,
            candidates: candidates(),
        }),
        [only] => Ok(only),
        [first, rest @ ..] => {
            let interchangeable = rest.iter().all(|e| {
                e.symbol == first.symbol && is_close(e.si_magnitude(), first.si_magnitude())
            });
            if interchangeable {
                Ok(first)
            } else {
                Err(QuantaError::AmbiguousUnit {
                    requested: target.to_string(),
                    matches: matches.iter().map(|e| e.name.clone()).collect(),
                    candidates: candidates(),
                })
            }
        }
    }
}

/// A registry shared between threads.
///
/// Loads take the write lock; conversions and lookups take the read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<UnitRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: UnitRegistry) -> Self {
        SharedRegistry {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    // Loads apply atomically, so a poisoned lock still guards a consistent registry
    pub fn read(&self) -> RwLockReadGuard<'_, UnitRegistry> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, UnitRegistry> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(
        &self,
        source: impl Into<UnitSource>,
        mode: LoadMode,
        destination: Destination,
    ) -> Result<UnitTable> {
        self.write().load(source, mode, destination)
    }

    pub fn get(&self, name: &str) -> Option<Quantity> {
        self.read().get(name)
    }

    pub fn to(&self, quantity: &Quantity, unit: Option<&str>) -> Result<Option<String>> {
        self.read().formatter().to(quantity, unit)
    }

    pub fn settings(&self) -> Settings {
        *self.read().settings()
    }

    /// Change a setting by key, see [`Settings::set`]
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write().settings_mut().set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::UnitDefinitions;
    use quanta_core::codes;
    use serde_json::json;

    fn force_per_length() -> DimensionVector {
        DimensionVector::FORCE.divide(&DimensionVector::LENGTH)
    }

    fn length_units() -> UnitDefinitions {
        UnitDefinitions::new()
            .with_unit("mm", json!({"Dimension": [0, 1, 0, 0, 0, 0, 0], "Value": 0.001}))
            .with_unit("km", json!({"Dimension": [0, 1, 0, 0, 0, 0, 0], "Value": 1000}))
    }

    fn registry() -> UnitRegistry {
        let mut reg = UnitRegistry::new();
        reg.load(length_units(), LoadMode::Extend, Destination::TopLevel)
            .unwrap();
        reg
    }

    #[test]
    fn test_base_units_always_present() {
        let reg = UnitRegistry::new();
        assert_eq!(reg.len(), 7);
        for name in ["kg", "m", "s", "A", "cd", "K", "mol"] {
            assert!(reg.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_extend_overwrites_same_name() {
        let mut reg = registry();
        let redefined = UnitDefinitions::new()
            .with_unit("km", json!({"Dimension": [0, 1, 0, 0, 0, 0, 0], "Value": 1001}));
        reg.load(redefined, LoadMode::Extend, Destination::TopLevel).unwrap();

        assert_eq!(reg.get("km").unwrap().magnitude(), 1001.0);
        assert!(reg.contains("mm"));
    }

    #[test]
    fn test_replace_keeps_only_base_and_new() {
        let mut reg = registry();
        let table = reg
            .load(
                UnitDefinitions::new().with_unit("N", json!({"Dimension": [1, 1, -2, 0, 0, 0, 0]})),
                LoadMode::Replace,
                Destination::Module,
            )
            .unwrap();

        assert!(!reg.contains("mm"));
        assert!(reg.contains("N"));
        assert!(reg.contains("m"));
        assert_eq!(table.len(), 8);
        assert_eq!(table.destination(), Destination::Module);
    }

    #[test]
    fn test_failed_load_changes_nothing() {
        let mut reg = registry();
        let before: Vec<UnitEntry> = reg.entries().cloned().collect();

        let bad = UnitDefinitions::new()
            .with_unit("N", json!({"Dimension": [1, 1, -2, 0, 0, 0, 0]}))
            .with_unit("broken", json!({"Dimension": [1, 1]}));
        let err = reg.load(bad, LoadMode::Replace, Destination::TopLevel).unwrap_err();

        assert_eq!(err.code(), codes::REGISTRY_VALIDATION);
        let after: Vec<UnitEntry> = reg.entries().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_candidate_names_include_symbols() {
        let mut reg = UnitRegistry::new();
        let defs = UnitDefinitions::new()
            .with_unit("N_m", json!({"Dimension": [1, 0, -2, 0, 0, 0, 0], "Symbol": "N/m"}))
            .with_unit(
                "kN_m",
                json!({"Dimension": [1, 0, -2, 0, 0, 0, 0], "Symbol": "kN/m", "Value": 1000}),
            );
        reg.load(defs, LoadMode::Extend, Destination::TopLevel).unwrap();

        assert_eq!(
            reg.candidate_names(force_per_length()),
            vec!["N/m", "N_m", "kN/m", "kN_m"]
        );
    }

    #[test]
    fn test_lookup_by_symbol() {
        let mut reg = UnitRegistry::new();
        let defs = UnitDefinitions::new()
            .with_unit("kN_m", json!({"Dimension": [1, 0, -2, 0, 0, 0, 0], "Symbol": "kN/m", "Value": 1000}));
        reg.load(defs, LoadMode::Extend, Destination::TopLevel).unwrap();

        assert_eq!(reg.lookup("kN/m").unwrap().name, "kN_m");
        assert!(reg.get("kN/m").is_none());
        assert_eq!(reg.unit("kN/m").unwrap().magnitude(), 1000.0);

        let err = reg.lookup("lbf").unwrap_err();
        assert_eq!(err.code(), codes::UNIT_NOT_FOUND);
    }

    #[test]
    fn test_conflicting_symbols_are_ambiguous() {
        let mut reg = UnitRegistry::new();
        let defs = UnitDefinitions::new()
            .with_unit("tonne", json!({"Dimension": [1, 0, 0, 0, 0, 0, 0], "Value": 1000, "Symbol": "t"}))
            .with_unit("ton_us", json!({"Dimension": [1, 0, 0, 0, 0, 0, 0], "Value": 907.18474, "Symbol": "t"}));
        reg.load(defs, LoadMode::Extend, Destination::TopLevel).unwrap();

        let err = reg.lookup("t").unwrap_err();
        assert_eq!(err.code(), codes::AMBIGUOUS_UNIT);
    }

    #[test]
    fn test_interchangeable_matches_are_not_ambiguous() {
        let mut reg = UnitRegistry::new();
        let defs = UnitDefinitions::new()
            .with_unit("metre", json!({"Dimension": [0, 1, 0, 0, 0, 0, 0], "Symbol": "m"}));
        reg.load(defs, LoadMode::Extend, Destination::TopLevel).unwrap();

        assert_eq!(reg.lookup("m").unwrap().si_magnitude(), 1.0);
    }

    #[test]
    fn test_preference_survives_extend_not_replace() {
        let mut reg = registry();
        reg.prefer("mm").unwrap();
        assert_eq!(reg.preferred(DimensionVector::LENGTH).unwrap().name, "mm");

        reg.load(UnitDefinitions::new(), LoadMode::Extend, Destination::TopLevel)
            .unwrap();
        assert!(reg.preferred(DimensionVector::LENGTH).is_some());

        reg.load(UnitDefinitions::new(), LoadMode::Replace, Destination::TopLevel)
            .unwrap();
        assert!(reg.preferred(DimensionVector::LENGTH).is_none());
        assert_eq!(reg.clear_preference(DimensionVector::LENGTH), None);
    }

    #[test]
    fn test_parse_quantity() {
        let reg = registry();
        let q = reg.parse_quantity("1.00 km").unwrap();
        assert_eq!(q.magnitude(), 1000.0);
        assert_eq!(q.dimensions(), DimensionVector::LENGTH);

        let err = reg.parse_quantity("abc km").unwrap_err();
        assert_eq!(err.code(), codes::PARSE_QUANTITY);
        let err = reg.parse_quantity("1.0 furlong").unwrap_err();
        assert_eq!(err.code(), codes::UNIT_NOT_FOUND);
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = SharedRegistry::default();
        let loader = shared.clone();
        std::thread::spawn(move || {
            loader
                .load(length_units(), LoadMode::Extend, Destination::TopLevel)
                .unwrap();
        })
        .join()
        .unwrap();

        let km = shared.get("km").unwrap();
        shared.set("print_unit", "largest").unwrap();
        assert_eq!(shared.to(&(2.0 * km), None).unwrap().as_deref(), Some("2 km"));
    }
}
