//! Registry entries: a named unit with its conversion rule

use serde::{Deserialize, Serialize};
use quanta_core::{DimensionVector, BASE_DIMENSIONS, BASE_SYMBOLS};

use crate::Quantity;

/// A unit known to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEntry {
    /// Registry key (e.g. "kN_m")
    pub name: String,
    /// Display symbol (e.g. "kN/m"), the name unless given
    pub symbol: String,
    pub dimensions: DimensionVector,
    /// Magnitude of one unit in SI terms, as defined (`Value`)
    pub value: f64,
    /// SI base units per unit of the originating non-SI unit (`Factor`)
    pub factor: f64,
    /// One of the seven SI base units; never removed
    pub base: bool,
}

impl UnitEntry {
    pub fn new(
        name: &str,
        symbol: &str,
        dimensions: DimensionVector,
        value: f64,
        factor: f64,
    ) -> Self {
        UnitEntry {
            name: name.to_string(),
            symbol: symbol.to_string(),
            dimensions,
            value,
            factor,
            base: false,
        }
    }

    /// The seven SI base units, in dimension-vector order
    pub fn si_base_units() -> Vec<UnitEntry> {
        (0..BASE_DIMENSIONS)
            .filter_map(|i| {
                let dimensions = DimensionVector::base(i)?;
                let symbol = BASE_SYMBOLS[i];
                Some(UnitEntry {
                    base: true,
                    ..UnitEntry::new(symbol, symbol, dimensions, 1.0, 1.0)
                })
            })
            .collect()
    }

    /// Effective SI magnitude of one unit: `Value * Factor`
    pub fn si_magnitude(&self) -> f64 {
        self.value * self.factor
    }

    /// Matches by name or by symbol
    pub fn matches(&self, target: &str) -> bool {
        self.name == target || self.symbol == target
    }

    /// The unit as a quantity, ready for `number * unit`
    pub fn quantity(&self) -> Quantity {
        Quantity::from_parts(self.si_magnitude(), self.dimensions, self.factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kilonewton() -> UnitEntry {
        UnitEntry::new("kN", "kN", DimensionVector::FORCE, 1000.0, 1.0)
    }

    #[test]
    fn test_si_base_units() {
        let units = UnitEntry::si_base_units();
        assert_eq!(units.len(), 7);
        assert!(units.iter().all(|u| u.base && u.si_magnitude() == 1.0));
        assert_eq!(units[1].name, "m");
        assert_eq!(units[1].dimensions, DimensionVector::LENGTH);
        assert_eq!(units[5].symbol, "K");
    }

    #[test]
    fn test_si_magnitude_premultiplied() {
        let ft = UnitEntry::new("ft", "ft", DimensionVector::LENGTH, 1.0, 0.3048);
        assert_eq!(ft.si_magnitude(), 0.3048);

        let q = ft.quantity();
        assert_eq!(q.magnitude(), 0.3048);
        assert!(!q.is_si());
        assert!(kilonewton().quantity().is_si());
    }

    #[test]
    fn test_matches_name_or_symbol() {
        let force_per_length = DimensionVector::FORCE.divide(&DimensionVector::LENGTH);
        let unit = UnitEntry::new("kN_m", "kN/m", force_per_length, 1000.0, 1.0);
        assert!(unit.matches("kN_m"));
        assert!(unit.matches("kN/m"));
        assert!(!unit.matches("kN"));
    }
}
