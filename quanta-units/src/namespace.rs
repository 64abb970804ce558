//! Binding loaded units into a caller-owned scope

use std::collections::{BTreeMap, HashMap};

use crate::Quantity;

/// Where the caller intends to bind the units of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Destination {
    #[default]
    TopLevel,
    Module,
}

/// Anything units can be bound into by name
pub trait Namespace {
    fn bind(&mut self, name: &str, unit: Quantity);
}

impl Namespace for HashMap<String, Quantity> {
    fn bind(&mut self, name: &str, unit: Quantity) {
        self.insert(name.to_string(), unit);
    }
}

impl Namespace for BTreeMap<String, Quantity> {
    fn bind(&mut self, name: &str, unit: Quantity) {
        self.insert(name.to_string(), unit);
    }
}

/// Snapshot of the registry after a load: unit name to unit quantity
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    destination: Destination,
    units: BTreeMap<String, Quantity>,
}

impl UnitTable {
    pub(crate) fn new(destination: Destination, units: BTreeMap<String, Quantity>) -> Self {
        UnitTable { destination, units }
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn get(&self, name: &str) -> Option<Quantity> {
        self.units.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.units.iter().map(|(name, q)| (name.as_str(), *q))
    }

    /// Bind every unit into `namespace`, returning how many were bound
    pub fn push_into<N: Namespace + ?Sized>(&self, namespace: &mut N) -> usize {
        for (name, unit) in &self.units {
            namespace.bind(name, *unit);
        }
        self.units.len()
    }
}
