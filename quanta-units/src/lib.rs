//! Quanta Units - Physical Quantities and Unit Resolution
//!
//! Provides immutable SI quantities with dimensional analysis, and a
//! runtime-loadable registry projecting them back onto human units.
//!
//! Pieces:
//! - `Quantity` / `Operand`: arithmetic validated against dimension vectors
//! - `UnitRegistry`: base units plus loaded definitions, settings, preferences
//! - `Formatter`: picks a unit and renders `"<number> <symbol>"`
//! - `UnitSource` / `Environment`: JSON unit definitions, bundled or external
//! - `UnitTable` / `Namespace`: binding loaded units into caller scopes
//! - `SharedRegistry`: the registry behind a read-write lock
//!
//! ```
//! use quanta_units::{Destination, Environment, LoadMode, UnitRegistry};
//!
//! let mut registry = UnitRegistry::new();
//! let units = registry
//!     .load(Environment::Structural, LoadMode::Extend, Destination::TopLevel)
//!     .unwrap();
//! let load = 2.45 * units.get("kN_m").unwrap();
//! assert_eq!(load.to(&registry, Some("N/m")).unwrap().as_deref(), Some("2450 N/m"));
//! ```

mod format;
mod namespace;
mod operand;
mod parse;
mod quantity;
mod registry;
mod settings;
mod source;
mod unit;

pub use format::{Formatter, Representation};
pub use namespace::{Destination, Namespace, UnitTable};
pub use operand::{AssignOp, BinaryOp, Operand};
pub use parse::split_str;
pub use quantity::Quantity;
pub use registry::{LoadMode, SharedRegistry, UnitRegistry};
pub use settings::{FailurePolicy, PrintUnit, Settings, DEFAULT_SIGNIFICANT_DIGITS};
pub use source::{validate, Environment, UnitDefinitions, UnitSource};
pub use unit::UnitEntry;

pub use quanta_core::{codes, DimensionVector, QuantaError, Result};
