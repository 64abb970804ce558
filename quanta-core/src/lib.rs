//! Quanta Core - Fundamental types
//!
//! This crate provides the core types used throughout Quanta:
//! - `DimensionVector`: exponents over the seven SI base dimensions
//! - numeric helpers: tolerance comparison and significant-digit rendering
//! - `QuantaError`: structured errors with machine-readable codes

mod dimension;
mod error;
pub mod number;

pub use dimension::{DimensionVector, BASE_DIMENSIONS, BASE_SYMBOLS};
pub use error::{codes, ErrorReport, QuantaError, Result, Violation};

/// Dimension indices, in vector order
pub mod index {
    pub use crate::dimension::{
        AMOUNT, CURRENT, LENGTH, LUMINOUS_INTENSITY, MASS, TEMPERATURE, TIME,
    };
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{DimensionVector, QuantaError, Result};
}
