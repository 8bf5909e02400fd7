//! Errors raised by the density field, the growth law and the geometry helpers

use crate::float_types::Real;
use std::fmt::Display;

/// All the possible failures we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DensityError {
    /// (InvalidInput) Malformed rows, too few coordinates, non-finite values
    InvalidInput { message: String },
    /// (InvalidGrowth) A growth factor that is not strictly larger than 1.0
    InvalidGrowth { growth: Real },
    /// (DegenerateCurve) The curve is shorter than the minimum spacing
    DegenerateCurve { length: Real, min_density: Real },
    /// (EmptyGeometry) An intermediate geometric result became empty
    EmptyGeometry { operation: &'static str },
}

impl DensityError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        DensityError::InvalidInput { message: message.into() }
    }

    /// `true` for the variants callers are expected to recover from.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DensityError::DegenerateCurve { .. } | DensityError::EmptyGeometry { .. }
        )
    }
}

impl Display for DensityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DensityError::InvalidInput { message } => write!(f, "(InvalidInput) {}", message),
            DensityError::InvalidGrowth { growth } => {
                write!(f, "(InvalidGrowth) Growth needs to be larger than 1.0, got {}", growth)
            },
            DensityError::DegenerateCurve { length, min_density } => write!(
                f,
                "(DegenerateCurve) Curve of length {} is shorter than the minimum density {}",
                length, min_density
            ),
            DensityError::EmptyGeometry { operation } => {
                write!(f, "(EmptyGeometry) {} produced an empty geometry", operation)
            },
        }
    }
}

pub type DensityResult<T> = Result<T, DensityError>;
