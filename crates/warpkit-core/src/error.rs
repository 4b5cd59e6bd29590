//! Error types for field and lattice operations.
//!
//! Out-of-bounds sampling is never an error: queries are clamped to the
//! lattice. Errors are reserved for violated preconditions such as merging
//! fields of different sizes.

use thiserror::Error;
use crate::spatial::Dims;

/// Main error type for displacement field operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Two lattices that must agree in size do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Dims,
        actual: Dims,
    },

    /// Operation on a field with no backing storage.
    #[error("Unallocated field: {0}")]
    Unallocated(String),

    /// Origin, spacing or direction cannot describe a lattice.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Device tensor contents could not be read back.
    #[error("Tensor readback error: {0}")]
    Readback(String),
}

/// Result type for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: Dims, actual: Dims) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create an unallocated field error.
    pub fn unallocated(msg: impl Into<String>) -> Self {
        Self::Unallocated(msg.into())
    }

    /// Create an invalid geometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create a readback error.
    pub fn readback(msg: impl Into<String>) -> Self {
        Self::Readback(msg.into())
    }
}
