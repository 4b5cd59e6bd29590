//! Dense displacement fields for deformable registration.
//!
//! The host [`DisplacementField`] owns the lattice and applies merges. Its
//! device mirror [`DeviceDisplacementField`] samples the same field as
//! batched tensor work for cost evaluation.

pub mod error;
pub mod image;
pub mod spatial;
pub mod transform;
pub mod interpolation;

pub use error::{FieldError, Result};
pub use image::{Region, VectorVolume, VolumeGeometry};
pub use spatial::{Direction3, Dims, GridIndex, Point3, Spacing3, Vector3};
pub use transform::{AffineTransform, DeviceDisplacementField, DisplacementField, Transform, UpdateRule};
