//! Transforms and the displacement field.
//!
//! The affine pre-transform maps query points before the displacement
//! lattice is sampled. `DisplacementField` is the host-side field,
//! `DeviceDisplacementField` its accelerator-resident mirror.

pub mod trait_;
pub mod affine;
pub mod displacement_field;
pub mod device_field;

pub use trait_::Transform;
pub use affine::AffineTransform;
pub use displacement_field::{DisplacementField, UpdateRule};
pub use device_field::DeviceDisplacementField;
