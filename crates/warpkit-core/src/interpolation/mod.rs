//! Interpolation at non-grid points.
//!
//! Both the host lattice and the device mirror use trilinear interpolation
//! with a border-replicate policy: coordinates are clamped to the lattice
//! before weights are computed, so queries outside the lattice return the
//! value of the nearest in-bounds point and never extrapolate.

pub mod trait_;
pub mod linear;

pub use trait_::Interpolator;
pub use linear::{trilinear_replicate, LinearInterpolator};
