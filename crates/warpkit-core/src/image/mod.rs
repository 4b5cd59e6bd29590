//! Lattice storage and addressing.
//!
//! `VectorVolume` is the dense host container behind a displacement field.
//! `VolumeGeometry` maps its indices to world space, `Region` addresses
//! axis-aligned blocks of cells.

pub mod geometry;
pub mod grid;
pub mod region;
pub mod volume;

pub use geometry::VolumeGeometry;
pub use grid::generate_region_grid;
pub use region::Region;
pub use volume::VectorVolume;
