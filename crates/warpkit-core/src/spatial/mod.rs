//! Spatial types for points, vectors, spacing, direction matrices and
//! lattice addressing.
//!
//! All floating types are based on nalgebra. Lattice addressing uses plain
//! `[usize; 3]` arrays ordered `[x, y, z]`.

pub mod point;
pub mod vector;
pub mod direction;

pub use point::Point;
pub use vector::Vector;
pub use direction::Direction;

/// Spacing between adjacent lattice cells along each axis.
pub type Spacing<const D: usize> = Vector<D>;

pub type Point3 = Point<3>;
pub type Vector3 = Vector<3>;
pub type Spacing3 = Spacing<3>;
pub type Direction3 = Direction<3>;

/// Integer lattice coordinate `[x, y, z]`, valid within `[0, dims)`.
pub type GridIndex = [usize; 3];

/// Lattice size `[x, y, z]`.
pub type Dims = [usize; 3];

/// Number of cells in a lattice of the given size.
pub fn cell_count(dims: Dims) -> usize {
    dims[0] * dims[1] * dims[2]
}

/// Lattice coordinate of storage offset `i` (x fastest, then y, then z).
#[inline]
pub fn unravel(i: usize, dims: Dims) -> GridIndex {
    let x = i % dims[0];
    let yz = i / dims[0];
    [x, yz % dims[1], yz / dims[1]]
}
