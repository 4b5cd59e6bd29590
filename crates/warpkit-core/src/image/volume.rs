//! Dense host lattice of vectors with physical metadata.

use crate::error::{FieldError, Result};
use crate::interpolation::trilinear_replicate;
use crate::spatial::{cell_count, unravel, Dims, GridIndex, Point3, Vector3};
use super::geometry::VolumeGeometry;

/// Dense 3D lattice holding one vector per cell.
///
/// Cells are stored with x varying fastest, then y, then z. The geometry
/// maps lattice indices to world points. A lattice with no cells is
/// *unallocated* and reports `valid() == false`.
///
/// # Examples
/// ```rust
/// use warpkit_core::image::VectorVolume;
/// use warpkit_core::spatial::{Point3, Vector3};
///
/// let mut volume = VectorVolume::new([4, 4, 4], Vector3::zeros());
/// volume.set([1, 2, 3], Vector3::new([1.0, 0.0, 0.0]));
///
/// let sampled = volume.linear_at_point(&Point3::new([1.0, 2.0, 3.0]));
/// assert_eq!(sampled, Vector3::new([1.0, 0.0, 0.0]));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorVolume {
    dims: Dims,
    data: Vec<Vector3>,
    geometry: VolumeGeometry,
}

impl VectorVolume {
    /// Allocate a lattice with every cell set to `value` and default geometry.
    pub fn new(dims: Dims, value: Vector3) -> Self {
        Self {
            dims,
            data: vec![value; cell_count(dims)],
            geometry: VolumeGeometry::default(),
        }
    }

    /// Wrap existing cell data (x fastest).
    pub fn from_vec(dims: Dims, data: Vec<Vector3>, geometry: VolumeGeometry) -> Result<Self> {
        if data.len() != cell_count(dims) {
            return Err(FieldError::invalid_geometry(format!(
                "{} cells supplied for a {:?} lattice",
                data.len(),
                dims
            )));
        }
        Ok(Self {
            dims,
            data,
            geometry,
        })
    }

    /// An unallocated lattice.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the geometry.
    pub fn with_geometry(mut self, geometry: VolumeGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: VolumeGeometry) {
        self.geometry = geometry;
    }

    /// Lattice size `[x, y, z]`.
    pub fn size(&self) -> Dims {
        self.dims
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the lattice is allocated and ready for use.
    pub fn valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Storage offset of a cell.
    #[inline]
    pub fn linear_index(&self, p: GridIndex) -> usize {
        debug_assert!(
            (0..3).all(|i| p[i] < self.dims[i]),
            "grid index {:?} outside lattice {:?}",
            p,
            self.dims
        );
        p[0] + self.dims[0] * (p[1] + self.dims[1] * p[2])
    }

    /// Cell coordinate of a storage offset.
    #[inline]
    pub fn grid_index(&self, i: usize) -> GridIndex {
        unravel(i, self.dims)
    }

    /// Raw value stored at a cell.
    #[inline]
    pub fn at(&self, p: GridIndex) -> Vector3 {
        self.data[self.linear_index(p)]
    }

    #[inline]
    pub fn at_mut(&mut self, p: GridIndex) -> &mut Vector3 {
        let i = self.linear_index(p);
        &mut self.data[i]
    }

    /// Overwrite a cell.
    #[inline]
    pub fn set(&mut self, p: GridIndex, value: Vector3) {
        *self.at_mut(p) = value;
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: Vector3) {
        self.data.fill(value);
    }

    /// Deep-copy cell contents from a lattice of the same size.
    ///
    /// The geometry of `self` is kept.
    pub fn copy_from(&mut self, other: &VectorVolume) -> Result<()> {
        if other.dims != self.dims {
            return Err(FieldError::shape_mismatch(self.dims, other.dims));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Replace all cells at once; the length must match the lattice.
    pub(crate) fn replace_data(&mut self, data: Vec<Vector3>) {
        debug_assert_eq!(data.len(), self.data.len());
        self.data = data;
    }

    pub fn as_slice(&self) -> &[Vector3] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vector3] {
        &mut self.data
    }

    /// World point of a cell.
    pub fn index_to_point(&self, p: GridIndex) -> Point3 {
        self.geometry.grid_to_point(p)
    }

    /// Continuous index of a world point.
    pub fn point_to_index(&self, point: &Point3) -> Point3 {
        self.geometry.point_to_index(point)
    }

    /// Trilinear sample at a world point, clamped to the lattice.
    pub fn linear_at_point(&self, point: &Point3) -> Vector3 {
        self.linear_at_index(&self.point_to_index(point))
    }

    /// Trilinear sample at a continuous index, clamped to the lattice.
    pub fn linear_at_index(&self, index: &Point3) -> Vector3 {
        trilinear_replicate(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Direction3, Spacing3};

    #[test]
    fn test_volume_creation() {
        let volume = VectorVolume::new([4, 3, 2], Vector3::repeat(1.0));
        assert_eq!(volume.size(), [4, 3, 2]);
        assert_eq!(volume.len(), 24);
        assert!(volume.valid());
        assert!(volume.as_slice().iter().all(|v| *v == Vector3::repeat(1.0)));
    }

    #[test]
    fn test_empty_volume_is_invalid() {
        let volume = VectorVolume::empty();
        assert!(!volume.valid());
        assert_eq!(volume.size(), [0, 0, 0]);
    }

    #[test]
    fn test_index_roundtrip() {
        let volume = VectorVolume::new([4, 3, 2], Vector3::zeros());
        for i in 0..volume.len() {
            assert_eq!(volume.linear_index(volume.grid_index(i)), i);
        }
        assert_eq!(volume.grid_index(5), [1, 1, 0]);
        assert_eq!(volume.linear_index([3, 2, 1]), 23);
    }

    #[test]
    fn test_set_fill_copy() {
        let mut a = VectorVolume::new([2, 2, 2], Vector3::zeros());
        a.set([1, 0, 1], Vector3::new([1.0, 2.0, 3.0]));
        assert_eq!(a.at([1, 0, 1]), Vector3::new([1.0, 2.0, 3.0]));

        let mut b = VectorVolume::new([2, 2, 2], Vector3::zeros());
        b.copy_from(&a).unwrap();
        assert_eq!(b.as_slice(), a.as_slice());

        b.fill(Vector3::repeat(-1.0));
        assert!(b.as_slice().iter().all(|v| *v == Vector3::repeat(-1.0)));
        assert_eq!(a.at([1, 0, 1]), Vector3::new([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_copy_from_rejects_other_size() {
        let mut a = VectorVolume::new([2, 2, 2], Vector3::zeros());
        let b = VectorVolume::new([3, 2, 2], Vector3::zeros());
        assert_eq!(
            a.copy_from(&b),
            Err(FieldError::shape_mismatch([2, 2, 2], [3, 2, 2]))
        );
    }

    #[test]
    fn test_from_vec_checks_length() {
        let err = VectorVolume::from_vec([2, 2, 2], vec![Vector3::zeros(); 7], VolumeGeometry::default());
        assert!(err.is_err());
        let ok = VectorVolume::from_vec([2, 2, 2], vec![Vector3::zeros(); 8], VolumeGeometry::default());
        assert!(ok.is_ok());
    }

    #[test]
    fn test_sampling_uses_geometry() {
        let geometry = VolumeGeometry::new(
            Point3::new([10.0, 0.0, 0.0]),
            Spacing3::new([2.0, 1.0, 1.0]),
            Direction3::identity(),
        )
        .unwrap();
        let mut volume = VectorVolume::new([3, 1, 1], Vector3::zeros()).with_geometry(geometry);
        volume.set([1, 0, 0], Vector3::new([4.0, 0.0, 0.0]));

        assert_eq!(volume.index_to_point([1, 0, 0]), Point3::new([12.0, 0.0, 0.0]));
        // halfway between cell 0 (x = 10) and cell 1 (x = 12)
        let v = volume.linear_at_point(&Point3::new([11.0, 0.0, 0.0]));
        assert!((v[0] - 2.0).abs() < 1e-12);
    }
}
