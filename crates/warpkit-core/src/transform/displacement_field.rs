//! Dense displacement field used by deformable registration.
//!
//! The field owns a lattice of displacement vectors and an affine
//! pre-transform. Callers sample, perturb and merge displacements through
//! this type instead of applying interpolation or the affine themselves.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::error::{FieldError, Result};
use crate::image::{VectorVolume, VolumeGeometry};
use crate::spatial::{unravel, Dims, GridIndex, Point3, Vector3};
use super::affine::AffineTransform;
use super::trait_::Transform;

/// How a perturbation is merged into a displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// `u'(x) = u(x) + d`
    #[default]
    Additive,
    /// `u'(x) = d + u(x + d)`: the current field composed with the
    /// perturbation. Costs a second interpolation per cell.
    Compositive,
}

/// Dense 3D displacement field with an affine pre-transform.
///
/// The field denotes the continuous vector field
/// `u(x) = interp(lattice, A(x))`, where `A` is the affine transform and
/// `interp` is trilinear interpolation with border replication. Sampling
/// outside the lattice never fails.
///
/// # Examples
/// ```rust
/// use warpkit_core::transform::{DisplacementField, UpdateRule};
/// use warpkit_core::spatial::Vector3;
///
/// let mut field = DisplacementField::zeros([8, 8, 8]);
/// field.fill(Vector3::new([1.0, 0.0, 0.0]));
///
/// let delta = Vector3::new([2.0, 0.0, 0.0]);
/// let additive = field.get_perturbed([2, 2, 2], delta, UpdateRule::Additive);
/// let compositive = field.get_perturbed([2, 2, 2], delta, UpdateRule::Compositive);
/// assert_eq!(additive, Vector3::new([3.0, 0.0, 0.0]));
/// assert_eq!(compositive, additive);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DisplacementField {
    df: VectorVolume,
    affine: AffineTransform,
}

impl DisplacementField {
    /// Zero-filled field with default geometry and identity affine.
    pub fn zeros(dims: Dims) -> Self {
        Self::from_volume(VectorVolume::new(dims, Vector3::zeros()))
    }

    /// Zero-filled field sharing size and geometry with `other`.
    pub fn zeros_like(other: &DisplacementField) -> Self {
        Self::from_volume(
            VectorVolume::new(other.size(), Vector3::zeros()).with_geometry(*other.geometry()),
        )
    }

    /// Wrap existing lattice data.
    pub fn from_volume(df: VectorVolume) -> Self {
        Self {
            df,
            affine: AffineTransform::identity(),
        }
    }

    /// Displacement at a lattice cell.
    ///
    /// Resolved through `get_point` at the cell's world point, so the affine
    /// transform applies; the raw cell value is only returned when the affine
    /// is the identity.
    pub fn get(&self, p: GridIndex) -> Vector3 {
        self.get_point(self.df.index_to_point(p))
    }

    /// Displacement at a world point.
    pub fn get_point(&self, p: Point3) -> Vector3 {
        self.df.linear_at_point(&self.affine.transform_point(p))
    }

    /// Candidate displacement at cell `p` after applying the world-space
    /// perturbation `delta` under `rule`.
    pub fn get_perturbed(&self, p: GridIndex, delta: Vector3, rule: UpdateRule) -> Vector3 {
        match rule {
            UpdateRule::Additive => self.get(p) + delta,
            UpdateRule::Compositive => {
                let p1 = self.df.index_to_point(p);
                let p2 = p1 + delta;
                let p3 = p2 + self.get_point(p2);
                p3 - p1
            }
        }
    }

    /// Overwrite the stored displacement of a cell, bypassing affine and
    /// interpolation.
    pub fn set(&mut self, p: GridIndex, d: Vector3) {
        self.df.set(p, d);
    }

    /// World coordinates a cell maps to.
    pub fn transform_index(&self, p: GridIndex) -> Point3 {
        let fp = self.df.index_to_point(p);
        fp + self.get_point(fp)
    }

    /// World coordinates a world point maps to.
    pub fn transform_point(&self, p: Point3) -> Point3 {
        p + self.get_point(p)
    }

    /// Merge `update_field` into this field cell by cell.
    ///
    /// The per-cell delta is `update_field.get(cell)`. Additive merges add it
    /// to the stored value, so merging a zero field is a no-op. Compositive
    /// merges set each cell to `p2 + get(p2) - p1` with `p2 = p1 + delta`;
    /// every `get(p2)` reads the field as it was before the merge, and the
    /// results replace the lattice once all cells are computed.
    ///
    /// Cells are processed in parallel with no ordering between them.
    pub fn update(&mut self, update_field: &DisplacementField, rule: UpdateRule) -> Result<()> {
        if !self.valid() {
            return Err(FieldError::unallocated("cannot merge into an empty displacement field"));
        }
        if update_field.size() != self.size() {
            return Err(FieldError::shape_mismatch(self.size(), update_field.size()));
        }

        let cells = self.df.len();
        tracing::debug!(cells, ?rule, "merging displacement field update");

        match rule {
            UpdateRule::Additive => {
                let dims = self.size();
                self.df
                    .as_mut_slice()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(i, d)| {
                        *d += update_field.get(unravel(i, dims));
                    });
            }
            UpdateRule::Compositive => {
                let this = &*self;
                let merged: Vec<Vector3> = (0..cells)
                    .into_par_iter()
                    .map(|i| {
                        let p = this.df.grid_index(i);
                        let p1 = this.df.index_to_point(p);
                        let p2 = p1 + update_field.get(p);
                        let p3 = p2 + this.get_point(p2);
                        p3 - p1
                    })
                    .collect();
                self.df.replace_data(merged);
            }
        }
        Ok(())
    }

    /// Set every cell to `v`.
    pub fn fill(&mut self, v: Vector3) {
        self.df.fill(v);
    }

    /// Replace the affine transform. The field keeps its own copy.
    pub fn set_affine_transform(&mut self, transform: AffineTransform) {
        self.affine = transform;
    }

    /// Current affine transform, by value.
    pub fn affine(&self) -> AffineTransform {
        self.affine
    }

    /// Lattice size `[x, y, z]`.
    pub fn size(&self) -> Dims {
        self.df.size()
    }

    /// Deep-copy lattice contents from a field of the same size.
    pub fn copy_from(&mut self, other: &DisplacementField) -> Result<()> {
        self.df.copy_from(&other.df)
    }

    /// Lattice geometry.
    pub fn geometry(&self) -> &VolumeGeometry {
        self.df.geometry()
    }

    /// Volume containing the displacements only.
    pub fn volume(&self) -> &VectorVolume {
        &self.df
    }

    /// Volume containing the displacements only.
    pub fn volume_mut(&mut self) -> &mut VectorVolume {
        &mut self.df
    }

    /// Returns true if the lattice is allocated and ready for use.
    pub fn valid(&self) -> bool {
        self.df.valid()
    }
}

impl From<VectorVolume> for DisplacementField {
    fn from(df: VectorVolume) -> Self {
        Self::from_volume(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_field(dims: Dims) -> DisplacementField {
        let mut field = DisplacementField::zeros(dims);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    field.set([x, y, z], Vector3::new([0.5 * x as f64, 0.0, 0.25 * z as f64]));
                }
            }
        }
        field
    }

    #[test]
    fn test_zeros_and_validity() {
        let field = DisplacementField::zeros([4, 5, 6]);
        assert!(field.valid());
        assert_eq!(field.size(), [4, 5, 6]);
        assert_eq!(field.get([3, 4, 5]), Vector3::zeros());
        assert!(!DisplacementField::default().valid());
    }

    #[test]
    fn test_get_reads_through_interpolation() {
        let field = ramp_field([6, 2, 4]);
        assert_eq!(field.get([2, 1, 3]), Vector3::new([1.0, 0.0, 0.75]));
        let v = field.get_point(Point3::new([2.5, 0.0, 1.0]));
        assert!((v[0] - 1.25).abs() < 1e-12);
        assert!((v[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_compositive_reads_at_perturbed_point() {
        let field = ramp_field([8, 1, 1]);
        let delta = Vector3::new([2.0, 0.0, 0.0]);
        // p = 1: additive 0.5 + 2, compositive 2 + u(3) = 2 + 1.5
        assert_eq!(field.get_perturbed([1, 0, 0], delta, UpdateRule::Additive)[0], 2.5);
        assert_eq!(field.get_perturbed([1, 0, 0], delta, UpdateRule::Compositive)[0], 3.5);
    }

    #[test]
    fn test_transform_index_adds_displacement() {
        let mut field = DisplacementField::zeros([3, 3, 3]);
        field.fill(Vector3::new([0.5, -1.0, 2.0]));
        assert_eq!(field.transform_index([1, 1, 1]), Point3::new([1.5, 0.0, 3.0]));
        assert_eq!(
            field.transform_point(Point3::new([0.0, 0.0, 0.0])),
            Point3::new([0.5, -1.0, 2.0])
        );
    }

    #[test]
    fn test_additive_update_adds_stored_values() {
        let mut field = ramp_field([4, 3, 2]);
        let mut update = DisplacementField::zeros([4, 3, 2]);
        update.fill(Vector3::new([1.0, 1.0, 1.0]));

        field.update(&update, UpdateRule::Additive).unwrap();
        assert_eq!(field.get([3, 2, 1]), Vector3::new([2.5, 1.0, 1.25]));
    }

    #[test]
    fn test_compositive_update_reads_pre_merge_field() {
        // u(x) = 0.5 x; every cell moves by +1 then reads the old field
        let mut field = ramp_field([8, 1, 1]);
        let mut update = DisplacementField::zeros([8, 1, 1]);
        update.fill(Vector3::new([1.0, 0.0, 0.0]));

        field.update(&update, UpdateRule::Compositive).unwrap();
        for x in 0..7 {
            let expected = 1.0 + 0.5 * (x as f64 + 1.0);
            assert!((field.get([x, 0, 0])[0] - expected).abs() < 1e-12, "cell {}", x);
        }
        // last cell samples beyond the lattice and is clamped to u(7)
        assert!((field.get([7, 0, 0])[0] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_compositive_update_reads_pre_merge_field_behind() {
        // delta -1: every cell reads the cell before it, which an in-place
        // ascending merge would already have overwritten
        let mut field = ramp_field([8, 1, 1]);
        let mut update = DisplacementField::zeros([8, 1, 1]);
        update.fill(Vector3::new([-1.0, 0.0, 0.0]));

        field.update(&update, UpdateRule::Compositive).unwrap();
        // first cell samples before the lattice and is clamped to u(0) = 0
        assert!((field.get([0, 0, 0])[0] + 1.0).abs() < 1e-12);
        for x in 1..8 {
            let expected = -1.0 + 0.5 * (x as f64 - 1.0);
            assert!((field.get([x, 0, 0])[0] - expected).abs() < 1e-12, "cell {}", x);
        }
    }

    #[test]
    fn test_compositive_update_with_varying_delta() {
        // even cells pull from their left neighbour, odd cells from the right
        let mut field = ramp_field([8, 1, 1]);
        let mut update = DisplacementField::zeros([8, 1, 1]);
        for x in 0..8 {
            let d = if x % 2 == 0 { -1.0 } else { 1.0 };
            update.set([x, 0, 0], Vector3::new([d, 0.0, 0.0]));
        }
        let before = field.clone();

        field.update(&update, UpdateRule::Compositive).unwrap();
        for x in 0..8 {
            let expected = before.get_perturbed([x, 0, 0], update.get([x, 0, 0]), UpdateRule::Compositive);
            assert!((field.get([x, 0, 0]) - expected).norm() < 1e-12, "cell {}", x);
        }
    }

    #[test]
    fn test_update_rejects_mismatched_sizes() {
        let mut field = DisplacementField::zeros([4, 4, 4]);
        let update = DisplacementField::zeros([4, 4, 2]);
        assert_eq!(
            field.update(&update, UpdateRule::Additive),
            Err(FieldError::shape_mismatch([4, 4, 4], [4, 4, 2]))
        );
        let mut empty = DisplacementField::default();
        assert!(matches!(
            empty.update(&update, UpdateRule::Additive),
            Err(FieldError::Unallocated(_))
        ));
    }

    #[test]
    fn test_affine_is_stored_by_value() {
        let mut field = ramp_field([8, 1, 1]);
        let mut transform = AffineTransform::from_translation(Vector3::new([1.0, 0.0, 0.0]));
        field.set_affine_transform(transform);
        transform = AffineTransform::identity();

        assert_ne!(field.affine(), transform);
        assert_eq!(field.get([2, 0, 0])[0], 1.5);
    }

    #[test]
    fn test_copy_from_and_zeros_like() {
        let source = ramp_field([4, 2, 2]);
        let mut target = DisplacementField::zeros_like(&source);
        assert_eq!(target.size(), source.size());
        target.copy_from(&source).unwrap();
        assert_eq!(target.volume().as_slice(), source.volume().as_slice());

        let mut wrong = DisplacementField::zeros([2, 2, 2]);
        assert!(wrong.copy_from(&source).is_err());
    }
}
