//! Accelerator-resident mirror of a displacement field.
//!
//! Cost terms run as device work and never loop over voxels on the host.
//! This type carries the lattice as a channel-first tensor together with the
//! geometry, the affine pre-transform and the merge rule a block optimizer
//! trials perturbations under.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use crate::error::{FieldError, Result};
use crate::image::{generate_region_grid, Region, VectorVolume, VolumeGeometry};
use crate::interpolation::{Interpolator, LinearInterpolator};
use crate::spatial::{Dims, Vector3};
use super::affine::AffineTransform;
use super::displacement_field::{DisplacementField, UpdateRule};
use super::trait_::Transform;

/// Displacement field stored on a device.
///
/// The lattice has shape `[3, Z, Y, X]`. Every sampling method mirrors its
/// host counterpart on [`DisplacementField`] and returns one row per
/// addressed cell, ordered x fastest.
///
/// Cloning is cheap: tensors are reference counted by the backend.
///
/// # Type Parameters
/// * `B` - The Burn backend
#[derive(Debug, Clone)]
pub struct DeviceDisplacementField<B: Backend> {
    data: Tensor<B, 4>,
    dims: Dims,
    geometry: VolumeGeometry,
    affine: AffineTransform,
    rule: UpdateRule,
    interpolator: LinearInterpolator,
}

impl<B: Backend> DeviceDisplacementField<B> {
    /// Upload a host field.
    ///
    /// # Arguments
    /// * `field` - Allocated host field
    /// * `rule` - Merge rule applied to trial perturbations
    /// * `device` - Device to create the tensor on
    pub fn from_host(field: &DisplacementField, rule: UpdateRule, device: &B::Device) -> Result<Self> {
        if !field.valid() {
            return Err(FieldError::unallocated("cannot upload an empty displacement field"));
        }
        let [nx, ny, nz] = field.size();
        let cells = field.volume().as_slice();

        // Channel-first: all x components, then all y, then all z
        let mut flat = Vec::with_capacity(3 * cells.len());
        for c in 0..3 {
            flat.extend(cells.iter().map(|v| v[c] as f32));
        }
        let data = Tensor::<B, 4>::from_data(TensorData::new(flat, [3, nz, ny, nx]), device);

        Ok(Self {
            data,
            dims: field.size(),
            geometry: *field.geometry(),
            affine: field.affine(),
            rule,
            interpolator: LinearInterpolator::new(),
        })
    }

    /// Download into a host field, keeping geometry and affine.
    pub fn to_host(&self) -> Result<DisplacementField> {
        let data = self.data.clone().into_data().convert::<f32>();
        let flat = data
            .to_vec::<f32>()
            .map_err(|e| FieldError::readback(format!("{:?}", e)))?;

        let n = flat.len() / 3;
        let cells = (0..n)
            .map(|i| Vector3::from_f32([flat[i], flat[n + i], flat[2 * n + i]]))
            .collect();
        let volume = VectorVolume::from_vec(self.dims, cells, self.geometry)?;

        let mut field = DisplacementField::from_volume(volume);
        field.set_affine_transform(self.affine);
        Ok(field)
    }

    /// Replace the merge rule.
    pub fn with_rule(mut self, rule: UpdateRule) -> Self {
        self.rule = rule;
        self
    }

    /// Merge rule used by [`Self::region_perturbed`].
    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    /// Lattice size `[x, y, z]`.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn affine(&self) -> AffineTransform {
        self.affine
    }

    /// Replace the affine transform.
    pub fn set_affine_transform(&mut self, transform: AffineTransform) {
        self.affine = transform;
    }

    /// Raw lattice `[3, Z, Y, X]`.
    pub fn data(&self) -> &Tensor<B, 4> {
        &self.data
    }

    /// Device the lattice lives on.
    pub fn device(&self) -> B::Device {
        self.data.device()
    }

    /// World points `[N, 3]` of the cells of `region`.
    pub fn region_points(&self, region: &Region) -> Tensor<B, 2> {
        let indices = generate_region_grid::<B>(region, &self.device());
        self.geometry.index_to_world_tensor(indices)
    }

    /// Displacements `[N, 3]` at world points `[N, 3]`: affine, then
    /// trilinear interpolation with border replication.
    pub fn sample_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let mapped = self.affine.transform_points(points);
        let indices = self.geometry.world_to_index_tensor(mapped);
        self.interpolator.interpolate(&self.data, indices)
    }

    /// Current displacements `[N, 3]` of the cells of `region`.
    pub fn region_displacements(&self, region: &Region) -> Tensor<B, 2> {
        self.sample_points(self.region_points(region))
    }

    /// Candidate displacements `[N, 3]` of the cells of `region` after the
    /// uniform perturbation `delta`, merged under this field's rule.
    pub fn region_perturbed(&self, region: &Region, delta: Vector3) -> Tensor<B, 2> {
        let device = self.device();
        let delta = Tensor::<B, 1>::from_data(TensorData::new(delta.to_f32().to_vec(), [3]), &device)
            .reshape([1, 3]);
        let p1 = self.region_points(region);

        match self.rule {
            UpdateRule::Additive => self.sample_points(p1) + delta,
            UpdateRule::Compositive => {
                let p2 = p1.clone() + delta;
                let p3 = p2.clone() + self.sample_points(p2);
                p3 - p1
            }
        }
    }
}
