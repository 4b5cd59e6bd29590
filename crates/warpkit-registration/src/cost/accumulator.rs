//! Per-voxel destination for cost terms.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{Dims, FieldError, GridIndex, Region};
use crate::error::{RegistrationError, Result};

/// Two cost components per voxel: `[0]` with the current displacement,
/// `[1]` with the trial perturbation applied.
///
/// Stored as a `[2, Z, Y, X]` tensor. Cost terms only ever add into it.
/// Clones share the same storage, so jobs on any stream can accumulate into
/// one accumulator; the lock keeps each region update whole, but the order
/// of updates coming from different streams is unspecified.
pub struct CostAccumulator<B: Backend> {
    dims: Dims,
    tensor: Arc<Mutex<Tensor<B, 4>>>,
}

impl<B: Backend> CostAccumulator<B> {
    /// Zeroed accumulator covering a lattice of size `dims` (`[x, y, z]`).
    pub fn zeros(dims: Dims, device: &B::Device) -> Self {
        let tensor = Tensor::zeros([2, dims[2], dims[1], dims[0]], device);
        Self {
            dims,
            tensor: Arc::new(Mutex::new(tensor)),
        }
    }

    /// Lattice size `[x, y, z]`.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Reset every voxel to zero.
    pub fn reset(&self) {
        let mut guard = self.lock();
        *guard = guard.zeros_like();
    }

    /// Add `values` (`[2, dz, dy, dx]`) into the voxels of `region`.
    pub fn add_region(&self, region: &Region, values: Tensor<B, 4>) -> Result<()> {
        if region.clip_to(self.dims) != Some(*region) {
            return Err(RegistrationError::invalid_region(format!(
                "region {:?} + {:?} exceeds accumulator {:?}",
                region.offset, region.dims, self.dims
            )));
        }
        let expected = [2, region.dims[2], region.dims[1], region.dims[0]];
        if values.dims() != expected {
            return Err(RegistrationError::invalid_region(format!(
                "cost values have shape {:?}, region needs {:?}",
                values.dims(),
                expected
            )));
        }

        let [ox, oy, oz] = region.offset;
        let [ex, ey, ez] = region.end();
        let ranges = [0..2, oz..ez, oy..ey, ox..ex];

        let mut guard = self.lock();
        // slice_assign only writes in place on a uniquely owned tensor
        let placeholder = Tensor::zeros([1, 1, 1, 1], &guard.device());
        let tensor = std::mem::replace(&mut *guard, placeholder);
        let updated = tensor.clone().slice(ranges.clone()) + values;
        *guard = tensor.slice_assign(ranges, updated);
        Ok(())
    }

    /// Snapshot of the accumulated values.
    pub fn tensor(&self) -> Tensor<B, 4> {
        self.lock().clone()
    }

    /// Read back every voxel as `[before, after]`, x fastest.
    pub fn to_vec(&self) -> Result<Vec<[f32; 2]>> {
        let flat = read_f32(self.tensor())?;
        let n = flat.len() / 2;
        Ok((0..n).map(|i| [flat[i], flat[n + i]]).collect())
    }

    /// Read back one voxel as `[before, after]`.
    pub fn at(&self, p: GridIndex) -> Result<[f32; 2]> {
        if (0..3).any(|i| p[i] >= self.dims[i]) {
            return Err(RegistrationError::invalid_region(format!(
                "voxel {:?} outside accumulator {:?}",
                p, self.dims
            )));
        }
        let [x, y, z] = p;
        let voxel = self.tensor().slice([0..2, z..z + 1, y..y + 1, x..x + 1]);
        let flat = read_f32(voxel)?;
        Ok([flat[0], flat[1]])
    }

    fn lock(&self) -> MutexGuard<'_, Tensor<B, 4>> {
        self.tensor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: Backend> Clone for CostAccumulator<B> {
    fn clone(&self) -> Self {
        Self {
            dims: self.dims,
            tensor: Arc::clone(&self.tensor),
        }
    }
}

impl<B: Backend> std::fmt::Debug for CostAccumulator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostAccumulator").field("dims", &self.dims).finish()
    }
}

fn read_f32<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| FieldError::readback(format!("{:?}", e)).into())
}
