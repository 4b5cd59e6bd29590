//! Cost function trait for block-wise displacement optimization.
//!
//! A block optimizer scores one uniform perturbation of a sub-region at a
//! time. Each cost term produces two values per voxel, one for the current
//! field and one for the perturbed field, and adds them into a shared
//! [`CostAccumulator`]. The work runs on a [`Stream`] so the caller can queue
//! many regions without waiting.

use std::sync::Arc;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use tracing::warn;
use warpkit_core::{DeviceDisplacementField, Dims, GridIndex, Region, Vector3};
use crate::cost::accumulator::CostAccumulator;
use crate::stream::{Completion, Stream};

/// Unweighted cost of every voxel of a region, in region order (x fastest).
#[derive(Debug, Clone)]
pub struct RegionCost<B: Backend> {
    /// Cost with the current displacement, shape `[N]`.
    pub before: Tensor<B, 1>,
    /// Cost with the perturbation applied, shape `[N]`.
    pub after: Tensor<B, 1>,
}

impl<B: Backend> RegionCost<B> {
    pub fn new(before: Tensor<B, 1>, after: Tensor<B, 1>) -> Self {
        Self { before, after }
    }

    /// Same pair of values for each of the `len` voxels.
    pub fn uniform(len: usize, before: f32, after: f32, device: &B::Device) -> Self {
        Self::new(
            Tensor::full([len], before, device),
            Tensor::full([len], after, device),
        )
    }

    /// Scale both components.
    pub fn scale(self, weight: f32) -> Self {
        Self::new(self.before.mul_scalar(weight), self.after.mul_scalar(weight))
    }

    /// Add another cost of the same region.
    pub fn sum(self, other: Self) -> Self {
        Self::new(self.before + other.before, self.after + other.after)
    }

    /// Stack into the accumulator layout `[2, dz, dy, dx]` of `region`.
    pub fn into_volume(self, region: &Region) -> Tensor<B, 4> {
        Tensor::stack::<2>(vec![self.before, self.after], 0)
            .reshape([2, region.dims[2], region.dims[1], region.dims[0]])
    }
}

/// A similarity or regularization term evaluated on the device.
///
/// Implementations provide [`CostFunction::evaluate`]; the provided
/// [`CostFunction::cost`] handles weighting, accumulation and scheduling.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait CostFunction<B: Backend>: Send + Sync + 'static {
    /// Identifier used in log records.
    fn name(&self) -> &str;

    /// Cost of every voxel of `region` before and after applying `delta`
    /// under the field's update rule.
    ///
    /// # Arguments
    /// * `field` - Current displacement field
    /// * `delta` - Uniform perturbation for the whole region
    /// * `region` - Voxels to score, always inside the field
    fn evaluate(
        &self,
        field: &DeviceDisplacementField<B>,
        delta: Vector3,
        region: &Region,
    ) -> RegionCost<B>;

    /// Queue evaluation of the region `[offset, offset + dims)` on `stream`
    /// and add `weight * cost` into `accumulator`.
    ///
    /// Returns without waiting for the work. Voxels outside the region are
    /// never written; a region reaching past the accumulator or the field is
    /// clipped to them.
    #[allow(clippy::too_many_arguments)]
    fn cost(
        self: Arc<Self>,
        field: &DeviceDisplacementField<B>,
        delta: Vector3,
        weight: f32,
        offset: GridIndex,
        dims: Dims,
        accumulator: &CostAccumulator<B>,
        stream: &Stream,
    ) -> Completion {
        enqueue_cost(self, field, delta, weight, Region::new(offset, dims), accumulator, stream)
    }
}

/// Queue `term` over `region` on `stream`, clipping the region to both the
/// accumulator and the field.
pub(crate) fn enqueue_cost<B, T>(
    term: Arc<T>,
    field: &DeviceDisplacementField<B>,
    delta: Vector3,
    weight: f32,
    region: Region,
    accumulator: &CostAccumulator<B>,
    stream: &Stream,
) -> Completion
where
    B: Backend,
    T: CostFunction<B> + ?Sized,
{
    let (acc_dims, field_dims) = (accumulator.dims(), field.dims());
    let bounds = [
        acc_dims[0].min(field_dims[0]),
        acc_dims[1].min(field_dims[1]),
        acc_dims[2].min(field_dims[2]),
    ];
    let clipped = match region.clip_to(bounds) {
        Some(clipped) => clipped,
        None => {
            warn!(
                term = term.name(),
                offset = ?region.offset,
                dims = ?region.dims,
                "cost region lies outside the lattice, nothing to evaluate"
            );
            return stream.enqueue(|| Ok(()));
        }
    };
    if clipped != region {
        warn!(
            term = term.name(),
            offset = ?region.offset,
            requested = ?region.dims,
            clipped = ?clipped.dims,
            "cost region clipped to the lattice"
        );
    }

    let field = field.clone();
    let accumulator = accumulator.clone();
    stream.enqueue(move || {
        let values = term
            .evaluate(&field, delta, &clipped)
            .scale(weight)
            .into_volume(&clipped);
        accumulator.add_region(&clipped, values)
    })
}
