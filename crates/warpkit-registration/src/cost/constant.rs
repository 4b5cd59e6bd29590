//! Constant cost term.

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use warpkit_core::{DeviceDisplacementField, Region, Vector3};
use super::trait_::{CostFunction, RegionCost};

/// Returns the same `(before, after)` pair for every voxel.
///
/// Useful as a bias term and for checking how a block optimizer weights and
/// accumulates costs independently of any image data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstantCost {
    pub before: f32,
    pub after: f32,
}

impl ConstantCost {
    pub fn new(before: f32, after: f32) -> Self {
        Self { before, after }
    }
}

impl<B: Backend> CostFunction<B> for ConstantCost {
    fn name(&self) -> &str {
        "constant"
    }

    fn evaluate(
        &self,
        field: &DeviceDisplacementField<B>,
        _delta: Vector3,
        region: &Region,
    ) -> RegionCost<B> {
        RegionCost::uniform(region.len(), self.before, self.after, &field.device())
    }
}
