//! Transform trait for world-to-world mappings.

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use crate::spatial::Point3;

/// Maps world points to world points.
///
/// Every transform answers single host queries and batched device queries;
/// both paths must agree up to `f32` precision.
pub trait Transform {
    /// Apply the transform to one world point.
    fn transform_point(&self, point: Point3) -> Point3;

    /// Apply the transform to a batch of points.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[Batch, 3]`
    ///
    /// # Returns
    /// Tensor of shape `[Batch, 3]` containing the transformed points
    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;
}
