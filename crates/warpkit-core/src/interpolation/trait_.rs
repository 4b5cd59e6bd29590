//! Interpolator trait for sampling vector-valued lattices on a device.

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

/// Interpolator trait for sampling channel-first volumes at continuous
/// coordinates.
///
/// Implementations never fail on out-of-range coordinates; each defines its
/// own boundary policy.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Interpolate every channel of `data` at the given continuous indices.
    ///
    /// # Arguments
    /// * `data` - Channel-first volume `[C, Z, Y, X]`
    /// * `indices` - Continuous indices `[Batch, 3]` ordered `(x, y, z)`
    ///
    /// # Returns
    /// Tensor of sampled values `[Batch, C]`
    fn interpolate(&self, data: &Tensor<B, 4>, indices: Tensor<B, 2>) -> Tensor<B, 2>;
}
