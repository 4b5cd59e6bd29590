use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use super::region::Region;

/// Generate the integer lattice coordinates of a region as continuous
/// indices.
///
/// Returns a tensor of shape `[N, 3]` holding `(x, y, z)` per row, with
/// x varying fastest, matching the storage order of `VectorVolume` and of
/// `[.., Z, Y, X]` device tensors.
///
/// # Arguments
/// * `region` - The region of cells to enumerate
/// * `device` - The device to create the tensor on
pub fn generate_region_grid<B>(region: &Region, device: &B::Device) -> Tensor<B, 2>
where
    B: Backend,
{
    let total = region.len();
    let mut grid = Vec::with_capacity(total * 3);
    for [x, y, z] in region.indices() {
        grid.push(x as f32);
        grid.push(y as f32);
        grid.push(z as f32);
    }

    Tensor::<B, 1>::from_data(TensorData::new(grid, Shape::new([total * 3])), device)
        .reshape([total, 3])
}
