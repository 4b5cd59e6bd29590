//! Trilinear interpolation with border replication.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use crate::image::VectorVolume;
use crate::spatial::{Point3, Vector3};
use super::trait_::Interpolator;

/// Sample a host lattice at a continuous index.
///
/// Each coordinate is clamped to `[0, dim - 1]` first; NaN coordinates are
/// treated as 0. The lattice must be allocated.
pub fn trilinear_replicate(volume: &VectorVolume, index: &Point3) -> Vector3 {
    let [nx, ny, nz] = volume.size();
    let (x0, x1, wx) = axis_weights(index[0], nx);
    let (y0, y1, wy) = axis_weights(index[1], ny);
    let (z0, z1, wz) = axis_weights(index[2], nz);

    let c00 = lerp(volume.at([x0, y0, z0]), volume.at([x1, y0, z0]), wx);
    let c10 = lerp(volume.at([x0, y1, z0]), volume.at([x1, y1, z0]), wx);
    let c01 = lerp(volume.at([x0, y0, z1]), volume.at([x1, y0, z1]), wx);
    let c11 = lerp(volume.at([x0, y1, z1]), volume.at([x1, y1, z1]), wx);

    let c0 = lerp(c00, c10, wy);
    let c1 = lerp(c01, c11, wy);

    lerp(c0, c1, wz)
}

fn axis_weights(coord: f64, len: usize) -> (usize, usize, f64) {
    let max = len.saturating_sub(1) as f64;
    let c = if coord.is_nan() { 0.0 } else { coord.clamp(0.0, max) };
    let lower = c.floor();
    let i0 = lower as usize;
    let i1 = (i0 + 1).min(len.saturating_sub(1));
    (i0, i1, c - lower)
}

#[inline]
fn lerp(a: Vector3, b: Vector3, w: f64) -> Vector3 {
    a * (1.0 - w) + b * w
}

/// Device-side trilinear interpolator with border replication.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Create a new linear interpolator.
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn gather<B: Backend>(
        flat_data: &Tensor<B, 2>,
        xi: &Tensor<B, 1, Int>,
        yi: &Tensor<B, 1, Int>,
        zi: &Tensor<B, 1, Int>,
        stride_y: i32,
        stride_z: i32,
    ) -> Tensor<B, 2> {
        let idx = zi.clone() * stride_z + yi.clone() * stride_y + xi.clone();
        flat_data.clone().select(1, idx)
    }
}

impl<B: Backend> Interpolator<B> for LinearInterpolator {
    fn interpolate(&self, data: &Tensor<B, 4>, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let [c, d0, d1, d2] = data.dims(); // C, Z, Y, X

        // indices: [Batch, 3] -> (x, y, z), clamped to the lattice
        let x = indices
            .clone()
            .narrow(1, 0, 1)
            .squeeze::<1>(1)
            .clamp(0.0, (d2 - 1) as f64);
        let y = indices
            .clone()
            .narrow(1, 1, 1)
            .squeeze::<1>(1)
            .clamp(0.0, (d1 - 1) as f64);
        let z = indices
            .narrow(1, 2, 1)
            .squeeze::<1>(1)
            .clamp(0.0, (d0 - 1) as f64);

        let x0 = x.clone().floor();
        let y0 = y.clone().floor();
        let z0 = z.clone().floor();

        // Weights as [1, Batch] so they broadcast over channels
        let wx = (x - x0.clone()).unsqueeze_dim::<2>(0);
        let wy = (y - y0.clone()).unsqueeze_dim::<2>(0);
        let wz = (z - z0.clone()).unsqueeze_dim::<2>(0);

        let x1_i = (x0.clone() + 1.0).clamp(0.0, (d2 - 1) as f64).int();
        let y1_i = (y0.clone() + 1.0).clamp(0.0, (d1 - 1) as f64).int();
        let z1_i = (z0.clone() + 1.0).clamp(0.0, (d0 - 1) as f64).int();
        let x0_i = x0.int();
        let y0_i = y0.int();
        let z0_i = z0.int();

        // Strides for [Z, Y, X] layout
        let stride_z = (d1 * d2) as i32;
        let stride_y = d2 as i32;

        let flat_data = data.clone().reshape([c, d0 * d1 * d2]);

        let v000 = Self::gather(&flat_data, &x0_i, &y0_i, &z0_i, stride_y, stride_z);
        let v100 = Self::gather(&flat_data, &x1_i, &y0_i, &z0_i, stride_y, stride_z);
        let v010 = Self::gather(&flat_data, &x0_i, &y1_i, &z0_i, stride_y, stride_z);
        let v110 = Self::gather(&flat_data, &x1_i, &y1_i, &z0_i, stride_y, stride_z);
        let v001 = Self::gather(&flat_data, &x0_i, &y0_i, &z1_i, stride_y, stride_z);
        let v101 = Self::gather(&flat_data, &x1_i, &y0_i, &z1_i, stride_y, stride_z);
        let v011 = Self::gather(&flat_data, &x0_i, &y1_i, &z1_i, stride_y, stride_z);
        let v111 = Self::gather(&flat_data, &x1_i, &y1_i, &z1_i, stride_y, stride_z);

        let one_minus_wx = wx.clone().neg().add_scalar(1.0);
        let one_minus_wy = wy.clone().neg().add_scalar(1.0);
        let one_minus_wz = wz.clone().neg().add_scalar(1.0);

        // Along X
        let c00 = v000 * one_minus_wx.clone() + v100 * wx.clone();
        let c10 = v010 * one_minus_wx.clone() + v110 * wx.clone();
        let c01 = v001 * one_minus_wx.clone() + v101 * wx.clone();
        let c11 = v011 * one_minus_wx + v111 * wx;

        // Along Y
        let c0 = c00 * one_minus_wy.clone() + c10 * wy.clone();
        let c1 = c01 * one_minus_wy + c11 * wy;

        // Along Z, then [C, Batch] -> [Batch, C]
        (c0 * one_minus_wz + c1 * wz).transpose()
    }
}
