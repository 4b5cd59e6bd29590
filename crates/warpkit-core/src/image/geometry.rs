//! Physical geometry of a lattice: origin, spacing and orientation.
//!
//! Maps between index space (continuous lattice coordinates) and world
//! space, both for single points on the host and for batches of points held
//! in device tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use crate::error::{FieldError, Result};
use crate::spatial::{Direction3, GridIndex, Point3, Spacing3, Vector3};

/// Origin, spacing and direction of a 3D lattice.
///
/// `point = origin + direction * (index ⊙ spacing)`
///
/// The inverse direction is computed once at construction so that
/// world-to-index queries in sampling loops stay cheap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGeometry {
    /// World coordinate of cell `[0, 0, 0]`.
    origin: Point3,
    /// Physical distance between cells along each axis.
    spacing: Spacing3,
    /// Orientation of the lattice axes.
    direction: Direction3,
    inverse_direction: Direction3,
}

impl VolumeGeometry {
    /// Create a geometry, rejecting non-positive spacing and singular
    /// direction matrices.
    pub fn new(origin: Point3, spacing: Spacing3, direction: Direction3) -> Result<Self> {
        if (0..3).any(|i| !spacing[i].is_finite() || spacing[i] <= 0.0) {
            return Err(FieldError::invalid_geometry(format!(
                "spacing must be positive and finite, got {:?}",
                spacing.to_array()
            )));
        }
        let inverse_direction = direction.try_inverse().ok_or_else(|| {
            FieldError::invalid_geometry("direction matrix must be invertible")
        })?;
        Ok(Self {
            origin,
            spacing,
            direction,
            inverse_direction,
        })
    }

    /// Get the origin.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> Spacing3 {
        self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> Direction3 {
        self.direction
    }

    /// World point of an integer lattice cell.
    pub fn grid_to_point(&self, index: GridIndex) -> Point3 {
        self.index_to_point(&Point3::new([
            index[0] as f64,
            index[1] as f64,
            index[2] as f64,
        ]))
    }

    /// Convert a continuous index to a world point.
    pub fn index_to_point(&self, index: &Point3) -> Point3 {
        let scaled = index.coords().component_mul(&self.spacing);
        self.origin + self.direction * scaled
    }

    /// Convert a world point to a continuous index.
    ///
    /// `index = (direction^-1 * (point - origin)) / spacing`
    pub fn point_to_index(&self, point: &Point3) -> Point3 {
        let rotated: Vector3 = self.inverse_direction * (*point - self.origin);
        Point3::new([
            rotated[0] / self.spacing[0],
            rotated[1] / self.spacing[1],
            rotated[2] / self.spacing[2],
        ])
    }

    /// Batch conversion of continuous indices `[N, 3]` to world points `[N, 3]`.
    pub fn index_to_world_tensor<B: Backend>(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();
        let origin = self.origin_tensor::<B>(&device);

        // P = O + I @ M with M_rc = S_r * D_cr
        let mut m_data = Vec::with_capacity(9);
        for r in 0..3 {
            for c in 0..3 {
                m_data.push((self.spacing[r] * self.direction[(c, r)]) as f32);
            }
        }
        let m = Tensor::<B, 2>::from_data(TensorData::new(m_data, Shape::new([3, 3])), &device);

        indices.matmul(m) + origin
    }

    /// Batch conversion of world points `[N, 3]` to continuous indices `[N, 3]`.
    pub fn world_to_index_tensor<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let origin = self.origin_tensor::<B>(&device);

        // I = (P - O) @ T with T_rc = (D^-1)_cr / S_c
        let mut t_data = Vec::with_capacity(9);
        for r in 0..3 {
            for c in 0..3 {
                t_data.push((self.inverse_direction[(c, r)] / self.spacing[c]) as f32);
            }
        }
        let t = Tensor::<B, 2>::from_data(TensorData::new(t_data, Shape::new([3, 3])), &device);

        (points - origin).matmul(t)
    }

    fn origin_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_data(
            TensorData::new(self.origin.to_f32().to_vec(), Shape::new([3])),
            device,
        )
        .reshape([1, 3])
    }
}

impl Default for VolumeGeometry {
    /// Zero origin, unit spacing, identity direction.
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            spacing: Spacing3::repeat(1.0),
            direction: Direction3::identity(),
            inverse_direction: Direction3::identity(),
        }
    }
}
