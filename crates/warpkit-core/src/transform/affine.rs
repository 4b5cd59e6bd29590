//! Affine transform implementation.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use crate::spatial::{Point3, Vector, Vector3};
use super::trait_::Transform;

/// Affine transform (linear map + translation) about a fixed center.
///
/// T(x) = A(x - c) + c + t
///
/// where:
/// * A is a 3×3 matrix (rotation, scale, shear)
/// * t is a translation vector
/// * c is the fixed center of rotation/scaling
///
/// The transform is a plain value: a field stores its own copy, so later
/// changes to the caller's instance never leak into the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
    translation: Vector3,
    center: Point3,
}

impl AffineTransform {
    /// Create an affine transform about the origin.
    pub fn new(matrix: Matrix3<f64>, translation: Vector3) -> Self {
        Self {
            matrix,
            translation,
            center: Point3::origin(),
        }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Pure translation.
    pub fn from_translation(translation: Vector3) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Move the fixed center, keeping matrix and translation.
    pub fn with_center(mut self, center: Point3) -> Self {
        self.center = center;
        self
    }

    /// Get the linear part.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Get the translation vector.
    pub fn translation(&self) -> Vector3 {
        self.translation
    }

    /// Get the center of rotation.
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Whether this is exactly the identity mapping.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity() && self.translation == Vector3::zeros()
    }

    /// Inverse transform, if the linear part is invertible.
    pub fn inverse(&self) -> Option<Self> {
        // x = A^-1 (y - c - t) + c, expressed about the center c + t
        let inverse = self.matrix.try_inverse()?;
        Some(Self {
            matrix: inverse,
            translation: -self.translation,
            center: self.center + self.translation,
        })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for AffineTransform {
    fn transform_point(&self, point: Point3) -> Point3 {
        let centered = point - self.center;
        self.center + Vector(self.matrix * centered.0) + self.translation
    }

    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        if self.is_identity() {
            return points;
        }
        let device = points.device();

        // Row-vector form for [N, 3] inputs: y = (x - c) @ A^T + c + t
        let mut a_t = Vec::with_capacity(9);
        for r in 0..3 {
            for c in 0..3 {
                a_t.push(self.matrix[(c, r)] as f32);
            }
        }
        let a_t = Tensor::<B, 2>::from_data(TensorData::new(a_t, Shape::new([3, 3])), &device);
        let c = row_tensor::<B>(self.center.to_f32(), &device);
        let t = row_tensor::<B>(self.translation.to_f32(), &device);

        (points - c.clone()).matmul(a_t) + c + t
    }
}

fn row_tensor<B: Backend>(values: [f32; 3], device: &B::Device) -> Tensor<B, 2> {
    Tensor::<B, 1>::from_data(TensorData::new(values.to_vec(), Shape::new([3])), device)
        .reshape([1, 3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let transform = AffineTransform::identity();
        let p = Point3::new([1.0, 2.0, 3.0]);
        assert_eq!(transform.transform_point(p), p);
        assert!(transform.is_identity());
    }

    #[test]
    fn test_translation() {
        let transform = AffineTransform::from_translation(Vector3::new([1.0, -2.0, 0.5]));
        let p = transform.transform_point(Point3::new([1.0, 1.0, 1.0]));
        assert_eq!(p, Point3::new([2.0, -1.0, 1.5]));
    }

    #[test]
    fn test_scale_with_center() {
        // Scale by 2 about (1, 1, 1): (2, 1, 1) -> (3, 1, 1)
        let transform = AffineTransform::new(Matrix3::identity() * 2.0, Vector3::zeros())
            .with_center(Point3::new([1.0, 1.0, 1.0]));
        let p = transform.transform_point(Point3::new([2.0, 1.0, 1.0]));
        assert_eq!(p, Point3::new([3.0, 1.0, 1.0]));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let transform = AffineTransform::new(
            Matrix3::new(
                0.0, -2.0, 0.0,
                1.0, 0.0, 0.0,
                0.0, 0.0, 0.5,
            ),
            Vector3::new([3.0, -1.0, 2.0]),
        )
        .with_center(Point3::new([5.0, 5.0, 5.0]));
        let inverse = transform.inverse().unwrap();

        let p = Point3::new([0.5, 7.0, -3.0]);
        let back = inverse.transform_point(transform.transform_point(p));
        for i in 0..3 {
            assert!((back[i] - p[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let transform = AffineTransform::new(Matrix3::zeros(), Vector3::zeros());
        assert!(transform.inverse().is_none());
    }

    #[test]
    fn test_tensor_path_matches_host() {
        let device = Default::default();
        let transform = AffineTransform::new(
            Matrix3::new(
                0.0, -1.0, 0.0,
                1.0, 0.0, 0.0,
                0.0, 0.0, 2.0,
            ),
            Vector3::new([1.0, 1.0, 0.0]),
        )
        .with_center(Point3::new([1.0, 0.0, 0.0]));

        let points = Tensor::<TestBackend, 2>::from_floats(
            [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &device,
        );
        let transformed = transform.transform_points(points).into_data();
        let slice = transformed.as_slice::<f32>().unwrap();

        let hosts = [
            transform.transform_point(Point3::new([1.0, 2.0, 3.0])),
            transform.transform_point(Point3::new([4.0, 5.0, 6.0])),
        ];
        for (row, host) in hosts.iter().enumerate() {
            for c in 0..3 {
                assert!((slice[row * 3 + c] as f64 - host[c]).abs() < 1e-5);
            }
        }
    }
}
