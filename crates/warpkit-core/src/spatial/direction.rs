//! Direction matrix describing the orientation of lattice axes.

use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};
use super::Vector;

/// Direction matrix representing lattice orientation.
///
/// Column i holds the world-space direction of the i-th lattice axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Create an identity direction matrix (no rotation).
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Wrap an arbitrary matrix.
    pub fn from_matrix(matrix: SMatrix<f64, D, D>) -> Self {
        Self(matrix)
    }

    /// Try to compute the inverse of the direction matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Matrix transpose.
    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Get the inner nalgebra matrix.
    pub fn inner(&self) -> &SMatrix<f64, D, D> {
        &self.0
    }
}

impl<const D: usize> Default for Direction<D> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::Mul for Direction<D> {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self(self.0 * other.0)
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn test_direction_inverse_of_rotation() {
        // 90 degrees around z
        let rot = Direction::<3>::from_matrix(Matrix3::new(
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ));
        let inv = rot.try_inverse().unwrap();
        assert_eq!(inv, rot.transpose());
        assert_eq!(rot * inv, Direction::identity());
    }

    #[test]
    fn test_singular_direction_has_no_inverse() {
        let singular = Direction::<3>::from_matrix(Matrix3::zeros());
        assert!(singular.try_inverse().is_none());
    }

    #[test]
    fn test_direction_times_vector() {
        let rot = Direction::<3>::from_matrix(Matrix3::new(
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ));
        let v = rot * Vector::new([1.0, 0.0, 0.0]);
        assert_eq!(v, Vector::new([0.0, 1.0, 0.0]));
    }
}
