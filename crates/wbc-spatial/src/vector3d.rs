//! Defines **3D vectors** and related operations.

use nalgebra::Vector3;
use std::ops::{Add, Index, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// A 3D vector, commonly used for positions, linear velocities and axes.
pub struct Vector3D(pub(crate) Vector3<f64>);

impl Vector3D {
    /// Creates a new `Vector3D` with the given x, y, z components.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// Creates a zero vector.
    #[must_use]
    pub fn zeros() -> Self {
        Self(Vector3::zeros())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64; 3] {
        self.0.as_slice().try_into().unwrap()
    }

    /// Returns the L2 norm of the vector.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Returns the `x` unit vector, that is (1, 0, 0).
    #[must_use]
    pub fn x() -> Self {
        Self(Vector3::x())
    }

    /// Returns the `y` unit vector, that is (0, 1, 0).
    #[must_use]
    pub fn y() -> Self {
        Self(Vector3::y())
    }

    /// Returns the `z` unit vector, that is (0, 0, 1).
    #[must_use]
    pub fn z() -> Self {
        Self(Vector3::z())
    }

    /// Computes the cross product of two 3D vectors.
    #[must_use]
    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D(self.0.cross(&other.0))
    }

    #[must_use]
    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.0.dot(&other.0)
    }
}

impl From<&[f64; 3]> for Vector3D {
    fn from(array: &[f64; 3]) -> Self {
        Vector3D(Vector3::new(array[0], array[1], array[2]))
    }
}

impl Index<usize> for Vector3D {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Self) -> Self::Output {
        Vector3D(self.0 + rhs.0)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D(self.0 - rhs.0)
    }
}

impl Mul for Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: Self) -> Self::Output {
        Vector3D(self.0.component_mul(&rhs.0))
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector3D(self.0 * rhs)
    }
}

impl Mul<f64> for &Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector3D(self.0 * rhs)
    }
}

impl Mul<&Vector3D> for f64 {
    type Output = Vector3D;

    fn mul(self, rhs: &Vector3D) -> Self::Output {
        Vector3D(rhs.0 * self)
    }
}

impl Mul<Vector3D> for f64 {
    type Output = Vector3D;

    fn mul(self, rhs: Vector3D) -> Self::Output {
        Vector3D(rhs.0 * self)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Self::Output {
        Vector3D(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_product_of_basis_vectors() {
        assert_relative_eq!(Vector3D::x().cross(&Vector3D::y()).0, Vector3D::z().0);
    }

    #[test]
    fn norm_of_unit_vectors() {
        assert_relative_eq!(Vector3D::new(3.0, 4.0, 0.0).norm(), 5.0);
    }
}
