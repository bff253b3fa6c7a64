//! Defines the **so(3)** skew-symmetric representation of 3D vectors.

use nalgebra::Matrix3;

use crate::vector3d::Vector3D;

#[derive(Clone, Copy, Debug, PartialEq)]
/// The skew-symmetric 3x3 matrix associated with a 3D vector, such that
/// `SO3::from_vector3d(v).0 * w == v.cross(&w)` for any vector `w`.
pub struct SO3(pub(crate) Matrix3<f64>);

impl SO3 {
    /// Builds the skew-symmetric matrix of a vector.
    #[must_use]
    pub fn from_vector3d(v: &Vector3D) -> Self {
        let x = v.as_slice();
        Self(Matrix3::new(
            0.0, -x[2], x[1], x[2], 0.0, -x[0], -x[1], x[0], 0.0,
        ))
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }
}
