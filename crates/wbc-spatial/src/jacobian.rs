//! Defines a **Jacobian** structure and related operations.

use nalgebra::{DMatrix, Matrix3, Matrix6};

use crate::{se3::SE3, so3::SO3, vector3d::Vector3D};

/// Jacobian matrix, relating joint velocities to end-effector velocities.
///
/// The Jacobian is a matrix of size $6 \times n_v$ where $n_v$ is the number of joints in the robot model.
/// Rows 0-2 carry the linear part, rows 3-5 the angular part — this row convention is
/// contractual and is relied upon by every caller of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian(pub(crate) DMatrix<f64>);

impl Jacobian {
    pub fn zero(cols: usize) -> Self {
        Self(DMatrix::zeros(6, cols))
    }

    /// Builds a Jacobian from an existing 6xN matrix, panicking if it does not have 6 rows.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        assert_eq!(matrix.nrows(), 6, "a Jacobian must have exactly 6 rows");
        Self(matrix)
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    #[must_use]
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    #[must_use]
    pub fn linear_rows(&self) -> DMatrix<f64> {
        self.0.rows(0, 3).into_owned()
    }

    #[must_use]
    pub fn angular_rows(&self) -> DMatrix<f64> {
        self.0.rows(3, 3).into_owned()
    }

    pub fn update_column(&mut self, v_offset: usize, column_data: &[f64; 6]) {
        self.0
            .fixed_columns_mut::<1>(v_offset)
            .copy_from(&DMatrix::from_column_slice(6, 1, column_data))
    }

    /// Translates the reference point by `p`, expressed in the current reference frame.
    ///
    /// Only the linear rows are affected: `J_lin_new = J_lin + [p]_x . J_ang`, which is the
    /// first-order correction of a velocity field under a change of moment arm.
    pub fn change_ref_point(&mut self, p: &Vector3D) {
        let skew = SO3::from_vector3d(p).matrix().to_owned();
        let angular = self.angular_rows();
        let correction = skew * angular;
        let mut linear = self.0.rows_mut(0, 3);
        linear += correction;
    }

    /// Rotates and translates the Jacobian into a new reference frame given by the rigid
    /// transform `frame_new_from_old`.
    pub fn change_ref_frame(&mut self, transform: &SE3) {
        let rotation = *transform.rotation().0.matrix();
        let translation = transform.translation();

        let mut blocks = Matrix6::<f64>::zeros();
        let skew: Matrix3<f64> = *SO3::from_vector3d(&translation).matrix();
        blocks.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        blocks.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);
        blocks
            .fixed_view_mut::<3, 3>(0, 3)
            .copy_from(&(skew * rotation));

        self.0 = blocks * &self.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn change_ref_point_matches_seed_scenario_s1() {
        let mut jac = Jacobian::from_matrix(DMatrix::identity(6, 7));
        jac.change_ref_point(&Vector3D::new(0.1, 0.2, 0.3));

        let expected_block = Matrix3::new(0.0, -0.3, 0.2, 0.3, 0.0, -0.1, -0.2, 0.1, 0.0);
        assert_relative_eq!(jac.0.fixed_view::<3, 3>(0, 3), expected_block, epsilon = 1e-12);
        assert_relative_eq!(
            jac.0.fixed_view::<3, 3>(3, 3),
            Matrix3::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn change_ref_point_is_its_own_inverse() {
        let original = Jacobian::from_matrix(DMatrix::identity(6, 6));
        let mut jac = original.clone();
        let p = Vector3D::new(0.1, 0.2, 0.3);
        jac.change_ref_point(&p);
        jac.change_ref_point(&(p * -1.0));
        assert_relative_eq!(jac.0, original.0, epsilon = 1e-9);
    }

    #[test]
    fn change_ref_frame_translation_matches_seed_scenario_s2() {
        use crate::motion::SpatialRotation;

        let mut jac = Jacobian::from_matrix(DMatrix::identity(6, 7));
        let transform = SE3::from_parts(Vector3D::new(1.0, 2.0, 3.0), SpatialRotation::identity());
        jac.change_ref_frame(&transform);

        let expected_block = Matrix3::new(0.0, -3.0, 2.0, 3.0, 0.0, -1.0, -2.0, 1.0, 0.0);
        assert_relative_eq!(jac.0.fixed_view::<3, 3>(0, 3), expected_block, epsilon = 1e-12);
        assert_relative_eq!(
            jac.0.fixed_view::<3, 3>(3, 3),
            Matrix3::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn change_ref_frame_round_trips_with_inverse() {
        use crate::motion::SpatialRotation;

        let original = Jacobian::from_matrix(DMatrix::identity(6, 6));
        let mut jac = original.clone();
        let rotation = SpatialRotation::from_axis_angle(&Vector3D::z(), 0.4);
        let transform = SE3::from_parts(Vector3D::new(0.3, -0.2, 0.1), rotation);
        jac.change_ref_frame(&transform);
        jac.change_ref_frame(&transform.inverse());
        assert_relative_eq!(jac.0, original.0, epsilon = 1e-9);
    }
}
