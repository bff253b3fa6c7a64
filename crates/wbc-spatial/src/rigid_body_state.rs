//! Defines **rigid-body state**: pose, twist and spatial acceleration of a named frame.

use nalgebra::UnitQuaternion;

use crate::{motion::SpatialMotion, se3::SE3, timestamp::Timestamp, vector3d::Vector3D};

#[derive(Debug, Clone, PartialEq)]
/// Pose (translation + unit quaternion), twist and spatial acceleration of one frame
/// expressed with respect to another, as reported by forward kinematics or supplied as a
/// reference.
pub struct RigidBodyStateSE3 {
    pub translation: Vector3D,
    pub orientation: UnitQuaternion<f64>,
    pub twist: SpatialMotion,
    pub spatial_acceleration: SpatialMotion,
    pub frame_id: String,
    pub source_frame: String,
    pub timestamp: Timestamp,
}

impl RigidBodyStateSE3 {
    #[must_use]
    pub fn identity(frame_id: impl Into<String>, source_frame: impl Into<String>) -> Self {
        Self {
            translation: Vector3D::zeros(),
            orientation: UnitQuaternion::identity(),
            twist: SpatialMotion::zero(),
            spatial_acceleration: SpatialMotion::zero(),
            frame_id: frame_id.into(),
            source_frame: source_frame.into(),
            timestamp: Timestamp::never(),
        }
    }

    /// Builds the pose from a rigid-body transform, keeping twist/acceleration at zero.
    #[must_use]
    pub fn from_pose(
        se3: &SE3,
        frame_id: impl Into<String>,
        source_frame: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            translation: se3.translation(),
            orientation: UnitQuaternion::from_rotation_matrix(&se3.rotation().0),
            twist: SpatialMotion::zero(),
            spatial_acceleration: SpatialMotion::zero(),
            frame_id: frame_id.into(),
            source_frame: source_frame.into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn pose(&self) -> SE3 {
        use crate::motion::SpatialRotation;
        SE3::from_parts(
            self.translation,
            SpatialRotation(self.orientation.to_rotation_matrix()),
        )
    }
}
