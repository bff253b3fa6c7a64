//! `Data` structure containing the mutable properties of the robot.

use wbc_joint::joint_data::JointDataWrapper;
use wbc_spatial::{
    configuration::Configuration, force::SpatialForce, jacobian::Jacobian, motion::SpatialMotion,
    se3::SE3, vector3d::Vector3D,
};

use crate::model::Model;

/// Structure containing the mutable properties of the robot.
pub struct Data {
    /// The data of the joints
    pub joint_data: Vec<JointDataWrapper>,
    /// The placements of the joints in the world frame (oMi)
    pub joint_placements: Vec<SE3>,
    /// Placements of the frames in the world frame (oMf)
    pub frame_placements: Vec<SE3>,
    /// The local joint placements in the parent frame (liMi)
    pub local_joint_placements: Vec<SE3>,
    /// Velocities of the joints in the local frame (v)
    pub joint_velocities: Vec<SpatialMotion>,
    /// Velocities of the joints in the world frame (ov)
    pub world_joint_velocities: Vec<SpatialMotion>,
    /// Accelerations of the joints in the local frame (a)
    pub joint_accelerations: Vec<SpatialMotion>,
    /// Accelerations of the joints due to the gravity field (a_gf)
    pub joint_accelerations_gravity_field: Vec<SpatialMotion>,
    /// Accelerations of the joints in the world frame including the gravity field (oa_gf)
    pub world_accelerations_gravity_field: Vec<SpatialMotion>,
    /// The spatial momenta of the joint in the local frame (h), inertia times velocity
    pub joint_momenta: Vec<SpatialForce>,
    /// The spatial forces of the joint in the local frame (f), inertia times acceleration plus the Coriolis term
    pub joint_forces: Vec<SpatialForce>,
    /// The spatial forces of the joint in the world frame (of), inertia times acceleration plus the Coriolis term
    pub world_joint_forces: Vec<SpatialForce>,
    /// The configuration of torques/forces applied to the joints (tau)
    pub tau: Configuration,
    /// The joint accelerations of the joints computed by the forward dynamics (ddq)
    pub ddq: Configuration,
    /// The Jacobian matrix of the joint placements (J)
    pub jacobian: Jacobian,
}

impl Data {
    /// Creates a new `Data` object from the given joint datas and model.
    ///
    /// # Arguments
    ///
    /// * `joint_data` - A vector of joint data wrappers.
    /// * `model` - The robot model.
    ///
    /// # Returns
    /// A new `Data` object.
    #[must_use]
    pub fn from_joints_data(joint_data: Vec<JointDataWrapper>, model: &Model) -> Self {
        let njoints = joint_data.len();
        let mut joint_accelerations_gravity_field = vec![SpatialMotion::zero(); njoints];

        // set the base acceleration to compensate gravity
        joint_accelerations_gravity_field[0] =
            SpatialMotion::from_parts(-model.gravity, Vector3D::zeros());

        Data {
            joint_data,
            joint_placements: vec![SE3::identity(); njoints],
            frame_placements: vec![SE3::identity(); model.nframes()],
            local_joint_placements: vec![SE3::identity(); njoints],
            joint_velocities: vec![SpatialMotion::zero(); njoints],
            world_joint_velocities: vec![SpatialMotion::zero(); njoints],
            joint_accelerations: vec![SpatialMotion::zero(); njoints],
            joint_accelerations_gravity_field,
            world_accelerations_gravity_field: vec![SpatialMotion::zero(); njoints],
            joint_momenta: vec![SpatialForce::zero(); njoints],
            joint_forces: vec![SpatialForce::zero(); njoints],
            world_joint_forces: vec![SpatialForce::zero(); njoints],
            tau: Configuration::zeros(model.nv),
            ddq: Configuration::zeros(model.nv),
            jacobian: Jacobian::zero(model.nv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_joints_data_sizes_buffers_from_model() {
        let model = Model::new_empty();
        let data = model.create_data();
        assert_eq!(data.joint_placements.len(), model.njoints());
        assert_eq!(data.frame_placements.len(), model.nframes());
        assert_eq!(data.tau.len(), model.nv);
        assert_eq!(data.jacobian.cols(), model.nv);
    }
}
