//! Declarative recipes for turning a parsed description into a ready-to-use robot model.

use wbc_model::model::Model;
use wbc_model::robot_model::{DynamicsModel, KinematicsModel, RobotModel};
use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
use wbc_spatial::se3::SE3;

use crate::errors::ParseError;
use crate::urdf::{parse_urdf_file, parse_urdf_str};

/// Describes how a parsed kinematic tree should be wrapped into a [`DynamicsModel`] (spec §3,
/// §6: URDF path is the caller's concern, everything else configured here).
#[derive(Clone, Debug, Default)]
pub struct RobotModelConfig {
    /// Names of the joints that are actuated, in the order the controller expects them.
    pub actuated_joint_names: Vec<String>,
    /// Whether to prepend a 6-DOF floating base to the parsed kinematic tree.
    pub floating_base: bool,
    /// World frame id; required when `floating_base` is set.
    pub world_frame_id: Option<String>,
    /// Initial floating-base pose/twist, used before the first externally supplied one
    /// arrives through [`RobotModel::update`]; ignored for fixed-base configurations.
    pub initial_floating_base_state: Option<RigidBodyStateSE3>,
    /// Joints to exclude from actuation: locked to their parsed URDF value and folded into
    /// the fixed kinematic structure rather than exposed as degrees of freedom.
    pub joint_blacklist: Vec<String>,
    /// Frames available as contact candidates to an acceleration (TSID) scene.
    pub contact_points: Vec<String>,
    /// Optional description of closed-loop/parallel submechanisms. Not implemented: any
    /// non-empty value is rejected at configure time rather than silently ignored.
    pub submechanism_description: Option<String>,
}

impl RobotModelConfig {
    /// A fixed-base configuration: every actuated joint is driven directly, no floating base.
    #[must_use]
    pub fn fixed_base(actuated_joint_names: Vec<String>) -> Self {
        Self {
            actuated_joint_names,
            ..Default::default()
        }
    }

    /// A floating-base configuration: a synthetic 6-DOF joint is prepended to the tree.
    #[must_use]
    pub fn floating_base(actuated_joint_names: Vec<String>, world_frame_id: String) -> Self {
        Self {
            actuated_joint_names,
            floating_base: true,
            world_frame_id: Some(world_frame_id),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_joint_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.joint_blacklist = blacklist;
        self
    }

    #[must_use]
    pub fn with_contact_points(mut self, contact_points: Vec<String>) -> Self {
        self.contact_points = contact_points;
        self
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.floating_base && self.world_frame_id.is_none() {
            return Err(ParseError::FloatingBaseRequiresWorldFrame);
        }
        if self.submechanism_description.is_some() {
            return Err(ParseError::MissingAttribute(
                "submechanism description parsing is not implemented".to_string(),
            ));
        }
        Ok(())
    }

    /// Locks every blacklisted joint in `model`, failing if a name does not resolve.
    fn apply_joint_blacklist(&self, model: &mut Model) -> Result<(), ParseError> {
        for name in &self.joint_blacklist {
            model.lock_joint(name)?;
        }
        Ok(())
    }

    fn validate_contact_points(&self, robot: &DynamicsModel) -> Result<(), ParseError> {
        for contact in &self.contact_points {
            if !robot.has_link(contact) && !robot.has_joint(contact) {
                return Err(ParseError::UnknownContactFrame(contact.clone()));
            }
        }
        Ok(())
    }
}

/// Parses a URDF description and wraps it into a [`KinematicsModel`].
pub fn kinematics_model_from_urdf_str(xml: &str) -> Result<KinematicsModel, ParseError> {
    Ok(KinematicsModel::new(parse_urdf_str(xml)?))
}

/// Parses a URDF file and wraps it into a [`KinematicsModel`].
pub fn kinematics_model_from_urdf_file(path: &str) -> Result<KinematicsModel, ParseError> {
    Ok(KinematicsModel::new(parse_urdf_file(path)?))
}

/// Parses a URDF description and wraps it into a [`DynamicsModel`] per `config`.
pub fn dynamics_model_from_urdf_str(xml: &str, config: &RobotModelConfig) -> Result<DynamicsModel, ParseError> {
    config.validate()?;
    let mut model = parse_urdf_str(xml)?;
    config.apply_joint_blacklist(&mut model)?;
    let robot = DynamicsModel::new(model, config.actuated_joint_names.clone(), config.floating_base)?;
    config.validate_contact_points(&robot)?;
    Ok(robot)
}

/// Parses a URDF file and wraps it into a [`DynamicsModel`] per `config`.
pub fn dynamics_model_from_urdf_file(path: &str, config: &RobotModelConfig) -> Result<DynamicsModel, ParseError> {
    config.validate()?;
    let mut model = parse_urdf_file(path)?;
    config.apply_joint_blacklist(&mut model)?;
    let robot = DynamicsModel::new(model, config.actuated_joint_names.clone(), config.floating_base)?;
    config.validate_contact_points(&robot)?;
    Ok(robot)
}

/// Parses a second URDF description and grafts its roots onto `model` at the joint named
/// `hook`, offset by `placement`. Lets a tool or a second arm be composed onto an
/// already-parsed model rather than requiring one monolithic URDF document.
pub fn attach_urdf_tree_str(model: &mut Model, hook: &str, xml: &str, placement: SE3) -> Result<(), ParseError> {
    let hook_id = model
        .get_joint_id(hook)
        .ok_or_else(|| ParseError::UnknownHookJoint(hook.to_string()))?;
    let other = parse_urdf_str(xml)?;
    model.attach_tree(hook_id, other, placement)?;
    Ok(())
}

/// Parses a second URDF file and grafts its roots onto `model` at the joint named `hook`,
/// offset by `placement`. See [`attach_urdf_tree_str`].
pub fn attach_urdf_tree_file(model: &mut Model, hook: &str, path: &str, placement: SE3) -> Result<(), ParseError> {
    let hook_id = model
        .get_joint_id(hook)
        .ok_or_else(|| ParseError::UnknownHookJoint(hook.to_string()))?;
    let other = parse_urdf_file(path)?;
    model.attach_tree(hook_id, other, placement)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_JOINT_URDF: &str = r#"
        <robot name="r">
            <link name="base"/>
            <link name="mid"/>
            <link name="tip"/>
            <joint name="j1" type="revolute">
                <parent link="base"/>
                <child link="mid"/>
                <axis xyz="0 0 1"/>
                <limit lower="-1" upper="1" effort="10" velocity="1"/>
            </joint>
            <joint name="j2" type="revolute">
                <parent link="mid"/>
                <child link="tip"/>
                <axis xyz="0 0 1"/>
                <limit lower="-1" upper="1" effort="10" velocity="1"/>
            </joint>
        </robot>
    "#;

    #[test]
    fn blacklisted_joint_is_dropped_from_actuated_dof_count() {
        let config = RobotModelConfig::fixed_base(vec!["j1".to_string()]).with_joint_blacklist(vec!["j2".to_string()]);
        let robot = dynamics_model_from_urdf_str(TWO_JOINT_URDF, &config).unwrap();
        assert_eq!(robot.no_of_joints(), 1);
    }

    #[test]
    fn unknown_blacklisted_joint_is_rejected() {
        let config = RobotModelConfig::fixed_base(vec!["j1".to_string(), "j2".to_string()])
            .with_joint_blacklist(vec!["no_such_joint".to_string()]);
        assert!(dynamics_model_from_urdf_str(TWO_JOINT_URDF, &config).is_err());
    }

    #[test]
    fn floating_base_without_world_frame_is_rejected() {
        let mut config = RobotModelConfig::floating_base(vec!["j1".to_string(), "j2".to_string()], "world".to_string());
        config.world_frame_id = None;
        assert!(dynamics_model_from_urdf_str(TWO_JOINT_URDF, &config).is_err());
    }

    #[test]
    fn unknown_contact_point_is_rejected() {
        let config = RobotModelConfig::fixed_base(vec!["j1".to_string(), "j2".to_string()])
            .with_contact_points(vec!["no_such_frame".to_string()]);
        assert!(dynamics_model_from_urdf_str(TWO_JOINT_URDF, &config).is_err());
    }

    const GRIPPER_URDF: &str = r#"
        <robot name="gripper">
            <link name="gripper_base"/>
            <link name="finger"/>
            <joint name="finger_joint" type="revolute">
                <parent link="gripper_base"/>
                <child link="finger"/>
                <axis xyz="0 0 1"/>
                <limit lower="-1" upper="1" effort="10" velocity="1"/>
            </joint>
        </robot>
    "#;

    #[test]
    fn attach_urdf_tree_str_grafts_the_second_document_at_the_hook() {
        let mut model = parse_urdf_str(TWO_JOINT_URDF).unwrap();
        let joints_before = model.joint_names.len();
        attach_urdf_tree_str(&mut model, "j2", GRIPPER_URDF, SE3::identity()).unwrap();
        assert_eq!(model.joint_names.len(), joints_before + 1);
        assert!(model.get_joint_id("finger_joint").is_some());
    }

    #[test]
    fn attach_urdf_tree_str_rejects_an_unknown_hook() {
        let mut model = parse_urdf_str(TWO_JOINT_URDF).unwrap();
        assert!(attach_urdf_tree_str(&mut model, "no_such_joint", GRIPPER_URDF, SE3::identity()).is_err());
    }
}
