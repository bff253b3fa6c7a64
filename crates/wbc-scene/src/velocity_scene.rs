//! Velocity scene: decision variable is joint velocity `q̇` (spec §4.3).

use std::time::Duration;

use nalgebra::{DMatrix, DVector};
use wbc_hqp::{HierarchicalQP, SubQp};
use wbc_model::robot_model::RobotModel;
use wbc_spatial::joint_state::JointState;
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::timestamp::Timestamp;
use wbc_task::{ConstraintConfig, ConstraintStatus, DerivativeMode, Reference};

use crate::bounds::velocity_bounds;
use crate::constraint_set::ConstraintSet;
use crate::errors::SceneError;
use crate::scene::Scene;

/// Default reference-staleness timeout (spec §8 Open Questions): a task whose reference is
/// older than this is gated to zero activation. One control-loop "stall" at a typical 1 kHz
/// to 100 Hz WBC loop is on the order of a few milliseconds to tens of milliseconds; 200 ms
/// comfortably covers a dropped cycle or two without masking a genuinely hung reference source.
pub const DEFAULT_STALENESS_TIMEOUT: Duration = Duration::from_millis(200);

/// Default integration step used to project position limits into velocity bounds.
pub const DEFAULT_TIMESTEP: Duration = Duration::from_millis(10);

/// A velocity-level whole-body-control scene: every Cartesian task contributes `J·q̇ =
/// v_ref`, every joint task contributes `q̇_i = v_ref_i`, and the lowest-priority level is a
/// joint-weighted regularization block that keeps the problem full rank.
pub struct VelocityScene {
    constraints: ConstraintSet,
    n_joints: usize,
    joint_weights: DVector<f64>,
    staleness_timeout: Duration,
    timestep: Duration,
}

impl VelocityScene {
    /// An unconfigured scene; call [`Scene::configure`] before use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: ConstraintSet::configure(Vec::new(), &EmptyModel).expect("empty configuration never fails"),
            n_joints: 0,
            joint_weights: DVector::zeros(0),
            staleness_timeout: DEFAULT_STALENESS_TIMEOUT,
            timestep: DEFAULT_TIMESTEP,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, staleness_timeout: Duration, timestep: Duration) -> Self {
        self.staleness_timeout = staleness_timeout;
        self.timestep = timestep;
        self
    }
}

impl Default for VelocityScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for VelocityScene {
    fn configure(&mut self, configs: Vec<ConstraintConfig>, model: &dyn RobotModel) -> Result<(), SceneError> {
        self.constraints = ConstraintSet::configure(configs, model)?;
        self.n_joints = model.no_of_joints();
        self.joint_weights = DVector::from_element(self.n_joints, 1.0);
        Ok(())
    }

    fn set_reference(&mut self, name: &str, reference: Reference) -> Result<(), SceneError> {
        self.constraints.set_reference(name, reference)
    }

    fn set_joint_weights(&mut self, weights: DVector<f64>) -> Result<(), SceneError> {
        if weights.len() != self.n_joints {
            return Err(SceneError::InvalidInput(format!(
                "expected {} joint weights, got {}",
                self.n_joints,
                weights.len()
            )));
        }
        self.joint_weights = weights;
        Ok(())
    }

    fn joint_weights(&self) -> &DVector<f64> {
        &self.joint_weights
    }

    fn update(&mut self, model: &mut dyn RobotModel, now: Duration) -> Result<HierarchicalQP, SceneError> {
        self.constraints.update(model, DerivativeMode::Velocity, now, self.staleness_timeout)?;

        let (lower, upper) = velocity_bounds(model, self.timestep.as_secs_f64());
        let mut hqp = HierarchicalQP::new(self.n_joints);

        for (_priority, members) in self.constraints.grouped_by_priority() {
            let rows: usize = members.iter().map(|c| c.a().nrows()).sum();
            let mut a = DMatrix::zeros(rows, self.n_joints);
            let mut y = DVector::zeros(rows);
            let mut weights = DVector::zeros(rows);

            let mut offset = 0;
            for constraint in members {
                let n = constraint.a().nrows();
                a.view_mut((offset, 0), (n, self.n_joints)).copy_from(constraint.a());
                y.view_mut((offset, 0), (n, 1)).copy_from(constraint.y());
                weights.view_mut((offset, 0), (n, 1)).copy_from(constraint.weights());
                offset += n;
            }

            let mut sub = SubQp::unbounded(a, y, weights, self.n_joints);
            sub.lower_bound = lower.clone();
            sub.upper_bound = upper.clone();
            hqp.push(sub);
        }

        let mut regularization = SubQp::unbounded(
            DMatrix::identity(self.n_joints, self.n_joints),
            DVector::zeros(self.n_joints),
            self.joint_weights.clone(),
            self.n_joints,
        );
        regularization.lower_bound = lower;
        regularization.upper_bound = upper;
        hqp.push(regularization);

        Ok(hqp)
    }

    fn command_from_solution(&self, model: &dyn RobotModel, solution: &DVector<f64>, now: Duration) -> NamedVector<JointState> {
        let mut out = NamedVector::new();
        for (i, name) in model.joint_names().iter().enumerate() {
            let mut state = JointState::unspecified();
            state.speed = solution[i];
            state.timestamp = Timestamp::at(now);
            let _ = out.push(name.clone(), state);
        }
        out
    }

    fn raw_constraints_status(&self, solution: &DVector<f64>, now: Duration) -> Vec<ConstraintStatus> {
        self.constraints.status(solution, now)
    }
}

/// A zero-joint placeholder model used only to build an empty [`ConstraintSet`] before
/// [`Scene::configure`] is first called.
struct EmptyModel;

impl RobotModel for EmptyModel {
    fn update(
        &mut self,
        _joint_state: &NamedVector<JointState>,
        _floating_base_state: Option<&wbc_spatial::rigid_body_state::RigidBodyStateSE3>,
    ) -> Result<(), wbc_model::robot_model::RobotModelError> {
        Ok(())
    }
    fn joint_state(&self, _names: &[String]) -> Result<NamedVector<JointState>, wbc_model::robot_model::RobotModelError> {
        Ok(NamedVector::new())
    }
    fn rigid_body_state(
        &mut self,
        root: &str,
        tip: &str,
    ) -> Result<wbc_spatial::rigid_body_state::RigidBodyStateSE3, wbc_model::robot_model::RobotModelError> {
        Ok(wbc_spatial::rigid_body_state::RigidBodyStateSE3::identity(tip, root))
    }
    fn space_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
        Ok(wbc_spatial::jacobian::Jacobian::zero(0))
    }
    fn body_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
        Ok(wbc_spatial::jacobian::Jacobian::zero(0))
    }
    fn spatial_acceleration_bias(
        &mut self,
        _root: &str,
        _tip: &str,
    ) -> Result<wbc_spatial::motion::SpatialMotion, wbc_model::robot_model::RobotModelError> {
        Ok(wbc_spatial::motion::SpatialMotion::zero())
    }
    fn joint_limits(&self) -> &[wbc_joint::limits::JointLimits] {
        &[]
    }
    fn joint_names(&self) -> &[String] {
        &[]
    }
    fn actuated_joint_names(&self) -> &[String] {
        &[]
    }
    fn no_of_joints(&self) -> usize {
        0
    }
    fn selection_matrix(&self) -> DMatrix<f64> {
        DMatrix::zeros(0, 0)
    }
    fn has_link(&self, _name: &str) -> bool {
        false
    }
    fn has_joint(&self, _name: &str) -> bool {
        false
    }
    fn joint_index(&self, _name: &str) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbc_inertia::inertia::Inertia;
    use wbc_joint::joint::JointWrapper;
    use wbc_joint::revolute::JointModelRevolute;
    use wbc_model::frame::{Frame, FrameType};
    use wbc_model::model::{Model, WORLD_FRAME_ID, WORLD_ID};
    use wbc_model::robot_model::KinematicsModel;
    use wbc_spatial::motion::{SpatialMotion, SpatialRotation};
    use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
    use wbc_spatial::se3::SE3;
    use wbc_spatial::symmetric3::Symmetric3;
    use wbc_spatial::vector3d::Vector3D;
    use wbc_task::RefFrame;

    fn two_link_arm() -> Model {
        let mut model = Model::new("arm".to_string());
        let shoulder = model
            .add_joint(WORLD_ID, JointWrapper::revolute(JointModelRevolute::new_rz()), SE3::identity(), "shoulder".to_string())
            .unwrap();
        model.inertias[shoulder] = Inertia::new(1.0, Vector3D::new(0.5, 0.0, 0.0), Symmetric3::zeros());

        let elbow = model
            .add_joint(
                shoulder,
                JointWrapper::revolute(JointModelRevolute::new_rz()),
                SE3::from_parts(Vector3D::new(1.0, 0.0, 0.0), SpatialRotation::identity()),
                "elbow".to_string(),
            )
            .unwrap();
        model.inertias[elbow] = Inertia::new(1.0, Vector3D::new(0.5, 0.0, 0.0), Symmetric3::zeros());

        model
            .add_frame(
                Frame::new(
                    "tip".to_string(),
                    elbow,
                    WORLD_FRAME_ID,
                    SE3::from_parts(Vector3D::new(1.0, 0.0, 0.0), SpatialRotation::identity()),
                    FrameType::Operational,
                    Inertia::zeros(),
                ),
                false,
            )
            .unwrap();

        model
    }

    fn joint_state_at(positions: &[(&str, f64, f64)], t: Duration) -> NamedVector<JointState> {
        let mut state = NamedVector::new();
        for (name, position, speed) in positions {
            let mut js = JointState::unspecified();
            js.position = *position;
            js.speed = *speed;
            js.timestamp = Timestamp::at(t);
            state.push((*name).to_string(), js).unwrap();
        }
        state
    }

    #[test]
    fn update_produces_one_hqp_level_per_priority_plus_regularization() {
        let mut robot = KinematicsModel::new(two_link_arm());
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let mut scene = VelocityScene::new();
        let configs = vec![ConstraintConfig::cartesian("tip_ctrl", 0, "__WORLD__", "tip", RefFrame::Root)];
        scene.configure(configs, &robot).unwrap();

        let mut reference = RigidBodyStateSE3::identity("tip", "__WORLD__");
        reference.twist = SpatialMotion::from_parts(Vector3D::new(0.0, 1.0, 0.0), Vector3D::zeros());
        reference.timestamp = Timestamp::at(Duration::from_secs(1));
        scene.set_reference("tip_ctrl", Reference::Cartesian(reference)).unwrap();

        let hqp = scene.update(&mut robot, Duration::from_secs(1)).unwrap();
        assert_eq!(hqp.n_priorities(), 2);
        assert_eq!(hqp.levels()[0].rows(), 6);
        assert_eq!(hqp.levels()[1].rows(), 2);
    }

    #[test]
    fn command_from_solution_maps_the_solver_vector_onto_named_speeds() {
        let mut robot = KinematicsModel::new(two_link_arm());
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let mut scene = VelocityScene::new();
        scene.configure(Vec::new(), &robot).unwrap();

        let solution = DVector::from_row_slice(&[0.3, -0.1]);
        let command = scene.command_from_solution(&robot, &solution, Duration::from_secs(2));
        assert_eq!(command.get_by_name("shoulder").unwrap().speed, 0.3);
        assert_eq!(command.get_by_name("elbow").unwrap().speed, -0.1);
    }

    #[test]
    fn activation_zero_contributes_zero_weighted_rows() {
        let mut robot = KinematicsModel::new(two_link_arm());
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let mut scene = VelocityScene::new();
        let mut config = ConstraintConfig::joint("posture", 0, vec!["elbow".to_string()]);
        config.activation = 0.0;
        scene.configure(vec![config], &robot).unwrap();

        let mut reference = NamedVector::new();
        let mut js = JointState::unspecified();
        js.speed = 1.0;
        js.timestamp = Timestamp::at(Duration::from_secs(1));
        reference.push("elbow".to_string(), js).unwrap();
        scene.set_reference("posture", Reference::Joint(reference)).unwrap();

        let hqp = scene.update(&mut robot, Duration::from_secs(1)).unwrap();
        assert_eq!(hqp.levels()[0].weights[0], 0.0);
    }
}
