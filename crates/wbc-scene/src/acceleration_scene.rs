//! Acceleration (TSID) scene: the decision variable stacks joint accelerations `q̈`,
//! actuation torques `τ` and, when contact frames are configured, contact forces `λ` (spec
//! §4.3). Rigid-body dynamics and rolling-contact equalities are assembled as the highest
//! priority level; task rows follow at the priorities their constraints declare.

use std::time::Duration;

use nalgebra::{DMatrix, DVector};
use wbc_hqp::{HierarchicalQP, SubQp};
use wbc_model::robot_model::RobotModel;
use wbc_spatial::joint_state::JointState;
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::timestamp::Timestamp;
use wbc_task::{ConstraintConfig, ConstraintStatus, DerivativeMode, Reference};

use crate::bounds::{acceleration_bounds, effort_bounds};
use crate::constraint_set::ConstraintSet;
use crate::errors::SceneError;
use crate::scene::Scene;
use crate::velocity_scene::{DEFAULT_STALENESS_TIMEOUT, DEFAULT_TIMESTEP};

/// Weight given to the rigid-body-dynamics and contact equality rows. Large enough relative
/// to any task weight (which the hierarchical solver already scales by at most unit
/// activation) that, under [`crate::weighted_qp::WeightedQpSolver`] or any solver treating
/// these rows as a high-priority level, they are satisfied to within numerical noise.
pub const DYNAMICS_ROW_WEIGHT: f64 = 1.0e6;

/// Weight applied to the torque and contact-force columns of the regularization block. Small
/// relative to the joint-weight scale on `q̈`: it exists only to keep those columns full rank,
/// not to actively minimize effort.
pub const ACTUATION_REGULARIZATION_WEIGHT: f64 = 1.0e-6;

/// A task-space inverse-dynamics scene.
pub struct AccelerationScene {
    constraints: ConstraintSet,
    base_frame: String,
    contact_frames: Vec<String>,
    n_joints: usize,
    n_actuated: usize,
    n_vars: usize,
    joint_weights: DVector<f64>,
    staleness_timeout: Duration,
    timestep: Duration,
}

impl AccelerationScene {
    /// `base_frame` is the frame every contact Jacobian is computed against — the model's
    /// own floating-base frame for a floating-base model, or its fixed root otherwise.
    #[must_use]
    pub fn new(base_frame: impl Into<String>) -> Self {
        Self {
            constraints: ConstraintSet::configure(Vec::new(), &EmptyModel).expect("empty configuration never fails"),
            base_frame: base_frame.into(),
            contact_frames: Vec::new(),
            n_joints: 0,
            n_actuated: 0,
            n_vars: 0,
            joint_weights: DVector::zeros(0),
            staleness_timeout: DEFAULT_STALENESS_TIMEOUT,
            timestep: DEFAULT_TIMESTEP,
        }
    }

    #[must_use]
    pub fn with_contacts(mut self, contact_frames: Vec<String>) -> Self {
        self.contact_frames = contact_frames;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, staleness_timeout: Duration, timestep: Duration) -> Self {
        self.staleness_timeout = staleness_timeout;
        self.timestep = timestep;
        self
    }

    fn tau_offset(&self) -> usize {
        self.n_joints
    }

    fn lambda_offset(&self) -> usize {
        self.n_joints + self.n_actuated
    }

    /// The rigid-body-dynamics equation `H·q̈ − Sᵀ·τ − Jcᵀ·λ = −h`, plus one 6-row rolling
    /// contact equality `Jc·q̈ = −J̇c·q̇` per configured contact frame.
    fn dynamics_level(&self, model: &mut dyn RobotModel) -> Result<SubQp, SceneError> {
        let nv = self.n_joints;
        let h_matrix = model.joint_space_inertia_matrix()?;
        let bias = model.bias_forces()?;
        let selection = model.selection_matrix();

        let n_contact_rows = 6 * self.contact_frames.len();
        let rows = nv + n_contact_rows;

        let mut a = DMatrix::zeros(rows, self.n_vars);
        let mut y = DVector::zeros(rows);

        a.view_mut((0, 0), (nv, nv)).copy_from(&h_matrix);
        a.view_mut((0, self.tau_offset()), (nv, self.n_actuated)).copy_from(&(-selection.transpose()));
        y.view_mut((0, 0), (nv, 1)).copy_from(&(-DVector::from_row_slice(bias.as_slice())));

        for (i, contact) in self.contact_frames.iter().enumerate() {
            let jc = model.space_jacobian(&self.base_frame, contact)?;
            let bias_c = model.spatial_acceleration_bias(&self.base_frame, contact)?;
            let row_start = nv + 6 * i;
            let lambda_col = self.lambda_offset() + 6 * i;

            // Jc^T coupling into the dynamics rows (rows 0..nv, lambda block's columns).
            a.view_mut((0, lambda_col), (nv, 6)).copy_from(&(-jc.as_matrix().transpose()));

            // The rolling-contact equality row itself: tau/lambda columns stay zero, since
            // Jc*qdd = -Jdot_c*qdot does not involve either.
            a.view_mut((row_start, 0), (6, nv)).copy_from(jc.as_matrix());
            y.view_mut((row_start, 0), (6, 1)).copy_from(&(-DVector::from_row_slice(bias_c.as_slice())));
        }

        let weights = DVector::from_element(rows, DYNAMICS_ROW_WEIGHT);
        Ok(SubQp::unbounded(a, y, weights, self.n_vars))
    }

    fn regularization_level(&self) -> SubQp {
        let mut weights = DVector::from_element(self.n_vars, ACTUATION_REGULARIZATION_WEIGHT);
        weights.view_mut((0, 0), (self.n_joints, 1)).copy_from(&self.joint_weights);
        SubQp::unbounded(DMatrix::identity(self.n_vars, self.n_vars), DVector::zeros(self.n_vars), weights, self.n_vars)
    }

    fn bounds(&self, model: &dyn RobotModel) -> (DVector<f64>, DVector<f64>) {
        let (qdd_lower, qdd_upper) = acceleration_bounds(model, self.timestep.as_secs_f64());
        let (tau_lower, tau_upper) = effort_bounds(model);

        let mut lower = DVector::from_element(self.n_vars, f64::NEG_INFINITY);
        let mut upper = DVector::from_element(self.n_vars, f64::INFINITY);
        lower.view_mut((0, 0), (self.n_joints, 1)).copy_from(&qdd_lower);
        upper.view_mut((0, 0), (self.n_joints, 1)).copy_from(&qdd_upper);
        lower.view_mut((self.tau_offset(), 0), (self.n_actuated, 1)).copy_from(&tau_lower);
        upper.view_mut((self.tau_offset(), 0), (self.n_actuated, 1)).copy_from(&tau_upper);

        (lower, upper)
    }
}

impl Scene for AccelerationScene {
    fn configure(&mut self, configs: Vec<ConstraintConfig>, model: &dyn RobotModel) -> Result<(), SceneError> {
        self.constraints = ConstraintSet::configure(configs, model)?;
        self.n_joints = model.no_of_joints();
        self.n_actuated = model.no_of_actuated_joints();
        self.n_vars = self.n_joints + self.n_actuated + 6 * self.contact_frames.len();
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
        self.constraints.update(model, DerivativeMode::Acceleration, now, self.staleness_timeout)?;

        let (lower, upper) = self.bounds(model);
        let mut hqp = HierarchicalQP::new(self.n_vars);

        let mut dynamics = self.dynamics_level(model)?;
        dynamics.lower_bound = lower.clone();
        dynamics.upper_bound = upper.clone();
        hqp.push(dynamics);

        for (_priority, members) in self.constraints.grouped_by_priority() {
            let rows: usize = members.iter().map(|c| c.a().nrows()).sum();
            let mut a = DMatrix::zeros(rows, self.n_vars);
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

            let mut sub = SubQp::unbounded(a, y, weights, self.n_vars);
            sub.lower_bound = lower.clone();
            sub.upper_bound = upper.clone();
            hqp.push(sub);
        }

        let mut regularization = self.regularization_level();
        regularization.lower_bound = lower;
        regularization.upper_bound = upper;
        hqp.push(regularization);

        Ok(hqp)
    }

    fn command_from_solution(&self, model: &dyn RobotModel, solution: &DVector<f64>, now: Duration) -> NamedVector<JointState> {
        let mut out = NamedVector::new();
        for (i, name) in model.joint_names().iter().enumerate() {
            let mut state = JointState::unspecified();
            state.acceleration = solution[i];
            state.timestamp = Timestamp::at(now);
            let _ = out.push(name.clone(), state);
        }
        for (i, name) in model.actuated_joint_names().iter().enumerate() {
            if let Some(state) = out.get_by_name_mut(name) {
                state.effort = solution[self.tau_offset() + i];
            }
        }
        out
    }

    fn raw_constraints_status(&self, solution: &DVector<f64>, now: Duration) -> Vec<ConstraintStatus> {
        self.constraints.status(solution, now)
    }
}

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
    use wbc_model::robot_model::DynamicsModel;
    use wbc_spatial::motion::SpatialRotation;
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
    fn update_includes_a_dynamics_level_sized_for_the_joint_vector() {
        let model = two_link_arm();
        let mut robot = DynamicsModel::new(model, vec!["shoulder".to_string(), "elbow".to_string()], false).unwrap();
        let joints = joint_state_at(&[("shoulder", 0.3, 0.0), ("elbow", -0.2, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let mut scene = AccelerationScene::new("__WORLD__");
        let configs = vec![ConstraintConfig::cartesian("tip_ctrl", 0, "__WORLD__", "tip", RefFrame::Root)];
        scene.configure(configs, &robot).unwrap();

        let mut reference = wbc_spatial::rigid_body_state::RigidBodyStateSE3::identity("tip", "__WORLD__");
        reference.timestamp = Timestamp::at(Duration::from_secs(1));
        scene.set_reference("tip_ctrl", Reference::Cartesian(reference)).unwrap();

        let hqp = scene.update(&mut robot, Duration::from_secs(1)).unwrap();
        assert_eq!(hqp.n_variables(), 2 + 2);
        assert_eq!(hqp.levels()[0].rows(), 2);
        assert_eq!(hqp.levels()[1].rows(), 6);
        assert_eq!(hqp.levels()[2].rows(), 4);
    }

    #[test]
    fn command_from_solution_splits_acceleration_and_effort() {
        let model = two_link_arm();
        let mut robot = DynamicsModel::new(model, vec!["shoulder".to_string(), "elbow".to_string()], false).unwrap();
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let mut scene = AccelerationScene::new("__WORLD__");
        scene.configure(Vec::new(), &robot).unwrap();

        let solution = DVector::from_row_slice(&[1.0, -1.0, 5.0, -5.0]);
        let command = scene.command_from_solution(&robot, &solution, Duration::from_secs(2));
        assert_eq!(command.get_by_name("shoulder").unwrap().acceleration, 1.0);
        assert_eq!(command.get_by_name("shoulder").unwrap().effort, 5.0);
        assert_eq!(command.get_by_name("elbow").unwrap().effort, -5.0);
    }
}
