//! Runtime realization of a [`ConstraintConfig`]: the per-cycle `A`/`y`/weights the scene
//! folds into the hierarchical QP.

use std::time::Duration;

use nalgebra::{DMatrix, DVector};
use wbc_model::robot_model::RobotModel;
use wbc_spatial::joint_state::JointState;
use wbc_spatial::motion::SpatialMotion;
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
use wbc_spatial::timestamp::Timestamp;

use crate::config::{ConstraintConfig, RefFrame, TaskType};
use crate::errors::TaskError;
use crate::reference::Reference;

/// Which per-joint quantity a constraint reads from / writes to: velocity scenes work in
/// speed, TSID (acceleration) scenes work in acceleration and additionally need the
/// `J̇ q̇` bias subtracted from Cartesian task rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivativeMode {
    Velocity,
    Acceleration,
}

/// The live, per-cycle realization of a [`ConstraintConfig`].
///
/// Invariants (spec §3, §8-1): `a.nrows() == weights.len() == y.len()` and
/// `a.ncols() == n_joints` at all times after construction.
#[derive(Clone, Debug)]
pub struct Constraint {
    config: ConstraintConfig,
    n_joints: usize,
    a: DMatrix<f64>,
    y: DVector<f64>,
    weights: DVector<f64>,
    reference: Option<Reference>,
    activation: f64,
}

impl Constraint {
    /// Builds the runtime constraint for `config` over a model with `n_joints` degrees of
    /// freedom, validating the config and, for Cartesian tasks, that its frames exist and,
    /// for joint tasks, that its joints exist.
    pub fn new(config: ConstraintConfig, model: &dyn RobotModel) -> Result<Self, TaskError> {
        config.validate()?;
        match config.task_type {
            TaskType::Cartesian => {
                if !model.has_link(&config.root) {
                    return Err(TaskError::Config(format!(
                        "constraint '{}': unknown root frame '{}'",
                        config.name, config.root
                    )));
                }
                if !model.has_link(&config.tip) {
                    return Err(TaskError::Config(format!(
                        "constraint '{}': unknown tip frame '{}'",
                        config.name, config.tip
                    )));
                }
            }
            TaskType::Joint => {
                for joint in &config.joint_names {
                    if model.joint_index(joint).is_none() {
                        return Err(TaskError::Config(format!(
                            "constraint '{}': unknown joint '{}'",
                            config.name, joint
                        )));
                    }
                }
            }
        }

        let dim = config.dimension();
        let n_joints = model.no_of_joints();
        Ok(Self {
            config,
            n_joints,
            a: DMatrix::zeros(dim, n_joints),
            y: DVector::zeros(dim),
            weights: DVector::zeros(dim),
            reference: None,
            activation: 0.0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn priority(&self) -> u32 {
        self.config.priority
    }

    #[must_use]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[must_use]
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    #[must_use]
    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Effective activation for the last `update` call (config activation gated by
    /// reference staleness).
    #[must_use]
    pub fn activation(&self) -> f64 {
        self.activation
    }

    #[must_use]
    pub fn last_reference_timestamp(&self) -> Timestamp {
        self.reference.as_ref().map_or_else(Timestamp::never, Reference::timestamp)
    }

    /// Sets this cycle's reference. Fails if `reference` does not match the constraint's
    /// declared [`TaskType`].
    pub fn set_reference(&mut self, reference: Reference) -> Result<(), TaskError> {
        let matches = matches!(
            (&self.config.task_type, &reference),
            (TaskType::Joint, Reference::Joint(_)) | (TaskType::Cartesian, Reference::Cartesian(_))
        );
        if !matches {
            return Err(TaskError::WrongReferenceKind {
                constraint: self.config.name.clone(),
                expected: match self.config.task_type {
                    TaskType::Joint => "joint",
                    TaskType::Cartesian => "cartesian",
                },
            });
        }
        self.reference = Some(reference);
        Ok(())
    }

    /// Rebuilds `a`, `y` and the effective weights from the current reference and robot-model
    /// state. `now` and `staleness_timeout` gate activation: a reference older than the
    /// timeout (or never set) collapses activation to 0, per spec §4.2.
    #[tracing::instrument(skip(self, model), fields(constraint = %self.config.name))]
    pub fn update(
        &mut self,
        model: &mut dyn RobotModel,
        mode: DerivativeMode,
        now: Duration,
        staleness_timeout: Duration,
    ) -> Result<(), TaskError> {
        self.activation = effective_activation(self.config.activation, self.reference.as_ref(), now, staleness_timeout);

        match (&self.config.task_type, &self.reference) {
            (TaskType::Cartesian, Some(Reference::Cartesian(reference))) => {
                self.update_cartesian(model, mode, reference.clone())?;
            }
            (TaskType::Joint, Some(Reference::Joint(reference))) => {
                self.update_joint(model, mode, reference.clone())?;
            }
            _ => {
                // No reference yet: keep A/y at zero, activation already forced to 0.
                self.a.fill(0.0);
                self.y.fill(0.0);
            }
        }

        let activation = self.activation;
        for (i, w) in self.config.weights.iter().enumerate() {
            self.weights[i] = activation * w;
        }
        Ok(())
    }

    fn update_cartesian(
        &mut self,
        model: &mut dyn RobotModel,
        mode: DerivativeMode,
        reference: RigidBodyStateSE3,
    ) -> Result<(), TaskError> {
        let root = self.config.root.as_str();
        let tip = self.config.tip.as_str();

        let jacobian = model.space_jacobian(root, tip)?;
        self.a.copy_from(jacobian.as_matrix());

        let twist_root = match (mode, self.config.ref_frame) {
            (DerivativeMode::Velocity, RefFrame::Tip) => rotate_into_root(model, root, tip, &reference.twist)?,
            (DerivativeMode::Velocity, RefFrame::Root) => reference.twist.clone(),
            (DerivativeMode::Acceleration, RefFrame::Tip) => {
                rotate_into_root(model, root, tip, &reference.spatial_acceleration)?
            }
            (DerivativeMode::Acceleration, RefFrame::Root) => reference.spatial_acceleration.clone(),
        };
        self.y.copy_from(&DVector::from_row_slice(twist_root.as_slice()));

        if mode == DerivativeMode::Acceleration {
            let bias = model.spatial_acceleration_bias(root, tip)?;
            self.y -= DVector::from_row_slice(bias.as_slice());
        }
        Ok(())
    }

    fn update_joint(
        &mut self,
        model: &mut dyn RobotModel,
        mode: DerivativeMode,
        reference: NamedVector<JointState>,
    ) -> Result<(), TaskError> {
        self.a.fill(0.0);
        for (row, name) in self.config.joint_names.iter().enumerate() {
            let col = model
                .joint_index(name)
                .ok_or_else(|| TaskError::InvalidInput(format!("unknown joint '{name}'")))?;
            self.a[(row, col)] = 1.0;

            let state = reference
                .get_by_name(name)
                .ok_or_else(|| TaskError::InvalidInput(format!("reference is missing joint '{name}'")))?;
            self.y[row] = match mode {
                DerivativeMode::Velocity => state.speed,
                DerivativeMode::Acceleration => state.acceleration,
            };
        }
        Ok(())
    }
}

fn rotate_into_root(
    model: &mut dyn RobotModel,
    root: &str,
    tip: &str,
    tip_frame_motion: &SpatialMotion,
) -> Result<SpatialMotion, TaskError> {
    let pose = model.rigid_body_state(root, tip)?.pose();
    let rotation = pose.rotation();
    Ok(SpatialMotion::from_parts(
        rotation * &tip_frame_motion.translation(),
        rotation * &tip_frame_motion.rotation(),
    ))
}

fn effective_activation(
    config_activation: f64,
    reference: Option<&Reference>,
    now: Duration,
    staleness_timeout: Duration,
) -> f64 {
    let Some(reference) = reference else {
        return 0.0;
    };
    match reference.timestamp().age(now) {
        None => 0.0,
        Some(age) if age > staleness_timeout => 0.0,
        Some(_) => config_activation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbc_spatial::vector3d::Vector3D;

    #[test]
    fn effective_activation_is_zero_without_a_reference() {
        assert_eq!(effective_activation(1.0, None, Duration::ZERO, Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn effective_activation_is_zero_past_the_staleness_timeout() {
        let reference = Reference::Cartesian(RigidBodyStateSE3::identity("tip", "root"));
        // never-set timestamp ages to "no data" -> gated to zero regardless of timeout.
        assert_eq!(
            effective_activation(1.0, Some(&reference), Duration::from_secs(10), Duration::from_secs(1)),
            0.0
        );
    }

    #[test]
    fn effective_activation_passes_through_when_fresh() {
        let mut reference = RigidBodyStateSE3::identity("tip", "root");
        reference.timestamp = Timestamp::at(Duration::from_secs(1));
        let reference = Reference::Cartesian(reference);
        assert_eq!(
            effective_activation(0.5, Some(&reference), Duration::from_millis(1100), Duration::from_secs(1)),
            0.5
        );
    }

    fn two_link_arm() -> wbc_model::model::Model {
        use wbc_inertia::inertia::Inertia;
        use wbc_joint::joint::JointWrapper;
        use wbc_joint::revolute::JointModelRevolute;
        use wbc_model::frame::{Frame, FrameType};
        use wbc_model::model::{Model, WORLD_FRAME_ID, WORLD_ID};
        use wbc_spatial::motion::SpatialRotation;
        use wbc_spatial::se3::SE3;
        use wbc_spatial::symmetric3::Symmetric3;

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
    fn cartesian_constraint_writes_space_jacobian_and_root_frame_reference() {
        use wbc_model::robot_model::KinematicsModel;

        let mut robot = KinematicsModel::new(two_link_arm());
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let config = ConstraintConfig::cartesian("tip_ctrl", 0, "__WORLD__", "tip", RefFrame::Root);
        let mut constraint = Constraint::new(config, &robot).unwrap();

        let mut reference = RigidBodyStateSE3::identity("tip", "__WORLD__");
        reference.twist = SpatialMotion::from_parts(Vector3D::new(0.0, 1.0, 0.0), Vector3D::zeros());
        reference.timestamp = Timestamp::at(Duration::from_secs(1));
        constraint.set_reference(Reference::Cartesian(reference)).unwrap();

        constraint
            .update(&mut robot, DerivativeMode::Velocity, Duration::from_secs(1), Duration::from_secs(1))
            .unwrap();

        assert_eq!(constraint.a().nrows(), 6);
        assert_eq!(constraint.a().ncols(), robot.no_of_joints());
        assert_eq!(constraint.y()[1], 1.0);
        assert_eq!(constraint.activation(), 1.0);
        assert_eq!(constraint.weights()[0], 1.0);
    }

    #[test]
    fn joint_constraint_is_a_selection_matrix() {
        use wbc_model::robot_model::KinematicsModel;

        let mut robot = KinematicsModel::new(two_link_arm());
        let joints = joint_state_at(&[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)], Duration::from_secs(1));
        robot.update(&joints, None).unwrap();

        let config = ConstraintConfig::joint("posture", 5, vec!["elbow".to_string()]);
        let mut constraint = Constraint::new(config, &robot).unwrap();

        let mut reference = NamedVector::new();
        let mut js = JointState::unspecified();
        js.speed = 0.7;
        js.timestamp = Timestamp::at(Duration::from_secs(1));
        reference.push("elbow".to_string(), js).unwrap();
        constraint.set_reference(Reference::Joint(reference)).unwrap();

        constraint
            .update(&mut robot, DerivativeMode::Velocity, Duration::from_secs(1), Duration::from_secs(1))
            .unwrap();

        let elbow_col = robot.joint_index("elbow").unwrap();
        assert_eq!(constraint.a()[(0, elbow_col)], 1.0);
        assert_eq!(constraint.y()[0], 0.7);
    }

    #[test]
    fn set_reference_rejects_the_wrong_kind() {
        let robot = KinematicsModelStub;
        let config = ConstraintConfig::joint("posture", 0, vec!["elbow".to_string()]);
        let mut constraint = Constraint::new(config, &robot).unwrap();
        let err = constraint.set_reference(Reference::Cartesian(RigidBodyStateSE3::identity("tip", "root")));
        assert!(matches!(err, Err(TaskError::WrongReferenceKind { .. })));
    }

    /// A minimal [`RobotModel`] stub exposing a single joint, used only to exercise
    /// reference-kind checking without needing a full kinematic tree.
    struct KinematicsModelStub;

    impl RobotModel for KinematicsModelStub {
        fn update(
            &mut self,
            _joint_state: &NamedVector<JointState>,
            _floating_base_state: Option<&RigidBodyStateSE3>,
        ) -> Result<(), wbc_model::robot_model::RobotModelError> {
            Ok(())
        }

        fn joint_state(&self, _names: &[String]) -> Result<NamedVector<JointState>, wbc_model::robot_model::RobotModelError> {
            Ok(NamedVector::new())
        }

        fn rigid_body_state(&mut self, root: &str, tip: &str) -> Result<RigidBodyStateSE3, wbc_model::robot_model::RobotModelError> {
            Ok(RigidBodyStateSE3::identity(tip, root))
        }

        fn space_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::jacobian::Jacobian::zero(1))
        }

        fn body_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::jacobian::Jacobian::zero(1))
        }

        fn spatial_acceleration_bias(&mut self, _root: &str, _tip: &str) -> Result<SpatialMotion, wbc_model::robot_model::RobotModelError> {
            Ok(SpatialMotion::zero())
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
            1
        }

        fn selection_matrix(&self) -> DMatrix<f64> {
            DMatrix::identity(1, 1)
        }

        fn has_link(&self, _name: &str) -> bool {
            true
        }

        fn has_joint(&self, _name: &str) -> bool {
            true
        }

        fn joint_index(&self, _name: &str) -> Option<usize> {
            Some(0)
        }
    }
}
