//! The [`RobotModel`] capability trait consumed by scenes and constraints, together with
//! its two concrete variants: a kinematics-only model restricted to a single serial chain,
//! and a full-dynamics model that additionally supports a floating base and inertial queries.
//!
//! Both variants share the same chain-traversal and Jacobian machinery below; they differ
//! only in which root frame they accept and which of the dynamics-only trait methods they
//! override.

use nalgebra::DMatrix;
use thiserror::Error;

use wbc_joint::joint::JointModel;
use wbc_joint::joint_data::JointData;
use wbc_joint::limits::JointLimits;
use wbc_joint::prismatic::JointModelPrismatic;
use wbc_joint::revolute::JointModelRevolute;
use wbc_joint::joint::JointWrapper;
use wbc_spatial::configuration::Configuration;
use wbc_spatial::jacobian::Jacobian;
use wbc_spatial::joint_state::JointState;
use wbc_spatial::motion::{SpatialMotion, SpatialRotation};
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
use wbc_spatial::se3::SE3;
use wbc_spatial::timestamp::Timestamp;
use wbc_spatial::vector3d::Vector3D;

use crate::data::Data;
use crate::errors::AlgorithmError;
use crate::forward_kinematics::{forward_kinematics, update_frame_placements};
use crate::inverse_dynamics::inverse_dynamics;
use crate::model::{Model, WORLD_ID};

/// Errors returned by [`RobotModel`] operations.
#[derive(Debug, Error)]
pub enum RobotModelError {
    /// The model could not be assembled from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// A caller supplied an argument that is structurally invalid (unknown name, wrong
    /// chain, stale or missing data).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A numeric routine failed to produce a usable result.
    #[error("numeric failure: {0}")]
    NumericFailure(String),
    /// The operation is not supported by this variant of the robot model.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// An underlying kinematics/dynamics algorithm failed.
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

/// Which frame a Jacobian or twist is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReferenceFrame {
    Root,
    Tip,
}

/// The query surface a scene or constraint uses against a robot model, independent of
/// whether it is backed by a kinematics-only or full-dynamics implementation.
pub trait RobotModel {
    /// Advances the model to a new joint state (and, for floating-base models, a new base
    /// pose/twist), recomputing kinematics. Every entry in `joint_state` must carry a
    /// position, a speed and a non-null timestamp.
    fn update(
        &mut self,
        joint_state: &NamedVector<JointState>,
        floating_base_state: Option<&RigidBodyStateSE3>,
    ) -> Result<(), RobotModelError>;

    /// Returns the last joint state stamped into the model, restricted to `names`.
    fn joint_state(&self, names: &[String]) -> Result<NamedVector<JointState>, RobotModelError>;

    /// Pose, twist and spatial acceleration of `tip` with respect to `root`.
    fn rigid_body_state(&mut self, root: &str, tip: &str) -> Result<RigidBodyStateSE3, RobotModelError>;

    /// Jacobian of `tip` with respect to `root`, expressed in the orientation of `root`.
    fn space_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError>;

    /// Jacobian of `tip` with respect to `root`, expressed in the orientation of `tip`.
    fn body_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError>;

    /// Time-derivative of the space Jacobian contracted with the current joint velocities.
    ///
    /// Not implemented by either variant: the same quantity is available, exactly, as
    /// [`RobotModel::spatial_acceleration_bias`], which is what every task in this crate uses.
    fn jacobian_dot(&mut self, _root: &str, _tip: &str) -> Result<Jacobian, RobotModelError> {
        Err(RobotModelError::NotImplemented("jacobianDot".to_string()))
    }

    /// The $\dot J \dot q$ term: the spatial acceleration `tip` would have relative to
    /// `root` if every joint acceleration were zero.
    fn spatial_acceleration_bias(&mut self, root: &str, tip: &str) -> Result<SpatialMotion, RobotModelError>;

    /// Joint-space inertia matrix $H(q)$, of size `no_of_joints() x no_of_joints()`.
    fn joint_space_inertia_matrix(&mut self) -> Result<DMatrix<f64>, RobotModelError> {
        Err(RobotModelError::NotImplemented("jointSpaceInertiaMatrix".to_string()))
    }

    /// Generalized Coriolis, centrifugal and gravity forces at the current state.
    fn bias_forces(&mut self) -> Result<Configuration, RobotModelError> {
        Err(RobotModelError::NotImplemented("biasForces".to_string()))
    }

    /// Kinematic and dynamic limits of each joint, in the same order as [`RobotModel::joint_names`].
    fn joint_limits(&self) -> &[JointLimits];

    /// Names of every degree of freedom in the full joint vector, in Jacobian-column order.
    fn joint_names(&self) -> &[String];

    /// Names of the joints driven through [`RobotModel::update`]'s `joint_state` argument.
    fn actuated_joint_names(&self) -> &[String];

    /// Size of the full joint vector (`== joint_names().len()`).
    fn no_of_joints(&self) -> usize;

    /// Number of externally actuated joints (`== actuated_joint_names().len()`).
    fn no_of_actuated_joints(&self) -> usize {
        self.actuated_joint_names().len()
    }

    /// Matrix mapping the actuated joint vector into the full joint vector.
    fn selection_matrix(&self) -> DMatrix<f64>;

    /// Whether `name` refers to a known link/frame.
    fn has_link(&self, name: &str) -> bool;

    /// Whether `name` refers to a known joint.
    fn has_joint(&self, name: &str) -> bool;

    /// Column index of `name` within the full joint vector, if it is a degree of freedom.
    fn joint_index(&self, name: &str) -> Option<usize>;

    /// World-frame pose of the whole-body center of mass (twist/acceleration left at zero).
    fn center_of_mass(&mut self) -> Result<RigidBodyStateSE3, RobotModelError> {
        Err(RobotModelError::NotImplemented("centerOfMass".to_string()))
    }
}

// ---------------------------------------------------------------------------------------
// Shared chain/Jacobian machinery
// ---------------------------------------------------------------------------------------

/// A single degree-of-freedom joint's contribution to a kinematic chain, resolved against
/// the model's current configuration.
struct ChainJoint {
    joint_id: usize,
    v_offset: usize,
    /// World position of the joint's own mounting frame (where its axis is anchored).
    p_world: Vector3D,
    /// World-frame translation axis; zero for a revolute joint.
    lin_world: Vector3D,
    /// World-frame rotation axis; zero for a prismatic joint.
    ang_world: Vector3D,
}

/// This joint's unit-velocity spatial motion contribution at world point `p`.
fn column_at_point(joint: &ChainJoint, p: &Vector3D) -> SpatialMotion {
    let arm = *p - joint.p_world;
    let linear = joint.lin_world + joint.ang_world.cross(&arm);
    SpatialMotion::from_parts(linear, joint.ang_world)
}

fn joint_v_scalar(data: &Data, joint_id: usize) -> f64 {
    data.joint_data[joint_id].get_joint_v()[0]
}

/// Resolves `name` to the id of a joint, accepting either a joint name directly or the name
/// of a frame attached to one.
fn resolve_joint_id(model: &Model, name: &str) -> Result<usize, RobotModelError> {
    if let Some(joint_id) = model.get_joint_id(name) {
        return Ok(joint_id);
    }
    if let Some(frame_id) = model.get_frame_id(name, None) {
        return Ok(model.frames[frame_id].parent_joint);
    }
    Err(RobotModelError::InvalidInput(format!(
        "'{name}' is neither a known joint nor a known frame"
    )))
}

/// Resolves `name` to its current world placement and the joint it is attached to.
fn resolve_point(model: &Model, data: &Data, name: &str) -> Result<(SE3, usize), RobotModelError> {
    if let Some(joint_id) = model.get_joint_id(name) {
        return Ok((data.joint_placements[joint_id], joint_id));
    }
    if let Some(frame_id) = model.get_frame_id(name, None) {
        let parent_joint = model.frames[frame_id].parent_joint;
        return Ok((data.frame_placements[frame_id], parent_joint));
    }
    Err(RobotModelError::InvalidInput(format!(
        "'{name}' is neither a known joint nor a known frame"
    )))
}

fn ancestors_inclusive(model: &Model, joint_id: usize) -> Vec<usize> {
    let mut chain = vec![joint_id];
    let mut current = joint_id;
    while current != WORLD_ID {
        current = model.joint_parents[current];
        chain.push(current);
    }
    chain
}

/// Joints strictly between `root_joint` (exclusive) and `tip_joint` (inclusive), ordered
/// from root to tip. Fails if `root_joint` is not an ancestor of `tip_joint`.
fn chain_between(model: &Model, root_joint: usize, tip_joint: usize) -> Result<Vec<usize>, RobotModelError> {
    let tip_ancestors = ancestors_inclusive(model, tip_joint);
    let position = tip_ancestors
        .iter()
        .position(|&joint_id| joint_id == root_joint)
        .ok_or_else(|| {
            RobotModelError::InvalidInput("root frame is not an ancestor of tip frame".to_string())
        })?;
    let mut chain: Vec<usize> = tip_ancestors[..position].to_vec();
    chain.reverse();
    Ok(chain)
}

fn chain_geometry(model: &Model, data: &Data, chain_ids: &[usize]) -> Vec<ChainJoint> {
    chain_ids
        .iter()
        .filter_map(|&joint_id| {
            let joint_model = &model.joint_models[joint_id];
            if joint_model.nv() == 0 {
                return None;
            }
            let parent_id = model.joint_parents[joint_id];
            let mount = data.joint_placements[parent_id] * model.joint_placements[joint_id];
            let axes = joint_model.get_axis();
            let axis = axes.first()?;
            let ang_world = mount.rotation() * &axis.rotation();
            let lin_world = mount.rotation() * &axis.translation();
            Some(ChainJoint {
                joint_id,
                v_offset: model.joint_v_offset(joint_id),
                p_world: mount.translation(),
                lin_world,
                ang_world,
            })
        })
        .collect()
}

fn build_jacobian(chain: &[ChainJoint], p_tip: &Vector3D, cols: usize, to_local: SpatialRotation) -> Jacobian {
    let mut jacobian = Jacobian::zero(cols);
    for joint in chain {
        let column_world = column_at_point(joint, p_tip);
        let linear = to_local * &column_world.translation();
        let angular = to_local * &column_world.rotation();
        let column = SpatialMotion::from_parts(linear, angular);
        jacobian.update_column(joint.v_offset, column.as_slice());
    }
    jacobian
}

/// Velocity of world point `p`, rigidly attached to the chain's tip, due to the chain's
/// current joint velocities.
fn twist_at_point(data: &Data, chain: &[ChainJoint], p: &Vector3D) -> SpatialMotion {
    let mut total = SpatialMotion::zero();
    for joint in chain {
        let qdot = joint_v_scalar(data, joint.joint_id);
        total += column_at_point(joint, p) * qdot;
    }
    total
}

/// The $\dot J \dot q$ term (spatial acceleration bias) of world point `p`, rigidly attached
/// to the chain's tip, given `root_position` as the world position of the chain's root.
///
/// This is the closed-form twist-transport recursion for a serial chain at zero joint
/// acceleration: angular velocity/acceleration accumulate one joint axis at a time, and
/// linear velocity/acceleration transport rigidly between successive joint origins.
fn spatial_acceleration_bias_world(
    data: &Data,
    chain: &[ChainJoint],
    root_position: Vector3D,
    p_tip: &Vector3D,
) -> SpatialMotion {
    let mut omega = Vector3D::zeros();
    let mut v = Vector3D::zeros();
    let mut omega_dot = Vector3D::zeros();
    let mut v_dot = Vector3D::zeros();
    let mut prev_pos = root_position;

    for joint in chain {
        let delta = joint.p_world - prev_pos;
        v_dot = v_dot + omega_dot.cross(&delta) + omega.cross(&omega.cross(&delta));
        v = v + omega.cross(&delta);

        let qdot = joint_v_scalar(data, joint.joint_id);
        omega_dot = omega_dot + qdot * omega.cross(&joint.ang_world);
        v_dot = v_dot + qdot * omega.cross(&joint.lin_world);
        omega = omega + qdot * joint.ang_world;
        v = v + qdot * joint.lin_world;

        prev_pos = joint.p_world;
    }

    let delta = *p_tip - prev_pos;
    v_dot = v_dot + omega_dot.cross(&delta) + omega.cross(&omega.cross(&delta));

    SpatialMotion::from_parts(v_dot, omega_dot)
}

fn jacobian_impl(
    model: &Model,
    data: &Data,
    root: &str,
    tip: &str,
    frame: ReferenceFrame,
) -> Result<Jacobian, RobotModelError> {
    let (root_se3, root_joint) = resolve_point(model, data, root)?;
    let (tip_se3, tip_joint) = resolve_point(model, data, tip)?;
    let chain_ids = chain_between(model, root_joint, tip_joint)?;
    let chain = chain_geometry(model, data, &chain_ids);
    let p_tip = tip_se3.translation();

    let to_local = match frame {
        ReferenceFrame::Root => root_se3.rotation().transpose(),
        ReferenceFrame::Tip => tip_se3.rotation().transpose(),
    };

    Ok(build_jacobian(&chain, &p_tip, model.nv, to_local))
}

fn spatial_acceleration_bias_impl(
    model: &Model,
    data: &Data,
    root: &str,
    tip: &str,
) -> Result<SpatialMotion, RobotModelError> {
    let (root_se3, root_joint) = resolve_point(model, data, root)?;
    let (tip_se3, tip_joint) = resolve_point(model, data, tip)?;
    let chain_ids = chain_between(model, root_joint, tip_joint)?;
    let chain = chain_geometry(model, data, &chain_ids);
    let p_tip = tip_se3.translation();

    let bias_world = spatial_acceleration_bias_world(data, &chain, root_se3.translation(), &p_tip);
    let to_local = root_se3.rotation().transpose();
    Ok(SpatialMotion::from_parts(
        to_local * &bias_world.translation(),
        to_local * &bias_world.rotation(),
    ))
}

fn rigid_body_state_impl(
    model: &Model,
    data: &Data,
    root: &str,
    tip: &str,
    timestamp: Timestamp,
) -> Result<RigidBodyStateSE3, RobotModelError> {
    let (root_se3, root_joint) = resolve_point(model, data, root)?;
    let (tip_se3, tip_joint) = resolve_point(model, data, tip)?;
    let chain_ids = chain_between(model, root_joint, tip_joint)?;
    let chain = chain_geometry(model, data, &chain_ids);
    let p_tip = tip_se3.translation();

    let relative = root_se3.inverse() * tip_se3;
    let twist_world = twist_at_point(data, &chain, &p_tip);
    let bias_world = spatial_acceleration_bias_world(data, &chain, root_se3.translation(), &p_tip);

    let to_local = root_se3.rotation().transpose();
    let twist_local = SpatialMotion::from_parts(
        to_local * &twist_world.translation(),
        to_local * &twist_world.rotation(),
    );
    let accel_local = SpatialMotion::from_parts(
        to_local * &bias_world.translation(),
        to_local * &bias_world.rotation(),
    );

    let mut state = RigidBodyStateSE3::from_pose(&relative, tip.to_string(), root.to_string(), timestamp);
    state.twist = twist_local;
    state.spatial_acceleration = accel_local;
    Ok(state)
}

fn selection_matrix_for(model: &Model, actuated_names: &[String]) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(actuated_names.len(), model.nv);
    for (row, name) in actuated_names.iter().enumerate() {
        if let Some(joint_id) = model.get_joint_id(name) {
            matrix[(row, model.joint_v_offset(joint_id))] = 1.0;
        }
    }
    matrix
}

/// Names of every joint carrying at least one degree of freedom, in Jacobian-column order.
fn dof_joint_names(model: &Model) -> Vec<String> {
    (1..model.njoints())
        .filter(|&joint_id| model.joint_models[joint_id].nv() > 0)
        .map(|joint_id| model.joint_names[joint_id].clone())
        .collect()
}

fn joint_limits_for(model: &Model, names: &[String]) -> Vec<JointLimits> {
    names
        .iter()
        .map(|name| {
            let joint_id = model
                .get_joint_id(name)
                .expect("a name returned by dof_joint_names always resolves");
            model.joint_models[joint_id].limits()
        })
        .collect()
}

fn latest_timestamp(joint_state: &NamedVector<JointState>) -> Timestamp {
    joint_state
        .values()
        .map(|state| state.timestamp)
        .max()
        .unwrap_or_else(Timestamp::never)
}

fn require_updated(timestamp: Timestamp) -> Result<(), RobotModelError> {
    if timestamp.is_never() {
        return Err(RobotModelError::InvalidInput(
            "robot model has not been updated yet".to_string(),
        ));
    }
    Ok(())
}

fn check_joint_state(actuated_names: &[String], joint_state: &NamedVector<JointState>) -> Result<(), RobotModelError> {
    if joint_state.len() != actuated_names.len() {
        return Err(RobotModelError::InvalidInput(format!(
            "expected {} actuated joints in joint state, got {}",
            actuated_names.len(),
            joint_state.len()
        )));
    }
    for name in actuated_names {
        let state = joint_state
            .get_by_name(name)
            .ok_or_else(|| RobotModelError::InvalidInput(format!("joint state is missing joint '{name}'")))?;
        if state.timestamp.is_never() {
            return Err(RobotModelError::InvalidInput(format!(
                "joint '{name}' has a null timestamp"
            )));
        }
        if !state.has_position() || !state.has_speed() {
            return Err(RobotModelError::InvalidInput(format!(
                "joint '{name}' is missing a position or a speed"
            )));
        }
    }
    Ok(())
}

fn lookup_joint_state(
    last: &NamedVector<JointState>,
    timestamp: Timestamp,
    names: &[String],
) -> Result<NamedVector<JointState>, RobotModelError> {
    require_updated(timestamp)?;
    let mut out = NamedVector::new();
    for name in names {
        let state = last
            .get_by_name(name)
            .ok_or_else(|| RobotModelError::InvalidInput(format!("unknown joint '{name}'")))?;
        out.push(name.clone(), *state)
            .map_err(|e| RobotModelError::InvalidInput(e.to_string()))?;
    }
    Ok(out)
}

/// Reads the position/velocity the floating-base synthetic joint at `axis` (0..=2 the
/// translation joints, 3..=5 the orientation joints) should take from a reference state.
///
/// The orientation axes use an XYZ Euler decomposition of the reference orientation, and
/// map the body twist's angular components directly onto the corresponding Euler rates.
/// This is only exact for small rotations away from the neutral orientation; it is the same
/// approximation every Euler-angle floating-base parametrization makes.
fn floating_base_axis_values(state: &RigidBodyStateSE3, axis: usize) -> (f64, f64) {
    match axis {
        0 => (state.translation[0], state.twist.translation()[0]),
        1 => (state.translation[1], state.twist.translation()[1]),
        2 => (state.translation[2], state.twist.translation()[2]),
        3 => {
            let (roll, _pitch, _yaw) = state.orientation.euler_angles();
            (roll, state.twist.rotation()[0])
        }
        4 => {
            let (_roll, pitch, _yaw) = state.orientation.euler_angles();
            (pitch, state.twist.rotation()[1])
        }
        5 => {
            let (_roll, _pitch, yaw) = state.orientation.euler_angles();
            (yaw, state.twist.rotation()[2])
        }
        _ => unreachable!("floating base has exactly six synthetic axes"),
    }
}

fn build_q_v(
    model: &Model,
    floating_base_ids: Option<&[usize; 6]>,
    floating_base_state: Option<&RigidBodyStateSE3>,
    joint_state: &NamedVector<JointState>,
) -> Result<(Configuration, Configuration), RobotModelError> {
    let mut q = Configuration::zeros(model.nq);
    let mut v = Configuration::zeros(model.nv);
    let mut q_offset = 0;
    let mut v_offset = 0;

    for joint_id in 1..model.njoints() {
        let joint_model = &model.joint_models[joint_id];
        let nq = joint_model.nq();
        let nv = joint_model.nv();

        if let Some(ids) = floating_base_ids
            && let Some(axis) = ids.iter().position(|&id| id == joint_id)
        {
            let state = floating_base_state.ok_or_else(|| {
                RobotModelError::InvalidInput(
                    "model has a floating base but no floating-base state was given".to_string(),
                )
            })?;
            let (q_value, v_value) = floating_base_axis_values(state, axis);
            q.update_rows(q_offset, &Configuration::from_row_slice(&[q_value]))
                .map_err(|e| RobotModelError::InvalidInput(e.to_string()))?;
            v.update_rows(v_offset, &Configuration::from_row_slice(&[v_value]))
                .map_err(|e| RobotModelError::InvalidInput(e.to_string()))?;
            q_offset += nq;
            v_offset += nv;
            continue;
        }

        if nv == 0 {
            continue;
        }

        let name = &model.joint_names[joint_id];
        let state = joint_state
            .get_by_name(name)
            .ok_or_else(|| RobotModelError::InvalidInput(format!("missing joint '{name}' in joint state")))?;

        let q_joint = if nq == 2 {
            Configuration::from_row_slice(&[state.position.cos(), state.position.sin()])
        } else {
            Configuration::from_row_slice(&[state.position])
        };
        q.update_rows(q_offset, &q_joint)
            .map_err(|e| RobotModelError::InvalidInput(e.to_string()))?;
        v.update_rows(v_offset, &Configuration::from_row_slice(&[state.speed]))
            .map_err(|e| RobotModelError::InvalidInput(e.to_string()))?;

        q_offset += nq;
        v_offset += nv;
    }

    Ok((q, v))
}

fn bias_forces_impl(model: &Model, q: &Configuration, v: &Configuration) -> Result<Configuration, RobotModelError> {
    let mut data = model.create_data();
    let zero_a = Configuration::zeros(model.nv);
    inverse_dynamics(model, &mut data, q, v, &zero_a).map_err(RobotModelError::Algorithm)?;
    Ok(data.tau)
}

/// Computes $H(q)$ from two RNEA calls per column: since RNEA is linear in acceleration,
/// `RNEA(q, 0, e_i) - RNEA(q, 0, 0)` isolates column `i` of the inertia matrix while
/// cancelling the shared gravity term. This sidesteps the articulated-body algorithm
/// entirely, at the cost of `nv + 1` linear passes instead of one.
fn joint_space_inertia_matrix_impl(model: &Model, q: &Configuration) -> Result<DMatrix<f64>, RobotModelError> {
    let nv = model.nv;
    let zero_v = Configuration::zeros(nv);
    let zero_a = Configuration::zeros(nv);

    let mut baseline = model.create_data();
    inverse_dynamics(model, &mut baseline, q, &zero_v, &zero_a).map_err(RobotModelError::Algorithm)?;
    let bias = baseline.tau;

    let mut h = DMatrix::zeros(nv, nv);
    for i in 0..nv {
        let mut unit_a = Configuration::zeros(nv);
        unit_a
            .update_rows(i, &Configuration::ones(1))
            .map_err(|e| RobotModelError::NumericFailure(e.to_string()))?;

        let mut column_data = model.create_data();
        inverse_dynamics(model, &mut column_data, q, &zero_v, &unit_a).map_err(RobotModelError::Algorithm)?;

        for row in 0..nv {
            h[(row, i)] = column_data.tau[row] - bias[row];
        }
    }
    Ok(h)
}

// ---------------------------------------------------------------------------------------
// KinematicsModel: fixed-base, kinematics-only variant
// ---------------------------------------------------------------------------------------

/// A [`RobotModel`] restricted to kinematics: positions, Jacobians and the spatial
/// acceleration bias, computed on an arbitrary serial chain of the model's kinematic tree.
/// It has no notion of a floating base, inertia, or actuation.
pub struct KinematicsModel {
    model: Model,
    data: Data,
    joint_names: Vec<String>,
    joint_limits: Vec<JointLimits>,
    last_joint_state: NamedVector<JointState>,
    timestamp: Timestamp,
}

impl KinematicsModel {
    /// Wraps an already-built [`Model`] for kinematics-only queries.
    #[must_use]
    pub fn new(model: Model) -> Self {
        let data = model.create_data();
        let joint_names = dof_joint_names(&model);
        let joint_limits = joint_limits_for(&model, &joint_names);
        KinematicsModel {
            model,
            data,
            joint_names,
            joint_limits,
            last_joint_state: NamedVector::new(),
            timestamp: Timestamp::never(),
        }
    }
}

impl RobotModel for KinematicsModel {
    fn update(
        &mut self,
        joint_state: &NamedVector<JointState>,
        floating_base_state: Option<&RigidBodyStateSE3>,
    ) -> Result<(), RobotModelError> {
        if floating_base_state.is_some() {
            return Err(RobotModelError::InvalidInput(
                "a kinematics-only robot model has no floating base".to_string(),
            ));
        }
        check_joint_state(&self.joint_names, joint_state)?;
        let (q, v) = build_q_v(&self.model, None, None, joint_state)?;
        forward_kinematics(&self.model, &mut self.data, &q, &Some(v), &None)?;
        update_frame_placements(&self.model, &mut self.data);

        self.last_joint_state = joint_state.clone();
        self.timestamp = latest_timestamp(joint_state);
        Ok(())
    }

    fn joint_state(&self, names: &[String]) -> Result<NamedVector<JointState>, RobotModelError> {
        lookup_joint_state(&self.last_joint_state, self.timestamp, names)
    }

    fn rigid_body_state(&mut self, root: &str, tip: &str) -> Result<RigidBodyStateSE3, RobotModelError> {
        require_updated(self.timestamp)?;
        rigid_body_state_impl(&self.model, &self.data, root, tip, self.timestamp)
    }

    fn space_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError> {
        require_updated(self.timestamp)?;
        jacobian_impl(&self.model, &self.data, root, tip, ReferenceFrame::Root)
    }

    fn body_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError> {
        require_updated(self.timestamp)?;
        jacobian_impl(&self.model, &self.data, root, tip, ReferenceFrame::Tip)
    }

    fn spatial_acceleration_bias(&mut self, root: &str, tip: &str) -> Result<SpatialMotion, RobotModelError> {
        require_updated(self.timestamp)?;
        spatial_acceleration_bias_impl(&self.model, &self.data, root, tip)
    }

    fn joint_limits(&self) -> &[JointLimits] {
        &self.joint_limits
    }

    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn actuated_joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn no_of_joints(&self) -> usize {
        self.model.nv
    }

    fn selection_matrix(&self) -> DMatrix<f64> {
        DMatrix::identity(self.joint_names.len(), self.model.nv)
    }

    fn has_link(&self, name: &str) -> bool {
        self.model.get_frame_id(name, None).is_some()
    }

    fn has_joint(&self, name: &str) -> bool {
        self.model.get_joint_id(name).is_some()
    }

    fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|n| n == name)
    }
}

// ---------------------------------------------------------------------------------------
// DynamicsModel: full-dynamics variant, optional floating base
// ---------------------------------------------------------------------------------------

/// A [`RobotModel`] backed by the complete rigid-body dynamics algorithms: inertial
/// quantities, and an optional 6-DoF floating base. Every query is restricted to a root
/// equal to this model's own base frame (the URDF root, or the floating-base joint when
/// one is attached) — this variant does not support arbitrary-root queries the way
/// [`KinematicsModel`] does.
pub struct DynamicsModel {
    model: Model,
    data: Data,
    joint_names: Vec<String>,
    actuated_names: Vec<String>,
    joint_limits: Vec<JointLimits>,
    floating_base_ids: Option<[usize; 6]>,
    last_joint_state: NamedVector<JointState>,
    last_q: Configuration,
    last_v: Configuration,
    timestamp: Timestamp,
}

impl DynamicsModel {
    /// Builds a full-dynamics model from an already-parsed [`Model`].
    ///
    /// `actuated_names` lists the joints driven externally through [`RobotModel::update`];
    /// when `floating_base` is set, six synthetic joints (three prismatic, three revolute)
    /// are prepended to the model's root so the URDF tree floats freely in the world.
    pub fn new(mut model: Model, actuated_names: Vec<String>, floating_base: bool) -> Result<Self, RobotModelError> {
        let floating_base_ids = if floating_base {
            Some(attach_floating_base(&mut model)?)
        } else {
            None
        };

        let data = model.create_data();
        let joint_names = dof_joint_names(&model);
        let joint_limits = joint_limits_for(&model, &joint_names);

        Ok(DynamicsModel {
            last_q: Configuration::zeros(model.nq),
            last_v: Configuration::zeros(model.nv),
            model,
            data,
            joint_names,
            actuated_names,
            joint_limits,
            floating_base_ids,
            last_joint_state: NamedVector::new(),
            timestamp: Timestamp::never(),
        })
    }

    fn base_joint(&self) -> usize {
        match self.floating_base_ids {
            Some(ids) => ids[5],
            None => WORLD_ID,
        }
    }

    fn check_root(&self, root: &str) -> Result<(), RobotModelError> {
        let joint_id = resolve_joint_id(&self.model, root)?;
        if joint_id != self.base_joint() {
            return Err(RobotModelError::InvalidInput(
                "a dynamics robot model only accepts queries rooted at its own base frame".to_string(),
            ));
        }
        Ok(())
    }
}

/// Prepends a floating base (three prismatic, three revolute synthetic joints) to `model`,
/// reparenting whatever was previously attached to the world joint onto the last of them.
fn attach_floating_base(model: &mut Model) -> Result<[usize; 6], RobotModelError> {
    let original_roots: Vec<usize> = (1..model.njoints())
        .filter(|&joint_id| model.joint_parents[joint_id] == WORLD_ID)
        .collect();

    let add = |model: &mut Model, parent: usize, joint: JointWrapper, name: &str| {
        model
            .add_joint(parent, joint, SE3::identity(), name.to_string())
            .map_err(|e| RobotModelError::Config(e.to_string()))
    };

    let tx = add(model, WORLD_ID, JointWrapper::prismatic(JointModelPrismatic::new_px()), "__floating_base_tx__")?;
    let ty = add(model, tx, JointWrapper::prismatic(JointModelPrismatic::new_py()), "__floating_base_ty__")?;
    let tz = add(model, ty, JointWrapper::prismatic(JointModelPrismatic::new_pz()), "__floating_base_tz__")?;
    let rx = add(model, tz, JointWrapper::revolute(JointModelRevolute::new_rx()), "__floating_base_rx__")?;
    let ry = add(model, rx, JointWrapper::revolute(JointModelRevolute::new_ry()), "__floating_base_ry__")?;
    let rz = add(model, ry, JointWrapper::revolute(JointModelRevolute::new_rz()), "__floating_base_rz__")?;

    for root in original_roots {
        model.joint_parents[root] = rz;
    }

    Ok([tx, ty, tz, rx, ry, rz])
}

impl RobotModel for DynamicsModel {
    fn update(
        &mut self,
        joint_state: &NamedVector<JointState>,
        floating_base_state: Option<&RigidBodyStateSE3>,
    ) -> Result<(), RobotModelError> {
        match (self.floating_base_ids, floating_base_state) {
            (Some(_), None) => {
                return Err(RobotModelError::InvalidInput(
                    "model has a floating base but no floating-base state was given".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(RobotModelError::InvalidInput(
                    "model has a fixed base; floating-base state must not be given".to_string(),
                ));
            }
            _ => {}
        }

        check_joint_state(&self.actuated_names, joint_state)?;
        let (q, v) = build_q_v(&self.model, self.floating_base_ids.as_ref(), floating_base_state, joint_state)?;
        forward_kinematics(&self.model, &mut self.data, &q, &Some(v), &None)?;
        update_frame_placements(&self.model, &mut self.data);

        self.last_joint_state = joint_state.clone();
        self.timestamp = match floating_base_state {
            Some(state) => latest_timestamp(joint_state).max(state.timestamp),
            None => latest_timestamp(joint_state),
        };
        self.last_q = q;
        self.last_v = v;
        Ok(())
    }

    fn joint_state(&self, names: &[String]) -> Result<NamedVector<JointState>, RobotModelError> {
        lookup_joint_state(&self.last_joint_state, self.timestamp, names)
    }

    fn rigid_body_state(&mut self, root: &str, tip: &str) -> Result<RigidBodyStateSE3, RobotModelError> {
        require_updated(self.timestamp)?;
        self.check_root(root)?;
        rigid_body_state_impl(&self.model, &self.data, root, tip, self.timestamp)
    }

    fn space_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError> {
        require_updated(self.timestamp)?;
        self.check_root(root)?;
        jacobian_impl(&self.model, &self.data, root, tip, ReferenceFrame::Root)
    }

    fn body_jacobian(&mut self, root: &str, tip: &str) -> Result<Jacobian, RobotModelError> {
        require_updated(self.timestamp)?;
        self.check_root(root)?;
        jacobian_impl(&self.model, &self.data, root, tip, ReferenceFrame::Tip)
    }

    fn spatial_acceleration_bias(&mut self, root: &str, tip: &str) -> Result<SpatialMotion, RobotModelError> {
        require_updated(self.timestamp)?;
        self.check_root(root)?;
        spatial_acceleration_bias_impl(&self.model, &self.data, root, tip)
    }

    fn joint_space_inertia_matrix(&mut self) -> Result<DMatrix<f64>, RobotModelError> {
        require_updated(self.timestamp)?;
        joint_space_inertia_matrix_impl(&self.model, &self.last_q)
    }

    fn bias_forces(&mut self) -> Result<Configuration, RobotModelError> {
        require_updated(self.timestamp)?;
        bias_forces_impl(&self.model, &self.last_q, &self.last_v)
    }

    fn joint_limits(&self) -> &[JointLimits] {
        &self.joint_limits
    }

    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn actuated_joint_names(&self) -> &[String] {
        &self.actuated_names
    }

    fn no_of_joints(&self) -> usize {
        self.model.nv
    }

    fn selection_matrix(&self) -> DMatrix<f64> {
        selection_matrix_for(&self.model, &self.actuated_names)
    }

    fn has_link(&self, name: &str) -> bool {
        self.model.get_frame_id(name, None).is_some()
    }

    fn has_joint(&self, name: &str) -> bool {
        self.model.get_joint_id(name).is_some()
    }

    fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|n| n == name)
    }

    fn center_of_mass(&mut self) -> Result<RigidBodyStateSE3, RobotModelError> {
        require_updated(self.timestamp)?;

        let mut total_mass = 0.0;
        let mut weighted = Vector3D::zeros();
        for joint_id in 0..self.model.njoints() {
            let inertia = &self.model.inertias[joint_id];
            if inertia.mass <= 0.0 {
                continue;
            }
            let world_com =
                self.data.joint_placements[joint_id].translation() + self.data.joint_placements[joint_id].rotation() * &inertia.com;
            weighted = weighted + world_com * inertia.mass;
            total_mass += inertia.mass;
        }

        if total_mass <= 0.0 {
            return Err(RobotModelError::NumericFailure(
                "model has zero total mass".to_string(),
            ));
        }

        let com = weighted * (1.0 / total_mass);
        let se3 = SE3::from_parts(com, SpatialRotation::identity());
        Ok(RigidBodyStateSE3::from_pose(&se3, "center_of_mass", "world", self.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wbc_inertia::inertia::Inertia;
    use wbc_spatial::symmetric3::Symmetric3;

    fn two_link_arm() -> Model {
        let mut model = Model::new("arm".to_string());
        let shoulder = model
            .add_joint(
                WORLD_ID,
                JointWrapper::revolute(JointModelRevolute::new_rz()),
                SE3::identity(),
                "shoulder".to_string(),
            )
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
                crate::frame::Frame::new(
                    "tip".to_string(),
                    elbow,
                    crate::model::WORLD_FRAME_ID,
                    SE3::from_parts(Vector3D::new(1.0, 0.0, 0.0), SpatialRotation::identity()),
                    crate::frame::FrameType::Operational,
                    Inertia::zeros(),
                ),
                false,
            )
            .unwrap();

        model
    }

    fn joint_state_at(model: &Model, positions: &[(&str, f64, f64)], t: Duration) -> NamedVector<JointState> {
        let _ = model;
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
    fn space_jacobian_matches_planar_two_link_geometry() {
        let model = two_link_arm();
        let mut robot = KinematicsModel::new(model);
        let state = joint_state_at(
            &robot.model,
            &[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)],
            Duration::from_secs(1),
        );
        robot.update(&state, None).unwrap();

        let jacobian = robot.space_jacobian("__WORLD__", "tip").unwrap();
        // at the zero configuration, both links point along +x, so both revolute
        // joints (about world z) contribute a linear velocity along +y per unit qdot
        assert!((jacobian.as_matrix()[(1, 0)] - 2.0).abs() < 1e-9);
        assert!((jacobian.as_matrix()[(1, 1)] - 1.0).abs() < 1e-9);
        assert!((jacobian.as_matrix()[(5, 0)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rigid_body_state_requires_a_prior_update() {
        let model = two_link_arm();
        let mut robot = KinematicsModel::new(model);
        assert!(robot.rigid_body_state("__WORLD__", "tip").is_err());
    }

    #[test]
    fn update_rejects_a_joint_state_with_a_null_timestamp() {
        let model = two_link_arm();
        let mut robot = KinematicsModel::new(model);
        let mut state = NamedVector::new();
        state.push("shoulder".to_string(), JointState::unspecified()).unwrap();
        state.push("elbow".to_string(), JointState::unspecified()).unwrap();
        assert!(robot.update(&state, None).is_err());
    }

    #[test]
    fn dynamics_model_rejects_queries_rooted_off_the_base() {
        let model = two_link_arm();
        let mut robot = DynamicsModel::new(model, vec!["shoulder".to_string(), "elbow".to_string()], false).unwrap();
        let state = joint_state_at(
            &robot.model,
            &[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)],
            Duration::from_secs(1),
        );
        robot.update(&state, None).unwrap();
        assert!(robot.space_jacobian("elbow", "tip").is_err());
        assert!(robot.space_jacobian("__WORLD__", "tip").is_ok());
    }

    #[test]
    fn joint_space_inertia_matrix_is_symmetric_positive_diagonal() {
        let model = two_link_arm();
        let mut robot = DynamicsModel::new(model, vec!["shoulder".to_string(), "elbow".to_string()], false).unwrap();
        let state = joint_state_at(
            &robot.model,
            &[("shoulder", 0.3, 0.0), ("elbow", -0.2, 0.0)],
            Duration::from_secs(1),
        );
        robot.update(&state, None).unwrap();

        let h = robot.joint_space_inertia_matrix().unwrap();
        assert!((h[(0, 1)] - h[(1, 0)]).abs() < 1e-9);
        assert!(h[(0, 0)] > 0.0);
        assert!(h[(1, 1)] > 0.0);
    }

    #[test]
    fn floating_base_translation_shifts_the_tip_pose() {
        let model = two_link_arm();
        let mut robot = DynamicsModel::new(model, vec!["shoulder".to_string(), "elbow".to_string()], true).unwrap();
        let state = joint_state_at(
            &robot.model,
            &[("shoulder", 0.0, 0.0), ("elbow", 0.0, 0.0)],
            Duration::from_secs(1),
        );
        let mut base = RigidBodyStateSE3::identity("base", "world");
        base.translation = Vector3D::new(0.0, 0.0, 1.0);
        base.timestamp = Timestamp::at(Duration::from_secs(1));

        robot.update(&state, Some(&base)).unwrap();
        let base_name = "__floating_base_rz__";
        let tip = robot.rigid_body_state(base_name, "tip").unwrap();
        assert!((tip.translation[0] - 2.0).abs() < 1e-9);
    }
}
