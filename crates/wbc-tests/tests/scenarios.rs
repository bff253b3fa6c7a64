//! End-to-end control-loop scenarios exercising task priority, activation gating and joint
//! limits through the full model -> scene -> solver pipeline.

mod common;

use std::time::Duration;

use wbc_model::robot_model::{KinematicsModel, RobotModel};
use wbc_scene::{Scene, VelocityScene};
use wbc_solve::{HierarchicalLeastSquaresSolver, HqpSolver};
use wbc_spatial::motion::SpatialMotion;
use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
use wbc_spatial::timestamp::Timestamp;
use wbc_spatial::vector3d::Vector3D;
use wbc_task::{ConstraintConfig, RefFrame, Reference};

use common::{joint_state_at, two_link_arm};

/// A resolved-velocity control loop converges a single Cartesian task to a reachable target.
#[test]
fn closed_loop_cartesian_control_converges_to_the_target() {
    let mut robot = KinematicsModel::new(two_link_arm());

    // the target is a pose this exact arm can reach exactly: forward kinematics at a known
    // configuration, so the loop has a real fixed point to converge to.
    let mut seed_state = joint_state_at(&[("shoulder", 0.4, 0.0), ("elbow", -0.6, 0.0)], Duration::ZERO);
    robot.update(&seed_state, None).unwrap();
    let target = robot.rigid_body_state("__WORLD__", "tip").unwrap().translation;

    let mut cfg = ConstraintConfig::cartesian("tip_ctrl", 0, "__WORLD__", "tip", RefFrame::Root);
    cfg.weights = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

    seed_state = joint_state_at(&[("shoulder", 0.1, 0.0), ("elbow", 0.1, 0.0)], Duration::ZERO);
    robot.update(&seed_state, None).unwrap();

    let mut scene = VelocityScene::new();
    scene.configure(vec![cfg], &robot).unwrap();

    let mut solver = HierarchicalLeastSquaresSolver::default();
    solver.configure(&[6, 2], robot.no_of_joints()).unwrap();

    let dt = Duration::from_millis(100);
    let kp = 2.0;
    let mut q = [0.1_f64, 0.1_f64];
    let mut t = Duration::ZERO;

    for _ in 0..500 {
        let state = joint_state_at(&[("shoulder", q[0], 0.0), ("elbow", q[1], 0.0)], t);
        robot.update(&state, None).unwrap();

        let current = robot.rigid_body_state("__WORLD__", "tip").unwrap().translation;
        let error = Vector3D::new(target[0] - current[0], target[1] - current[1], target[2] - current[2]);

        let mut reference = RigidBodyStateSE3::identity("tip", "__WORLD__");
        reference.twist = SpatialMotion::from_parts(error * kp, Vector3D::zeros());
        reference.timestamp = Timestamp::at(t);
        scene.set_reference("tip_ctrl", Reference::Cartesian(reference)).unwrap();

        let hqp = scene.update(&mut robot, t).unwrap();
        let solution = solver.solve(&hqp).unwrap();
        let command = scene.command_from_solution(&robot, &solution, t);

        let dt_s = dt.as_secs_f64();
        q[0] += command.get_by_name("shoulder").unwrap().speed * dt_s;
        q[1] += command.get_by_name("elbow").unwrap().speed * dt_s;
        t += dt;
    }

    let state = joint_state_at(&[("shoulder", q[0], 0.0), ("elbow", q[1], 0.0)], t);
    robot.update(&state, None).unwrap();
    let final_pos = robot.rigid_body_state("__WORLD__", "tip").unwrap().translation;
    let error = ((final_pos[0] - target[0]).powi(2) + (final_pos[1] - target[1]).powi(2)).sqrt();
    assert!(error < 1e-3, "final position error {error} did not converge");
}

/// A priority-0 Cartesian task dominates a conflicting priority-1 task on the same tip.
#[test]
fn a_higher_priority_cartesian_task_dominates_a_conflicting_lower_priority_one() {
    let mut robot = KinematicsModel::new(two_link_arm());
    let state = joint_state_at(&[("shoulder", 0.3, 0.0), ("elbow", -0.2, 0.0)], Duration::ZERO);
    robot.update(&state, None).unwrap();

    let mut primary = ConstraintConfig::cartesian("primary", 0, "__WORLD__", "tip", RefFrame::Root);
    primary.weights = vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    let mut secondary = ConstraintConfig::cartesian("secondary", 1, "__WORLD__", "tip", RefFrame::Root);
    secondary.weights = vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

    let mut scene = VelocityScene::new();
    scene.configure(vec![primary, secondary], &robot).unwrap();

    let mut primary_ref = RigidBodyStateSE3::identity("tip", "__WORLD__");
    primary_ref.twist = SpatialMotion::from_parts(Vector3D::new(0.0, 1.0, 0.0), Vector3D::zeros());
    primary_ref.timestamp = Timestamp::at(Duration::ZERO);
    scene.set_reference("primary", Reference::Cartesian(primary_ref)).unwrap();

    let mut secondary_ref = RigidBodyStateSE3::identity("tip", "__WORLD__");
    secondary_ref.twist = SpatialMotion::from_parts(Vector3D::new(0.0, -1.0, 0.0), Vector3D::zeros());
    secondary_ref.timestamp = Timestamp::at(Duration::ZERO);
    scene.set_reference("secondary", Reference::Cartesian(secondary_ref)).unwrap();

    let hqp = scene.update(&mut robot, Duration::ZERO).unwrap();
    let mut solver = HierarchicalLeastSquaresSolver::default();
    solver.configure(&[6, 6, 2], robot.no_of_joints()).unwrap();
    let solution = solver.solve(&hqp).unwrap();

    let jacobian = robot.space_jacobian("__WORLD__", "tip").unwrap();
    let achieved_y: f64 = (0..robot.no_of_joints()).map(|j| jacobian.as_matrix()[(1, j)] * solution[j]).sum();
    assert!((achieved_y - 1.0).abs() < 1e-3, "expected the primary task's +1 m/s, got {achieved_y}");
}

/// A constraint forced to zero activation must not perturb the solution at all.
#[test]
fn a_zero_activation_constraint_leaves_the_solution_unperturbed() {
    let robot_state = |t| joint_state_at(&[("shoulder", 0.3, 0.0), ("elbow", -0.2, 0.0)], t);

    let mut robot_without = KinematicsModel::new(two_link_arm());
    robot_without.update(&robot_state(Duration::ZERO), None).unwrap();
    let mut scene_without = VelocityScene::new();
    scene_without.configure(Vec::new(), &robot_without).unwrap();
    let hqp_without = scene_without.update(&mut robot_without, Duration::ZERO).unwrap();

    let mut robot_with = KinematicsModel::new(two_link_arm());
    robot_with.update(&robot_state(Duration::ZERO), None).unwrap();
    let mut gated = ConstraintConfig::cartesian("gated", 0, "__WORLD__", "tip", RefFrame::Root);
    gated.activation = 0.0;
    let mut scene_with = VelocityScene::new();
    scene_with.configure(vec![gated], &robot_with).unwrap();

    let mut reference = RigidBodyStateSE3::identity("tip", "__WORLD__");
    reference.twist = SpatialMotion::from_parts(Vector3D::new(5.0, 5.0, 5.0), Vector3D::zeros());
    reference.timestamp = Timestamp::at(Duration::ZERO);
    scene_with.set_reference("gated", Reference::Cartesian(reference)).unwrap();
    let hqp_with = scene_with.update(&mut robot_with, Duration::ZERO).unwrap();

    let mut solver_without = HierarchicalLeastSquaresSolver::default();
    solver_without.configure(&[2], robot_without.no_of_joints()).unwrap();
    let solution_without = solver_without.solve(&hqp_without).unwrap();

    let mut solver_with = HierarchicalLeastSquaresSolver::default();
    solver_with.configure(&[6, 2], robot_with.no_of_joints()).unwrap();
    let solution_with = solver_with.solve(&hqp_with).unwrap();

    for i in 0..robot_without.no_of_joints() {
        assert!(
            (solution_without[i] - solution_with[i]).abs() < 1e-9,
            "zero-activation constraint perturbed joint {i}: {} vs {}",
            solution_without[i],
            solution_with[i]
        );
    }
}

/// A joint-velocity reference demanding more than the joint's velocity limit is clamped.
#[test]
fn a_joint_velocity_reference_beyond_the_limit_is_clamped() {
    use wbc_inertia::inertia::Inertia;
    use wbc_joint::joint::JointWrapper;
    use wbc_joint::revolute::JointModelRevolute;
    use wbc_model::model::{Model, WORLD_ID};
    use wbc_spatial::joint_state::JointState;
    use wbc_spatial::named_vector::NamedVector;
    use wbc_spatial::se3::SE3;
    use wbc_spatial::symmetric3::Symmetric3;

    let mut joint_model = JointModelRevolute::new_rz();
    joint_model.limits.velocity = 0.5;

    let mut model = Model::new("single_joint".to_string());
    let joint = model
        .add_joint(WORLD_ID, JointWrapper::revolute(joint_model), SE3::identity(), "joint".to_string())
        .unwrap();
    model.inertias[joint] = Inertia::new(1.0, Vector3D::new(0.5, 0.0, 0.0), Symmetric3::zeros());

    let mut robot = KinematicsModel::new(model);
    let state = joint_state_at(&[("joint", 0.0, 0.0)], Duration::ZERO);
    robot.update(&state, None).unwrap();

    let cfg = ConstraintConfig::joint("drive", 0, vec!["joint".to_string()]);
    let mut scene = VelocityScene::new();
    scene.configure(vec![cfg], &robot).unwrap();

    let mut reference = NamedVector::new();
    let mut js = JointState::unspecified();
    js.speed = 2.0;
    js.timestamp = Timestamp::at(Duration::ZERO);
    reference.push("joint".to_string(), js).unwrap();
    scene.set_reference("drive", Reference::Joint(reference)).unwrap();

    let hqp = scene.update(&mut robot, Duration::ZERO).unwrap();
    let mut solver = HierarchicalLeastSquaresSolver::default();
    solver.configure(&[1, 1], robot.no_of_joints()).unwrap();
    let solution = solver.solve(&hqp).unwrap();

    assert!((solution[0] - 0.5).abs() < 1e-6, "expected the solution clamped to the 0.5 rad/s limit, got {}", solution[0]);
}
