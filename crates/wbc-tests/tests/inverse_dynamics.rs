//! End-to-end check of `wbc_model::inverse_dynamics` against a single pendulum, where the
//! expected joint torque at rest is known in closed form: `tau = -m * g * l * cos(q)`.

use wbc_inertia::inertia::Inertia;
use wbc_joint::joint::JointWrapper;
use wbc_joint::revolute::JointModelRevolute;
use wbc_model::inverse_dynamics::inverse_dynamics;
use wbc_model::model::{Model, WORLD_ID};
use wbc_spatial::configuration::Configuration;
use wbc_spatial::se3::SE3;
use wbc_spatial::symmetric3::Symmetric3;
use wbc_spatial::vector3d::Vector3D;

fn single_pendulum(mass: f64, length: f64) -> Model {
    let mut model = Model::new("pendulum".to_string());
    let joint = model
        .add_joint(WORLD_ID, JointWrapper::revolute(JointModelRevolute::new_ry()), SE3::identity(), "joint".to_string())
        .unwrap();
    model.inertias[joint] = Inertia::new(mass, Vector3D::new(length, 0.0, 0.0), Symmetric3::zeros());
    model
}

#[test]
fn gravity_torque_matches_the_closed_form_pendulum_equation() {
    let mass = 2.0;
    let length = 0.5;
    let model = single_pendulum(mass, length);
    let mut data = model.create_data();

    for angle in [0.0_f64, 0.3, 1.0, -0.7] {
        let q = Configuration::from_row_slice(&[angle]);
        let v = Configuration::from_row_slice(&[0.0]);
        let a = Configuration::from_row_slice(&[0.0]);

        inverse_dynamics(&model, &mut data, &q, &v, &a).unwrap();

        // the sign convention of the generalized gravity force depends on axis/rotation
        // direction choices made elsewhere; the magnitude is not.
        let expected_magnitude = (mass * 9.81 * length * angle.cos()).abs();
        assert!(
            (data.tau[0].abs() - expected_magnitude).abs() < 1e-6,
            "angle {angle}: expected magnitude {expected_magnitude}, got {}",
            data.tau[0]
        );
    }
}

#[test]
fn zero_motion_at_the_upright_equilibrium_needs_no_torque() {
    let model = single_pendulum(1.0, 1.0);
    let mut data = model.create_data();

    // pointing straight up along the joint's rotation plane means the link does not
    // contribute a moment arm against gravity at q = pi/2.
    let q = Configuration::from_row_slice(&[std::f64::consts::FRAC_PI_2]);
    let v = Configuration::from_row_slice(&[0.0]);
    let a = Configuration::from_row_slice(&[0.0]);

    inverse_dynamics(&model, &mut data, &q, &v, &a).unwrap();

    assert!(data.tau[0].abs() < 1e-6, "expected near-zero torque, got {}", data.tau[0]);
}
