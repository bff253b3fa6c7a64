//! Shared fixtures for the scenario tests: a planar two-link arm, reused the same way it is
//! built across the unit tests of `wbc-model`, `wbc-task` and `wbc-scene`.

use std::time::Duration;

use wbc_inertia::inertia::Inertia;
use wbc_joint::joint::JointWrapper;
use wbc_joint::revolute::JointModelRevolute;
use wbc_model::frame::{Frame, FrameType};
use wbc_model::model::{Model, WORLD_FRAME_ID, WORLD_ID};
use wbc_spatial::joint_state::JointState;
use wbc_spatial::motion::SpatialRotation;
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::se3::SE3;
use wbc_spatial::symmetric3::Symmetric3;
use wbc_spatial::timestamp::Timestamp;
use wbc_spatial::vector3d::Vector3D;

#[allow(dead_code)]
pub fn two_link_arm() -> Model {
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

#[allow(dead_code)]
pub fn joint_state_at(positions: &[(&str, f64, f64)], t: Duration) -> NamedVector<JointState> {
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
