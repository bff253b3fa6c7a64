//! The robot model: kinematic tree, rigid-body dynamics algorithms, and the
//! [`robot_model::RobotModel`] capability surface consumed by scenes.

pub mod data;
pub mod errors;
pub mod forward_dynamics;
pub mod forward_kinematics;
pub mod frame;
pub mod integrate;
pub mod inverse_dynamics;
pub mod model;
pub mod neutral;
pub mod robot_model;
