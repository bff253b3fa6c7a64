//! Spatial representation and operations.

pub mod configuration;
pub mod force;
pub mod inertia;
pub mod jacobian;
pub mod joint_state;
pub mod motion;
pub mod named_vector;
pub mod rigid_body_state;
pub mod se3;
pub mod so3;
pub mod symmetric3;
pub mod timestamp;
pub mod vector3d;
pub mod vector6d;
