//! Structures and traits to represent joints in a robot model.

pub mod joint;
pub mod joint_data;
pub mod limits;

pub mod continuous;
pub mod fixed;
pub mod prismatic;
pub mod revolute;
