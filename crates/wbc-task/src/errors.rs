//! Errors raised while configuring or updating runtime constraints.

use thiserror::Error;
use wbc_model::robot_model::RobotModelError;

/// Errors that can occur while configuring or running a [`crate::constraint::Constraint`].
#[derive(Debug, Error)]
pub enum TaskError {
    /// The declarative [`crate::config::ConstraintConfig`] is internally inconsistent or
    /// references something the robot model does not have.
    #[error("constraint configuration error: {0}")]
    Config(String),
    /// A caller supplied a reference or name that does not fit this constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A reference of the wrong kind was supplied for this constraint (e.g. a Cartesian
    /// reference for a joint-space task).
    #[error("constraint '{constraint}' expects a {expected} reference")]
    WrongReferenceKind {
        constraint: String,
        expected: &'static str,
    },
    /// The robot model failed to answer a kinematics/dynamics query this constraint needed.
    #[error(transparent)]
    Model(#[from] RobotModelError),
}
