//! Errors raised while configuring or running a scene.

use thiserror::Error;
use wbc_model::robot_model::RobotModelError;
use wbc_task::TaskError;

/// Errors that can occur while configuring or running a [`crate::scene::Scene`].
#[derive(Debug, Error)]
pub enum SceneError {
    /// `configure` was rejected: duplicate constraint names, or a priority/dimension
    /// inconsistency not already caught by [`wbc_task::ConstraintConfig::validate`].
    #[error("scene configuration error: {0}")]
    Config(String),
    /// A caller addressed a constraint or joint that does not exist.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A constraint's configuration or reference handling failed.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// The robot model failed to answer a kinematics/dynamics query the scene needed.
    #[error(transparent)]
    Model(#[from] RobotModelError),
}
