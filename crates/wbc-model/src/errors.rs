//! Errors for the robot-model dynamics algorithms (forward/inverse dynamics,
//! forward kinematics, integration).

use thiserror::Error;
use wbc_joint::joint_data::JointError;
use wbc_spatial::configuration::ConfigurationError;

/// Errors that can occur during dynamics computations.
#[derive(Debug, Error)]
pub enum AlgorithmError {
    /// An error related to the configuration of the system.
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    /// An error related to a specific joint, identified by its name.
    #[error("joint '{0}' error: {1}")]
    JointError(String, JointError),
    /// An error indicating that an argument has an incorrect size.
    #[error("incorrect size for argument '{name}': expected {expected}, got {got}")]
    IncorrectSize {
        name: String,
        expected: usize,
        got: usize,
    },
}
