//! Common imports for building a whole-body controller: a robot model, a set of tasks, an
//! HQP solver and the scene that wires them together.

// Model
pub use crate::model::data::Data;
pub use crate::model::model::Model;
pub use crate::model::robot_model::{DynamicsModel, KinematicsModel, RobotModel, RobotModelError};

// Algorithms
pub use crate::model::forward_dynamics::forward_dynamics;
pub use crate::model::forward_kinematics::{forward_kinematics, update_frame_placements};
pub use crate::model::inverse_dynamics::inverse_dynamics;
pub use crate::model::integrate::integrate;
pub use crate::model::neutral::neutral;

// Configurations
pub use crate::model::model::random_configuration;
pub use crate::spatial::configuration::Configuration;

// Parsing
pub use crate::parse::urdf::{parse_urdf_file, parse_urdf_str};

// Spatial
pub use crate::spatial::force::SpatialForce;
pub use crate::spatial::motion::SpatialMotion;
pub use crate::spatial::se3::SE3;

// Tasks
pub use crate::task::{Constraint, ConstraintConfig, ConstraintStatus, Reference, TaskError};

// Hierarchical QP
pub use crate::hqp::{HierarchicalQP, SubQp};

// Solvers
pub use crate::solve::{HierarchicalLeastSquaresSolver, HqpSolver, SolverError, WeightedQpSolver};

// Scenes
pub use crate::scene::{AccelerationScene, Scene, SceneError, VelocityScene};
