//! Whole-body-control scenes: turn a declarative set of tasks plus live robot-model state
//! into a [`wbc_hqp::HierarchicalQP`], and map a solver's output back onto joint commands.

mod bounds;
mod constraint_set;

pub mod acceleration_scene;
pub mod errors;
pub mod scene;
pub mod velocity_scene;

pub use acceleration_scene::AccelerationScene;
pub use errors::SceneError;
pub use scene::Scene;
pub use velocity_scene::VelocityScene;
