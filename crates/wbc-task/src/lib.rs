//! Declarative task configuration and the runtime constraints it realizes each control cycle.

pub mod config;
pub mod constraint;
pub mod errors;
pub mod reference;
pub mod status;

pub use config::{ConstraintConfig, RefFrame, TaskType};
pub use constraint::{Constraint, DerivativeMode};
pub use errors::TaskError;
pub use reference::Reference;
pub use status::ConstraintStatus;
