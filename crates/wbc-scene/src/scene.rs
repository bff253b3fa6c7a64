//! The scene interface: orchestrates constraints against a robot model to produce a
//! [`HierarchicalQP`], and maps a solver's raw output back onto named joint commands and
//! diagnostics (spec §4.3).

use std::time::Duration;

use nalgebra::DVector;
use wbc_hqp::HierarchicalQP;
use wbc_model::robot_model::RobotModel;
use wbc_spatial::joint_state::JointState;
use wbc_spatial::named_vector::NamedVector;
use wbc_task::{ConstraintConfig, ConstraintStatus, Reference};

use crate::errors::SceneError;

/// A whole-body-control scene: the per-cycle translation between a robot model + a set of
/// declarative task references, and a [`HierarchicalQP`] a solver can consume.
pub trait Scene {
    /// Validates `configs` (unique names, frames/joints resolvable against `model`) and
    /// builds the runtime constraints, grouped by priority.
    fn configure(&mut self, configs: Vec<ConstraintConfig>, model: &dyn RobotModel) -> Result<(), SceneError>;

    /// Dispatches `reference` to the named constraint. Fails on an unknown name or a
    /// reference kind mismatched to that constraint's declared task type.
    fn set_reference(&mut self, name: &str, reference: Reference) -> Result<(), SceneError>;

    /// Per-joint weight used by the lowest-priority regularization block, in
    /// `model.joint_names()` order.
    fn set_joint_weights(&mut self, weights: DVector<f64>) -> Result<(), SceneError>;

    fn joint_weights(&self) -> &DVector<f64>;

    /// Rebuilds every constraint's `(A, y)` from the current model state and references, and
    /// packs them into a [`HierarchicalQP`] in ascending priority order, with joint box-bounds
    /// and the joint-weight regularization block attached.
    fn update(&mut self, model: &mut dyn RobotModel, now: Duration) -> Result<HierarchicalQP, SceneError>;

    /// Maps a solver's raw decision vector back onto named joint commands, stamped at `now`.
    fn command_from_solution(&self, model: &dyn RobotModel, solution: &DVector<f64>, now: Duration) -> NamedVector<JointState>;

    /// Post-solve diagnostic snapshot of every constraint.
    fn constraints_status(&self, solution: &DVector<f64>, now: Duration) -> NamedVector<ConstraintStatus> {
        let mut out = NamedVector::new();
        for status in self.raw_constraints_status(solution, now) {
            let name = status.name.clone();
            let _ = out.push(name, status);
        }
        out
    }

    #[doc(hidden)]
    fn raw_constraints_status(&self, solution: &DVector<f64>, now: Duration) -> Vec<ConstraintStatus>;
}
