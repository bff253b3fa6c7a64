//! The solver-facing interface a scene uses to turn a [`HierarchicalQP`] into a joint-space
//! command vector.

use nalgebra::DVector;
use wbc_hqp::HierarchicalQP;

use crate::errors::SolverError;

/// A solver for hierarchical QPs under strict lexicographic priority.
///
/// Implementations do not interpret the semantics of the decision vector; the scene that
/// assembled the [`HierarchicalQP`] is responsible for mapping it back onto joint commands.
pub trait HqpSolver {
    /// Allocates every buffer this solver will reuse across cycles. `constraints_per_prio[i]`
    /// is the number of task rows at priority level `i`, in the same order `solve` will later
    /// receive them in.
    fn configure(&mut self, constraints_per_prio: &[usize], n_joints: usize) -> Result<(), SolverError>;

    /// Solves `hqp` in lexicographic priority order, returning one dense vector in joint
    /// ordering. Fails with [`SolverError::NumericFailure`] on a singular or infeasible
    /// problem.
    fn solve(&mut self, hqp: &HierarchicalQP) -> Result<DVector<f64>, SolverError>;
}
