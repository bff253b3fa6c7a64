//! Errors raised while configuring or running a hierarchical QP solver.

use thiserror::Error;

/// Errors that can occur while configuring or solving a [`crate::traits::HqpSolver`].
#[derive(Debug, Error)]
pub enum SolverError {
    /// `configure` was called with an inconsistent problem size.
    #[error("solver configuration error: {0}")]
    Config(String),
    /// The solver could not produce a bounded solution: infeasible bounds, rank collapse
    /// beyond the configured damping, or an underlying QP backend failure.
    #[error("numeric failure: {0}")]
    NumericFailure(String),
}
