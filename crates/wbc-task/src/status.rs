//! Post-solve diagnostic snapshot of one constraint.

use std::time::Duration;

use nalgebra::DVector;
use wbc_spatial::timestamp::Timestamp;

use crate::constraint::Constraint;

/// A diagnostic snapshot of one constraint, taken after the solver has produced a solution.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintStatus {
    pub name: String,
    pub priority: u32,
    /// This cycle's reference, `A`'s right-hand side.
    pub y_ref: DVector<f64>,
    /// `A * solution`: what the solver actually achieved for this constraint.
    pub y_solution: DVector<f64>,
    pub activation: f64,
    pub weights: DVector<f64>,
    pub last_update: Timestamp,
    pub time_since_update: Option<Duration>,
}

impl ConstraintStatus {
    /// Builds a status snapshot from a constraint's current A/y/weights and the solver's
    /// output vector, `now` being the time to compute `time_since_update` against.
    #[must_use]
    pub fn from_constraint(constraint: &Constraint, solver_output: &DVector<f64>, now: Duration) -> Self {
        let y_solution = constraint.a() * solver_output;
        let last_update = constraint.last_reference_timestamp();
        Self {
            name: constraint.name().to_string(),
            priority: constraint.priority(),
            y_ref: constraint.y().clone(),
            y_solution,
            activation: constraint.activation(),
            weights: constraint.weights().clone(),
            last_update,
            time_since_update: last_update.age(now),
        }
    }
}
