//! A single-QP hierarchical solver: every priority level's residual is folded into one
//! convex cost with a geometric per-level weight cascade, and box bounds become hard
//! inequality constraints, instead of the level-by-level null-space cascade in
//! [`crate::hls`]. Backed by [`clarabel`], a pure-Rust interior-point QP/conic solver (spec
//! §4.4's "QP-based solver" alternative).

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use nalgebra::{DMatrix, DVector};
use wbc_hqp::HierarchicalQP;

use crate::errors::SolverError;
use crate::traits::HqpSolver;

/// Weight ratio applied between two adjacent priority levels. Chosen large enough that a
/// lower priority cannot perturb a higher one beyond numerical noise, while staying small
/// enough that the resulting QP's cost matrix keeps a sane condition number.
pub const DEFAULT_PRIORITY_RATIO: f64 = 1.0e4;

/// Hierarchical solver that stacks every priority level into one QP, weighting each level's
/// contribution to the cost by `DEFAULT_PRIORITY_RATIO^(n_priorities - level_index - 1)` so
/// strict lexicographic dominance is approximated rather than solved exactly.
pub struct WeightedQpSolver {
    n_joints: usize,
    priority_ratio: f64,
}

impl Default for WeightedQpSolver {
    fn default() -> Self {
        Self {
            n_joints: 0,
            priority_ratio: DEFAULT_PRIORITY_RATIO,
        }
    }
}

impl WeightedQpSolver {
    #[must_use]
    pub fn new(priority_ratio: f64) -> Self {
        Self {
            n_joints: 0,
            priority_ratio,
        }
    }
}

/// Converts a dense, symmetric, upper-triangular-relevant matrix into the CSC form clarabel
/// expects, keeping only entries on or above the diagonal as clarabel requires for `P`.
fn dense_to_upper_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let n = m.nrows();
    let mut col_ptr = vec![0usize];
    let mut row_val = Vec::new();
    let mut nz_val = Vec::new();

    for j in 0..n {
        for i in 0..=j {
            let v = m[(i, j)];
            if v != 0.0 {
                row_val.push(i);
                nz_val.push(v);
            }
        }
        col_ptr.push(row_val.len());
    }

    CscMatrix::new(n, n, col_ptr, row_val, nz_val)
}

/// Converts a dense, generally rectangular matrix into CSC form for clarabel's `A`.
fn dense_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (rows, cols) = m.shape();
    let mut col_ptr = vec![0usize];
    let mut row_val = Vec::new();
    let mut nz_val = Vec::new();

    for j in 0..cols {
        for i in 0..rows {
            let v = m[(i, j)];
            if v != 0.0 {
                row_val.push(i);
                nz_val.push(v);
            }
        }
        col_ptr.push(row_val.len());
    }

    CscMatrix::new(rows, cols, col_ptr, row_val, nz_val)
}

impl HqpSolver for WeightedQpSolver {
    fn configure(&mut self, _constraints_per_prio: &[usize], n_joints: usize) -> Result<(), SolverError> {
        if n_joints == 0 {
            return Err(SolverError::Config("a solver needs at least one joint".to_string()));
        }
        self.n_joints = n_joints;
        Ok(())
    }

    #[tracing::instrument(skip(self, hqp))]
    fn solve(&mut self, hqp: &HierarchicalQP) -> Result<DVector<f64>, SolverError> {
        if hqp.n_variables() != self.n_joints {
            return Err(SolverError::Config(format!(
                "HQP has {} variables, solver was configured for {}",
                hqp.n_variables(),
                self.n_joints
            )));
        }

        let n = self.n_joints;
        let n_levels = hqp.levels().len();

        let mut p = DMatrix::<f64>::zeros(n, n);
        let mut q = DVector::<f64>::zeros(n);
        let mut lower_bound = DVector::from_element(n, f64::NEG_INFINITY);
        let mut upper_bound = DVector::from_element(n, f64::INFINITY);

        for (level_index, level) in hqp.levels().iter().enumerate() {
            for i in 0..n {
                lower_bound[i] = lower_bound[i].max(level.lower_bound[i]);
                upper_bound[i] = upper_bound[i].min(level.upper_bound[i]);
            }

            if level.rows() == 0 {
                continue;
            }

            let factor = self.priority_ratio.powi((n_levels - level_index - 1) as i32);
            for i in 0..level.rows() {
                let w = factor * level.weights[i] * level.weights[i];
                let a_row = level.a.row(i);
                for r in 0..n {
                    q[r] -= 2.0 * w * level.y[i] * a_row[r];
                    for c in 0..n {
                        p[(r, c)] += 2.0 * w * a_row[r] * a_row[c];
                    }
                }
            }
        }

        for i in 0..n {
            if lower_bound[i] > upper_bound[i] {
                return Err(SolverError::NumericFailure(format!(
                    "joint {i} has infeasible bounds [{}, {}]",
                    lower_bound[i], upper_bound[i]
                )));
            }
        }

        let has_lower = lower_bound.iter().any(|v| v.is_finite());
        let has_upper = upper_bound.iter().any(|v| v.is_finite());

        let mut a_rows = Vec::new();
        let mut b = Vec::new();
        let mut cones = Vec::new();

        if has_upper {
            let mut block = DMatrix::<f64>::zeros(n, n);
            for i in 0..n {
                block[(i, i)] = 1.0;
                b.push(if upper_bound[i].is_finite() { upper_bound[i] } else { 1e12 });
            }
            a_rows.push(block);
            cones.push(SupportedConeT::NonnegativeConeT(n));
        }
        if has_lower {
            let mut block = DMatrix::<f64>::zeros(n, n);
            for i in 0..n {
                block[(i, i)] = -1.0;
                b.push(if lower_bound[i].is_finite() { -lower_bound[i] } else { 1e12 });
            }
            a_rows.push(block);
            cones.push(SupportedConeT::NonnegativeConeT(n));
        }

        let a_total_rows: usize = a_rows.iter().map(DMatrix::nrows).sum();
        let mut a_stacked = DMatrix::<f64>::zeros(a_total_rows.max(1), n);
        let mut offset = 0;
        for block in &a_rows {
            a_stacked.view_mut((offset, 0), (block.nrows(), n)).copy_from(block);
            offset += block.nrows();
        }
        if a_total_rows == 0 {
            b.push(0.0);
            cones.push(SupportedConeT::ZeroConeT(1));
        }

        let p_csc = dense_to_upper_csc(&p);
        let a_csc = dense_to_csc(&a_stacked);
        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .build()
            .map_err(|e| SolverError::Config(format!("clarabel settings: {e:?}")))?;

        let mut solver = DefaultSolver::new(&p_csc, q.as_slice(), &a_csc, &b, &cones, settings);
        solver.solve();

        match solver.solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                Ok(DVector::from_row_slice(&solver.solution.x))
            }
            status => Err(SolverError::NumericFailure(format!("clarabel returned status {status:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbc_hqp::SubQp;

    #[test]
    fn single_priority_identity_task_recovers_the_reference() {
        let mut solver = WeightedQpSolver::default();
        solver.configure(&[2], 2).unwrap();

        let mut hqp = HierarchicalQP::new(2);
        hqp.push(SubQp::unbounded(
            DMatrix::identity(2, 2),
            DVector::from_row_slice(&[1.0, -2.0]),
            DVector::repeat(2, 1.0),
            2,
        ));

        let x = solver.solve(&hqp).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-4);
        assert!((x[1] + 2.0).abs() < 1e-4);
    }

    #[test]
    fn box_bounds_are_respected() {
        let mut solver = WeightedQpSolver::default();
        solver.configure(&[1], 1).unwrap();

        let mut hqp = HierarchicalQP::new(1);
        let mut sub = SubQp::unbounded(DMatrix::identity(1, 1), DVector::from_row_slice(&[10.0]), DVector::repeat(1, 1.0), 1);
        sub.upper_bound[0] = 2.0;
        hqp.push(sub);

        let x = solver.solve(&hqp).unwrap();
        assert!(x[0] <= 2.0 + 1e-6);
    }

    #[test]
    fn infeasible_bounds_are_reported_as_a_numeric_failure() {
        let mut solver = WeightedQpSolver::default();
        solver.configure(&[1], 1).unwrap();

        let mut hqp = HierarchicalQP::new(1);
        let mut sub = SubQp::unbounded(DMatrix::identity(1, 1), DVector::from_row_slice(&[0.0]), DVector::repeat(1, 1.0), 1);
        sub.lower_bound[0] = 1.0;
        sub.upper_bound[0] = -1.0;
        hqp.push(sub);

        assert!(solver.solve(&hqp).is_err());
    }
}
