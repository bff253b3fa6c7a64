//! Hierarchical least-squares solver: the kinematic (unconstrained-except-for-bounds) HQP
//! solver, solving each priority level by a damped pseudo-inverse and propagating a
//! null-space projector to the next level (spec §4.4).

use nalgebra::{DMatrix, DVector};
use wbc_hqp::HierarchicalQP;

use crate::errors::SolverError;
use crate::traits::HqpSolver;

/// Conservative default damping factor for the SVD-damped pseudo-inverse. Zero would give
/// the exact pseudo-inverse; this value keeps the solution bounded near singularities at the
/// cost of a small residual at every priority level.
pub const DEFAULT_DAMPING: f64 = 1e-8;

/// Singular values below this threshold are treated as zero rather than inverted.
pub const DEFAULT_SV_THRESHOLD: f64 = 1e-9;

/// Solves a [`HierarchicalQP`] level by level, in ascending (i.e. highest-priority-first)
/// order: at each level, the residual is minimized in the null space left free by every
/// higher-priority level, so a lower-priority task can never perturb a higher-priority one
/// beyond the chosen damping.
///
/// Box bounds (joint limits, joint-velocity limits) are enforced as a final clamp of the
/// accumulated solution against the intersection of every level's bounds — a deliberate
/// simplification over a full active-set QP given this solver's primary purpose is fast,
/// well-conditioned resolution of a kinematic task hierarchy, with [`crate::weighted_qp`]
/// available when hard inequality feasibility matters more than raw speed.
pub struct HierarchicalLeastSquaresSolver {
    n_joints: usize,
    damping: f64,
    sv_threshold: f64,
}

impl Default for HierarchicalLeastSquaresSolver {
    fn default() -> Self {
        Self {
            n_joints: 0,
            damping: DEFAULT_DAMPING,
            sv_threshold: DEFAULT_SV_THRESHOLD,
        }
    }
}

impl HierarchicalLeastSquaresSolver {
    #[must_use]
    pub fn new(damping: f64, sv_threshold: f64) -> Self {
        Self {
            n_joints: 0,
            damping,
            sv_threshold,
        }
    }
}

/// Computes a damped Moore-Penrose pseudo-inverse via SVD: `V diag(s / (s^2 + damping^2)) U^T`.
/// Singular values at or below `sv_threshold` are dropped entirely rather than inverted, to
/// avoid amplifying noise in directions the data does not actually constrain.
fn damped_pseudo_inverse(a: &DMatrix<f64>, damping: f64, sv_threshold: f64) -> DMatrix<f64> {
    let svd = a.clone().svd(true, true);
    let u = svd.u.expect("svd requested with compute_u = true");
    let v_t = svd.v_t.expect("svd requested with compute_v = true");
    let singular_values = svd.singular_values;

    let mut s_inv = DVector::zeros(singular_values.len());
    for i in 0..singular_values.len() {
        let s = singular_values[i];
        if s > sv_threshold {
            s_inv[i] = s / (s * s + damping * damping);
        }
    }

    let rank = singular_values.len();
    let u_reduced = u.columns(0, rank);
    let v_reduced = v_t.rows(0, rank).transpose();
    v_reduced * DMatrix::from_diagonal(&s_inv) * u_reduced.transpose()
}

impl HqpSolver for HierarchicalLeastSquaresSolver {
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
        let mut x = DVector::zeros(n);
        let mut null_space = DMatrix::identity(n, n);
        let mut lower_bound = DVector::from_element(n, f64::NEG_INFINITY);
        let mut upper_bound = DVector::from_element(n, f64::INFINITY);

        for level in hqp.levels() {
            for i in 0..n {
                lower_bound[i] = lower_bound[i].max(level.lower_bound[i]);
                upper_bound[i] = upper_bound[i].min(level.upper_bound[i]);
            }

            if level.rows() == 0 {
                continue;
            }

            let weighted_a: DMatrix<f64> = DMatrix::from_fn(level.rows(), n, |i, j| level.weights[i] * level.a[(i, j)]);
            let residual = &level.y - &level.a * &x;
            let weighted_residual: DVector<f64> = DVector::from_fn(level.rows(), |i, _| level.weights[i] * residual[i]);

            let a_proj = &weighted_a * &null_space;
            let pinv = damped_pseudo_inverse(&a_proj, self.damping, self.sv_threshold);

            let z = &pinv * &weighted_residual;
            x += &null_space * &z;
            null_space -= &null_space * &pinv * &a_proj;
        }

        for i in 0..n {
            if lower_bound[i] > upper_bound[i] {
                return Err(SolverError::NumericFailure(format!(
                    "joint {i} has infeasible bounds [{}, {}]",
                    lower_bound[i], upper_bound[i]
                )));
            }
            x[i] = x[i].clamp(lower_bound[i], upper_bound[i]);
        }

        Ok(x)
    }
}
