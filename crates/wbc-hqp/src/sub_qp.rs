//! A single priority level of a hierarchical QP.

use nalgebra::{DMatrix, DVector};

/// One priority level of a [`crate::hqp::HierarchicalQP`].
///
/// `A x ≈ y` is the weighted least-squares objective this level minimizes (for the
/// hierarchical least-squares solver) or the equality/residual block it contributes to the
/// stacked cost (for the QP-based solver); `lower_bound`/`upper_bound` are box constraints on
/// the decision vector `x` itself, not on `A x`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubQp {
    /// Task matrix, `rows x n_variables`.
    pub a: DMatrix<f64>,
    /// Task reference, length `rows`.
    pub y: DVector<f64>,
    /// Per-row weight, length `rows`. A zero weight drops the row from the objective.
    pub weights: DVector<f64>,
    /// Lower bound on the decision vector, length `n_variables`.
    pub lower_bound: DVector<f64>,
    /// Upper bound on the decision vector, length `n_variables`.
    pub upper_bound: DVector<f64>,
}

impl SubQp {
    /// Builds a sub-QP with no box constraints (`-inf`/`+inf` bounds on every variable).
    pub fn unbounded(a: DMatrix<f64>, y: DVector<f64>, weights: DVector<f64>, n_variables: usize) -> Self {
        Self {
            a,
            y,
            weights,
            lower_bound: DVector::from_element(n_variables, f64::NEG_INFINITY),
            upper_bound: DVector::from_element(n_variables, f64::INFINITY),
        }
    }

    /// Number of task rows at this priority level.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.a.nrows()
    }

    /// Number of decision variables this level is expressed over.
    #[must_use]
    pub fn n_variables(&self) -> usize {
        self.a.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_has_infinite_box_constraints() {
        let sub = SubQp::unbounded(DMatrix::identity(2, 3), DVector::zeros(2), DVector::repeat(2, 1.0), 3);
        assert_eq!(sub.lower_bound[0], f64::NEG_INFINITY);
        assert_eq!(sub.upper_bound[2], f64::INFINITY);
        assert_eq!(sub.rows(), 2);
        assert_eq!(sub.n_variables(), 3);
    }
}
