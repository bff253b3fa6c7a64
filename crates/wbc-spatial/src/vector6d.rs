//! Defines **6D vectors**, used to build diagonal spatial inertias from URDF inertial data.

use nalgebra::{Matrix6, Vector6};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// A 6D vector, typically holding a linear/angular diagonal pair.
pub struct Vector6D(pub(crate) Vector6<f64>);

impl Vector6D {
    #[must_use]
    pub fn new(linear: [f64; 3], angular: [f64; 3]) -> Self {
        Self(Vector6::new(
            linear[0], linear[1], linear[2], angular[0], angular[1], angular[2],
        ))
    }

    #[must_use]
    pub fn zeros() -> Self {
        Self(Vector6::zeros())
    }

    /// Builds a 6x6 diagonal matrix from this vector's components.
    #[must_use]
    pub fn as_diagonal(&self) -> Matrix6<f64> {
        Matrix6::from_diagonal(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_matrix_matches_entries() {
        let v = Vector6D::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        let diag = v.as_diagonal();
        assert_eq!(diag[(0, 0)], 1.0);
        assert_eq!(diag[(3, 3)], 4.0);
    }
}
