//! The hierarchical QP itself: an ordered list of per-priority sub-QPs.

use crate::sub_qp::SubQp;

/// A hierarchical QP: an ordered list of [`SubQp`] levels, lowest numeric priority (highest
/// importance) first, all sharing the same number of decision variables.
///
/// This is plain data — produced by scene assembly, consumed by a solver — so that solver and
/// scene can be tested independently of one another.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HierarchicalQP {
    levels: Vec<SubQp>,
    n_variables: usize,
}

impl HierarchicalQP {
    /// An empty HQP over `n_variables` decision variables.
    #[must_use]
    pub fn new(n_variables: usize) -> Self {
        Self {
            levels: Vec::new(),
            n_variables,
        }
    }

    /// Appends a priority level. Panics if `sub.n_variables()` does not match the HQP's
    /// variable count — this is an internal assembly bug, not a caller-facing error.
    pub fn push(&mut self, sub: SubQp) {
        assert_eq!(
            sub.n_variables(),
            self.n_variables,
            "sub-QP has {} variables, expected {}",
            sub.n_variables(),
            self.n_variables
        );
        self.levels.push(sub);
    }

    #[must_use]
    pub fn levels(&self) -> &[SubQp] {
        &self.levels
    }

    #[must_use]
    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    #[must_use]
    pub fn n_priorities(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
