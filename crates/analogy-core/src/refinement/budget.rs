use serde::{Deserialize, Serialize};

/// Bounded refinement counter that only ever decreases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudget {
    max: usize,
    remaining: usize,
}

impl RetryBudget {
    #[inline]
    #[must_use]
    pub fn new(max_refinements: usize) -> Self {
        Self {
            max: max_refinements,
            remaining: max_refinements,
        }
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Refinements spent so far
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.max - self.remaining
    }

    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Spend one refinement; false when nothing is left
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_budget_is_exhausted() {
        let mut budget = RetryBudget::new(0);
        assert!(budget.is_exhausted());
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 0);
    }

    proptest! {
        #[test]
        fn prop_consumption_is_bounded(max in 0usize..16, attempts in 0usize..40) {
            let mut budget = RetryBudget::new(max);
            let mut granted = 0;
            for _ in 0..attempts {
                let before = budget.remaining();
                if budget.try_consume() {
                    granted += 1;
                    prop_assert_eq!(budget.remaining(), before - 1);
                } else {
                    prop_assert_eq!(budget.remaining(), 0);
                }
            }
            prop_assert_eq!(granted, attempts.min(max));
            prop_assert_eq!(budget.used(), granted);
        }
    }
}
