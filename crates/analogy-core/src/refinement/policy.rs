use super::budget::RetryBudget;
use analogy_graph::{AcceptancePredicate, ValidatedHypothesis};

/// Outcome of evaluating one hypothesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Predicate met; synthesize normally
    Accept,
    /// Predicate not met, budget left; align again with feedback
    Refine,
    /// Predicate not met, budget spent; synthesize a degraded report
    Exhausted { reason: String },
}

/// Pure acceptance and termination policy of the refinement loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefinementPolicy {
    predicate: AcceptancePredicate,
}

impl RefinementPolicy {
    #[inline]
    #[must_use]
    pub fn new(predicate: AcceptancePredicate) -> Self {
        Self { predicate }
    }

    #[inline]
    #[must_use]
    pub fn predicate(&self) -> AcceptancePredicate {
        self.predicate
    }

    #[must_use]
    pub fn decide(&self, hypothesis: &ValidatedHypothesis, budget: &RetryBudget) -> Decision {
        if self.predicate.is_met(hypothesis) {
            Decision::Accept
        } else if budget.is_exhausted() {
            Decision::Exhausted {
                reason: self.rejection_reason(hypothesis),
            }
        } else {
            Decision::Refine
        }
    }

    /// Why the predicate failed, for reports and logs
    #[must_use]
    pub fn rejection_reason(&self, hypothesis: &ValidatedHypothesis) -> String {
        let threshold = self.predicate.threshold();
        match (hypothesis.consistent, hypothesis.confidence >= threshold) {
            (false, _) => format!(
                "mapping judged inconsistent (confidence {:.2})",
                hypothesis.confidence
            ),
            (true, false) => format!(
                "confidence {:.2} below threshold {threshold:.2}",
                hypothesis.confidence
            ),
            (true, true) => String::new(),
        }
    }

    /// Directive handed to the aligner on the next iteration
    #[must_use]
    pub fn feedback_for(&self, hypothesis: &ValidatedHypothesis) -> String {
        let feedback = hypothesis.feedback_text();
        if feedback.trim().is_empty() {
            format!(
                "The previous mapping was rejected: {}. Revise the weakest pairs.",
                self.rejection_reason(hypothesis)
            )
        } else {
            feedback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_graph::AnalogyMapping;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn hypothesis(consistent: bool, confidence: f64) -> ValidatedHypothesis {
        ValidatedHypothesis::new(AnalogyMapping::new(vec![]), consistent, confidence)
    }

    #[test]
    fn accept_refine_exhaust() {
        let policy = RefinementPolicy::default();
        let budget = RetryBudget::new(1);
        let spent = RetryBudget::new(0);

        assert_eq!(policy.decide(&hypothesis(true, 0.8), &spent), Decision::Accept);
        assert_eq!(policy.decide(&hypothesis(true, 0.79), &budget), Decision::Refine);
        assert_eq!(
            policy.decide(&hypothesis(true, 0.5), &spent),
            Decision::Exhausted {
                reason: "confidence 0.50 below threshold 0.80".into()
            }
        );
        assert!(matches!(
            policy.decide(&hypothesis(false, 0.99), &spent),
            Decision::Exhausted { .. }
        ));
    }

    #[test]
    fn feedback_falls_back_to_reason() {
        let policy = RefinementPolicy::default();
        let silent = hypothesis(true, 0.4);
        assert!(policy.feedback_for(&silent).contains("below threshold"));

        let explicit = hypothesis(false, 0.4).with_feedback("swap a1 and a2");
        assert_eq!(policy.feedback_for(&explicit), "swap a1 and a2");
    }

    proptest! {
        #[test]
        fn prop_accept_iff_predicate(consistent in any::<bool>(), confidence in 0.0f64..=1.0, remaining in 0usize..3) {
            let policy = RefinementPolicy::default();
            let h = hypothesis(consistent, confidence);
            let decision = policy.decide(&h, &RetryBudget::new(remaining));
            let met = consistent && confidence >= 0.8;
            prop_assert_eq!(decision == Decision::Accept, met);
            if !met {
                prop_assert_eq!(matches!(decision, Decision::Refine), remaining > 0);
            }
        }
    }
}
