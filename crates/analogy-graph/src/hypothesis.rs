//! Validated hypotheses and the acceptance predicate

use crate::clamp_unit;
use crate::error::GraphError;
use crate::mapping::AnalogyMapping;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Confidence a consistent hypothesis needs to skip refinement
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.8;

/// Unique hypothesis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HypothesisId(pub Ulid);

impl HypothesisId {
    /// Generate new hypothesis ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for HypothesisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisOrigin {
    /// The validator judged the mapping
    Critic,
    /// The ontology gate rejected the mapping; no validator call was made
    OntologyGate,
    /// The validator call failed and the failure was absorbed
    ValidatorFailure,
    /// The aligner repeated an already rejected mapping
    RepeatedMapping,
}

/// An analogy mapping plus its verification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedHypothesis {
    /// Identifier
    pub id: HypothesisId,
    /// The mapping under validation
    pub mapping: AnalogyMapping,
    /// Whether the analogy is logically consistent
    pub consistent: bool,
    /// Validation confidence in `[0.0, 1.0]`
    pub confidence: f64,
    /// Free-text feedback handed back to the aligner
    #[serde(default)]
    pub feedback: String,
    /// Individual problems found
    #[serde(default)]
    pub issues: Vec<String>,
    /// Producer of this hypothesis
    pub origin: HypothesisOrigin,
}

impl ValidatedHypothesis {
    /// Create a validator verdict; confidence is clamped to `[0, 1]`
    #[must_use]
    pub fn new(mapping: AnalogyMapping, consistent: bool, confidence: f64) -> Self {
        Self {
            id: HypothesisId::new(),
            mapping,
            consistent,
            confidence: clamp_unit(confidence),
            feedback: String::new(),
            issues: Vec::new(),
            origin: HypothesisOrigin::Critic,
        }
    }

    /// Synthetic rejection: `consistent = false`, `confidence = 0.0`,
    /// feedback built from the issues
    #[must_use]
    pub fn rejected(mapping: AnalogyMapping, origin: HypothesisOrigin, issues: Vec<String>) -> Self {
        let feedback = issues.join("\n");
        Self {
            id: HypothesisId::new(),
            mapping,
            consistent: false,
            confidence: 0.0,
            feedback,
            issues,
            origin,
        }
    }

    /// With feedback text
    #[inline]
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = feedback.into();
        self
    }

    /// With issue list
    #[inline]
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues = issues;
        self
    }

    /// Feedback for the aligner: explicit feedback, else the issue list
    #[must_use]
    pub fn feedback_text(&self) -> String {
        if self.feedback.trim().is_empty() {
            self.issues.join("\n")
        } else {
            self.feedback.clone()
        }
    }
}

/// `consistent && confidence >= threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePredicate {
    threshold: f64,
}

impl AcceptancePredicate {
    /// Create predicate with a custom threshold
    ///
    /// # Errors
    /// Returns `GraphError::InvalidThreshold` outside `[0.0, 1.0]` or for NaN
    pub fn new(threshold: f64) -> Result<Self, GraphError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GraphError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether the hypothesis may proceed to synthesis undegraded
    #[inline]
    #[must_use]
    pub fn is_met(&self, hypothesis: &ValidatedHypothesis) -> bool {
        hypothesis.consistent && hypothesis.confidence >= self.threshold
    }
}

impl Default for AcceptancePredicate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejected_is_zero_confidence() {
        let h = ValidatedHypothesis::rejected(
            AnalogyMapping::new(vec![]),
            HypothesisOrigin::OntologyGate,
            vec!["first".into(), "second".into()],
        );
        assert!(!h.consistent);
        assert_eq!(h.confidence, 0.0);
        assert_eq!(h.feedback, "first\nsecond");
        assert_eq!(h.origin, HypothesisOrigin::OntologyGate);
    }

    #[test]
    fn feedback_text_falls_back_to_issues() {
        let h = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), false, 0.4)
            .with_issues(vec!["weak link".into()]);
        assert_eq!(h.feedback_text(), "weak link");

        let h = h.with_feedback("revise pair a2");
        assert_eq!(h.feedback_text(), "revise pair a2");
    }

    #[test]
    fn predicate_threshold_validation() {
        assert!(AcceptancePredicate::new(0.0).is_ok());
        assert!(AcceptancePredicate::new(1.0).is_ok());
        assert!(AcceptancePredicate::new(1.01).is_err());
        assert!(AcceptancePredicate::new(f64::NAN).is_err());
        assert_eq!(AcceptancePredicate::default().threshold(), 0.8);
    }

    #[test]
    fn predicate_boundary_is_inclusive() {
        let p = AcceptancePredicate::default();
        let at = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), true, 0.8);
        let below = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), true, 0.79);
        let inconsistent = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), false, 0.99);
        assert!(p.is_met(&at));
        assert!(!p.is_met(&below));
        assert!(!p.is_met(&inconsistent));
    }

    proptest! {
        #[test]
        fn prop_accepted_implies_threshold(consistent in any::<bool>(), confidence in -1.0f64..2.0) {
            let p = AcceptancePredicate::default();
            let h = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), consistent, confidence);
            prop_assert!((0.0..=1.0).contains(&h.confidence));
            if p.is_met(&h) {
                prop_assert!(h.consistent);
                prop_assert!(h.confidence >= DEFAULT_ACCEPTANCE_THRESHOLD);
            }
        }
    }
}
