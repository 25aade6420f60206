use analogy_graph::{AnalogyMapping, Fingerprint, HypothesisOrigin, ValidatedHypothesis};
use analogy_ontology::OntologyVerdict;
use im::Vector;
use serde::{Deserialize, Serialize};

/// One pass through align, gate and validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Zero-based loop iteration
    pub iteration: usize,
    /// Mapping the aligner produced
    pub mapping: AnalogyMapping,
    /// Ontology gate result for the mapping
    pub verdict: OntologyVerdict,
    /// Verdict the loop decided on
    pub hypothesis: ValidatedHypothesis,
    /// Feedback the aligner was given for this attempt
    pub feedback_in: Option<String>,
}

/// Persistent list of attempts
///
/// [`RefinementHistory::record`] returns a new history sharing structure
/// with the old one; earlier histories are never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementHistory {
    attempts: Vector<Attempt>,
}

impl RefinementHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History extended with `attempt`
    #[must_use]
    pub fn record(&self, attempt: Attempt) -> Self {
        let mut attempts = self.attempts.clone();
        attempts.push_back(attempt);
        Self { attempts }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter()
    }

    /// Most recent attempt; the loop settles on this one when the budget runs out
    #[must_use]
    pub fn latest(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Highest-confidence attempt, earliest on ties
    #[must_use]
    pub fn best_by_confidence(&self) -> Option<&Attempt> {
        self.attempts.iter().fold(None, |best: Option<&Attempt>, a| match best {
            Some(b) if b.hypothesis.confidence >= a.hypothesis.confidence => Some(b),
            _ => Some(a),
        })
    }

    /// Earlier attempt with the same pair set that was actually judged
    ///
    /// Attempts rejected because the validator call failed do not count:
    /// their mapping was never evaluated.
    #[must_use]
    pub fn judged_with(&self, fingerprint: &Fingerprint) -> Option<&Attempt> {
        self.attempts.iter().find(|a| {
            a.hypothesis.origin != HypothesisOrigin::ValidatorFailure
                && a.mapping.fingerprint() == *fingerprint
        })
    }
}
