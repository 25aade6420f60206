//! Capability interfaces consumed by the pipeline orchestrator
//!
//! One trait per stage. The capability set is fixed, so each trait is a
//! separate seam rather than a shared "agent" base: the orchestrator holds
//! one `Arc<dyn ...>` per stage and tests substitute any of them.

use crate::error::{
    AlignmentError, ExtractionError, SuggestionError, SynthesisError, ValidationError,
};
use analogy_graph::{
    AcceptancePredicate, AnalogyMapping, GraphRole, LogicalPropertyGraph, ReportSources,
    ResearchReport, ValidatedHypothesis, ValidationStatus,
};

/// Text to typed property graph
#[async_trait::async_trait]
pub trait GraphExtractor: Send + Sync {
    /// Extract a non-empty graph from `text`
    async fn extract(
        &self,
        text: &str,
        role: GraphRole,
    ) -> Result<LogicalPropertyGraph, ExtractionError>;
}

/// Inputs of one alignment call
#[derive(Debug, Clone, Copy)]
pub struct AlignmentRequest<'a> {
    /// Source graph
    pub graph_a: &'a LogicalPropertyGraph,
    /// Target graph
    pub graph_b: &'a LogicalPropertyGraph,
    /// Mapping being refined, if any
    pub previous_mapping: Option<&'a AnalogyMapping>,
    /// Directive naming the pairs to revise
    pub feedback: Option<&'a str>,
}

impl<'a> AlignmentRequest<'a> {
    /// First-pass request
    #[inline]
    #[must_use]
    pub fn initial(graph_a: &'a LogicalPropertyGraph, graph_b: &'a LogicalPropertyGraph) -> Self {
        Self {
            graph_a,
            graph_b,
            previous_mapping: None,
            feedback: None,
        }
    }

    /// Refinement request carrying the rejected mapping and its feedback
    #[inline]
    #[must_use]
    pub fn refine(mut self, previous: &'a AnalogyMapping, feedback: &'a str) -> Self {
        self.previous_mapping = Some(previous);
        self.feedback = Some(feedback);
        self
    }

    /// Whether this call refines an earlier mapping
    #[inline]
    #[must_use]
    pub fn is_refinement(&self) -> bool {
        self.previous_mapping.is_some()
    }
}

/// Graph pair to node-to-node mapping
///
/// Implementations must return mappings whose ids all resolve in the
/// request's graphs.
#[async_trait::async_trait]
pub trait Aligner: Send + Sync {
    /// Produce a fresh mapping
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError>;
}

/// Mapping to scored hypothesis
///
/// A low-confidence verdict is a normal result; `Err` is reserved for
/// transport or reasoning failures.
#[async_trait::async_trait]
pub trait HypothesisValidator: Send + Sync {
    /// Judge the mapping's consistency and confidence
    async fn validate(
        &self,
        mapping: &AnalogyMapping,
    ) -> Result<ValidatedHypothesis, ValidationError>;
}

/// Inputs of the synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Hypothesis the refinement loop settled on
    pub hypothesis: ValidatedHypothesis,
    /// Accepted, or degraded after the budget ran out
    pub status: ValidationStatus,
    /// Predicate the loop applied
    pub predicate: AcceptancePredicate,
    /// Texts and graphs of the run
    pub sources: ReportSources,
    /// Refinement iterations used
    pub refinements: usize,
}

impl SynthesisRequest {
    /// Verify that the orchestrator honoured the synthesis contract
    ///
    /// An `Accepted` status requires the predicate to hold; a `Degraded`
    /// status is always allowed because the loop exhausted its budget.
    ///
    /// # Errors
    /// Returns `SynthesisError::PreconditionViolated` otherwise
    pub fn check_precondition(&self) -> Result<(), SynthesisError> {
        match self.status {
            ValidationStatus::Degraded { .. } => Ok(()),
            ValidationStatus::Accepted if self.predicate.is_met(&self.hypothesis) => Ok(()),
            ValidationStatus::Accepted => Err(SynthesisError::PreconditionViolated {
                consistent: self.hypothesis.consistent,
                confidence: self.hypothesis.confidence,
                threshold: self.predicate.threshold(),
            }),
        }
    }

    /// Wrap a synthesized report with this request's status and refinement count
    #[must_use]
    pub fn finish(&self, report: ResearchReport) -> ResearchReport {
        report.apply_validation_status(self.status.clone(), self.refinements)
    }
}

/// Settled hypothesis to research report
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produce the run's report
    async fn synthesize(&self, request: SynthesisRequest) -> Result<ResearchReport, SynthesisError>;
}

/// Target problem to a far-removed source domain description
#[async_trait::async_trait]
pub trait DomainSuggester: Send + Sync {
    /// Suggest a source domain sharing the problem's logical structure
    async fn suggest(&self, problem: &str) -> Result<String, SuggestionError>;
}
