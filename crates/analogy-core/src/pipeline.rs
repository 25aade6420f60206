//! Pipeline orchestrator
//!
//! Sequences extraction, alignment, the ontology gate, validation and
//! synthesis, and owns the bounded refinement loop.
//!
//! # Failure policy
//! - extraction, alignment and synthesis failures abort the run (`FAILED`)
//! - validation failures become rejected hypotheses and drive refinement
//! - an ontology-rejected or repeated mapping is never sent to the validator
//!
//! A run holds no shared mutable state; dropping the returned future at any
//! point abandons the run without side effects.

use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError};
use crate::refinement::{Attempt, Decision, RefinementHistory, RefinementPolicy, RetryBudget};
use crate::state::{PipelineState, Stage};
use crate::trace::{RunTrace, StageInvocations};
use analogy_agents::{
    AgentSet, AlignmentError, AlignmentRequest, Aligner, ExtractionError, GraphExtractor,
    HypothesisValidator, SynthesisError, SynthesisRequest, Synthesizer, ValidationError,
};
use analogy_graph::{
    AcceptancePredicate, AnalogyMapping, GraphRole, HypothesisOrigin, LogicalPropertyGraph,
    ReportSources, ResearchReport, ValidatedHypothesis, ValidationStatus,
};
use analogy_ontology::OntologyChecker;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use ulid::Ulid;

/// Unique run identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four capabilities a run consumes
#[derive(Clone)]
pub struct Capabilities {
    pub extractor: Arc<dyn GraphExtractor>,
    pub aligner: Arc<dyn Aligner>,
    pub validator: Arc<dyn HypothesisValidator>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl Capabilities {
    #[must_use]
    pub fn new(
        extractor: Arc<dyn GraphExtractor>,
        aligner: Arc<dyn Aligner>,
        validator: Arc<dyn HypothesisValidator>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            extractor,
            aligner,
            validator,
            synthesizer,
        }
    }

    /// Scout, Matcher, Critic and Architect
    #[must_use]
    pub fn from_agents(agents: &AgentSet) -> Self {
        Self {
            extractor: agents.scout.clone(),
            aligner: agents.matcher.clone(),
            validator: agents.critic.clone(),
            synthesizer: agents.architect.clone(),
        }
    }
}

/// Run-independent orchestrator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub acceptance: AcceptancePredicate,
    pub stage_timeout: Duration,
    pub concurrent_extraction: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            acceptance: AcceptancePredicate::default(),
            stage_timeout: Duration::from_secs(120),
            concurrent_extraction: true,
        }
    }
}

impl PipelineOptions {
    #[inline]
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_acceptance(mut self, acceptance: AcceptancePredicate) -> Self {
        self.acceptance = acceptance;
        self
    }

    #[inline]
    #[must_use]
    pub fn sequential_extraction(mut self) -> Self {
        self.concurrent_extraction = false;
        self
    }
}

impl TryFrom<&PipelineConfig> for PipelineOptions {
    type Error = ConfigError;

    fn try_from(config: &PipelineConfig) -> Result<Self, Self::Error> {
        if config.stage_timeout_secs == 0 {
            return Err(ConfigError::Invalid("stage_timeout_secs must be positive".into()));
        }
        Ok(Self {
            acceptance: config.acceptance()?,
            stage_timeout: config.stage_timeout(),
            concurrent_extraction: config.concurrent_extraction,
        })
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: RunId,
    pub report: ResearchReport,
    pub history: RefinementHistory,
    pub trace: RunTrace,
    pub invocations: StageInvocations,
}

/// Mutable bookkeeping of one run
struct RunState {
    trace: RunTrace,
    invocations: StageInvocations,
}

impl RunState {
    fn advance(&mut self, to: PipelineState) -> Result<(), PipelineError> {
        match self.trace.advance(to) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Record the failure and hand the error back
    fn fail(&mut self, err: PipelineError) -> PipelineError {
        warn!(stage = %err.stage(), error = %err, from = %self.trace.current(), "run failed");
        self.trace.fail();
        err
    }
}

/// The analogy pipeline orchestrator
pub struct Pipeline {
    capabilities: Capabilities,
    options: PipelineOptions,
    policy: RefinementPolicy,
    checker: OntologyChecker,
}

impl Pipeline {
    #[must_use]
    pub fn new(capabilities: Capabilities, options: PipelineOptions) -> Self {
        Self {
            capabilities,
            policy: RefinementPolicy::new(options.acceptance),
            options,
            checker: OntologyChecker::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the pipeline and return the report
    ///
    /// # Errors
    /// Returns `PipelineError` if extraction, alignment or synthesis fails
    pub async fn run(
        &self,
        source_text: &str,
        target_text: &str,
        max_refinements: usize,
    ) -> Result<ResearchReport, PipelineError> {
        self.run_traced(source_text, target_text, max_refinements)
            .await
            .map(|run| run.report)
    }

    /// Run the pipeline and return the report with its audit trail
    ///
    /// # Errors
    /// Returns `PipelineError` if extraction, alignment or synthesis fails
    #[instrument(skip_all, fields(run_id = tracing::field::Empty, max_refinements))]
    pub async fn run_traced(
        &self,
        source_text: &str,
        target_text: &str,
        max_refinements: usize,
    ) -> Result<PipelineRun, PipelineError> {
        let run_id = RunId::new();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let mut state = RunState {
            trace: RunTrace::new(),
            invocations: StageInvocations::default(),
        };

        for (role, text) in [(GraphRole::Source, source_text), (GraphRole::Target, target_text)] {
            if text.trim().is_empty() {
                return Err(state.fail(PipelineError::InvalidInput(format!("{role} text is empty"))));
            }
        }

        info!(state = %PipelineState::Extracting, "run started");
        state.invocations.record(Stage::Extraction);
        state.invocations.record(Stage::Extraction);
        let (graph_a, graph_b) = match self.extract_both(source_text, target_text).await {
            Ok(graphs) => graphs,
            Err(e) => return Err(state.fail(e.into())),
        };
        state.advance(PipelineState::Aligning)?;
        info!(source_nodes = graph_a.len(), target_nodes = graph_b.len(), "graphs extracted");

        let (history, settled, status) = self
            .refine(&graph_a, &graph_b, max_refinements, &mut state)
            .await?;

        state.advance(PipelineState::Synthesizing)?;
        let refinements = state.trace.refinements();
        let request = SynthesisRequest {
            hypothesis: settled,
            status: status.clone(),
            predicate: self.options.acceptance,
            sources: ReportSources {
                source_text: source_text.to_string(),
                target_text: target_text.to_string(),
                graph_a,
                graph_b,
            },
            refinements,
        };
        state.invocations.record(Stage::Synthesis);
        let report = match self
            .timed(
                self.capabilities.synthesizer.synthesize(request),
                |secs| SynthesisError::Timeout { secs },
            )
            .await
        {
            Ok(report) => report.apply_validation_status(status, refinements),
            Err(e) => return Err(state.fail(e.into())),
        };

        state.advance(PipelineState::Done)?;
        info!(
            %run_id,
            degraded = report.is_degraded(),
            refinements,
            calls = state.invocations.total(),
            "run finished"
        );

        Ok(PipelineRun {
            run_id,
            report,
            history,
            trace: state.trace,
            invocations: state.invocations,
        })
    }

    async fn extract_both(
        &self,
        source_text: &str,
        target_text: &str,
    ) -> Result<(LogicalPropertyGraph, LogicalPropertyGraph), ExtractionError> {
        if self.options.concurrent_extraction {
            let (a, b) = tokio::join!(
                self.extract(source_text, GraphRole::Source),
                self.extract(target_text, GraphRole::Target)
            );
            Ok((a?, b?))
        } else {
            let a = self.extract(source_text, GraphRole::Source).await?;
            Ok((a, self.extract(target_text, GraphRole::Target).await?))
        }
    }

    async fn extract(&self, text: &str, role: GraphRole) -> Result<LogicalPropertyGraph, ExtractionError> {
        self.timed(self.capabilities.extractor.extract(text, role), |secs| {
            ExtractionError::Timeout { role, secs }
        })
        .await
    }

    /// The refinement loop: align, gate, validate, decide
    ///
    /// Returns the attempt history, the settled hypothesis and its status.
    /// Terminates after at most `max_refinements + 1` alignments.
    async fn refine(
        &self,
        graph_a: &LogicalPropertyGraph,
        graph_b: &LogicalPropertyGraph,
        max_refinements: usize,
        state: &mut RunState,
    ) -> Result<(RefinementHistory, ValidatedHypothesis, ValidationStatus), PipelineError> {
        let mut budget = RetryBudget::new(max_refinements);
        let mut history = RefinementHistory::new();
        let mut previous: Option<(AnalogyMapping, String)> = None;

        loop {
            let iteration = history.len();
            let mut request = AlignmentRequest::initial(graph_a, graph_b);
            if let Some((mapping, feedback)) = &previous {
                request = request.refine(mapping, feedback);
            }

            state.invocations.record(Stage::Alignment);
            let mapping = match self
                .timed(self.capabilities.aligner.align(request), |secs| {
                    AlignmentError::Timeout { secs }
                })
                .await
            {
                Ok(mapping) => mapping,
                Err(e) => return Err(state.fail(e.into())),
            };

            // Gate the mapping exactly as aligned; unknown ids are mismatches
            state.advance(PipelineState::OntologyCheck)?;
            let verdict = self.checker.check(&mapping, graph_a, graph_b);
            let mapping = if verdict.consistent {
                mapping.resolve_against(graph_a, graph_b).0
            } else {
                mapping
            };

            state.advance(PipelineState::Validating)?;
            let hypothesis = if !verdict.consistent {
                info!(iteration, mismatches = verdict.mismatches.len(), "ontology gate rejected mapping");
                ValidatedHypothesis::rejected(mapping.clone(), HypothesisOrigin::OntologyGate, verdict.issues())
                    .with_feedback(verdict.feedback())
            } else if let Some(earlier) = history.judged_with(&mapping.fingerprint()) {
                info!(iteration, earlier = earlier.iteration, "aligner repeated a rejected mapping");
                Self::repeated(mapping.clone(), earlier)
            } else {
                state.invocations.record(Stage::Validation);
                match self
                    .timed(self.capabilities.validator.validate(&mapping), |secs| {
                        ValidationError::Timeout { secs }
                    })
                    .await
                {
                    Ok(hypothesis) => hypothesis,
                    Err(e) => {
                        warn!(iteration, error = %e, "validation failed; treating mapping as rejected");
                        ValidatedHypothesis::rejected(
                            mapping.clone(),
                            HypothesisOrigin::ValidatorFailure,
                            vec![format!("Validation could not be completed: {e}")],
                        )
                    }
                }
            };

            info!(
                iteration,
                consistent = hypothesis.consistent,
                confidence = hypothesis.confidence,
                origin = ?hypothesis.origin,
                "hypothesis evaluated"
            );

            history = history.record(Attempt {
                iteration,
                mapping: mapping.clone(),
                verdict,
                hypothesis: hypothesis.clone(),
                feedback_in: previous.as_ref().map(|(_, feedback)| feedback.clone()),
            });

            match self.policy.decide(&hypothesis, &budget) {
                Decision::Accept => {
                    state.advance(PipelineState::Accepted)?;
                    return Ok((history, hypothesis, ValidationStatus::Accepted));
                }
                Decision::Exhausted { reason } => {
                    state.advance(PipelineState::Accepted)?;
                    warn!(attempts = history.len(), %reason, "refinement budget exhausted; proceeding degraded");
                    let status = ValidationStatus::Degraded {
                        attempts: history.len(),
                        reason,
                    };
                    return Ok((history, hypothesis, status));
                }
                Decision::Refine => {
                    let consumed = budget.try_consume();
                    debug_assert!(consumed, "policy refined with an exhausted budget");
                    metrics::counter!("analogy_refinements_total").increment(1);
                    state.advance(PipelineState::Refining)?;
                    let feedback = self.policy.feedback_for(&hypothesis);
                    previous = Some((mapping, feedback));
                    state.advance(PipelineState::Aligning)?;
                }
            }
        }
    }

    fn repeated(mapping: AnalogyMapping, earlier: &Attempt) -> ValidatedHypothesis {
        let issue = format!(
            "The mapping repeats attempt {} which was already rejected; propose different pairs.",
            earlier.iteration
        );
        let earlier_feedback = earlier.hypothesis.feedback_text();
        let feedback = if earlier_feedback.trim().is_empty() {
            issue.clone()
        } else {
            format!("{issue}\nEarlier feedback:\n{earlier_feedback}")
        };
        ValidatedHypothesis::rejected(mapping, HypothesisOrigin::RepeatedMapping, vec![issue])
            .with_feedback(feedback)
    }

    async fn timed<T, E>(
        &self,
        call: impl Future<Output = Result<T, E>>,
        on_timeout: impl FnOnce(u64) -> E,
    ) -> Result<T, E> {
        match tokio::time::timeout(self.options.stage_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(self.options.stage_timeout.as_secs())),
        }
    }
}

/// Run the pipeline once with default options
///
/// # Errors
/// Returns `PipelineError` if extraction, alignment or synthesis fails
pub async fn run_pipeline(
    capabilities: Capabilities,
    source_text: &str,
    target_text: &str,
    max_refinements: usize,
) -> Result<ResearchReport, PipelineError> {
    Pipeline::new(capabilities, PipelineOptions::default())
        .run(source_text, target_text, max_refinements)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_advance_marks_run_failed() {
        let mut state = RunState {
            trace: RunTrace::new(),
            invocations: StageInvocations::default(),
        };
        state.advance(PipelineState::Aligning).unwrap();

        let err = state.advance(PipelineState::Done).unwrap_err();
        assert_eq!(
            err,
            PipelineError::IllegalTransition {
                from: PipelineState::Aligning,
                to: PipelineState::Done,
            }
        );
        assert_eq!(state.trace.current(), PipelineState::Failed);
        assert_eq!(
            state.trace.states(),
            vec![PipelineState::Extracting, PipelineState::Aligning, PipelineState::Failed]
        );
    }
}
