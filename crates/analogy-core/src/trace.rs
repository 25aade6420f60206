//! Audit trail of the states a run passed through

use crate::error::PipelineError;
use crate::state::{validate_transition, PipelineState, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub at: DateTime<Utc>,
}

/// Ordered, validated list of state changes
///
/// Starts in `EXTRACTING`; every step is checked against the state machine
/// before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTrace {
    current: PipelineState,
    transitions: Vec<Transition>,
}

impl RunTrace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: PipelineState::Extracting,
            transitions: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> PipelineState {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Move to `to`
    ///
    /// # Errors
    /// Returns `PipelineError::IllegalTransition` and leaves the trace
    /// unchanged if the step is not allowed
    pub fn advance(&mut self, to: PipelineState) -> Result<(), PipelineError> {
        validate_transition(self.current, to)?;
        tracing::debug!(from = %self.current, to = %to, "state transition");
        self.transitions.push(Transition {
            from: self.current,
            to,
            at: Utc::now(),
        });
        self.current = to;
        Ok(())
    }

    /// Move to `FAILED` unless already terminal
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            let _ = self.advance(PipelineState::Failed);
        }
    }

    /// Every state visited, starting with `EXTRACTING`
    #[must_use]
    pub fn states(&self) -> Vec<PipelineState> {
        std::iter::once(PipelineState::Extracting)
            .chain(self.transitions.iter().map(|t| t.to))
            .collect()
    }

    /// How many times the loop entered `REFINING`
    #[must_use]
    pub fn refinements(&self) -> usize {
        self.count(PipelineState::Refining)
    }

    /// How many times `state` was entered
    #[must_use]
    pub fn count(&self, state: PipelineState) -> usize {
        self.transitions.iter().filter(|t| t.to == state).count()
    }
}

impl Default for RunTrace {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability calls made during one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInvocations {
    pub extraction: usize,
    pub alignment: usize,
    pub validation: usize,
    pub synthesis: usize,
}

impl StageInvocations {
    /// Count one call and emit `analogy_stage_invocations_total{stage}`
    pub fn record(&mut self, stage: Stage) {
        match stage {
            Stage::Extraction => self.extraction += 1,
            Stage::Alignment => self.alignment += 1,
            Stage::Validation => self.validation += 1,
            Stage::Synthesis => self.synthesis += 1,
            Stage::Input | Stage::OntologyCheck | Stage::Orchestration => return,
        }
        metrics::counter!("analogy_stage_invocations_total", "stage" => stage.as_str()).increment(1);
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.extraction + self.alignment + self.validation + self.synthesis
    }
}
