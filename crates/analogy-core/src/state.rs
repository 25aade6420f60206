//! Pipeline run state machine
//!
//! ```text
//! EXTRACTING -> ALIGNING -> ONTOLOGY_CHECK -> VALIDATING -> ACCEPTED -> SYNTHESIZING -> DONE
//!                  ^                               |
//!                  +----------- REFINING <---------+
//! ```
//!
//! `FAILED` is reachable from every non-terminal state. `VALIDATING` is
//! entered on every iteration; whether the validator is actually called
//! depends on the ontology gate.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Extracting,
    Aligning,
    OntologyCheck,
    Validating,
    Refining,
    Accepted,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineState {
    /// Every state, in pipeline order
    pub const ALL: [Self; 9] = [
        Self::Extracting,
        Self::Aligning,
        Self::OntologyCheck,
        Self::Validating,
        Self::Refining,
        Self::Accepted,
        Self::Synthesizing,
        Self::Done,
        Self::Failed,
    ];

    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extracting => "EXTRACTING",
            Self::Aligning => "ALIGNING",
            Self::OntologyCheck => "ONTOLOGY_CHECK",
            Self::Validating => "VALIDATING",
            Self::Refining => "REFINING",
            Self::Accepted => "ACCEPTED",
            Self::Synthesizing => "SYNTHESIZING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }

    /// `DONE` or `FAILED`
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Extraction,
    Alignment,
    OntologyCheck,
    Validation,
    Synthesis,
    Orchestration,
}

impl Stage {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Extraction => "extraction",
            Self::Alignment => "alignment",
            Self::OntologyCheck => "ontology_check",
            Self::Validation => "validation",
            Self::Synthesis => "synthesis",
            Self::Orchestration => "orchestration",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
    use PipelineState::{
        Accepted, Aligning, Done, Extracting, Failed, OntologyCheck, Refining, Synthesizing,
        Validating,
    };
    match from {
        Extracting => vec![Aligning, Failed],
        Aligning => vec![OntologyCheck, Failed],
        OntologyCheck => vec![Validating, Failed],
        Validating => vec![Accepted, Refining, Failed],
        Refining => vec![Aligning, Failed],
        Accepted => vec![Synthesizing, Failed],
        Synthesizing => vec![Done, Failed],
        Done | Failed => vec![],
    }
}

/// Whether `from -> to` is a legal step
#[inline]
#[must_use]
pub fn is_allowed(from: PipelineState, to: PipelineState) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Check a step against the state machine
///
/// # Errors
/// Returns `PipelineError::IllegalTransition` if the step is not allowed
pub fn validate_transition(from: PipelineState, to: PipelineState) -> Result<(), PipelineError> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}
