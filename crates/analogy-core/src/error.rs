//! Error types for the analogy pipeline
//!
//! A run either returns a report or fails with exactly one
//! [`PipelineError`]. Validation failures never appear here: the
//! refinement loop absorbs them.

use crate::state::{PipelineState, Stage};
use analogy_agents::{AlignmentError, BackendError, ExtractionError, SynthesisError};
use analogy_graph::GraphRole;
use std::path::PathBuf;

/// Failure of a pipeline run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Inputs rejected before any stage ran
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Graph extraction failed for one of the texts
    #[error("extraction failed for {role} text: {source}")]
    Extraction {
        role: GraphRole,
        #[source]
        source: ExtractionError,
    },

    /// Alignment failed
    #[error("alignment stage failed: {0}")]
    Alignment(#[from] AlignmentError),

    /// Synthesis failed
    #[error("synthesis stage failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// The orchestrator attempted a step the state machine forbids
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

impl From<ExtractionError> for PipelineError {
    fn from(source: ExtractionError) -> Self {
        Self::Extraction {
            role: source.role(),
            source,
        }
    }
}

impl PipelineError {
    /// Stage the failure is attributed to
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput(_) => Stage::Input,
            Self::Extraction { .. } => Stage::Extraction,
            Self::Alignment(_) => Stage::Alignment,
            Self::Synthesis(_) => Stage::Synthesis,
            Self::IllegalTransition { .. } => Stage::Orchestration,
        }
    }

    /// Transport-type failures a caller may retry as a fresh run
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let backend = |e: &BackendError| e.is_retryable();
        match self {
            Self::Extraction { source, .. } => match source {
                ExtractionError::Backend { source, .. } => backend(source),
                ExtractionError::Timeout { .. } => true,
                _ => false,
            },
            Self::Alignment(AlignmentError::Backend(e)) | Self::Synthesis(SynthesisError::Backend(e)) => {
                backend(e)
            }
            Self::Alignment(AlignmentError::Timeout { .. })
            | Self::Synthesis(SynthesisError::Timeout { .. }) => true,
            _ => false,
        }
    }
}

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable holds an unusable value
    #[error("environment variable {var} has invalid value {value:?}")]
    Env { var: &'static str, value: String },

    /// Values are out of range or missing
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_keeps_role() {
        let err = PipelineError::from(ExtractionError::EmptyGraph {
            role: GraphRole::Target,
        });
        assert_eq!(err.stage(), Stage::Extraction);
        assert!(matches!(err, PipelineError::Extraction { role: GraphRole::Target, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(PipelineError::from(AlignmentError::Backend(BackendError::RateLimited)).is_retryable());
        assert!(PipelineError::from(SynthesisError::Timeout { secs: 5 }).is_retryable());
        assert!(!PipelineError::from(AlignmentError::Malformed("x".into())).is_retryable());
        assert!(!PipelineError::InvalidInput("empty".into()).is_retryable());
    }
}
