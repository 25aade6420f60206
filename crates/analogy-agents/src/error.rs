//! Error types for the reasoning capabilities
//!
//! One enum per capability so the orchestrator can apply a different
//! failure policy to each stage:
//! - extraction, alignment and synthesis failures abort a run
//! - validation failures are absorbed into the refinement loop

use analogy_graph::{GraphError, GraphRole};

/// Failures of the reasoning transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Request exceeded its deadline
    #[error("request timed out")]
    Timeout,

    /// Could not reach the service
    #[error("connection failed: {0}")]
    Connection(String),

    /// Service asked us to slow down
    #[error("rate limited by reasoning service")]
    RateLimited,

    /// Non-success HTTP status
    #[error("reasoning service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("unexpected response payload: {0}")]
    Payload(String),

    /// Backend configuration is incomplete
    #[error("backend configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// Transient failures worth retrying at a higher layer
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connection(_) | Self::RateLimited
        ) || matches!(self, Self::Status { status, .. } if *status >= 500)
    }
}

/// Graph extraction failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    /// Input text is empty
    #[error("{role} text is empty")]
    EmptyInput { role: GraphRole },

    /// Reasoning call failed
    #[error("{role} extraction failed: {source}")]
    Backend {
        role: GraphRole,
        #[source]
        source: BackendError,
    },

    /// Reasoning output is not a graph
    #[error("{role} extraction returned a malformed structure: {reason}")]
    Malformed { role: GraphRole, reason: String },

    /// Reasoning output has zero nodes
    #[error("{role} extraction returned no nodes")]
    EmptyGraph { role: GraphRole },

    /// Reasoning output violates graph invariants
    #[error("{role} extraction returned an invalid graph: {source}")]
    InvalidGraph {
        role: GraphRole,
        #[source]
        source: GraphError,
    },

    /// Stage deadline exceeded
    #[error("{role} extraction timed out after {secs}s")]
    Timeout { role: GraphRole, secs: u64 },
}

impl ExtractionError {
    /// Which input the failure concerns
    #[must_use]
    pub fn role(&self) -> GraphRole {
        match self {
            Self::EmptyInput { role }
            | Self::Backend { role, .. }
            | Self::Malformed { role, .. }
            | Self::EmptyGraph { role }
            | Self::InvalidGraph { role, .. }
            | Self::Timeout { role, .. } => *role,
        }
    }
}

/// Alignment failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignmentError {
    /// Reasoning call failed
    #[error("alignment failed: {0}")]
    Backend(#[from] BackendError),

    /// Reasoning output is not a mapping
    #[error("alignment returned a malformed mapping: {0}")]
    Malformed(String),

    /// Stage deadline exceeded
    #[error("alignment timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Validation failures (never a low-confidence verdict)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Reasoning call failed
    #[error("validation failed: {0}")]
    Backend(#[from] BackendError),

    /// Reasoning output is not a verdict
    #[error("validation returned a malformed verdict: {0}")]
    Malformed(String),

    /// Stage deadline exceeded
    #[error("validation timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Synthesis failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    /// Hypothesis claimed accepted but fails the acceptance predicate
    #[error(
        "synthesis precondition violated: consistent={consistent}, \
         confidence={confidence:.2}, threshold={threshold:.2}"
    )]
    PreconditionViolated {
        consistent: bool,
        confidence: f64,
        threshold: f64,
    },

    /// Reasoning call failed
    #[error("synthesis failed: {0}")]
    Backend(#[from] BackendError),

    /// Stage deadline exceeded
    #[error("synthesis timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Source-domain suggestion failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    /// Problem statement is empty
    #[error("problem description is empty")]
    EmptyProblem,

    /// Reasoning call failed
    #[error("suggestion failed: {0}")]
    Backend(#[from] BackendError),

    /// Reasoning returned nothing usable
    #[error("suggestion was empty")]
    EmptySuggestion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_retry_classification() {
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::RateLimited.is_retryable());
        assert!(BackendError::Status { status: 503, message: String::new() }.is_retryable());
        assert!(!BackendError::Status { status: 401, message: String::new() }.is_retryable());
        assert!(!BackendError::Config("missing key".into()).is_retryable());
    }

    #[test]
    fn extraction_error_reports_role() {
        let err = ExtractionError::EmptyGraph { role: GraphRole::Target };
        assert_eq!(err.role(), GraphRole::Target);
        assert_eq!(err.to_string(), "target extraction returned no nodes");
    }

    #[test]
    fn precondition_message() {
        let err = SynthesisError::PreconditionViolated {
            consistent: true,
            confidence: 0.5,
            threshold: 0.8,
        };
        assert!(err.to_string().contains("confidence=0.50"));
    }
}
