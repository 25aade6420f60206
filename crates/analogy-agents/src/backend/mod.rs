//! Reasoning backends
//!
//! Agents never talk HTTP themselves: each one holds an
//! `Arc<dyn ReasoningBackend>` and sends a system prompt plus a user
//! message, receiving the model's raw text answer.

mod azure;

pub use azure::{AzureOpenAiBackend, BackendConfig};

use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which agent issued a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Graph extraction
    Scout,
    /// Alignment
    Matcher,
    /// Validation
    Critic,
    /// Synthesis
    Architect,
    /// Source-domain suggestion
    Visionary,
}

impl AgentRole {
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scout => "Scout",
            Self::Matcher => "Matcher",
            Self::Critic => "Critic",
            Self::Architect => "Architect",
            Self::Visionary => "Visionary",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One system + user exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Issuing agent
    pub agent: AgentRole,
    /// System prompt
    pub system: String,
    /// User message
    pub user: String,
}

impl CompletionRequest {
    #[inline]
    #[must_use]
    pub fn new(agent: AgentRole, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            agent,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// A single-turn reasoning service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Send one request and return the raw text answer
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}
