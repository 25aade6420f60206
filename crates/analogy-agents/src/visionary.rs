//! Visionary: suggest a far-removed source domain for a target problem

use crate::backend::{AgentRole, CompletionRequest, ReasoningBackend};
use crate::capability::DomainSuggester;
use crate::error::SuggestionError;
use crate::prompts::VISIONARY;
use crate::response::strip_code_fences;
use std::sync::Arc;
use tracing::instrument;

/// Reasoning-backed source-domain suggester
pub struct Visionary {
    backend: Arc<dyn ReasoningBackend>,
}

impl Visionary {
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait::async_trait]
impl DomainSuggester for Visionary {
    #[instrument(skip_all, fields(chars = problem.len()))]
    async fn suggest(&self, problem: &str) -> Result<String, SuggestionError> {
        let problem = problem.trim();
        if problem.is_empty() {
            return Err(SuggestionError::EmptyProblem);
        }

        let request = CompletionRequest::new(
            AgentRole::Visionary,
            VISIONARY,
            format!(
                "Target problem or research topic:\n\n{problem}\n\n\
                 Suggest a far-removed source domain in exactly 2 sentences."
            ),
        );
        let raw = self.backend.complete(&request).await?;

        let suggestion = strip_code_fences(&raw);
        if suggestion.is_empty() {
            return Err(SuggestionError::EmptySuggestion);
        }
        Ok(suggestion)
    }
}
