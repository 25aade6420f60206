//! Critic: mapping to validated hypothesis

use crate::backend::{AgentRole, CompletionRequest, ReasoningBackend};
use crate::capability::HypothesisValidator;
use crate::error::ValidationError;
use crate::prompts;
use crate::response::parse_json;
use crate::wire::{MappingView, WireVerdict};
use analogy_graph::{AnalogyMapping, ValidatedHypothesis};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reasoning-backed validator
///
/// Pairs whose annotated categories differ are always rejected, whatever
/// the reasoning step concluded.
pub struct Critic {
    backend: Arc<dyn ReasoningBackend>,
    system: String,
}

impl Critic {
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            backend,
            system: prompts::critic(),
        }
    }

    fn categorical_issues(mapping: &AnalogyMapping) -> Vec<String> {
        mapping
            .pairs()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.annotated_mismatch())
            .filter_map(|(i, p)| match (p.source_category, p.target_category) {
                (Some(s), Some(t)) => Some(format!(
                    "Categorical mismatch: [{s}] (source) mapped to [{t}] (target) for match {i} \
                     (source_id={}, target_id={}).",
                    p.source_id, p.target_id
                )),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl HypothesisValidator for Critic {
    #[instrument(skip_all, fields(mapping = %mapping.id(), pairs = mapping.len()))]
    async fn validate(
        &self,
        mapping: &AnalogyMapping,
    ) -> Result<ValidatedHypothesis, ValidationError> {
        let view = serde_json::to_string_pretty(&MappingView::from(mapping))
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        let request = CompletionRequest::new(
            AgentRole::Critic,
            self.system.as_str(),
            format!(
                "Evaluate the following analogy mapping for structural isomorphism and \
                 functional plausibility. Return ONLY a JSON object containing \
                 is_consistent, issues and confidence.\n\n{view}"
            ),
        );
        let raw = self.backend.complete(&request).await?;

        let verdict: WireVerdict =
            parse_json(&raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let mut issues = verdict.issues;
        let mismatches = Self::categorical_issues(mapping);
        let consistent = verdict.is_consistent && mismatches.is_empty();
        issues.extend(mismatches);

        debug!(consistent, confidence = verdict.confidence, issues = issues.len(), "mapping judged");
        Ok(ValidatedHypothesis::new(mapping.clone(), consistent, verdict.confidence)
            .with_feedback(verdict.feedback)
            .with_issues(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::testing::{answering, failing, hydraulic_graphs};
    use analogy_graph::{HypothesisOrigin, NodeId, NodeMatch};
    use pretty_assertions::assert_eq;

    fn mapping(pairs: &[(&str, &str)]) -> AnalogyMapping {
        let (a, b) = hydraulic_graphs();
        let pairs = pairs
            .iter()
            .map(|(s, t)| NodeMatch::new(NodeId::new(*s).unwrap(), NodeId::new(*t).unwrap(), "r"))
            .collect();
        AnalogyMapping::new(pairs).resolve_against(&a, &b).0
    }

    #[tokio::test]
    async fn accepts_verdict_as_given() {
        let critic = Critic::new(answering(
            "{\"is_consistent\": true, \"issues\": [], \"confidence\": 0.91}",
        ));
        let hypothesis = critic.validate(&mapping(&[("a1", "b1")])).await.unwrap();
        assert!(hypothesis.consistent);
        assert_eq!(hypothesis.confidence, 0.91);
        assert_eq!(hypothesis.origin, HypothesisOrigin::Critic);
    }

    #[tokio::test]
    async fn categorical_mismatch_overrides_a_lenient_verdict() {
        let critic = Critic::new(answering(
            "{\"is_consistent\": true, \"issues\": [], \"confidence\": 0.95}",
        ));
        // a1 is an ATTRIBUTE, b2 a FUNCTION
        let hypothesis = critic.validate(&mapping(&[("a1", "b2")])).await.unwrap();
        assert!(!hypothesis.consistent);
        assert_eq!(hypothesis.issues.len(), 1);
        assert!(hypothesis.issues[0].starts_with("Categorical mismatch: [ATTRIBUTE] (source)"));
        assert!(hypothesis.feedback_text().contains("source_id=a1, target_id=b2"));
    }

    #[tokio::test]
    async fn confidence_is_clamped() {
        let critic = Critic::new(answering("{\"is_consistent\": true, \"confidence\": 4.2}"));
        let hypothesis = critic.validate(&mapping(&[("a1", "b1")])).await.unwrap();
        assert_eq!(hypothesis.confidence, 1.0);
    }

    #[tokio::test]
    async fn missing_flag_is_malformed() {
        let critic = Critic::new(answering("{\"confidence\": 0.9}"));
        assert!(matches!(
            critic.validate(&mapping(&[("a1", "b1")])).await,
            Err(ValidationError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_a_validation_error() {
        let critic = Critic::new(failing(BackendError::Timeout));
        assert_eq!(
            critic.validate(&mapping(&[("a1", "b1")])).await,
            Err(ValidationError::Backend(BackendError::Timeout))
        );
    }
}
