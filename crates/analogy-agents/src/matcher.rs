//! Matcher: graph pair to analogy mapping

use crate::backend::{AgentRole, CompletionRequest, ReasoningBackend};
use crate::capability::{AlignmentRequest, Aligner};
use crate::error::AlignmentError;
use crate::prompts;
use crate::response::parse_json;
use crate::wire::{GraphView, MappingView, WireMapping};
use analogy_graph::{AnalogyMapping, NodeId, NodeMatch};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reasoning-backed aligner
pub struct Matcher {
    backend: Arc<dyn ReasoningBackend>,
    system: String,
}

impl Matcher {
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            backend,
            system: prompts::matcher(),
        }
    }

    fn user_message(request: &AlignmentRequest<'_>) -> String {
        let mut payload = json!({
            "graph_a": GraphView::from(request.graph_a),
            "graph_b": GraphView::from(request.graph_b),
        });

        let directive = match (request.previous_mapping, request.feedback) {
            (Some(previous), feedback) => {
                payload["previous_mapping"] = json!(MappingView::from(previous));
                payload["feedback"] = json!(feedback.unwrap_or_default());
                "Refine the previous_mapping between these two logical property graphs. \
                 Revise the pairs named in the feedback and keep the pairs it does not \
                 criticise; return the complete revised mapping."
            }
            (None, _) => "Find the analogy between these two logical property graphs.",
        };

        format!("{directive} Return ONLY the JSON object.\n\n{payload:#}")
    }

    /// Wire pairs to model pairs; empty ids are dropped
    fn to_pairs(wire: WireMapping) -> (Vec<NodeMatch>, f64, String) {
        let pairs = wire
            .node_matches
            .into_iter()
            .filter_map(|p| match (NodeId::new(p.source_id), NodeId::new(p.target_id)) {
                (Ok(source), Ok(target)) => Some(NodeMatch::new(source, target, p.rationale)),
                _ => {
                    warn!("dropping pair with empty node id");
                    None
                }
            })
            .collect();
        (pairs, wire.score, wire.explanation)
    }
}

#[async_trait::async_trait]
impl Aligner for Matcher {
    #[instrument(skip_all, fields(refinement = request.is_refinement()))]
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        let completion = CompletionRequest::new(
            AgentRole::Matcher,
            self.system.as_str(),
            Self::user_message(&request),
        );
        let raw = self.backend.complete(&completion).await?;

        let wire: WireMapping =
            parse_json(&raw).map_err(|e| AlignmentError::Malformed(e.to_string()))?;
        let (pairs, score, explanation) = Self::to_pairs(wire);

        let mut mapping = AnalogyMapping::new(pairs)
            .with_score(score)
            .with_explanation(explanation);
        if let Some(previous) = request.previous_mapping {
            mapping = mapping.refining(previous.id());
        }

        let (resolved, dropped) = mapping.clone().resolve_against(request.graph_a, request.graph_b);
        if resolved.is_empty() && !dropped.is_empty() {
            warn!(pairs = dropped.len(), "no pair references known nodes; returning them unpruned");
            return Ok(mapping);
        }
        let mapping = resolved;
        for pair in &dropped {
            warn!(
                source_id = %pair.source_id,
                target_id = %pair.target_id,
                "pruned pair referencing an unknown node"
            );
        }

        debug!(pairs = mapping.len(), pruned = dropped.len(), "mapping aligned");
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockReasoningBackend;
    use crate::error::BackendError;
    use crate::testing::{answering, failing, hydraulic_graphs};
    use analogy_graph::OntologyCategory;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn prunes_unknown_ids_and_annotates_categories() {
        let (a, b) = hydraulic_graphs();
        let matcher = Matcher::new(answering(
            r#"{"node_matches": [
                {"source_id": "a1", "target_id": "b1", "reasoning": "driving potential"},
                {"source_id": "a2", "target_id": "b2", "reasoning": "carried quantity"},
                {"source_id": "a9", "target_id": "b1", "reasoning": "hallucinated"},
                {"source_id": "", "target_id": "b2", "reasoning": "blank"}
            ], "score": 0.92, "explanation": "Ohm's law mirrors Poiseuille flow"}"#,
        ));

        let mapping = matcher.align(AlignmentRequest::initial(&a, &b)).await.unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(mapping.is_resolvable(&a, &b));
        assert_eq!(mapping.pairs()[0].source_category, Some(OntologyCategory::Attribute));
        assert_eq!(mapping.pairs()[1].target_category, Some(OntologyCategory::Function));
        assert_eq!(mapping.score(), 0.92);
        assert_eq!(mapping.refines(), None);
    }

    #[tokio::test]
    async fn keeps_pairs_when_none_resolve() {
        let (a, b) = hydraulic_graphs();
        let matcher = Matcher::new(answering(
            r#"{"node_matches": [
                {"source_id": "x1", "target_id": "y1", "reasoning": "hallucinated"}
            ], "score": 0.8, "explanation": ""}"#,
        ));

        let mapping = matcher.align(AlignmentRequest::initial(&a, &b)).await.unwrap();
        assert_eq!(mapping.len(), 1);
        assert!(!mapping.is_resolvable(&a, &b));
        assert_eq!(mapping.pairs()[0].source_id.as_str(), "x1");
    }

    #[tokio::test]
    async fn refinement_links_previous_and_sends_feedback() {
        let (a, b) = hydraulic_graphs();
        let previous = AnalogyMapping::new(vec![]);

        let mut mock = MockReasoningBackend::new();
        mock.expect_complete()
            .withf(|req| {
                req.agent == AgentRole::Matcher
                    && req.user.contains("\"previous_mapping\"")
                    && req.user.contains("swap a1")
                    && req.user.contains("Revise the pairs named in the feedback")
            })
            .times(1)
            .returning(|_| Ok(r#"{"node_matches": []}"#.to_string()));

        let matcher = Matcher::new(Arc::new(mock));
        let request = AlignmentRequest::initial(&a, &b).refine(&previous, "swap a1");
        let mapping = matcher.align(request).await.unwrap();
        assert_eq!(mapping.refines(), Some(previous.id()));
        assert!(mapping.is_empty());
    }

    #[tokio::test]
    async fn malformed_answer_is_an_alignment_error() {
        let (a, b) = hydraulic_graphs();
        let matcher = Matcher::new(answering("{\"score\": 0.4}"));
        assert!(matches!(
            matcher.align(AlignmentRequest::initial(&a, &b)).await,
            Err(AlignmentError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_an_alignment_error() {
        let (a, b) = hydraulic_graphs();
        let matcher = Matcher::new(failing(BackendError::Connection("refused".into())));
        assert_eq!(
            matcher.align(AlignmentRequest::initial(&a, &b)).await,
            Err(AlignmentError::Backend(BackendError::Connection("refused".into())))
        );
    }
}
