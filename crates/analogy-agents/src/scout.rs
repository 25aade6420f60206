//! Scout: text to logical property graph

use crate::backend::{AgentRole, CompletionRequest, ReasoningBackend};
use crate::capability::GraphExtractor;
use crate::error::ExtractionError;
use crate::prompts;
use crate::response::parse_json;
use crate::wire::WireGraph;
use analogy_graph::{
    GraphError, GraphRole, LogicEdge, LogicNode, LogicalPropertyGraph, NodeId, OntologyCategory,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reasoning-backed graph extractor
pub struct Scout {
    backend: Arc<dyn ReasoningBackend>,
    system: String,
}

impl Scout {
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            backend,
            system: prompts::scout(),
        }
    }

    fn build_graph(wire: WireGraph, role: GraphRole) -> Result<LogicalPropertyGraph, ExtractionError> {
        if wire.nodes.is_empty() {
            return Err(ExtractionError::EmptyGraph { role });
        }
        let invalid = |source: GraphError| ExtractionError::InvalidGraph { role, source };

        let nodes = wire
            .nodes
            .into_iter()
            .map(|n| -> Result<LogicNode, ExtractionError> {
                let category = n.category.parse::<OntologyCategory>().map_err(invalid)?;
                let mut node = LogicNode::new(NodeId::new(n.id).map_err(invalid)?, n.label, category)
                    .with_description(n.description);
                node.properties = n.properties;
                Ok(node)
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        let edges = wire
            .edges
            .into_iter()
            .map(|e| -> Result<LogicEdge, ExtractionError> {
                let mut edge = LogicEdge::new(
                    NodeId::new(e.source).map_err(invalid)?,
                    NodeId::new(e.target).map_err(invalid)?,
                    e.relation,
                );
                edge.properties = e.properties;
                Ok(edge)
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        LogicalPropertyGraph::from_parts(role, nodes, edges).map_err(invalid)
    }
}

#[async_trait::async_trait]
impl GraphExtractor for Scout {
    #[instrument(skip(self, text), fields(role = %role, chars = text.len()))]
    async fn extract(
        &self,
        text: &str,
        role: GraphRole,
    ) -> Result<LogicalPropertyGraph, ExtractionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyInput { role });
        }

        let request = CompletionRequest::new(
            AgentRole::Scout,
            self.system.as_str(),
            format!(
                "Extract the logical structure from the following {role} text. \
                 Return only the JSON.\n\nText: {text}"
            ),
        );
        let raw = self
            .backend
            .complete(&request)
            .await
            .map_err(|source| ExtractionError::Backend { role, source })?;

        let wire: WireGraph = parse_json(&raw).map_err(|e| ExtractionError::Malformed {
            role,
            reason: e.to_string(),
        })?;
        let graph = Self::build_graph(wire, role)?;

        debug!(nodes = graph.len(), edges = graph.edges().len(), "graph extracted");
        Ok(graph)
    }
}
