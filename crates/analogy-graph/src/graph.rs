//! Logical property graphs
//!
//! One graph is extracted per input text. A graph is validated once at
//! construction (non-empty, unique ids, edges between known nodes) and is
//! read-only afterwards.

use crate::error::GraphError;
use crate::node::{LogicNode, NodeId, OntologyCategory};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the analogy a graph describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphRole {
    /// Graph A, the domain the analogy is borrowed from
    Source,
    /// Graph B, the domain the analogy is applied to
    Target,
}

impl fmt::Display for GraphRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Directed, labeled edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicEdge {
    /// Id of the source node
    pub source: NodeId,
    /// Id of the target node
    pub target: NodeId,
    /// Kind of logical relation (e.g. "drives", "limits")
    pub relation: String,
    /// Optional metadata
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl LogicEdge {
    /// Create edge without metadata
    #[inline]
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, relation: impl Into<String>) -> Self {
        Self {
            source,
            target,
            relation: relation.into(),
            properties: serde_json::Map::new(),
        }
    }
}

/// Graph of logical structures extracted from one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRepr", into = "GraphRepr")]
pub struct LogicalPropertyGraph {
    role: GraphRole,
    nodes: IndexMap<NodeId, LogicNode>,
    edges: Vec<LogicEdge>,
}

impl LogicalPropertyGraph {
    /// Build and validate a graph
    ///
    /// # Errors
    /// - `GraphError::EmptyGraph` if `nodes` is empty
    /// - `GraphError::DuplicateNode` if two nodes share an id
    /// - `GraphError::DanglingEdge` if an edge endpoint is unknown
    pub fn from_parts(
        role: GraphRole,
        nodes: Vec<LogicNode>,
        edges: Vec<LogicEdge>,
    ) -> Result<Self, GraphError> {
        if nodes.is_empty() {
            return Err(GraphError::EmptyGraph { role });
        }

        let mut index = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            if index.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode {
                    role,
                    id: node.id.to_string(),
                });
            }
            index.insert(node.id.clone(), node);
        }

        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !index.contains_key(endpoint) {
                    return Err(GraphError::DanglingEdge {
                        role,
                        relation: edge.relation.clone(),
                        missing: endpoint.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            role,
            nodes: index,
            edges,
        })
    }

    /// Side of the analogy
    #[inline]
    #[must_use]
    pub fn role(&self) -> GraphRole {
        self.role
    }

    /// Nodes in extraction order
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &LogicNode> {
        self.nodes.values()
    }

    /// Edges in extraction order
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[LogicEdge] {
        &self.edges
    }

    /// Look up a node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LogicNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Category of a node, if present
    #[inline]
    #[must_use]
    pub fn category_of(&self, id: &str) -> Option<OntologyCategory> {
        self.node(id).map(|n| n.category)
    }

    /// Number of nodes (always at least one)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed graph
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node count per category, in taxonomy order
    #[must_use]
    pub fn category_counts(&self) -> [(OntologyCategory, usize); 3] {
        OntologyCategory::ALL.map(|cat| (cat, self.nodes().filter(|n| n.category == cat).count()))
    }
}

/// Serialized shape: nodes as a list so ordering survives any format
#[derive(Serialize, Deserialize)]
struct GraphRepr {
    role: GraphRole,
    nodes: Vec<LogicNode>,
    #[serde(default)]
    edges: Vec<LogicEdge>,
}

impl TryFrom<GraphRepr> for LogicalPropertyGraph {
    type Error = GraphError;

    fn try_from(repr: GraphRepr) -> Result<Self, Self::Error> {
        Self::from_parts(repr.role, repr.nodes, repr.edges)
    }
}

impl From<LogicalPropertyGraph> for GraphRepr {
    fn from(graph: LogicalPropertyGraph) -> Self {
        Self {
            role: graph.role,
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::new(s).unwrap()
    }

    fn pipe_nodes() -> Vec<LogicNode> {
        vec![
            LogicNode::new(id("a1"), "Pipe", OntologyCategory::Structure),
            LogicNode::new(id("a2"), "Pressure", OntologyCategory::Attribute),
            LogicNode::new(id("a3"), "Flow", OntologyCategory::Function),
        ]
    }

    #[test]
    fn from_parts_keeps_order() {
        let graph = LogicalPropertyGraph::from_parts(
            GraphRole::Source,
            pipe_nodes(),
            vec![LogicEdge::new(id("a2"), id("a3"), "drives")],
        )
        .unwrap();

        let labels: Vec<_> = graph.nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["Pipe", "Pressure", "Flow"]);
        assert_eq!(graph.category_of("a2"), Some(OntologyCategory::Attribute));
        assert!(graph.contains("a3"));
        assert!(!graph.contains("b1"));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn empty_graph_rejected() {
        let err = LogicalPropertyGraph::from_parts(GraphRole::Target, vec![], vec![]).unwrap_err();
        assert_eq!(err, GraphError::EmptyGraph { role: GraphRole::Target });
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut nodes = pipe_nodes();
        nodes.push(LogicNode::new(id("a1"), "Valve", OntologyCategory::Structure));
        let err = LogicalPropertyGraph::from_parts(GraphRole::Source, nodes, vec![]).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode { ref id, .. } if id == "a1"));
    }

    #[test]
    fn dangling_edge_rejected() {
        let err = LogicalPropertyGraph::from_parts(
            GraphRole::Source,
            pipe_nodes(),
            vec![LogicEdge::new(id("a1"), id("zz"), "feeds")],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { ref missing, .. } if missing == "zz"));
    }

    #[test]
    fn category_counts_cover_taxonomy() {
        let graph =
            LogicalPropertyGraph::from_parts(GraphRole::Source, pipe_nodes(), vec![]).unwrap();
        assert_eq!(
            graph.category_counts(),
            [
                (OntologyCategory::Structure, 1),
                (OntologyCategory::Function, 1),
                (OntologyCategory::Attribute, 1),
            ]
        );
    }

    #[test]
    fn deserialize_revalidates() {
        let json = serde_json::json!({
            "role": "source",
            "nodes": [],
            "edges": []
        });
        assert!(serde_json::from_value::<LogicalPropertyGraph>(json).is_err());

        let graph =
            LogicalPropertyGraph::from_parts(GraphRole::Source, pipe_nodes(), vec![]).unwrap();
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][1]["category"], "ATTRIBUTE");
        let back: LogicalPropertyGraph = serde_json::from_value(value).unwrap();
        assert_eq!(back, graph);
    }
}
