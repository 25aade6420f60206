//! Error types for the graph data model

use crate::graph::GraphRole;

/// Structural errors raised while building or checking model values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node identifier is empty or whitespace
    #[error("invalid node id: {0:?}")]
    InvalidNodeId(String),

    /// Category is not one of STRUCTURE, FUNCTION, ATTRIBUTE
    #[error("unknown ontology category: {0:?}")]
    UnknownCategory(String),

    /// Graph has no nodes
    #[error("{role} graph has no nodes")]
    EmptyGraph { role: GraphRole },

    /// Two nodes share an identifier
    #[error("duplicate node id '{id}' in {role} graph")]
    DuplicateNode { role: GraphRole, id: String },

    /// Edge endpoint is not a node of the graph
    #[error("edge '{relation}' references unknown node '{missing}' in {role} graph")]
    DanglingEdge {
        role: GraphRole,
        relation: String,
        missing: String,
    },

    /// Acceptance threshold outside `[0.0, 1.0]`
    #[error("acceptance threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f64),
}
