//! Shared helpers for agent unit tests

use crate::backend::{MockReasoningBackend, ReasoningBackend};
use crate::error::BackendError;
use analogy_graph::{GraphRole, LogicNode, LogicalPropertyGraph, NodeId, OntologyCategory};
use std::sync::Arc;

/// Backend answering every request with `text`
pub(crate) fn answering(text: &'static str) -> Arc<dyn ReasoningBackend> {
    let mut mock = MockReasoningBackend::new();
    mock.expect_complete().returning(move |_| Ok(text.to_string()));
    Arc::new(mock)
}

/// Backend failing every request with `err`
pub(crate) fn failing(err: BackendError) -> Arc<dyn ReasoningBackend> {
    let mut mock = MockReasoningBackend::new();
    mock.expect_complete().returning(move |_| Err(err.clone()));
    Arc::new(mock)
}

/// Hydraulic (source) and electrical (target) graphs
pub(crate) fn hydraulic_graphs() -> (LogicalPropertyGraph, LogicalPropertyGraph) {
    let node = |id: &str, label: &str, category| {
        LogicNode::new(NodeId::new(id).unwrap(), label, category)
    };
    let a = LogicalPropertyGraph::from_parts(
        GraphRole::Source,
        vec![
            node("a1", "Pressure", OntologyCategory::Attribute),
            node("a2", "Water flow", OntologyCategory::Function),
            node("a3", "Pipe", OntologyCategory::Structure),
        ],
        vec![],
    )
    .unwrap();
    let b = LogicalPropertyGraph::from_parts(
        GraphRole::Target,
        vec![
            node("b1", "Voltage", OntologyCategory::Attribute),
            node("b2", "Electric current", OntologyCategory::Function),
            node("b3", "Wire", OntologyCategory::Structure),
        ],
        vec![],
    )
    .unwrap();
    (a, b)
}
