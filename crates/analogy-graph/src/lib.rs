//! Analogy Graph - data model for cross-domain analogy research
//!
//! Everything that flows between the pipeline stages is defined here:
//! - [`LogicalPropertyGraph`]: typed nodes and labeled edges extracted from one text
//! - [`AnalogyMapping`]: node-to-node pairs between a source and a target graph
//! - [`ValidatedHypothesis`]: a mapping plus the validator's verdict
//! - [`ResearchReport`]: the terminal artifact of a successful run
//!
//! Graphs are immutable once built; mappings and hypotheses are produced
//! fresh by each stage and never edited in place.
//!
//! # Example
//!
//! ```rust
//! use analogy_graph::{GraphRole, LogicNode, LogicalPropertyGraph, NodeId, OntologyCategory};
//!
//! # fn main() -> Result<(), analogy_graph::GraphError> {
//! let pressure = LogicNode::new(NodeId::new("a1")?, "Pressure", OntologyCategory::Attribute);
//! let graph = LogicalPropertyGraph::from_parts(GraphRole::Source, vec![pressure], vec![])?;
//! assert_eq!(graph.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod graph;
mod hash;
mod hypothesis;
mod mapping;
mod node;
mod report;

pub use error::GraphError;
pub use graph::{GraphRole, LogicEdge, LogicalPropertyGraph};
pub use hash::Fingerprint;
pub use hypothesis::{
    AcceptancePredicate, HypothesisId, HypothesisOrigin, ValidatedHypothesis,
    DEFAULT_ACCEPTANCE_THRESHOLD,
};
pub use mapping::{AnalogyMapping, DanglingPair, MappingId, NodeMatch};
pub use node::{LogicNode, NodeId, OntologyCategory};
pub use report::{
    ActionPlan, ReportId, ReportSources, ResearchReport, ValidationStatus, DEGRADED_MARKER,
};

/// Clamp a score into `[0.0, 1.0]`, mapping NaN to `0.0`
#[inline]
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::clamp_unit;

    #[test]
    fn clamp_unit_bounds() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }
}
