//! Analogy mappings between a source and a target graph

use crate::clamp_unit;
use crate::graph::{GraphRole, LogicalPropertyGraph};
use crate::hash::Fingerprint;
use crate::node::{NodeId, OntologyCategory};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique mapping identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingId(pub Ulid);

impl MappingId {
    /// Generate new mapping ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for MappingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pair of the mapping: a node of graph A aligned with a node of graph B
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMatch {
    /// Node id in the source graph
    pub source_id: NodeId,
    /// Node id in the target graph
    pub target_id: NodeId,
    /// Why the two nodes play the same role
    pub rationale: String,
    /// Category of the source node, as annotated from graph A
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_category: Option<OntologyCategory>,
    /// Category of the target node, as annotated from graph B
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_category: Option<OntologyCategory>,
}

impl NodeMatch {
    /// Create pair without category annotations
    #[inline]
    #[must_use]
    pub fn new(source_id: NodeId, target_id: NodeId, rationale: impl Into<String>) -> Self {
        Self {
            source_id,
            target_id,
            rationale: rationale.into(),
            source_category: None,
            target_category: None,
        }
    }

    /// True when both categories are annotated and differ
    #[inline]
    #[must_use]
    pub fn annotated_mismatch(&self) -> bool {
        matches!(
            (self.source_category, self.target_category),
            (Some(a), Some(b)) if !a.is_compatible_with(b)
        )
    }
}

/// A pair whose ids do not resolve in the graphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingPair {
    /// Position in the mapping
    pub index: usize,
    /// Graph the missing id was looked up in
    pub side: GraphRole,
    /// The unresolved id
    pub missing: NodeId,
}

/// Node-to-node mapping between graph A and graph B (aligner output)
///
/// A refined mapping is a new value that names the mapping it supersedes
/// through [`AnalogyMapping::refines`]; mappings are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogyMapping {
    id: MappingId,
    pairs: Vec<NodeMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refines: Option<MappingId>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    explanation: String,
}

impl AnalogyMapping {
    /// Create a fresh mapping
    #[must_use]
    pub fn new(pairs: Vec<NodeMatch>) -> Self {
        Self {
            id: MappingId::new(),
            pairs,
            refines: None,
            score: 0.0,
            explanation: String::new(),
        }
    }

    /// Mark as refinement of an earlier mapping
    #[inline]
    #[must_use]
    pub fn refining(mut self, previous: MappingId) -> Self {
        self.refines = Some(previous);
        self
    }

    /// With aligner-reported similarity score (clamped to `[0, 1]`)
    #[inline]
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = clamp_unit(score);
        self
    }

    /// With global explanation of the analogy
    #[inline]
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> MappingId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[NodeMatch] {
        &self.pairs
    }

    /// Mapping this one supersedes, if any
    #[inline]
    #[must_use]
    pub fn refines(&self) -> Option<MappingId> {
        self.refines
    }

    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Content fingerprint over the set of `(source_id, target_id)` pairs
    ///
    /// Identifiers, rationales, scores and pair order are ignored, so two
    /// alignments proposing the same correspondences compare equal.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut keys: Vec<(&str, &str)> = self
            .pairs
            .iter()
            .map(|p| (p.source_id.as_str(), p.target_id.as_str()))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        Fingerprint::compute_parts(keys.into_iter().flat_map(|(a, b)| [a, b]))
    }

    /// Every pair whose ids are absent from the graphs
    #[must_use]
    pub fn check_integrity(
        &self,
        graph_a: &LogicalPropertyGraph,
        graph_b: &LogicalPropertyGraph,
    ) -> Vec<DanglingPair> {
        let mut dangling = Vec::new();
        for (index, pair) in self.pairs.iter().enumerate() {
            if !graph_a.contains(pair.source_id.as_str()) {
                dangling.push(DanglingPair {
                    index,
                    side: GraphRole::Source,
                    missing: pair.source_id.clone(),
                });
            }
            if !graph_b.contains(pair.target_id.as_str()) {
                dangling.push(DanglingPair {
                    index,
                    side: GraphRole::Target,
                    missing: pair.target_id.clone(),
                });
            }
        }
        dangling
    }

    /// Whether every referenced id exists in its graph
    #[inline]
    #[must_use]
    pub fn is_resolvable(&self, graph_a: &LogicalPropertyGraph, graph_b: &LogicalPropertyGraph) -> bool {
        self.check_integrity(graph_a, graph_b).is_empty()
    }

    /// Split into a mapping holding only resolvable pairs, annotated with
    /// the categories from the graphs, and the pairs that were dropped
    #[must_use]
    pub fn resolve_against(
        self,
        graph_a: &LogicalPropertyGraph,
        graph_b: &LogicalPropertyGraph,
    ) -> (Self, Vec<NodeMatch>) {
        let (kept, dropped): (Vec<_>, Vec<_>) = self.pairs.into_iter().partition(|p| {
            graph_a.contains(p.source_id.as_str()) && graph_b.contains(p.target_id.as_str())
        });

        let pairs = kept
            .into_iter()
            .map(|mut p| {
                p.source_category = graph_a.category_of(p.source_id.as_str());
                p.target_category = graph_b.category_of(p.target_id.as_str());
                p
            })
            .collect();

        (
            Self {
                id: self.id,
                pairs,
                refines: self.refines,
                score: self.score,
                explanation: self.explanation,
            },
            dropped,
        )
    }

    /// Ids of graph A covered by this mapping, in pair order
    pub fn covered_sources(&self) -> impl Iterator<Item = &NodeId> {
        self.pairs.iter().map(|p| &p.source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LogicNode;

    fn id(s: &str) -> NodeId {
        NodeId::new(s).unwrap()
    }

    fn graphs() -> (LogicalPropertyGraph, LogicalPropertyGraph) {
        let a = LogicalPropertyGraph::from_parts(
            GraphRole::Source,
            vec![
                LogicNode::new(id("a1"), "Pressure", OntologyCategory::Attribute),
                LogicNode::new(id("a2"), "Flow", OntologyCategory::Function),
            ],
            vec![],
        )
        .unwrap();
        let b = LogicalPropertyGraph::from_parts(
            GraphRole::Target,
            vec![
                LogicNode::new(id("b1"), "Voltage", OntologyCategory::Attribute),
                LogicNode::new(id("b2"), "Current", OntologyCategory::Function),
            ],
            vec![],
        )
        .unwrap();
        (a, b)
    }

    #[test]
    fn fingerprint_ignores_order_and_rationale() {
        let m1 = AnalogyMapping::new(vec![
            NodeMatch::new(id("a1"), id("b1"), "driving force"),
            NodeMatch::new(id("a2"), id("b2"), "carried quantity"),
        ]);
        let m2 = AnalogyMapping::new(vec![
            NodeMatch::new(id("a2"), id("b2"), "different words"),
            NodeMatch::new(id("a1"), id("b1"), "same pairs"),
        ])
        .with_score(0.3);

        assert_ne!(m1.id(), m2.id());
        assert_eq!(m1.fingerprint(), m2.fingerprint());

        let m3 = AnalogyMapping::new(vec![NodeMatch::new(id("a1"), id("b2"), "swap")]);
        assert_ne!(m1.fingerprint(), m3.fingerprint());
    }

    #[test]
    fn check_integrity_report_each_side() {
        let (a, b) = graphs();
        let mapping = AnalogyMapping::new(vec![
            NodeMatch::new(id("a1"), id("b1"), "ok"),
            NodeMatch::new(id("a9"), id("b9"), "both missing"),
        ]);

        let dangling = mapping.check_integrity(&a, &b);
        assert_eq!(dangling.len(), 2);
        assert_eq!(dangling[0].index, 1);
        assert_eq!(dangling[0].side, GraphRole::Source);
        assert_eq!(dangling[1].side, GraphRole::Target);
        assert!(!mapping.is_resolvable(&a, &b));
    }

    #[test]
    fn resolve_against_prunes_and_annotates() {
        let (a, b) = graphs();
        let mapping = AnalogyMapping::new(vec![
            NodeMatch::new(id("a1"), id("b1"), "ok"),
            NodeMatch::new(id("a2"), id("b7"), "hallucinated target"),
        ]);
        let original_id = mapping.id();

        let (resolved, dropped) = mapping.resolve_against(&a, &b);
        assert_eq!(resolved.id(), original_id);
        assert_eq!(resolved.len(), 1);
        assert_eq!(dropped.len(), 1);
        assert_eq!(resolved.pairs()[0].source_category, Some(OntologyCategory::Attribute));
        assert_eq!(resolved.pairs()[0].target_category, Some(OntologyCategory::Attribute));
        assert!(resolved.is_resolvable(&a, &b));
    }

    #[test]
    fn refining_links_previous() {
        let first = AnalogyMapping::new(vec![]);
        let second = AnalogyMapping::new(vec![]).refining(first.id());
        assert_eq!(second.refines(), Some(first.id()));
        assert_eq!(first.refines(), None);
    }

    #[test]
    fn annotated_mismatch_requires_both_sides() {
        let mut pair = NodeMatch::new(id("a1"), id("b2"), "x");
        assert!(!pair.annotated_mismatch());
        pair.source_category = Some(OntologyCategory::Attribute);
        assert!(!pair.annotated_mismatch());
        pair.target_category = Some(OntologyCategory::Function);
        assert!(pair.annotated_mismatch());
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(AnalogyMapping::new(vec![]).with_score(3.0).score(), 1.0);
    }
}
