//! Ontology consistency check for analogy mappings
//!
//! Classifies every pair of a mapping as compatible or not under the
//! polymorphism rule (same category on both sides). Unresolvable ids count
//! as incompatible.

use analogy_graph::{AnalogyMapping, LogicalPropertyGraph, NodeId, OntologyCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pair rejected by the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryMismatch {
    /// Both nodes exist but their categories differ
    Categorical {
        source_id: NodeId,
        target_id: NodeId,
        source: OntologyCategory,
        target: OntologyCategory,
    },
    /// Source id is not a node of graph A
    MissingSourceNode { source_id: NodeId, target_id: NodeId },
    /// Target id is not a node of graph B
    MissingTargetNode { source_id: NodeId, target_id: NodeId },
}

impl CategoryMismatch {
    /// The `(source_id, target_id)` pair this mismatch is about
    #[must_use]
    pub fn pair(&self) -> (&NodeId, &NodeId) {
        match self {
            Self::Categorical {
                source_id,
                target_id,
                ..
            }
            | Self::MissingSourceNode {
                source_id,
                target_id,
            }
            | Self::MissingTargetNode {
                source_id,
                target_id,
            } => (source_id, target_id),
        }
    }
}

impl fmt::Display for CategoryMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical {
                source_id,
                target_id,
                source,
                target,
            } => write!(
                f,
                "Categorical mismatch: [{source}] (source) mapped to [{target}] (target) \
                 for source_id={source_id}, target_id={target_id}."
            ),
            Self::MissingSourceNode {
                source_id,
                target_id,
            } => write!(
                f,
                "Unknown source node: source_id={source_id} does not exist in the source graph \
                 (paired with target_id={target_id})."
            ),
            Self::MissingTargetNode {
                source_id,
                target_id,
            } => write!(
                f,
                "Unknown target node: target_id={target_id} does not exist in the target graph \
                 (paired with source_id={source_id})."
            ),
        }
    }
}

/// Result of the ontology gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyVerdict {
    /// True when no pair was rejected
    pub consistent: bool,
    /// Every rejected pair, in mapping order
    pub mismatches: Vec<CategoryMismatch>,
}

impl OntologyVerdict {
    /// Verdict for a mapping without problems
    #[inline]
    #[must_use]
    pub fn consistent() -> Self {
        Self {
            consistent: true,
            mismatches: Vec::new(),
        }
    }

    /// Verdict from a list of mismatches
    #[inline]
    #[must_use]
    pub fn from_mismatches(mismatches: Vec<CategoryMismatch>) -> Self {
        Self {
            consistent: mismatches.is_empty(),
            mismatches,
        }
    }

    /// One line per rejected pair
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        self.mismatches.iter().map(ToString::to_string).collect()
    }

    /// Directive text for the aligner naming the pairs to revise
    #[must_use]
    pub fn feedback(&self) -> String {
        if self.consistent {
            return String::new();
        }
        let mut text = format!(
            "The ontology gate rejected {} pair(s). Revise these pairs so both sides share \
             the same category (STRUCTURE, FUNCTION or ATTRIBUTE); keep the other pairs:",
            self.mismatches.len()
        );
        for mismatch in &self.mismatches {
            text.push_str("\n- ");
            text.push_str(&mismatch.to_string());
        }
        text
    }
}

/// Stateless ontology gate
#[derive(Debug, Clone, Copy, Default)]
pub struct OntologyChecker;

impl OntologyChecker {
    /// Create new checker instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check every pair of `mapping` against the categories in the graphs
    ///
    /// # Performance
    /// O(n) in the number of pairs; node lookups are hash lookups.
    #[must_use]
    pub fn check(
        &self,
        mapping: &AnalogyMapping,
        graph_a: &LogicalPropertyGraph,
        graph_b: &LogicalPropertyGraph,
    ) -> OntologyVerdict {
        let mut mismatches = Vec::new();

        for pair in mapping.pairs() {
            let source = graph_a.category_of(pair.source_id.as_str());
            let target = graph_b.category_of(pair.target_id.as_str());

            match (source, target) {
                (None, _) => mismatches.push(CategoryMismatch::MissingSourceNode {
                    source_id: pair.source_id.clone(),
                    target_id: pair.target_id.clone(),
                }),
                (Some(_), None) => mismatches.push(CategoryMismatch::MissingTargetNode {
                    source_id: pair.source_id.clone(),
                    target_id: pair.target_id.clone(),
                }),
                (Some(s), Some(t)) if !s.is_compatible_with(t) => {
                    mismatches.push(CategoryMismatch::Categorical {
                        source_id: pair.source_id.clone(),
                        target_id: pair.target_id.clone(),
                        source: s,
                        target: t,
                    });
                }
                (Some(_), Some(_)) => {}
            }
        }

        OntologyVerdict::from_mismatches(mismatches)
    }
}

/// Check a mapping with the default checker
#[inline]
#[must_use]
pub fn check_ontology(
    mapping: &AnalogyMapping,
    graph_a: &LogicalPropertyGraph,
    graph_b: &LogicalPropertyGraph,
) -> OntologyVerdict {
    OntologyChecker::new().check(mapping, graph_a, graph_b)
}
