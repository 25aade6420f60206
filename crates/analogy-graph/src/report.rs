//! Research reports (synthesis output)

use crate::graph::LogicalPropertyGraph;
use crate::hypothesis::ValidatedHypothesis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Prefix of every degraded report's summary
pub const DEGRADED_MARKER: &str = "[NOT FULLY VALIDATED]";

/// Unique report identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Ulid);

impl ReportId {
    /// Generate new report ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concrete engineering steps for transferring the analogy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Algorithms, formulas or logic to copy from source to target
    #[serde(default)]
    pub transferable_mechanisms: Vec<String>,
    /// Step-by-step implementation guide
    #[serde(default)]
    pub technical_roadmap: Vec<String>,
    /// KPIs to measure success
    #[serde(default)]
    pub key_metrics_to_track: Vec<String>,
    /// Technical risks
    #[serde(default)]
    pub potential_pitfalls: Vec<String>,
}

impl ActionPlan {
    /// True when every section is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transferable_mechanisms.is_empty()
            && self.technical_roadmap.is_empty()
            && self.key_metrics_to_track.is_empty()
            && self.potential_pitfalls.is_empty()
    }
}

/// How the hypothesis behind a report was settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationStatus {
    /// The acceptance predicate was met
    Accepted,
    /// The retry budget ran out first; the latest hypothesis was used
    Degraded {
        /// Number of validation attempts made
        attempts: usize,
        /// Why the final hypothesis failed the predicate
        reason: String,
    },
}

impl ValidationStatus {
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Inputs a report refers back to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSources {
    /// Source-domain text (graph A)
    pub source_text: String,
    /// Target-domain text (graph B)
    pub target_text: String,
    /// Graph extracted from the source text
    pub graph_a: LogicalPropertyGraph,
    /// Graph extracted from the target text
    pub graph_b: LogicalPropertyGraph,
}

/// Terminal artifact of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Identifier
    pub id: ReportId,
    /// Executive summary
    pub summary: String,
    /// Key findings
    pub findings: Vec<String>,
    /// Research recommendation
    pub recommendation: String,
    /// Engineering action plan
    pub action_plan: ActionPlan,
    /// The hypothesis the report was synthesized from
    pub hypothesis: ValidatedHypothesis,
    /// Texts and graphs the run started from
    pub sources: ReportSources,
    /// Accepted or degraded
    pub validation: ValidationStatus,
    /// Refinement iterations used before settling
    pub refinements: usize,
    /// True when synthesis output could not be parsed and a safe
    /// placeholder report was produced instead
    #[serde(default)]
    pub fallback: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ResearchReport {
    /// Create an empty accepted report for a hypothesis
    #[must_use]
    pub fn new(hypothesis: ValidatedHypothesis, sources: ReportSources) -> Self {
        Self {
            id: ReportId::new(),
            summary: String::new(),
            findings: Vec::new(),
            recommendation: String::new(),
            action_plan: ActionPlan::default(),
            hypothesis,
            sources,
            validation: ValidationStatus::Accepted,
            refinements: 0,
            fallback: false,
            created_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_findings(mut self, findings: Vec<String>) -> Self {
        self.findings = findings;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_action_plan(mut self, plan: ActionPlan) -> Self {
        self.action_plan = plan;
        self
    }

    /// Mark as fallback placeholder
    #[inline]
    #[must_use]
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    /// Record how the hypothesis was settled
    ///
    /// A degraded status always surfaces in the summary: the summary is
    /// prefixed with [`DEGRADED_MARKER`] unless it already carries it.
    #[must_use]
    pub fn apply_validation_status(mut self, status: ValidationStatus, refinements: usize) -> Self {
        if status.is_degraded() && !self.summary.starts_with(DEGRADED_MARKER) {
            self.summary = if self.summary.trim().is_empty() {
                DEGRADED_MARKER.to_string()
            } else {
                format!("{DEGRADED_MARKER} {}", self.summary)
            };
        }
        self.validation = status;
        self.refinements = refinements;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.validation.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphRole;
    use crate::mapping::AnalogyMapping;
    use crate::node::{LogicNode, NodeId, OntologyCategory};
    use pretty_assertions::assert_eq;

    fn sources() -> ReportSources {
        let node = |id: &str| LogicNode::new(NodeId::new(id).unwrap(), id, OntologyCategory::Structure);
        ReportSources {
            source_text: "pipe".into(),
            target_text: "wire".into(),
            graph_a: LogicalPropertyGraph::from_parts(GraphRole::Source, vec![node("a1")], vec![])
                .unwrap(),
            graph_b: LogicalPropertyGraph::from_parts(GraphRole::Target, vec![node("b1")], vec![])
                .unwrap(),
        }
    }

    fn report() -> ResearchReport {
        let hypothesis = ValidatedHypothesis::new(AnalogyMapping::new(vec![]), false, 0.3);
        ResearchReport::new(hypothesis, sources()).with_summary("Pipes behave like wires.")
    }

    #[test]
    fn degraded_status_prefixes_summary_once() {
        let status = ValidationStatus::Degraded {
            attempts: 3,
            reason: "confidence 0.30 below 0.80".into(),
        };
        let degraded = report().apply_validation_status(status.clone(), 2);
        assert_eq!(
            degraded.summary,
            "[NOT FULLY VALIDATED] Pipes behave like wires."
        );
        assert!(degraded.is_degraded());
        assert_eq!(degraded.refinements, 2);

        let again = degraded.apply_validation_status(status, 2);
        assert_eq!(again.summary.matches(DEGRADED_MARKER).count(), 1);
    }

    #[test]
    fn accepted_status_leaves_summary() {
        let accepted = report().apply_validation_status(ValidationStatus::Accepted, 0);
        assert_eq!(accepted.summary, "Pipes behave like wires.");
        assert!(!accepted.is_degraded());
    }

    #[test]
    fn status_serializes_tagged() {
        let value = serde_json::to_value(ValidationStatus::Degraded {
            attempts: 2,
            reason: "x".into(),
        })
        .unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["attempts"], 2);
    }

    #[test]
    fn empty_plan() {
        assert!(ActionPlan::default().is_empty());
        let plan = ActionPlan {
            potential_pitfalls: vec!["oscillation".into()],
            ..ActionPlan::default()
        };
        assert!(!plan.is_empty());
    }
}
