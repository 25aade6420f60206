//! Answer shapes requested from the reasoning backend
//!
//! These are deliberately looser than the model types: ids may arrive as
//! numbers, categories as free strings, lists as comma-separated text.
//! Each agent converts its wire value into checked model values.

use crate::response::lenient_string;
use analogy_graph::{ActionPlan, AnalogyMapping, LogicalPropertyGraph};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Extracted graph (Scout answer)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireGraph {
    /// Logical nodes found in the text
    #[serde(default)]
    pub(crate) nodes: Vec<WireNode>,
    /// Directed relations between node ids
    #[serde(default)]
    pub(crate) edges: Vec<WireEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireNode {
    /// Short unique id such as "a1"
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) id: String,
    /// Human-readable label
    #[serde(default)]
    pub(crate) label: String,
    /// One of STRUCTURE, FUNCTION, ATTRIBUTE
    #[serde(alias = "node_type", alias = "ontology", alias = "type")]
    pub(crate) category: String,
    /// What the node is or does
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireEdge {
    /// Id of the origin node
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) source: String,
    /// Id of the destination node
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) target: String,
    /// Relation label, e.g. "drives"
    #[serde(default)]
    pub(crate) relation: String,
    #[serde(default)]
    pub(crate) properties: serde_json::Map<String, serde_json::Value>,
}

/// Node-to-node mapping (Matcher answer)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireMapping {
    /// Aligned pairs
    #[serde(alias = "pairs")]
    pub(crate) node_matches: Vec<WirePair>,
    /// Overall similarity from 0.0 to 1.0
    #[serde(default)]
    pub(crate) score: f64,
    /// Global explanation of the analogy
    #[serde(default)]
    pub(crate) explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WirePair {
    /// Node id from graph A
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) source_id: String,
    /// Node id from graph B
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) target_id: String,
    /// Why both nodes play the same role
    #[serde(default, alias = "reasoning")]
    pub(crate) rationale: String,
}

/// Consistency verdict (Critic answer)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireVerdict {
    /// False if any pair is a categorical mismatch or implausible
    #[serde(alias = "consistent")]
    pub(crate) is_consistent: bool,
    /// Specific logical flaws or categorical mismatches
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) issues: Vec<String>,
    /// Confidence from 0.0 to 1.0
    #[serde(default)]
    pub(crate) confidence: f64,
    /// Optional guidance for the next alignment
    #[serde(default)]
    pub(crate) feedback: String,
}

/// Engineering report (Architect answer)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireReport {
    /// High-level synthesis of the analogy and its engineering value
    #[serde(default)]
    pub(crate) summary: String,
    /// Mechanism translations and experiment suggestions
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) findings: Vec<String>,
    /// Expert verdict on this engineering direction
    #[serde(default)]
    pub(crate) recommendation: String,
    #[serde(default, deserialize_with = "lenient_plan")]
    pub(crate) action_plan: WireActionPlan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub(crate) struct WireActionPlan {
    /// Algorithms, formulas or logic to copy from source to target
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) transferable_mechanisms: Vec<String>,
    /// "Step 1: ...", "Step 2: ..."
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) technical_roadmap: Vec<String>,
    /// KPIs to measure success
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) key_metrics_to_track: Vec<String>,
    /// Technical risks
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) potential_pitfalls: Vec<String>,
}

impl From<WireActionPlan> for ActionPlan {
    fn from(plan: WireActionPlan) -> Self {
        Self {
            transferable_mechanisms: plan.transferable_mechanisms,
            technical_roadmap: plan.technical_roadmap,
            key_metrics_to_track: plan.key_metrics_to_track,
            potential_pitfalls: plan.potential_pitfalls,
        }
    }
}

/// Prompt view of a graph (ids, labels, categories, relations)
#[derive(Debug, Serialize)]
pub(crate) struct GraphView<'a> {
    nodes: Vec<NodeView<'a>>,
    edges: Vec<EdgeView<'a>>,
}

#[derive(Debug, Serialize)]
struct NodeView<'a> {
    id: &'a str,
    label: &'a str,
    category: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct EdgeView<'a> {
    source: &'a str,
    target: &'a str,
    relation: &'a str,
}

impl<'a> From<&'a LogicalPropertyGraph> for GraphView<'a> {
    fn from(graph: &'a LogicalPropertyGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|n| NodeView {
                    id: n.id.as_str(),
                    label: &n.label,
                    category: n.category.as_str(),
                    description: &n.description,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| EdgeView {
                    source: e.source.as_str(),
                    target: e.target.as_str(),
                    relation: &e.relation,
                })
                .collect(),
        }
    }
}

/// Prompt view of a mapping, with annotated categories
#[derive(Debug, Serialize)]
pub(crate) struct MappingView<'a> {
    node_matches: Vec<PairView<'a>>,
    score: f64,
    #[serde(skip_serializing_if = "str::is_empty")]
    explanation: &'a str,
}

#[derive(Debug, Serialize)]
struct PairView<'a> {
    source_id: &'a str,
    target_id: &'a str,
    rationale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_ontology: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_ontology: Option<&'static str>,
}

impl<'a> From<&'a AnalogyMapping> for MappingView<'a> {
    fn from(mapping: &'a AnalogyMapping) -> Self {
        Self {
            node_matches: mapping
                .pairs()
                .iter()
                .map(|p| PairView {
                    source_id: p.source_id.as_str(),
                    target_id: p.target_id.as_str(),
                    rationale: &p.rationale,
                    source_ontology: p.source_category.map(|c| c.as_str()),
                    target_ontology: p.target_category.map(|c| c.as_str()),
                })
                .collect(),
            score: mapping.score(),
            explanation: mapping.explanation(),
        }
    }
}

/// A list of strings, or one string split on newlines and commas
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .replace('\n', ",")
            .split(',')
            .map(str::to_string)
            .collect(),
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect(),
        other => vec![other.to_string()],
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// An action plan object; anything else becomes an empty plan
fn lenient_plan<'de, D>(deserializer: D) -> Result<WireActionPlan, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn graph_accepts_aliases_and_numeric_ids() {
        let raw = r#"{
            "nodes": [{"id": 1, "label": "Pump", "node_type": "STRUCTURE"}],
            "edges": [{"source": 1, "target": "1", "relation": "self"}]
        }"#;
        let graph: WireGraph = serde_json::from_str(raw).unwrap();
        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[0].category, "STRUCTURE");
        assert_eq!(graph.edges[0].source, "1");
    }

    #[test]
    fn mapping_accepts_reasoning_alias() {
        let raw = r#"{"node_matches": [{"source_id": "a1", "target_id": "b1", "reasoning": "same"}], "score": 0.9}"#;
        let mapping: WireMapping = serde_json::from_str(raw).unwrap();
        assert_eq!(mapping.node_matches[0].rationale, "same");
        assert!(mapping.explanation.is_empty());
    }

    #[test]
    fn verdict_requires_consistency_flag() {
        assert!(serde_json::from_str::<WireVerdict>(r#"{"confidence": 0.9}"#).is_err());
        let verdict: WireVerdict =
            serde_json::from_str(r#"{"is_consistent": true, "issues": "one\ntwo", "confidence": 0.7}"#)
                .unwrap();
        assert_eq!(verdict.issues, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn report_tolerates_bad_action_plan() {
        let raw = r#"{"summary": "s", "findings": ["x", null, " "], "action_plan": "later"}"#;
        let report: WireReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.findings, vec!["x".to_string()]);
        assert!(ActionPlan::from(report.action_plan).is_empty());
    }
}
