//! Full pipeline over the reasoning-backed agents with a scripted backend

use analogy_agents::{AgentRole, AgentSet, BackendError, CompletionRequest, ReasoningBackend};
use analogy_core::{Capabilities, Pipeline, PipelineError, PipelineOptions};
use analogy_graph::{GraphRole, HypothesisOrigin, OntologyCategory, DEGRADED_MARKER};
use analogy_test_utils::{ELECTRICAL_TEXT, HYDRAULIC_TEXT};
use parking_lot::Mutex;
use std::sync::Arc;

const SOURCE_GRAPH: &str = r#"{"nodes": [
    {"id": "a1", "label": "Pressure", "category": "ATTRIBUTE"},
    {"id": "a2", "label": "Water flow", "category": "FUNCTION"},
    {"id": "a3", "label": "Pipe", "category": "STRUCTURE"}
], "edges": [{"source": "a1", "target": "a2", "relation": "drives"}]}"#;

const TARGET_GRAPH: &str = r#"```json
{"nodes": [
    {"id": "b1", "label": "Voltage", "node_type": "[ATTRIBUTE]"},
    {"id": "b2", "label": "Electric current", "node_type": "[FUNCTION]"},
    {"id": "b3", "label": "Wire", "node_type": "[STRUCTURE]"}
], "edges": []}
```"#;

const MAPPING: &str = r#"Here is the mapping:
{"node_matches": [
    {"source_id": "a1", "target_id": "b1", "reasoning": "potential difference"},
    {"source_id": "a2", "target_id": "b2", "reasoning": "what moves"},
    {"source_id": "a3", "target_id": "b9", "reasoning": "hallucinated id"}
], "score": 0.9, "explanation": "Ohm's law mirrors Poiseuille flow"}"#;

const REPORT: &str = r#"{"summary": "Hydraulic intuition transfers to circuits.",
    "findings": ["Pressure behaves like voltage"],
    "recommendation": "Teach circuits with water models.",
    "action_plan": {"technical_roadmap": ["Build a water circuit demo"]}}"#;

/// Backend answering by agent role
struct ScriptedBackend {
    critic: &'static str,
    architect: &'static str,
    log: Mutex<Vec<AgentRole>>,
}

impl ScriptedBackend {
    fn new(critic: &'static str, architect: &'static str) -> Self {
        Self {
            critic,
            architect,
            log: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self, role: AgentRole) -> usize {
        self.log.lock().iter().filter(|r| **r == role).count()
    }
}

#[async_trait::async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.log.lock().push(request.agent);
        let answer = match request.agent {
            AgentRole::Scout if request.user.contains("source text") => SOURCE_GRAPH,
            AgentRole::Scout => TARGET_GRAPH,
            AgentRole::Matcher => MAPPING,
            AgentRole::Critic => self.critic,
            AgentRole::Architect => self.architect,
            AgentRole::Visionary => return Err(BackendError::Payload("unexpected".into())),
        };
        Ok(answer.to_string())
    }
}

fn pipeline(backend: &Arc<ScriptedBackend>) -> Pipeline {
    let agents = AgentSet::new(backend.clone());
    Pipeline::new(Capabilities::from_agents(&agents), PipelineOptions::default())
}

#[tokio::test]
async fn test_agents_accept_textbook_analogy() {
    let backend = Arc::new(ScriptedBackend::new(
        r#"{"is_consistent": true, "issues": [], "confidence": 0.91}"#,
        REPORT,
    ));
    let run = pipeline(&backend)
        .run_traced(HYDRAULIC_TEXT, ELECTRICAL_TEXT, 1)
        .await
        .unwrap();

    assert!(!run.report.is_degraded());
    assert!(!run.report.fallback);
    assert_eq!(run.report.summary, "Hydraulic intuition transfers to circuits.");
    assert_eq!(run.report.action_plan.technical_roadmap, vec!["Build a water circuit demo"]);

    // The dangling pair was pruned; the rest carry categories from the graphs
    let pairs = run.report.hypothesis.mapping.pairs();
    assert_eq!(pairs.len(), 2);
    assert!(run
        .report
        .hypothesis
        .mapping
        .is_resolvable(&run.report.sources.graph_a, &run.report.sources.graph_b));
    assert_eq!(pairs[0].target_category, Some(OntologyCategory::Attribute));

    assert_eq!(backend.calls(AgentRole::Scout), 2);
    assert_eq!(backend.calls(AgentRole::Matcher), 1);
    assert_eq!(backend.calls(AgentRole::Critic), 1);
    assert_eq!(backend.calls(AgentRole::Architect), 1);
}

#[tokio::test]
async fn test_agents_degrade_with_fallback_report() {
    let backend = Arc::new(ScriptedBackend::new(
        r#"{"is_consistent": true, "issues": ["weak structural link"], "confidence": 0.4}"#,
        "I cannot produce JSON today.",
    ));
    let run = pipeline(&backend)
        .run_traced(HYDRAULIC_TEXT, ELECTRICAL_TEXT, 1)
        .await
        .unwrap();

    assert!(run.report.is_degraded());
    assert!(run.report.fallback);
    assert!(run.report.summary.starts_with(DEGRADED_MARKER));
    assert!(run.report.summary.contains("No JSON object found."));
    assert_eq!(run.report.recommendation, "Manual review required.");

    // The matcher repeated itself; the critic was not asked twice
    assert_eq!(backend.calls(AgentRole::Matcher), 2);
    assert_eq!(backend.calls(AgentRole::Critic), 1);
    let last = run.history.latest().unwrap();
    assert_eq!(last.hypothesis.origin, HypothesisOrigin::RepeatedMapping);
}

#[tokio::test]
async fn test_agents_surface_extraction_failure() {
    struct Silent;

    #[async_trait::async_trait]
    impl ReasoningBackend for Silent {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
            match request.agent {
                AgentRole::Scout if request.user.contains("target text") => {
                    Ok(r#"{"nodes": [], "edges": []}"#.to_string())
                }
                AgentRole::Scout => Ok(SOURCE_GRAPH.to_string()),
                _ => Err(BackendError::Connection("should not be reached".into())),
            }
        }
    }

    let agents = AgentSet::new(Arc::new(Silent));
    let err = Pipeline::new(Capabilities::from_agents(&agents), PipelineOptions::default())
        .run(HYDRAULIC_TEXT, ELECTRICAL_TEXT, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Extraction { role: GraphRole::Target, .. }));
    assert!(!err.is_retryable());
}
