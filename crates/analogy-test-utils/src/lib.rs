//! Testing utilities for the analogy workspace
//!
//! Deterministic capability doubles, graph fixtures and builders.

#![allow(missing_docs)]

use analogy_agents::{
    AlignmentError, AlignmentRequest, Aligner, ExtractionError, GraphExtractor,
    HypothesisValidator, SynthesisError, SynthesisRequest, Synthesizer, ValidationError,
};
use analogy_core::Capabilities;
use analogy_graph::{
    AnalogyMapping, GraphRole, LogicNode, LogicalPropertyGraph, NodeId, NodeMatch,
    OntologyCategory, ResearchReport, ValidatedHypothesis,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const HYDRAULIC_TEXT: &str =
    "Water pressure drives the flow of water through a pipe. A pump raises the pressure.";

pub const ELECTRICAL_TEXT: &str =
    "Voltage drives the current through a wire. A battery raises the voltage.";

/// Text without any lexicon keyword
pub const STRUCTURELESS_TEXT: &str = "An autumn sonnet about falling leaves and quiet evenings.";

/// Single-sentence texts that share no category under the standard lexicon
pub const UNRELATED_SOURCE_TEXT: &str = "A pump hums quietly in the basement.";
pub const UNRELATED_TARGET_TEXT: &str = "The voltage rating is printed on the label.";

pub fn node(id: &str, label: &str, category: OntologyCategory) -> LogicNode {
    LogicNode::new(NodeId::new(id).unwrap(), label, category)
}

pub fn graph(role: GraphRole, nodes: &[(&str, &str, OntologyCategory)]) -> LogicalPropertyGraph {
    LogicalPropertyGraph::from_parts(
        role,
        nodes.iter().map(|(id, label, category)| node(id, label, *category)).collect(),
        vec![],
    )
    .unwrap()
}

/// Graph A of the textbook example
pub fn hydraulic_graph() -> LogicalPropertyGraph {
    graph(
        GraphRole::Source,
        &[
            ("a1", "Pressure", OntologyCategory::Attribute),
            ("a2", "Water flow", OntologyCategory::Function),
            ("a3", "Pipe", OntologyCategory::Structure),
            ("a4", "Pump", OntologyCategory::Structure),
        ],
    )
}

/// Graph B of the textbook example
pub fn electrical_graph() -> LogicalPropertyGraph {
    graph(
        GraphRole::Target,
        &[
            ("b1", "Voltage", OntologyCategory::Attribute),
            ("b2", "Electric current", OntologyCategory::Function),
            ("b3", "Wire", OntologyCategory::Structure),
            ("b4", "Battery", OntologyCategory::Structure),
        ],
    )
}

pub fn mapping(pairs: &[(&str, &str)]) -> AnalogyMapping {
    AnalogyMapping::new(
        pairs
            .iter()
            .map(|(s, t)| NodeMatch::new(NodeId::new(*s).unwrap(), NodeId::new(*t).unwrap(), ""))
            .collect(),
    )
}

/// Category-respecting pairing of the textbook graphs
pub const HYDRAULIC_PAIRS: [(&str, &str); 4] = [("a1", "b1"), ("a2", "b2"), ("a3", "b3"), ("a4", "b4")];

/// Pairing of the textbook graphs that crosses categories on its first two pairs
pub const CROSSED_PAIRS: [(&str, &str); 3] = [("a1", "b2"), ("a2", "b1"), ("a3", "b3")];

/// Extractor that recognises a fixed keyword lexicon
///
/// Node ids are `a1..` for the source text and `b1..` for the target,
/// numbered in lexicon order.
pub struct LexiconExtractor {
    lexicon: Vec<(&'static str, &'static str, OntologyCategory)>,
    calls: Mutex<usize>,
}

impl LexiconExtractor {
    pub fn new(lexicon: Vec<(&'static str, &'static str, OntologyCategory)>) -> Self {
        Self {
            lexicon,
            calls: Mutex::new(0),
        }
    }

    /// Hydraulic and electrical vocabulary
    pub fn standard() -> Self {
        Self::new(vec![
            ("pressure", "Pressure", OntologyCategory::Attribute),
            ("flow", "Water flow", OntologyCategory::Function),
            ("pipe", "Pipe", OntologyCategory::Structure),
            ("pump", "Pump", OntologyCategory::Structure),
            ("voltage", "Voltage", OntologyCategory::Attribute),
            ("current", "Electric current", OntologyCategory::Function),
            ("wire", "Wire", OntologyCategory::Structure),
            ("battery", "Battery", OntologyCategory::Structure),
        ])
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait::async_trait]
impl GraphExtractor for LexiconExtractor {
    async fn extract(&self, text: &str, role: GraphRole) -> Result<LogicalPropertyGraph, ExtractionError> {
        *self.calls.lock() += 1;
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput { role });
        }

        let prefix = match role {
            GraphRole::Source => "a",
            GraphRole::Target => "b",
        };
        let lowered = text.to_lowercase();
        let nodes: Vec<LogicNode> = self
            .lexicon
            .iter()
            .filter(|(keyword, _, _)| lowered.contains(keyword))
            .enumerate()
            .map(|(i, (_, label, category))| node(&format!("{prefix}{}", i + 1), label, *category))
            .collect();

        if nodes.is_empty() {
            return Err(ExtractionError::EmptyGraph { role });
        }
        LogicalPropertyGraph::from_parts(role, nodes, vec![])
            .map_err(|source| ExtractionError::InvalidGraph { role, source })
    }
}

/// Extractor failing with `EmptyGraph` for one role
pub struct EmptyGraphExtractor {
    pub role: GraphRole,
    inner: LexiconExtractor,
}

impl EmptyGraphExtractor {
    pub fn new(role: GraphRole) -> Self {
        Self {
            role,
            inner: LexiconExtractor::standard(),
        }
    }
}

#[async_trait::async_trait]
impl GraphExtractor for EmptyGraphExtractor {
    async fn extract(&self, text: &str, role: GraphRole) -> Result<LogicalPropertyGraph, ExtractionError> {
        if role == self.role {
            return Err(ExtractionError::EmptyGraph { role });
        }
        self.inner.extract(text, role).await
    }
}

/// Aligner pairing each source node with the first free target node of the
/// same category; refinement requests get the same answer
#[derive(Default)]
pub struct CategoryAligner {
    calls: Mutex<usize>,
}

impl CategoryAligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait::async_trait]
impl Aligner for CategoryAligner {
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        *self.calls.lock() += 1;
        let mut free: Vec<&LogicNode> = request.graph_b.nodes().collect();
        let mut pairs = Vec::new();
        for source in request.graph_a.nodes() {
            if let Some(pos) = free.iter().position(|t| t.category == source.category) {
                let target = free.remove(pos);
                pairs.push(NodeMatch::new(
                    source.id.clone(),
                    target.id.clone(),
                    format!("both are {}", source.category),
                ));
            }
        }

        let mapping = AnalogyMapping::new(pairs).with_score(0.9);
        Ok(match request.previous_mapping {
            Some(previous) => mapping.refining(previous.id()),
            None => mapping,
        })
    }
}

/// Aligner pairing nodes by position, ignoring categories
#[derive(Default)]
pub struct PositionalAligner {
    calls: Mutex<usize>,
}

impl PositionalAligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait::async_trait]
impl Aligner for PositionalAligner {
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        *self.calls.lock() += 1;
        let pairs = request
            .graph_a
            .nodes()
            .zip(request.graph_b.nodes())
            .map(|(s, t)| NodeMatch::new(s.id.clone(), t.id.clone(), "same position"))
            .collect();
        let mapping = AnalogyMapping::new(pairs).with_score(0.5);
        Ok(match request.previous_mapping {
            Some(previous) => mapping.refining(previous.id()),
            None => mapping,
        })
    }
}

/// Aligner replaying a script of pair lists; the last entry repeats
pub struct ScriptedAligner {
    script: Mutex<VecDeque<Vec<(String, String)>>>,
    feedback: Mutex<Vec<Option<String>>>,
}

impl ScriptedAligner {
    pub fn new(script: &[&[(&str, &str)]]) -> Self {
        assert!(!script.is_empty(), "script needs at least one mapping");
        Self {
            script: Mutex::new(
                script
                    .iter()
                    .map(|pairs| pairs.iter().map(|(s, t)| ((*s).to_string(), (*t).to_string())).collect())
                    .collect(),
            ),
            feedback: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.feedback.lock().len()
    }

    /// Feedback received by each call, in order
    pub fn feedback_received(&self) -> Vec<Option<String>> {
        self.feedback.lock().clone()
    }
}

#[async_trait::async_trait]
impl Aligner for ScriptedAligner {
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        self.feedback.lock().push(request.feedback.map(str::to_string));
        let pairs = {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap_or_default()
            } else {
                script.front().cloned().unwrap_or_default()
            }
        };
        let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(s, t)| (s.as_str(), t.as_str())).collect();
        let mapping = mapping(&borrowed);
        Ok(match request.previous_mapping {
            Some(previous) => mapping.refining(previous.id()),
            None => mapping,
        })
    }
}

/// Aligner that sleeps before delegating to [`CategoryAligner`]
pub struct SlowAligner {
    pub delay: Duration,
    inner: CategoryAligner,
}

impl SlowAligner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: CategoryAligner::new(),
        }
    }
}

#[async_trait::async_trait]
impl Aligner for SlowAligner {
    async fn align(&self, request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        tokio::time::sleep(self.delay).await;
        self.inner.align(request).await
    }
}

/// Aligner that always fails with `err`
pub struct FailingAligner {
    pub err: AlignmentError,
}

#[async_trait::async_trait]
impl Aligner for FailingAligner {
    async fn align(&self, _request: AlignmentRequest<'_>) -> Result<AnalogyMapping, AlignmentError> {
        Err(self.err.clone())
    }
}

/// Validator replaying scripted verdicts; the last entry repeats
pub struct ScriptedValidator {
    script: Mutex<VecDeque<Result<(bool, f64), ValidationError>>>,
    seen: Mutex<Vec<AnalogyMapping>>,
}

impl ScriptedValidator {
    pub fn new(script: Vec<Result<(bool, f64), ValidationError>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one verdict");
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Same verdict for every call
    pub fn always(consistent: bool, confidence: f64) -> Self {
        Self::new(vec![Ok((consistent, confidence))])
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    /// Mappings judged so far, in call order
    pub fn seen(&self) -> Vec<AnalogyMapping> {
        self.seen.lock().clone()
    }
}

#[async_trait::async_trait]
impl HypothesisValidator for ScriptedValidator {
    async fn validate(&self, mapping: &AnalogyMapping) -> Result<ValidatedHypothesis, ValidationError> {
        self.seen.lock().push(mapping.clone());
        let next = {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };
        let (consistent, confidence) = next.unwrap_or(Ok((false, 0.0)))?;
        let hypothesis = ValidatedHypothesis::new(mapping.clone(), consistent, confidence);
        Ok(if consistent && confidence >= 0.8 {
            hypothesis
        } else {
            hypothesis.with_feedback(format!("Confidence {confidence:.2}; strengthen the weakest pair."))
        })
    }
}

/// Synthesizer rendering a fixed template from the hypothesis
#[derive(Default)]
pub struct TemplateSynthesizer {
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl TemplateSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl Synthesizer for TemplateSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<ResearchReport, SynthesisError> {
        self.requests.lock().push(request.clone());
        request.check_precondition()?;

        let label = |graph: &LogicalPropertyGraph, id: &NodeId| {
            graph.node(id.as_str()).map_or_else(|| id.to_string(), |n| n.label.clone())
        };
        let findings = request
            .hypothesis
            .mapping
            .pairs()
            .iter()
            .map(|p| {
                format!(
                    "{} corresponds to {}",
                    label(&request.sources.graph_a, &p.source_id),
                    label(&request.sources.graph_b, &p.target_id)
                )
            })
            .collect();

        let report = ResearchReport::new(request.hypothesis.clone(), request.sources.clone())
            .with_summary(format!(
                "{} pair(s) carry the source mechanism into the target domain.",
                request.hypothesis.mapping.len()
            ))
            .with_findings(findings)
            .with_recommendation("Prototype the strongest pair first.");
        Ok(request.finish(report))
    }
}

/// Deterministic capability set over the standard lexicon
pub struct Doubles {
    pub extractor: Arc<LexiconExtractor>,
    pub aligner: Arc<CategoryAligner>,
    pub validator: Arc<ScriptedValidator>,
    pub synthesizer: Arc<TemplateSynthesizer>,
}

impl Doubles {
    pub fn new(validator: ScriptedValidator) -> Self {
        Self {
            extractor: Arc::new(LexiconExtractor::standard()),
            aligner: Arc::new(CategoryAligner::new()),
            validator: Arc::new(validator),
            synthesizer: Arc::new(TemplateSynthesizer::new()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            self.extractor.clone(),
            self.aligner.clone(),
            self.validator.clone(),
            self.synthesizer.clone(),
        )
    }
}
