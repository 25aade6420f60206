//! Architect: settled hypothesis to research report

use crate::backend::{AgentRole, CompletionRequest, ReasoningBackend};
use crate::capability::{SynthesisRequest, Synthesizer};
use crate::error::SynthesisError;
use crate::prompts;
use crate::response::{parse_json, ResponseError};
use crate::wire::{MappingView, WireReport};
use analogy_graph::{ActionPlan, ResearchReport, ValidationStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const MISSING_SUMMARY: &str = "Summary generation failed.";
const MISSING_RECOMMENDATION: &str = "No recommendation provided.";
const MISSING_FINDINGS: &str = "No structured findings extracted.";

/// Reasoning-backed synthesizer
///
/// An answer that cannot be parsed does not fail the run: a placeholder
/// report flagged as `fallback` asks for manual review instead.
pub struct Architect {
    backend: Arc<dyn ReasoningBackend>,
    system: String,
}

impl Architect {
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            backend,
            system: prompts::architect(),
        }
    }

    fn user_message(request: &SynthesisRequest) -> String {
        let hypothesis = &request.hypothesis;
        let mut context = json!({
            "mapping": MappingView::from(&hypothesis.mapping),
            "critic_confidence": hypothesis.confidence,
            "critic_issues": hypothesis.issues,
            "is_consistent": hypothesis.consistent,
        });
        if let ValidationStatus::Degraded { reason, .. } = &request.status {
            context["validation_warning"] = json!(format!(
                "This analogy was NOT fully validated ({reason}). State the open risks."
            ));
        }

        format!(
            "Synthesize the following validated hypothesis into an engineering report. \
             Include summary, findings, recommendation and a complete action_plan with \
             transferable_mechanisms, technical_roadmap, key_metrics_to_track and \
             potential_pitfalls. Return ONLY the JSON object.\n\n{context:#}"
        )
    }

    fn fallback_reason(err: &ResponseError) -> String {
        match err {
            ResponseError::Empty => "No response from reasoning service.".to_string(),
            ResponseError::NoJsonObject => "No JSON object found.".to_string(),
            ResponseError::Json(e) => format!("JSON decode error: {e}"),
        }
    }

    fn fallback_report(request: &SynthesisRequest, reason: &str) -> ResearchReport {
        ResearchReport::new(request.hypothesis.clone(), request.sources.clone())
            .with_summary(format!("Automated synthesis failed. ({reason})"))
            .with_findings(vec![
                "The system could not parse the synthesis response.".to_string(),
                "Please review the raw logs or the validator's evaluation directly.".to_string(),
            ])
            .with_recommendation("Manual review required.")
            .as_fallback()
    }

    fn report_from(request: &SynthesisRequest, wire: WireReport) -> ResearchReport {
        let or_default = |text: String, default: &str| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed.to_string()
            }
        };
        let findings = if wire.findings.is_empty() {
            vec![MISSING_FINDINGS.to_string()]
        } else {
            wire.findings
        };

        ResearchReport::new(request.hypothesis.clone(), request.sources.clone())
            .with_summary(or_default(wire.summary, MISSING_SUMMARY))
            .with_findings(findings)
            .with_recommendation(or_default(wire.recommendation, MISSING_RECOMMENDATION))
            .with_action_plan(ActionPlan::from(wire.action_plan))
    }
}

#[async_trait::async_trait]
impl Synthesizer for Architect {
    #[instrument(skip_all, fields(hypothesis = %request.hypothesis.id, degraded = request.status.is_degraded()))]
    async fn synthesize(&self, request: SynthesisRequest) -> Result<ResearchReport, SynthesisError> {
        request.check_precondition()?;

        let completion = CompletionRequest::new(
            AgentRole::Architect,
            self.system.as_str(),
            Self::user_message(&request),
        );
        let raw = self.backend.complete(&completion).await?;

        let report = match parse_json::<WireReport>(&raw) {
            Ok(wire) => Self::report_from(&request, wire),
            Err(e) => {
                let reason = Self::fallback_reason(&e);
                warn!(%reason, "synthesis answer unusable, producing fallback report");
                Self::fallback_report(&request, &reason)
            }
        };

        debug!(findings = report.findings.len(), fallback = report.fallback, "report synthesized");
        Ok(request.finish(report))
    }
}
