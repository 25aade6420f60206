//! Plain-text rendering of research reports

use analogy_graph::{ActionPlan, ResearchReport, ValidationStatus};
use std::fmt::Write;

pub(crate) fn report_text(report: &ResearchReport) -> String {
    let mut out = String::new();
    let hypothesis = &report.hypothesis;

    let _ = writeln!(out, "RESEARCH REPORT {}", report.id);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.summary);
    let _ = writeln!(out);

    match &report.validation {
        ValidationStatus::Accepted => {
            let _ = writeln!(out, "Validation: accepted");
        }
        ValidationStatus::Degraded { attempts, reason } => {
            let _ = writeln!(out, "Validation: NOT FULLY VALIDATED after {attempts} attempt(s) ({reason})");
        }
    }
    let _ = writeln!(
        out,
        "Consistent: {}  Confidence: {:.2}  Refinements: {}",
        hypothesis.consistent, hypothesis.confidence, report.refinements
    );
    if report.fallback {
        let _ = writeln!(out, "Synthesis output could not be parsed; manual review required.");
    }

    section(&mut out, "Mapping", hypothesis.mapping.pairs().iter().map(|p| {
        let label = |id: &str, graph: &analogy_graph::LogicalPropertyGraph| {
            graph.node(id).map_or_else(|| id.to_string(), |n| format!("{} ({id})", n.label))
        };
        format!(
            "{} -> {}",
            label(p.source_id.as_str(), &report.sources.graph_a),
            label(p.target_id.as_str(), &report.sources.graph_b)
        )
    }));
    section(&mut out, "Findings", report.findings.iter().cloned());
    if !hypothesis.issues.is_empty() {
        section(&mut out, "Open issues", hypothesis.issues.iter().cloned());
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendation:");
    let _ = writeln!(out, "  {}", report.recommendation);

    if !report.action_plan.is_empty() {
        plan(&mut out, &report.action_plan);
    }
    out
}

fn plan(out: &mut String, plan: &ActionPlan) {
    section(out, "Transferable mechanisms", plan.transferable_mechanisms.iter().cloned());
    section(out, "Technical roadmap", plan.technical_roadmap.iter().cloned());
    section(out, "Key metrics", plan.key_metrics_to_track.iter().cloned());
    section(out, "Potential pitfalls", plan.potential_pitfalls.iter().cloned());
}

fn section(out: &mut String, title: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}
