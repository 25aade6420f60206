//! Analogy Agents - reasoning capabilities of the analogy pipeline
//!
//! Defines one capability trait per pipeline stage and the reasoning-backed
//! implementations:
//!
//! | Agent | Capability | Output |
//! |---|---|---|
//! | [`Scout`] | [`GraphExtractor`] | `LogicalPropertyGraph` |
//! | [`Matcher`] | [`Aligner`] | `AnalogyMapping` |
//! | [`Critic`] | [`HypothesisValidator`] | `ValidatedHypothesis` |
//! | [`Architect`] | [`Synthesizer`] | `ResearchReport` |
//! | [`Visionary`] | [`DomainSuggester`] | source-domain description |
//!
//! All agents share a [`ReasoningBackend`]; [`AzureOpenAiBackend`] is the
//! production implementation.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod architect;
pub mod backend;
mod capability;
mod critic;
mod error;
mod matcher;
mod prompts;
pub mod response;
mod scout;
mod visionary;
mod wire;

#[cfg(test)]
mod testing;

pub use architect::Architect;
pub use backend::{AgentRole, AzureOpenAiBackend, BackendConfig, CompletionRequest, ReasoningBackend};
pub use capability::{
    AlignmentRequest, Aligner, DomainSuggester, GraphExtractor, HypothesisValidator,
    SynthesisRequest, Synthesizer,
};
pub use critic::Critic;
pub use error::{
    AlignmentError, BackendError, ExtractionError, SuggestionError, SynthesisError,
    ValidationError,
};
pub use matcher::Matcher;
pub use scout::Scout;
pub use visionary::Visionary;

use std::sync::Arc;

/// The five reasoning agents over one shared backend
pub struct AgentSet {
    pub scout: Arc<Scout>,
    pub matcher: Arc<Matcher>,
    pub critic: Arc<Critic>,
    pub architect: Arc<Architect>,
    pub visionary: Arc<Visionary>,
}

impl AgentSet {
    /// Build every agent over `backend`
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            scout: Arc::new(Scout::new(Arc::clone(&backend))),
            matcher: Arc::new(Matcher::new(Arc::clone(&backend))),
            critic: Arc::new(Critic::new(Arc::clone(&backend))),
            architect: Arc::new(Architect::new(Arc::clone(&backend))),
            visionary: Arc::new(Visionary::new(backend)),
        }
    }
}
