//! Analogy Core - pipeline orchestrator
//!
//! Drives one analogy run end to end:
//! - extracts a typed property graph from each input text
//! - aligns the graphs and gates the mapping through the ontology checker
//! - validates the hypothesis and refines it within a bounded budget
//! - synthesizes the research report, marked degraded when the budget ran out
//!
//! # Example
//!
//! ```rust,ignore
//! use analogy_agents::{AgentSet, AzureOpenAiBackend};
//! use analogy_core::{run_pipeline, Capabilities, EngineConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::load(None)?;
//! let backend = Arc::new(AzureOpenAiBackend::from_config(&config.backend)?);
//! let capabilities = Capabilities::from_agents(&AgentSet::new(backend));
//!
//! let report = run_pipeline(capabilities, "water in pipes", "current in wires", 1).await?;
//! println!("{}", report.summary);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod refinement;
pub mod state;
pub mod trace;

pub use config::{EngineConfig, PipelineConfig, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, PipelineError};
pub use pipeline::{run_pipeline, Capabilities, Pipeline, PipelineOptions, PipelineRun, RunId};
pub use refinement::{Attempt, Decision, RefinementHistory, RefinementPolicy, RetryBudget};
pub use state::{allowed_transitions, is_allowed, validate_transition, PipelineState, Stage};
pub use trace::{RunTrace, StageInvocations, Transition};
