//! Engine configuration
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! environment variables. Loading `.env` files is left to the binary.

use crate::error::ConfigError;
use analogy_agents::BackendConfig;
use analogy_graph::{AcceptancePredicate, DEFAULT_ACCEPTANCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "analogy.toml";

pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_MAX_REFINEMENTS: &str = "ANALOGY_MAX_REFINEMENTS";

/// Refinement loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Refinement iterations after the first alignment
    pub max_refinements: usize,
    /// Minimum confidence for undegraded acceptance
    pub acceptance_threshold: f64,
    /// Deadline of each capability call
    pub stage_timeout_secs: u64,
    /// Extract both texts concurrently
    pub concurrent_extraction: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_refinements: 1,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            stage_timeout_secs: 120,
            concurrent_extraction: true,
        }
    }
}

impl PipelineConfig {
    #[inline]
    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// Acceptance predicate for the configured threshold
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the threshold is outside `[0, 1]`
    pub fn acceptance(&self) -> Result<AcceptancePredicate, ConfigError> {
        AcceptancePredicate::new(self.acceptance_threshold)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pipeline: PipelineConfig,
    pub backend: BackendConfig,
}

impl EngineConfig {
    /// Parse TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for invalid TOML or mistyped values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Parse` if it is not valid
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then `path` (or `analogy.toml` if present), then the
    /// process environment
    ///
    /// # Errors
    /// Returns an error if an explicit file is missing or invalid, or an
    /// environment override cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.with_env(|var| std::env::var(var).ok())
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// # Errors
    /// Returns `ConfigError::Env` if `ANALOGY_MAX_REFINEMENTS` is not a
    /// non-negative integer
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.backend.api_key = key;
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            self.backend.endpoint = endpoint;
        }
        if let Some(deployment) = non_empty(ENV_DEPLOYMENT) {
            self.backend.deployment = deployment;
        }
        if let Some(version) = non_empty(ENV_API_VERSION) {
            self.backend.api_version = version;
        }
        if let Some(raw) = non_empty(ENV_MAX_REFINEMENTS) {
            self.pipeline.max_refinements =
                raw.trim().parse().map_err(|_| ConfigError::Env {
                    var: ENV_MAX_REFINEMENTS,
                    value: raw.clone(),
                })?;
        }
        Ok(self)
    }

    /// Range-check every value; backend fields only when a live backend is used
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the offending value
    pub fn validate(&self, require_backend: bool) -> Result<(), ConfigError> {
        self.pipeline.acceptance()?;
        if self.pipeline.stage_timeout_secs == 0 {
            return Err(ConfigError::Invalid("stage_timeout_secs must be positive".into()));
        }
        if require_backend {
            self.backend
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}
