// crates/pcg_config/src/solver_config.rs

//! SolverConfig - solver configuration
//!
//! Plain, generic-free parameters loaded from JSON. Converted to the engine's
//! scalar type only when a solver is built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Upper bound accepted for `thread_pool.num_threads`
pub const MAX_THREADS: usize = 1024;

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Default iteration budget for `solve_default`
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Emit a trace line every `log_interval` iterations (0 disables)
    #[serde(default)]
    pub log_interval: usize,

    /// Worker pool settings
    #[serde(default)]
    pub thread_pool: ThreadPoolConfig,
}

fn default_iterations() -> usize { 200 }

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadPoolConfig {
    /// Worker count (0 = one per logical CPU)
    #[serde(default)]
    pub num_threads: usize,

    /// Worker thread name prefix
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String { "pcg-worker".to_string() }

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            thread_name: default_thread_name(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            log_interval: 0,
            thread_pool: ThreadPoolConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Loads and validates a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_pool.thread_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "thread_pool.thread_name".to_string(),
                value: self.thread_pool.thread_name.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.thread_pool.num_threads > MAX_THREADS {
            return Err(ConfigError::InvalidValue {
                key: "thread_pool.num_threads".to_string(),
                value: self.thread_pool.num_threads.to_string(),
                reason: format!("must be at most {}", MAX_THREADS),
            });
        }

        Ok(())
    }

    /// Writes the configuration as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// Sets the iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the worker count.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.thread_pool.num_threads = num_threads;
        self
    }

    /// Sets the trace interval.
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }
}
