// crates/pcg_config/src/lib.rs

//! PCG Config Layer
//!
//! Solver configuration with no generic parameters. All values are plain
//! `usize`/`String` and serialize to JSON.
//!
//! # Modules
//!
//! - [`solver_config`]: `SolverConfig`, `ThreadPoolConfig`
//! - [`error`]: `ConfigError`
//!
//! ```
//! use pcg_config::SolverConfig;
//!
//! let config = SolverConfig::from_json_str(r#"{ "iterations": 64 }"#).unwrap();
//! assert_eq!(config.iterations, 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod solver_config;

pub use error::ConfigError;
pub use solver_config::{SolverConfig, ThreadPoolConfig, MAX_THREADS};
