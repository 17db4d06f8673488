// crates/pcg_runtime/src/lib.rs

//! PCG Runtime Layer
//!
//! Runtime abstractions shared by the solver crates.
//!
//! # Modules
//!
//! - [`scalar`]: `RuntimeScalar` (sealed, f32/f64 only)
//! - [`error`]: `PcgError` / `PcgResult`
//! - [`metrics`]: atomic counters, timers and `SolverMetrics`
//!
//! # Layering
//!
//! ```text
//! pcg_solver   ─> PcgSolver<S>, ParallelPcgSolver<S>
//! pcg_config   ─> SolverConfig (no generics)
//! pcg_runtime  ─> RuntimeScalar, PcgError, SolverMetrics (this crate)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod metrics;
pub mod scalar;

pub use error::{PcgError, PcgResult};
pub use metrics::{Counter, MetricsSnapshot, SolverMetrics, Timer, TimerGuard};
pub use scalar::RuntimeScalar;

/// Common imports
pub mod prelude {
    pub use crate::{PcgError, PcgResult, RuntimeScalar, SolverMetrics};
}
