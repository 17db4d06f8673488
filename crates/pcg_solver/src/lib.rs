// crates/pcg_solver/src/lib.rs

//! PCG Solver Layer
//!
//! Jacobi-preconditioned conjugate gradient for symmetric positive
//! (semi-)definite systems, with a fixed iteration budget and warm starts.
//!
//! # Solvers
//!
//! - [`PcgSolver`]: explicit operator ([`LinearOperator`]); products
//!   optionally row-partitioned over a shared worker pool
//! - [`ParallelPcgSolver`]: [`SegmentedProblem`] whose product is a sum of K
//!   independent segments, computed concurrently and reduced on the driving
//!   thread
//!
//! Both run the same recursion in [`cg`] and keep their scratch vectors
//! between calls.
//!
//! # Layering
//!
//! ```text
//! pcg_solver   ─> PcgSolver<S>, ParallelPcgSolver<S> (this crate)
//! pcg_config   ─> SolverConfig
//! pcg_runtime  ─> RuntimeScalar, PcgError, SolverMetrics
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cg;
pub mod operator;
pub mod parallel_pcg;
pub mod pcg;
pub mod pool;
pub mod preconditioner;
pub mod segmented;
pub mod state;
pub mod vector_ops;

pub use cg::{SolveReport, Start, Termination};
pub use operator::{DenseMatrix, DenseMatrixF64, DiagonalMatrix, LinearOperator};
pub use parallel_pcg::{ParallelPcgSolver, ParallelPcgSolverF32, ParallelPcgSolverF64};
pub use pcg::{PcgSolver, PcgSolverF32, PcgSolverF64};
pub use pool::{build_thread_pool, parallel_rows, scoped_fan_out};
pub use preconditioner::{apply_diagonal, inverse_diagonal, inverse_diagonal_into};
pub use segmented::{ColumnBlockProblem, SegmentBuffers, SegmentedProblem};
pub use state::SolverState;

pub use pcg_config::{ConfigError, SolverConfig, ThreadPoolConfig};
pub use pcg_runtime::{PcgError, PcgResult, RuntimeScalar, SolverMetrics};

/// Common imports
pub mod prelude {
    pub use crate::{
        ColumnBlockProblem, DenseMatrix, LinearOperator, ParallelPcgSolver, PcgError, PcgResult,
        PcgSolver, RuntimeScalar, SegmentedProblem, SolverConfig,
    };
}
