// crates/pcg_solver/src/pcg.rs

//! Jacobi-preconditioned conjugate gradient on an explicit operator
//!
//! Solves `A·x = b` for a symmetric positive (semi-)definite [`LinearOperator`]
//! with a fixed iteration budget. The CG recursion runs on the calling thread;
//! an optional shared worker pool is used only inside `A·v`, and every product
//! completes before the recursion continues.
//!
//! ```ignore
//! use pcg_solver::{DenseMatrix, PcgSolver};
//!
//! let a = DenseMatrix::from_rows(&[vec![4.0, 0.0], vec![0.0, 9.0]])?;
//! let mut solver = PcgSolver::<f64>::new();
//! let x = solver.solve(1, &a, &[8.0, 27.0], &[])?;
//! assert!((x[0] - 2.0).abs() < 1e-12);
//! ```

use std::sync::Arc;

use pcg_config::SolverConfig;
use pcg_runtime::{PcgError, PcgResult, RuntimeScalar, SolverMetrics};
use rayon::ThreadPool;

use crate::cg::{self, SolveReport, Start};
use crate::operator::LinearOperator;
use crate::pool::build_thread_pool;
use crate::preconditioner::inverse_diagonal_into;
use crate::state::SolverState;

/// PCG driver for explicit operators
pub struct PcgSolver<S: RuntimeScalar> {
    state: SolverState<S>,
    pool: Option<Arc<ThreadPool>>,
    report: SolveReport<S>,
    metrics: SolverMetrics,
    default_iterations: usize,
    log_interval: usize,
}

/// f32 alias
pub type PcgSolverF32 = PcgSolver<f32>;
/// f64 alias
pub type PcgSolverF64 = PcgSolver<f64>;

impl<S: RuntimeScalar> PcgSolver<S> {
    /// Solver whose products run on the calling thread
    pub fn new() -> Self {
        Self {
            state: SolverState::new(),
            pool: None,
            report: SolveReport::default(),
            metrics: SolverMetrics::new(),
            default_iterations: SolverConfig::default().iterations,
            log_interval: 0,
        }
    }

    /// Solver whose products are row-partitioned over `pool`
    pub fn with_thread_pool(pool: Arc<ThreadPool>) -> Self {
        Self {
            pool: Some(pool),
            ..Self::new()
        }
    }

    /// Builds a worker pool and budget from configuration.
    ///
    /// # Errors
    ///
    /// [`PcgError::PreconditionViolation`] for an invalid configuration,
    /// [`PcgError::ThreadPool`] when the pool cannot be built.
    pub fn from_config(config: &SolverConfig) -> PcgResult<Self> {
        config
            .validate()
            .map_err(|e| PcgError::precondition(e.to_string()))?;
        let pool = build_thread_pool(&config.thread_pool)?;
        Ok(Self {
            default_iterations: config.iterations,
            log_interval: config.log_interval,
            ..Self::with_thread_pool(pool)
        })
    }

    /// Solves `A·x = rhs` with at most `iterations` products.
    ///
    /// `x_init` is either empty (start from zero) or of length N (warm start).
    /// Returns a view of the internal iterate, valid until the next call.
    ///
    /// # Errors
    ///
    /// [`PcgError::SizeMismatch`] when `A` is not square, `rhs` is not of
    /// length N, or a non-empty `x_init` is not of length N;
    /// [`PcgError::PreconditionViolation`] when `rhs` or `x_init` holds a
    /// non-finite value. Nothing is mutated in either case.
    pub fn solve<A>(
        &mut self,
        iterations: usize,
        a: &A,
        rhs: &[S],
        x_init: &[S],
    ) -> PcgResult<&[S]>
    where
        A: LinearOperator<S> + ?Sized,
    {
        let n = a.n_rows();
        PcgError::check_len("operator columns", n, a.n_cols())?;
        PcgError::check_len("rhs", n, rhs.len())?;
        PcgError::check_finite("rhs", rhs)?;
        if !x_init.is_empty() {
            PcgError::check_len("x_init", n, x_init.len())?;
            PcgError::check_finite("x_init", x_init)?;
        }
        self.execute(iterations, a, rhs, Start::from_slice(x_init))
    }

    /// [`solve`](Self::solve) with the configured default budget
    pub fn solve_default<A>(&mut self, a: &A, rhs: &[S], x_init: &[S]) -> PcgResult<&[S]>
    where
        A: LinearOperator<S> + ?Sized,
    {
        self.solve(self.default_iterations, a, rhs, x_init)
    }

    /// Continues from the iterate left by the previous call.
    ///
    /// If the dimension changed since then, the iterate restarts from zero.
    pub fn resume<A>(&mut self, iterations: usize, a: &A, rhs: &[S]) -> PcgResult<&[S]>
    where
        A: LinearOperator<S> + ?Sized,
    {
        let n = a.n_rows();
        PcgError::check_len("operator columns", n, a.n_cols())?;
        PcgError::check_len("rhs", n, rhs.len())?;
        PcgError::check_finite("rhs", rhs)?;
        self.execute(iterations, a, rhs, Start::Current)
    }

    fn execute<A>(
        &mut self,
        iterations: usize,
        a: &A,
        rhs: &[S],
        start: Start<'_, S>,
    ) -> PcgResult<&[S]>
    where
        A: LinearOperator<S> + ?Sized,
    {
        let n = rhs.len();
        log::debug!("PCG solve: n = {}, budget = {}", n, iterations);

        self.state.ensure_len(n);
        inverse_diagonal_into(a, &mut self.state.c);

        let pool = self.pool.as_deref();
        let metrics = &self.metrics;
        let mut multiply = |v: &[S], out: &mut [S]| {
            let _timer = metrics.start_multiply();
            a.par_mul_vec(v, out, pool);
        };

        self.report = cg::run(
            &mut self.state,
            rhs,
            start,
            iterations,
            self.log_interval,
            &mut multiply,
        );
        self.metrics.record_solve(self.report.iterations);

        log::debug!(
            "PCG done: {:?} after {} iterations, tol_error = {:.3e}, res_error = {:.3e}",
            self.report.termination,
            self.report.iterations,
            self.report.tol_error.to_f64_lossy(),
            self.report.res_error.to_f64_lossy()
        );
        Ok(&self.state.x)
    }

    /// Current iterate
    pub fn solution(&self) -> &[S] {
        &self.state.x
    }

    /// ‖r‖ / ‖b‖ at the last update of `x`
    pub fn tol_error(&self) -> S {
        self.state.tol_error
    }

    /// ‖r‖ at the last update of `x`
    pub fn res_error(&self) -> S {
        self.state.res_error
    }

    /// Outcome of the last call
    pub fn report(&self) -> &SolveReport<S> {
        &self.report
    }

    /// Accumulated metrics
    pub fn metrics(&self) -> &SolverMetrics {
        &self.metrics
    }

    /// Dimension of the allocated state (0 before the first solve)
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether no solve has allocated state yet
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Shared worker pool, if any
    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.as_ref()
    }

    /// Sets the trace interval (0 disables).
    pub fn set_log_interval(&mut self, log_interval: usize) {
        self.log_interval = log_interval;
    }
}

impl<S: RuntimeScalar> Default for PcgSolver<S> {
    fn default() -> Self {
        Self::new()
    }
}
