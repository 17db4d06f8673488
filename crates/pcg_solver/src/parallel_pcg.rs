// crates/pcg_solver/src/parallel_pcg.rs

//! Segmented parallel PCG
//!
//! Same recursion as [`crate::PcgSolver`], but `A·v` comes from a
//! [`SegmentedProblem`]: each iteration fans out one task per segment on the
//! shared pool, waits for all of them, and folds the per-segment columns into
//! `q` on the driving thread. Everything else in an iteration is sequential.
//!
//! The solver refuses to exist without a pool; there is no sequential
//! fallback for segmented problems.

use std::sync::Arc;

use pcg_config::SolverConfig;
use pcg_runtime::{PcgError, PcgResult, RuntimeScalar, SolverMetrics};
use rayon::ThreadPool;

use crate::cg::{self, SolveReport, Start};
use crate::pool::build_thread_pool;
use crate::segmented::{SegmentBuffers, SegmentedProblem};
use crate::state::SolverState;
use crate::vector_ops::copy;

/// PCG driver for segmented problems
pub struct ParallelPcgSolver<S: RuntimeScalar> {
    pool: Arc<ThreadPool>,
    state: SolverState<S>,
    buffers: SegmentBuffers<S>,
    report: SolveReport<S>,
    metrics: SolverMetrics,
    default_iterations: usize,
    log_interval: usize,
}

/// f32 alias
pub type ParallelPcgSolverF32 = ParallelPcgSolver<f32>;
/// f64 alias
pub type ParallelPcgSolverF64 = ParallelPcgSolver<f64>;

impl<S: RuntimeScalar> ParallelPcgSolver<S> {
    /// Creates a solver bound to `pool`.
    ///
    /// # Errors
    ///
    /// [`PcgError::PreconditionViolation`] when no pool is given.
    pub fn new(pool: Option<Arc<ThreadPool>>) -> PcgResult<Self> {
        let pool = pool.ok_or_else(|| {
            PcgError::precondition("parallel PCG solver requires a worker pool")
        })?;
        Ok(Self {
            pool,
            state: SolverState::new(),
            buffers: SegmentBuffers::new(),
            report: SolveReport::default(),
            metrics: SolverMetrics::new(),
            default_iterations: SolverConfig::default().iterations,
            log_interval: 0,
        })
    }

    /// Builds its own pool and budget from configuration.
    pub fn from_config(config: &SolverConfig) -> PcgResult<Self> {
        config
            .validate()
            .map_err(|e| PcgError::precondition(e.to_string()))?;
        let pool = build_thread_pool(&config.thread_pool)?;
        let mut solver = Self::new(Some(pool))?;
        solver.default_iterations = config.iterations;
        solver.log_interval = config.log_interval;
        Ok(solver)
    }

    /// Solves `A·x = problem.rhs()` with at most `iterations` products.
    ///
    /// `x_init` is either empty (start from zero) or of length N. Returns a
    /// view of the internal iterate, valid until the next call.
    ///
    /// # Errors
    ///
    /// [`PcgError::PreconditionViolation`] when the problem has no segments
    /// or `rhs`/`x_init` holds a non-finite value,
    /// [`PcgError::SizeMismatch`] when the preconditioner or a non-empty
    /// `x_init` does not match the right-hand side. Nothing is mutated in
    /// either case.
    pub fn solve<P>(&mut self, iterations: usize, problem: &P, x_init: &[S]) -> PcgResult<&[S]>
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        Self::validate(problem)?;
        if !x_init.is_empty() {
            PcgError::check_len("x_init", problem.rhs().len(), x_init.len())?;
            PcgError::check_finite("x_init", x_init)?;
        }
        self.execute(iterations, problem, Start::from_slice(x_init))
    }

    /// [`solve`](Self::solve) with the configured default budget
    pub fn solve_default<P>(&mut self, problem: &P, x_init: &[S]) -> PcgResult<&[S]>
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        self.solve(self.default_iterations, problem, x_init)
    }

    /// Continues from the iterate left by the previous call.
    pub fn resume<P>(&mut self, iterations: usize, problem: &P) -> PcgResult<&[S]>
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        Self::validate(problem)?;
        self.execute(iterations, problem, Start::Current)
    }

    fn validate<P>(problem: &P) -> PcgResult<()>
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        if problem.num_segments() == 0 {
            return Err(PcgError::precondition(
                "segmented problem must have at least one segment",
            ));
        }
        PcgError::check_len(
            "diagonal preconditioner",
            problem.rhs().len(),
            problem.diagonal_preconditioner().len(),
        )?;
        PcgError::check_finite("rhs", problem.rhs())
    }

    fn execute<P>(&mut self, iterations: usize, problem: &P, start: Start<'_, S>) -> PcgResult<&[S]>
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        let rhs = problem.rhs();
        let n = rhs.len();
        let k = problem.num_segments();
        log::debug!(
            "parallel PCG solve: n = {}, segments = {}, budget = {}",
            n,
            k,
            iterations
        );

        self.state.ensure_len(n);
        self.buffers.ensure_shape(n, k);
        copy(problem.diagonal_preconditioner(), &mut self.state.c);

        let pool: &ThreadPool = &self.pool;
        let metrics = &self.metrics;
        let buffers = &mut self.buffers;
        let mut multiply = |v: &[S], out: &mut [S]| {
            let _timer = metrics.start_multiply();
            buffers.fan_out(pool, problem, v);
            buffers.reduce_into(out);
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
            "parallel PCG done: {:?} after {} iterations, tol_error = {:.3e}, res_error = {:.3e}",
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

    /// Segment count of the last solve
    pub fn num_segments(&self) -> usize {
        self.buffers.num_segments()
    }

    /// Shared worker pool
    pub fn thread_pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }

    /// Sets the trace interval (0 disables).
    pub fn set_log_interval(&mut self, log_interval: usize) {
        self.log_interval = log_interval;
    }
}
