// crates/pcg_solver/src/cg.rs

//! Preconditioned conjugate gradient recursion
//!
//! Shared by [`crate::PcgSolver`] and [`crate::ParallelPcgSolver`]; the two
//! drivers differ only in how they evaluate `A·v` and where the diagonal
//! preconditioner comes from. The driver passes the product as a closure.
//!
//! # Algorithm
//!
//! ```text
//! r = b - A·x            (x = 0, r = b for a cold start)
//! if ‖b‖² = 0: return x unchanged
//! z = c ⊙ r,  p = z,  δ = r·z
//! threshold = max(min_positive, ‖b‖²·ε²)
//! repeat up to `iterations` times:
//!     q = A·p
//!     α = δ / (p·q)
//!     x += α·p,  r -= α·q
//!     if ‖r‖² < threshold: converged
//!     z = c ⊙ r,  δ' = r·z,  β = δ'/δ,  p = z + β·p
//! ```
//!
//! `tol_error = ‖r‖/‖b‖` and `res_error = ‖r‖` are refreshed once per
//! iteration from the same ‖r‖² that drives the convergence test.

use pcg_runtime::RuntimeScalar;
use serde::Serialize;

use crate::preconditioner::apply_diagonal;
use crate::state::SolverState;
use crate::vector_ops::{axpy, copy, dot, fill, norm2_squared, xpay};

/// Initial iterate
#[derive(Debug, Clone, Copy)]
pub enum Start<'a, S: RuntimeScalar> {
    /// x = 0, r = b
    Zero,
    /// x = guess, r = b - A·guess
    Guess(&'a [S]),
    /// Continue from the iterate kept in the state
    Current,
}

impl<'a, S: RuntimeScalar> Start<'a, S> {
    /// Empty slice means a cold start.
    pub fn from_slice(x_init: &'a [S]) -> Self {
        if x_init.is_empty() {
            Self::Zero
        } else {
            Self::Guess(x_init)
        }
    }
}

/// How a solve ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// ‖b‖ = 0; `x` returned as it was and the residual norms left untouched
    ZeroRightHandSide,
    /// ‖r‖² dropped below the threshold (possibly before the first iteration)
    Converged,
    /// The iteration budget ran out
    Exhausted,
    /// δ / (p·q) is not finite, the recursion cannot continue
    Stagnated,
}

/// Outcome of one `solve` call
///
/// Reports where the state machine stopped; judging the residual against a
/// tolerance is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveReport<S: RuntimeScalar> {
    /// Terminal state
    pub termination: Termination,
    /// Matrix-vector products spent inside the iteration loop
    pub iterations: usize,
    /// ‖r‖ / ‖b‖ at the last update of `x`
    pub tol_error: S,
    /// ‖r‖ at the last update of `x`
    pub res_error: S,
}

impl<S: RuntimeScalar> SolveReport<S> {
    /// Whether the threshold was crossed
    pub fn is_converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

impl<S: RuntimeScalar> Default for SolveReport<S> {
    fn default() -> Self {
        Self {
            termination: Termination::Exhausted,
            iterations: 0,
            tol_error: S::ONE,
            res_error: S::ZERO,
        }
    }
}

/// Runs the recursion on `state`.
///
/// The caller must have sized `state` to `rhs.len()`, filled `state.c`, and
/// validated any guess length. `multiply(v, out)` must write `A·v` into `out`.
pub fn run<S, M>(
    state: &mut SolverState<S>,
    rhs: &[S],
    start: Start<'_, S>,
    iterations: usize,
    log_interval: usize,
    multiply: &mut M,
) -> SolveReport<S>
where
    S: RuntimeScalar,
    M: FnMut(&[S], &mut [S]),
{
    debug_assert_eq!(state.len(), rhs.len());

    match start {
        Start::Zero => {
            fill(S::ZERO, &mut state.x);
            copy(rhs, &mut state.r);
        }
        Start::Guess(guess) => {
            copy(guess, &mut state.x);
            residual(state, rhs, multiply);
        }
        Start::Current => residual(state, rhs, multiply),
    }

    let b_norm_sq = norm2_squared(rhs);
    if b_norm_sq == S::ZERO {
        return SolveReport {
            termination: Termination::ZeroRightHandSide,
            iterations: 0,
            tol_error: state.tol_error,
            res_error: state.res_error,
        };
    }

    let mut residual_sq = norm2_squared(&state.r);
    apply_diagonal(&state.c, &state.r, &mut state.z);
    copy(&state.z, &mut state.p);
    let mut delta = dot(&state.r, &state.p);
    state.tol_error = S::ONE;
    state.res_error = residual_sq.sqrt();

    let threshold = S::MIN_POSITIVE.max(b_norm_sq * S::EPSILON * S::EPSILON);
    if residual_sq < threshold {
        return report(state, Termination::Converged, 0);
    }

    for iter in 1..=iterations {
        multiply(&state.p, &mut state.q);

        // δ and p·q scale together, so only a non-finite ratio is a breakdown
        let pq = dot(&state.p, &state.q);
        let alpha = delta / pq;
        if !alpha.is_finite() {
            log::debug!("PCG stagnated at iteration {}: p·q = {}", iter, pq);
            return report(state, Termination::Stagnated, iter - 1);
        }

        axpy(alpha, &state.p, &mut state.x);
        axpy(-alpha, &state.q, &mut state.r);

        residual_sq = norm2_squared(&state.r);
        if residual_sq < threshold {
            update_errors(state, residual_sq, b_norm_sq);
            return report(state, Termination::Converged, iter);
        }

        apply_diagonal(&state.c, &state.r, &mut state.z);
        let delta_old = delta;
        delta = dot(&state.r, &state.z);
        let beta = delta / delta_old;
        xpay(&state.z, beta, &mut state.p);

        update_errors(state, residual_sq, b_norm_sq);

        if log_interval > 0 && iter % log_interval == 0 {
            log::trace!(
                "PCG iter {}: residual = {:.6e}, relative = {:.6e}",
                iter,
                state.res_error.to_f64_lossy(),
                state.tol_error.to_f64_lossy()
            );
        }
    }

    report(state, Termination::Exhausted, iterations)
}

/// r = b - A·x
fn residual<S, M>(state: &mut SolverState<S>, rhs: &[S], multiply: &mut M)
where
    S: RuntimeScalar,
    M: FnMut(&[S], &mut [S]),
{
    multiply(&state.x, &mut state.r);
    for (ri, &bi) in state.r.iter_mut().zip(rhs.iter()) {
        *ri = bi - *ri;
    }
}

#[inline]
fn update_errors<S: RuntimeScalar>(state: &mut SolverState<S>, residual_sq: S, b_norm_sq: S) {
    state.tol_error = (residual_sq / b_norm_sq).sqrt();
    state.res_error = residual_sq.sqrt();
}

#[inline]
fn report<S: RuntimeScalar>(
    state: &SolverState<S>,
    termination: Termination,
    iterations: usize,
) -> SolveReport<S> {
    SolveReport {
        termination,
        iterations,
        tol_error: state.tol_error,
        res_error: state.res_error,
    }
}
