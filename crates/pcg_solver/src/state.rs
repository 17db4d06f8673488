// crates/pcg_solver/src/state.rs

//! Solver scratch state
//!
//! One struct of independently named, equal-length vectors per solver
//! instance. It is reallocated only when the problem size changes, so `x`
//! survives between calls and can seed a warm start.

use pcg_runtime::RuntimeScalar;

/// CG scratch vectors and residual scalars
#[derive(Debug, Clone)]
pub struct SolverState<S: RuntimeScalar> {
    /// Iterate
    pub x: Vec<S>,
    /// Residual b - A·x
    pub r: Vec<S>,
    /// Search direction
    pub p: Vec<S>,
    /// Product buffer A·p
    pub q: Vec<S>,
    /// Preconditioned residual c ⊙ r
    pub z: Vec<S>,
    /// Diagonal preconditioner
    pub c: Vec<S>,
    /// Relative residual norm ‖r‖ / ‖b‖
    pub tol_error: S,
    /// Absolute residual norm ‖r‖
    pub res_error: S,
}

impl<S: RuntimeScalar> SolverState<S> {
    /// Empty state; vectors are sized by the first solve.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            r: Vec::new(),
            p: Vec::new(),
            q: Vec::new(),
            z: Vec::new(),
            c: Vec::new(),
            tol_error: S::ONE,
            res_error: S::ZERO,
        }
    }

    /// Current dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether nothing has been allocated yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Resizes every vector to `n` (zeroed) when the dimension changed.
    ///
    /// Returns whether a reallocation happened.
    pub fn ensure_len(&mut self, n: usize) -> bool {
        if self.x.len() == n {
            return false;
        }
        log::debug!("solver state resized {} -> {}", self.x.len(), n);
        self.x = vec![S::ZERO; n];
        self.r = vec![S::ZERO; n];
        self.p = vec![S::ZERO; n];
        self.q = vec![S::ZERO; n];
        self.z = vec![S::ZERO; n];
        self.c = vec![S::ZERO; n];
        true
    }
}

impl<S: RuntimeScalar> Default for SolverState<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = SolverState::<f64>::new();
        assert!(state.is_empty());
        assert_eq!(state.tol_error, 1.0);
        assert_eq!(state.res_error, 0.0);
    }

    #[test]
    fn test_ensure_len_keeps_values_for_same_size() {
        let mut state = SolverState::<f32>::new();
        assert!(state.ensure_len(4));
        state.x[2] = 5.0;

        assert!(!state.ensure_len(4));
        assert_eq!(state.x[2], 5.0);

        assert!(state.ensure_len(3));
        assert_eq!(state.len(), 3);
        for v in [&state.x, &state.r, &state.p, &state.q, &state.z, &state.c] {
            assert_eq!(v.len(), 3);
            assert!(v.iter().all(|&e| e == 0.0));
        }
    }
}
