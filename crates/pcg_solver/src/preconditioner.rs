// crates/pcg_solver/src/preconditioner.rs

//! Jacobi (diagonal) preconditioner
//!
//! M = diag(A), applied as z = c ⊙ r with c = 1 / diag(A).
//!
//! Cheap to build and apply; effective on diagonally dominant systems. Rows
//! whose diagonal is below `MIN_POSITIVE` in magnitude fall back to the
//! identity (c_i = 1) instead of producing an infinite scale.

use pcg_runtime::RuntimeScalar;

use crate::operator::LinearOperator;
use crate::vector_ops::hadamard;

/// Writes `c_i = 1 / A[i][i]` for every row.
pub fn inverse_diagonal_into<S, A>(op: &A, c: &mut [S])
where
    S: RuntimeScalar,
    A: LinearOperator<S> + ?Sized,
{
    debug_assert_eq!(c.len(), op.n_rows());
    for (i, ci) in c.iter_mut().enumerate() {
        *ci = S::ONE.safe_div(op.diagonal_value(i), S::ONE);
    }
}

/// Allocating form of [`inverse_diagonal_into`]
pub fn inverse_diagonal<S, A>(op: &A) -> Vec<S>
where
    S: RuntimeScalar,
    A: LinearOperator<S> + ?Sized,
{
    let mut c = vec![S::ZERO; op.n_rows()];
    inverse_diagonal_into(op, &mut c);
    c
}

/// z = c ⊙ r
#[inline]
pub fn apply_diagonal<S: RuntimeScalar>(c: &[S], r: &[S], z: &mut [S]) {
    hadamard(c, r, z);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{DenseMatrix, DiagonalMatrix};

    #[test]
    fn test_inverse_diagonal() {
        let d = DiagonalMatrix::new(vec![4.0, 9.0, 0.5]);
        let c = inverse_diagonal(&d);
        assert_eq!(c, vec![0.25, 1.0 / 9.0, 2.0]);
    }

    #[test]
    fn test_zero_diagonal_falls_back_to_identity() {
        let mut a = DenseMatrix::<f64>::identity(3);
        a.set(1, 1, 0.0);
        let c = inverse_diagonal(&a);
        assert_eq!(c, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_apply_diagonal() {
        let c = [0.25f32, 1.0 / 9.0];
        let r = [8.0f32, 27.0];
        let mut z = [0.0f32; 2];
        apply_diagonal(&c, &r, &mut z);
        assert!((z[0] - 2.0).abs() < 1e-6);
        assert!((z[1] - 3.0).abs() < 1e-6);
    }
}
