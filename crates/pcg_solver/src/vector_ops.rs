// crates/pcg_solver/src/vector_ops.rs

//! Vector kernels (BLAS level 1 style)
//!
//! The building blocks of both conjugate gradient drivers. All functions are
//! generic over `S: RuntimeScalar` and expect equal-length slices.
//!
//! - [`dot`]: x·y
//! - [`norm2_squared`]: ‖x‖²
//! - [`axpy`]: y = α·x + y
//! - [`xpay`]: y = x + α·y
//! - [`hadamard`]: z = x ⊙ y
//! - [`copy`], [`fill`], [`add_assign`]
//!
//! ```ignore
//! use pcg_solver::vector_ops::{axpy, dot};
//!
//! let x = vec![1.0, 2.0, 3.0];
//! let mut y = vec![4.0, 5.0, 6.0];
//! assert_eq!(dot(&x, &y), 32.0);
//! axpy(2.0, &x, &mut y); // y = [6, 9, 12]
//! ```

use pcg_runtime::RuntimeScalar;

/// Dot product x·y
#[inline]
pub fn dot<S: RuntimeScalar>(x: &[S], y: &[S]) -> S {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y.iter()).map(|(&xi, &yi)| xi * yi).sum()
}

/// Squared two-norm ‖x‖²
#[inline]
pub fn norm2_squared<S: RuntimeScalar>(x: &[S]) -> S {
    dot(x, x)
}

/// AXPY: y = α·x + y
#[inline]
pub fn axpy<S: RuntimeScalar>(alpha: S, x: &[S], y: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}

/// XPAY: y = x + α·y
#[inline]
pub fn xpay<S: RuntimeScalar>(x: &[S], alpha: S, y: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = xi + alpha * *yi;
    }
}

/// Element-wise product: z = x ⊙ y
#[inline]
pub fn hadamard<S: RuntimeScalar>(x: &[S], y: &[S], z: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), z.len());
    for ((zi, &xi), &yi) in z.iter_mut().zip(x.iter()).zip(y.iter()) {
        *zi = xi * yi;
    }
}

/// y += x
#[inline]
pub fn add_assign<S: RuntimeScalar>(x: &[S], y: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi += xi;
    }
}

/// y = x
#[inline]
pub fn copy<S: RuntimeScalar>(x: &[S], y: &mut [S]) {
    y.copy_from_slice(x);
}

/// x[:] = α
#[inline]
pub fn fill<S: RuntimeScalar>(alpha: S, x: &mut [S]) {
    x.fill(alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_norm_squared() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 5.0, 6.0];
        assert_eq!(dot(&x, &y), 32.0);
        assert_eq!(norm2_squared(&x), 14.0);
    }

    #[test]
    fn test_axpy_xpay() {
        let x = [1.0, 2.0, 3.0];
        let mut y = [4.0, 5.0, 6.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, [6.0, 9.0, 12.0]);

        let mut p = [1.0, 1.0, 1.0];
        xpay(&x, 0.5, &mut p);
        assert_eq!(p, [1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_hadamard_add_copy_fill() {
        let c = [0.25, 0.5];
        let r = [8.0, 6.0];
        let mut z = [0.0; 2];
        hadamard(&c, &r, &mut z);
        assert_eq!(z, [2.0, 3.0]);

        add_assign(&r, &mut z);
        assert_eq!(z, [10.0, 9.0]);

        copy(&r, &mut z);
        assert_eq!(z, r);

        fill(0.0, &mut z);
        assert_eq!(z, [0.0, 0.0]);
    }
}
