// crates/pcg_solver/src/operator.rs

//! Explicit linear operators
//!
//! [`LinearOperator`] is the boundary consumed by [`crate::PcgSolver`]: a
//! square matrix-like object with a row kernel and a diagonal accessor. The
//! provided `par_mul_vec` partitions rows across a worker pool and blocks until
//! the product is complete.
//!
//! Two small containers are supplied for callers and tests:
//!
//! - [`DenseMatrix`]: row-major storage
//! - [`DiagonalMatrix`]: diagonal-only storage

use std::ops::Range;

use pcg_runtime::{PcgError, PcgResult, RuntimeScalar};
use rayon::ThreadPool;

use crate::pool::parallel_rows;

/// Matrix-vector product boundary
pub trait LinearOperator<S: RuntimeScalar>: Sync {
    /// Number of rows
    fn n_rows(&self) -> usize;

    /// Number of columns
    fn n_cols(&self) -> usize;

    /// Diagonal entry `A[i][i]`
    fn diagonal_value(&self, i: usize) -> S;

    /// Partial row product `Σ_{j ∈ cols} A[row][j]·x[j]`
    fn row_dot_range(&self, row: usize, x: &[S], cols: Range<usize>) -> S;

    /// Full row product `Σ_j A[row][j]·x[j]`
    #[inline]
    fn row_dot(&self, row: usize, x: &[S]) -> S {
        self.row_dot_range(row, x, 0..self.n_cols())
    }

    /// Whether the operator is square
    fn is_square(&self) -> bool {
        self.n_rows() == self.n_cols()
    }

    /// y = A·x on the calling thread
    fn mul_vec(&self, x: &[S], y: &mut [S]) {
        debug_assert_eq!(x.len(), self.n_cols());
        debug_assert_eq!(y.len(), self.n_rows());
        for (row, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(row, x);
        }
    }

    /// y = A·x, rows spread over `pool` when one is given
    fn par_mul_vec(&self, x: &[S], y: &mut [S], pool: Option<&ThreadPool>) {
        match pool {
            Some(pool) => parallel_rows(pool, y, |row| self.row_dot(row, x)),
            None => self.mul_vec(x, y),
        }
    }
}

// =============================================================================
// DenseMatrix
// =============================================================================

/// Row-major dense matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<S: RuntimeScalar> {
    n_rows: usize,
    n_cols: usize,
    values: Vec<S>,
}

/// f64 alias
pub type DenseMatrixF64 = DenseMatrix<f64>;

impl<S: RuntimeScalar> DenseMatrix<S> {
    /// Zero matrix
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            values: vec![S::ZERO; n_rows * n_cols],
        }
    }

    /// Identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, S::ONE);
        }
        m
    }

    /// Wraps row-major values.
    pub fn from_row_major(n_rows: usize, n_cols: usize, values: Vec<S>) -> PcgResult<Self> {
        PcgError::check_len("matrix values", n_rows * n_cols, values.len())?;
        Ok(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    /// Builds from a slice of equal-length rows.
    pub fn from_rows(rows: &[Vec<S>]) -> PcgResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            PcgError::check_len("matrix row", n_cols, row.len())?;
            values.extend_from_slice(row);
        }
        Ok(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    /// Entry `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> S {
        self.values[row * self.n_cols + col]
    }

    /// Sets entry `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: S) {
        self.values[row * self.n_cols + col] = value;
    }

    /// Row slice
    #[inline]
    pub fn row(&self, row: usize) -> &[S] {
        let start = row * self.n_cols;
        &self.values[start..start + self.n_cols]
    }

    /// Row-major values
    pub fn values(&self) -> &[S] {
        &self.values
    }
}

impl<S: RuntimeScalar> LinearOperator<S> for DenseMatrix<S> {
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn diagonal_value(&self, i: usize) -> S {
        self.get(i, i)
    }

    #[inline]
    fn row_dot_range(&self, row: usize, x: &[S], cols: Range<usize>) -> S {
        let row = self.row(row);
        row[cols.clone()]
            .iter()
            .zip(x[cols].iter())
            .map(|(&a, &xj)| a * xj)
            .sum()
    }
}

// =============================================================================
// DiagonalMatrix
// =============================================================================

/// Diagonal matrix `diag(d)`
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalMatrix<S: RuntimeScalar> {
    diag: Vec<S>,
}

impl<S: RuntimeScalar> DiagonalMatrix<S> {
    /// From diagonal entries
    pub fn new(diag: Vec<S>) -> Self {
        Self { diag }
    }

    /// Diagonal entries
    pub fn diagonal(&self) -> &[S] {
        &self.diag
    }
}

impl<S: RuntimeScalar> LinearOperator<S> for DiagonalMatrix<S> {
    fn n_rows(&self) -> usize {
        self.diag.len()
    }

    fn n_cols(&self) -> usize {
        self.diag.len()
    }

    fn diagonal_value(&self, i: usize) -> S {
        self.diag[i]
    }

    #[inline]
    fn row_dot_range(&self, row: usize, x: &[S], cols: Range<usize>) -> S {
        if cols.contains(&row) {
            self.diag[row] * x[row]
        } else {
            S::ZERO
        }
    }
}
