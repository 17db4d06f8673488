// crates/pcg_solver/src/segmented.rs

//! Segmented matrix-vector products
//!
//! A [`SegmentedProblem`] never materialises `A`. It splits `A·v` into
//! `num_segments()` partial contributions that can be computed independently
//! and sum to the full product. [`SegmentBuffers`] holds one private output
//! column per segment, so the contributions can be written concurrently
//! without locking and then folded on one thread.
//!
//! [`ColumnBlockProblem`] adapts any explicit [`LinearOperator`] by splitting
//! its columns into contiguous blocks.

use std::ops::Range;

use pcg_runtime::{PcgError, PcgResult, RuntimeScalar};
use rayon::ThreadPool;

use crate::operator::LinearOperator;
use crate::pool::scoped_fan_out;
use crate::preconditioner::inverse_diagonal;
use crate::vector_ops::{add_assign, copy};

/// Problem whose operator is a sum of independently computable segments
pub trait SegmentedProblem<S: RuntimeScalar>: Sync {
    /// Right-hand side, length N
    fn rhs(&self) -> &[S];

    /// Precomputed diagonal preconditioner `c`, length N
    fn diagonal_preconditioner(&self) -> &[S];

    /// Number of segments K (must be at least 1)
    fn num_segments(&self) -> usize;

    /// Writes segment `segment`'s contribution to `A·input` into `out`.
    ///
    /// `out` has length N and arrives zeroed, so implementations may either
    /// assign or accumulate. Called concurrently for different segments; an
    /// implementation must not touch any state shared with other segments
    /// mutably.
    fn matrix_multiply(&self, out: &mut [S], segment: usize, input: &[S]);
}

// =============================================================================
// SegmentBuffers
// =============================================================================

/// One output column per segment
#[derive(Debug, Clone, Default)]
pub struct SegmentBuffers<S: RuntimeScalar> {
    columns: Vec<Vec<S>>,
}

impl<S: RuntimeScalar> SegmentBuffers<S> {
    /// No columns yet
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Number of columns K
    pub fn num_segments(&self) -> usize {
        self.columns.len()
    }

    /// Column length N
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Whether no column is allocated
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column `segment`
    pub fn column(&self, segment: usize) -> &[S] {
        &self.columns[segment]
    }

    /// Reshapes to K columns of length N when either changed.
    ///
    /// Returns whether a reallocation happened.
    pub fn ensure_shape(&mut self, n: usize, k: usize) -> bool {
        if self.columns.len() == k && self.len() == n {
            return false;
        }
        log::debug!(
            "segment buffers resized {}x{} -> {}x{}",
            self.len(),
            self.columns.len(),
            n,
            k
        );
        self.columns = vec![vec![S::ZERO; n]; k];
        true
    }

    /// Computes every segment's contribution to `A·input` on `pool`.
    ///
    /// Blocks until all K tasks have finished.
    pub fn fan_out<P>(&mut self, pool: &ThreadPool, problem: &P, input: &[S])
    where
        P: SegmentedProblem<S> + ?Sized,
    {
        scoped_fan_out(pool, &mut self.columns, |segment, column| {
            column.fill(S::ZERO);
            problem.matrix_multiply(column, segment, input);
        });
    }

    /// Folds columns `1..K` into column 0 in order and copies the sum to `out`.
    pub fn reduce_into(&mut self, out: &mut [S]) {
        if let Some((first, rest)) = self.columns.split_first_mut() {
            for column in rest.iter() {
                add_assign(column, first);
            }
            copy(first, out);
        }
    }
}

// =============================================================================
// ColumnBlockProblem
// =============================================================================

/// Splits an explicit operator into K contiguous column blocks
///
/// Segment `k` computes `A[:, block_k]·v[block_k]` with
/// `block_k = [k·N/K, (k+1)·N/K)`; the segments sum exactly to `A·v`. With
/// `K > N` the surplus segments contribute zero.
pub struct ColumnBlockProblem<'a, S: RuntimeScalar, A: LinearOperator<S> + ?Sized> {
    operator: &'a A,
    rhs: &'a [S],
    inv_diag: Vec<S>,
    segments: usize,
}

impl<'a, S, A> ColumnBlockProblem<'a, S, A>
where
    S: RuntimeScalar,
    A: LinearOperator<S> + ?Sized,
{
    /// Wraps `operator` and `rhs` into `segments` column blocks.
    ///
    /// # Errors
    ///
    /// [`PcgError::PreconditionViolation`] for zero segments,
    /// [`PcgError::SizeMismatch`] for a non-square operator or a wrong-length
    /// right-hand side.
    pub fn new(operator: &'a A, rhs: &'a [S], segments: usize) -> PcgResult<Self> {
        if segments == 0 {
            return Err(PcgError::precondition("at least one segment is required"));
        }
        let n = operator.n_rows();
        PcgError::check_len("operator columns", n, operator.n_cols())?;
        PcgError::check_len("rhs", n, rhs.len())?;

        Ok(Self {
            operator,
            rhs,
            inv_diag: inverse_diagonal(operator),
            segments,
        })
    }

    /// Column range of `segment`
    pub fn block(&self, segment: usize) -> Range<usize> {
        let n = self.rhs.len();
        (segment * n / self.segments)..((segment + 1) * n / self.segments)
    }
}

impl<'a, S, A> SegmentedProblem<S> for ColumnBlockProblem<'a, S, A>
where
    S: RuntimeScalar,
    A: LinearOperator<S> + ?Sized,
{
    fn rhs(&self) -> &[S] {
        self.rhs
    }

    fn diagonal_preconditioner(&self) -> &[S] {
        &self.inv_diag
    }

    fn num_segments(&self) -> usize {
        self.segments
    }

    fn matrix_multiply(&self, out: &mut [S], segment: usize, input: &[S]) {
        let cols = self.block(segment);
        if cols.is_empty() {
            return;
        }
        for (row, o) in out.iter_mut().enumerate() {
            *o = self.operator.row_dot_range(row, input, cols.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::DenseMatrix;
    use rayon::ThreadPoolBuilder;

    fn sample() -> DenseMatrix<f64> {
        DenseMatrix::from_rows(&[
            vec![4.0, -1.0, 0.0, 0.5],
            vec![-1.0, 5.0, -1.0, 0.0],
            vec![0.0, -1.0, 6.0, -1.0],
            vec![0.5, 0.0, -1.0, 7.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_blocks_partition_columns() {
        let a = sample();
        let b = [1.0; 4];
        let problem = ColumnBlockProblem::new(&a, &b, 3).unwrap();
        assert_eq!(problem.block(0), 0..1);
        assert_eq!(problem.block(1), 1..2);
        assert_eq!(problem.block(2), 2..4);

        let wide = ColumnBlockProblem::new(&a, &b, 6).unwrap();
        let covered: usize = (0..6).map(|k| wide.block(k).len()).sum();
        assert_eq!(covered, 4);
    }

    #[test]
    fn test_fan_out_and_reduce_equals_product() {
        let a = sample();
        let b = [1.0, 2.0, 3.0, 4.0];
        let v = [0.5, -1.0, 2.0, 0.25];
        let mut expected = [0.0; 4];
        a.mul_vec(&v, &mut expected);

        let pool = ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        for k in [1, 2, 4, 5] {
            let problem = ColumnBlockProblem::new(&a, &b, k).unwrap();
            let mut buffers = SegmentBuffers::new();
            buffers.ensure_shape(4, k);
            buffers.fan_out(&pool, &problem, &v);

            let mut out = [0.0; 4];
            buffers.reduce_into(&mut out);
            for (o, e) in out.iter().zip(expected.iter()) {
                assert!((o - e).abs() < 1e-12, "K = {}", k);
            }
        }
    }

    #[test]
    fn test_columns_are_zeroed_before_each_segment() {
        struct Accumulating;
        impl SegmentedProblem<f64> for Accumulating {
            fn rhs(&self) -> &[f64] {
                &[1.0, 1.0]
            }
            fn diagonal_preconditioner(&self) -> &[f64] {
                &[1.0, 1.0]
            }
            fn num_segments(&self) -> usize {
                2
            }
            fn matrix_multiply(&self, out: &mut [f64], _segment: usize, input: &[f64]) {
                for (o, &v) in out.iter_mut().zip(input.iter()) {
                    *o += v;
                }
            }
        }

        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let mut buffers = SegmentBuffers::new();
        buffers.ensure_shape(2, 2);
        let mut out = [0.0; 2];
        for _ in 0..3 {
            buffers.fan_out(&pool, &Accumulating, &[1.0, 2.0]);
            buffers.reduce_into(&mut out);
        }
        assert_eq!(out, [2.0, 4.0]);
    }

    #[test]
    fn test_ensure_shape() {
        let mut buffers = SegmentBuffers::<f32>::new();
        assert!(buffers.is_empty());
        assert!(buffers.ensure_shape(5, 3));
        assert!(!buffers.ensure_shape(5, 3));
        assert_eq!(buffers.num_segments(), 3);
        assert_eq!(buffers.len(), 5);
        assert!(buffers.ensure_shape(5, 2));
        assert_eq!(buffers.column(1).len(), 5);
    }

    #[test]
    fn test_invalid_construction() {
        let a = sample();
        let b = [1.0; 4];
        assert!(ColumnBlockProblem::new(&a, &b, 0)
            .err()
            .is_some_and(|e| e.is_precondition_violation()));
        assert!(ColumnBlockProblem::new(&a, &b[..3], 2)
            .err()
            .is_some_and(|e| e.is_size_mismatch()));
    }
}
