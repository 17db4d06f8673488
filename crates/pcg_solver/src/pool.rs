// crates/pcg_solver/src/pool.rs

//! Worker pool helpers
//!
//! The solvers consume a shared `rayon::ThreadPool`; they never own its
//! lifecycle beyond holding an `Arc`. Two primitives are built on it:
//!
//! - [`parallel_rows`]: partitions an output index range into chunks and fills
//!   them on the pool (the kernel behind `LinearOperator::par_mul_vec`)
//! - [`scoped_fan_out`]: launches one task per buffer column and joins them
//!   all before returning
//!
//! Both block the caller until every task has finished. Tasks only borrow
//! caller data, so none can outlive the call that spawned it.

use std::sync::Arc;

use pcg_config::ThreadPoolConfig;
use pcg_runtime::{PcgError, PcgResult, RuntimeScalar};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Rows handled per parallel chunk
pub const ROW_CHUNK: usize = 256;

/// Builds a worker pool from configuration.
pub fn build_thread_pool(config: &ThreadPoolConfig) -> PcgResult<Arc<ThreadPool>> {
    let prefix = config.thread_name.clone();
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .thread_name(move |i| format!("{}-{}", prefix, i))
        .build()
        .map_err(|e| PcgError::ThreadPool {
            message: e.to_string(),
        })?;

    log::debug!(
        "built worker pool '{}' with {} threads",
        config.thread_name,
        pool.current_num_threads()
    );
    Ok(Arc::new(pool))
}

/// Fills `out[i] = f(i)` for every index, chunked across the pool.
///
/// Returns once every chunk is written.
pub fn parallel_rows<S, F>(pool: &ThreadPool, out: &mut [S], f: F)
where
    S: RuntimeScalar,
    F: Fn(usize) -> S + Sync,
{
    pool.install(|| {
        out.par_chunks_mut(ROW_CHUNK)
            .enumerate()
            .for_each(|(chunk, rows)| {
                let start = chunk * ROW_CHUNK;
                for (k, row) in rows.iter_mut().enumerate() {
                    *row = f(start + k);
                }
            });
    });
}

/// Runs `task(k, &mut columns[k])` for every column on the pool and waits for
/// all of them.
///
/// Each task gets exclusive access to its own column and nothing else. If a
/// task panics, the panic is resumed on the caller after the remaining tasks
/// have joined.
pub fn scoped_fan_out<S, F>(pool: &ThreadPool, columns: &mut [Vec<S>], task: F)
where
    S: RuntimeScalar,
    F: Fn(usize, &mut [S]) + Sync,
{
    let task = &task;
    pool.scope(|scope| {
        for (segment, column) in columns.iter_mut().enumerate() {
            scope.spawn(move |_| task(segment, column.as_mut_slice()));
        }
    });
}
