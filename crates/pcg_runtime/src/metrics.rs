// crates/pcg_runtime/src/metrics.rs

//! Solver metrics
//!
//! Lock-free counters and accumulating timers. A solver owns one
//! [`SolverMetrics`] and bumps it from the driving thread; the atomics keep it
//! shareable with monitoring code through `&SolverMetrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Atomic counter
#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Zeroed counter
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increments by one.
    #[inline]
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments by `n`.
    #[inline]
    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Current value
    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Resets to zero.
    #[inline]
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Timer
// =============================================================================

/// Accumulating timer
///
/// ```rust
/// use pcg_runtime::metrics::Timer;
///
/// let timer = Timer::new();
/// {
///     let _guard = timer.start();
///     std::thread::sleep(std::time::Duration::from_millis(1));
/// }
/// assert!(timer.total_sec() > 0.0);
/// ```
#[derive(Debug)]
pub struct Timer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Timer {
    /// Zeroed timer
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Starts a measurement; the elapsed time is recorded when the guard drops.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            start: Instant::now(),
        }
    }

    fn record(&self, elapsed: Duration) {
        self.total_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total time in seconds
    pub fn total_sec(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1_000_000_000.0
    }

    /// Mean time per measurement in microseconds
    pub fn avg_us(&self) -> f64 {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            self.total_ns.load(Ordering::Relaxed) as f64 / count as f64 / 1_000.0
        }
    }

    /// Resets time and count.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Records into its [`Timer`] on drop.
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    start: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Serializable view of [`SolverMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Completed `solve` calls
    pub solves: u64,
    /// CG iterations across all solves
    pub iterations: u64,
    /// Matrix-vector products (including initial residuals)
    pub multiplies: u64,
    /// Time spent inside matrix-vector products (seconds)
    pub multiply_time_sec: f64,
    /// Mean time per product (microseconds)
    pub avg_multiply_us: f64,
}

impl MetricsSnapshot {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "Solves: {}, Iterations: {}, Multiplies: {}, Multiply time: {:.3}s ({:.1}us avg)",
            self.solves,
            self.iterations,
            self.multiplies,
            self.multiply_time_sec,
            self.avg_multiply_us
        )
    }

    /// Mean iterations per solve
    pub fn iterations_per_solve(&self) -> f64 {
        if self.solves == 0 {
            0.0
        } else {
            self.iterations as f64 / self.solves as f64
        }
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Per-solver metrics collector
#[derive(Debug, Default)]
pub struct SolverMetrics {
    /// Completed `solve` calls
    pub solves: Counter,
    /// CG iterations
    pub iterations: Counter,
    /// Matrix-vector products
    pub multiplies: Counter,
    /// Matrix-vector product timer
    pub multiply_timer: Timer,
}

impl SolverMetrics {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a product and starts timing it.
    pub fn start_multiply(&self) -> TimerGuard<'_> {
        self.multiplies.inc();
        self.multiply_timer.start()
    }

    /// Records a finished solve.
    pub fn record_solve(&self, iterations: usize) {
        self.solves.inc();
        self.iterations.add(iterations as u64);
    }

    /// Current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            solves: self.solves.get(),
            iterations: self.iterations.get(),
            multiplies: self.multiplies.get(),
            multiply_time_sec: self.multiply_timer.total_sec(),
            avg_multiply_us: self.multiply_timer.avg_us(),
        }
    }

    /// Resets everything.
    pub fn reset(&self) {
        self.solves.reset();
        self.iterations.reset();
        self.multiplies.reset();
        self.multiply_timer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);
        counter.inc();
        counter.inc();
        counter.add(3);
        assert_eq!(counter.get(), 5);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        {
            let _guard = timer.start();
            sleep(Duration::from_millis(2));
        }
        assert!(timer.total_sec() >= 0.002);
        // one measurement, so the mean equals the total
        assert!((timer.avg_us() - timer.total_sec() * 1e6).abs() < 1e-6);

        timer.reset();
        assert_eq!(timer.total_sec(), 0.0);
        assert_eq!(timer.avg_us(), 0.0);
    }

    #[test]
    fn test_solver_metrics_snapshot() {
        let metrics = SolverMetrics::new();
        {
            let _g = metrics.start_multiply();
        }
        metrics.record_solve(7);
        metrics.record_solve(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.multiplies, 1);
        assert_eq!(snap.solves, 2);
        assert_eq!(snap.iterations, 10);
        assert_eq!(snap.iterations_per_solve(), 5.0);
        assert!(snap.summary().contains("Iterations: 10"));

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
