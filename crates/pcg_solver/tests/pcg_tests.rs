// crates/pcg_solver/tests/pcg_tests.rs
//!
//! Explicit-operator PCG behaviour
//!
//! Residual history, warm starts, zero right-hand sides and the iteration
//! budget, checked against a small tridiagonal SPD system.

use pcg_solver::{DenseMatrix, DiagonalMatrix, LinearOperator, PcgSolver, Termination};

/// Tridiagonal SPD: diag 4 + (i mod 3), off-diagonals -1, b_i = 1 + 0.5·i
fn fixture(n: usize) -> (DenseMatrix<f64>, Vec<f64>) {
    let mut a = DenseMatrix::zeros(n, n);
    for i in 0..n {
        a.set(i, i, 4.0 + (i % 3) as f64);
        if i > 0 {
            a.set(i, i - 1, -1.0);
            a.set(i - 1, i, -1.0);
        }
    }
    let b = (0..n).map(|i| 1.0 + 0.5 * i as f64).collect();
    (a, b)
}

/// Seeded diagonally dominant SPD matrix
fn generate_spd_matrix(n: usize, seed: u64) -> DenseMatrix<f64> {
    let mut a = DenseMatrix::zeros(n, n);
    let mut rng_state = seed;
    let mut next_rand = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((rng_state >> 33) as f64) / (u32::MAX as f64) - 0.5
    };

    for i in 0..n {
        a.set(i, i, 4.0 + next_rand().abs());
        if i > 0 {
            let off = -0.5 - next_rand().abs() * 0.3;
            a.set(i, i - 1, off);
            a.set(i - 1, i, off);
        }
    }
    a
}

fn max_abs_diff(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

fn residual_inf(a: &DenseMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut ax = vec![0.0; b.len()];
    a.mul_vec(x, &mut ax);
    max_abs_diff(&ax, b)
}

#[test]
fn test_residual_is_monotone_in_budget() {
    let n = 8;
    let (a, b) = fixture(n);
    let mut previous = f64::INFINITY;

    for k in 0..=n {
        let mut solver = PcgSolver::<f64>::new();
        solver.solve(k, &a, &b, &[]).unwrap();
        let res = solver.res_error();
        assert!(
            res <= previous,
            "res_error grew from {:e} to {:e} at budget {}",
            previous,
            res,
            k
        );
        previous = res;
    }
    assert!(previous < 1e-12);
}

#[test]
fn test_residual_is_monotone_on_random_spd() {
    let n = 12;
    let b: Vec<f64> = (0..n).map(|i| 1.0 + 0.5 * i as f64).collect();

    for seed in [1u64, 7, 42, 2024] {
        let a = generate_spd_matrix(n, seed);
        let mut previous = f64::INFINITY;
        for k in 0..=n {
            let mut solver = PcgSolver::<f64>::new();
            solver.solve(k, &a, &b, &[]).unwrap();
            let res = solver.res_error();
            assert!(res <= previous, "seed {}: res_error grew at budget {}", seed, k);
            previous = res;
        }
        assert!(previous < 1e-12, "seed {}", seed);
    }
}

#[test]
fn test_badly_scaled_f32_system_converges() {
    // exact answer 1e-22; r·z and p·q are subnormal in f32
    let a = DiagonalMatrix::new(vec![1e4f32, 1e4]);
    let mut solver = PcgSolver::<f32>::new();
    let x = solver.solve(5, &a, &[1e-18, 1e-18], &[]).unwrap().to_vec();

    assert_eq!(solver.report().termination, Termination::Converged);
    assert_eq!(solver.report().iterations, 1);
    for xi in x {
        assert!((xi - 1e-22).abs() < 1e-27, "x = {:e}", xi);
    }
}

#[test]
fn test_zero_rhs_returns_guess() {
    let (a, _) = fixture(4);
    let guess = [0.5, -1.0, 2.0, 0.0];
    let mut solver = PcgSolver::<f64>::new();

    let x = solver.solve(10, &a, &[0.0; 4], &guess).unwrap();
    assert_eq!(x, &guess[..]);
    assert_eq!(solver.report().termination, Termination::ZeroRightHandSide);

    let x = solver.solve(10, &a, &[0.0; 4], &[]).unwrap();
    assert!(x.iter().all(|&v| v == 0.0));
}

#[test]
fn test_warm_restart_reaches_cold_answer() {
    let (a, b) = fixture(8);

    let mut cold = PcgSolver::<f64>::new();
    let x_cold = cold.solve(100, &a, &b, &[]).unwrap().to_vec();

    let mut warm = PcgSolver::<f64>::new();
    let x_partial = warm.solve(2, &a, &b, &[]).unwrap().to_vec();
    let x_warm = warm.solve(100, &a, &b, &x_partial).unwrap();

    assert!(max_abs_diff(&x_cold, x_warm) < 1e-10);
}

#[test]
fn test_diagonal_system_exact_in_one_iteration() {
    let a = DiagonalMatrix::new(vec![4.0f64, 9.0]);
    let mut solver = PcgSolver::<f64>::new();
    let x = solver.solve(1, &a, &[8.0, 27.0], &[]).unwrap();

    assert!((x[0] - 2.0).abs() < 1e-5);
    assert!((x[1] - 3.0).abs() < 1e-5);
    assert!(solver.res_error().abs() < 1e-12);
}

#[test]
fn test_budget_is_respected() {
    let (a, b) = fixture(12);
    let mut solver = PcgSolver::<f64>::new();
    solver.solve(3, &a, &b, &[]).unwrap();

    assert_eq!(solver.report().iterations, 3);
    assert_eq!(solver.report().termination, Termination::Exhausted);
    assert_eq!(solver.metrics().snapshot().multiplies, 3);
    assert!(solver.tol_error() > 0.0 && solver.tol_error() < 1.0);
}

#[test]
fn test_state_reused_across_sizes() {
    let mut solver = PcgSolver::<f64>::new();

    let (a8, b8) = fixture(8);
    solver.solve(50, &a8, &b8, &[]).unwrap();
    assert_eq!(solver.len(), 8);

    let (a5, b5) = fixture(5);
    let x = solver.solve(50, &a5, &b5, &[]).unwrap().to_vec();
    assert_eq!(solver.len(), 5);
    assert!(residual_inf(&a5, &x, &b5) < 1e-10);
}

#[test]
fn test_random_spd_with_pool_matches_sequential() {
    let n = 24;
    let b: Vec<f64> = (0..n).map(|i| 1.0 + 0.5 * i as f64).collect();

    for seed in [7u64, 42] {
        let a = generate_spd_matrix(n, seed);

        let mut sequential = PcgSolver::<f64>::new();
        let x_seq = sequential.solve(200, &a, &b, &[]).unwrap().to_vec();
        assert!(sequential.report().is_converged(), "seed {}", seed);
        assert!(residual_inf(&a, &x_seq, &b) < 1e-8);

        let pool = pcg_solver::build_thread_pool(&pcg_solver::ThreadPoolConfig {
            num_threads: 3,
            ..Default::default()
        })
        .unwrap();
        let mut pooled = PcgSolver::<f64>::with_thread_pool(pool);
        let x_par = pooled.solve(200, &a, &b, &[]).unwrap();

        // row products are computed identically, only their scheduling differs
        assert_eq!(x_par, &x_seq[..]);
    }
}
