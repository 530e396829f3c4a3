//! Benchmark profiles for the Tessera linear-algebra arena.
//!
//! Provides deterministic operand sets so every benchmark run sees the
//! same values:
//!
//! - [`VECTOR_SIZES`] / [`MATRIX_SIZES`]: the problem sizes swept by the
//!   criterion groups
//! - [`vector_pair`] / [`matrix_pair`]: seeded persistent operands
//! - [`step_profile`]: one "simulation step" worth of allocating operators,
//!   the workload `clear_temp` is designed to reclaim

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_arena::{Arena, Elementwise, Matrix, Vector};
use tessera_build::RandomSource;
use tessera_core::Lifetime;

/// Vector lengths swept by the element-wise and dot benchmarks.
pub const VECTOR_SIZES: [usize; 3] = [64, 1024, 16_384];

/// Square matrix orders swept by the matrix benchmarks.
pub const MATRIX_SIZES: [usize; 3] = [8, 32, 128];

/// Two persistent `n`-element vectors with values uniform in `-1..1`.
pub fn vector_pair(arena: &Arena, n: usize, seed: u64) -> (Vector<f64>, Vector<f64>) {
    let mut rng = RandomSource::new(seed);
    let a = rng.uniform_vec(arena, Lifetime::Persistent, n, -1.0, 1.0);
    let b = rng.uniform_vec(arena, Lifetime::Persistent, n, -1.0, 1.0);
    match (a, b) {
        (Ok(a), Ok(b)) => (a, b),
        _ => unreachable!("-1..1 is a valid sampling range"),
    }
}

/// Two persistent `n × n` matrices with standard normal entries.
pub fn matrix_pair(arena: &Arena, n: usize, seed: u64) -> (Matrix<f64>, Matrix<f64>) {
    let mut rng = RandomSource::new(seed);
    let a = rng.normal_mat(arena, Lifetime::Persistent, n, n, 0.0, 1.0);
    let b = rng.normal_mat(arena, Lifetime::Persistent, n, n, 0.0, 1.0);
    match (a, b) {
        (Ok(a), Ok(b)) => (a, b),
        _ => unreachable!("unit standard deviation is valid"),
    }
}

/// One step of an iterative update, `x' = x + dt * (A x - x)`, written
/// with allocating operators. Returns the new state, a temporary.
///
/// Allocates four temporaries per call.
pub fn step_profile(a: &Matrix<f64>, x: &Vector<f64>, dt: f64) -> Vector<f64> {
    let ax = match a.dot_vec(x) {
        Ok(ax) => ax,
        Err(e) => panic!("step_profile: {e}"),
    };
    let delta = &ax - x;
    let scaled = delta.mul_scalar(dt);
    x + &scaled
}
