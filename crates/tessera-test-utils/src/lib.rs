//! Test utilities for Tessera development.
//!
//! Fixture constructors for arenas and containers with predictable
//! contents, and tolerance assertions for float results.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_arena::{AllocatorPolicy, Arena, Container, Init, Matrix, Vector};
use tessera_core::Scalar;

/// A fresh heap-policy arena.
pub fn arena() -> Arena {
    Arena::new(AllocatorPolicy::Heap)
}

/// A fresh recycling-policy arena.
pub fn recycling_arena() -> Arena {
    Arena::new(AllocatorPolicy::Recycling)
}

/// Persistent vector of `n` ones.
pub fn ones_vec<T: Scalar>(arena: &Arena, n: usize) -> Vector<T> {
    arena.vec(n, Init::Fill(T::ONE))
}

/// Persistent vector `[0, 1, ..., n - 1]`.
pub fn arange_vec<T: Scalar>(arena: &Arena, n: usize) -> Vector<T> {
    let values: Vec<T> = (0..n).map(|i| T::from_f64(i as f64)).collect();
    arena.vec_from(&values)
}

/// Persistent `rows × cols` matrix whose row-major element `k` is `k`.
pub fn arange_mat<T: Scalar>(arena: &Arena, rows: usize, cols: usize) -> Matrix<T> {
    let values: Vec<T> = (0..rows * cols).map(|i| T::from_f64(i as f64)).collect();
    match arena.mat_from(rows, cols, &values) {
        Ok(m) => m,
        Err(e) => panic!("arange_mat: {e}"),
    }
}

/// Assert two float slices agree element-wise within `eps`.
#[track_caller]
pub fn assert_close<T: Scalar>(actual: &[T], expected: &[T], eps: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "length mismatch: {actual:?} vs {expected:?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let diff = (a.to_f64() - e.to_f64()).abs();
        assert!(
            diff <= eps,
            "element {i}: {a:?} differs from {e:?} by {diff} (eps {eps})"
        );
    }
}

/// Assert a container's contents agree with `expected` within `eps`.
#[track_caller]
pub fn assert_container_close<T: Scalar, C: Container<T>>(actual: &C, expected: &[T], eps: f64) {
    assert_close(&actual.to_vec(), expected, eps);
}
