//! Deterministic structured matrices and vectors.

use tessera_arena::{Arena, Container, Init, Matrix, Vector};
use tessera_core::{Float, Lifetime, LinalgError, Scalar};

/// `n × n` identity.
pub fn identity<T: Scalar>(arena: &Arena, lifetime: Lifetime, n: usize) -> Matrix<T> {
    let m = arena.alloc_matrix(lifetime, n, n, Init::Zeroed);
    m.with_slice_mut(|values| {
        for i in 0..n {
            values[i * n + i] = T::ONE;
        }
    });
    m
}

/// Square matrix with `diag` on the main diagonal and zeros elsewhere.
pub fn diagonal<T: Scalar>(arena: &Arena, lifetime: Lifetime, diag: &[T]) -> Matrix<T> {
    let n = diag.len();
    let m = arena.alloc_matrix(lifetime, n, n, Init::Zeroed);
    m.with_slice_mut(|values| {
        for (i, &d) in diag.iter().enumerate() {
            values[i * n + i] = d;
        }
    });
    m
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` an empty vector.
pub fn linspace<T: Float>(
    arena: &Arena,
    lifetime: Lifetime,
    start: T,
    end: T,
    n: usize,
) -> Vector<T> {
    let v = arena.alloc_vector(lifetime, n, Init::Zeroed);
    if n == 0 {
        return v;
    }
    let step = if n == 1 {
        T::ZERO
    } else {
        (end - start) / T::from_f64((n - 1) as f64)
    };
    v.with_slice_mut(|values| {
        for (i, x) in values.iter_mut().enumerate() {
            *x = start + step * T::from_f64(i as f64);
        }
        // Pin the endpoint against accumulated rounding.
        if n > 1 {
            values[n - 1] = end;
        }
    });
    v
}

/// Standard basis vector `e_index` of length `n`.
pub fn basis<T: Scalar>(
    arena: &Arena,
    lifetime: Lifetime,
    n: usize,
    index: usize,
) -> Result<Vector<T>, LinalgError> {
    if index >= n {
        return Err(LinalgError::IndexOutOfRange {
            op: "basis",
            index,
            bound: n,
        });
    }
    let v = arena.alloc_vector(lifetime, n, Init::Zeroed);
    v.with_slice_mut(|values| values[index] = T::ONE);
    Ok(v)
}

/// `n × n` Hilbert matrix, `H[i][j] = 1 / (i + j + 1)`.
pub fn hilbert<T: Float>(arena: &Arena, lifetime: Lifetime, n: usize) -> Matrix<T> {
    let m = arena.alloc_matrix(lifetime, n, n, Init::Zeroed);
    m.with_slice_mut(|values| {
        for i in 0..n {
            for j in 0..n {
                values[i * n + j] = T::ONE / T::from_f64((i + j + 1) as f64);
            }
        }
    });
    m
}
