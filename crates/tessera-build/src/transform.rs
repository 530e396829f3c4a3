//! Orthogonal transforms: Givens rotations, permutations and Householder
//! reflections.
//!
//! Every axis and index argument is validated before anything is
//! allocated, so a rejected call leaves the arena untouched.

use tessera_arena::{Arena, Container, Init, Matrix, Vector};
use tessera_core::{Float, Lifetime, LinalgError, Scalar};

use crate::structured::identity;

fn check_axis(op: &'static str, axis: usize, n: usize) -> Result<(), LinalgError> {
    if axis >= n {
        return Err(LinalgError::IndexOutOfRange {
            op,
            index: axis,
            bound: n,
        });
    }
    Ok(())
}

/// `n × n` Givens rotation by `angle` radians in the `(i, j)` plane.
///
/// Equal to the identity except `R[i][i] = R[j][j] = cos θ`,
/// `R[i][j] = -sin θ` and `R[j][i] = sin θ`.
pub fn rotation<T: Float>(
    arena: &Arena,
    lifetime: Lifetime,
    n: usize,
    i: usize,
    j: usize,
    angle: T,
) -> Result<Matrix<T>, LinalgError> {
    check_axis("rotation", i, n)?;
    check_axis("rotation", j, n)?;
    if i == j {
        return Err(LinalgError::InvalidArgument {
            op: "rotation",
            reason: format!("rotation plane needs two distinct axes, got {i} twice"),
        });
    }
    let (c, s) = (angle.cos(), angle.sin());
    let r = identity::<T>(arena, lifetime, n);
    r.with_slice_mut(|values| {
        values[i * n + i] = c;
        values[j * n + j] = c;
        values[i * n + j] = -s;
        values[j * n + i] = s;
    });
    Ok(r)
}

/// `n × n` permutation swapping rows `i` and `j` of the identity.
/// `i == j` yields the identity.
pub fn permutation<T: Scalar>(
    arena: &Arena,
    lifetime: Lifetime,
    n: usize,
    i: usize,
    j: usize,
) -> Result<Matrix<T>, LinalgError> {
    check_axis("permutation", i, n)?;
    check_axis("permutation", j, n)?;
    let p = identity::<T>(arena, lifetime, n);
    if i != j {
        p.with_slice_mut(|values| {
            values[i * n + i] = T::ZERO;
            values[j * n + j] = T::ZERO;
            values[i * n + j] = T::ONE;
            values[j * n + i] = T::ONE;
        });
    }
    Ok(p)
}

/// Permutation matrix `P` with `P[r][map[r]] = 1`, so `(P x)[r] = x[map[r]]`.
///
/// `map` must be a bijection on `0..map.len()`.
pub fn permutation_from<T: Scalar>(
    arena: &Arena,
    lifetime: Lifetime,
    map: &[usize],
) -> Result<Matrix<T>, LinalgError> {
    let n = map.len();
    let mut seen = vec![false; n];
    for &target in map {
        check_axis("permutation_from", target, n)?;
        if std::mem::replace(&mut seen[target], true) {
            return Err(LinalgError::InvalidArgument {
                op: "permutation_from",
                reason: format!("index {target} appears more than once"),
            });
        }
    }
    let p = arena.alloc_matrix(lifetime, n, n, Init::Zeroed);
    p.with_slice_mut(|values| {
        for (row, &col) in map.iter().enumerate() {
            values[row * n + col] = T::ONE;
        }
    });
    Ok(p)
}

/// Householder reflection `H = I - 2 v vᵀ / (vᵀ v)`, which maps `v` to
/// `-v` and fixes the hyperplane orthogonal to it.
///
/// `v` must belong to `arena` and be non-zero.
pub fn householder<T: Float>(
    arena: &Arena,
    lifetime: Lifetime,
    v: &Vector<T>,
) -> Result<Matrix<T>, LinalgError> {
    if v.arena_id() != arena.id() {
        return Err(LinalgError::ArenaMismatch { op: "householder" });
    }
    let values = v.to_vec();
    let norm_sq = values.iter().fold(T::ZERO, |acc, &x| acc + x * x);
    if norm_sq.is_zero() || !norm_sq.is_finite() {
        return Err(LinalgError::InvalidArgument {
            op: "householder",
            reason: "reflection vector must be non-zero and finite".to_string(),
        });
    }
    let n = values.len();
    let scale = (T::ONE + T::ONE) / norm_sq;
    let h = identity::<T>(arena, lifetime, n);
    h.with_slice_mut(|out| {
        for (r, &vr) in values.iter().enumerate() {
            for (c, &vc) in values.iter().enumerate() {
                out[r * n + c] -= scale * vr * vc;
            }
        }
    });
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_arena::Elementwise;
    use tessera_test_utils::{arena, arange_vec, assert_close};

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let arena = arena();
        let r = rotation(&arena, Lifetime::Temp, 2, 0, 1, std::f64::consts::FRAC_PI_2).unwrap();
        let x = arena.vec_from(&[1.0f64, 0.0]);
        assert_close(&r.dot_vec(&x).unwrap().to_vec(), &[0.0, 1.0], 1e-15);
    }

    #[test]
    fn rotation_is_orthogonal() {
        let arena = arena();
        let r = rotation(&arena, Lifetime::Temp, 4, 1, 3, 0.7f64).unwrap();
        let rtr = r.dot_trans_a(&r).unwrap();
        let eye = identity::<f64>(&arena, Lifetime::Temp, 4);
        assert!(rtr.almost_equals_by_value(&eye, 1e-12));
    }

    #[test]
    fn rotation_axes_are_validated() {
        let arena = arena();
        assert!(matches!(
            rotation(&arena, Lifetime::Temp, 3, 0, 3, 1.0f32),
            Err(LinalgError::IndexOutOfRange { index: 3, bound: 3, .. })
        ));
        assert!(matches!(
            rotation(&arena, Lifetime::Temp, 3, 2, 2, 1.0f32),
            Err(LinalgError::InvalidArgument { .. })
        ));
        assert_eq!(arena.all_allocations_count(), 0);
    }

    #[test]
    fn swap_permutation_swaps_entries() {
        let arena = arena();
        let p = permutation::<i32>(&arena, Lifetime::Temp, 3, 0, 2).unwrap();
        let x = arena.vec_from(&[10i32, 20, 30]);
        assert_eq!(p.dot_vec(&x).unwrap().to_vec(), [30, 20, 10]);
        // A transposition is its own inverse.
        assert!(p.dot(&p).unwrap().equals_by_value(&identity(&arena, Lifetime::Temp, 3)));
    }

    #[test]
    fn trivial_swap_is_identity() {
        let arena = arena();
        let p = permutation::<i16>(&arena, Lifetime::Temp, 2, 1, 1).unwrap();
        assert_eq!(p.to_vec(), [1, 0, 0, 1]);
        assert!(permutation::<i16>(&arena, Lifetime::Temp, 2, 0, 5).is_err());
    }

    #[test]
    fn permutation_from_reorders() {
        let arena = arena();
        let p = permutation_from::<f32>(&arena, Lifetime::Persistent, &[2, 0, 1]).unwrap();
        let x = arange_vec::<f32>(&arena, 3);
        assert_eq!(p.dot_vec(&x).unwrap().to_vec(), [2.0, 0.0, 1.0]);
    }

    #[test]
    fn permutation_from_rejects_non_bijections() {
        let arena = arena();
        assert!(matches!(
            permutation_from::<i64>(&arena, Lifetime::Temp, &[0, 0, 1]),
            Err(LinalgError::InvalidArgument { .. })
        ));
        assert!(matches!(
            permutation_from::<i64>(&arena, Lifetime::Temp, &[0, 3, 1]),
            Err(LinalgError::IndexOutOfRange { index: 3, .. })
        ));
        assert_eq!(arena.all_allocations_count(), 0);
    }

    #[test]
    fn householder_reflects_its_vector() {
        let arena = arena();
        let v = arena.vec_from(&[1.0f64, 2.0, 2.0]);
        let h = householder(&arena, Lifetime::Temp, &v).unwrap();
        let hv = h.dot_vec(&v).unwrap();
        assert_close(&hv.to_vec(), &[-1.0, -2.0, -2.0], 1e-12);

        let w = arena.vec_from(&[2.0f64, -1.0, 0.0]);
        assert_close(&h.dot_vec(&w).unwrap().to_vec(), &w.to_vec(), 1e-12);

        let hh = h.dot(&h).unwrap();
        assert!(hh.almost_equals_by_value(&identity(&arena, Lifetime::Temp, 3), 1e-12));
    }

    #[test]
    fn householder_rejects_zero_and_foreign_vectors() {
        let arena = arena();
        let zero = arena.vec(3, Init::<f32>::Zeroed);
        assert!(matches!(
            householder(&arena, Lifetime::Temp, &zero),
            Err(LinalgError::InvalidArgument { .. })
        ));

        let other = tessera_test_utils::arena();
        let foreign = other.vec_from(&[1.0f32]);
        assert_eq!(
            householder(&arena, Lifetime::Temp, &foreign).unwrap_err(),
            LinalgError::ArenaMismatch { op: "householder" }
        );
        assert_eq!(arena.temp_allocations_count(), 0);
    }
}
