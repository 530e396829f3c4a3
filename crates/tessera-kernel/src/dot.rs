//! Dot products, matrix products and transpose.
//!
//! All matrices are row-major: element `(r, c)` of an `R × C` matrix is at
//! `r * C + c`. Every kernel here writes an output whose elements depend on
//! more than one input element, so outputs must never alias inputs.

use tessera_core::Scalar;

/// `Σ a[i] * b[i]` over `0..len`.
///
/// # Safety
///
/// `a` and `b` must be valid for reads of `len` elements.
pub unsafe fn vec_dot<T: Scalar>(a: *const T, b: *const T, len: usize) -> T {
    // SAFETY: forwarded caller contract.
    unsafe { vec_dot_range(a, b, 0, len) }
}

/// `Σ a[i] * b[i]` over `start..end`. Returns zero for an empty range.
///
/// # Safety
///
/// `a` and `b` must be valid for reads of `end` elements and
/// `start <= end`.
pub unsafe fn vec_dot_range<T: Scalar>(a: *const T, b: *const T, start: usize, end: usize) -> T {
    let mut acc = T::ZERO;
    for i in start..end {
        // SAFETY: i < end.
        unsafe { acc += a.add(i).read() * b.add(i).read() };
    }
    acc
}

/// Outer product: `out[i * len_b + j] = a[i] * b[j]`.
///
/// # Safety
///
/// `a` must be valid for reads of `len_a`, `b` for reads of `len_b`, and
/// `out` for writes of `len_a * len_b` elements. `out` must not overlap `a`
/// or `b`.
pub unsafe fn vec_outer_dot<T: Scalar>(
    a: *const T,
    b: *const T,
    out: *mut T,
    len_a: usize,
    len_b: usize,
) {
    for i in 0..len_a {
        // SAFETY: i < len_a.
        let ai = unsafe { a.add(i).read() };
        for j in 0..len_b {
            // SAFETY: j < len_b and i * len_b + j < len_a * len_b.
            unsafe { out.add(i * len_b + j).write(ai * b.add(j).read()) };
        }
    }
}

/// Matrix-vector product `out = A x` for a `rows × cols` matrix `A`.
///
/// # Safety
///
/// `a` must be valid for reads of `rows * cols`, `x` for reads of `cols`,
/// and `out` for writes of `rows` elements. `out` must not overlap `a` or
/// `x`.
pub unsafe fn mat_vec_dot<T: Scalar>(
    a: *const T,
    x: *const T,
    out: *mut T,
    rows: usize,
    cols: usize,
) {
    for r in 0..rows {
        // SAFETY: row `r` spans `r * cols .. (r + 1) * cols` inside `a`.
        let acc = unsafe { vec_dot(a.add(r * cols), x, cols) };
        // SAFETY: r < rows.
        unsafe { out.add(r).write(acc) };
    }
}

/// Row-vector-matrix product `out = yᵀ A` for a `rows × cols` matrix `A`.
///
/// # Safety
///
/// `y` must be valid for reads of `rows`, `a` for reads of `rows * cols`,
/// and `out` for writes of `cols` elements. `out` must not overlap `y` or
/// `a`.
pub unsafe fn vec_mat_dot<T: Scalar>(
    y: *const T,
    a: *const T,
    out: *mut T,
    rows: usize,
    cols: usize,
) {
    for c in 0..cols {
        // SAFETY: c < cols.
        unsafe { out.add(c).write(T::ZERO) };
    }
    for r in 0..rows {
        // SAFETY: r < rows.
        let yr = unsafe { y.add(r).read() };
        for c in 0..cols {
            // SAFETY: r * cols + c < rows * cols and c < cols.
            unsafe {
                let o = out.add(c);
                o.write(o.read() + yr * a.add(r * cols + c).read());
            }
        }
    }
}

/// Matrix product `out = A B` with `A: m × n`, `B: n × k`, `out: m × k`.
///
/// Uses the i-p-j loop order so both `B` and `out` are walked row-wise.
///
/// # Safety
///
/// `a`, `b` and `out` must be valid for `m * n`, `n * k` and `m * k`
/// elements respectively. `out` must not overlap `a` or `b`.
pub unsafe fn mat_mat_dot<T: Scalar>(
    a: *const T,
    b: *const T,
    out: *mut T,
    m: usize,
    n: usize,
    k: usize,
) {
    for i in 0..m {
        for j in 0..k {
            // SAFETY: i * k + j < m * k.
            unsafe { out.add(i * k + j).write(T::ZERO) };
        }
        for p in 0..n {
            // SAFETY: i * n + p < m * n.
            let aip = unsafe { a.add(i * n + p).read() };
            for j in 0..k {
                // SAFETY: p * k + j < n * k and i * k + j < m * k.
                unsafe {
                    let o = out.add(i * k + j);
                    o.write(o.read() + aip * b.add(p * k + j).read());
                }
            }
        }
    }
}

/// Matrix product with a transposed left operand, `out = Aᵀ B`, without
/// materialising `Aᵀ`.
///
/// `A` is stored as `n × m` (so `Aᵀ` is `m × n`), `B` is `n × k` and `out`
/// is `m × k`.
///
/// # Safety
///
/// `a`, `b` and `out` must be valid for `n * m`, `n * k` and `m * k`
/// elements respectively. `out` must not overlap `a` or `b`.
pub unsafe fn mat_mat_dot_trans_a<T: Scalar>(
    a: *const T,
    b: *const T,
    out: *mut T,
    m: usize,
    n: usize,
    k: usize,
) {
    for idx in 0..m * k {
        // SAFETY: idx < m * k.
        unsafe { out.add(idx).write(T::ZERO) };
    }
    for p in 0..n {
        for i in 0..m {
            // SAFETY: p * m + i < n * m.
            let api = unsafe { a.add(p * m + i).read() };
            for j in 0..k {
                // SAFETY: p * k + j < n * k and i * k + j < m * k.
                unsafe {
                    let o = out.add(i * k + j);
                    o.write(o.read() + api * b.add(p * k + j).read());
                }
            }
        }
    }
}

/// Transpose: `out[c * rows + r] = a[r * cols + c]`.
///
/// # Safety
///
/// `a` must be valid for reads and `out` for writes of `rows * cols`
/// elements, and the two must not overlap.
pub unsafe fn mat_trans<T: Scalar>(a: *const T, out: *mut T, rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            // SAFETY: both indices are < rows * cols.
            unsafe { out.add(c * rows + r).write(a.add(r * cols + c).read()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matmul(a: &[i64], b: &[i64], m: usize, n: usize, k: usize) -> Vec<i64> {
        let mut out = vec![-1; m * k];
        unsafe { mat_mat_dot(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), m, n, k) };
        out
    }

    fn transpose(a: &[i64], rows: usize, cols: usize) -> Vec<i64> {
        let mut out = vec![0; rows * cols];
        unsafe { mat_trans(a.as_ptr(), out.as_mut_ptr(), rows, cols) };
        out
    }

    fn identity(n: usize) -> Vec<i64> {
        let mut out = vec![0; n * n];
        for i in 0..n {
            out[i * n + i] = 1;
        }
        out
    }

    #[test]
    fn dot_of_ones_is_length() {
        for n in [0usize, 1, 7, 64] {
            let x = vec![1.0f32; n];
            assert_eq!(unsafe { vec_dot(x.as_ptr(), x.as_ptr(), n) }, n as f32);
        }
    }

    #[test]
    fn dot_of_complementary_patterns_is_zero() {
        let n = 33;
        let x: Vec<i32> = (0..n).map(|i| (i % 2) as i32).collect();
        let y: Vec<i32> = (0..n).map(|i| ((i + 1) % 2) as i32).collect();
        assert_eq!(unsafe { vec_dot(x.as_ptr(), y.as_ptr(), n) }, 0);
    }

    #[test]
    fn dot_range_restricts_indices() {
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = [1.0f64, 1.0, 1.0, 1.0];
        assert_eq!(unsafe { vec_dot_range(a.as_ptr(), b.as_ptr(), 1, 3) }, 5.0);
        assert_eq!(unsafe { vec_dot_range(a.as_ptr(), b.as_ptr(), 2, 2) }, 0.0);
    }

    #[test]
    fn outer_product_layout() {
        let a = [1i32, 2];
        let b = [3i32, 4, 5];
        let mut out = vec![0; 6];
        unsafe { vec_outer_dot(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), 2, 3) };
        assert_eq!(out, [3, 4, 5, 6, 8, 10]);
    }

    #[test]
    fn mat_vec_and_vec_mat() {
        // [[1, 2, 3],
        //  [4, 5, 6]]
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = [1.0f32, 0.0, -1.0];
        let mut ax = vec![0.0f32; 2];
        unsafe { mat_vec_dot(a.as_ptr(), x.as_ptr(), ax.as_mut_ptr(), 2, 3) };
        assert_eq!(ax, [-2.0, -2.0]);

        let y = [1.0f32, 2.0];
        let mut ya = vec![7.0f32; 3];
        unsafe { vec_mat_dot(y.as_ptr(), a.as_ptr(), ya.as_mut_ptr(), 2, 3) };
        assert_eq!(ya, [9.0, 12.0, 15.0]);
    }

    #[test]
    fn mat_mat_small() {
        let a = [1, 2, 3, 4, 5, 6]; // 2x3
        let b = [7, 8, 9, 10, 11, 12]; // 3x2
        assert_eq!(matmul(&a, &b, 2, 3, 2), [58, 64, 139, 154]);
    }

    #[test]
    fn trans_a_matches_explicit_transpose() {
        let a = [1, 2, 3, 4, 5, 6]; // 3x2, so Aᵀ is 2x3
        let b = [1, 0, 2, 1, 0, 3]; // 3x2
        let mut out = vec![0; 4];
        unsafe { mat_mat_dot_trans_a(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), 2, 3, 2) };
        let at = transpose(&a, 3, 2);
        assert_eq!(out, matmul(&at, &b, 2, 3, 2));
    }

    #[test]
    fn transpose_layout() {
        let a = [1, 2, 3, 4, 5, 6]; // 2x3
        assert_eq!(transpose(&a, 2, 3), [1, 4, 2, 5, 3, 6]);
    }

    fn arb_matrix() -> impl Strategy<Value = (usize, usize, Vec<i64>)> {
        (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
            proptest::collection::vec(-50i64..50, r * c).prop_map(move |v| (r, c, v))
        })
    }

    proptest! {
        #[test]
        fn identity_is_neutral((r, c, a) in arb_matrix()) {
            prop_assert_eq!(matmul(&a, &identity(c), r, c, c), a.clone());
            prop_assert_eq!(matmul(&identity(r), &a, r, r, c), a);
        }

        #[test]
        fn transpose_is_an_involution((r, c, a) in arb_matrix()) {
            let t = transpose(&a, r, c);
            prop_assert_eq!(transpose(&t, c, r), a);
        }
    }
}
