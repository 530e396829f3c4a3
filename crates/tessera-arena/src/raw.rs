//! The only module that calls into `tessera-kernel`.
//!
//! Every function here is a safe wrapper: it resolves handles to base
//! pointers inside a single borrow of the arena state, asserts the length
//! and aliasing preconditions of the kernel it dispatches to, and only then
//! enters `unsafe`. The operator layer validates the same preconditions
//! first and returns [`LinalgError`](tessera_core::LinalgError)s; the
//! assertions here back that up so no safe caller can reach a kernel with
//! bad extents.

#![allow(unsafe_code)]

use tessera_core::{Element, Integer, Scalar};
use tessera_kernel::Comparison;

use crate::handle::RawHandle;

/// `buf[i] = f(buf[i], s)`.
pub(crate) type ScalKernel<T> = unsafe fn(*mut T, usize, T);
/// `dst[i] = f(dst[i], src[i])`.
pub(crate) type CompKernel<T> = unsafe fn(*mut T, *const T, usize);
/// `dst[i] = f(lhs[i], rhs[i])`.
pub(crate) type Comp3Kernel<T> = unsafe fn(*mut T, *const T, *const T, usize);

fn assert_same_arena<T, U>(a: &RawHandle<T>, b: &RawHandle<U>) {
    assert_eq!(a.arena.id, b.arena.id, "kernel operands from different arenas");
}

/// Apply a scalar kernel to every element of `dst`.
pub(crate) fn scal<T: Element>(dst: &RawHandle<T>, kernel: ScalKernel<T>, s: T) {
    let len = dst.shape.len();
    dst.arena.with_state(|state| {
        let d = state.buffer_ptr::<T>(dst.key, len);
        // SAFETY: `d` addresses a live buffer of exactly `len` elements.
        unsafe { kernel(d, len, s) }
    })
}

/// Apply a unary kernel to every element of `dst`.
pub(crate) fn unary<T: Element>(dst: &RawHandle<T>, kernel: unsafe fn(*mut T, usize)) {
    let len = dst.shape.len();
    dst.arena.with_state(|state| {
        let d = state.buffer_ptr::<T>(dst.key, len);
        // SAFETY: `d` addresses a live buffer of exactly `len` elements.
        unsafe { kernel(d, len) }
    })
}

/// Shift every element of `dst`.
///
/// # Panics
///
/// If `bits >= T::BITS`.
pub(crate) fn shift<T: Integer>(
    dst: &RawHandle<T>,
    kernel: unsafe fn(*mut T, usize, u32),
    bits: u32,
) {
    assert!(bits < T::BITS, "shift by {bits} overflows {}-bit elements", T::BITS);
    let len = dst.shape.len();
    dst.arena.with_state(|state| {
        let d = state.buffer_ptr::<T>(dst.key, len);
        // SAFETY: `d` addresses `len` elements and `bits` is in range.
        unsafe { kernel(d, len, bits) }
    })
}

/// Two-operand element-wise kernel; `src` may be `dst` itself.
pub(crate) fn comp<T: Element>(dst: &RawHandle<T>, src: &RawHandle<T>, kernel: CompKernel<T>) {
    assert_same_arena(dst, src);
    let len = dst.shape.len();
    assert_eq!(src.shape.len(), len, "element-wise operands differ in length");
    dst.arena.with_state(|state| {
        let s = state.buffer_ptr::<T>(src.key, len) as *const T;
        let d = state.buffer_ptr::<T>(dst.key, len);
        // SAFETY: both pointers address live buffers of `len` elements;
        // distinct slots never share a buffer, and element-wise kernels
        // accept `s == d`.
        unsafe { kernel(d, s, len) }
    })
}

/// Three-operand element-wise kernel; any operands may coincide.
pub(crate) fn comp3<T: Element>(
    dst: &RawHandle<T>,
    lhs: &RawHandle<T>,
    rhs: &RawHandle<T>,
    kernel: Comp3Kernel<T>,
) {
    assert_same_arena(dst, lhs);
    assert_same_arena(dst, rhs);
    let len = dst.shape.len();
    assert_eq!(lhs.shape.len(), len, "element-wise operands differ in length");
    assert_eq!(rhs.shape.len(), len, "element-wise operands differ in length");
    dst.arena.with_state(|state| {
        let l = state.buffer_ptr::<T>(lhs.key, len) as *const T;
        let r = state.buffer_ptr::<T>(rhs.key, len) as *const T;
        let d = state.buffer_ptr::<T>(dst.key, len);
        // SAFETY: all three address live buffers of `len` elements that are
        // either identical or disjoint.
        unsafe { kernel(d, l, r, len) }
    })
}

/// `dst[i] = cmp(lhs[i], rhs[i])` into a boolean buffer.
pub(crate) fn compare<T: Scalar>(
    dst: &RawHandle<bool>,
    lhs: &RawHandle<T>,
    rhs: &RawHandle<T>,
    cmp: Comparison,
) {
    assert_same_arena(dst, lhs);
    assert_same_arena(dst, rhs);
    let len = dst.shape.len();
    assert_eq!(lhs.shape.len(), len, "comparison operands differ in length");
    assert_eq!(rhs.shape.len(), len, "comparison operands differ in length");
    dst.arena.with_state(|state| {
        let l = state.buffer_ptr::<T>(lhs.key, len) as *const T;
        let r = state.buffer_ptr::<T>(rhs.key, len) as *const T;
        let d = state.buffer_ptr::<bool>(dst.key, len);
        // SAFETY: `d` is a `bool` buffer and cannot overlap the `T` inputs.
        unsafe { tessera_kernel::comp_cmp(d, l, r, len, cmp) }
    })
}

/// Fold every element of `src` with a reduction kernel.
pub(crate) fn reduce<T: Element, R>(src: &RawHandle<T>, kernel: unsafe fn(*const T, usize) -> R) -> R {
    let len = src.shape.len();
    src.arena.with_state(|state| {
        let s = state.buffer_ptr::<T>(src.key, len) as *const T;
        // SAFETY: `s` addresses a live buffer of `len` elements.
        unsafe { kernel(s, len) }
    })
}

/// `Σ a[i] * b[i]` over `start..end`.
pub(crate) fn dot_range<T: Scalar>(a: &RawHandle<T>, b: &RawHandle<T>, start: usize, end: usize) -> T {
    assert_same_arena(a, b);
    let (len_a, len_b) = (a.shape.len(), b.shape.len());
    assert!(
        start <= end && end <= len_a && end <= len_b,
        "dot range {start}..{end} out of bounds"
    );
    a.arena.with_state(|state| {
        let pa = state.buffer_ptr::<T>(a.key, len_a) as *const T;
        let pb = state.buffer_ptr::<T>(b.key, len_b) as *const T;
        // SAFETY: both buffers hold at least `end` elements; reads only.
        unsafe { tessera_kernel::vec_dot_range(pa, pb, start, end) }
    })
}

fn assert_distinct<T, U>(out: &RawHandle<T>, input: &RawHandle<U>) {
    assert!(
        out.key != input.key,
        "kernel output aliases an input buffer"
    );
}

/// `out = a ⊗ b`.
pub(crate) fn outer<T: Scalar>(a: &RawHandle<T>, b: &RawHandle<T>, out: &RawHandle<T>) {
    assert_same_arena(out, a);
    assert_same_arena(out, b);
    assert_distinct(out, a);
    assert_distinct(out, b);
    let (len_a, len_b) = (a.shape.len(), b.shape.len());
    let len_out = out.shape.len();
    assert_eq!(len_out, len_a * len_b, "outer product output has the wrong size");
    out.arena.with_state(|state| {
        let pa = state.buffer_ptr::<T>(a.key, len_a) as *const T;
        let pb = state.buffer_ptr::<T>(b.key, len_b) as *const T;
        let po = state.buffer_ptr::<T>(out.key, len_out);
        // SAFETY: extents asserted above; `po` is a distinct slot, hence a
        // disjoint buffer.
        unsafe { tessera_kernel::vec_outer_dot(pa, pb, po, len_a, len_b) }
    })
}

/// `out = A x` with `A: rows × cols`.
pub(crate) fn mat_vec<T: Scalar>(
    a: &RawHandle<T>,
    x: &RawHandle<T>,
    out: &RawHandle<T>,
    rows: usize,
    cols: usize,
) {
    assert_same_arena(out, a);
    assert_same_arena(out, x);
    assert_distinct(out, a);
    assert_distinct(out, x);
    assert_eq!(a.shape.len(), rows * cols, "matrix extent mismatch");
    assert_eq!(x.shape.len(), cols, "vector extent mismatch");
    assert_eq!(out.shape.len(), rows, "output extent mismatch");
    out.arena.with_state(|state| {
        let pa = state.buffer_ptr::<T>(a.key, rows * cols) as *const T;
        let px = state.buffer_ptr::<T>(x.key, cols) as *const T;
        let po = state.buffer_ptr::<T>(out.key, rows);
        // SAFETY: extents asserted above; `po` is disjoint from the inputs.
        unsafe { tessera_kernel::mat_vec_dot(pa, px, po, rows, cols) }
    })
}

/// `out = yᵀ A` with `A: rows × cols`.
pub(crate) fn vec_mat<T: Scalar>(
    y: &RawHandle<T>,
    a: &RawHandle<T>,
    out: &RawHandle<T>,
    rows: usize,
    cols: usize,
) {
    assert_same_arena(out, a);
    assert_same_arena(out, y);
    assert_distinct(out, a);
    assert_distinct(out, y);
    assert_eq!(a.shape.len(), rows * cols, "matrix extent mismatch");
    assert_eq!(y.shape.len(), rows, "vector extent mismatch");
    assert_eq!(out.shape.len(), cols, "output extent mismatch");
    out.arena.with_state(|state| {
        let py = state.buffer_ptr::<T>(y.key, rows) as *const T;
        let pa = state.buffer_ptr::<T>(a.key, rows * cols) as *const T;
        let po = state.buffer_ptr::<T>(out.key, cols);
        // SAFETY: extents asserted above; `po` is disjoint from the inputs.
        unsafe { tessera_kernel::vec_mat_dot(py, pa, po, rows, cols) }
    })
}

/// `out = op(A) B` where `op(A)` is `m × n`, `B` is `n × k` and `out` is
/// `m × k`. With `trans_a`, `A` is stored `n × m`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn mat_mat<T: Scalar>(
    a: &RawHandle<T>,
    b: &RawHandle<T>,
    out: &RawHandle<T>,
    m: usize,
    n: usize,
    k: usize,
    trans_a: bool,
) {
    assert_same_arena(out, a);
    assert_same_arena(out, b);
    assert_distinct(out, a);
    assert_distinct(out, b);
    assert_eq!(a.shape.len(), m * n, "left operand extent mismatch");
    assert_eq!(b.shape.len(), n * k, "right operand extent mismatch");
    assert_eq!(out.shape.len(), m * k, "output extent mismatch");
    out.arena.with_state(|state| {
        let pa = state.buffer_ptr::<T>(a.key, m * n) as *const T;
        let pb = state.buffer_ptr::<T>(b.key, n * k) as *const T;
        let po = state.buffer_ptr::<T>(out.key, m * k);
        // SAFETY: extents asserted above; `po` is disjoint from the inputs.
        unsafe {
            if trans_a {
                tessera_kernel::mat_mat_dot_trans_a(pa, pb, po, m, n, k)
            } else {
                tessera_kernel::mat_mat_dot(pa, pb, po, m, n, k)
            }
        }
    })
}

/// `out = Aᵀ` with `A: rows × cols`.
pub(crate) fn trans<T: Scalar>(a: &RawHandle<T>, out: &RawHandle<T>, rows: usize, cols: usize) {
    assert_same_arena(out, a);
    assert_distinct(out, a);
    let len = rows * cols;
    assert_eq!(a.shape.len(), len, "matrix extent mismatch");
    assert_eq!(out.shape.len(), len, "output extent mismatch");
    out.arena.with_state(|state| {
        let pa = state.buffer_ptr::<T>(a.key, len) as *const T;
        let po = state.buffer_ptr::<T>(out.key, len);
        // SAFETY: both hold `rows * cols` elements and are disjoint.
        unsafe { tessera_kernel::mat_trans(pa, po, rows, cols) }
    })
}
