//! Raw numeric kernels for Tessera.
//!
//! Allocation-free inner loops over contiguous buffers of a single element
//! type. Kernels take raw pointers plus lengths (or matrix dimensions) and
//! know nothing about arenas, handles or lifetimes; the operator layer in
//! `tessera-arena` validates shapes and resolves handles before calling in.
//!
//! This crate is one of two that may contain `unsafe` code (along with the
//! `raw` module of `tessera-arena`). Every kernel is an `unsafe fn` whose
//! `# Safety` section states exactly which pointers must be valid for how
//! many elements and which operands may alias.
//!
//! # Aliasing
//!
//! Element-wise kernels (`scal_*`, `comp_*`, [`sign_flip`], bitwise and
//! copy kernels) read element `i` of every input before writing element `i`
//! of the output, so inputs and output may be the *same* buffer. Kernels
//! that mix indices ([`dot`] products, [`mat_trans`]) require the output to
//! be disjoint from every input.
//!
//! # Numeric semantics
//!
//! Integer division and remainder truncate toward zero, float remainder is
//! `fmod`, exactly as the native operators. Kernels never check divisors;
//! integer division by zero must be rejected by the caller.
//!
//! [`dot`]: crate::dot

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bitwise;
pub mod cmp;
pub mod comp;
pub mod dot;
pub mod reduce;
pub mod scal;

pub use bitwise::{comp_and, comp_or, comp_xor, not, scal_shl, scal_shr};
pub use cmp::{comp_cmp, Comparison};
pub use comp::{
    comp_add, comp_add3, comp_div, comp_div3, comp_mod, comp_mod3, comp_mul, comp_mul3, comp_sub,
    comp_sub3, copy, fill, sign_flip,
};
pub use dot::{
    mat_mat_dot, mat_mat_dot_trans_a, mat_trans, mat_vec_dot, vec_dot, vec_dot_range, vec_mat_dot,
    vec_outer_dot,
};
pub use reduce::{max_abs, sum};
pub use scal::{scal_add, scal_div, scal_mod, scal_mul, scal_rdiv, scal_rmod, scal_rsub, scal_sub};

/// Apply `f` to every element of `buf` in place.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
#[inline]
pub(crate) unsafe fn map_inpl<T: Copy>(buf: *mut T, len: usize, f: impl Fn(T) -> T) {
    for i in 0..len {
        // SAFETY: i < len and the caller guarantees `buf` covers `len` elements.
        unsafe {
            let p = buf.add(i);
            p.write(f(p.read()));
        }
    }
}

/// `dst[i] = f(lhs[i], rhs[i])` for every `i`.
///
/// # Safety
///
/// `lhs` and `rhs` must be valid for reads and `dst` for writes of `len`
/// elements. Any of the three may be the same buffer, but partially
/// overlapping (shifted) buffers are not allowed.
#[inline]
pub(crate) unsafe fn zip_map<T: Copy, U: Copy>(
    dst: *mut U,
    lhs: *const T,
    rhs: *const T,
    len: usize,
    f: impl Fn(T, T) -> U,
) {
    for i in 0..len {
        // SAFETY: i < len; each element is read before the matching write,
        // so exact aliasing between inputs and output is sound.
        unsafe {
            let a = lhs.add(i).read();
            let b = rhs.add(i).read();
            dst.add(i).write(f(a, b));
        }
    }
}
