//! Component-wise kernels.
//!
//! Two-operand forms update `dst` in place (`dst[i] = dst[i] op src[i]`);
//! the `*3` forms write `dst[i] = lhs[i] op rhs[i]`. Lengths are not
//! checked here: the operator layer rejects mismatched shapes first.

use std::ptr;

use tessera_core::{Element, Scalar};

use crate::{map_inpl, zip_map};

macro_rules! comp_kernels {
    ($(($inpl:ident, $three:ident, $sym:tt, $doc:literal)),* $(,)?) => {$(
        #[doc = concat!("`dst[i] = dst[i] ", $doc, " src[i]`.")]
        ///
        /// # Safety
        ///
        /// `dst` must be valid for reads and writes and `src` for reads of
        /// `len` elements. `src` may equal `dst`.
        pub unsafe fn $inpl<T: Scalar>(dst: *mut T, src: *const T, len: usize) {
            // SAFETY: forwarded caller contract.
            unsafe { zip_map(dst, dst as *const T, src, len, |a, b| a $sym b) }
        }

        #[doc = concat!("`dst[i] = lhs[i] ", $doc, " rhs[i]`.")]
        ///
        /// # Safety
        ///
        /// `lhs` and `rhs` must be valid for reads and `dst` for writes of
        /// `len` elements. Buffers may be identical but not partially
        /// overlapping.
        pub unsafe fn $three<T: Scalar>(dst: *mut T, lhs: *const T, rhs: *const T, len: usize) {
            // SAFETY: forwarded caller contract.
            unsafe { zip_map(dst, lhs, rhs, len, |a, b| a $sym b) }
        }
    )*};
}

comp_kernels!(
    (comp_add, comp_add3, +, "+"),
    (comp_sub, comp_sub3, -, "-"),
    (comp_mul, comp_mul3, *, "*"),
    (comp_div, comp_div3, /, "/"),
    (comp_mod, comp_mod3, %, "%"),
);

/// `dst[i] = -src[i]`.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of `len` elements.
/// `src` may equal `dst`.
pub unsafe fn sign_flip<T: Scalar>(dst: *mut T, src: *const T, len: usize) {
    if ptr::eq(dst as *const T, src) {
        // SAFETY: forwarded caller contract.
        unsafe { map_inpl(dst, len, |x| -x) };
        return;
    }
    for i in 0..len {
        // SAFETY: i < len for both buffers.
        unsafe { dst.add(i).write(-src.add(i).read()) };
    }
}

/// Copy `len` elements from `src` to `dst`.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of `len` elements.
/// The buffers may overlap.
pub unsafe fn copy<T: Element>(dst: *mut T, src: *const T, len: usize) {
    // SAFETY: forwarded caller contract; `ptr::copy` tolerates overlap.
    unsafe { ptr::copy(src, dst, len) }
}

/// Set every element of `dst` to `value`.
///
/// # Safety
///
/// `dst` must be valid for writes of `len` elements.
pub unsafe fn fill<T: Element>(dst: *mut T, len: usize, value: T) {
    for i in 0..len {
        // SAFETY: i < len.
        unsafe { dst.add(i).write(value) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inplace_add_accumulates() {
        let mut dst = vec![1.0f32, 2.0, 3.0];
        let src = vec![10.0f32, 20.0, 30.0];
        unsafe { comp_add(dst.as_mut_ptr(), src.as_ptr(), 3) };
        assert_eq!(dst, [11.0, 22.0, 33.0]);
    }

    #[test]
    fn inplace_ops_tolerate_self_alias() {
        let mut v = vec![3i32, -4, 5];
        let p = v.as_mut_ptr();
        unsafe { comp_mul(p, p as *const i32, 3) };
        assert_eq!(v, [9, 16, 25]);
        let p = v.as_mut_ptr();
        unsafe { comp_sub(p, p as *const i32, 3) };
        assert_eq!(v, [0, 0, 0]);
    }

    #[test]
    fn three_operand_forms() {
        let a = vec![7.0f64, -7.0, 9.0];
        let b = vec![2.0f64, 2.0, -4.0];
        let mut out = vec![0.0f64; 3];
        unsafe { comp_sub3(out.as_mut_ptr(), a.as_ptr(), b.as_ptr(), 3) };
        assert_eq!(out, [5.0, -9.0, 13.0]);
        unsafe { comp_div3(out.as_mut_ptr(), a.as_ptr(), b.as_ptr(), 3) };
        assert_eq!(out, [3.5, -3.5, -2.25]);
        unsafe { comp_mod3(out.as_mut_ptr(), a.as_ptr(), b.as_ptr(), 3) };
        assert_eq!(out, [1.0, -1.0, 1.0]);
    }

    #[test]
    fn integer_component_div_mod_truncate() {
        let a = vec![-7i16, 7, -7];
        let b = vec![2i16, -2, -2];
        let mut q = vec![0i16; 3];
        let mut r = vec![0i16; 3];
        unsafe {
            comp_div3(q.as_mut_ptr(), a.as_ptr(), b.as_ptr(), 3);
            comp_mod3(r.as_mut_ptr(), a.as_ptr(), b.as_ptr(), 3);
        }
        assert_eq!(q, [-3, -3, 3]);
        assert_eq!(r, [-1, 1, -1]);
    }

    #[test]
    fn sign_flip_separate_and_aliased() {
        let src = vec![1.0f32, -2.0, 0.0];
        let mut dst = vec![9.0f32; 3];
        unsafe { sign_flip(dst.as_mut_ptr(), src.as_ptr(), 3) };
        assert_eq!(dst, [-1.0, 2.0, -0.0]);

        let p = dst.as_mut_ptr();
        unsafe { sign_flip(p, p as *const f32, 3) };
        assert_eq!(dst, [1.0, -2.0, 0.0]);
    }

    #[test]
    fn copy_and_fill() {
        let src = vec![true, false, true];
        let mut dst = vec![false; 3];
        unsafe { copy(dst.as_mut_ptr(), src.as_ptr(), 3) };
        assert_eq!(dst, src);
        unsafe { fill(dst.as_mut_ptr(), 2, false) };
        assert_eq!(dst, [false, false, true]);
    }
}
