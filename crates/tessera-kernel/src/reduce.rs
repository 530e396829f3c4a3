//! Reductions.

use tessera_core::Scalar;

/// Largest absolute value in `buf`, or zero for an empty buffer.
///
/// Used by factorisation routines for pivoting and conditioning checks.
/// NaN elements never compare greater, so they are skipped. Integer `MIN`
/// counts as `MAX` (see [`Scalar::abs`]).
///
/// # Safety
///
/// `buf` must be valid for reads of `len` elements.
pub unsafe fn max_abs<T: Scalar>(buf: *const T, len: usize) -> T {
    let mut best = T::ZERO;
    for i in 0..len {
        // SAFETY: i < len.
        let v = unsafe { buf.add(i).read() }.abs();
        if v > best {
            best = v;
        }
    }
    best
}

/// Sum of all elements, or zero for an empty buffer.
///
/// # Safety
///
/// `buf` must be valid for reads of `len` elements.
pub unsafe fn sum<T: Scalar>(buf: *const T, len: usize) -> T {
    let mut acc = T::ZERO;
    for i in 0..len {
        // SAFETY: i < len.
        acc += unsafe { buf.add(i).read() };
    }
    acc
}
