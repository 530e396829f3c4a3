//! Scalar broadcast kernels: `buf[i] = buf[i] op s` and the reversed
//! `buf[i] = s op buf[i]` for the non-commutative operators.

use tessera_core::Scalar;

use crate::map_inpl;

/// `buf[i] += s`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
pub unsafe fn scal_add<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x + s) }
}

/// `buf[i] -= s`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
pub unsafe fn scal_sub<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x - s) }
}

/// `buf[i] = s - buf[i]`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
pub unsafe fn scal_rsub<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| s - x) }
}

/// `buf[i] *= s`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
pub unsafe fn scal_mul<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x * s) }
}

/// `buf[i] /= s`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements. For integer
/// `T`, `s` must be non-zero.
pub unsafe fn scal_div<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x / s) }
}

/// `buf[i] = s / buf[i]`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements. For integer
/// `T`, no element of `buf` may be zero.
pub unsafe fn scal_rdiv<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| s / x) }
}

/// `buf[i] %= s`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements. For integer
/// `T`, `s` must be non-zero.
pub unsafe fn scal_mod<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x % s) }
}

/// `buf[i] = s % buf[i]`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements. For integer
/// `T`, no element of `buf` may be zero.
pub unsafe fn scal_rmod<T: Scalar>(buf: *mut T, len: usize, s: T) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| s % x) }
}
