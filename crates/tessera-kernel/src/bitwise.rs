//! Bitwise kernels for integer and boolean buffers.

use tessera_core::{Bitwise, Integer};

use crate::{map_inpl, zip_map};

/// `dst[i] = lhs[i] & rhs[i]`.
///
/// # Safety
///
/// `lhs` and `rhs` must be valid for reads and `dst` for writes of `len`
/// elements. Buffers may be identical but not partially overlapping.
pub unsafe fn comp_and<T: Bitwise>(dst: *mut T, lhs: *const T, rhs: *const T, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { zip_map(dst, lhs, rhs, len, |a, b| a & b) }
}

/// `dst[i] = lhs[i] | rhs[i]`.
///
/// # Safety
///
/// Same contract as [`comp_and`].
pub unsafe fn comp_or<T: Bitwise>(dst: *mut T, lhs: *const T, rhs: *const T, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { zip_map(dst, lhs, rhs, len, |a, b| a | b) }
}

/// `dst[i] = lhs[i] ^ rhs[i]`.
///
/// # Safety
///
/// Same contract as [`comp_and`].
pub unsafe fn comp_xor<T: Bitwise>(dst: *mut T, lhs: *const T, rhs: *const T, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { zip_map(dst, lhs, rhs, len, |a, b| a ^ b) }
}

/// `buf[i] = !buf[i]`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements.
pub unsafe fn not<T: Bitwise>(buf: *mut T, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| !x) }
}

/// `buf[i] <<= bits`.
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements, and
/// `bits < T::BITS`.
pub unsafe fn scal_shl<T: Integer>(buf: *mut T, len: usize, bits: u32) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x << bits) }
}

/// `buf[i] >>= bits` (arithmetic shift).
///
/// # Safety
///
/// `buf` must be valid for reads and writes of `len` elements, and
/// `bits < T::BITS`.
pub unsafe fn scal_shr<T: Integer>(buf: *mut T, len: usize, bits: u32) {
    // SAFETY: forwarded caller contract.
    unsafe { map_inpl(buf, len, |x| x >> bits) }
}
