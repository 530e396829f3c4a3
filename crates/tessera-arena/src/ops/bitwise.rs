//! Bitwise operators for integer and boolean containers, and mask queries.

use tessera_core::{Bitwise, Element, Integer, LinalgError};

use crate::container::sealed::Sealed;
use crate::container::Container;
use crate::ops::{check_arena, check_shape};
use crate::raw;

fn check_shift<T: Integer>(op: &'static str, bits: u32) -> Result<(), LinalgError> {
    if bits >= T::BITS {
        return Err(LinalgError::ShiftOverflow {
            op,
            bits,
            width: T::BITS,
        });
    }
    Ok(())
}

fn bitwise_inpl<T: Bitwise, C: Container<T>>(
    op: &'static str,
    dst: &C,
    rhs: &C,
    kernel: raw::Comp3Kernel<T>,
) -> Result<(), LinalgError> {
    check_arena(op, dst.raw(), rhs.raw())?;
    check_shape(op, dst.shape(), rhs.shape())?;
    raw::comp3(dst.raw(), dst.raw(), rhs.raw(), kernel);
    Ok(())
}

fn bitwise_alloc<T: Bitwise, C: Container<T>>(
    op: &'static str,
    lhs: &C,
    rhs: &C,
    kernel: raw::Comp3Kernel<T>,
) -> Result<C, LinalgError> {
    check_arena(op, lhs.raw(), rhs.raw())?;
    check_shape(op, lhs.shape(), rhs.shape())?;
    let out = C::from_raw(lhs.raw().alloc_temp(lhs.shape()));
    raw::comp3(out.raw(), lhs.raw(), rhs.raw(), kernel);
    Ok(out)
}

fn copy_alloc<T: Element, C: Container<T>>(src: &C) -> C {
    let out = C::from_raw(src.raw().alloc_temp(src.shape()));
    raw::comp(out.raw(), src.raw(), tessera_kernel::copy::<T>);
    out
}

/// `& | ^ !` on integer and boolean containers, plus shifts on integers.
pub trait BitwiseOps<T: Bitwise>: Container<T> {
    /// `self[i] &= rhs[i]`.
    fn and_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        bitwise_inpl("and_inpl", self, rhs, tessera_kernel::comp_and::<T>)
    }

    /// `self[i] |= rhs[i]`.
    fn or_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        bitwise_inpl("or_inpl", self, rhs, tessera_kernel::comp_or::<T>)
    }

    /// `self[i] ^= rhs[i]`.
    fn xor_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        bitwise_inpl("xor_inpl", self, rhs, tessera_kernel::comp_xor::<T>)
    }

    /// `self[i] = !self[i]`.
    fn not_inpl(&self) {
        raw::unary(self.raw(), tessera_kernel::not::<T>);
    }

    /// `self & rhs` into a new temporary.
    fn try_and(&self, rhs: &Self) -> Result<Self, LinalgError> {
        bitwise_alloc("and", self, rhs, tessera_kernel::comp_and::<T>)
    }

    /// `self | rhs` into a new temporary.
    fn try_or(&self, rhs: &Self) -> Result<Self, LinalgError> {
        bitwise_alloc("or", self, rhs, tessera_kernel::comp_or::<T>)
    }

    /// `self ^ rhs` into a new temporary.
    fn try_xor(&self, rhs: &Self) -> Result<Self, LinalgError> {
        bitwise_alloc("xor", self, rhs, tessera_kernel::comp_xor::<T>)
    }

    /// `!self` into a new temporary.
    fn complement(&self) -> Self {
        let out = copy_alloc(self);
        raw::unary(out.raw(), tessera_kernel::not::<T>);
        out
    }

    /// `self[i] <<= bits`; `bits` must be below the element width.
    fn shl_inpl(&self, bits: u32) -> Result<(), LinalgError>
    where
        T: Integer,
    {
        check_shift::<T>("shl_inpl", bits)?;
        raw::shift(self.raw(), tessera_kernel::scal_shl::<T>, bits);
        Ok(())
    }

    /// `self[i] >>= bits` (arithmetic); `bits` must be below the element
    /// width.
    fn shr_inpl(&self, bits: u32) -> Result<(), LinalgError>
    where
        T: Integer,
    {
        check_shift::<T>("shr_inpl", bits)?;
        raw::shift(self.raw(), tessera_kernel::scal_shr::<T>, bits);
        Ok(())
    }

    /// `self << bits` into a new temporary.
    fn try_shl(&self, bits: u32) -> Result<Self, LinalgError>
    where
        T: Integer,
    {
        check_shift::<T>("shl", bits)?;
        let out = copy_alloc(self);
        raw::shift(out.raw(), tessera_kernel::scal_shl::<T>, bits);
        Ok(out)
    }

    /// `self >> bits` into a new temporary.
    fn try_shr(&self, bits: u32) -> Result<Self, LinalgError>
    where
        T: Integer,
    {
        check_shift::<T>("shr", bits)?;
        let out = copy_alloc(self);
        raw::shift(out.raw(), tessera_kernel::scal_shr::<T>, bits);
        Ok(out)
    }
}

impl<T: Bitwise, C: Container<T>> BitwiseOps<T> for C {}

/// Queries over boolean masks.
pub trait MaskOps: Container<bool> {
    /// At least one element is `true`.
    fn any(&self) -> bool {
        self.with_slice(|s| s.iter().any(|&b| b))
    }

    /// Every element is `true` (vacuously true when empty).
    fn all(&self) -> bool {
        self.with_slice(|s| s.iter().all(|&b| b))
    }

    /// Number of `true` elements.
    fn count_true(&self) -> usize {
        self.with_slice(|s| s.iter().filter(|&&b| b).count())
    }
}

impl<C: Container<bool>> MaskOps for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Elementwise;
    use crate::Arena;

    #[test]
    fn integer_bitwise_in_place() {
        let arena = Arena::default();
        let a = arena.vec_from(&[0b1100i32, 0b1010, -1]);
        let b = arena.vec_from(&[0b1010i32, 0b0110, 5]);
        a.and_inpl(&b).unwrap();
        assert_eq!(a.to_vec(), [0b1000, 0b0010, 5]);
        a.or_inpl(&b).unwrap();
        assert_eq!(a.to_vec(), [0b1010, 0b0110, 5]);
        a.xor_inpl(&b).unwrap();
        assert_eq!(a.to_vec(), [0, 0, 0]);
        a.not_inpl();
        assert_eq!(a.to_vec(), [-1, -1, -1]);
    }

    #[test]
    fn boolean_logic() {
        let arena = Arena::default();
        let a = arena.vec_from(&[true, true, false, false]);
        let b = arena.vec_from(&[true, false, true, false]);
        assert_eq!(a.try_and(&b).unwrap().to_vec(), [true, false, false, false]);
        assert_eq!(a.try_or(&b).unwrap().to_vec(), [true, true, true, false]);
        assert_eq!(a.try_xor(&b).unwrap().to_vec(), [false, true, true, false]);
        assert_eq!(a.complement().to_vec(), [false, false, true, true]);
        assert_eq!(arena.temp_allocations_count(), 4);
    }

    #[test]
    fn shifts_check_width() {
        let arena = Arena::default();
        let a = arena.vec_from(&[1i16, -8]);
        a.shl_inpl(3).unwrap();
        assert_eq!(a.to_vec(), [8, -64]);
        assert_eq!(a.try_shr(2).unwrap().to_vec(), [2, -16]);
        assert_eq!(
            a.shl_inpl(16).unwrap_err(),
            LinalgError::ShiftOverflow {
                op: "shl_inpl",
                bits: 16,
                width: 16
            }
        );
        assert!(a.try_shl(40).is_err());
        assert_eq!(a.to_vec(), [8, -64]);
    }

    #[test]
    fn masks_from_comparisons() {
        let arena = Arena::default();
        let x = arena.vec_from(&[1.0f32, 5.0, 3.0, 7.0]);
        let limit = arena.vec_from(&[4.0f32; 4]);
        let mask = x.comp_gt(&limit).unwrap();
        assert!(mask.any());
        assert!(!mask.all());
        assert_eq!(mask.count_true(), 2);
        assert!(arena.temp_vec_from::<bool>(&[]).all());
    }
}
