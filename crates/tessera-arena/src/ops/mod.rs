//! The generic operator layer.
//!
//! Operators are provided methods on traits with blanket impls over
//! [`Container`], so each is written once and serves both
//! [`Vector`](crate::Vector) and [`Matrix`](crate::Matrix) for every element
//! type its bounds admit.
//!
//! Three families:
//!
//! - in-place (`*_inpl`, `*_into`): mutate an existing buffer, never
//!   allocate, never re-point a handle;
//! - allocating (`try_*`, `*_scalar`, `sign_flip`, comparisons): return
//!   exactly one new temporary in the operands' arena;
//! - reductions (`sum`, `max_abs`, `norm`): return a scalar.
//!
//! Every precondition (same arena, matching shapes, integer divisors that
//! are non-zero and do not overflow) is checked before anything is
//! allocated or written.

mod bitwise;
mod linalg;
mod overload;

pub use bitwise::{BitwiseOps, MaskOps};

use tessera_core::{Float, LinalgError, Scalar, Shape};
use tessera_kernel::Comparison;

use crate::container::sealed::Sealed;
use crate::container::Container;
use crate::handle::RawHandle;
use crate::raw::{self, Comp3Kernel, CompKernel, ScalKernel};

/// Operands must come from the same arena.
pub(crate) fn check_arena<T, U>(
    op: &'static str,
    a: &RawHandle<T>,
    b: &RawHandle<U>,
) -> Result<(), LinalgError> {
    if a.arena.id != b.arena.id {
        return Err(LinalgError::ArenaMismatch { op });
    }
    Ok(())
}

/// Element-wise operands must have identical shapes.
pub(crate) fn check_shape(op: &'static str, expected: Shape, actual: Shape) -> Result<(), LinalgError> {
    if expected != actual {
        return Err(LinalgError::ShapeMismatch {
            op,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Reject a container divisor holding an integer zero.
fn check_divisor<T: Scalar, C: Container<T>>(op: &'static str, divisor: &C) -> Result<(), LinalgError> {
    if T::IS_INTEGER {
        if let Some(index) = divisor.with_slice(|s| s.iter().position(|v| v.is_zero())) {
            return Err(LinalgError::DivisionByZero {
                op,
                index: Some(index),
            });
        }
    }
    Ok(())
}

/// Reject an integer zero scalar divisor.
fn check_scalar_divisor<T: Scalar>(op: &'static str, divisor: T) -> Result<(), LinalgError> {
    if T::IS_INTEGER && divisor.is_zero() {
        return Err(LinalgError::DivisionByZero { op, index: None });
    }
    Ok(())
}

/// Reject the first `(dividend, divisor)` pair whose integer quotient
/// overflows (`MIN / -1`).
fn check_overflow<T: Scalar>(
    op: &'static str,
    pairs: impl IntoIterator<Item = (T, T)>,
) -> Result<(), LinalgError> {
    if !T::IS_INTEGER {
        return Ok(());
    }
    match pairs.into_iter().position(|(n, d)| n.div_overflows(d)) {
        Some(index) => Err(LinalgError::DivisionOverflow { op, index }),
        None => Ok(()),
    }
}

/// Preconditions of `lhs[i] / rhs[i]` and `lhs[i] % rhs[i]`.
fn check_comp_division<T: Scalar, C: Container<T>>(
    op: &'static str,
    lhs: &C,
    rhs: &C,
) -> Result<(), LinalgError> {
    check_divisor(op, rhs)?;
    if T::IS_INTEGER {
        let divisors = rhs.to_vec();
        lhs.with_slice(|dividends| check_overflow(op, dividends.iter().copied().zip(divisors)))?;
    }
    Ok(())
}

/// Preconditions of `src[i] / s` and `src[i] % s`.
fn check_scalar_division<T: Scalar, C: Container<T>>(
    op: &'static str,
    src: &C,
    s: T,
) -> Result<(), LinalgError> {
    check_scalar_divisor(op, s)?;
    src.with_slice(|dividends| check_overflow(op, dividends.iter().map(|&n| (n, s))))
}

/// Preconditions of `s / src[i]` and `s % src[i]`.
fn check_reversed_division<T: Scalar, C: Container<T>>(
    op: &'static str,
    s: T,
    src: &C,
) -> Result<(), LinalgError> {
    check_divisor(op, src)?;
    src.with_slice(|divisors| check_overflow(op, divisors.iter().map(|&d| (s, d))))
}

/// A fresh temporary with the shape of `like`.
pub(crate) fn alloc_like<T: Scalar, C: Container<T>>(like: &C) -> C {
    C::from_raw(like.raw().alloc_temp(like.shape()))
}

fn binary_inpl<T: Scalar, C: Container<T>>(
    op: &'static str,
    dst: &C,
    rhs: &C,
    kernel: CompKernel<T>,
) -> Result<(), LinalgError> {
    check_arena(op, dst.raw(), rhs.raw())?;
    check_shape(op, dst.shape(), rhs.shape())?;
    raw::comp(dst.raw(), rhs.raw(), kernel);
    Ok(())
}

fn binary_into<T: Scalar, C: Container<T>>(
    op: &'static str,
    lhs: &C,
    rhs: &C,
    dst: &C,
    kernel: Comp3Kernel<T>,
) -> Result<(), LinalgError> {
    check_arena(op, lhs.raw(), rhs.raw())?;
    check_arena(op, lhs.raw(), dst.raw())?;
    check_shape(op, lhs.shape(), rhs.shape())?;
    check_shape(op, lhs.shape(), dst.shape())?;
    raw::comp3(dst.raw(), lhs.raw(), rhs.raw(), kernel);
    Ok(())
}

fn binary_alloc<T: Scalar, C: Container<T>>(
    op: &'static str,
    lhs: &C,
    rhs: &C,
    kernel: Comp3Kernel<T>,
) -> Result<C, LinalgError> {
    check_arena(op, lhs.raw(), rhs.raw())?;
    check_shape(op, lhs.shape(), rhs.shape())?;
    let out = alloc_like(lhs);
    raw::comp3(out.raw(), lhs.raw(), rhs.raw(), kernel);
    Ok(out)
}

fn scalar_alloc<T: Scalar, C: Container<T>>(src: &C, kernel: ScalKernel<T>, s: T) -> C {
    let out = alloc_like(src);
    raw::comp(out.raw(), src.raw(), tessera_kernel::copy::<T>);
    raw::scal(out.raw(), kernel, s);
    out
}

fn compare<T: Scalar, C: Container<T>>(
    op: &'static str,
    lhs: &C,
    rhs: &C,
    cmp: Comparison,
) -> Result<C::Rebind<bool>, LinalgError> {
    check_arena(op, lhs.raw(), rhs.raw())?;
    check_shape(op, lhs.shape(), rhs.shape())?;
    let out = <C::Rebind<bool> as Sealed<bool>>::from_raw(lhs.raw().alloc_temp::<bool>(lhs.shape()));
    raw::compare(out.raw(), lhs.raw(), rhs.raw(), cmp);
    Ok(out)
}

/// Arithmetic on numeric containers.
///
/// Implemented for every [`Container`] over a [`Scalar`] element. Integer
/// division and remainder truncate toward zero and reject zero divisors
/// with [`LinalgError::DivisionByZero`] and `MIN / -1` with
/// [`LinalgError::DivisionOverflow`]; float division follows IEEE.
pub trait Elementwise<T: Scalar>: Container<T> {
    // ── In-place, container operand ──────────────────────────────

    /// `self[i] += rhs[i]`.
    fn add_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        binary_inpl("add_inpl", self, rhs, tessera_kernel::comp_add::<T>)
    }

    /// `self[i] -= rhs[i]`.
    fn sub_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        binary_inpl("sub_inpl", self, rhs, tessera_kernel::comp_sub::<T>)
    }

    /// `self[i] *= rhs[i]`.
    fn comp_mul_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        binary_inpl("comp_mul_inpl", self, rhs, tessera_kernel::comp_mul::<T>)
    }

    /// `self[i] /= rhs[i]`.
    fn comp_div_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        check_arena("comp_div_inpl", self.raw(), rhs.raw())?;
        check_shape("comp_div_inpl", self.shape(), rhs.shape())?;
        check_comp_division("comp_div_inpl", self, rhs)?;
        binary_inpl("comp_div_inpl", self, rhs, tessera_kernel::comp_div::<T>)
    }

    /// `self[i] %= rhs[i]`.
    fn comp_mod_inpl(&self, rhs: &Self) -> Result<(), LinalgError> {
        check_arena("comp_mod_inpl", self.raw(), rhs.raw())?;
        check_shape("comp_mod_inpl", self.shape(), rhs.shape())?;
        check_comp_division("comp_mod_inpl", self, rhs)?;
        binary_inpl("comp_mod_inpl", self, rhs, tessera_kernel::comp_mod::<T>)
    }

    // ── In-place, scalar operand ─────────────────────────────────

    /// `self[i] += s`.
    fn add_scalar_inpl(&self, s: T) {
        raw::scal(self.raw(), tessera_kernel::scal_add::<T>, s);
    }

    /// `self[i] -= s`.
    fn sub_scalar_inpl(&self, s: T) {
        raw::scal(self.raw(), tessera_kernel::scal_sub::<T>, s);
    }

    /// `self[i] = s - self[i]`.
    fn rsub_scalar_inpl(&self, s: T) {
        raw::scal(self.raw(), tessera_kernel::scal_rsub::<T>, s);
    }

    /// `self[i] *= s`.
    fn mul_inpl(&self, s: T) {
        raw::scal(self.raw(), tessera_kernel::scal_mul::<T>, s);
    }

    /// `self[i] /= s`.
    fn div_inpl(&self, s: T) -> Result<(), LinalgError> {
        check_scalar_division("div_inpl", self, s)?;
        raw::scal(self.raw(), tessera_kernel::scal_div::<T>, s);
        Ok(())
    }

    /// `self[i] = s / self[i]`.
    fn rdiv_inpl(&self, s: T) -> Result<(), LinalgError> {
        check_reversed_division("rdiv_inpl", s, self)?;
        raw::scal(self.raw(), tessera_kernel::scal_rdiv::<T>, s);
        Ok(())
    }

    /// `self[i] %= s`.
    fn mod_inpl(&self, s: T) -> Result<(), LinalgError> {
        check_scalar_division("mod_inpl", self, s)?;
        raw::scal(self.raw(), tessera_kernel::scal_mod::<T>, s);
        Ok(())
    }

    /// `self[i] = s % self[i]`.
    fn rmod_inpl(&self, s: T) -> Result<(), LinalgError> {
        check_reversed_division("rmod_inpl", s, self)?;
        raw::scal(self.raw(), tessera_kernel::scal_rmod::<T>, s);
        Ok(())
    }

    /// `self[i] = -self[i]`.
    fn sign_flip_inpl(&self) {
        raw::comp(self.raw(), self.raw(), tessera_kernel::sign_flip::<T>);
    }

    // ── Explicit destination ─────────────────────────────────────

    /// `dst[i] = self[i] + rhs[i]`. `dst` may alias either operand.
    fn add_into(&self, rhs: &Self, dst: &Self) -> Result<(), LinalgError> {
        binary_into("add_into", self, rhs, dst, tessera_kernel::comp_add3::<T>)
    }

    /// `dst[i] = self[i] - rhs[i]`.
    fn sub_into(&self, rhs: &Self, dst: &Self) -> Result<(), LinalgError> {
        binary_into("sub_into", self, rhs, dst, tessera_kernel::comp_sub3::<T>)
    }

    /// `dst[i] = self[i] * rhs[i]`.
    fn comp_mul_into(&self, rhs: &Self, dst: &Self) -> Result<(), LinalgError> {
        binary_into("comp_mul_into", self, rhs, dst, tessera_kernel::comp_mul3::<T>)
    }

    /// `dst[i] = self[i] / rhs[i]`.
    fn comp_div_into(&self, rhs: &Self, dst: &Self) -> Result<(), LinalgError> {
        check_arena("comp_div_into", self.raw(), rhs.raw())?;
        check_shape("comp_div_into", self.shape(), rhs.shape())?;
        check_comp_division("comp_div_into", self, rhs)?;
        binary_into("comp_div_into", self, rhs, dst, tessera_kernel::comp_div3::<T>)
    }

    /// `dst[i] = self[i] % rhs[i]`.
    fn comp_mod_into(&self, rhs: &Self, dst: &Self) -> Result<(), LinalgError> {
        check_arena("comp_mod_into", self.raw(), rhs.raw())?;
        check_shape("comp_mod_into", self.shape(), rhs.shape())?;
        check_comp_division("comp_mod_into", self, rhs)?;
        binary_into("comp_mod_into", self, rhs, dst, tessera_kernel::comp_mod3::<T>)
    }

    // ── Allocating ───────────────────────────────────────────────

    /// `self + rhs` into a new temporary.
    fn try_add(&self, rhs: &Self) -> Result<Self, LinalgError> {
        binary_alloc("add", self, rhs, tessera_kernel::comp_add3::<T>)
    }

    /// `self - rhs` into a new temporary.
    fn try_sub(&self, rhs: &Self) -> Result<Self, LinalgError> {
        binary_alloc("sub", self, rhs, tessera_kernel::comp_sub3::<T>)
    }

    /// Component-wise `self * rhs` into a new temporary.
    fn try_comp_mul(&self, rhs: &Self) -> Result<Self, LinalgError> {
        binary_alloc("comp_mul", self, rhs, tessera_kernel::comp_mul3::<T>)
    }

    /// Component-wise `self / rhs` into a new temporary.
    fn try_comp_div(&self, rhs: &Self) -> Result<Self, LinalgError> {
        check_arena("comp_div", self.raw(), rhs.raw())?;
        check_shape("comp_div", self.shape(), rhs.shape())?;
        check_comp_division("comp_div", self, rhs)?;
        binary_alloc("comp_div", self, rhs, tessera_kernel::comp_div3::<T>)
    }

    /// Component-wise `self % rhs` into a new temporary.
    fn try_comp_mod(&self, rhs: &Self) -> Result<Self, LinalgError> {
        check_arena("comp_mod", self.raw(), rhs.raw())?;
        check_shape("comp_mod", self.shape(), rhs.shape())?;
        check_comp_division("comp_mod", self, rhs)?;
        binary_alloc("comp_mod", self, rhs, tessera_kernel::comp_mod3::<T>)
    }

    /// `self[i] + s` into a new temporary.
    fn add_scalar(&self, s: T) -> Self {
        scalar_alloc(self, tessera_kernel::scal_add::<T>, s)
    }

    /// `self[i] - s` into a new temporary.
    fn sub_scalar(&self, s: T) -> Self {
        scalar_alloc(self, tessera_kernel::scal_sub::<T>, s)
    }

    /// `s - self[i]` into a new temporary.
    fn rsub_scalar(&self, s: T) -> Self {
        scalar_alloc(self, tessera_kernel::scal_rsub::<T>, s)
    }

    /// `self[i] * s` into a new temporary.
    fn mul_scalar(&self, s: T) -> Self {
        scalar_alloc(self, tessera_kernel::scal_mul::<T>, s)
    }

    /// `self[i] / s` into a new temporary.
    fn try_div_scalar(&self, s: T) -> Result<Self, LinalgError> {
        check_scalar_division("div_scalar", self, s)?;
        Ok(scalar_alloc(self, tessera_kernel::scal_div::<T>, s))
    }

    /// `s / self[i]` into a new temporary.
    fn try_rdiv_scalar(&self, s: T) -> Result<Self, LinalgError> {
        check_reversed_division("rdiv_scalar", s, self)?;
        Ok(scalar_alloc(self, tessera_kernel::scal_rdiv::<T>, s))
    }

    /// `self[i] % s` into a new temporary.
    fn try_mod_scalar(&self, s: T) -> Result<Self, LinalgError> {
        check_scalar_division("mod_scalar", self, s)?;
        Ok(scalar_alloc(self, tessera_kernel::scal_mod::<T>, s))
    }

    /// `s % self[i]` into a new temporary.
    fn try_rmod_scalar(&self, s: T) -> Result<Self, LinalgError> {
        check_reversed_division("rmod_scalar", s, self)?;
        Ok(scalar_alloc(self, tessera_kernel::scal_rmod::<T>, s))
    }

    /// `-self[i]` into a new temporary.
    fn sign_flip(&self) -> Self {
        let out = alloc_like(self);
        raw::comp(out.raw(), self.raw(), tessera_kernel::sign_flip::<T>);
        out
    }

    // ── Comparisons ──────────────────────────────────────────────

    /// `self[i] < rhs[i]` as a new temporary mask.
    fn comp_lt(&self, rhs: &Self) -> Result<Self::Rebind<bool>, LinalgError> {
        compare("comp_lt", self, rhs, Comparison::Lt)
    }

    /// `self[i] <= rhs[i]` as a new temporary mask.
    fn comp_le(&self, rhs: &Self) -> Result<Self::Rebind<bool>, LinalgError> {
        compare("comp_le", self, rhs, Comparison::Le)
    }

    /// `self[i] > rhs[i]` as a new temporary mask.
    fn comp_gt(&self, rhs: &Self) -> Result<Self::Rebind<bool>, LinalgError> {
        compare("comp_gt", self, rhs, Comparison::Gt)
    }

    /// `self[i] >= rhs[i]` as a new temporary mask.
    fn comp_ge(&self, rhs: &Self) -> Result<Self::Rebind<bool>, LinalgError> {
        compare("comp_ge", self, rhs, Comparison::Ge)
    }

    /// `self[i] == rhs[i]` as a new temporary mask.
    fn comp_eq(&self, rhs: &Self) -> Result<Self::Rebind<bool>, LinalgError> {
        compare("comp_eq", self, rhs, Comparison::Eq)
    }

    // ── Reductions ───────────────────────────────────────────────

    /// Sum of all elements (zero when empty).
    fn sum(&self) -> T {
        raw::reduce(self.raw(), tessera_kernel::sum::<T>)
    }

    /// Largest absolute value (zero when empty; NaN is skipped).
    fn max_abs(&self) -> T {
        raw::reduce(self.raw(), tessera_kernel::max_abs::<T>)
    }

    /// Same shape and every element within `eps` of its counterpart.
    fn almost_equals_by_value(&self, other: &Self, eps: T) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let eps = eps.to_f64();
        let rhs = other.to_vec();
        self.with_slice(|lhs| {
            lhs.iter()
                .zip(&rhs)
                .all(|(a, b)| (a.to_f64() - b.to_f64()).abs() <= eps)
        })
    }

    /// Euclidean (Frobenius, for matrices) norm.
    fn norm(&self) -> T
    where
        T: Float,
    {
        raw::dot_range(self.raw(), self.raw(), 0, self.len()).sqrt()
    }

    /// Scale to unit norm. A zero-norm container is rejected unchanged.
    fn normalize_inpl(&self) -> Result<(), LinalgError>
    where
        T: Float,
    {
        let norm = self.norm();
        if norm.is_zero() {
            return Err(LinalgError::InvalidArgument {
                op: "normalize_inpl",
                reason: "cannot normalize a zero-norm container".into(),
            });
        }
        raw::scal(self.raw(), tessera_kernel::scal_div::<T>, norm);
        Ok(())
    }
}

impl<T: Scalar, C: Container<T>> Elementwise<T> for C {}
