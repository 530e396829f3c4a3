//! `std::ops` operator overloads.
//!
//! Binary operators between containers are component-wise (`*` is the
//! Hadamard product; use `dot` for matrix products) and, like every
//! allocating operator, return one new temporary. Scalars combine on either
//! side. Compound assignment maps onto the in-place family. Overloads have
//! no error channel, so a rejected operation panics with the
//! [`LinalgError`] message its `try_*` counterpart would have returned.

use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

use tessera_core::{Bitwise, Integer, LinalgError, Scalar};

use crate::matrix::Matrix;
use crate::ops::{BitwiseOps, Elementwise};
use crate::vector::Vector;

#[track_caller]
fn unwrap_op<R>(result: Result<R, LinalgError>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

/// Container ⊕ container, for all four ownership combinations.
macro_rules! container_binop {
    ($C:ident, $Bound:ident, $Trait:ident, $method:ident, $call:ident) => {
        impl<T: $Bound> $Trait<&$C<T>> for &$C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, rhs: &$C<T>) -> $C<T> {
                unwrap_op(self.$call(rhs))
            }
        }

        impl<T: $Bound> $Trait<$C<T>> for &$C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, rhs: $C<T>) -> $C<T> {
                unwrap_op(self.$call(&rhs))
            }
        }

        impl<T: $Bound> $Trait<&$C<T>> for $C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, rhs: &$C<T>) -> $C<T> {
                unwrap_op((&self).$call(rhs))
            }
        }

        impl<T: $Bound> $Trait<$C<T>> for $C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, rhs: $C<T>) -> $C<T> {
                unwrap_op((&self).$call(&rhs))
            }
        }
    };
}

/// Container ⊕ scalar, borrowed and owned.
macro_rules! scalar_rhs_binop {
    ($C:ident, $Bound:ident, $Rhs:ty, $Trait:ident, $method:ident, |$lhs:ident, $s:ident| $body:expr) => {
        impl<T: $Bound> $Trait<$Rhs> for &$C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, $s: $Rhs) -> $C<T> {
                let $lhs = self;
                $body
            }
        }

        impl<T: $Bound> $Trait<$Rhs> for $C<T> {
            type Output = $C<T>;

            #[track_caller]
            fn $method(self, $s: $Rhs) -> $C<T> {
                let $lhs = &self;
                $body
            }
        }
    };
}

/// Compound assignment from a container, borrowed and owned.
macro_rules! container_assign {
    ($C:ident, $Bound:ident, $Trait:ident, $method:ident, $call:ident) => {
        impl<T: $Bound> $Trait<&$C<T>> for $C<T> {
            #[track_caller]
            fn $method(&mut self, rhs: &$C<T>) {
                unwrap_op(self.$call(rhs))
            }
        }

        impl<T: $Bound> $Trait<$C<T>> for $C<T> {
            #[track_caller]
            fn $method(&mut self, rhs: $C<T>) {
                unwrap_op(self.$call(&rhs))
            }
        }
    };
}

macro_rules! container_ops {
    ($C:ident) => {
        container_binop!($C, Scalar, Add, add, try_add);
        container_binop!($C, Scalar, Sub, sub, try_sub);
        container_binop!($C, Scalar, Mul, mul, try_comp_mul);
        container_binop!($C, Scalar, Div, div, try_comp_div);
        container_binop!($C, Scalar, Rem, rem, try_comp_mod);
        container_binop!($C, Bitwise, BitAnd, bitand, try_and);
        container_binop!($C, Bitwise, BitOr, bitor, try_or);
        container_binop!($C, Bitwise, BitXor, bitxor, try_xor);

        scalar_rhs_binop!($C, Scalar, T, Add, add, |c, s| c.add_scalar(s));
        scalar_rhs_binop!($C, Scalar, T, Sub, sub, |c, s| c.sub_scalar(s));
        scalar_rhs_binop!($C, Scalar, T, Mul, mul, |c, s| c.mul_scalar(s));
        scalar_rhs_binop!($C, Scalar, T, Div, div, |c, s| unwrap_op(c.try_div_scalar(s)));
        scalar_rhs_binop!($C, Scalar, T, Rem, rem, |c, s| unwrap_op(c.try_mod_scalar(s)));
        scalar_rhs_binop!($C, Integer, u32, Shl, shl, |c, bits| unwrap_op(c.try_shl(bits)));
        scalar_rhs_binop!($C, Integer, u32, Shr, shr, |c, bits| unwrap_op(c.try_shr(bits)));

        impl<T: Scalar> Neg for &$C<T> {
            type Output = $C<T>;

            fn neg(self) -> $C<T> {
                self.sign_flip()
            }
        }

        impl<T: Scalar> Neg for $C<T> {
            type Output = $C<T>;

            fn neg(self) -> $C<T> {
                self.sign_flip()
            }
        }

        impl<T: Bitwise> Not for &$C<T> {
            type Output = $C<T>;

            fn not(self) -> $C<T> {
                self.complement()
            }
        }

        impl<T: Bitwise> Not for $C<T> {
            type Output = $C<T>;

            fn not(self) -> $C<T> {
                self.complement()
            }
        }

        container_assign!($C, Scalar, AddAssign, add_assign, add_inpl);
        container_assign!($C, Scalar, SubAssign, sub_assign, sub_inpl);
        container_assign!($C, Scalar, MulAssign, mul_assign, comp_mul_inpl);
        container_assign!($C, Scalar, DivAssign, div_assign, comp_div_inpl);
        container_assign!($C, Scalar, RemAssign, rem_assign, comp_mod_inpl);
        container_assign!($C, Bitwise, BitAndAssign, bitand_assign, and_inpl);
        container_assign!($C, Bitwise, BitOrAssign, bitor_assign, or_inpl);
        container_assign!($C, Bitwise, BitXorAssign, bitxor_assign, xor_inpl);

        impl<T: Scalar> AddAssign<T> for $C<T> {
            fn add_assign(&mut self, s: T) {
                self.add_scalar_inpl(s)
            }
        }

        impl<T: Scalar> SubAssign<T> for $C<T> {
            fn sub_assign(&mut self, s: T) {
                self.sub_scalar_inpl(s)
            }
        }

        impl<T: Scalar> MulAssign<T> for $C<T> {
            fn mul_assign(&mut self, s: T) {
                self.mul_inpl(s)
            }
        }

        impl<T: Scalar> DivAssign<T> for $C<T> {
            #[track_caller]
            fn div_assign(&mut self, s: T) {
                unwrap_op(self.div_inpl(s))
            }
        }

        impl<T: Scalar> RemAssign<T> for $C<T> {
            #[track_caller]
            fn rem_assign(&mut self, s: T) {
                unwrap_op(self.mod_inpl(s))
            }
        }

        impl<T: Integer> ShlAssign<u32> for $C<T> {
            #[track_caller]
            fn shl_assign(&mut self, bits: u32) {
                unwrap_op(self.shl_inpl(bits))
            }
        }

        impl<T: Integer> ShrAssign<u32> for $C<T> {
            #[track_caller]
            fn shr_assign(&mut self, bits: u32) {
                unwrap_op(self.shr_inpl(bits))
            }
        }
    };
}

container_ops!(Vector);
container_ops!(Matrix);

/// Scalar ⊕ container for one concrete element type. The orphan rule rules
/// out a blanket `impl<T> Add<&Vector<T>> for T`.
macro_rules! scalar_lhs_binop {
    ($t:ty, $C:ident, $Trait:ident, $method:ident, |$c:ident, $s:ident| $body:expr) => {
        impl $Trait<&$C<$t>> for $t {
            type Output = $C<$t>;

            #[track_caller]
            fn $method(self, rhs: &$C<$t>) -> $C<$t> {
                let ($c, $s) = (rhs, self);
                $body
            }
        }

        impl $Trait<$C<$t>> for $t {
            type Output = $C<$t>;

            #[track_caller]
            fn $method(self, rhs: $C<$t>) -> $C<$t> {
                let ($c, $s) = (&rhs, self);
                $body
            }
        }
    };
}

macro_rules! scalar_lhs_ops {
    ($($t:ty),*) => {$(
        scalar_lhs_ops!(@container $t, Vector);
        scalar_lhs_ops!(@container $t, Matrix);
    )*};
    (@container $t:ty, $C:ident) => {
        scalar_lhs_binop!($t, $C, Add, add, |c, s| c.add_scalar(s));
        scalar_lhs_binop!($t, $C, Sub, sub, |c, s| c.rsub_scalar(s));
        scalar_lhs_binop!($t, $C, Mul, mul, |c, s| c.mul_scalar(s));
        scalar_lhs_binop!($t, $C, Div, div, |c, s| unwrap_op(c.try_rdiv_scalar(s)));
        scalar_lhs_binop!($t, $C, Rem, rem, |c, s| unwrap_op(c.try_rmod_scalar(s)));
    };
}

scalar_lhs_ops!(f32, f64, i16, i32, i64);
