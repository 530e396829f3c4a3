//! Element capability traits.
//!
//! Every container, kernel and operator is written once against these
//! traits and instantiated for the six supported element types:
//!
//! | Type | [`Element`] | [`Scalar`] | [`Float`] | [`Integer`] | [`Bitwise`] |
//! |------|:-:|:-:|:-:|:-:|:-:|
//! | `f32`, `f64` | ✓ | ✓ | ✓ | | |
//! | `i16`, `i32`, `i64` | ✓ | ✓ | | ✓ | ✓ |
//! | `bool` | ✓ | | | | ✓ |
//!
//! Integer division and remainder truncate toward zero; float remainder is
//! `fmod` (the sign follows the dividend). Both are the native Rust
//! operators, so kernels never special-case them.

use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitOr, BitXor, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem,
    RemAssign, Shl, Shr, Sub, SubAssign,
};

/// A value that can be stored in an arena buffer.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Short type name used in diagnostics (`"f32"`, `"bool"`, ...).
    const NAME: &'static str;

    /// Whether this value is a floating-point NaN. Always `false` for
    /// non-float elements.
    fn is_nan(self) -> bool {
        false
    }
}

/// An element with arithmetic.
pub trait Scalar:
    Element
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + RemAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// `true` for integer instantiations, where division by zero is an error
    /// rather than an IEEE infinity.
    const IS_INTEGER: bool;

    /// Absolute value. Integers saturate: `MIN.abs()` is `MAX`.
    fn abs(self) -> Self;

    /// Lossy conversion from `f64` (`as` cast semantics: truncation toward
    /// zero and saturation for integers).
    fn from_f64(v: f64) -> Self;

    /// Lossy conversion to `f64`.
    fn to_f64(self) -> f64;

    /// Whether this value equals [`Scalar::ZERO`].
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Whether `self / divisor` (and `self % divisor`) overflows: integer
    /// `MIN / -1`. Always `false` for floats.
    fn div_overflows(self, _divisor: Self) -> bool {
        false
    }
}

/// A floating-point scalar.
pub trait Float: Scalar {
    /// Machine epsilon.
    const EPSILON: Self;
    /// Quiet NaN.
    const NAN: Self;

    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine (radians).
    fn sin(self) -> Self;
    /// Cosine (radians).
    fn cos(self) -> Self;
    /// Neither infinite nor NaN.
    fn is_finite(self) -> bool;
}

/// An element supporting `& | ^ !`.
pub trait Bitwise:
    Element
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
}

/// A signed integer scalar.
pub trait Integer:
    Scalar + Bitwise + Eq + Ord + Shl<u32, Output = Self> + Shr<u32, Output = Self>
{
    /// Width in bits; shift amounts must be strictly smaller.
    const BITS: u32;
}

macro_rules! impl_float {
    ($($t:ident),*) => {$(
        impl Element for $t {
            const NAME: &'static str = stringify!($t);

            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }
        }

        impl Scalar for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const IS_INTEGER: bool = false;

            fn abs(self) -> Self {
                <$t>::abs(self)
            }

            fn from_f64(v: f64) -> Self {
                v as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }

        impl Float for $t {
            const EPSILON: Self = <$t>::EPSILON;
            const NAN: Self = <$t>::NAN;

            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            fn sin(self) -> Self {
                <$t>::sin(self)
            }

            fn cos(self) -> Self {
                <$t>::cos(self)
            }

            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }
        }
    )*};
}

macro_rules! impl_integer {
    ($($t:ident),*) => {$(
        impl Element for $t {
            const NAME: &'static str = stringify!($t);
        }

        impl Scalar for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const IS_INTEGER: bool = true;

            fn abs(self) -> Self {
                self.saturating_abs()
            }

            fn div_overflows(self, divisor: Self) -> bool {
                self == <$t>::MIN && divisor == -1
            }

            fn from_f64(v: f64) -> Self {
                v as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }

        impl Bitwise for $t {}

        impl Integer for $t {
            const BITS: u32 = <$t>::BITS;
        }
    )*};
}

impl_float!(f32, f64);
impl_integer!(i16, i32, i64);

impl Element for bool {
    const NAME: &'static str = "bool";
}

impl Bitwise for bool {}
