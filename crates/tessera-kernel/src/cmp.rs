//! Element-wise comparisons producing boolean masks.

use tessera_core::Scalar;

use crate::zip_map;

/// Comparison applied by [`comp_cmp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `lhs < rhs`
    Lt,
    /// `lhs <= rhs`
    Le,
    /// `lhs > rhs`
    Gt,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

impl Comparison {
    /// Evaluate the comparison for one pair. NaN compares false for every
    /// variant.
    #[inline]
    pub fn eval<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Eq => a == b,
        }
    }
}

/// `dst[i] = cmp(lhs[i], rhs[i])`.
///
/// # Safety
///
/// `lhs` and `rhs` must be valid for reads of `len` elements and `dst` for
/// writes of `len` booleans.
pub unsafe fn comp_cmp<T: Scalar>(
    dst: *mut bool,
    lhs: *const T,
    rhs: *const T,
    len: usize,
    cmp: Comparison,
) {
    // SAFETY: forwarded caller contract; `dst` has a different element
    // type so it cannot alias the inputs.
    unsafe { zip_map(dst, lhs, rhs, len, |a, b| cmp.eval(a, b)) }
}
