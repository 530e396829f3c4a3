//! Error type for the operator layer and construction helpers.
//!
//! Every variant names the operation that rejected its input, so a failure
//! surfaces at the call site that caused it rather than later at an
//! unrelated one. All checks run before any allocation or mutation.

use std::error::Error;
use std::fmt;

use crate::shape::Shape;

/// Contract violations detected before a kernel runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinalgError {
    /// Element-wise operands (or a destination) do not have identical shapes.
    ShapeMismatch {
        /// Operation that rejected the operands.
        op: &'static str,
        /// Shape required by the operation.
        expected: Shape,
        /// Shape actually supplied.
        actual: Shape,
    },
    /// A single dimension is incompatible (e.g. the inner dimension of a
    /// matrix product).
    DimensionMismatch {
        /// Operation that rejected the operands.
        op: &'static str,
        /// Which dimension was checked (`"inner"`, `"rows"`, ...).
        dimension: &'static str,
        /// Required extent.
        expected: usize,
        /// Supplied extent.
        actual: usize,
    },
    /// An index or axis lies outside `0..bound`.
    IndexOutOfRange {
        /// Operation that rejected the index.
        op: &'static str,
        /// The offending index.
        index: usize,
        /// Exclusive upper bound.
        bound: usize,
    },
    /// A half-open range `start..end` is reversed or exceeds `len`.
    InvalidRange {
        /// Operation that rejected the range.
        op: &'static str,
        /// Range start (inclusive).
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Length of the indexed buffer.
        len: usize,
    },
    /// Integer division or remainder by zero.
    DivisionByZero {
        /// Operation that would have divided.
        op: &'static str,
        /// Index of the first zero divisor element, or `None` for a scalar
        /// divisor.
        index: Option<usize>,
    },
    /// Integer division or remainder of `MIN` by `-1`, whose quotient is
    /// not representable.
    DivisionOverflow {
        /// Operation that would have divided.
        op: &'static str,
        /// Index of the first overflowing element.
        index: usize,
    },
    /// A shift amount is not smaller than the element width.
    ShiftOverflow {
        /// Operation that rejected the shift.
        op: &'static str,
        /// Requested shift.
        bits: u32,
        /// Element width in bits.
        width: u32,
    },
    /// Operands were allocated by different arenas.
    ArenaMismatch {
        /// Operation that received the operands.
        op: &'static str,
    },
    /// A destination buffer is also an input of a kernel that reads inputs
    /// after writing outputs.
    AliasedOutput {
        /// Operation that rejected the destination.
        op: &'static str,
    },
    /// An argument is outside the operation's domain.
    InvalidArgument {
        /// Operation that rejected the argument.
        op: &'static str,
        /// Human-readable description.
        reason: String,
    },
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                op,
                expected,
                actual,
            } => {
                write!(f, "{op}: shape mismatch: expected {expected}, got {actual}")
            }
            Self::DimensionMismatch {
                op,
                dimension,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{op}: {dimension} dimension mismatch: expected {expected}, got {actual}"
                )
            }
            Self::IndexOutOfRange { op, index, bound } => {
                write!(f, "{op}: index {index} out of range for bound {bound}")
            }
            Self::InvalidRange {
                op,
                start,
                end,
                len,
            } => {
                write!(f, "{op}: invalid range {start}..{end} for length {len}")
            }
            Self::DivisionByZero { op, index } => {
                write!(f, "{op}: integer division by zero")?;
                if let Some(idx) = index {
                    write!(f, " at element {idx}")?;
                }
                Ok(())
            }
            Self::DivisionOverflow { op, index } => {
                write!(f, "{op}: integer division overflows at element {index}")
            }
            Self::ShiftOverflow { op, bits, width } => {
                write!(f, "{op}: shift by {bits} bits overflows {width}-bit elements")
            }
            Self::ArenaMismatch { op } => {
                write!(f, "{op}: operands belong to different arenas")
            }
            Self::AliasedOutput { op } => {
                write!(f, "{op}: destination aliases an operand")
            }
            Self::InvalidArgument { op, reason } => write!(f, "{op}: {reason}"),
        }
    }
}

impl Error for LinalgError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_names_operation_and_extents() {
        let err = LinalgError::DimensionMismatch {
            op: "Matrix::dot",
            dimension: "inner",
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "Matrix::dot: inner dimension mismatch: expected 3, got 4"
        );
    }

    #[test]
    fn shape_mismatch_display() {
        let err = LinalgError::ShapeMismatch {
            op: "add",
            expected: Shape::vector(3),
            actual: Shape::vector(2),
        };
        assert_eq!(err.to_string(), "add: shape mismatch: expected [3], got [2]");
    }

    #[test]
    fn division_by_zero_reports_element() {
        let err = LinalgError::DivisionByZero {
            op: "comp_div",
            index: Some(5),
        };
        assert_eq!(err.to_string(), "comp_div: integer division by zero at element 5");
        let err = LinalgError::DivisionByZero {
            op: "div_inpl",
            index: None,
        };
        assert_eq!(err.to_string(), "div_inpl: integer division by zero");
    }

    #[test]
    fn division_overflow_reports_element() {
        let err = LinalgError::DivisionOverflow {
            op: "div_inpl",
            index: 1,
        };
        assert_eq!(err.to_string(), "div_inpl: integer division overflows at element 1");
    }
}
