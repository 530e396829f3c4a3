//! Allocation shapes.

use std::fmt;

/// Whether an allocation is one- or two-dimensional.
///
/// Vectors and matrices live in separate arena pools even when their
/// element type and lifetime match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// A 1-D buffer.
    Vector,
    /// A 2-D row-major buffer.
    Matrix,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Matrix => write!(f, "matrix"),
        }
    }
}

/// Dimensions of a container, fixed at allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A vector of `len` elements.
    Vector {
        /// Number of elements.
        len: usize,
    },
    /// A row-major matrix; element `(r, c)` lives at `r * cols + c`.
    Matrix {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
}

impl Shape {
    /// Shape of a vector.
    pub fn vector(len: usize) -> Self {
        Self::Vector { len }
    }

    /// Shape of a `rows × cols` matrix.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::Matrix { rows, cols }
    }

    /// Vector or matrix.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Vector { .. } => ShapeKind::Vector,
            Self::Matrix { .. } => ShapeKind::Matrix,
        }
    }

    /// Total number of elements in the flat buffer.
    pub fn len(&self) -> usize {
        match *self {
            Self::Vector { len } => len,
            Self::Matrix { rows, cols } => rows * cols,
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector { len } => write!(f, "[{len}]"),
            Self::Matrix { rows, cols } => write!(f, "[{rows}x{cols}]"),
        }
    }
}
