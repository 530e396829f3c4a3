//! Arena-backed row-major matrices.

use std::fmt;

use tessera_core::{Element, LinalgError, Shape, ShapeKind};

use crate::container::{sealed, Container};
use crate::handle::RawHandle;
use crate::vector::Vector;

/// A handle onto a `rows × cols` row-major buffer in an
/// [`Arena`](crate::Arena). Element `(r, c)` lives at flat index
/// `r * cols + c`.
pub struct Matrix<T: Element> {
    raw: RawHandle<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> Matrix<T> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `rows() == cols()`.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    fn check_index(&self, op: &'static str, row: usize, col: usize) -> Result<usize, LinalgError> {
        if row >= self.rows {
            return Err(LinalgError::IndexOutOfRange {
                op,
                index: row,
                bound: self.rows,
            });
        }
        if col >= self.cols {
            return Err(LinalgError::IndexOutOfRange {
                op,
                index: col,
                bound: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Element `(row, col)`, or an error when out of range.
    pub fn try_get(&self, row: usize, col: usize) -> Result<T, LinalgError> {
        let idx = self.check_index("Matrix::get", row, col)?;
        Ok(self.with_slice(|s| s[idx]))
    }

    /// Set element `(row, col)`, or return an error when out of range.
    pub fn try_set(&self, row: usize, col: usize, value: T) -> Result<(), LinalgError> {
        let idx = self.check_index("Matrix::set", row, col)?;
        self.with_slice_mut(|s| s[idx] = value);
        Ok(())
    }

    /// Element `(row, col)`.
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> T {
        self.try_get(row, col).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Set element `(row, col)` (visible through every alias).
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn set(&self, row: usize, col: usize, value: T) {
        self.try_set(row, col, value).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Copy of row `row` as a new temporary vector.
    pub fn row(&self, row: usize) -> Result<Vector<T>, LinalgError> {
        if row >= self.rows {
            return Err(LinalgError::IndexOutOfRange {
                op: "Matrix::row",
                index: row,
                bound: self.rows,
            });
        }
        let cols = self.cols;
        let values = self.with_slice(|s| s[row * cols..(row + 1) * cols].to_vec());
        Ok(self.temp_vector_from(&values))
    }

    /// Copy of column `col` as a new temporary vector.
    pub fn col(&self, col: usize) -> Result<Vector<T>, LinalgError> {
        if col >= self.cols {
            return Err(LinalgError::IndexOutOfRange {
                op: "Matrix::col",
                index: col,
                bound: self.cols,
            });
        }
        let values: Vec<T> =
            self.with_slice(|s| s.iter().skip(col).step_by(self.cols).copied().collect());
        Ok(self.temp_vector_from(&values))
    }

    fn temp_vector_from(&self, values: &[T]) -> Vector<T> {
        let out = <Vector<T> as sealed::Sealed<T>>::from_raw(
            self.raw.alloc_temp(Shape::vector(values.len())),
        );
        out.with_slice_mut(|dst| dst.copy_from_slice(values));
        out
    }
}

impl<T: Element> sealed::Sealed<T> for Matrix<T> {
    fn from_raw(raw: RawHandle<T>) -> Self {
        let Shape::Matrix { rows, cols } = raw.shape else {
            unreachable!("matrix handle with {} shape", ShapeKind::Vector);
        };
        Self { raw, rows, cols }
    }
}

impl<T: Element> Container<T> for Matrix<T> {
    type Rebind<U: Element> = Matrix<U>;

    fn raw(&self) -> &RawHandle<T> {
        &self.raw
    }
}

impl<T: Element> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: Element> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix<{}>{} ({})", T::NAME, self.raw.shape, self.raw.key)
    }
}
