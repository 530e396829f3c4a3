//! Dot products, matrix products and transpose.
//!
//! Allocating forms return one new temporary; `*_inpl` forms write into a
//! caller-supplied destination, which must not alias an operand because
//! these kernels read inputs after writing outputs.

use tessera_core::{LinalgError, Scalar, Shape};

use crate::container::sealed::Sealed;
use crate::container::Container;
use crate::matrix::Matrix;
use crate::ops::check_arena;
use crate::raw;
use crate::vector::Vector;

fn check_dim(
    op: &'static str,
    dimension: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), LinalgError> {
    if expected != actual {
        return Err(LinalgError::DimensionMismatch {
            op,
            dimension,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_not_aliased<T: Scalar, C: Container<T>>(
    op: &'static str,
    dst: &C,
    input: &C,
) -> Result<(), LinalgError> {
    if dst.key() == input.key() {
        return Err(LinalgError::AliasedOutput { op });
    }
    Ok(())
}

fn temp_vector<T: Scalar, C: Container<T>>(like: &C, len: usize) -> Vector<T> {
    Vector::from_raw(like.raw().alloc_temp(Shape::vector(len)))
}

fn temp_matrix<T: Scalar, C: Container<T>>(like: &C, rows: usize, cols: usize) -> Matrix<T> {
    Matrix::from_raw(like.raw().alloc_temp(Shape::matrix(rows, cols)))
}

impl<T: Scalar> Vector<T> {
    /// Inner product `Σ self[i] * rhs[i]`.
    pub fn dot(&self, rhs: &Vector<T>) -> Result<T, LinalgError> {
        check_arena("Vector::dot", self.raw(), rhs.raw())?;
        check_dim("Vector::dot", "length", self.len(), rhs.len())?;
        Ok(raw::dot_range(self.raw(), rhs.raw(), 0, self.len()))
    }

    /// Inner product restricted to indices `start..end`.
    pub fn dot_range(&self, rhs: &Vector<T>, start: usize, end: usize) -> Result<T, LinalgError> {
        check_arena("Vector::dot_range", self.raw(), rhs.raw())?;
        check_dim("Vector::dot_range", "length", self.len(), rhs.len())?;
        if start > end || end > self.len() {
            return Err(LinalgError::InvalidRange {
                op: "Vector::dot_range",
                start,
                end,
                len: self.len(),
            });
        }
        Ok(raw::dot_range(self.raw(), rhs.raw(), start, end))
    }

    /// Outer product `self ⊗ rhs` as a new `len × rhs.len` temporary.
    pub fn outer_dot(&self, rhs: &Vector<T>) -> Result<Matrix<T>, LinalgError> {
        check_arena("Vector::outer_dot", self.raw(), rhs.raw())?;
        let out = temp_matrix(self, self.len(), rhs.len());
        raw::outer(self.raw(), rhs.raw(), out.raw());
        Ok(out)
    }

    /// Outer product written into `dst`, which must be `len × rhs.len`.
    pub fn outer_dot_inpl(&self, rhs: &Vector<T>, dst: &Matrix<T>) -> Result<(), LinalgError> {
        const OP: &str = "Vector::outer_dot_inpl";
        check_arena(OP, self.raw(), rhs.raw())?;
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "rows", self.len(), dst.rows())?;
        check_dim(OP, "cols", rhs.len(), dst.cols())?;
        raw::outer(self.raw(), rhs.raw(), dst.raw());
        Ok(())
    }

    /// Row-vector product `selfᵀ A` as a new temporary of length
    /// `a.cols()`.
    pub fn dot_mat(&self, a: &Matrix<T>) -> Result<Vector<T>, LinalgError> {
        check_arena("Vector::dot_mat", self.raw(), a.raw())?;
        check_dim("Vector::dot_mat", "rows", self.len(), a.rows())?;
        let out = temp_vector(self, a.cols());
        raw::vec_mat(self.raw(), a.raw(), out.raw(), a.rows(), a.cols());
        Ok(out)
    }

    /// Row-vector product written into `dst` (length `a.cols()`).
    pub fn dot_mat_inpl(&self, a: &Matrix<T>, dst: &Vector<T>) -> Result<(), LinalgError> {
        const OP: &str = "Vector::dot_mat_inpl";
        check_arena(OP, self.raw(), a.raw())?;
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "rows", self.len(), a.rows())?;
        check_dim(OP, "output length", a.cols(), dst.len())?;
        check_not_aliased(OP, dst, self)?;
        raw::vec_mat(self.raw(), a.raw(), dst.raw(), a.rows(), a.cols());
        Ok(())
    }
}

impl<T: Scalar> Matrix<T> {
    /// Matrix product `self · b` as a new `rows × b.cols` temporary.
    pub fn dot(&self, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        check_arena("Matrix::dot", self.raw(), b.raw())?;
        check_dim("Matrix::dot", "inner", self.cols(), b.rows())?;
        let out = temp_matrix(self, self.rows(), b.cols());
        raw::mat_mat(self.raw(), b.raw(), out.raw(), self.rows(), self.cols(), b.cols(), false);
        Ok(out)
    }

    /// Matrix product written into `dst` (`rows × b.cols`).
    pub fn dot_inpl(&self, b: &Matrix<T>, dst: &Matrix<T>) -> Result<(), LinalgError> {
        const OP: &str = "Matrix::dot_inpl";
        check_arena(OP, self.raw(), b.raw())?;
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "inner", self.cols(), b.rows())?;
        check_dim(OP, "rows", self.rows(), dst.rows())?;
        check_dim(OP, "cols", b.cols(), dst.cols())?;
        check_not_aliased(OP, dst, self)?;
        check_not_aliased(OP, dst, b)?;
        raw::mat_mat(self.raw(), b.raw(), dst.raw(), self.rows(), self.cols(), b.cols(), false);
        Ok(())
    }

    /// `selfᵀ · b` without materialising the transpose, as a new
    /// `cols × b.cols` temporary.
    pub fn dot_trans_a(&self, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        check_arena("Matrix::dot_trans_a", self.raw(), b.raw())?;
        check_dim("Matrix::dot_trans_a", "inner", self.rows(), b.rows())?;
        let out = temp_matrix(self, self.cols(), b.cols());
        raw::mat_mat(self.raw(), b.raw(), out.raw(), self.cols(), self.rows(), b.cols(), true);
        Ok(out)
    }

    /// `selfᵀ · b` written into `dst` (`cols × b.cols`).
    pub fn dot_trans_a_inpl(&self, b: &Matrix<T>, dst: &Matrix<T>) -> Result<(), LinalgError> {
        const OP: &str = "Matrix::dot_trans_a_inpl";
        check_arena(OP, self.raw(), b.raw())?;
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "inner", self.rows(), b.rows())?;
        check_dim(OP, "rows", self.cols(), dst.rows())?;
        check_dim(OP, "cols", b.cols(), dst.cols())?;
        check_not_aliased(OP, dst, self)?;
        check_not_aliased(OP, dst, b)?;
        raw::mat_mat(self.raw(), b.raw(), dst.raw(), self.cols(), self.rows(), b.cols(), true);
        Ok(())
    }

    /// Matrix-vector product `self · x` as a new temporary of length
    /// `rows`.
    pub fn dot_vec(&self, x: &Vector<T>) -> Result<Vector<T>, LinalgError> {
        check_arena("Matrix::dot_vec", self.raw(), x.raw())?;
        check_dim("Matrix::dot_vec", "inner", self.cols(), x.len())?;
        let out = temp_vector(self, self.rows());
        raw::mat_vec(self.raw(), x.raw(), out.raw(), self.rows(), self.cols());
        Ok(out)
    }

    /// Matrix-vector product written into `dst` (length `rows`).
    pub fn dot_vec_inpl(&self, x: &Vector<T>, dst: &Vector<T>) -> Result<(), LinalgError> {
        const OP: &str = "Matrix::dot_vec_inpl";
        check_arena(OP, self.raw(), x.raw())?;
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "inner", self.cols(), x.len())?;
        check_dim(OP, "output length", self.rows(), dst.len())?;
        check_not_aliased(OP, dst, x)?;
        raw::mat_vec(self.raw(), x.raw(), dst.raw(), self.rows(), self.cols());
        Ok(())
    }

    /// Transpose as a new `cols × rows` temporary.
    pub fn trans(&self) -> Matrix<T> {
        let out = temp_matrix(self, self.cols(), self.rows());
        raw::trans(self.raw(), out.raw(), self.rows(), self.cols());
        out
    }

    /// Transpose written into `dst` (`cols × rows`).
    pub fn trans_inpl(&self, dst: &Matrix<T>) -> Result<(), LinalgError> {
        const OP: &str = "Matrix::trans_inpl";
        check_arena(OP, self.raw(), dst.raw())?;
        check_dim(OP, "rows", self.cols(), dst.rows())?;
        check_dim(OP, "cols", self.rows(), dst.cols())?;
        check_not_aliased(OP, dst, self)?;
        raw::trans(self.raw(), dst.raw(), self.rows(), self.cols());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arena, Elementwise, Init};
    use proptest::prelude::*;

    #[test]
    fn dot_of_ones_is_length() {
        let arena = Arena::default();
        for n in [1usize, 16, 100] {
            let x = arena.vec(n, Init::Fill(1.0f64));
            assert_eq!(x.dot(&x.clone()).unwrap(), n as f64);
        }
        assert_eq!(arena.temp_allocations_count(), 0);
    }

    #[test]
    fn dot_of_complementary_patterns_is_zero() {
        let arena = Arena::default();
        let x: Vec<i32> = (0..15).map(|i| i % 2).collect();
        let y: Vec<i32> = (0..15).map(|i| (i + 1) % 2).collect();
        assert_eq!(arena.vec_from(&x).dot(&arena.vec_from(&y)).unwrap(), 0);
    }

    #[test]
    fn dot_length_mismatch() {
        let arena = Arena::default();
        let a = arena.vec::<f32>(3, Init::Zeroed);
        let b = arena.vec::<f32>(4, Init::Zeroed);
        assert_eq!(
            a.dot(&b).unwrap_err().to_string(),
            "Vector::dot: length dimension mismatch: expected 3, got 4"
        );
    }

    #[test]
    fn dot_range_bounds() {
        let arena = Arena::default();
        let a = arena.vec_from(&[1, 2, 3, 4]);
        let b = arena.vec_from(&[1, 1, 1, 1]);
        assert_eq!(a.dot_range(&b, 1, 3).unwrap(), 5);
        assert!(matches!(
            a.dot_range(&b, 3, 1),
            Err(LinalgError::InvalidRange { .. })
        ));
        assert!(a.dot_range(&b, 0, 5).is_err());
    }

    #[test]
    fn outer_product() {
        let arena = Arena::default();
        let a = arena.vec_from(&[1, 2]);
        let b = arena.vec_from(&[3, 4, 5]);
        let m = a.outer_dot(&b).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.to_vec(), [3, 4, 5, 6, 8, 10]);
        let dst = arena.mat::<i32>(2, 3, Init::Zeroed);
        a.outer_dot_inpl(&b, &dst).unwrap();
        assert!(dst.equals_by_value(&m));
        let wrong = arena.mat::<i32>(3, 2, Init::Zeroed);
        assert!(a.outer_dot_inpl(&b, &wrong).is_err());
    }

    #[test]
    fn matrix_vector_products() {
        let arena = Arena::default();
        let a = arena.mat_from_rows(&[[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let x = arena.vec_from(&[1.0f32, 0.0, -1.0]);
        assert_eq!(a.dot_vec(&x).unwrap().to_vec(), [-2.0, -2.0]);
        let y = arena.vec_from(&[1.0f32, 2.0]);
        assert_eq!(y.dot_mat(&a).unwrap().to_vec(), [9.0, 12.0, 15.0]);
        let err = a.dot_vec(&y).unwrap_err();
        assert!(matches!(
            err,
            LinalgError::DimensionMismatch {
                op: "Matrix::dot_vec",
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn matrix_product_and_trans_a() {
        let arena = Arena::default();
        let a = arena.mat_from_rows(&[[1, 2, 3], [4, 5, 6]]);
        let b = arena.mat_from_rows(&[[7, 8], [9, 10], [11, 12]]);
        let c = a.dot(&b).unwrap();
        assert_eq!(c.to_vec(), [58, 64, 139, 154]);
        let at = a.trans();
        let via_trans = at.dot_trans_a(&b.trans()).unwrap_err();
        assert!(matches!(via_trans, LinalgError::DimensionMismatch { .. }));
        let atb = at.dot_trans_a(&arena.mat_from_rows(&[[1, 0], [0, 1], [1, 1]])).unwrap();
        let expected = a.dot(&arena.mat_from_rows(&[[1, 0], [0, 1], [1, 1]])).unwrap();
        assert!(atb.equals_by_value(&expected));
    }

    #[test]
    fn inner_dimension_mismatch_allocates_nothing() {
        let arena = Arena::default();
        let a = arena.mat::<f64>(2, 3, Init::Zeroed);
        let b = arena.mat::<f64>(4, 2, Init::Zeroed);
        assert_eq!(
            a.dot(&b).unwrap_err().to_string(),
            "Matrix::dot: inner dimension mismatch: expected 3, got 4"
        );
        assert_eq!(arena.temp_allocations_count(), 0);
    }

    #[test]
    fn in_place_destinations() {
        let arena = Arena::default();
        let a = arena.mat_from_rows(&[[1, 2], [3, 4]]);
        let dst = arena.mat::<i32>(2, 2, Init::Zeroed);
        a.dot_inpl(&a.clone(), &dst).unwrap();
        assert_eq!(dst.to_vec(), [7, 10, 15, 22]);
        a.trans_inpl(&dst).unwrap();
        assert_eq!(dst.to_vec(), [1, 3, 2, 4]);
        a.dot_trans_a_inpl(&a.clone(), &dst).unwrap();
        assert_eq!(dst.to_vec(), [10, 14, 14, 20]);
        let x = arena.vec_from(&[1, 1]);
        let y = arena.vec::<i32>(2, Init::Zeroed);
        a.dot_vec_inpl(&x, &y).unwrap();
        assert_eq!(y.to_vec(), [3, 7]);
        x.dot_mat_inpl(&a, &y).unwrap();
        assert_eq!(y.to_vec(), [4, 6]);
        assert_eq!(arena.temp_allocations_count(), 0);
    }

    #[test]
    fn aliased_destinations_rejected() {
        let arena = Arena::default();
        let a = arena.mat_from_rows(&[[1, 2], [3, 4]]);
        assert_eq!(
            a.dot_inpl(&a.clone(), &a.clone()).unwrap_err(),
            LinalgError::AliasedOutput {
                op: "Matrix::dot_inpl"
            }
        );
        assert!(a.trans_inpl(&a.clone()).is_err());
        let x = arena.vec_from(&[1, 1]);
        assert!(a.dot_vec_inpl(&x, &x.clone()).is_err());
        assert_eq!(a.to_vec(), [1, 2, 3, 4]);
    }

    fn arb_matrix() -> impl Strategy<Value = (usize, usize, Vec<i64>)> {
        (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
            proptest::collection::vec(-100i64..100, r * c).prop_map(move |v| (r, c, v))
        })
    }

    fn arb_float_matrix() -> impl Strategy<Value = (usize, usize, Vec<f64>)> {
        (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
            proptest::collection::vec(-1e3f64..1e3, r * c).prop_map(move |v| (r, c, v))
        })
    }

    fn identity<T: Scalar>(arena: &Arena, n: usize) -> Matrix<T> {
        let m = arena.mat(n, n, Init::Zeroed);
        for i in 0..n {
            m.set(i, i, T::ONE);
        }
        m
    }

    proptest! {
        #[test]
        fn identity_law((r, c, values) in arb_matrix()) {
            let arena = Arena::default();
            let a = arena.mat_from(r, c, &values).unwrap();
            prop_assert!(a.dot(&identity(&arena, c)).unwrap().equals_by_value(&a));
            prop_assert!(identity(&arena, r).dot(&a).unwrap().equals_by_value(&a));
        }

        #[test]
        fn identity_law_within_epsilon((r, c, values) in arb_float_matrix()) {
            let arena = Arena::default();
            let a = arena.mat_from(r, c, &values).unwrap();
            prop_assert!(a.dot(&identity(&arena, c)).unwrap().almost_equals_by_value(&a, 1e-9));
            prop_assert!(identity(&arena, r).dot(&a).unwrap().almost_equals_by_value(&a, 1e-9));
            let ita = identity(&arena, r).dot_trans_a(&a).unwrap();
            prop_assert!(ita.almost_equals_by_value(&a, 1e-9));
        }

        #[test]
        fn transpose_involution((r, c, values) in arb_matrix()) {
            let arena = Arena::default();
            let a = arena.mat_from(r, c, &values).unwrap();
            let back = a.trans().trans();
            prop_assert_eq!((back.rows(), back.cols()), (r, c));
            prop_assert!(back.equals_by_value(&a));
            prop_assert_eq!(arena.temp_allocations_count(), 2);
        }

        #[test]
        fn float_transpose_involution((r, c, values) in arb_float_matrix()) {
            let arena = Arena::default();
            let a = arena.mat_from(r, c, &values).unwrap();
            let back = a.trans().trans();
            prop_assert_eq!((back.rows(), back.cols()), (r, c));
            prop_assert!(back.almost_equals_by_value(&a, 1e-12));
        }
    }
}
