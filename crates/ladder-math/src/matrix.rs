use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};

/// Element arithmetic for the kernels. The integer impls wrap at the kind
/// width, matching the two's-complement scalar semantics; the float and
/// complex impls are the plain IEEE operations.
pub trait Element: Copy + Zero + One {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn neg(self) -> Self;
}

macro_rules! wrapping_element {
    ($($ty:ty),*) => {$(
        impl Element for $ty {
            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn neg(self) -> Self {
                self.wrapping_neg()
            }
        }
    )*};
}

macro_rules! plain_element {
    ($($ty:ty),*) => {$(
        impl Element for $ty {
            fn add(self, rhs: Self) -> Self {
                self + rhs
            }
            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }
            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }
            fn neg(self) -> Self {
                -self
            }
        }
    )*};
}

wrapping_element!(i32, i64);
plain_element!(f64, Complex64);

/// Dense row-major matrix with a shape fixed at construction. Every kernel
/// returns a freshly allocated matrix; shape disagreements between two
/// operands surface as `None` so the caller can attach its own diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Build from a flat row-major buffer of exactly `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MathError::Shape(format!(
                "matrix dimensions must be positive, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(MathError::Shape(format!(
                "buffer of length {} does not fill a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Build from nested rows. Fails on empty or ragged input.
    pub fn from_rows(source: Vec<Vec<T>>) -> Result<Self> {
        let rows = source.len();
        let cols = source.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(MathError::Shape(
                "matrix must have at least one row and one column".into(),
            ));
        }
        let mut data = Vec::with_capacity(rows * cols);
        for (index, row) in source.iter().enumerate() {
            if row.len() != cols {
                return Err(MathError::Shape(format!(
                    "row {index} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn same_shape(&self, other: &Matrix<T>) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Row-major view of the backing buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&value| f(value)).collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices, `None` otherwise.
    pub fn zip_with(&self, other: &Matrix<T>, mut f: impl FnMut(T, T) -> T) -> Option<Matrix<T>> {
        if !self.same_shape(other) {
            return None;
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Some(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }
}

impl<T: Element> Matrix<T> {
    pub fn add(&self, other: &Matrix<T>) -> Option<Matrix<T>> {
        self.zip_with(other, <T as Element>::add)
    }

    pub fn add_scalar(&self, scalar: T) -> Matrix<T> {
        self.map(|value| Element::add(value, scalar))
    }

    pub fn subtract(&self, other: &Matrix<T>) -> Option<Matrix<T>> {
        self.zip_with(other, T::sub)
    }

    pub fn subtract_scalar(&self, scalar: T) -> Matrix<T> {
        self.map(|value| value.sub(scalar))
    }

    /// `scalar - m[i][j]` at every position.
    pub fn subtract_from_scalar(&self, scalar: T) -> Matrix<T> {
        self.map(|value| scalar.sub(value))
    }

    pub fn multiply_scalar(&self, scalar: T) -> Matrix<T> {
        self.map(|value| Element::mul(value, scalar))
    }

    pub fn negate(&self) -> Matrix<T> {
        self.map(T::neg)
    }

    /// True matrix product; `None` unless `self.cols == other.rows`.
    pub fn matmul(&self, other: &Matrix<T>) -> Option<Matrix<T>> {
        if self.cols != other.rows {
            return None;
        }
        let mut data = Vec::with_capacity(self.rows * other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = T::zero();
                for k in 0..self.cols {
                    acc = Element::add(acc, Element::mul(self.get(i, k), other.get(k, j)));
                }
                data.push(acc);
            }
        }
        Some(Matrix {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }
}

impl<T: Copy + Zero> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Matrix<T> {
        Matrix {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }
}

impl<T: Copy + Zero + One> Matrix<T> {
    pub fn identity(size: usize) -> Matrix<T> {
        let mut data = vec![T::zero(); size * size];
        for i in 0..size {
            data[i * size + i] = T::one();
        }
        Matrix {
            rows: size,
            cols: size,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let result = Matrix::from_rows(vec![vec![1, 2], vec![3]]);
        assert!(matches!(result, Err(MathError::Shape(_))));
    }

    #[test]
    fn new_rejects_short_buffer() {
        let result = Matrix::new(2, 2, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(MathError::Shape(_))));
    }

    #[test]
    fn add_requires_matching_shapes() {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1, 2, 3]]).unwrap();
        assert_eq!(a.add(&b), None);

        let c = Matrix::from_rows(vec![vec![10, 20], vec![30, 40]]).unwrap();
        let sum = a.add(&c).unwrap();
        assert_eq!(sum.as_slice(), &[11, 22, 33, 44]);
    }

    #[test]
    fn matmul_checks_inner_dimension() {
        let a = Matrix::from_rows(vec![vec![1, 2, 3]]).unwrap();
        let b = Matrix::from_rows(vec![vec![4], vec![5], vec![6]]).unwrap();
        let product = a.matmul(&b).unwrap();
        assert_eq!((product.rows(), product.cols()), (1, 1));
        assert_eq!(product.get(0, 0), 32);
        assert_eq!(b.matmul(&b), None);
    }

    #[test]
    fn identity_multiplies_to_itself() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let id = Matrix::<f64>::identity(2);
        assert_eq!(id.matmul(&m).unwrap(), m);
        assert_eq!(m.matmul(&id).unwrap(), m);
    }

    #[test]
    fn integer_kernels_wrap_at_the_kind_width() {
        let top = Matrix::from_rows(vec![vec![i32::MAX]]).unwrap();
        let one = Matrix::from_rows(vec![vec![1]]).unwrap();
        assert_eq!(top.add(&one).unwrap().as_slice(), &[i32::MIN]);
        assert_eq!(top.add_scalar(1).as_slice(), &[i32::MIN]);
        assert_eq!(top.multiply_scalar(2).as_slice(), &[-2]);

        // The matmul accumulator wraps too.
        let two = Matrix::from_rows(vec![vec![2]]).unwrap();
        assert_eq!(top.matmul(&two).unwrap().as_slice(), &[-2]);

        let bottom = Matrix::from_rows(vec![vec![i64::MIN]]).unwrap();
        assert_eq!(bottom.negate().as_slice(), &[i64::MIN]);
        assert_eq!(bottom.subtract(&Matrix::from_rows(vec![vec![1i64]]).unwrap())
            .unwrap()
            .as_slice(), &[i64::MAX]);
    }

    #[test]
    fn scalar_kernels_broadcast() {
        let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(m.add_scalar(10).as_slice(), &[11, 12, 13, 14]);
        assert_eq!(m.subtract_scalar(1).as_slice(), &[0, 1, 2, 3]);
        assert_eq!(m.subtract_from_scalar(10).as_slice(), &[9, 8, 7, 6]);
        assert_eq!(m.multiply_scalar(3).as_slice(), &[3, 6, 9, 12]);
        assert_eq!(m.negate().as_slice(), &[-1, -2, -3, -4]);
    }
}
