use std::fmt::{self, Display, Formatter};

use ladder_math::{Element, Matrix};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::token::scalar::write_complex;
use crate::token::{conversion_message, not_supported_message, Token};
use crate::ty::TokenType;

/// One engine serves all four matrix kinds; the kernel [`Element`] trait
/// fixes the arithmetic (wrapping for the integer kinds) and this trait
/// carries the few token-specific decisions.
pub(crate) trait MatrixElement: Element + PartialEq {
    /// Closeness of two elements. Integral elements degenerate to
    /// equality.
    fn close(a: Self, b: Self, epsilon: f64) -> bool;
    /// Pull the element out of a scalar token already converted to this
    /// matrix's element tag.
    fn scalar(token: &Token) -> Option<Self>;
    fn wrap(matrix: Matrix<Self>) -> Token;
    fn display(value: &Self, f: &mut Formatter<'_>) -> fmt::Result;
}

impl MatrixElement for i32 {
    fn close(a: Self, b: Self, _epsilon: f64) -> bool {
        a == b
    }
    fn scalar(token: &Token) -> Option<Self> {
        match token {
            Token::Int(i) => Some(i.value),
            _ => None,
        }
    }
    fn wrap(matrix: Matrix<Self>) -> Token {
        Token::IntMatrix(IntMatrixToken::new(matrix))
    }
    fn display(value: &Self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

impl MatrixElement for i64 {
    fn close(a: Self, b: Self, _epsilon: f64) -> bool {
        a == b
    }
    fn scalar(token: &Token) -> Option<Self> {
        match token {
            Token::Long(l) => Some(l.value),
            _ => None,
        }
    }
    fn wrap(matrix: Matrix<Self>) -> Token {
        Token::LongMatrix(LongMatrixToken::new(matrix))
    }
    fn display(value: &Self, f: &mut Formatter<'_>) -> fmt::Result {
        // Keep the long suffix so the printed form reparses at the same kind.
        write!(f, "{value}L")
    }
}

impl MatrixElement for f64 {
    fn close(a: Self, b: Self, epsilon: f64) -> bool {
        (a - b).abs() <= epsilon
    }
    fn scalar(token: &Token) -> Option<Self> {
        match token {
            Token::Double(d) => Some(d.value),
            // A smooth scalar broadcasts by its sample value.
            Token::Smooth(s) => Some(s.value),
            _ => None,
        }
    }
    fn wrap(matrix: Matrix<Self>) -> Token {
        Token::DoubleMatrix(DoubleMatrixToken::new(matrix))
    }
    fn display(value: &Self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{value:?}")
    }
}

impl MatrixElement for Complex64 {
    fn close(a: Self, b: Self, epsilon: f64) -> bool {
        (a - b).norm() <= epsilon
    }
    fn scalar(token: &Token) -> Option<Self> {
        match token {
            Token::Complex(c) => Some(c.value),
            _ => None,
        }
    }
    fn wrap(matrix: Matrix<Self>) -> Token {
        Token::ComplexMatrix(ComplexMatrixToken::new(matrix))
    }
    fn display(value: &Self, f: &mut Formatter<'_>) -> fmt::Result {
        write_complex(f, value)
    }
}

/// wrap struct declare for one matrix kind
macro_rules! matrix_token {
    ($(#[$attr:meta])* $name:ident: $ty:ty) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
        pub struct $name {
            pub value: Matrix<$ty>,
        }
        impl $name {
            pub fn new(value: Matrix<$ty>) -> Self {
                Self { value }
            }
            pub fn from_rows(rows: Vec<Vec<$ty>>) -> Result<Self> {
                Matrix::from_rows(rows)
                    .map(Self::new)
                    .map_err(|e| Error::ConstructionInvariantViolation(e.to_string()))
            }
            pub fn rows(&self) -> usize {
                self.value.rows()
            }
            pub fn columns(&self) -> usize {
                self.value.cols()
            }
        }
        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write_matrix(f, &self.value)
            }
        }
    };
}

matrix_token! {
    IntMatrixToken: i32
}
matrix_token! {
    LongMatrixToken: i64
}
matrix_token! {
    DoubleMatrixToken: f64
}
matrix_token! {
    /// Elements render in the `a + bi` form of the complex scalar.
    ComplexMatrixToken: Complex64
}

/// narrow an arbitrary token to one matrix kind, when the ordering
/// licenses it
macro_rules! matrix_convert {
    ($name:ident, $variant:ident, $tag:expr) => {
        impl $name {
            pub fn convert(token: &Token) -> Result<$name> {
                match crate::convert::convert(token, &$tag)? {
                    Token::$variant(converted) => Ok(converted),
                    other => Err(Error::ConversionFailure(conversion_message(&other, &$tag))),
                }
            }
        }
    };
}

matrix_convert!(IntMatrixToken, IntMatrix, TokenType::IntMatrix);
matrix_convert!(LongMatrixToken, LongMatrix, TokenType::LongMatrix);
matrix_convert!(DoubleMatrixToken, DoubleMatrix, TokenType::DoubleMatrix);
matrix_convert!(ComplexMatrixToken, ComplexMatrix, TokenType::ComplexMatrix);

/// Rows separated by semicolons: `[1, 2; 3, 4]`.
fn write_matrix<T: MatrixElement>(f: &mut Formatter<'_>, matrix: &Matrix<T>) -> fmt::Result {
    write!(f, "[")?;
    for row in 0..matrix.rows() {
        if row > 0 {
            write!(f, "; ")?;
        }
        for col in 0..matrix.cols() {
            if col > 0 {
                write!(f, ", ")?;
            }
            T::display(&matrix.get(row, col), f)?;
        }
    }
    write!(f, "]")
}

/// Hooks for two matrices of the same kind; the dispatcher has already
/// widened the lower one.
pub(crate) fn apply<T: MatrixElement>(op: Operator, x: &Matrix<T>, y: &Matrix<T>) -> Result<Token> {
    match op {
        Operator::Add => x.add(y).map(T::wrap).ok_or_else(|| {
            Error::ShapeMismatch("Cannot add two matrices with different dimensions.".into())
        }),
        Operator::Subtract => x.subtract(y).map(T::wrap).ok_or_else(|| {
            Error::ShapeMismatch("Cannot subtract two matrices with different dimensions.".into())
        }),
        Operator::Multiply => x.matmul(y).map(T::wrap).ok_or_else(|| {
            Error::ShapeMismatch(format!(
                "Cannot multiply matrix with {} columns by a matrix with {} rows.",
                x.cols(),
                y.rows()
            ))
        }),
        Operator::IsEqualTo => Ok(Token::boolean(x == y)),
        Operator::IsCloseTo { epsilon } => {
            if !x.same_shape(y) {
                return Ok(Token::boolean(false));
            }
            let close = x
                .as_slice()
                .iter()
                .zip(y.as_slice())
                .all(|(a, b)| T::close(*a, *b, epsilon));
            Ok(Token::boolean(close))
        }
        _ => Err(Error::UnsupportedOperation(not_supported_message(
            op.name(Role::Forward),
            &T::wrap(x.clone()),
            &T::wrap(y.clone()),
        ))),
    }
}

/// Broadcast hooks for a matrix receiver and a scalar already converted to
/// the element tag. Only entered for arithmetic operators; the dispatcher
/// rewraps any failure against the original operands.
pub(crate) fn element_scalar(
    op: Operator,
    role: Role,
    receiver: &Token,
    scalar: &Token,
) -> Result<Token> {
    match receiver {
        Token::IntMatrix(m) => element_typed(op, role, &m.value, scalar),
        Token::LongMatrix(m) => element_typed(op, role, &m.value, scalar),
        Token::DoubleMatrix(m) => element_typed(op, role, &m.value, scalar),
        Token::ComplexMatrix(m) => element_typed(op, role, &m.value, scalar),
        other => bail!("element broadcast on a non-matrix receiver: {other}"),
    }
}

fn element_typed<T: MatrixElement>(
    op: Operator,
    role: Role,
    matrix: &Matrix<T>,
    scalar: &Token,
) -> Result<Token> {
    let Some(value) = T::scalar(scalar) else {
        bail!("scalar {scalar} does not match the matrix element kind");
    };
    match (op, role) {
        (Operator::Add, _) => Ok(T::wrap(matrix.add_scalar(value))),
        (Operator::Subtract, Role::Forward) => Ok(T::wrap(matrix.subtract_scalar(value))),
        // scalar - matrix
        (Operator::Subtract, Role::Reverse) => Ok(T::wrap(matrix.subtract_from_scalar(value))),
        (Operator::Multiply, _) => Ok(T::wrap(matrix.multiply_scalar(value))),
        (op, _) => bail!("no {} broadcast between a matrix and a scalar", op.name(role)),
    }
}
