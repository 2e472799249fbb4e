mod array;
mod dispatch;
mod matrix;
mod scalar;
mod smooth;

pub use array::*;
pub use matrix::*;
pub use scalar::*;
pub use smooth::*;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use derive_more::From;
use ladder_math::{FixPoint, Matrix};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::ty::{self, TokenType};

/// One immutable value of the algebra. Every variant wraps its payload
/// struct; binary operations never mutate, they produce fresh tokens at
/// the unified kind of their operands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, From)]
pub enum Token {
    Nil,
    Boolean(BooleanToken),
    Byte(ByteToken),
    Int(IntToken),
    Long(LongToken),
    Double(DoubleToken),
    Smooth(SmoothToken),
    Complex(ComplexToken),
    Fix(FixToken),
    String(StringToken),
    Array(ArrayToken),
    IntMatrix(IntMatrixToken),
    LongMatrix(LongMatrixToken),
    DoubleMatrix(DoubleMatrixToken),
    ComplexMatrix(ComplexMatrixToken),
}

impl Token {
    pub fn boolean(value: bool) -> Token {
        Token::Boolean(BooleanToken::new(value))
    }
    pub fn byte(value: u8) -> Token {
        Token::Byte(ByteToken::new(value))
    }
    pub fn int(value: i32) -> Token {
        Token::Int(IntToken::new(value))
    }
    pub fn long(value: i64) -> Token {
        Token::Long(LongToken::new(value))
    }
    pub fn double(value: f64) -> Token {
        Token::Double(DoubleToken::new(value))
    }
    pub fn smooth(value: f64, derivatives: Vec<f64>) -> Token {
        Token::Smooth(SmoothToken::new(value, derivatives))
    }
    pub fn complex(re: f64, im: f64) -> Token {
        Token::Complex(ComplexToken::new(Complex64::new(re, im)))
    }
    pub fn fix(value: f64, total: u32, integer: u32) -> Result<Token> {
        Ok(Token::Fix(FixToken::new(value, total, integer)?))
    }
    pub fn string(value: impl Into<String>) -> Token {
        Token::String(StringToken::new(value))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Token::Nil)
    }

    /// Kind tag of this token. A smooth value deliberately reports the
    /// double tag, which is what makes it substitutable for a double.
    pub fn token_type(&self) -> TokenType {
        match self {
            Token::Nil => TokenType::Nil,
            Token::Boolean(_) => TokenType::Boolean,
            Token::Byte(_) => TokenType::Byte,
            Token::Int(_) => TokenType::Int,
            Token::Long(_) => TokenType::Long,
            Token::Double(_) | Token::Smooth(_) => TokenType::Double,
            Token::Complex(_) => TokenType::Complex,
            Token::Fix(_) => TokenType::Fix,
            Token::String(_) => TokenType::String,
            Token::Array(array) => array.token_type(),
            Token::IntMatrix(_) => TokenType::IntMatrix,
            Token::LongMatrix(_) => TokenType::LongMatrix,
            Token::DoubleMatrix(_) => TokenType::DoubleMatrix,
            Token::ComplexMatrix(_) => TokenType::ComplexMatrix,
        }
    }

    pub fn add(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Add, Role::Forward, self, other)
    }
    pub fn add_reverse(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Add, Role::Reverse, self, other)
    }
    pub fn subtract(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Subtract, Role::Forward, self, other)
    }
    pub fn subtract_reverse(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Subtract, Role::Reverse, self, other)
    }
    pub fn multiply(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Multiply, Role::Forward, self, other)
    }
    pub fn multiply_reverse(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Multiply, Role::Reverse, self, other)
    }
    pub fn divide(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Divide, Role::Forward, self, other)
    }
    pub fn divide_reverse(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Divide, Role::Reverse, self, other)
    }
    pub fn modulo(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Modulo, Role::Forward, self, other)
    }
    pub fn modulo_reverse(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::Modulo, Role::Reverse, self, other)
    }

    /// Exact equality after promotion to the common kind. Any nil operand
    /// makes this `false`, including nil against nil.
    pub fn is_equal_to(&self, other: &Token) -> Result<bool> {
        predicate(dispatch::resolve(
            Operator::IsEqualTo,
            Role::Forward,
            self,
            other,
        )?)
    }

    /// Equality within `epsilon`, elementwise for aggregates. Integral
    /// kinds ignore the tolerance.
    pub fn is_close_to(&self, other: &Token, epsilon: f64) -> Result<bool> {
        predicate(dispatch::resolve(
            Operator::IsCloseTo { epsilon },
            Role::Forward,
            self,
            other,
        )?)
    }

    /// Closeness at the [`DEFAULT_EPSILON`](crate::DEFAULT_EPSILON) tolerance.
    pub fn is_close_to_default(&self, other: &Token) -> Result<bool> {
        self.is_close_to(other, crate::DEFAULT_EPSILON)
    }

    pub fn is_less_than(&self, other: &Token) -> Result<bool> {
        predicate(dispatch::resolve(
            Operator::IsLessThan,
            Role::Forward,
            self,
            other,
        )?)
    }

    pub fn bitwise_and(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::BitwiseAnd, Role::Forward, self, other)
    }
    pub fn bitwise_or(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::BitwiseOr, Role::Forward, self, other)
    }
    pub fn bitwise_xor(&self, other: &Token) -> Result<Token> {
        dispatch::resolve(Operator::BitwiseXor, Role::Forward, self, other)
    }

    pub fn bitwise_not(&self) -> Result<Token> {
        match self {
            Token::Boolean(b) => Ok(Token::boolean(!b.value)),
            Token::Byte(b) => Ok(Token::byte(!b.value)),
            Token::Int(i) => Ok(Token::int(!i.value)),
            Token::Long(l) => Ok(Token::long(!l.value)),
            other => Err(unary_unsupported("bitwise_not", other)),
        }
    }

    /// Additive identity of this token's kind, shaped like the token
    /// itself for aggregates.
    pub fn zero(&self) -> Result<Token> {
        match self {
            Token::Nil => Err(Error::UnsupportedOperation(format!(
                "Additive identity not supported on {}.",
                self.token_type()
            ))),
            Token::Boolean(_) => Ok(Token::boolean(false)),
            Token::Byte(_) => Ok(Token::byte(0)),
            Token::Int(_) => Ok(Token::int(0)),
            Token::Long(_) => Ok(Token::long(0)),
            Token::Double(_) | Token::Smooth(_) => Ok(Token::double(0.0)),
            Token::Complex(_) => Ok(Token::complex(0.0, 0.0)),
            Token::Fix(f) => Ok(Token::Fix(FixToken::from_fix(FixPoint::quantize(
                0.0,
                f.value.precision(),
            )?))),
            Token::String(_) => Ok(Token::string("")),
            Token::Array(a) => Ok(Token::Array(a.zero()?)),
            Token::IntMatrix(m) => Ok(Token::IntMatrix(IntMatrixToken::new(Matrix::zeros(
                m.rows(),
                m.columns(),
            )))),
            Token::LongMatrix(m) => Ok(Token::LongMatrix(LongMatrixToken::new(Matrix::zeros(
                m.rows(),
                m.columns(),
            )))),
            Token::DoubleMatrix(m) => Ok(Token::DoubleMatrix(DoubleMatrixToken::new(
                Matrix::zeros(m.rows(), m.columns()),
            ))),
            Token::ComplexMatrix(m) => Ok(Token::ComplexMatrix(ComplexMatrixToken::new(
                Matrix::zeros(m.rows(), m.columns()),
            ))),
        }
    }

    /// Multiplicative identity. For matrices this is the left identity,
    /// sized by the row count.
    pub fn one(&self) -> Result<Token> {
        match self {
            Token::Nil | Token::String(_) => Err(Error::UnsupportedOperation(format!(
                "Multiplicative identity not supported on {}.",
                self.token_type()
            ))),
            Token::Boolean(_) => Ok(Token::boolean(true)),
            Token::Byte(_) => Ok(Token::byte(1)),
            Token::Int(_) => Ok(Token::int(1)),
            Token::Long(_) => Ok(Token::long(1)),
            Token::Double(_) | Token::Smooth(_) => Ok(Token::double(1.0)),
            Token::Complex(_) => Ok(Token::complex(1.0, 0.0)),
            Token::Fix(f) => Ok(Token::Fix(FixToken::from_fix(FixPoint::quantize(
                1.0,
                f.value.precision(),
            )?))),
            Token::Array(a) => Ok(Token::Array(a.one()?)),
            Token::IntMatrix(m) => Ok(Token::IntMatrix(IntMatrixToken::new(Matrix::identity(
                m.rows(),
            )))),
            Token::LongMatrix(m) => Ok(Token::LongMatrix(LongMatrixToken::new(Matrix::identity(
                m.rows(),
            )))),
            Token::DoubleMatrix(m) => Ok(Token::DoubleMatrix(DoubleMatrixToken::new(
                Matrix::identity(m.rows()),
            ))),
            Token::ComplexMatrix(m) => Ok(Token::ComplexMatrix(ComplexMatrixToken::new(
                Matrix::identity(m.rows()),
            ))),
        }
    }

    /// Right multiplicative identity: for matrices an identity sized by
    /// the column count, for everything else the same as [`Token::one`].
    pub fn one_right(&self) -> Result<Token> {
        match self {
            Token::IntMatrix(m) => Ok(Token::IntMatrix(IntMatrixToken::new(Matrix::identity(
                m.columns(),
            )))),
            Token::LongMatrix(m) => Ok(Token::LongMatrix(LongMatrixToken::new(Matrix::identity(
                m.columns(),
            )))),
            Token::DoubleMatrix(m) => Ok(Token::DoubleMatrix(DoubleMatrixToken::new(
                Matrix::identity(m.columns()),
            ))),
            Token::ComplexMatrix(m) => Ok(Token::ComplexMatrix(ComplexMatrixToken::new(
                Matrix::identity(m.columns()),
            ))),
            other => other.one(),
        }
    }

    /// Magnitude. A complex magnitude is real, so the result kind can
    /// differ from the receiver kind.
    pub fn absolute(&self) -> Result<Token> {
        match self {
            Token::Byte(_) => Ok(self.clone()),
            Token::Int(i) => Ok(Token::int(i.value.wrapping_abs())),
            Token::Long(l) => Ok(Token::long(l.value.wrapping_abs())),
            Token::Double(d) => Ok(Token::double(d.value.abs())),
            Token::Smooth(s) => Ok(Token::double(s.value.abs())),
            Token::Complex(c) => Ok(Token::double(c.value.norm())),
            Token::Fix(f) => Ok(Token::Fix(FixToken::from_fix(f.value.abs()))),
            other => Err(unary_unsupported("absolute", other)),
        }
    }

    /// Shift left, zero filling. The shift count is masked the way the
    /// widened hardware shift masks it, so a byte shifted by 8 is 0.
    pub fn shift_left(&self, bits: u32) -> Result<Token> {
        match self {
            Token::Byte(b) => Ok(Token::byte(((b.value as u32) << (bits & 31)) as u8)),
            Token::Int(i) => Ok(Token::int(i.value.wrapping_shl(bits))),
            Token::Long(l) => Ok(Token::long(l.value.wrapping_shl(bits))),
            other => Err(unary_unsupported("shift_left", other)),
        }
    }

    /// Arithmetic shift right, propagating the sign bit of signed kinds.
    pub fn shift_right(&self, bits: u32) -> Result<Token> {
        match self {
            Token::Byte(b) => Ok(Token::byte(((b.value as u32) >> (bits & 31)) as u8)),
            Token::Int(i) => Ok(Token::int(i.value.wrapping_shr(bits))),
            Token::Long(l) => Ok(Token::long(l.value.wrapping_shr(bits))),
            other => Err(unary_unsupported("shift_right", other)),
        }
    }

    /// Shift right with zero fill regardless of sign.
    pub fn logical_shift_right(&self, bits: u32) -> Result<Token> {
        match self {
            Token::Byte(b) => Ok(Token::byte(((b.value as u32) >> (bits & 31)) as u8)),
            Token::Int(i) => Ok(Token::int(((i.value as u32).wrapping_shr(bits)) as i32)),
            Token::Long(l) => Ok(Token::long(((l.value as u64).wrapping_shr(bits)) as i64)),
            other => Err(unary_unsupported("logical_shift_right", other)),
        }
    }

    pub fn boolean_value(&self) -> Result<bool> {
        match self {
            Token::Boolean(b) => Ok(b.value),
            other => Err(projection_error(other, TokenType::Boolean)),
        }
    }

    pub fn byte_value(&self) -> Result<u8> {
        match self {
            Token::Byte(b) => Ok(b.value),
            other => Err(projection_error(other, TokenType::Byte)),
        }
    }

    pub fn int_value(&self) -> Result<i32> {
        match self {
            Token::Byte(b) => Ok(b.value as i32),
            Token::Int(i) => Ok(i.value),
            other => Err(projection_error(other, TokenType::Int)),
        }
    }

    pub fn long_value(&self) -> Result<i64> {
        match self {
            Token::Byte(b) => Ok(b.value as i64),
            Token::Int(i) => Ok(i.value as i64),
            Token::Long(l) => Ok(l.value),
            other => Err(projection_error(other, TokenType::Long)),
        }
    }

    /// Numeric reading as a double, for every kind that loses nothing by
    /// it. A smooth token reads as its sample value.
    pub fn double_value(&self) -> Result<f64> {
        match self {
            Token::Byte(b) => Ok(b.value as f64),
            Token::Int(i) => Ok(i.value as f64),
            Token::Double(d) => Ok(d.value),
            Token::Smooth(s) => Ok(s.value),
            other => Err(projection_error(other, TokenType::Double)),
        }
    }

    pub fn complex_value(&self) -> Result<Complex64> {
        match self {
            Token::Complex(c) => Ok(c.value),
            other => match other.double_value() {
                Ok(value) => Ok(Complex64::new(value, 0.0)),
                Err(_) => Err(projection_error(other, TokenType::Complex)),
            },
        }
    }

    pub fn fix_value(&self) -> Result<FixPoint> {
        match self {
            Token::Fix(f) => Ok(f.value),
            other => Err(projection_error(other, TokenType::Fix)),
        }
    }

    pub fn string_value(&self) -> Result<&str> {
        match self {
            Token::String(s) => Ok(&s.value),
            other => Err(projection_error(other, TokenType::String)),
        }
    }

    pub fn as_array(&self) -> Result<&ArrayToken> {
        match self {
            Token::Array(array) => Ok(array),
            other => Err(Error::ConversionFailure(format!(
                "Conversion is not supported from {} '{}' to an array.",
                other.token_type(),
                other
            ))),
        }
    }

    pub fn int_matrix_value(&self) -> Result<Matrix<i32>> {
        match self {
            Token::IntMatrix(m) => Ok(m.value.clone()),
            other => Err(projection_error(other, TokenType::IntMatrix)),
        }
    }

    pub fn long_matrix_value(&self) -> Result<Matrix<i64>> {
        match self {
            Token::IntMatrix(m) => Ok(m.value.map(|v| v as i64)),
            Token::LongMatrix(m) => Ok(m.value.clone()),
            other => Err(projection_error(other, TokenType::LongMatrix)),
        }
    }

    pub fn double_matrix_value(&self) -> Result<Matrix<f64>> {
        match self {
            Token::IntMatrix(m) => Ok(m.value.map(|v| v as f64)),
            Token::DoubleMatrix(m) => Ok(m.value.clone()),
            other => Err(projection_error(other, TokenType::DoubleMatrix)),
        }
    }

    pub fn complex_matrix_value(&self) -> Result<Matrix<Complex64>> {
        match self {
            Token::IntMatrix(m) => Ok(m.value.map(|v| Complex64::new(v as f64, 0.0))),
            Token::DoubleMatrix(m) => Ok(m.value.map(|v| Complex64::new(v, 0.0))),
            Token::ComplexMatrix(m) => Ok(m.value.clone()),
            other => Err(projection_error(other, TokenType::ComplexMatrix)),
        }
    }
}

fn predicate(result: Token) -> Result<bool> {
    match result {
        Token::Boolean(b) => Ok(b.value),
        other => bail!("predicate produced a non-boolean token: {other}"),
    }
}

fn unary_unsupported(operation: &str, token: &Token) -> Error {
    Error::UnsupportedOperation(format!(
        "{operation} operation not supported on {} '{}'",
        token.token_type(),
        token
    ))
}

fn projection_error(token: &Token, target: TokenType) -> Error {
    Error::ConversionFailure(conversion_message(token, &target))
}

/// Diagnostic for a failed binary operation, naming both operands.
pub(crate) fn not_supported_message(operation: &str, first: &Token, second: &Token) -> String {
    format!(
        "{operation} operation not supported between {} '{}' and {} '{}'",
        first.token_type(),
        first,
        second.token_type(),
        second
    )
}

pub(crate) fn incomparable_message(operation: &str, first: &Token, second: &Token) -> String {
    format!(
        "{operation} method not supported between {} '{}' and {} '{}' because the types are incomparable.",
        first.token_type(),
        first,
        second.token_type(),
        second
    )
}

/// Diagnostic for a failed conversion, with a hint when the ordering
/// itself forbids it.
pub(crate) fn conversion_message(token: &Token, target: &TokenType) -> String {
    let base = format!(
        "Conversion is not supported from {} '{}' to the type {}",
        token.token_type(),
        token,
        target
    );
    if ty::le(&token.token_type(), target) {
        format!("{base}.")
    } else {
        format!("{base} because the type of the token is higher or incomparable with the given type.")
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Nil => write!(f, "nil"),
            Token::Boolean(b) => b.fmt(f),
            Token::Byte(b) => b.fmt(f),
            Token::Int(i) => i.fmt(f),
            Token::Long(l) => l.fmt(f),
            Token::Double(d) => d.fmt(f),
            Token::Smooth(s) => s.fmt(f),
            Token::Complex(c) => c.fmt(f),
            Token::Fix(x) => x.fmt(f),
            Token::String(s) => s.fmt(f),
            Token::Array(a) => a.fmt(f),
            Token::IntMatrix(m) => m.fmt(f),
            Token::LongMatrix(m) => m.fmt(f),
            Token::DoubleMatrix(m) => m.fmt(f),
            Token::ComplexMatrix(m) => m.fmt(f),
        }
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(text: &str) -> Result<Token> {
        crate::parse::parse_token(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_payloads() {
        assert_eq!(Token::int(1).token_type(), TokenType::Int);
        assert_eq!(Token::smooth(1.0, vec![2.0]).token_type(), TokenType::Double);
        assert_eq!(Token::Nil.token_type(), TokenType::Nil);
    }

    #[test]
    fn projections_accept_only_lossless_sources() {
        assert_eq!(Token::byte(7).long_value().unwrap(), 7);
        assert_eq!(Token::int(7).double_value().unwrap(), 7.0);
        assert!(Token::long(7).double_value().is_err());
        assert!(Token::double(7.5).int_value().is_err());
        let err = Token::double(7.5).int_value().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Conversion is not supported from double '7.5' to the type int \
             because the type of the token is higher or incomparable with the given type."
        );
    }

    #[test]
    fn identity_errors_name_the_kind() {
        let err = Token::string("x").one().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Multiplicative identity not supported on string."
        );
        assert_eq!(Token::string("x").zero().unwrap(), Token::string(""));
    }

    #[test]
    fn shifts_mask_like_widened_hardware() {
        assert_eq!(Token::byte(1).shift_left(8).unwrap(), Token::byte(0));
        assert_eq!(Token::int(-8).shift_right(1).unwrap(), Token::int(-4));
        assert_eq!(
            Token::int(-1).logical_shift_right(28).unwrap(),
            Token::int(15)
        );
    }

    #[test]
    fn complex_magnitude_is_real() {
        assert_eq!(
            Token::complex(3.0, 4.0).absolute().unwrap(),
            Token::double(5.0)
        );
    }
}
