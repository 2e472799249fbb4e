use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use ladder_math::{FixPoint, Precision};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::token::{conversion_message, not_supported_message, Token};
use crate::ty::TokenType;

/// wrap struct declare with derive Debug, Clone, Serialize, Deserialize,
/// PartialEq, Eq, Hash, plus a Display using the given format
macro_rules! plain_token {
    ($(#[$attr:meta])* $name:ident: $ty:ty) => {
        plain_token!($(#[$attr])* $name: $ty, "{}");
    };
    ($(#[$attr:meta])* $name:ident: $ty:ty, $fmt:literal) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name {
            pub value: $ty,
        }
        impl $name {
            pub fn new(v: $ty) -> Self {
                Self { value: v }
            }
        }
        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, $fmt, self.value)
            }
        }
    };
}

/// narrow an arbitrary token to one kind, when the ordering licenses it
macro_rules! typed_convert {
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

plain_token! {
    BooleanToken: bool
}
plain_token! {
    /// Unsigned octet. Arithmetic wraps modulo 256.
    ByteToken: u8, "{}ub"
}
plain_token! {
    IntToken: i32
}
plain_token! {
    LongToken: i64, "{}L"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleToken {
    pub value: f64,
}
impl PartialEq for DoubleToken {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value) == std::cmp::Ordering::Equal
    }
}
impl Eq for DoubleToken {}
impl Hash for DoubleToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}
impl DoubleToken {
    pub fn new(v: f64) -> Self {
        Self { value: v }
    }

    /// A smooth value carries the double tag, so it narrows here too; the
    /// derivatives do not survive the narrowing.
    pub fn convert(token: &Token) -> Result<DoubleToken> {
        match crate::convert::convert(token, &TokenType::Double)? {
            Token::Double(converted) => Ok(converted),
            Token::Smooth(smooth) => Ok(DoubleToken::new(smooth.value)),
            other => Err(Error::ConversionFailure(conversion_message(
                &other,
                &TokenType::Double,
            ))),
        }
    }
}
impl Display for DoubleToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplexToken {
    pub value: Complex64,
}
impl ComplexToken {
    pub fn new(v: Complex64) -> Self {
        Self { value: v }
    }
}
impl Display for ComplexToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_complex(f, &self.value)
    }
}

/// Renders `2.0 + 3.0i`, used by the complex scalar and complex matrices.
pub(crate) fn write_complex(f: &mut Formatter<'_>, value: &Complex64) -> fmt::Result {
    if value.im < 0.0 {
        write!(f, "{:?} - {:?}i", value.re, -value.im)
    } else {
        write!(f, "{:?} + {:?}i", value.re, value.im)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FixToken {
    pub value: FixPoint,
}
impl FixToken {
    pub fn new(value: f64, total: u32, integer: u32) -> Result<FixToken> {
        let precision = Precision::new(total, integer).map_err(invalid_construction)?;
        let value = FixPoint::quantize(value, precision).map_err(invalid_construction)?;
        Ok(FixToken { value })
    }

    pub fn from_fix(value: FixPoint) -> FixToken {
        FixToken { value }
    }
}
fn invalid_construction(err: ladder_math::MathError) -> Error {
    Error::ConstructionInvariantViolation(err.to_string())
}
impl Display for FixToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fix({},{},{})",
            self.value,
            self.value.precision().total(),
            self.value.precision().integer()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StringToken {
    pub value: String,
}
impl StringToken {
    pub fn new(v: impl Into<String>) -> Self {
        Self { value: v.into() }
    }
}
impl Display for StringToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\"",
            self.value.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}

typed_convert!(BooleanToken, Boolean, TokenType::Boolean);
typed_convert!(ByteToken, Byte, TokenType::Byte);
typed_convert!(IntToken, Int, TokenType::Int);
typed_convert!(LongToken, Long, TokenType::Long);
typed_convert!(ComplexToken, Complex, TokenType::Complex);
typed_convert!(FixToken, Fix, TokenType::Fix);
typed_convert!(StringToken, String, TokenType::String);

fn unsupported(op: Operator, x: Token, y: Token) -> Error {
    Error::UnsupportedOperation(not_supported_message(op.name(Role::Forward), &x, &y))
}

pub(crate) fn apply_boolean(op: Operator, x: &BooleanToken, y: &BooleanToken) -> Result<Token> {
    match op {
        Operator::IsEqualTo | Operator::IsCloseTo { .. } => Ok(Token::boolean(x.value == y.value)),
        Operator::BitwiseAnd => Ok(Token::boolean(x.value & y.value)),
        Operator::BitwiseOr => Ok(Token::boolean(x.value | y.value)),
        Operator::BitwiseXor => Ok(Token::boolean(x.value ^ y.value)),
        _ => Err(unsupported(
            op,
            Token::Boolean(x.clone()),
            Token::Boolean(y.clone()),
        )),
    }
}

pub(crate) fn apply_byte(op: Operator, x: &ByteToken, y: &ByteToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::byte(x.value.wrapping_add(y.value))),
        Operator::Subtract => Ok(Token::byte(x.value.wrapping_sub(y.value))),
        Operator::Multiply => Ok(Token::byte(x.value.wrapping_mul(y.value))),
        Operator::Divide => {
            if y.value == 0 {
                bail!("division by zero: {} / {}", x, y);
            }
            Ok(Token::byte(x.value / y.value))
        }
        Operator::Modulo => {
            if y.value == 0 {
                bail!("modulo by zero: {} % {}", x, y);
            }
            Ok(Token::byte(x.value % y.value))
        }
        // Closeness over an integral kind degenerates to equality.
        Operator::IsEqualTo | Operator::IsCloseTo { .. } => Ok(Token::boolean(x.value == y.value)),
        Operator::IsLessThan => Ok(Token::boolean(x.value < y.value)),
        Operator::BitwiseAnd => Ok(Token::byte(x.value & y.value)),
        Operator::BitwiseOr => Ok(Token::byte(x.value | y.value)),
        Operator::BitwiseXor => Ok(Token::byte(x.value ^ y.value)),
    }
}

pub(crate) fn apply_int(op: Operator, x: &IntToken, y: &IntToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::int(x.value.wrapping_add(y.value))),
        Operator::Subtract => Ok(Token::int(x.value.wrapping_sub(y.value))),
        Operator::Multiply => Ok(Token::int(x.value.wrapping_mul(y.value))),
        Operator::Divide => {
            if y.value == 0 {
                bail!("division by zero: {} / {}", x, y);
            }
            Ok(Token::int(x.value.wrapping_div(y.value)))
        }
        Operator::Modulo => {
            if y.value == 0 {
                bail!("modulo by zero: {} % {}", x, y);
            }
            Ok(Token::int(x.value.wrapping_rem(y.value)))
        }
        Operator::IsEqualTo | Operator::IsCloseTo { .. } => Ok(Token::boolean(x.value == y.value)),
        Operator::IsLessThan => Ok(Token::boolean(x.value < y.value)),
        Operator::BitwiseAnd => Ok(Token::int(x.value & y.value)),
        Operator::BitwiseOr => Ok(Token::int(x.value | y.value)),
        Operator::BitwiseXor => Ok(Token::int(x.value ^ y.value)),
    }
}

pub(crate) fn apply_long(op: Operator, x: &LongToken, y: &LongToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::long(x.value.wrapping_add(y.value))),
        Operator::Subtract => Ok(Token::long(x.value.wrapping_sub(y.value))),
        Operator::Multiply => Ok(Token::long(x.value.wrapping_mul(y.value))),
        Operator::Divide => {
            if y.value == 0 {
                bail!("division by zero: {} / {}", x, y);
            }
            Ok(Token::long(x.value.wrapping_div(y.value)))
        }
        Operator::Modulo => {
            if y.value == 0 {
                bail!("modulo by zero: {} % {}", x, y);
            }
            Ok(Token::long(x.value.wrapping_rem(y.value)))
        }
        Operator::IsEqualTo | Operator::IsCloseTo { .. } => Ok(Token::boolean(x.value == y.value)),
        Operator::IsLessThan => Ok(Token::boolean(x.value < y.value)),
        Operator::BitwiseAnd => Ok(Token::long(x.value & y.value)),
        Operator::BitwiseOr => Ok(Token::long(x.value | y.value)),
        Operator::BitwiseXor => Ok(Token::long(x.value ^ y.value)),
    }
}

/// Double hooks work on bare values so a smooth argument can flow in with
/// its derivatives dropped, the receiver being plain.
pub(crate) fn apply_double(op: Operator, x: f64, y: f64) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::double(x + y)),
        Operator::Subtract => Ok(Token::double(x - y)),
        Operator::Multiply => Ok(Token::double(x * y)),
        Operator::Divide => Ok(Token::double(x / y)),
        Operator::Modulo => Ok(Token::double(x % y)),
        Operator::IsEqualTo => Ok(Token::boolean(x == y)),
        Operator::IsCloseTo { epsilon } => Ok(Token::boolean((x - y).abs() <= epsilon)),
        Operator::IsLessThan => Ok(Token::boolean(x < y)),
        Operator::BitwiseAnd | Operator::BitwiseOr | Operator::BitwiseXor => {
            Err(unsupported(op, Token::double(x), Token::double(y)))
        }
    }
}

pub(crate) fn apply_complex(op: Operator, x: &ComplexToken, y: &ComplexToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::Complex(ComplexToken::new(x.value + y.value))),
        Operator::Subtract => Ok(Token::Complex(ComplexToken::new(x.value - y.value))),
        Operator::Multiply => Ok(Token::Complex(ComplexToken::new(x.value * y.value))),
        Operator::Divide => Ok(Token::Complex(ComplexToken::new(x.value / y.value))),
        Operator::IsEqualTo => Ok(Token::boolean(x.value == y.value)),
        Operator::IsCloseTo { epsilon } => {
            Ok(Token::boolean((x.value - y.value).norm() <= epsilon))
        }
        Operator::IsLessThan => Err(Error::UnsupportedOperation(format!(
            "{} because complex numbers cannot be compared.",
            not_supported_message(
                "is_less_than",
                &Token::Complex(x.clone()),
                &Token::Complex(y.clone())
            )
        ))),
        _ => Err(unsupported(
            op,
            Token::Complex(x.clone()),
            Token::Complex(y.clone()),
        )),
    }
}

pub(crate) fn apply_fix(op: Operator, x: &FixToken, y: &FixToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::Fix(FixToken::from_fix(x.value.add(&y.value)))),
        Operator::Subtract => Ok(Token::Fix(FixToken::from_fix(x.value.subtract(&y.value)))),
        Operator::Multiply => Ok(Token::Fix(FixToken::from_fix(x.value.multiply(&y.value)))),
        Operator::Divide => Ok(Token::Fix(FixToken::from_fix(x.value.divide(&y.value)?))),
        Operator::IsEqualTo => Ok(Token::boolean(x.value.value_eq(&y.value))),
        Operator::IsCloseTo { epsilon } => Ok(Token::boolean(
            (x.value.double_value() - y.value.double_value()).abs() <= epsilon,
        )),
        Operator::IsLessThan => Ok(Token::boolean(
            x.value.double_value() < y.value.double_value(),
        )),
        _ => Err(unsupported(op, Token::Fix(x.clone()), Token::Fix(y.clone()))),
    }
}

pub(crate) fn apply_string(op: Operator, x: &StringToken, y: &StringToken) -> Result<Token> {
    match op {
        Operator::Add => {
            let mut joined = x.value.clone();
            joined.push_str(&y.value);
            Ok(Token::String(StringToken::new(joined)))
        }
        Operator::IsEqualTo | Operator::IsCloseTo { .. } => Ok(Token::boolean(x.value == y.value)),
        _ => Err(unsupported(
            op,
            Token::String(x.clone()),
            Token::String(y.clone()),
        )),
    }
}
