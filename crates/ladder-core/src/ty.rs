use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Kind tag of a token. Tags form a partial order (see [`le`]): `Nil` sits
/// below every tag, `String` above every tag, and the numeric tags widen
/// along lossless conversions only. A tag says nothing about the payload
/// shape, so two matrices of different dimensions share one tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Nil,
    Boolean,
    Byte,
    Int,
    Long,
    Double,
    Complex,
    Fix,
    String,
    IntMatrix,
    LongMatrix,
    DoubleMatrix,
    ComplexMatrix,
    Array(Box<TokenType>),
}

/// How a receiver tag relates to an argument tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Same,
    Higher,
    Lower,
    Incomparable,
}

impl TokenType {
    /// Scalar tag of one matrix element, for the four matrix kinds only.
    pub fn matrix_element(&self) -> Option<TokenType> {
        match self {
            TokenType::IntMatrix => Some(TokenType::Int),
            TokenType::LongMatrix => Some(TokenType::Long),
            TokenType::DoubleMatrix => Some(TokenType::Double),
            TokenType::ComplexMatrix => Some(TokenType::Complex),
            _ => None,
        }
    }

    pub fn is_matrix(&self) -> bool {
        self.matrix_element().is_some()
    }
}

/// True when a value tagged `a` can always stand in for a value tagged `b`
/// after a lossless conversion. This is the reflexive ordering behind all
/// binary dispatch.
pub fn le(a: &TokenType, b: &TokenType) -> bool {
    use TokenType::*;
    if a == b {
        return true;
    }
    match (a, b) {
        (Nil, _) => true,
        (_, String) => true,
        (Array(x), Array(y)) => le(x, y),
        (Byte, Int | Long | Double | Complex) => true,
        (Byte, IntMatrix | LongMatrix | DoubleMatrix | ComplexMatrix) => true,
        (Int, Long | Double | Complex) => true,
        (Int, IntMatrix | LongMatrix | DoubleMatrix | ComplexMatrix) => true,
        (Long, LongMatrix) => true,
        (Double, Complex | DoubleMatrix | ComplexMatrix) => true,
        (Complex, ComplexMatrix) => true,
        (IntMatrix, LongMatrix | DoubleMatrix | ComplexMatrix) => true,
        (DoubleMatrix, ComplexMatrix) => true,
        _ => false,
    }
}

/// Relate a receiver tag to an argument tag.
pub fn compare(receiver: &TokenType, argument: &TokenType) -> Relation {
    if receiver == argument {
        Relation::Same
    } else if le(argument, receiver) {
        Relation::Higher
    } else if le(receiver, argument) {
        Relation::Lower
    } else {
        Relation::Incomparable
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Nil => write!(f, "niltype"),
            TokenType::Boolean => write!(f, "boolean"),
            TokenType::Byte => write!(f, "unsignedByte"),
            TokenType::Int => write!(f, "int"),
            TokenType::Long => write!(f, "long"),
            TokenType::Double => write!(f, "double"),
            TokenType::Complex => write!(f, "complex"),
            TokenType::Fix => write!(f, "fixedpoint"),
            TokenType::String => write!(f, "string"),
            TokenType::IntMatrix => write!(f, "[int]"),
            TokenType::LongMatrix => write!(f, "[long]"),
            TokenType::DoubleMatrix => write!(f, "[double]"),
            TokenType::ComplexMatrix => write!(f, "[complex]"),
            TokenType::Array(element) => write!(f, "{{{element}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_reflexive_and_nil_is_bottom() {
        let tags = [
            TokenType::Nil,
            TokenType::Boolean,
            TokenType::Byte,
            TokenType::Int,
            TokenType::Long,
            TokenType::Double,
            TokenType::Complex,
            TokenType::Fix,
            TokenType::String,
            TokenType::IntMatrix,
            TokenType::ComplexMatrix,
            TokenType::Array(Box::new(TokenType::Int)),
        ];
        for tag in &tags {
            assert!(le(tag, tag));
            assert!(le(&TokenType::Nil, tag));
            assert!(le(tag, &TokenType::String));
        }
    }

    #[test]
    fn numeric_chain_widens_without_crossing() {
        assert_eq!(compare(&TokenType::Double, &TokenType::Int), Relation::Higher);
        assert_eq!(compare(&TokenType::Int, &TokenType::Double), Relation::Lower);
        assert_eq!(compare(&TokenType::Long, &TokenType::Double), Relation::Incomparable);
        assert_eq!(compare(&TokenType::Fix, &TokenType::Int), Relation::Incomparable);
        assert_eq!(compare(&TokenType::Complex, &TokenType::Byte), Relation::Higher);
    }

    #[test]
    fn matrix_tags_sit_above_their_element_scalars() {
        assert!(le(&TokenType::Int, &TokenType::IntMatrix));
        assert!(le(&TokenType::Long, &TokenType::LongMatrix));
        assert!(le(&TokenType::IntMatrix, &TokenType::ComplexMatrix));
        assert!(!le(&TokenType::LongMatrix, &TokenType::DoubleMatrix));
        assert!(!le(&TokenType::Double, &TokenType::IntMatrix));
    }

    #[test]
    fn array_tags_compare_elementwise() {
        let ints = TokenType::Array(Box::new(TokenType::Int));
        let doubles = TokenType::Array(Box::new(TokenType::Double));
        let longs = TokenType::Array(Box::new(TokenType::Long));
        assert_eq!(compare(&doubles, &ints), Relation::Higher);
        assert_eq!(compare(&longs, &doubles), Relation::Incomparable);
        assert_eq!(compare(&ints, &TokenType::Int), Relation::Incomparable);
    }

    #[test]
    fn tags_render_their_short_names() {
        assert_eq!(TokenType::Byte.to_string(), "unsignedByte");
        assert_eq!(TokenType::DoubleMatrix.to_string(), "[double]");
        assert_eq!(
            TokenType::Array(Box::new(TokenType::String)).to_string(),
            "{string}"
        );
    }
}
