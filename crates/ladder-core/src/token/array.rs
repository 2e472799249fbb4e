use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::token::{dispatch, not_supported_message, Token};
use crate::ty::TokenType;

/// Homogeneous sequence of tokens. Every element carries the same kind
/// tag, except that nil elements are always admitted; the element tag is
/// taken from the first non-nil element.
///
/// Public construction rejects empty sequences, since they would have no
/// element tag. Operations that legitimately produce no elements (masked
/// extraction, past-the-end subarrays) keep the tag of the source array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrayToken {
    element_type: TokenType,
    values: Vec<Token>,
}

impl ArrayToken {
    pub fn new(values: Vec<Token>) -> Result<ArrayToken> {
        if values.is_empty() {
            return Err(Error::ConstructionInvariantViolation(
                "The length of the specified array is zero.".into(),
            ));
        }
        let element_type = values
            .iter()
            .find(|v| !v.is_nil())
            .unwrap_or(&values[0])
            .token_type();
        for (index, value) in values.iter().enumerate() {
            if !value.is_nil() && value.token_type() != element_type {
                return Err(Error::ConstructionInvariantViolation(format!(
                    "Elements of the array do not have the same type: \
                     value[0]={} (type: {}) value[{}]={} (type: {})",
                    values[0],
                    element_type,
                    index,
                    value,
                    value.token_type()
                )));
            }
        }
        Ok(ArrayToken {
            element_type,
            values,
        })
    }

    /// Parse an array literal such as `{1, 2, 3}`.
    pub fn from_expression(text: &str) -> Result<ArrayToken> {
        match crate::parse::parse_token(text) {
            Ok(Token::Array(array)) => Ok(array),
            _ => Err(Error::ConstructionInvariantViolation(format!(
                "An array token cannot be created from the expression '{text}'"
            ))),
        }
    }

    pub(crate) fn empty(element_type: TokenType) -> ArrayToken {
        ArrayToken {
            element_type,
            values: Vec::new(),
        }
    }

    /// Rebuild from operation results, re-deriving the element tag since
    /// promotion may have widened the elements.
    pub(crate) fn collect(fallback: &TokenType, values: Vec<Token>) -> ArrayToken {
        let element_type = values
            .iter()
            .find(|v| !v.is_nil())
            .map(Token::token_type)
            .unwrap_or_else(|| fallback.clone());
        ArrayToken {
            element_type,
            values,
        }
    }

    pub fn element_type(&self) -> &TokenType {
        &self.element_type
    }

    pub fn token_type(&self) -> TokenType {
        TokenType::Array(Box::new(self.element_type.clone()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Token] {
        &self.values
    }

    pub fn element_add(&self, token: &Token) -> Result<ArrayToken> {
        self.element_apply(Operator::Add, "element_add", token)
    }

    pub fn element_subtract(&self, token: &Token) -> Result<ArrayToken> {
        self.element_apply(Operator::Subtract, "element_subtract", token)
    }

    pub fn element_multiply(&self, token: &Token) -> Result<ArrayToken> {
        self.element_apply(Operator::Multiply, "element_multiply", token)
    }

    pub fn element_divide(&self, token: &Token) -> Result<ArrayToken> {
        self.element_apply(Operator::Divide, "element_divide", token)
    }

    pub fn element_modulo(&self, token: &Token) -> Result<ArrayToken> {
        self.element_apply(Operator::Modulo, "element_modulo", token)
    }

    /// Broadcast one scalar over every element, with full promotion per
    /// element. Failures are reported against the whole array.
    fn element_apply(&self, op: Operator, name: &str, token: &Token) -> Result<ArrayToken> {
        let values: Vec<Token> = self
            .values
            .iter()
            .map(|value| dispatch::resolve(op, Role::Forward, value, token))
            .collect::<Result<_>>()
            .map_err(|_| {
                Error::UnsupportedOperation(not_supported_message(
                    name,
                    &Token::Array(self.clone()),
                    token,
                ))
            })?;
        Ok(ArrayToken::collect(&self.element_type, values))
    }

    /// Select elements either by a boolean mask of equal length or by an
    /// array of indices (duplicates and reordering allowed).
    pub fn extract(&self, selection: &ArrayToken) -> Result<ArrayToken> {
        match selection.element_type() {
            TokenType::Boolean => {
                if selection.len() != self.len() {
                    return Err(Error::ShapeMismatch(
                        "When the argument is an array of booleans, \
                         it must have the same length as this array."
                            .into(),
                    ));
                }
                let values = self
                    .values
                    .iter()
                    .zip(selection.values())
                    .filter(|(_, keep)| matches!(keep, Token::Boolean(b) if b.value))
                    .map(|(value, _)| value.clone())
                    .collect();
                Ok(ArrayToken::collect(&self.element_type, values))
            }
            TokenType::Int => {
                let mut values = Vec::with_capacity(selection.len());
                for index in selection.values() {
                    match index {
                        Token::Int(i) if i.value >= 0 && (i.value as usize) < self.len() => {
                            values.push(self.values[i.value as usize].clone());
                        }
                        Token::Int(i) => {
                            bail!(
                                "index {} is out of bounds for an array of length {}",
                                i.value,
                                self.len()
                            );
                        }
                        other => {
                            bail!("array selection contains a non-integer element: {other}");
                        }
                    }
                }
                Ok(ArrayToken::collect(&self.element_type, values))
            }
            _ => Err(Error::UnsupportedOperation(format!(
                "The argument must be {} or {}.",
                TokenType::Array(Box::new(TokenType::Boolean)),
                TokenType::Array(Box::new(TokenType::Int))
            ))),
        }
    }

    /// Contiguous slice of up to `count` elements starting at `index`.
    /// Reaching past the end clamps; starting past the end yields an empty
    /// array with this array's element tag.
    pub fn subarray(&self, index: usize, count: usize) -> ArrayToken {
        if index >= self.len() {
            return ArrayToken::empty(self.element_type.clone());
        }
        let end = index.saturating_add(count).min(self.len());
        ArrayToken::collect(&self.element_type, self.values[index..end].to_vec())
    }

    pub fn zero(&self) -> Result<ArrayToken> {
        let values = self
            .values
            .iter()
            .map(Token::zero)
            .collect::<Result<Vec<_>>>()?;
        Ok(ArrayToken::collect(&self.element_type, values))
    }

    pub fn one(&self) -> Result<ArrayToken> {
        let values = self
            .values
            .iter()
            .map(Token::one)
            .collect::<Result<Vec<_>>>()?;
        Ok(ArrayToken::collect(&self.element_type, values))
    }
}

impl Display for ArrayToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.values.iter().join(", "))
    }
}

fn length_message(argument: usize, receiver: usize) -> String {
    format!(
        "The length of the argument ({argument}) is not the same as the length of this token ({receiver})."
    )
}

/// Hooks for two arrays of the same element tag; the dispatcher has
/// already converted the lower one up.
pub(crate) fn apply(op: Operator, x: &ArrayToken, y: &ArrayToken) -> Result<Token> {
    if op.is_arithmetic() {
        if x.len() != y.len() {
            return Err(Error::ShapeMismatch(length_message(y.len(), x.len())));
        }
        let values: Vec<Token> = x
            .values
            .iter()
            .zip(&y.values)
            .map(|(a, b)| dispatch::resolve(op, Role::Forward, a, b))
            .collect::<Result<_>>()?;
        return Ok(Token::Array(ArrayToken::collect(&x.element_type, values)));
    }
    match op {
        Operator::IsEqualTo => {
            if x.len() != y.len() {
                return Err(Error::ShapeMismatch(length_message(y.len(), x.len())));
            }
            for (a, b) in x.values.iter().zip(&y.values) {
                if !a.is_equal_to(b)? {
                    return Ok(Token::boolean(false));
                }
            }
            Ok(Token::boolean(true))
        }
        Operator::IsCloseTo { epsilon } => {
            // Unlike exact equality, closeness treats a length mismatch as
            // plainly not close.
            if x.len() != y.len() {
                return Ok(Token::boolean(false));
            }
            for (a, b) in x.values.iter().zip(&y.values) {
                if !a.is_close_to(b, epsilon)? {
                    return Ok(Token::boolean(false));
                }
            }
            Ok(Token::boolean(true))
        }
        _ => Err(Error::UnsupportedOperation(not_supported_message(
            op.name(Role::Forward),
            &Token::Array(x.clone()),
            &Token::Array(y.clone()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> ArrayToken {
        ArrayToken::new(values.iter().map(|v| Token::int(*v)).collect()).unwrap()
    }

    #[test]
    fn construction_rejects_empty_and_mixed_arrays() {
        let empty = ArrayToken::new(Vec::new()).unwrap_err();
        assert_eq!(
            empty.to_string(),
            "The length of the specified array is zero."
        );
        let mixed = ArrayToken::new(vec![Token::int(1), Token::string("x")]).unwrap_err();
        assert!(mixed.to_string().contains("do not have the same type"));
    }

    #[test]
    fn nil_elements_are_admitted_and_typed_from_the_rest() {
        let array = ArrayToken::new(vec![Token::Nil, Token::int(2)]).unwrap();
        assert_eq!(array.element_type(), &TokenType::Int);
        assert_eq!(array.to_string(), "{nil, 2}");
    }

    #[test]
    fn subarray_clamps_and_empties_past_the_end() {
        let array = ints(&[1, 2, 3]);
        assert_eq!(array.subarray(1, 10).to_string(), "{2, 3}");
        assert_eq!(array.subarray(1, usize::MAX).to_string(), "{2, 3}");
        let past = array.subarray(7, 2);
        assert!(past.is_empty());
        assert_eq!(past.element_type(), &TokenType::Int);
    }

    #[test]
    fn broadcast_keeps_the_array_shape() {
        let array = ints(&[1, 2]);
        assert_eq!(array.element_add(&Token::int(3)).unwrap(), ints(&[4, 5]));
        let widened = array.element_multiply(&Token::double(0.5)).unwrap();
        assert_eq!(widened.element_type(), &TokenType::Double);
    }

    #[test]
    fn broadcast_failure_names_the_whole_array() {
        let err = ints(&[1, 2]).element_add(&Token::boolean(true)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "element_add operation not supported between {int} '{1, 2}' and boolean 'true'"
        );
    }
}
