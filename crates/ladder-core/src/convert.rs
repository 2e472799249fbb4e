use crate::error::{Error, Result};
use crate::token::{
    ArrayToken, ComplexMatrixToken, DoubleMatrixToken, LongMatrixToken, Token,
};
use crate::ty::TokenType;

/// Convert `token` to the kind named by `target`, when the kind ordering
/// licenses it. Conversion only ever widens: a byte becomes an int, an
/// int matrix becomes a complex matrix, anything becomes a string. It
/// never narrows and never invents a matrix from a scalar; the element
/// broadcast in dispatch covers that pairing instead.
///
/// Nil converts to every kind and stays nil, and a token already at the
/// target tag comes back unchanged. The latter is what lets a smooth
/// token pass through a conversion to double with its derivatives intact.
pub fn convert(token: &Token, target: &TokenType) -> Result<Token> {
    if &token.token_type() == target {
        return Ok(token.clone());
    }
    if token.is_nil() {
        return Ok(Token::Nil);
    }
    match target {
        TokenType::Int => token
            .int_value()
            .map(Token::int)
            .map_err(|_| failure(token, target)),
        TokenType::Long => token
            .long_value()
            .map(Token::long)
            .map_err(|_| failure(token, target)),
        TokenType::Double => token
            .double_value()
            .map(Token::double)
            .map_err(|_| failure(token, target)),
        TokenType::Complex => token
            .double_value()
            .map(|value| Token::complex(value, 0.0))
            .map_err(|_| failure(token, target)),
        TokenType::String => Ok(Token::string(token.to_string())),
        TokenType::LongMatrix => token
            .long_matrix_value()
            .map(|m| Token::LongMatrix(LongMatrixToken::new(m)))
            .map_err(|_| failure(token, target)),
        TokenType::DoubleMatrix => token
            .double_matrix_value()
            .map(|m| Token::DoubleMatrix(DoubleMatrixToken::new(m)))
            .map_err(|_| failure(token, target)),
        TokenType::ComplexMatrix => token
            .complex_matrix_value()
            .map(|m| Token::ComplexMatrix(ComplexMatrixToken::new(m)))
            .map_err(|_| failure(token, target)),
        TokenType::Array(element) => match token {
            Token::Array(array) => {
                let values = array
                    .values()
                    .iter()
                    .map(|value| convert(value, element))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|_| failure(token, target))?;
                Ok(Token::Array(ArrayToken::collect(element, values)))
            }
            _ => Err(failure(token, target)),
        },
        _ => Err(failure(token, target)),
    }
}

fn failure(token: &Token, target: &TokenType) -> Error {
    Error::ConversionFailure(crate::token::conversion_message(token, target))
}
