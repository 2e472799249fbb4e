use std::result;

use ladder_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The operation exists but neither operand kind implements it for the
    /// resolved pairing.
    #[error("{0}")]
    UnsupportedOperation(String),
    /// Neither operand kind is substitutable for the other.
    #[error("{0}")]
    IncomparableTypes(String),
    /// A lossless conversion was requested that the kind ordering does not
    /// license.
    #[error("{0}")]
    ConversionFailure(String),
    /// A constructor was handed arguments that violate its invariants.
    #[error("{0}")]
    ConstructionInvariantViolation(String),
    /// Aggregate operands whose dimensions do not line up.
    #[error("{0}")]
    ShapeMismatch(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

// Convert from ladder_math::MathError to our Error type
impl From<MathError> for Error {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Shape(message) => Error::ShapeMismatch(message),
            other => Error::Generic(other.to_string()),
        }
    }
}
impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
