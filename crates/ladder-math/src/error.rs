use std::result;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("shape error: {0}")]
    Shape(String),
    #[error("precision error: {0}")]
    Precision(String),
    #[error("division by zero")]
    DivisionByZero,
}

pub type Result<T> = result::Result<T, MathError>;
