#[macro_use]
pub mod macros;

pub mod convert;
pub mod error;
pub mod ops;
pub mod parse;
pub mod token;
pub mod ty;

// Re-export commonly used items for convenience
pub use tracing;

pub use ops::{Operator, Role};
pub use token::{ArrayToken, Token};
pub use ty::{Relation, TokenType};

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;

/// Tolerance used by closeness comparisons when the caller has no better
/// one.
pub const DEFAULT_EPSILON: f64 = 1.0e-9;
