pub mod error;
pub mod fixed;
pub mod matrix;

pub use error::{MathError, Result};
pub use fixed::{FixPoint, Precision};
pub use matrix::{Element, Matrix};
