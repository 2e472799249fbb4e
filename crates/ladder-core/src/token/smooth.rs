use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::token::{not_supported_message, Token};

/// A double bundled with the derivatives of the signal it samples, in
/// increasing order. An empty vector means no derivative information at
/// all; such a value behaves exactly like a plain double.
///
/// The kind tag of a smooth value is `double`, so it is substitutable
/// wherever a double is and mixed arithmetic picks the hook of the
/// receiver: a smooth receiver propagates derivatives, a plain receiver
/// drops them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothToken {
    pub value: f64,
    pub derivatives: Vec<f64>,
}

impl SmoothToken {
    pub fn new(value: f64, derivatives: Vec<f64>) -> Self {
        Self { value, derivatives }
    }

    /// A smooth value with no derivative information. Does not allocate.
    pub fn plain(value: f64) -> Self {
        Self {
            value,
            derivatives: Vec::new(),
        }
    }

    pub fn has_derivatives(&self) -> bool {
        !self.derivatives.is_empty()
    }

    /// Negate the value and every derivative.
    pub fn negate(&self) -> SmoothToken {
        SmoothToken {
            value: -self.value,
            derivatives: self.derivatives.iter().map(|d| -d).collect(),
        }
    }

    fn derivative(&self, order: usize) -> Option<f64> {
        self.derivatives.get(order).copied()
    }
}

impl PartialEq for SmoothToken {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value).is_eq()
            && self.derivatives.len() == other.derivatives.len()
            && self
                .derivatives
                .iter()
                .zip(&other.derivatives)
                .all(|(a, b)| a.total_cmp(b).is_eq())
    }
}

impl Display for SmoothToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.derivatives.is_empty() {
            return write!(f, "{:?}", self.value);
        }
        write!(
            f,
            "smoothToken({:?}, {{{}}})",
            self.value,
            self.derivatives.iter().map(|d| format!("{d:?}")).join(",")
        )
    }
}

/// Hooks for a smooth receiver. The argument has already been normalized
/// to smooth form; a plain double arrives with an empty derivative vector.
pub(crate) fn apply(op: Operator, x: &SmoothToken, y: &SmoothToken) -> Result<Token> {
    match op {
        Operator::Add => Ok(Token::Smooth(add(x, y))),
        Operator::Subtract => Ok(Token::Smooth(subtract(x, y))),
        Operator::Multiply => Ok(Token::Smooth(multiply(x, y))),
        Operator::Divide => Ok(Token::Smooth(divide(x, y))),
        // The remaining hooks are those of a plain double and see the
        // sample values only.
        Operator::Modulo => Ok(Token::double(x.value % y.value)),
        Operator::IsEqualTo => Ok(Token::boolean(x.value == y.value)),
        Operator::IsCloseTo { epsilon } => Ok(Token::boolean((x.value - y.value).abs() <= epsilon)),
        Operator::IsLessThan => Err(Error::UnsupportedOperation(not_supported_message(
            op.name(Role::Forward),
            &Token::Smooth(x.clone()),
            &Token::Smooth(y.clone()),
        ))),
        Operator::BitwiseAnd | Operator::BitwiseOr | Operator::BitwiseXor => {
            Err(Error::UnsupportedOperation(not_supported_message(
                op.name(Role::Forward),
                &Token::Smooth(x.clone()),
                &Token::Smooth(y.clone()),
            )))
        }
    }
}

/// Derivatives add positionwise; a position present on one side only
/// passes through unchanged.
fn add(x: &SmoothToken, y: &SmoothToken) -> SmoothToken {
    let value = x.value + y.value;
    if !y.has_derivatives() {
        return SmoothToken::new(value, x.derivatives.clone());
    }
    if !x.has_derivatives() {
        return SmoothToken::new(value, y.derivatives.clone());
    }
    let n = x.derivatives.len().max(y.derivatives.len());
    let derivatives = (0..n)
        .map(|i| x.derivative(i).unwrap_or(0.0) + y.derivative(i).unwrap_or(0.0))
        .collect();
    SmoothToken::new(value, derivatives)
}

fn subtract(x: &SmoothToken, y: &SmoothToken) -> SmoothToken {
    let value = x.value - y.value;
    if !y.has_derivatives() {
        return SmoothToken::new(value, x.derivatives.clone());
    }
    if !x.has_derivatives() {
        return SmoothToken::new(value, y.negate().derivatives);
    }
    let n = x.derivatives.len().max(y.derivatives.len());
    let derivatives = (0..n)
        .map(|i| x.derivative(i).unwrap_or(0.0) - y.derivative(i).unwrap_or(0.0))
        .collect();
    SmoothToken::new(value, derivatives)
}

/// Product rule on the first derivative. Orders two and above are
/// propagated by the shifted recurrence below, which is known not to be
/// the correct general Leibniz expansion.
// TODO: replace the order>=2 recurrence with the general Leibniz rule;
// needs agreed semantics for operands of different derivative counts.
fn multiply(x: &SmoothToken, y: &SmoothToken) -> SmoothToken {
    let value = x.value * y.value;
    if !y.has_derivatives() {
        return SmoothToken::new(value, x.derivatives.iter().map(|d| d * y.value).collect());
    }
    if !x.has_derivatives() {
        return SmoothToken::new(value, y.derivatives.iter().map(|d| d * x.value).collect());
    }
    let n = x.derivatives.len().max(y.derivatives.len());
    let mut derivatives = vec![0.0; n];
    let mut xv = x.value;
    let mut yv = y.value;
    let mut xdot = x.derivatives[0];
    let mut ydot = y.derivatives[0];
    derivatives[0] = xdot * yv + xv * ydot;
    for i in 1..n {
        xv = xdot;
        yv = ydot;
        xdot = x.derivative(i + 1).unwrap_or(0.0);
        ydot = y.derivative(i + 1).unwrap_or(0.0);
        derivatives[i] = xdot * yv + xv * ydot;
    }
    SmoothToken::new(value, derivatives)
}

/// Quotient by the sample value only; derivatives of the divisor are
/// ignored.
fn divide(x: &SmoothToken, y: &SmoothToken) -> SmoothToken {
    SmoothToken::new(
        x.value / y.value,
        x.derivatives.iter().map(|d| d / y.value).collect(),
    )
}
