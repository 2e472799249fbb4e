use crate::convert;
use crate::error::{Error, Result};
use crate::ops::{Operator, Role};
use crate::token::smooth::SmoothToken;
use crate::token::{
    array, incomparable_message, matrix, not_supported_message, scalar, smooth, Token,
};
use crate::ty::{compare, Relation};

/// Resolve one binary operation. The receiver side consults the kind
/// ordering and either applies a hook directly, widens the lower operand,
/// or hands control to the higher operand's reverse dispatch. Every
/// public two-operand method lands here.
pub(crate) fn resolve(op: Operator, role: Role, receiver: &Token, other: &Token) -> Result<Token> {
    trace!(
        "dispatch {}: {} vs {}",
        op.name(role),
        receiver.token_type(),
        other.token_type()
    );
    match role {
        Role::Forward => resolve_forward(op, receiver, other),
        Role::Reverse => resolve_reverse(op, receiver, other),
    }
}

fn resolve_forward(op: Operator, receiver: &Token, other: &Token) -> Result<Token> {
    if receiver.is_nil() || other.is_nil() {
        return nil_result(op);
    }
    if op.is_arithmetic() {
        if let Some(result) = broadcast(op, Role::Forward, receiver, other) {
            return result;
        }
    }
    let receiver_tag = receiver.token_type();
    let other_tag = other.token_type();
    match compare(&receiver_tag, &other_tag) {
        Relation::Same => apply_same(op, receiver, other),
        Relation::Higher => {
            let converted = convert::convert(other, &receiver_tag)?;
            apply_same(op, receiver, &converted)
                .map_err(|_| rewrap(op, Role::Forward, receiver, other))
        }
        Relation::Lower => match op {
            // Symmetric predicates just swap.
            Operator::IsEqualTo | Operator::IsCloseTo { .. } => {
                resolve_forward(op, other, receiver)
            }
            // Ordering and bitwise widen the receiver and retry; there is
            // no reverse method for them.
            Operator::IsLessThan
            | Operator::BitwiseAnd
            | Operator::BitwiseOr
            | Operator::BitwiseXor => {
                let converted = convert::convert(receiver, &other_tag)?;
                apply_same(op, &converted, other)
            }
            _ => resolve_reverse(op, other, receiver),
        },
        Relation::Incomparable => Err(Error::IncomparableTypes(incomparable_message(
            op.name(Role::Forward),
            receiver,
            other,
        ))),
    }
}

/// Reverse dispatch: `receiver` is the right operand of the written
/// expression and sits higher than `other`, the original left operand.
fn resolve_reverse(op: Operator, receiver: &Token, other: &Token) -> Result<Token> {
    if receiver.is_nil() || other.is_nil() {
        return nil_result(op);
    }
    if op.is_arithmetic() {
        if let Some(result) = broadcast(op, Role::Reverse, receiver, other) {
            return result;
        }
    }
    let receiver_tag = receiver.token_type();
    match compare(&other.token_type(), &receiver_tag) {
        Relation::Lower => {
            let converted = convert::convert(other, &receiver_tag)?;
            apply_same(op, &converted, receiver)
                .map_err(|_| rewrap(op, Role::Reverse, receiver, other))
        }
        Relation::Same => apply_same(op, other, receiver),
        Relation::Higher => resolve_forward(op, other, receiver),
        Relation::Incomparable => Err(Error::IncomparableTypes(incomparable_message(
            op.name(Role::Reverse),
            receiver,
            other,
        ))),
    }
}

/// Arithmetic on a nil operand is absorbing, predicates answer `false`.
fn nil_result(op: Operator) -> Result<Token> {
    if op.is_predicate() {
        Ok(Token::boolean(false))
    } else {
        Ok(Token::Nil)
    }
}

fn rewrap(op: Operator, role: Role, first: &Token, second: &Token) -> Error {
    Error::UnsupportedOperation(not_supported_message(op.name(role), first, second))
}

/// Matrix receiver with a scalar at or below its element tag broadcasts
/// elementwise instead of widening the scalar to a matrix. Everything
/// else, matrices and arrays included, falls back to the ordering.
fn broadcast(
    op: Operator,
    role: Role,
    receiver: &Token,
    other: &Token,
) -> Option<Result<Token>> {
    let element = receiver.token_type().matrix_element()?;
    match compare(&element, &other.token_type()) {
        Relation::Same | Relation::Higher => {
            let outcome = convert::convert(other, &element).and_then(|converted| {
                matrix::element_scalar(op, role, receiver, &converted)
                    .map_err(|_| rewrap(op, role, receiver, other))
            });
            Some(outcome)
        }
        _ => None,
    }
}

/// Hook router for two operands of one kind tag. The double tag covers
/// plain and smooth payloads, and the receiver's payload picks the hook
/// set: a smooth receiver propagates derivatives, a plain one drops them.
fn apply_same(op: Operator, receiver: &Token, other: &Token) -> Result<Token> {
    match (receiver, other) {
        (Token::Boolean(x), Token::Boolean(y)) => scalar::apply_boolean(op, x, y),
        (Token::Byte(x), Token::Byte(y)) => scalar::apply_byte(op, x, y),
        (Token::Int(x), Token::Int(y)) => scalar::apply_int(op, x, y),
        (Token::Long(x), Token::Long(y)) => scalar::apply_long(op, x, y),
        (Token::Double(x), Token::Double(y)) => scalar::apply_double(op, x.value, y.value),
        (Token::Double(x), Token::Smooth(y)) => scalar::apply_double(op, x.value, y.value),
        (Token::Smooth(x), Token::Double(y)) => smooth::apply(op, x, &SmoothToken::plain(y.value)),
        (Token::Smooth(x), Token::Smooth(y)) => smooth::apply(op, x, y),
        (Token::Complex(x), Token::Complex(y)) => scalar::apply_complex(op, x, y),
        (Token::Fix(x), Token::Fix(y)) => scalar::apply_fix(op, x, y),
        (Token::String(x), Token::String(y)) => scalar::apply_string(op, x, y),
        (Token::Array(x), Token::Array(y)) => array::apply(op, x, y),
        (Token::IntMatrix(x), Token::IntMatrix(y)) => matrix::apply(op, &x.value, &y.value),
        (Token::LongMatrix(x), Token::LongMatrix(y)) => matrix::apply(op, &x.value, &y.value),
        (Token::DoubleMatrix(x), Token::DoubleMatrix(y)) => matrix::apply(op, &x.value, &y.value),
        (Token::ComplexMatrix(x), Token::ComplexMatrix(y)) => matrix::apply(op, &x.value, &y.value),
        (receiver, other) => bail!(
            "no common hook for {} '{receiver}' and {} '{other}'",
            receiver.token_type(),
            other.token_type()
        ),
    }
}
