/// Binary operation selector. Every two-operand method on a token funnels
/// through one of these, so dispatch, conversion, and error wording live in
/// exactly one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    IsEqualTo,
    IsCloseTo { epsilon: f64 },
    IsLessThan,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

/// Which operand initiated dispatch. `Reverse` means the receiver is the
/// right operand of the written expression and was handed control because
/// its kind sits higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Forward,
    Reverse,
}

impl Operator {
    /// Name used in diagnostics, matching the public method the caller
    /// invoked.
    pub fn name(&self, role: Role) -> &'static str {
        match (self, role) {
            (Operator::Add, Role::Forward) => "add",
            (Operator::Add, Role::Reverse) => "add_reverse",
            (Operator::Subtract, Role::Forward) => "subtract",
            (Operator::Subtract, Role::Reverse) => "subtract_reverse",
            (Operator::Multiply, Role::Forward) => "multiply",
            (Operator::Multiply, Role::Reverse) => "multiply_reverse",
            (Operator::Divide, Role::Forward) => "divide",
            (Operator::Divide, Role::Reverse) => "divide_reverse",
            (Operator::Modulo, Role::Forward) => "modulo",
            (Operator::Modulo, Role::Reverse) => "modulo_reverse",
            // Predicates and bitwise operators resolve a lower receiver by
            // widening it and retrying, so no reverse method exists.
            (Operator::IsEqualTo, _) => "is_equal_to",
            (Operator::IsCloseTo { .. }, _) => "is_close_to",
            (Operator::IsLessThan, _) => "is_less_than",
            (Operator::BitwiseAnd, _) => "bitwise_and",
            (Operator::BitwiseOr, _) => "bitwise_or",
            (Operator::BitwiseXor, _) => "bitwise_xor",
        }
    }

    /// Operators whose result is a value of the operand algebra rather than
    /// a truth value. Only these broadcast a scalar over a matrix.
    pub(crate) fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Modulo
        )
    }

    /// Predicates answer `false` when either operand is nil, everything
    /// else swallows nil into nil.
    pub(crate) fn is_predicate(&self) -> bool {
        matches!(
            self,
            Operator::IsEqualTo | Operator::IsCloseTo { .. } | Operator::IsLessThan
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_track_the_calling_method() {
        assert_eq!(Operator::Add.name(Role::Forward), "add");
        assert_eq!(Operator::Add.name(Role::Reverse), "add_reverse");
        assert_eq!(Operator::IsLessThan.name(Role::Reverse), "is_less_than");
        assert_eq!(
            Operator::IsCloseTo { epsilon: 0.5 }.name(Role::Forward),
            "is_close_to"
        );
    }
}
