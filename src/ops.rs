//! Binary operators.
//!
//! This module defines the operators that can appear in predicates, their SQL
//! precedences, and a function for displaying them with minimal
//! parenthesization.

use std::fmt;

/// Operator precedence (zero is lowest).
pub type Precedence = u32;

/// The highest operator precedence, reserved for special use.
pub const HIGHEST_PRECEDENCE: Precedence = 4;

/// A binary operator usable in join and selection predicates.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinaryOp {
    /// Equality.
    Eq,
    /// Inequality.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl BinaryOp {
    /// Returns the SQL token for the operator.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    /// Returns the precedence of the operator.
    ///
    /// All comparisons share one tier, so a comparison nested in another is
    /// always parenthesized.
    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 3,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// An expression that may need to be parenthesized.
pub trait Parenthesize {
    /// Returns the precedence of the expression.
    fn precedence(&self) -> Precedence;
}

/// Formats a binary operation.
///
/// Writes `lhs op rhs` to `f` with spaces around the operator. Assumes all
/// operators are left-associative, so the right operand is parenthesized when
/// it binds no tighter than `op`.
pub fn write_operation<T>(
    f: &mut fmt::Formatter,
    op: BinaryOp,
    lhs: &T,
    rhs: &T,
) -> fmt::Result
where
    T: fmt::Display + Parenthesize,
{
    let prec = op.precedence();
    match (prec > lhs.precedence(), prec >= rhs.precedence()) {
        (false, false) => write!(f, "{} {} {}", lhs, op, rhs),
        (false, true) => write!(f, "{} {} ({})", lhs, op, rhs),
        (true, false) => write!(f, "({}) {} {}", lhs, op, rhs),
        (true, true) => write!(f, "({}) {} ({})", lhs, op, rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BinaryOp; 8] = [
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::LtEq,
        BinaryOp::Gt,
        BinaryOp::GtEq,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    const COMPARISONS: [BinaryOp; 6] = [
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::LtEq,
        BinaryOp::Gt,
        BinaryOp::GtEq,
    ];

    #[test]
    fn precedences_in_range() {
        for op in ALL.iter() {
            assert!(op.precedence() > 0, "For operator {}", op);
            assert!(op.precedence() < HIGHEST_PRECEDENCE, "For operator {}", op);
        }
    }

    #[test]
    fn comparisons_share_a_tier() {
        for op in COMPARISONS.iter() {
            assert_eq!(
                op.precedence(),
                BinaryOp::Eq.precedence(),
                "For operator {}",
                op
            );
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
        assert!(BinaryOp::Lt.precedence() > BinaryOp::And.precedence());
    }

    #[test]
    fn tokens() {
        let tokens: Vec<&str> = ALL.iter().map(|op| op.token()).collect();
        assert_eq!(tokens, vec!["=", "<>", "<", "<=", ">", ">=", "AND", "OR"]);
    }
}
