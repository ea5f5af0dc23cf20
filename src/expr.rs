//! Predicate expressions.
//!
//! Expressions are the leaves of the algebra: attribute references, literal
//! values, and binary operations combining them. They serve as join and
//! selection predicates. An expression refers to relations only through the
//! identity of the attribute owners, so it never keeps a relation alive.

use std::fmt;

use crate::ops::BinaryOp;
use crate::relation::NodeId;

/// A named column bound to the relation it was requested from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Identity of the owning relation.
    owner: NodeId,
    /// The column name.
    name: String,
}

/// A literal SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// A string, quoted on output.
    Text(String),
}

/// An expression usable as a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A column of some relation.
    Attribute(Attribute),
    /// A constant value.
    Literal(Literal),
    /// A binary operator applied to two operands.
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Attribute {
    pub(crate) fn new<S: Into<String>>(owner: NodeId, name: S) -> Attribute {
        Attribute {
            owner,
            name: name.into(),
        }
    }

    /// Returns the identity of the relation that owns the attribute.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same column bound to a different owner.
    pub(crate) fn rebind(&self, owner: NodeId) -> Attribute {
        Attribute::new(owner, self.name.as_str())
    }

    fn compare<T: Into<Expression>>(&self, op: BinaryOp, rhs: T) -> Expression {
        Expression::binary(op, self.clone(), rhs)
    }

    /// Builds `self = rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn eq<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::Eq, rhs)
    }

    /// Builds `self <> rhs`.
    pub fn not_eq<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::NotEq, rhs)
    }

    /// Builds `self < rhs`.
    pub fn lt<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::Lt, rhs)
    }

    /// Builds `self <= rhs`.
    pub fn lt_eq<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::LtEq, rhs)
    }

    /// Builds `self > rhs`.
    pub fn gt<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::Gt, rhs)
    }

    /// Builds `self >= rhs`.
    pub fn gt_eq<T: Into<Expression>>(&self, rhs: T) -> Expression {
        self.compare(BinaryOp::GtEq, rhs)
    }
}

impl Expression {
    /// Applies `op` to two operands.
    pub fn binary<L, R>(op: BinaryOp, left: L, right: R) -> Expression
    where
        L: Into<Expression>,
        R: Into<Expression>,
    {
        Expression::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Builds `self AND rhs`.
    pub fn and<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::And, self, rhs)
    }

    /// Builds `self OR rhs`.
    pub fn or<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::Or, self, rhs)
    }

    /// Builds `self = rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn eq<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::Eq, self, rhs)
    }

    /// Builds `self <> rhs`.
    pub fn not_eq<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::NotEq, self, rhs)
    }

    /// Builds `self < rhs`.
    pub fn lt<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::Lt, self, rhs)
    }

    /// Builds `self <= rhs`.
    pub fn lt_eq<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::LtEq, self, rhs)
    }

    /// Builds `self > rhs`.
    pub fn gt<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::Gt, self, rhs)
    }

    /// Builds `self >= rhs`.
    pub fn gt_eq<T: Into<Expression>>(self, rhs: T) -> Expression {
        Expression::binary(BinaryOp::GtEq, self, rhs)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<Attribute> for Expression {
    fn from(attr: Attribute) -> Expression {
        Expression::Attribute(attr)
    }
}

impl<'a> From<&'a Attribute> for Expression {
    fn from(attr: &'a Attribute) -> Expression {
        Expression::Attribute(attr.clone())
    }
}

impl From<Literal> for Expression {
    fn from(lit: Literal) -> Expression {
        Expression::Literal(lit)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Literal {
        Literal::Boolean(b)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Literal {
        Literal::Integer(n.into())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Literal {
        Literal::Integer(n)
    }
}

impl From<f64> for Literal {
    fn from(x: f64) -> Literal {
        Literal::Float(x)
    }
}

impl<'a> From<&'a str> for Literal {
    fn from(s: &'a str) -> Literal {
        Literal::Text(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Literal {
        Literal::Text(s)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Expression {
        Expression::Literal(b.into())
    }
}

impl From<i32> for Expression {
    fn from(n: i32) -> Expression {
        Expression::Literal(n.into())
    }
}

impl From<i64> for Expression {
    fn from(n: i64) -> Expression {
        Expression::Literal(n.into())
    }
}

impl From<f64> for Expression {
    fn from(x: f64) -> Expression {
        Expression::Literal(x.into())
    }
}

impl<'a> From<&'a str> for Expression {
    fn from(s: &'a str) -> Expression {
        Expression::Literal(s.into())
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Expression {
        Expression::Literal(s.into())
    }
}
