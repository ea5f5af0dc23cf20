//! Structured Query Language (SQL).
//!
//! This module defines data structures for the single form of SQL statement
//! the compiler produces, and implements conversion to it from a relation tree
//! (see the [`relation`] module). The conversion is a direct, order-preserving
//! translation: the leftmost table becomes the FROM clause, every join adds a
//! JOIN clause in the order it appears, and selections become conditions.
//!
//! A selection on the relation passed as a join's right operand is folded
//! into that join's ON clause. Every other selection ends up in WHERE. An ON
//! clause may only name tables emitted at or before its own JOIN, so a join
//! condition that refers into a compound right operand moves to the first
//! clause that brings all of its tables into scope.
//!
//! [`relation`]: crate::relation

use std::collections::HashSet;
use std::fmt::{self, Display};

use crate::alias::Names;
use crate::error::Error;
use crate::expr::{self, Attribute, Literal};
use crate::ops::{self, BinaryOp, Parenthesize};
use crate::relation::{JoinKind, Kind, NodeId, Relation};
use crate::util::{CommaSep, Quoted};

/// A compiled SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The columns to select.
    columns: Vec<Column>,
    /// The leading table of the FROM clause.
    from: Source,
    /// Tables joined onto the leading one, in order.
    joins: Vec<Join>,
    /// The "WHERE" clause, as a vector of conjuncts.
    filter: Vec<Expression>,
}

/// A column qualified by the name of its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    table: String,
    name: String,
}

/// A table in the FROM or JOIN clause, possibly renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Source {
    table: String,
    alias: Option<String>,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    source: Source,
    /// The "ON" clause, as a vector of conjuncts.
    on: Vec<Expression>,
}

/// An expression in a SQL query.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A column from a table.
    Column(Column),
    /// A constant.
    Literal(Literal),
    /// A binary operator applied to two expressions.
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

/// Style options for conversion to SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Put each clause on its own line, indenting joins under FROM.
    pub pretty: bool,
    /// Use SELECT DISTINCT instead of SELECT.
    pub distinct: bool,
}

impl Default for Style {
    fn default() -> Style {
        Style {
            pretty: true,
            distinct: false,
        }
    }
}

/// Where a selection's predicate goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// The WHERE clause of the statement.
    Where,
    /// The ON clause of the join that consumes the operand.
    On,
}

/// A flattened join operand.
struct Operand {
    /// The first table of the operand.
    source: Source,
    /// Conditions on `source` not yet placed in a clause.
    conds: Vec<Expression>,
    /// Joins following `source`.
    joins: Vec<Join>,
}

/// State of the rendering walk.
struct Compiler<'a> {
    names: &'a Names,
    /// Aliases enclosing the node being compiled, outermost first.
    scope: Vec<NodeId>,
    /// Display names of the tables emitted so far.
    emitted: HashSet<String>,
}

impl Query {
    /// Compiles a relation tree into a query.
    ///
    /// Fails with `UnknownAttribute` if a predicate refers to a relation that
    /// does not occur in the tree, and with `MalformedTree` if the tree cannot
    /// be expressed as a single statement.
    pub fn compile(root: &Relation) -> Result<Query, Error> {
        let names = Names::assign(root)?;
        let mut compiler = Compiler {
            names: &names,
            scope: vec![],
            emitted: HashSet::new(),
        };
        let operand = compiler.operand(root, Placement::Where)?;
        let columns = root
            .attributes()
            .iter()
            .map(|attr| compiler.column(attr))
            .collect::<Result<Vec<_>, _>>()?;
        let query = Query {
            columns,
            from: operand.source,
            joins: operand.joins,
            filter: operand.conds,
        };
        trace!(
            "Compiled {} join(s): {}",
            query.joins.len(),
            query.render(&Style {
                pretty: false,
                ..Style::default()
            })
        );
        Ok(query)
    }

    /// Renders the query as text.
    pub fn render(&self, style: &Style) -> String {
        Styled(self, style).to_string()
    }
}

impl<'a> Compiler<'a> {
    fn operand(
        &mut self,
        rel: &Relation,
        placement: Placement,
    ) -> Result<Operand, Error> {
        match rel.kind() {
            Kind::Table { name, .. } => {
                let source = Source::new(name, self.display_name(rel.id())?);
                self.emitted.insert(source.name().to_string());
                Ok(Operand {
                    source,
                    conds: vec![],
                    joins: vec![],
                })
            }
            Kind::Alias { inner } => {
                let display = self.display_name(rel.id())?;
                self.scope.push(rel.id());
                let inner = self.operand(inner, placement);
                self.scope.pop();
                let inner = inner?;
                if !inner.joins.is_empty() {
                    return Err(Error::MalformedTree("cannot alias a join"));
                }
                Ok(Operand {
                    source: Source::new(&inner.source.table, display),
                    conds: inner.conds,
                    joins: vec![],
                })
            }
            Kind::Selection { inner, predicate } => {
                let mut operand = self.operand(inner, placement)?;
                let cond = self.expression(predicate)?;
                if placement == Placement::On
                    && !cond.tables().iter().all(|t| self.emitted.contains(*t))
                {
                    return Err(Error::MalformedTree(
                        "selection refers to a relation joined later",
                    ));
                }
                match (placement, operand.joins.last_mut()) {
                    (Placement::On, Some(join)) => join.on.push(cond),
                    _ => operand.conds.push(cond),
                }
                Ok(operand)
            }
            Kind::Join {
                kind,
                left,
                right,
                predicate,
            } => {
                let mut operand = self.operand(left, placement)?;
                let mut visible = self.emitted.clone();
                let right = self.operand(right, Placement::On)?;
                if *kind == JoinKind::LeftOuter && !right.joins.is_empty() {
                    return Err(Error::MalformedTree(
                        "cannot outer join a compound relation",
                    ));
                }
                let cond = self.expression(predicate)?;
                let mut joins = vec![Join {
                    kind: *kind,
                    source: right.source,
                    on: right.conds,
                }];
                joins.extend(right.joins);
                let position = {
                    let tables = cond.tables();
                    joins.iter().position(|join| {
                        visible.insert(join.source.name().to_string());
                        tables.iter().all(|t| visible.contains(*t))
                    })
                };
                let position = position.ok_or(Error::MalformedTree(
                    "join condition refers to a relation joined later",
                ))?;
                if position == 0 {
                    joins[0].on.insert(0, cond);
                } else {
                    joins[position].on.push(cond);
                }
                trace!("Emitting {}", joins[0]);
                if position != 0 {
                    trace!("Join condition moved to {}", joins[position].source);
                }
                operand.joins.extend(joins);
                Ok(operand)
            }
        }
    }

    /// Returns the name of a table or alias as seen from the current scope.
    fn display_name(&self, id: NodeId) -> Result<String, Error> {
        self.names
            .resolve(id, &self.scope)
            .map(str::to_string)
            .ok_or(Error::MalformedTree("relation was not named"))
    }

    fn column(&self, attr: &Attribute) -> Result<Column, Error> {
        match self.names.resolve(attr.owner(), &self.scope) {
            Some(table) => Ok(Column {
                table: table.to_string(),
                name: attr.name().to_string(),
            }),
            None => Err(Error::UnknownAttribute(attr.name().to_string())),
        }
    }

    fn expression(&self, expr: &expr::Expression) -> Result<Expression, Error> {
        match expr {
            expr::Expression::Attribute(attr) => {
                Ok(Expression::Column(self.column(attr)?))
            }
            expr::Expression::Literal(lit) => {
                Ok(Expression::Literal(lit.clone()))
            }
            expr::Expression::Binary { op, left, right } => {
                Ok(Expression::Binary(
                    *op,
                    Box::new(self.expression(left)?),
                    Box::new(self.expression(right)?),
                ))
            }
        }
    }
}

impl Source {
    /// Creates a source, renaming it only if the display name differs.
    fn new(table: &str, display: String) -> Source {
        let alias = if display == table { None } else { Some(display) };
        Source {
            table: table.to_string(),
            alias,
        }
    }

    /// Returns the name columns of this source are qualified with.
    fn name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

impl Expression {
    /// Returns the tables of the columns in the expression, left to right.
    fn tables(&self) -> Vec<&str> {
        let mut tables = vec![];
        self.tables_helper(&mut tables);
        tables
    }

    /// Helper function for `tables`.
    fn tables_helper<'a>(&'a self, tables: &mut Vec<&'a str>) {
        match self {
            Expression::Column(col) => tables.push(&col.table),
            Expression::Literal(..) => (),
            Expression::Binary(_, lhs, rhs) => {
                lhs.tables_helper(tables);
                rhs.tables_helper(tables);
            }
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", Quoted(&self.table), Quoted(&self.name))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.alias {
            Some(alias) => {
                write!(f, "{} AS {}", Quoted(&self.table), Quoted(alias))
            }
            None => Quoted(&self.table).fmt(f),
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::LeftOuter => write!(f, "LEFT OUTER JOIN"),
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind, self.source, Conjunction(&self.on))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Column(col) => col.fmt(f),
            Expression::Literal(lit) => lit.fmt(f),
            Expression::Binary(op, lhs, rhs) => {
                ops::write_operation(f, *op, lhs.as_ref(), rhs.as_ref())
            }
        }
    }
}

impl Parenthesize for Expression {
    fn precedence(&self) -> ops::Precedence {
        match self {
            Expression::Column(..) | Expression::Literal(..) => {
                ops::HIGHEST_PRECEDENCE
            }
            Expression::Binary(op, ..) => op.precedence(),
        }
    }
}

/// Helper newtype for displaying conjuncts joined by AND.
///
/// An empty conjunction is `TRUE`.
struct Conjunction<'a>(&'a [Expression]);

impl<'a> fmt::Display for Conjunction<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let and = BinaryOp::And.precedence();
        if self.0.is_empty() {
            return Literal::Boolean(true).fmt(f);
        }
        for (i, cond) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " AND ")?;
            }
            if cond.precedence() < and {
                write!(f, "({})", cond)?;
            } else {
                cond.fmt(f)?;
            }
        }
        Ok(())
    }
}

/// Helper newtype for displaying a query in a given style.
struct Styled<'a>(&'a Query, &'a Style);

impl<'a> fmt::Display for Styled<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Styled(query, style) = self;
        let (line, indent) = if style.pretty { ("\n", "  ") } else { (" ", "") };
        write!(f, "SELECT ")?;
        if style.distinct {
            write!(f, "DISTINCT ")?;
        }
        if query.columns.is_empty() {
            write!(f, "*")?;
        } else {
            CommaSep(&query.columns).fmt(f)?;
        }
        write!(f, "{}FROM {}", line, query.from)?;
        for join in &query.joins {
            write!(
                f,
                "{}{}{} {}{}{}{}ON {}",
                line,
                indent,
                join.kind,
                join.source,
                line,
                indent,
                indent,
                Conjunction(&join.on)
            )?;
        }
        if !query.filter.is_empty() {
            write!(f, "{}WHERE {}", line, Conjunction(&query.filter))?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Styled(self, &Style::default()).fmt(f)
    }
}
