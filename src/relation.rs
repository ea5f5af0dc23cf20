//! Relation trees.
//!
//! This module defines the relational algebra: base tables, aliases,
//! selections and joins. A `Relation` is a cheap handle to an immutable node.
//! Composition operators never modify their receiver; they return a new node
//! wrapping it, so earlier handles keep denoting the same sub-tree.
//!
//! Every node gets a unique [`NodeId`] when it is built. Identity, not
//! structure, decides whether two occurrences of a table are "the same": two
//! separately built `users` tables are different relations, and so are a
//! table and its alias.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::expr::{Attribute, Expression};
use crate::sql::{Query, Style};

/// Identity of a relation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Source of fresh node identities.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Returns an identity that has never been handed out before.
    pub(crate) fn next() -> NodeId {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The flavour of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT OUTER JOIN`.
    LeftOuter,
}

/// The variants of a relation node.
#[derive(Debug)]
pub enum Kind {
    /// A named base table with its ordered column names.
    Table { name: String, columns: Vec<String> },
    /// A relabeling of another relation.
    Alias { inner: Relation },
    /// The rows of `inner` satisfying `predicate`.
    Selection {
        inner: Relation,
        predicate: Expression,
    },
    /// The rows of `left` combined with the rows of `right` on `predicate`.
    Join {
        kind: JoinKind,
        left: Relation,
        right: Relation,
        predicate: Expression,
    },
}

#[derive(Debug)]
struct Node {
    id: NodeId,
    kind: Kind,
}

/// A node of the relational algebra.
#[derive(Debug, Clone)]
pub struct Relation(Arc<Node>);

/// A join waiting for its predicate.
///
/// Created by [`Relation::join`] and [`Relation::outer_join`].
#[derive(Debug)]
#[must_use = "a join has no effect until `on` is called"]
pub struct JoinBuilder {
    kind: JoinKind,
    left: Relation,
    right: Relation,
}

impl JoinBuilder {
    /// Completes the join with its predicate.
    pub fn on<T: Into<Expression>>(self, predicate: T) -> Relation {
        Relation::new(Kind::Join {
            kind: self.kind,
            left: self.left,
            right: self.right,
            predicate: predicate.into(),
        })
    }
}

impl Relation {
    fn new(kind: Kind) -> Relation {
        Relation(Arc::new(Node {
            id: NodeId::next(),
            kind,
        }))
    }

    /// Creates a base table with the given columns.
    ///
    /// Each call creates a new identity, even for the same name.
    pub fn table<S, I, C>(name: S, columns: I) -> Relation
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Relation::new(Kind::Table {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the identity of the node.
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// Returns the variant of the node.
    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// Checks if both handles denote the same node.
    pub fn same(&self, other: &Relation) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns an alias of this relation, so that it can appear in a query a
    /// second time under a different name.
    pub fn alias(&self) -> Relation {
        Relation::new(Kind::Alias {
            inner: self.clone(),
        })
    }

    /// Restricts this relation to the rows satisfying `predicate`.
    pub fn select<T: Into<Expression>>(&self, predicate: T) -> Relation {
        Relation::new(Kind::Selection {
            inner: self.clone(),
            predicate: predicate.into(),
        })
    }

    /// Starts an inner join of this relation with `other`.
    pub fn join(&self, other: &Relation) -> JoinBuilder {
        JoinBuilder {
            kind: JoinKind::Inner,
            left: self.clone(),
            right: other.clone(),
        }
    }

    /// Starts a left outer join of this relation with `other`.
    pub fn outer_join(&self, other: &Relation) -> JoinBuilder {
        JoinBuilder {
            kind: JoinKind::LeftOuter,
            left: self.clone(),
            right: other.clone(),
        }
    }

    /// Returns the name of the base table underneath aliases and selections.
    ///
    /// Fails for joins, which have no single base table.
    pub fn base_name(&self) -> Result<&str, Error> {
        match self.kind() {
            Kind::Table { name, .. } => Ok(name.as_str()),
            Kind::Alias { inner } | Kind::Selection { inner, .. } => {
                inner.base_name()
            }
            Kind::Join { .. } => {
                Err(Error::MalformedTree("a join has no base table"))
            }
        }
    }

    /// Returns the attributes this relation projects, in order.
    ///
    /// A join projects the attributes of its left side followed by those of
    /// its right side. An alias projects the attributes of its inner relation,
    /// bound to the alias.
    pub fn attributes(&self) -> Vec<Attribute> {
        match self.kind() {
            Kind::Table { columns, .. } => columns
                .iter()
                .map(|c| Attribute::new(self.id(), c.as_str()))
                .collect(),
            Kind::Alias { inner } => inner
                .attributes()
                .iter()
                .map(|a| a.rebind(self.id()))
                .collect(),
            Kind::Selection { inner, .. } => inner.attributes(),
            Kind::Join { left, right, .. } => {
                let mut attrs = left.attributes();
                attrs.extend(right.attributes());
                attrs
            }
        }
    }

    /// Looks up an attribute by column name.
    ///
    /// The attribute belongs to the table or alias that owns the column,
    /// found by looking through selections and preferring the left side of
    /// joins.
    pub fn attribute(&self, name: &str) -> Result<Attribute, Error> {
        self.lookup(name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    /// Helper function for `attribute`.
    fn lookup(&self, name: &str) -> Option<Attribute> {
        match self.kind() {
            Kind::Table { .. } | Kind::Alias { .. } => {
                if self.has_column(name) {
                    Some(Attribute::new(self.id(), name))
                } else {
                    None
                }
            }
            Kind::Selection { inner, .. } => inner.lookup(name),
            Kind::Join { left, right, .. } => {
                left.lookup(name).or_else(|| right.lookup(name))
            }
        }
    }

    /// Checks if any table reachable from this relation has the column.
    fn has_column(&self, name: &str) -> bool {
        match self.kind() {
            Kind::Table { columns, .. } => columns.iter().any(|c| c == name),
            Kind::Alias { inner } | Kind::Selection { inner, .. } => {
                inner.has_column(name)
            }
            Kind::Join { left, right, .. } => {
                left.has_column(name) || right.has_column(name)
            }
        }
    }

    /// Resolves an attribute of a component relation against this relation.
    ///
    /// Returns the attribute bound to the table or alias in this tree that
    /// carries the attribute owner's identity, searching left first. If the
    /// owner only occurs inside an alias, the attribute is bound to that
    /// alias. Returns `None` if the owner does not occur in the tree.
    pub fn resolve(&self, attr: &Attribute) -> Option<Attribute> {
        let owner = attr.owner();
        self.find_exact(owner)
            .or_else(|| self.find_enclosing(owner))
            .filter(|occurrence| occurrence.has_column(attr.name()))
            .map(|occurrence| attr.rebind(occurrence.id()))
    }

    /// Finds the table or alias with the given identity, skipping over the
    /// insides of aliases.
    fn find_exact(&self, id: NodeId) -> Option<&Relation> {
        match self.kind() {
            Kind::Table { .. } | Kind::Alias { .. } => {
                if self.id() == id {
                    Some(self)
                } else {
                    None
                }
            }
            Kind::Selection { inner, .. } => inner.find_exact(id),
            Kind::Join { left, right, .. } => {
                left.find_exact(id).or_else(|| right.find_exact(id))
            }
        }
    }

    /// Finds the first alias whose inner relation contains the identity.
    fn find_enclosing(&self, id: NodeId) -> Option<&Relation> {
        match self.kind() {
            Kind::Table { .. } => None,
            Kind::Alias { inner } => {
                if inner.contains(id) {
                    Some(self)
                } else {
                    None
                }
            }
            Kind::Selection { inner, .. } => inner.find_enclosing(id),
            Kind::Join { left, right, .. } => left
                .find_enclosing(id)
                .or_else(|| right.find_enclosing(id)),
        }
    }

    /// Checks if a node with the given identity occurs in this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.id() == id
            || match self.kind() {
                Kind::Table { .. } => false,
                Kind::Alias { inner } | Kind::Selection { inner, .. } => {
                    inner.contains(id)
                }
                Kind::Join { left, right, .. } => {
                    left.contains(id) || right.contains(id)
                }
            }
    }

    /// Compiles the relation to a SQL statement using the default style.
    pub fn to_sql(&self) -> Result<String, Error> {
        self.to_sql_with(&Style::default())
    }

    /// Compiles the relation to a SQL statement using the given style.
    pub fn to_sql_with(&self, style: &Style) -> Result<String, Error> {
        Ok(Query::compile(self)?.render(style))
    }
}
