//! Library for compiling relational algebra trees to SQL.
//!
//! Relations are built from tables with the composition operators `alias`,
//! `select` and `join(..).on(..)`, and compiled into a single SELECT
//! statement. The same table may occur any number of times in one tree; every
//! occurrence gets its own deterministic name (`users`, `users_2`, ...), and
//! attributes always refer to the occurrence they were taken from.
//!
//! ```
//! use alg2sql::Relation;
//!
//! let users = Relation::table("users", vec!["id", "name"]);
//! let friends = users.alias();
//! let pred = users.attribute("id")?.eq(friends.attribute("id")?);
//! let sql = users.join(&friends).on(pred).to_sql()?;
//! assert!(sql.contains("INNER JOIN `users` AS `users_2`"));
//! # Ok::<(), alg2sql::Error>(())
//! ```

#[macro_use]
extern crate log;

mod alias;
mod catalog;
mod error;
mod expr;
mod map;
mod ops;
mod relation;
mod sql;
mod util;

pub use crate::catalog::Catalog;
pub use crate::error::Error;
pub use crate::expr::{Attribute, Expression, Literal};
pub use crate::ops::BinaryOp;
pub use crate::relation::{JoinBuilder, JoinKind, Kind, NodeId, Relation};
pub use crate::sql::{Query, Style};

/// Compiles a relation to SQL using the default style.
pub fn to_sql(root: &Relation) -> Result<String, Error> {
    root.to_sql()
}
