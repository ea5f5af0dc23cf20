//! Error type for building and compiling relations.

/// Error type for attribute lookup and SQL compilation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No relation reachable from the receiver owns a column of this name, or
    /// an attribute refers to a relation that does not occur in the tree.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    /// The catalog has no table of this name.
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    /// The tree cannot be rendered as a single SELECT statement.
    #[error("Malformed relation tree: {0}")]
    MalformedTree(&'static str),
}
