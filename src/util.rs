//! Miscellaneous utilities.

use std::fmt;

/// Helper newtype for implementing `Display` on lists of items.
pub struct CommaSep<'a, T: 'a>(pub &'a [T]);

impl<'a, T> fmt::Display for CommaSep<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            item.fmt(f)?
        }
        Ok(())
    }
}

/// Helper newtype for displaying a backtick-quoted SQL identifier.
///
/// Backticks inside the identifier are doubled.
pub struct Quoted<'a>(pub &'a str);

impl<'a> fmt::Display for Quoted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", self.0.replace('`', "``"))
    }
}
