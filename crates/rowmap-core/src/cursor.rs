//! Driver-facing boundary: statement executor and row cursor
//!
//! The engine never talks to a database directly. A driver implements
//! [`StatementExecutor`] and hands result rows to the engine through a
//! [`RowCursor`] that lives only for the duration of
//! [`StatementExecutor::query`]'s callback, so the driver can release it on
//! every exit path.

pub mod memory;

use crate::errors::Result;
use crate::value::Value;
use std::collections::HashSet;

/// A named statement parameter; the name is given without its `:` marker
pub type Param<'a> = (&'a str, Value);

/// Forward-only cursor over a result set
pub trait RowCursor {
    /// Move to the next row; `false` once the result is exhausted
    fn advance(&mut self) -> Result<bool>;

    /// Column names of the result, in select order
    fn columns(&self) -> &[String];

    /// Cell of the current row
    fn value(&self, column: &str) -> Result<Value>;

    fn is_null(&self, column: &str) -> Result<bool> {
        Ok(self.value(column)?.is_null())
    }
}

/// Statement execution provided by a driver
pub trait StatementExecutor {
    /// Run a statement, returning the affected row count
    fn execute(&self, sql: &str, params: &[Param<'_>]) -> Result<usize>;

    /// Run a query and hand its cursor to `visit`
    ///
    /// The cursor must be closed when this returns, whether `visit`
    /// succeeded, failed, or never advanced it.
    fn query(
        &self,
        sql: &str,
        params: &[Param<'_>],
        visit: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()>;

    /// Run a query returning a single value
    fn scalar(&self, sql: &str, params: &[Param<'_>]) -> Result<Value>;
}

/// Presence set of the columns available in a result, built once per result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: HashSet<String>,
}

impl ColumnSet {
    pub fn from_cursor(cursor: &dyn RowCursor) -> Self {
        cursor.columns().iter().cloned().collect()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<String> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
