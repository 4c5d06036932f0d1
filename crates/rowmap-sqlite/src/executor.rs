//! rusqlite-backed statement executor
//!
//! Values cross into SQLite as `rusqlite::types::Value`: booleans become
//! 0/1 integers and timestamps become text in the engine's timestamp
//! layout. Coming back, integers read as `BigInt` and are narrowed by the
//! engine to each property's declared kind.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, invalid_text, unknown_parameter, unsupported_column, Result};
use rowmap_core::cursor::{Param, RowCursor, StatementExecutor};
use rowmap_core::errors::binding;
use rowmap_core::value::{Value, TIMESTAMP_FORMAT};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Rows, Statement};

/// Executor over a borrowed connection
///
/// A `Transaction` derefs to `Connection`, so an executor built from one
/// runs every statement inside that transaction.
pub struct SqliteExecutor<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteExecutor<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    fn prepare(&self, sql: &str, params: &[Param<'_>]) -> Result<Statement<'c>> {
        tracing::trace!(sql = sql, params = params.len(), "sqlite prepare");
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        bind(&mut stmt, params)?;
        Ok(stmt)
    }
}

fn bind(stmt: &mut Statement<'_>, params: &[Param<'_>]) -> Result<()> {
    for (name, value) in params {
        let marker = if name.starts_with([':', '@', '$']) {
            name.to_string()
        } else {
            format!(":{}", name)
        };
        let index = stmt
            .parameter_index(&marker)
            .map_err(from_rusqlite)?
            .ok_or_else(|| unknown_parameter(&marker))?;
        stmt.raw_bind_parameter(index, to_sql_value(value))
            .map_err(from_rusqlite)?;
    }
    Ok(())
}

/// Convert an engine value to the SQLite value bound for it
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Int(v) => SqlValue::Integer(i64::from(*v)),
        Value::BigInt(v) => SqlValue::Integer(*v),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Timestamp(v) => SqlValue::Text(v.format(TIMESTAMP_FORMAT).to_string()),
    }
}

/// Convert a cell read from SQLite to an engine value
pub fn from_sql_value(column: &str, cell: ValueRef<'_>) -> Result<Value> {
    match cell {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::BigInt(v)),
        ValueRef::Real(v) => Ok(Value::Float(v)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| invalid_text(column, e)),
        ValueRef::Blob(_) => Err(unsupported_column(column, "blob")),
    }
}

/// Cursor over a running statement
///
/// The current row is copied out on `advance`; the statement is reset when
/// the cursor is dropped.
pub struct SqliteCursor<'s> {
    rows: Rows<'s>,
    columns: Vec<String>,
    current: Option<Vec<Value>>,
}

impl<'s> SqliteCursor<'s> {
    fn new(rows: Rows<'s>, columns: Vec<String>) -> Self {
        Self {
            rows,
            columns,
            current: None,
        }
    }
}

impl RowCursor for SqliteCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        let columns = &self.columns;
        self.current = match self.rows.next().map_err(from_rusqlite)? {
            Some(row) => {
                let mut cells = Vec::with_capacity(columns.len());
                for (index, column) in columns.iter().enumerate() {
                    let cell = row.get_ref(index).map_err(from_rusqlite)?;
                    cells.push(from_sql_value(column, cell)?);
                }
                Some(cells)
            }
            None => None,
        };
        Ok(self.current.is_some())
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn value(&self, column: &str) -> Result<Value> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| binding(column, "cursor is not positioned on a row"))?;
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| binding(column, "column not present in result"))?;
        Ok(row.get(index).cloned().unwrap_or(Value::Null))
    }
}

impl StatementExecutor for SqliteExecutor<'_> {
    fn execute(&self, sql: &str, params: &[Param<'_>]) -> Result<usize> {
        let mut stmt = self.prepare(sql, params)?;
        stmt.raw_execute().map_err(from_rusqlite)
    }

    fn query(
        &self,
        sql: &str,
        params: &[Param<'_>],
        visit: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = self.prepare(sql, params)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut cursor = SqliteCursor::new(stmt.raw_query(), columns);
        visit(&mut cursor)
    }

    fn scalar(&self, sql: &str, params: &[Param<'_>]) -> Result<Value> {
        let mut stmt = self.prepare(sql, params)?;
        let mut rows = stmt.raw_query();
        let value = match rows.next().map_err(from_rusqlite)? {
            Some(row) => from_sql_value("scalar", row.get_ref(0).map_err(from_rusqlite)?)?,
            None => Value::Null,
        };
        Ok(value)
    }
}
