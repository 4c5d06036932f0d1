//! In-memory executor
//!
//! Serves scripted result sets and scalars, records every statement it
//! receives and counts the cursors it has open. Used by the engine's tests
//! and by anything that wants to look at generated SQL without a database.

use super::{Param, RowCursor, StatementExecutor};
use crate::errors::{binding, driver, Result};
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

/// Failure injected with [`MemoryExecutor::fail_next`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MemoryDriverError(pub String);

/// A scripted result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MemoryResult {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; cells follow the column order
    pub fn row(mut self, cells: Vec<Value>) -> Self {
        self.rows.push(cells);
        self
    }
}

/// A statement as the executor received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

pub struct MemoryCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<Vec<Value>>,
    open: Rc<Cell<usize>>,
}

impl MemoryCursor {
    fn open(result: MemoryResult, open: Rc<Cell<usize>>) -> Self {
        open.set(open.get() + 1);
        Self {
            columns: result.columns,
            rows: result.rows.into_iter(),
            current: None,
            open,
        }
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.open.set(self.open.get().saturating_sub(1));
    }
}

impl RowCursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool> {
        self.current = self.rows.next();
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

/// Scripted [`StatementExecutor`]
pub struct MemoryExecutor {
    results: RefCell<VecDeque<MemoryResult>>,
    scalars: RefCell<VecDeque<Value>>,
    affected: Cell<usize>,
    failure: RefCell<Option<String>>,
    statements: RefCell<Vec<RecordedStatement>>,
    open: Rc<Cell<usize>>,
}

impl Default for MemoryExecutor {
    fn default() -> Self {
        Self {
            results: RefCell::new(VecDeque::new()),
            scalars: RefCell::new(VecDeque::new()),
            affected: Cell::new(1),
            failure: RefCell::new(None),
            statements: RefCell::new(Vec::new()),
            open: Rc::new(Cell::new(0)),
        }
    }
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result set served by the next query
    pub fn push_result(&self, result: MemoryResult) {
        self.results.borrow_mut().push_back(result);
    }

    /// Queue the value served by the next scalar query
    pub fn push_scalar(&self, value: impl Into<Value>) {
        self.scalars.borrow_mut().push_back(value.into());
    }

    /// Row count reported by `execute`; 1 unless set
    pub fn set_affected(&self, rows: usize) {
        self.affected.set(rows);
    }

    /// Make the next call fail with a driver error
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.failure.borrow_mut() = Some(message.into());
    }

    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.statements.borrow().clone()
    }

    /// SQL text of every statement received, in order
    pub fn sql(&self) -> Vec<String> {
        self.statements.borrow().iter().map(|s| s.sql.clone()).collect()
    }

    /// Cursors opened and not yet released
    pub fn open_cursors(&self) -> usize {
        self.open.get()
    }

    fn record(&self, sql: &str, params: &[Param<'_>]) -> Result<()> {
        self.statements.borrow_mut().push(RecordedStatement {
            sql: sql.to_string(),
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        });
        match self.failure.borrow_mut().take() {
            Some(message) => Err(driver(MemoryDriverError(message))),
            None => Ok(()),
        }
    }
}

impl StatementExecutor for MemoryExecutor {
    fn execute(&self, sql: &str, params: &[Param<'_>]) -> Result<usize> {
        self.record(sql, params)?;
        Ok(self.affected.get())
    }

    fn query(
        &self,
        sql: &str,
        params: &[Param<'_>],
        visit: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()> {
        self.record(sql, params)?;
        let result = self.results.borrow_mut().pop_front().unwrap_or_default();
        let mut cursor = MemoryCursor::open(result, Rc::clone(&self.open));
        visit(&mut cursor)
    }

    fn scalar(&self, sql: &str, params: &[Param<'_>]) -> Result<Value> {
        self.record(sql, params)?;
        Ok(self.scalars.borrow_mut().pop_front().unwrap_or(Value::Null))
    }
}
