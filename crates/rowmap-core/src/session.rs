//! Session: registry, executor and dialect bound together
//!
//! Every operation here is logged through the logging facility with the
//! table it targets.

#![allow(clippy::result_large_err)]

use crate::config::EngineConfig;
use crate::cursor::{Param, StatementExecutor};
use crate::errors::Result;
use crate::hydrate;
use crate::mapping::Entity;
use crate::predicate::{Predicate, Translator};
use crate::query::Query;
use crate::registry::Registry;
use crate::sql::dialect::Dialect;
use crate::sql::statement::{
    delete_statement, delete_where_statement, insert_statement, update_statement,
    update_where_statement,
};
use crate::value::Value;
use crate::{log_op_end, log_op_error, log_op_start};
use std::any::Any;
use std::time::Instant;

pub struct Session<'c> {
    executor: &'c dyn StatementExecutor,
    dialect: &'c dyn Dialect,
    registry: &'c Registry,
    translator: Translator,
}

impl<'c> Session<'c> {
    /// Session over the process-wide registry with default settings
    pub fn new(executor: &'c dyn StatementExecutor, dialect: &'c dyn Dialect) -> Self {
        Self {
            executor,
            dialect,
            registry: Registry::global(),
            translator: Translator::default(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: &'c Registry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.translator = Translator::new(config);
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn registry(&self) -> &'c Registry {
        self.registry
    }

    pub fn dialect(&self) -> &'c dyn Dialect {
        self.dialect
    }

    fn observe<T>(&self, op: &'static str, table: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        log_op_start!(op, table = table, dialect = self.dialect.name());

        let result = f();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = duration_ms, table = table);
            }
            Err(err) => {
                log_op_error!(op, err, duration_ms = duration_ms, table = table);
            }
        }
        result
    }

    fn run(&self, table: &str, sql: &str) -> Result<usize> {
        let affected = self.executor.execute(sql, &[])?;
        tracing::debug!(table = table, affected = affected, sql = sql, "statement executed");
        Ok(affected)
    }

    /// Run a statement as is
    pub fn execute(&self, sql: &str, params: &[Param<'_>]) -> Result<usize> {
        self.executor.execute(sql, params)
    }

    pub fn scalar(&self, sql: &str, params: &[Param<'_>]) -> Result<Value> {
        self.executor.scalar(sql, params)
    }

    /// Run the dialect's probe query; any failure reads as disconnected
    pub fn is_connected(&self) -> bool {
        self.executor.scalar(self.dialect.probe_query(), &[]).is_ok()
    }

    /// First row of `sql` as an `E`, or `None` for an empty result
    pub fn parse_one<E: Entity>(&self, sql: &str, params: &[Param<'_>]) -> Result<Option<E>> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("parse_one", descriptor.table(), || {
            hydrate::parse_one::<E>(self.registry, self.executor, sql, params)
        })
    }

    /// Every row of `sql` as an `E`, in result order
    pub fn parse_many<E: Entity>(&self, sql: &str, params: &[Param<'_>]) -> Result<Vec<E>> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("parse_many", descriptor.table(), || {
            let entities = hydrate::parse_many::<E>(self.registry, self.executor, sql, params)?;
            tracing::debug!(table = descriptor.table(), rows = entities.len(), "rows hydrated");
            Ok(entities)
        })
    }

    /// [`parse_one`](Self::parse_one) by table name, for already registered tables
    pub fn parse_one_table(
        &self,
        table: &str,
        sql: &str,
        params: &[Param<'_>],
    ) -> Result<Option<Box<dyn Any + Send>>> {
        self.observe("parse_one", table, || {
            hydrate::parse_one_table(self.registry, self.executor, table, sql, params)
        })
    }

    pub fn parse_many_table(
        &self,
        table: &str,
        sql: &str,
        params: &[Param<'_>],
    ) -> Result<Vec<Box<dyn Any + Send>>> {
        self.observe("parse_many", table, || {
            hydrate::parse_many_table(self.registry, self.executor, table, sql, params)
        })
    }

    /// Insert `entity`
    ///
    /// When `E` has an auto-increment key the generated value is read back
    /// with the dialect's last-value query and written onto `entity`.
    ///
    /// The insert and the read-back are two statements on the executor, not
    /// wrapped in a transaction. The read-back returns the value generated
    /// last on this connection, so both must run on the same connection with
    /// no other insert in between. Sharing an executor across callers that
    /// insert concurrently breaks this.
    pub fn insert<E: Entity>(&self, entity: &mut E) -> Result<()> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("insert", descriptor.table(), || {
            let sql = insert_statement(self.registry, &descriptor, &*entity)?;
            self.run(descriptor.table(), &sql)?;

            if let Some(key) = descriptor.seeded_key() {
                let query = self.dialect.last_value_query(
                    descriptor.table(),
                    &key.column,
                    key.sequence.as_deref(),
                );
                let generated = self.executor.scalar(&query, &[])?.convert(key.kind)?;
                descriptor.set_value(entity, &key.property, generated)?;
            }
            Ok(())
        })
    }

    /// Update every field of `entity`, matched on its keys
    pub fn update<E: Entity>(&self, entity: &E) -> Result<usize> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("update", descriptor.table(), || {
            let sql = update_statement(self.registry, &descriptor, entity)?;
            self.run(descriptor.table(), &sql)
        })
    }

    /// Update `E`'s table from explicit column/value pairs
    pub fn update_where<E: Entity>(
        &self,
        set: &[(&str, Value)],
        filter: &[(&str, Value)],
    ) -> Result<usize> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("update_where", descriptor.table(), || {
            let sql = update_where_statement(descriptor.table(), set, filter)?;
            self.run(descriptor.table(), &sql)
        })
    }

    pub fn delete<E: Entity>(&self, entity: &E) -> Result<usize> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("delete", descriptor.table(), || {
            let sql = delete_statement(self.registry, &descriptor, entity)?;
            self.run(descriptor.table(), &sql)
        })
    }

    pub fn delete_where<E: Entity>(&self, filter: &[(&str, Value)]) -> Result<usize> {
        let descriptor = self.registry.ensure_registered::<E>()?;
        self.observe("delete_where", descriptor.table(), || {
            let sql = delete_where_statement(descriptor.table(), filter)?;
            self.run(descriptor.table(), &sql)
        })
    }

    /// SQL fragment for `predicate`
    pub fn translate<E: Entity>(&self, predicate: &Predicate<E>) -> Result<String> {
        self.translator.translate(self.registry, predicate)
    }

    /// SELECT over `E`'s table
    pub fn select<E: Entity>(&self) -> Result<Query<'_, E>> {
        Query::new(self)
    }
}
