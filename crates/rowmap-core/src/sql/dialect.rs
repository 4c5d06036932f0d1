//! Database dialects
//!
//! The statement generator is dialect-neutral; only the query reading back a
//! database-generated key, and the connectivity probe, differ per database.

/// Database-specific statement text
pub trait Dialect: Send + Sync {
    /// Short dialect name for logs
    fn name(&self) -> &'static str;

    /// Query returning the value last generated for `table.column` in this session
    ///
    /// `sequence` is the explicit sequence declared on the key, if any.
    fn last_value_query(&self, table: &str, column: &str, sequence: Option<&str>) -> String;

    /// Query used to check that a connection is alive
    fn probe_query(&self) -> &'static str {
        "SELECT 1"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn last_value_query(&self, table: &str, column: &str, sequence: Option<&str>) -> String {
        match sequence {
            Some(sequence) => format!("SELECT CURRVAL('{}')", sequence),
            None => format!(
                "SELECT currval(pg_get_serial_sequence('{}', '{}'))",
                table, column
            ),
        }
    }
}
