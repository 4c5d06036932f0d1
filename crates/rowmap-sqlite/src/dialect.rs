use rowmap_core::sql::Dialect;

/// SQLite statement text
///
/// SQLite has no sequences; the generated key is the connection's last rowid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn last_value_query(&self, _table: &str, _column: &str, _sequence: Option<&str>) -> String {
        "SELECT last_insert_rowid()".to_string()
    }
}
