pub mod authors;
pub mod demo;
pub mod describe;
pub mod init_schema;

use crate::config::AppConfig;
use rusqlite::Connection;
use std::path::PathBuf;

/// Open and configure the database named by `--db`, or by the config file
pub fn open_database(
    config: &AppConfig,
    db: Option<PathBuf>,
) -> Result<Connection, Box<dyn std::error::Error>> {
    let path = db.unwrap_or_else(|| config.database.path.clone());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = rowmap_sqlite::db::open(&path)?;
    rowmap_sqlite::db::configure(&conn)?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(conn)
}
