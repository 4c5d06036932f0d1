//! Rowmap SQLite - rusqlite driver for the rowmap engine
//!
//! Provides:
//! - Connection helpers (open, configure, probe, transaction)
//! - A statement executor handing rows to the engine through a cursor
//! - The SQLite dialect used to read back generated keys

pub mod db;
pub mod dialect;
pub mod errors;
pub mod executor;

// Re-export key types
pub use dialect::SqliteDialect;
pub use errors::Result;
pub use executor::SqliteExecutor;
