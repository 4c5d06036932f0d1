//! Rowmap Core - Entity mapping and query translation engine
//!
//! This crate maps Rust types onto relational tables and provides:
//! - Declarative mapping tags and a process-wide descriptor registry
//! - Compiled property accessors built once per type
//! - Row hydration, including one-to-one relations carried in joined rows
//! - INSERT/UPDATE/DELETE generation with literal inlining
//! - Predicate translation to SQL boolean fragments
//!
//! Database access goes through the [`cursor::StatementExecutor`] trait; a
//! driver crate supplies the implementation.

pub mod accessor;
pub mod config;
pub mod cursor;
pub mod descriptor;
pub mod errors;
pub mod hydrate;
pub mod logging_facility;
pub mod mapping;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod session;
pub mod sql;
pub mod value;

// Re-export commonly used types
pub use config::{ComparisonMapping, EngineConfig};
pub use cursor::{ColumnSet, Param, RowCursor, StatementExecutor};
pub use descriptor::EntityDescriptor;
pub use errors::{ErrorKind, MapError, Result};
pub use mapping::{Entity, KeyTag, Mapping, RelationTag};
pub use predicate::{Predicate, Translator};
pub use query::Query;
pub use registry::Registry;
pub use session::Session;
pub use value::{FieldValue, Value, ValueKind};
