//! SQL text generation
//!
//! - `literal`: value-to-literal inlining shared by every generator
//! - `statement`: INSERT/UPDATE/DELETE text from descriptors or explicit pairs
//! - `dialect`: database-specific queries (generated key read-back, probe)
//! - `builder`: free-form SELECT/INSERT/UPDATE/DELETE composition

pub mod builder;
pub mod dialect;
pub mod literal;
pub mod statement;

pub use builder::{Order, Sql};
pub use dialect::{Dialect, PostgresDialect};
pub use literal::inline_value;
pub use statement::{
    delete_statement, delete_where_statement, insert_statement, set_clause, update_statement,
    update_where_statement, where_clause,
};
