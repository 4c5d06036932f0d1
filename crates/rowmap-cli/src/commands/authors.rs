//! Author listing through a typed query
//!
//! Usage: rowmap authors [--first-name <NAME>] [--min-id <ID>] [--sql] [--db <PATH>]

use crate::config::AppConfig;
use crate::models::Author;
use clap::Args;
use rowmap_core::predicate::{prop, Predicate};
use rowmap_core::sql::Order;
use rowmap_core::Session;
use rowmap_sqlite::{SqliteDialect, SqliteExecutor};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AuthorsArgs {
    /// Keep authors with this first name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Keep authors whose id is greater than this
    #[arg(long)]
    pub min_id: Option<i32>,

    /// Print the generated SELECT before the rows
    #[arg(long)]
    pub sql: bool,

    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(args: AuthorsArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = super::open_database(config, args.db)?;
    let executor = SqliteExecutor::new(&conn);
    let session = Session::new(&executor, &SqliteDialect).with_config(&config.engine);

    let mut query = session.select::<Author>()?;
    if let Some(first_name) = args.first_name {
        query = query.filter(&Predicate::new(prop("first_name").eq(first_name)))?;
    }
    if let Some(min_id) = args.min_id {
        query = query.filter(&Predicate::new(prop("id").gt(min_id)))?;
    }
    let query = query.order_by("id", Order::Asc);

    if args.sql {
        println!("{}", query.sql());
    }
    for author in query.get_many()? {
        println!(
            "{}\t{} {}\t{}",
            author.id,
            author.first_name,
            author.last_name,
            author.nick.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
