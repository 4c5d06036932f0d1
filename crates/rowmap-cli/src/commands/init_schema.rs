//! Demo schema creation
//!
//! Usage: rowmap init-schema [--db <PATH>]

use crate::config::AppConfig;
use crate::models::SCHEMA;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitSchemaArgs {
    /// Database file (defaults to database.path from the config)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(args: InitSchemaArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = super::open_database(config, args.db)?;
    conn.execute_batch(SCHEMA)?;
    println!("✓ Schema ready (authors, articles, comments)");
    Ok(())
}
