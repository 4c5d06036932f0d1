//! Rowmap CLI
//!
//! Command-line demo of the rowmap engine over SQLite

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod models;
mod services;

#[derive(Debug, Parser)]
#[command(name = "rowmap")]
#[command(about = "Rowmap - Entity mapping over SQLite", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the demo tables
    InitSchema(commands::init_schema::InitSchemaArgs),
    /// Insert, update, query and delete through the engine
    Demo(commands::demo::DemoArgs),
    /// List authors through a translated predicate
    Authors(commands::authors::AuthorsArgs),
    /// Print the mapping metadata of the blog entities
    Describe(commands::describe::DescribeArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::AppConfig::load(&cli.config)?;
    rowmap_core::logging_facility::init(config.logging.profile);

    match cli.command {
        Commands::InitSchema(args) => commands::init_schema::execute(args, &config),
        Commands::Demo(args) => commands::demo::execute(args, &config),
        Commands::Authors(args) => commands::authors::execute(args, &config),
        Commands::Describe(args) => commands::describe::execute(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
