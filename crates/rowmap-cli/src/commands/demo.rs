//! End-to-end walk through the engine on the blog schema
//!
//! Usage: rowmap demo [--db <PATH>]

use crate::config::AppConfig;
use crate::models::{Article, Author, Comment, SCHEMA};
use crate::services;
use clap::Args;
use rowmap_core::predicate::{prop, Predicate};
use rowmap_core::value::Value;
use rowmap_core::Session;
use rowmap_sqlite::{db, SqliteDialect, SqliteExecutor};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DemoArgs {
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(args: DemoArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = super::open_database(config, args.db)?;
    conn.execute_batch(SCHEMA)?;

    {
        let executor = SqliteExecutor::new(&conn);
        let session = Session::new(&executor, &SqliteDialect).with_config(&config.engine);
        if !session.is_connected() {
            return Err("database is not reachable".into());
        }
        write_and_read(&session)?;
    }

    // Statements through an executor over the transaction join it
    let tx = db::begin(&mut conn)?;
    let pierre_id = {
        let executor = SqliteExecutor::new(&tx);
        let session = Session::new(&executor, &SqliteDialect).with_config(&config.engine);
        let mut pierre = Author {
            nick: Some("machin".to_string()),
            first_name: "Pierre".to_string(),
            last_name: "Test".to_string(),
            ..Author::default()
        };
        session.insert(&mut pierre)?;
        pierre.id
    };
    tx.commit()?;
    println!("✓ Committed author {} in a transaction", pierre_id);

    let executor = SqliteExecutor::new(&conn);
    let session = Session::new(&executor, &SqliteDialect).with_config(&config.engine);
    let removed = session.delete_where::<Author>(&[("nick", Value::from("machin"))])?;
    println!("✓ Removed {} author(s) with nick machin", removed);

    println!("Authors:");
    for author in services::all_authors(&session)? {
        println!("  {}\t{} {}", author.id, author.first_name, author.last_name);
    }
    Ok(())
}

fn write_and_read(session: &Session<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let mut author = Author {
        nick: Some("truc".to_string()),
        first_name: "Jean".to_string(),
        last_name: "Bon".to_string(),
        ..Author::default()
    };
    session.insert(&mut author)?;
    println!("✓ Inserted author {}", author.id);

    author.last_name = "Bla".to_string();
    session.update(&author)?;

    let mut article = Article {
        title: "Premier article".to_string(),
        content: Some("Bonjour".to_string()),
        author: Some(author.clone()),
        ..Article::default()
    };
    session.insert(&mut article)?;
    println!("✓ Inserted article {}", article.id);

    let mut comment = Comment {
        content: "Bravo".to_string(),
        author: Some(author.clone()),
        article: Some(article.clone()),
        ..Comment::default()
    };
    session.insert(&mut comment)?;
    println!("✓ Inserted comment {}", comment.id);

    if let Some(loaded) = services::article_by_id(session, article.id)? {
        let by = loaded
            .author
            .map(|a| format!("{} {}", a.first_name, a.last_name))
            .unwrap_or_default();
        println!("✓ Article {} \"{}\" by {}", loaded.id, loaded.title, by);
    }

    let jeans = session
        .select::<Author>()?
        .filter(&Predicate::new(prop("first_name").eq("Jean")))?
        .get_many()?;
    println!("✓ Found {} author(s) named Jean", jeans.len());

    let renamed = session.update_where::<Author>(
        &[("firstname", Value::from("Thierry"))],
        &[("nick", Value::from("truc"))],
    )?;
    println!("✓ Renamed {} author(s)", renamed);

    if let Some(reloaded) = services::author_by_id(session, author.id)? {
        println!(
            "✓ Author {} is now {} {}",
            reloaded.id, reloaded.first_name, reloaded.last_name
        );
    }
    Ok(())
}
