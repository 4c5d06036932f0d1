#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{noon, Article, Author, Comment};
use rowmap_core::cursor::memory::{MemoryExecutor, MemoryResult};
use rowmap_core::cursor::ColumnSet;
use rowmap_core::cursor::StatementExecutor;
use rowmap_core::errors::ErrorKind;
use rowmap_core::hydrate::{hydrate, parse_many, parse_one, parse_one_table};
use rowmap_core::registry::Registry;
use rowmap_core::value::Value;

fn article_row() -> MemoryResult {
    MemoryResult::new(&["id", "title", "content", "author_id", "author_nick"]).row(vec![
        Value::Int(1),
        Value::from("Les Misérables"),
        Value::from("Tome premier"),
        Value::Int(7),
        Value::from("24601"),
    ])
}

#[test]
fn test_joined_row_populates_relation() {
    // Given: A joined row carrying the author under the "author" prefix
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(article_row());

    // When: It is parsed as an Article
    let article: Article = parse_one(&registry, &executor, "SELECT ...", &[])
        .unwrap()
        .unwrap();

    // Then: The nested author comes from the prefixed columns
    assert_eq!(article.id, 1);
    assert_eq!(article.title, "Les Misérables");
    assert_eq!(article.content.as_deref(), Some("Tome premier"));
    let author = article.author.expect("author hydrated from joined row");
    assert_eq!(author.id, 7);
    assert_eq!(author.nick.as_deref(), Some("24601"));
    assert_eq!(author.first_name, "");
}

#[test]
fn test_null_join_column_leaves_relation_unset() {
    // Given: A row whose join column is null
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&["id", "title", "author_id", "author_nick"]).row(vec![
            Value::Int(2),
            Value::from("Orphan"),
            Value::Null,
            Value::from("ghost"),
        ]),
    );

    // When: It is parsed
    let article: Article = parse_one(&registry, &executor, "SELECT ...", &[])
        .unwrap()
        .unwrap();

    // Then: The relation stays unset
    assert_eq!(article.id, 2);
    assert!(article.author.is_none());
}

#[test]
fn test_absent_join_column_leaves_relation_unset() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&["id", "title", "author_nick"]).row(vec![
            Value::Int(3),
            Value::from("No join"),
            Value::from("jb"),
        ]),
    );

    let article: Article = parse_one(&registry, &executor, "SELECT ...", &[])
        .unwrap()
        .unwrap();

    assert!(article.author.is_none());
    assert_eq!(article.content, None);
}

#[test]
fn test_relation_prefix_is_used_for_nested_entities() {
    // Given: A comment row joined with its article (prefix "article") and the
    // article's author (prefix "author"); the article's join column is read
    // without the "article" prefix
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&[
            "id",
            "content",
            "article_id",
            "article_title",
            "article_created",
            "author_id",
            "author_firstname",
        ])
        .row(vec![
            Value::Int(10),
            Value::from("Bravo"),
            Value::Int(1),
            Value::from("Les Misérables"),
            Value::from("2024-05-01 12:00:00"),
            Value::Int(7),
            Value::from("Jean"),
        ]),
    );

    // When
    let comment: Comment = parse_one(&registry, &executor, "SELECT ...", &[])
        .unwrap()
        .unwrap();

    // Then
    assert_eq!(comment.id, 10);
    let article = comment.article.expect("article hydrated");
    assert_eq!(article.id, 1);
    assert_eq!(article.title, "Les Misérables");
    assert_eq!(article.created, Some(noon(2024, 5, 1)));
    let author = article.author.expect("author hydrated");
    assert_eq!(author.id, 7);
    assert_eq!(author.first_name, "Jean");
}

#[test]
fn test_parse_many_keeps_result_order() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&["id", "firstname", "lastname"])
            .row(vec![Value::Int(3), Value::from("Victor"), Value::from("Hugo")])
            .row(vec![Value::Int(1), Value::from("Émile"), Value::from("Zola")])
            .row(vec![Value::Int(2), Value::from("Jean"), Value::Null]),
    );

    let authors: Vec<Author> = parse_many(&registry, &executor, "SELECT ...", &[]).unwrap();

    let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(authors[2].last_name, "");
    assert_eq!(executor.open_cursors(), 0);
}

#[test]
fn test_empty_result() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(MemoryResult::new(&["id"]));

    let found: Option<Author> = parse_one(&registry, &executor, "SELECT ...", &[]).unwrap();
    let many: Vec<Author> = parse_many(&registry, &executor, "SELECT ...", &[]).unwrap();

    assert!(found.is_none());
    assert!(many.is_empty());
}

#[test]
fn test_driver_integer_width_is_converted() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&["id", "firstname"]).row(vec![Value::BigInt(42), Value::from("Jean")]),
    );

    let author: Author = parse_one(&registry, &executor, "SELECT ...", &[])
        .unwrap()
        .unwrap();
    assert_eq!(author.id, 42);
}

#[test]
fn test_unknown_table_is_rejected() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();

    let err = parse_one_table(&registry, &executor, "ghosts", "SELECT 1", &[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownTable);
    assert!(executor.statements().is_empty());
}

#[test]
fn test_parse_by_table_name() {
    // Given: Author registered through a typed call
    let registry = Registry::new();
    registry.ensure_registered::<Author>().unwrap();
    let executor = MemoryExecutor::new();
    executor.push_result(MemoryResult::new(&["id"]).row(vec![Value::Int(5)]));

    // When: A row is parsed by table name
    let entity = parse_one_table(&registry, &executor, "authors", "SELECT id FROM authors", &[])
        .unwrap()
        .unwrap();

    // Then: The concrete type comes back
    let author = entity.downcast::<Author>().unwrap();
    assert_eq!(author.id, 5);
}

#[test]
fn test_binding_failure_releases_cursor() {
    // Given: A row with text where an integer key is expected
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.push_result(MemoryResult::new(&["id"]).row(vec![Value::from("not a number")]));

    // When
    let err = parse_one::<Author>(&registry, &executor, "SELECT ...", &[]).unwrap_err();

    // Then: The error names the property and the cursor was closed
    assert_eq!(err.kind(), ErrorKind::Binding);
    assert!(err.to_string().contains("Author.id"));
    assert_eq!(executor.open_cursors(), 0);
}

#[test]
fn test_driver_failure_passes_through() {
    let registry = Registry::new();
    let executor = MemoryExecutor::new();
    executor.fail_next("relation \"authors\" does not exist");

    let err = parse_many::<Author>(&registry, &executor, "SELECT ...", &[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(err.to_string(), "relation \"authors\" does not exist");
}

#[test]
fn test_hydrate_with_prefix() {
    // Given: A cursor positioned on a row with prefixed author columns
    let registry = Registry::new();
    registry.ensure_registered::<Author>().unwrap();
    let executor = MemoryExecutor::new();
    executor.push_result(
        MemoryResult::new(&["w_id", "w_nick", "id"]).row(vec![
            Value::Int(9),
            Value::from("hugo"),
            Value::Int(1),
        ]),
    );

    // When: The author is hydrated under the "w" prefix
    let mut hydrated = None;
    executor
        .query("SELECT ...", &[], &mut |cursor| {
            cursor.advance()?;
            let columns = ColumnSet::from_cursor(&*cursor);
            hydrated = Some(hydrate(&registry, "authors", &*cursor, &columns, Some("w"))?);
            Ok(())
        })
        .unwrap();

    // Then: Only prefixed columns are read
    let author = hydrated.unwrap().downcast::<Author>().unwrap();
    assert_eq!(author.id, 9);
    assert_eq!(author.nick.as_deref(), Some("hugo"));
}
