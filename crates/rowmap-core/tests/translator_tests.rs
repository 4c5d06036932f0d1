#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{noon, Article, Author, Product};
use rowmap_core::config::{ComparisonMapping, EngineConfig};
use rowmap_core::errors::{ErrorKind, MapError};
use rowmap_core::predicate::{
    captured, constant, prop, prop_path, Captured, CapturedObject, GetterCache, Inspect,
    Predicate, Translator,
};
use rowmap_core::registry::Registry;
use rowmap_core::value::Value;
use std::sync::Arc;
use std::thread;

fn translate<E: rowmap_core::Entity>(predicate: Predicate<E>) -> Result<String, MapError> {
    let registry = Registry::new();
    Translator::default().translate(&registry, &predicate)
}

#[test]
fn test_equality_on_mapped_property() {
    // Given: first_name maps to column firstname
    let predicate = Predicate::<Author>::new(prop("first_name").eq("Jean"));

    // When
    let sql = translate(predicate).unwrap();

    // Then
    assert_eq!(sql, "firstname = 'Jean'");
}

#[test]
fn test_comparison_operators() {
    let cases = vec![
        (prop("price").ne(10), "price <> 10"),
        (prop("price").gt(10), "price > 10"),
        (prop("price").gte(10), "price >= 10"),
        (prop("price").lt(10), "price < 10"),
        (prop("stock").eq(3i64), "stock = 3"),
        (prop("active").eq(true), "active = true"),
        (prop("price").lt(9.99), "price < 9.99"),
    ];

    for (expr, expected) in cases {
        assert_eq!(translate(Predicate::<Product>::new(expr)).unwrap(), expected);
    }
}

#[test]
fn test_less_or_equal_legacy_mapping() {
    // Given: The default configuration
    let predicate = Predicate::<Product>::new(prop("price").lte(10));

    // When
    let sql = translate(predicate).unwrap();

    // Then: `<=` keeps rendering as `>=`
    assert_eq!(sql, "price >= 10");
}

#[test]
fn test_less_or_equal_corrected_mapping() {
    // Given: The corrected comparison mapping
    let config = EngineConfig {
        comparison_mapping: ComparisonMapping::Corrected,
    };
    let registry = Registry::new();
    let predicate = Predicate::<Product>::new(prop("price").lte(10));

    // When
    let sql = Translator::new(&config).translate(&registry, &predicate).unwrap();

    // Then
    assert_eq!(sql, "price <= 10");
}

#[test]
fn test_logical_operands_are_parenthesized() {
    let predicate = Predicate::<Author>::new(
        prop("first_name")
            .eq("Jean")
            .and(prop("id").gt(2).or(prop("nick").ne(Value::Null))),
    );

    let sql = translate(predicate).unwrap();

    assert_eq!(sql, "(firstname = 'Jean') AND ((id > 2) OR (nick <> NULL))");
}

#[test]
fn test_constants_use_literal_rules() {
    let predicate = Predicate::<Author>::new(prop("last_name").eq("O'Brien"));
    assert_eq!(translate(predicate).unwrap(), "lastname = 'O''Brien'");

    let predicate = Predicate::<Article>::new(prop("created").gt(noon(2024, 1, 31)));
    assert_eq!(translate(predicate).unwrap(), "created > 2024-01-31 12:00:00");

    let predicate = Predicate::<Article>::new(constant(1).eq(prop("id")));
    assert_eq!(translate(predicate).unwrap(), "1 = id");
}

#[test]
fn test_captured_chain_is_inlined() {
    // Given: A filter object captured by the predicate
    let filter = CapturedObject::new().with(
        "author",
        CapturedObject::new().with("nick", Value::from("24601")),
    );
    let predicate =
        Predicate::<Author>::new(prop("nick").eq(captured("filter", filter, &["author", "nick"])));

    // When
    let sql = translate(predicate).unwrap();

    // Then: The chain is evaluated and inlined as a literal
    assert_eq!(sql, "nick = '24601'");
}

#[test]
fn test_captured_plain_value() {
    let predicate =
        Predicate::<Author>::new(prop("id").eq(captured("min_id", Captured::value(4), &[])));
    assert_eq!(translate(predicate).unwrap(), "id = 4");
}

struct Filter {
    title: String,
}

impl Inspect for Filter {
    fn member(&self, name: &str) -> Option<Captured> {
        match name {
            "title" => Some(Captured::value(self.title.as_str())),
            _ => None,
        }
    }
}

#[test]
fn test_chain_getter_is_compiled_once_per_textual_form() {
    // Given: A translator with its own getter cache
    let cache = Arc::new(GetterCache::new());
    let translator = Translator::default().with_cache(Arc::clone(&cache));
    let registry = Registry::new();

    // When: The same chain is translated with two different captured roots
    let first = Predicate::<Article>::new(prop("title").eq(captured(
        "filter",
        Captured::object(Filter {
            title: "Rust".to_string(),
        }),
        &["title"],
    )));
    let second = Predicate::<Article>::new(prop("title").eq(captured(
        "filter",
        Captured::object(Filter {
            title: "Go".to_string(),
        }),
        &["title"],
    )));
    let sql_first = translator.translate(&registry, &first).unwrap();
    let sql_second = translator.translate(&registry, &second).unwrap();

    // Then: One getter was compiled and each root was evaluated
    assert_eq!(sql_first, "title = 'Rust'");
    assert_eq!(sql_second, "title = 'Go'");
    assert_eq!(cache.compiled(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_shared_chain_translates_concurrently() {
    // Given: One translator, cache and registry shared by several threads
    let cache = Arc::new(GetterCache::new());
    let translator = Translator::default().with_cache(Arc::clone(&cache));
    let registry = Registry::new();

    // When: They all translate the same captured chain at once
    let fragments: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let predicate = Predicate::<Article>::new(prop("title").eq(captured(
                        "filter",
                        Captured::object(Filter {
                            title: "Rust".to_string(),
                        }),
                        &["title"],
                    )));
                    translator.translate(&registry, &predicate).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Then: Every thread rendered the same fragment
    assert_eq!(fragments.len(), 8);
    assert!(fragments.iter().all(|sql| sql == "title = 'Rust'"));

    // And: The cache holds a single getter for the chain
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.compiled(), 1);
}

#[test]
fn test_method_call_is_unsupported() {
    // Given: A predicate calling a method
    let predicate = Predicate::<Article>::new(
        prop("title").call("contains", vec![constant("rust")]),
    );

    // When
    let err = translate(predicate).unwrap_err();

    // Then: The error names the node kind
    assert_eq!(err.kind(), ErrorKind::Translation);
    match err {
        MapError::Translation { operator, .. } => assert_eq!(operator, "Call"),
        other => panic!("expected translation error, got {other:?}"),
    }
}

#[test]
fn test_unsupported_node_inside_valid_tree_yields_no_sql() {
    let predicate = Predicate::<Product>::new(
        prop("label")
            .eq("pen")
            .and(prop("price").plus(1).gt(3)),
    );

    let err = translate(predicate).unwrap_err();

    assert!(err.to_string().contains("unsupported operation (Add)"));
}

#[test]
fn test_negation_is_unsupported() {
    let predicate = Predicate::<Product>::new(prop("active").eq(true).negate());

    let err = translate(predicate).unwrap_err();

    assert!(err.to_string().contains("(Not)"));
}

#[test]
fn test_nested_parameter_access_is_rejected() {
    // Given: e.author.nick, reaching through a relation
    let predicate = Predicate::<Article>::new(prop_path(&["author", "nick"]).eq("jb"));

    // When
    let err = translate(predicate).unwrap_err();

    // Then
    assert_eq!(err.kind(), ErrorKind::Translation);
    assert!(err.to_string().contains("e.author.nick"));
}

#[test]
fn test_unmapped_property_is_rejected() {
    let predicate = Predicate::<Author>::new(prop("age").gt(18));

    let err = translate(predicate).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Translation);
    assert!(err.to_string().contains("property age is not mapped on authors"));
}

#[test]
fn test_missing_captured_member_is_a_translation_error() {
    let predicate = Predicate::<Article>::new(prop("title").eq(captured(
        "filter",
        Captured::object(Filter {
            title: "Rust".to_string(),
        }),
        &["subtitle"],
    )));

    let err = translate(predicate).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Translation);
}
