//! INSERT / UPDATE / DELETE generation
//!
//! Entity forms read current values through the descriptor's accessors and
//! inline them as literals. Explicit forms take ordered `(column, value)`
//! pairs and never touch an entity. Clause builders join WHERE pairs with
//! ` AND ` and SET pairs with `, `; an empty input gives an empty clause.

use super::literal::inline_value;
use crate::descriptor::{EntityDescriptor, RelationDescriptor};
use crate::errors::{binding, Result};
use crate::registry::Registry;
use crate::value::Value;
use std::any::Any;

/// Which descriptor members contribute `(column, value)` pairs
#[derive(Debug, Clone, Copy)]
struct Members {
    keys: bool,
    fields: bool,
    relations: bool,
}

fn assignments<K: AsRef<str>>(pairs: &[(K, Value)], separator: &str) -> Result<String> {
    let parts = pairs
        .iter()
        .map(|(column, value)| -> Result<String> {
            Ok(format!("{} = {}", column.as_ref(), inline_value(value)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(separator))
}

/// `a = 1 AND b = 'x'`
pub fn where_clause<K: AsRef<str>>(pairs: &[(K, Value)]) -> Result<String> {
    assignments(pairs, " AND ")
}

/// `a = 1, b = 'x'`
pub fn set_clause<K: AsRef<str>>(pairs: &[(K, Value)]) -> Result<String> {
    assignments(pairs, ", ")
}

/// Foreign-key value of a one-to-one relation
///
/// The related entity's value for the property mapped to the relation's
/// related column; `Null` when the relation is unset.
pub fn relation_value(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    relation: &RelationDescriptor,
    entity: &dyn Any,
) -> Result<Value> {
    let Some(accessor) = descriptor.relation_accessor(&relation.property) else {
        return Ok(Value::Null);
    };
    let Some(related) = accessor.get(entity)? else {
        return Ok(Value::Null);
    };

    let related_descriptor = registry.descriptor(&relation.related_table)?;
    let property = related_descriptor
        .key_by_column(&relation.related_column)
        .map(|k| k.property.as_str())
        .or_else(|| {
            related_descriptor
                .field_by_column(&relation.related_column)
                .map(|f| f.property.as_str())
        })
        .ok_or_else(|| {
            binding(
                format!("{}.{}", relation.related_table, relation.related_column),
                "join column is not mapped on the related type",
            )
        })?;
    related_descriptor.get_value(related, property)
}

fn entity_values(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    entity: &dyn Any,
    members: Members,
) -> Result<Vec<(String, Value)>> {
    let mut values = Vec::new();
    if members.keys {
        for key in descriptor.keys() {
            values.push((key.column.clone(), descriptor.get_value(entity, &key.property)?));
        }
    }
    if members.fields {
        for field in descriptor.fields() {
            values.push((field.column.clone(), descriptor.get_value(entity, &field.property)?));
        }
    }
    if members.relations {
        for relation in descriptor.relations_to_one() {
            values.push((
                relation.local_column.clone(),
                relation_value(registry, descriptor, relation, entity)?,
            ));
        }
    }
    Ok(values)
}

/// INSERT for `entity`
///
/// Covers keys, fields and one-to-one foreign keys whose value is not null.
/// The seeded key is left out; the database generates it.
pub fn insert_statement(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    entity: &dyn Any,
) -> Result<String> {
    let seeded = descriptor.seeded_key().map(|k| k.column.as_str());
    let all = Members {
        keys: true,
        fields: true,
        relations: true,
    };

    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (column, value) in entity_values(registry, descriptor, entity, all)? {
        if value.is_null() || Some(column.as_str()) == seeded {
            continue;
        }
        values.push(inline_value(&value)?);
        columns.push(column);
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES({})",
        descriptor.table(),
        columns.join(", "),
        values.join(", ")
    ))
}

/// UPDATE of every field and one-to-one foreign key, matched on the keys
pub fn update_statement(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    entity: &dyn Any,
) -> Result<String> {
    let set = entity_values(
        registry,
        descriptor,
        entity,
        Members {
            keys: false,
            fields: true,
            relations: true,
        },
    )?;
    let keys = key_values(registry, descriptor, entity)?;
    update_where_statement(descriptor.table(), &set, &keys)
}

/// UPDATE from explicit pairs
pub fn update_where_statement<S: AsRef<str>, W: AsRef<str>>(
    table: &str,
    set: &[(S, Value)],
    filter: &[(W, Value)],
) -> Result<String> {
    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        set_clause(set)?,
        where_clause(filter)?
    ))
}

/// DELETE matched on the keys of `entity`
pub fn delete_statement(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    entity: &dyn Any,
) -> Result<String> {
    let keys = key_values(registry, descriptor, entity)?;
    delete_where_statement(descriptor.table(), &keys)
}

/// DELETE from explicit pairs
pub fn delete_where_statement<W: AsRef<str>>(
    table: &str,
    filter: &[(W, Value)],
) -> Result<String> {
    Ok(format!("DELETE FROM {} WHERE {}", table, where_clause(filter)?))
}

fn key_values(
    registry: &Registry,
    descriptor: &EntityDescriptor,
    entity: &dyn Any,
) -> Result<Vec<(String, Value)>> {
    entity_values(
        registry,
        descriptor,
        entity,
        Members {
            keys: true,
            fields: false,
            relations: false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_joins_with_and() {
        let pairs = [("id", Value::Int(4)), ("nick", Value::from("jb"))];
        assert_eq!(where_clause(&pairs).unwrap(), "id = 4 AND nick = 'jb'");
    }

    #[test]
    fn test_set_clause_joins_with_comma() {
        let pairs = [("title", Value::from("a")), ("views", Value::Int(2))];
        assert_eq!(set_clause(&pairs).unwrap(), "title = 'a', views = 2");
    }

    #[test]
    fn test_empty_clauses() {
        let none: [(&str, Value); 0] = [];
        assert_eq!(where_clause(&none).unwrap(), "");
        assert_eq!(set_clause(&none).unwrap(), "");
    }

    #[test]
    fn test_explicit_statements() {
        let set = [("content", Value::Null)];
        let filter = [("author_id", Value::Int(3))];

        assert_eq!(
            update_where_statement("articles", &set, &filter).unwrap(),
            "UPDATE articles SET content = NULL WHERE author_id = 3"
        );
        assert_eq!(
            delete_where_statement("articles", &filter).unwrap(),
            "DELETE FROM articles WHERE author_id = 3"
        );
    }
}
