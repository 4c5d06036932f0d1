//! Row hydration
//!
//! Builds entities from the current row of a cursor. Keys and fields are
//! read from `prefix_column` when a prefix is active; a one-to-one relation
//! is followed when its join column is present and not null, hydrating the
//! related entity from the same row under the relation's own prefix.

use crate::cursor::{ColumnSet, Param, RowCursor, StatementExecutor};
use crate::errors::{internal, Result};
use crate::mapping::Entity;
use crate::registry::Registry;
use std::any::{type_name, Any};

/// Column name as it appears in a joined row
pub fn prefixed_column(prefix: Option<&str>, column: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}_{}", prefix, column),
        _ => column.to_string(),
    }
}

/// Hydrate an instance of `table`'s type from the cursor's current row
///
/// Properties whose column is absent from `columns`, or null, keep their
/// default value.
pub fn hydrate(
    registry: &Registry,
    table: &str,
    cursor: &dyn RowCursor,
    columns: &ColumnSet,
    prefix: Option<&str>,
) -> Result<Box<dyn Any + Send>> {
    let mut path = Vec::new();
    hydrate_at(registry, table, cursor, columns, prefix, &mut path)
}

// `path` holds the (table, prefix) pairs being hydrated above this call;
// a relation leading back onto one of them is not followed again.
fn hydrate_at(
    registry: &Registry,
    table: &str,
    cursor: &dyn RowCursor,
    columns: &ColumnSet,
    prefix: Option<&str>,
    path: &mut Vec<(String, Option<String>)>,
) -> Result<Box<dyn Any + Send>> {
    let descriptor = registry.descriptor(table)?;
    let mut entity = descriptor.instantiate();

    let properties = descriptor
        .keys()
        .iter()
        .map(|k| (k.column.as_str(), k.property.as_str()))
        .chain(
            descriptor
                .fields()
                .iter()
                .map(|f| (f.column.as_str(), f.property.as_str())),
        );

    for (column, property) in properties {
        let column = prefixed_column(prefix, column);
        if !columns.contains(&column) || cursor.is_null(&column)? {
            continue;
        }
        let value = cursor.value(&column)?;
        descriptor.set_value(&mut *entity, property, value)?;
    }

    path.push((table.to_string(), prefix.map(str::to_string)));
    for relation in descriptor.relations_to_one() {
        // The join column is looked up without the active prefix
        if !columns.contains(&relation.local_column) || cursor.is_null(&relation.local_column)? {
            continue;
        }
        let revisits = path.iter().any(|(t, p)| {
            t == &relation.related_table && p.as_deref() == relation.prefix.as_deref()
        });
        if revisits {
            continue;
        }
        let Some(accessor) = descriptor.relation_accessor(&relation.property) else {
            continue;
        };

        let related = hydrate_at(
            registry,
            &relation.related_table,
            cursor,
            columns,
            relation.prefix.as_deref(),
            path,
        )?;
        accessor.set(&mut *entity, related)?;
    }
    path.pop();

    Ok(entity)
}

/// Recover the concrete entity from a hydrated box
pub fn downcast_entity<E: Entity>(entity: Box<dyn Any + Send>) -> Result<E> {
    entity
        .downcast::<E>()
        .map(|e| *e)
        .map_err(|_| internal(format!("hydrated entity is not a {}", type_name::<E>())))
}

/// Run `sql` and hydrate the first row as an instance of `table`'s type
///
/// Returns `Ok(None)` for an empty result.
pub fn parse_one_table(
    registry: &Registry,
    executor: &dyn StatementExecutor,
    table: &str,
    sql: &str,
    params: &[Param<'_>],
) -> Result<Option<Box<dyn Any + Send>>> {
    registry.descriptor(table)?;

    let mut found = None;
    executor.query(sql, params, &mut |cursor| {
        if cursor.advance()? {
            let columns = ColumnSet::from_cursor(&*cursor);
            found = Some(hydrate(registry, table, &*cursor, &columns, None)?);
        }
        Ok(())
    })?;
    Ok(found)
}

/// Run `sql` and hydrate every row, in result order
pub fn parse_many_table(
    registry: &Registry,
    executor: &dyn StatementExecutor,
    table: &str,
    sql: &str,
    params: &[Param<'_>],
) -> Result<Vec<Box<dyn Any + Send>>> {
    registry.descriptor(table)?;

    let mut entities = Vec::new();
    executor.query(sql, params, &mut |cursor| {
        let columns = ColumnSet::from_cursor(&*cursor);
        while cursor.advance()? {
            entities.push(hydrate(registry, table, &*cursor, &columns, None)?);
        }
        Ok(())
    })?;
    Ok(entities)
}

/// Typed form of [`parse_one_table`]; registers `E` on first use
pub fn parse_one<E: Entity>(
    registry: &Registry,
    executor: &dyn StatementExecutor,
    sql: &str,
    params: &[Param<'_>],
) -> Result<Option<E>> {
    let descriptor = registry.ensure_registered::<E>()?;
    parse_one_table(registry, executor, descriptor.table(), sql, params)?
        .map(downcast_entity::<E>)
        .transpose()
}

/// Typed form of [`parse_many_table`]; registers `E` on first use
pub fn parse_many<E: Entity>(
    registry: &Registry,
    executor: &dyn StatementExecutor,
    sql: &str,
    params: &[Param<'_>],
) -> Result<Vec<E>> {
    let descriptor = registry.ensure_registered::<E>()?;
    parse_many_table(registry, executor, descriptor.table(), sql, params)?
        .into_iter()
        .map(downcast_entity::<E>)
        .collect()
}
