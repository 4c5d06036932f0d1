//! Entity descriptors
//!
//! The metadata built once per mapped type: table, keys, fields, relations,
//! indexes by column and by property name, a factory and the compiled
//! accessors. A descriptor is immutable once built and shared through the
//! registry as an `Arc`.

use crate::accessor::{Factory, PropertyAccessor, RelationAccessor};
use crate::errors::{binding, registration, Result};
use crate::mapping::MappingParts;
use crate::value::{Value, ValueKind};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// Which side of the join declared the relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    Child,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    pub column: String,
    pub property: String,
    pub kind: ValueKind,
    /// Value generated by the database
    pub auto_increment: bool,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub column: String,
    pub property: String,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationDescriptor {
    pub property: String,
    pub cardinality: Cardinality,
    pub direction: RelationDirection,
    pub related_table: String,
    /// Join column on this entity's table
    pub local_column: String,
    /// Join column on the related table
    pub related_column: String,
    /// Column prefix of the related entity in a joined row
    pub prefix: Option<String>,
}

/// Metadata of one mapped type
pub struct EntityDescriptor {
    table: String,
    type_name: &'static str,
    type_id: TypeId,
    keys: Vec<KeyDescriptor>,
    fields: Vec<FieldDescriptor>,
    relations_to_one: Vec<RelationDescriptor>,
    relations_to_many: Vec<RelationDescriptor>,
    keys_by_column: HashMap<String, usize>,
    keys_by_property: HashMap<String, usize>,
    fields_by_column: HashMap<String, usize>,
    fields_by_property: HashMap<String, usize>,
    relations_by_column: HashMap<String, (Cardinality, usize)>,
    relations_by_property: HashMap<String, (Cardinality, usize)>,
    column_by_property: HashMap<String, String>,
    seeded_key: Option<usize>,
    factory: Factory,
    accessors: HashMap<String, PropertyAccessor>,
    relation_accessors: HashMap<String, RelationAccessor>,
}

impl EntityDescriptor {
    /// Validate the tags of a type and build its descriptor
    pub(crate) fn build(parts: MappingParts) -> Result<Self> {
        let entity = parts.type_name;

        let table = match parts.tables.as_slice() {
            [table] => table.clone(),
            [] => {
                return Err(registration(
                    entity,
                    "no table tag found to match table",
                ))
            }
            _ => {
                return Err(registration(
                    entity,
                    format!("{} table tags found, exactly one is allowed", parts.tables.len()),
                ))
            }
        };

        let mut descriptor = Self {
            table,
            type_name: entity,
            type_id: parts.type_id,
            keys: Vec::new(),
            fields: Vec::new(),
            relations_to_one: Vec::new(),
            relations_to_many: Vec::new(),
            keys_by_column: HashMap::new(),
            keys_by_property: HashMap::new(),
            fields_by_column: HashMap::new(),
            fields_by_property: HashMap::new(),
            relations_by_column: HashMap::new(),
            relations_by_property: HashMap::new(),
            column_by_property: HashMap::new(),
            seeded_key: None,
            factory: parts.factory,
            accessors: HashMap::new(),
            relation_accessors: HashMap::new(),
        };

        for entry in parts.keys {
            let key = entry.descriptor;
            if descriptor.keys_by_column.contains_key(&key.column) {
                return Err(registration(
                    entity,
                    format!("duplicate primary key detected ({})", key.column),
                ));
            }
            descriptor.claim_property(&key.property, &key.column)?;

            let index = descriptor.keys.len();
            if key.auto_increment {
                if descriptor.seeded_key.is_some() {
                    return Err(registration(
                        entity,
                        "only one seeded column is authorized",
                    ));
                }
                descriptor.seeded_key = Some(index);
            }

            descriptor.keys_by_column.insert(key.column.clone(), index);
            descriptor.keys_by_property.insert(key.property.clone(), index);
            descriptor.accessors.insert(key.property.clone(), entry.accessor);
            descriptor.keys.push(key);
        }

        for entry in parts.fields {
            let field = entry.descriptor;
            if descriptor.fields_by_column.contains_key(&field.column) {
                return Err(registration(
                    entity,
                    format!("duplicate field name detected ({})", field.column),
                ));
            }
            descriptor.claim_property(&field.property, &field.column)?;

            let index = descriptor.fields.len();
            descriptor.fields_by_column.insert(field.column.clone(), index);
            descriptor.fields_by_property.insert(field.property.clone(), index);
            descriptor.accessors.insert(field.property.clone(), entry.accessor);
            descriptor.fields.push(field);
        }

        for entry in parts.relations {
            let relation = entry.descriptor;
            if descriptor.relations_by_column.contains_key(&relation.local_column) {
                return Err(registration(
                    entity,
                    format!("duplicate relation column detected ({})", relation.local_column),
                ));
            }
            descriptor.claim_property(&relation.property, &relation.local_column)?;

            let slot = match relation.cardinality {
                Cardinality::One => {
                    if let Some(accessor) = entry.accessor {
                        descriptor
                            .relation_accessors
                            .insert(relation.property.clone(), accessor);
                    }
                    descriptor.relations_to_one.push(relation.clone());
                    (Cardinality::One, descriptor.relations_to_one.len() - 1)
                }
                Cardinality::Many => {
                    descriptor.relations_to_many.push(relation.clone());
                    (Cardinality::Many, descriptor.relations_to_many.len() - 1)
                }
            };
            descriptor
                .relations_by_column
                .insert(relation.local_column.clone(), slot);
            descriptor
                .relations_by_property
                .insert(relation.property.clone(), slot);
        }

        Ok(descriptor)
    }

    fn claim_property(&mut self, property: &str, column: &str) -> Result<()> {
        if self.column_by_property.contains_key(property) {
            return Err(registration(
                self.type_name,
                format!("property {} is mapped more than once", property),
            ));
        }
        self.column_by_property
            .insert(property.to_string(), column.to_string());
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rust type name of the mapped entity
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn keys(&self) -> &[KeyDescriptor] {
        &self.keys
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn relations_to_one(&self) -> &[RelationDescriptor] {
        &self.relations_to_one
    }

    pub fn relations_to_many(&self) -> &[RelationDescriptor] {
        &self.relations_to_many
    }

    pub fn key_by_column(&self, column: &str) -> Option<&KeyDescriptor> {
        self.keys_by_column.get(column).map(|&i| &self.keys[i])
    }

    pub fn key_by_property(&self, property: &str) -> Option<&KeyDescriptor> {
        self.keys_by_property.get(property).map(|&i| &self.keys[i])
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields_by_column.get(column).map(|&i| &self.fields[i])
    }

    pub fn field_by_property(&self, property: &str) -> Option<&FieldDescriptor> {
        self.fields_by_property.get(property).map(|&i| &self.fields[i])
    }

    /// Relation of either cardinality by its local join column
    pub fn relation_by_column(&self, column: &str) -> Option<&RelationDescriptor> {
        self.relations_by_column
            .get(column)
            .map(|&slot| self.relation_at(slot))
    }

    pub fn relation_by_property(&self, property: &str) -> Option<&RelationDescriptor> {
        self.relations_by_property
            .get(property)
            .map(|&slot| self.relation_at(slot))
    }

    fn relation_at(&self, (cardinality, index): (Cardinality, usize)) -> &RelationDescriptor {
        match cardinality {
            Cardinality::One => &self.relations_to_one[index],
            Cardinality::Many => &self.relations_to_many[index],
        }
    }

    /// Column of any mapped property; relations resolve to their local join column
    pub fn column_for_property(&self, property: &str) -> Option<&str> {
        self.column_by_property.get(property).map(String::as_str)
    }

    /// The auto-increment key, if any
    pub fn seeded_key(&self) -> Option<&KeyDescriptor> {
        self.seeded_key.map(|i| &self.keys[i])
    }

    pub fn has_seeded_key(&self) -> bool {
        self.seeded_key.is_some()
    }

    /// Every selectable column: keys, fields, then one-to-one join columns
    pub fn columns(&self) -> Vec<&str> {
        self.keys
            .iter()
            .map(|k| k.column.as_str())
            .chain(self.fields.iter().map(|f| f.column.as_str()))
            .chain(self.relations_to_one.iter().map(|r| r.local_column.as_str()))
            .collect()
    }

    /// New default instance of the mapped type
    pub fn instantiate(&self) -> Box<dyn Any + Send> {
        (self.factory)()
    }

    pub fn accessor(&self, property: &str) -> Option<&PropertyAccessor> {
        self.accessors.get(property)
    }

    pub fn relation_accessor(&self, property: &str) -> Option<&RelationAccessor> {
        self.relation_accessors.get(property)
    }

    /// Read a key or field property through its compiled getter
    pub fn get_value(&self, entity: &dyn Any, property: &str) -> Result<Value> {
        self.accessor(property)
            .ok_or_else(|| self.unmapped(property))?
            .get(entity)
    }

    /// Write a key or field property through its compiled setter
    pub fn set_value(&self, entity: &mut dyn Any, property: &str, value: Value) -> Result<()> {
        self.accessor(property)
            .ok_or_else(|| self.unmapped(property))?
            .set(entity, value)
    }

    fn unmapped(&self, property: &str) -> crate::errors::MapError {
        binding(
            format!("{}.{}", self.type_name, property),
            "property has no compiled accessor",
        )
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("table", &self.table)
            .field("type_name", &self.type_name)
            .field("keys", &self.keys)
            .field("fields", &self.fields)
            .field("relations_to_one", &self.relations_to_one)
            .field("relations_to_many", &self.relations_to_many)
            .finish_non_exhaustive()
    }
}
