//! Declarative mapping tags
//!
//! A mapped type implements [`Entity`] and returns a [`Mapping`] describing
//! its table, keys, fields and relations. The mapping is only read by the
//! registry, once per type, when the type is first used.
//!
//! ```
//! use rowmap_core::mapping::{Entity, KeyTag, Mapping, RelationTag};
//!
//! #[derive(Debug, Default)]
//! struct Author {
//!     id: i32,
//!     nick: Option<String>,
//! }
//!
//! impl Entity for Author {
//!     fn mapping() -> Mapping<Self> {
//!         Mapping::<Self>::new()
//!             .table("authors")
//!             .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
//!             .field("nick", "nick", |a| a.nick.clone(), |a, v| a.nick = v)
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Article {
//!     id: i32,
//!     author: Option<Author>,
//! }
//!
//! impl Entity for Article {
//!     fn mapping() -> Mapping<Self> {
//!         Mapping::<Self>::new()
//!             .table("articles")
//!             .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
//!             .has_one::<Author>(
//!                 "author",
//!                 RelationTag::child("authors", "author_id").related_column("id").prefix("author"),
//!                 |a| a.author.as_ref(),
//!                 |a, v| a.author = Some(v),
//!             )
//!     }
//! }
//! ```

use crate::accessor::{
    compile_factory, compile_relation, compile_value, Factory, PropertyAccessor, RelationAccessor,
};
use crate::descriptor::{
    Cardinality, FieldDescriptor, KeyDescriptor, RelationDescriptor, RelationDirection,
};
use crate::errors::Result;
use crate::registry::{register_related, BuildContext, Registry};
use crate::value::FieldValue;
use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;

/// A Rust type mapped onto a table
pub trait Entity: Any + Default + Send + Sized {
    /// Declarative tags of the type
    fn mapping() -> Mapping<Self>;
}

/// Key tag options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTag {
    auto_increment: bool,
    sequence: Option<String>,
}

impl KeyTag {
    /// Key generated by the database (the seeded key)
    pub fn auto_increment() -> Self {
        Self {
            auto_increment: true,
            sequence: None,
        }
    }

    /// Key supplied by the caller
    pub fn assigned() -> Self {
        Self {
            auto_increment: false,
            sequence: None,
        }
    }

    /// Explicit sequence to read the generated value from
    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }
}

/// Relation tag options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTag {
    direction: RelationDirection,
    related_table: String,
    local_column: String,
    related_column: Option<String>,
    prefix: Option<String>,
}

impl RelationTag {
    /// Relation towards a table this row points at through `local_column`
    pub fn child(related_table: impl Into<String>, local_column: impl Into<String>) -> Self {
        Self::with_direction(RelationDirection::Child, related_table, local_column)
    }

    /// Relation towards the owning table of this row
    pub fn parent(related_table: impl Into<String>, local_column: impl Into<String>) -> Self {
        Self::with_direction(RelationDirection::Parent, related_table, local_column)
    }

    fn with_direction(
        direction: RelationDirection,
        related_table: impl Into<String>,
        local_column: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            related_table: related_table.into(),
            local_column: local_column.into(),
            related_column: None,
            prefix: None,
        }
    }

    /// Join column on the related table; defaults to the local column
    pub fn related_column(mut self, column: impl Into<String>) -> Self {
        self.related_column = Some(column.into());
        self
    }

    /// Column prefix of the related entity inside a joined row
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    fn into_descriptor(self, property: &str, cardinality: Cardinality) -> RelationDescriptor {
        let related_column = self
            .related_column
            .unwrap_or_else(|| self.local_column.clone());
        RelationDescriptor {
            property: property.to_string(),
            cardinality,
            direction: self.direction,
            related_table: self.related_table,
            local_column: self.local_column,
            related_column,
            prefix: self.prefix,
        }
    }
}

pub(crate) type RegisterFn = fn(&Registry, &mut BuildContext) -> Result<String>;

pub(crate) struct KeyTagEntry {
    pub descriptor: KeyDescriptor,
    pub accessor: PropertyAccessor,
}

pub(crate) struct FieldTagEntry {
    pub descriptor: FieldDescriptor,
    pub accessor: PropertyAccessor,
}

pub(crate) struct RelationTagEntry {
    pub descriptor: RelationDescriptor,
    pub accessor: Option<RelationAccessor>,
    pub register: RegisterFn,
}

/// Type-erased tags handed to the descriptor builder
pub(crate) struct MappingParts {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub tables: Vec<String>,
    pub keys: Vec<KeyTagEntry>,
    pub fields: Vec<FieldTagEntry>,
    pub relations: Vec<RelationTagEntry>,
    pub factory: Factory,
}

/// Declarative tag set of an entity type, in declaration order
pub struct Mapping<E> {
    tables: Vec<String>,
    keys: Vec<KeyTagEntry>,
    fields: Vec<FieldTagEntry>,
    relations: Vec<RelationTagEntry>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for Mapping<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Mapping<E> {
    /// Empty tag set; declarations name the type (`Mapping::<Self>::new()`)
    /// so the accessor closures below it can be checked against `E`
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            keys: Vec::new(),
            fields: Vec::new(),
            relations: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Table tag; exactly one is required
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.tables.push(name.into());
        self
    }

    /// Key column tag
    pub fn key<T: FieldValue>(
        mut self,
        property: &str,
        column: &str,
        tag: KeyTag,
        get: fn(&E) -> T,
        set: fn(&mut E, T),
    ) -> Self {
        self.keys.push(KeyTagEntry {
            descriptor: KeyDescriptor {
                column: column.to_string(),
                property: property.to_string(),
                kind: T::KIND,
                auto_increment: tag.auto_increment,
                sequence: tag.sequence,
            },
            accessor: compile_value(property, get, set),
        });
        self
    }

    /// Plain column tag
    pub fn field<T: FieldValue>(
        mut self,
        property: &str,
        column: &str,
        get: fn(&E) -> T,
        set: fn(&mut E, T),
    ) -> Self {
        self.fields.push(FieldTagEntry {
            descriptor: FieldDescriptor {
                column: column.to_string(),
                property: property.to_string(),
                kind: T::KIND,
            },
            accessor: compile_value(property, get, set),
        });
        self
    }

    /// One-to-one relation tag; the related type is registered recursively
    ///
    /// The tag's related table must be the table `R` is mapped on.
    pub fn has_one<R: Entity>(
        mut self,
        property: &str,
        tag: RelationTag,
        get: fn(&E) -> Option<&R>,
        set: fn(&mut E, R),
    ) -> Self {
        self.relations.push(RelationTagEntry {
            descriptor: tag.into_descriptor(property, Cardinality::One),
            accessor: Some(compile_relation(property, get, set)),
            register: register_related::<R>,
        });
        self
    }

    /// One-to-many relation tag
    ///
    /// Recorded as metadata only: the hydrator never loads collections.
    pub fn has_many<R: Entity>(mut self, property: &str, tag: RelationTag) -> Self {
        self.relations.push(RelationTagEntry {
            descriptor: tag.into_descriptor(property, Cardinality::Many),
            accessor: None,
            register: register_related::<R>,
        });
        self
    }

    pub(crate) fn into_parts(self) -> MappingParts {
        MappingParts {
            type_name: type_name::<E>(),
            type_id: TypeId::of::<E>(),
            tables: self.tables,
            keys: self.keys,
            fields: self.fields,
            relations: self.relations,
            factory: compile_factory::<E>(),
        }
    }
}
