//! Accessor compiler
//!
//! Turns the typed getter/setter pair declared for a property into erased
//! closures that operate on `&dyn Any` entities and `Value` payloads. The
//! closures are built once, when a type is registered, and stored in its
//! descriptor; hydration and statement generation only ever call them.

use crate::errors::{binding_caused_by, internal, MapError, Result};
use crate::value::{FieldValue, Value, ValueKind};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

pub type Getter = Arc<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;
pub type Setter = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;
pub type RelationGetter =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>> + Send + Sync>;
pub type RelationSetter = Arc<dyn Fn(&mut dyn Any, Box<dyn Any + Send>) -> Result<()> + Send + Sync>;
pub type Factory = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Compiled get/set pair for a key or field property
#[derive(Clone)]
pub struct PropertyAccessor {
    property: String,
    kind: ValueKind,
    getter: Getter,
    setter: Setter,
}

impl PropertyAccessor {
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Declared value type of the property
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn get(&self, entity: &dyn Any) -> Result<Value> {
        (self.getter)(entity)
    }

    pub fn set(&self, entity: &mut dyn Any, value: Value) -> Result<()> {
        (self.setter)(entity, value)
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("property", &self.property)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Compiled get/set pair for a one-to-one relation property
#[derive(Clone)]
pub struct RelationAccessor {
    property: String,
    getter: RelationGetter,
    setter: RelationSetter,
}

impl RelationAccessor {
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Borrow the related entity, `None` when the relation is unset
    pub fn get<'a>(&self, entity: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        (self.getter)(entity)
    }

    pub fn set(&self, entity: &mut dyn Any, related: Box<dyn Any + Send>) -> Result<()> {
        (self.setter)(entity, related)
    }
}

impl fmt::Debug for RelationAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationAccessor")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

fn entity_mismatch<E>() -> MapError {
    internal(format!(
        "accessor compiled for {} invoked on another type",
        type_name::<E>()
    ))
}

/// Compile the accessor pair of a key or field property
pub fn compile_value<E, T>(property: &str, get: fn(&E) -> T, set: fn(&mut E, T)) -> PropertyAccessor
where
    E: Any,
    T: FieldValue,
{
    let target = format!("{}.{}", type_name::<E>(), property);

    let getter: Getter = Arc::new(move |entity: &dyn Any| {
        entity
            .downcast_ref::<E>()
            .map(|e| get(e).into_value())
            .ok_or_else(entity_mismatch::<E>)
    });

    let setter: Setter = Arc::new(move |entity: &mut dyn Any, value: Value| {
        let entity = entity
            .downcast_mut::<E>()
            .ok_or_else(entity_mismatch::<E>)?;
        let typed = T::from_value(value).map_err(|e| {
            binding_caused_by(target.clone(), "value does not fit the property", e)
        })?;
        set(entity, typed);
        Ok(())
    });

    PropertyAccessor {
        property: property.to_string(),
        kind: T::KIND,
        getter,
        setter,
    }
}

fn relation_getter<F>(f: F) -> RelationGetter
where
    F: for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compile the accessor pair of a one-to-one relation property
pub fn compile_relation<E, R>(
    property: &str,
    get: fn(&E) -> Option<&R>,
    set: fn(&mut E, R),
) -> RelationAccessor
where
    E: Any,
    R: Any,
{
    let getter = relation_getter(move |entity| {
        let entity = entity
            .downcast_ref::<E>()
            .ok_or_else(entity_mismatch::<E>)?;
        Ok(get(entity).map(|related| related as &dyn Any))
    });

    let setter: RelationSetter = Arc::new(move |entity: &mut dyn Any, related: Box<dyn Any + Send>| {
        let entity = entity
            .downcast_mut::<E>()
            .ok_or_else(entity_mismatch::<E>)?;
        let related = related.downcast::<R>().map_err(|_| {
            internal(format!(
                "relation expects {}, hydrated another type",
                type_name::<R>()
            ))
        })?;
        set(entity, *related);
        Ok(())
    });

    RelationAccessor {
        property: property.to_string(),
        getter,
        setter,
    }
}

/// Factory producing a default instance of `E`
pub fn compile_factory<E>() -> Factory
where
    E: Any + Default + Send,
{
    Arc::new(|| Box::new(E::default()) as Box<dyn Any + Send>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Author {
        id: i32,
        nick: Option<String>,
    }

    #[derive(Default)]
    struct Article {
        author: Option<Author>,
    }

    #[test]
    fn test_value_accessor_round_trips_through_value() {
        let acc = compile_value::<Author, Option<String>>("nick", |a| a.nick.clone(), |a, v| a.nick = v);
        let mut author = Author::default();

        acc.set(&mut author, Value::from("jb")).unwrap();
        assert_eq!(author.nick.as_deref(), Some("jb"));
        assert_eq!(acc.get(&author).unwrap(), Value::from("jb"));
        assert_eq!(acc.kind(), ValueKind::Text);
    }

    #[test]
    fn test_setter_converts_driver_integer() {
        let acc = compile_value::<Author, i32>("id", |a| a.id, |a, v| a.id = v);
        let mut author = Author::default();

        acc.set(&mut author, Value::BigInt(12)).unwrap();
        assert_eq!(author.id, 12);
    }

    #[test]
    fn test_setter_rejects_wrong_kind_with_binding_error() {
        let acc = compile_value::<Author, i32>("id", |a| a.id, |a, v| a.id = v);
        let mut author = Author::default();

        let err = acc.set(&mut author, Value::from("abc")).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Binding);
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_accessor_on_wrong_entity_is_internal() {
        let acc = compile_value::<Author, i32>("id", |a| a.id, |a, v| a.id = v);
        let article = Article::default();

        let err = acc.get(&article).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Internal);
    }

    #[test]
    fn test_relation_accessor() {
        let acc = compile_relation::<Article, Author>(
            "author",
            |a| a.author.as_ref(),
            |a, v| a.author = Some(v),
        );
        let mut article = Article::default();
        assert!(acc.get(&article).unwrap().is_none());

        let related: Box<dyn Any + Send> = Box::new(Author {
            id: 3,
            nick: None,
        });
        acc.set(&mut article, related).unwrap();

        let author = acc.get(&article).unwrap().unwrap();
        assert_eq!(author.downcast_ref::<Author>().map(|a| a.id), Some(3));
    }

    #[test]
    fn test_factory_builds_default() {
        let factory = compile_factory::<Author>();
        let boxed = factory();
        assert_eq!(boxed.downcast_ref::<Author>().map(|a| a.id), Some(0));
    }
}
