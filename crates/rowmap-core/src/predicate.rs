//! Predicate expressions and their translation to SQL
//!
//! A predicate is an expression tree over one entity parameter. Member
//! access off the parameter renders as the mapped column; member access off
//! a captured value is evaluated at translation time and inlined as a
//! literal.
//!
//! ```
//! use rowmap_core::mapping::{Entity, KeyTag, Mapping};
//! use rowmap_core::predicate::{prop, Predicate, Translator};
//! use rowmap_core::registry::Registry;
//!
//! #[derive(Debug, Default)]
//! struct Author {
//!     id: i32,
//!     first_name: String,
//! }
//!
//! impl Entity for Author {
//!     fn mapping() -> Mapping<Self> {
//!         Mapping::<Self>::new()
//!             .table("authors")
//!             .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
//!             .field("first_name", "firstname", |a| a.first_name.clone(), |a, v| a.first_name = v)
//!     }
//! }
//!
//! let registry = Registry::new();
//! let predicate = Predicate::<Author>::new(prop("first_name").eq("Jean"));
//! let sql = Translator::default().translate(&registry, &predicate).unwrap();
//! assert_eq!(sql, "firstname = 'Jean'");
//! ```

use crate::config::{ComparisonMapping, EngineConfig};
use crate::descriptor::EntityDescriptor;
use crate::errors::{internal, translation, Result};
use crate::mapping::Entity;
use crate::registry::Registry;
use crate::sql::literal::inline_value;
use crate::value::Value;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

// ========== Expression Tree ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    AndAlso,
    OrElse,
    Add,
}

impl BinaryOp {
    pub fn node_kind(self) -> &'static str {
        match self {
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::GreaterThan => "GreaterThan",
            BinaryOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryOp::LessThan => "LessThan",
            BinaryOp::LessThanOrEqual => "LessThanOrEqual",
            BinaryOp::AndAlso => "AndAlso",
            BinaryOp::OrElse => "OrElse",
            BinaryOp::Add => "Add",
        }
    }
}

/// Named members of a value captured by a predicate
pub trait Inspect: Send + Sync {
    fn member(&self, name: &str) -> Option<Captured>;
}

/// A value captured from outside the predicate
#[derive(Clone)]
pub enum Captured {
    Value(Value),
    Object(Arc<dyn Inspect>),
}

impl Captured {
    pub fn value(value: impl Into<Value>) -> Self {
        Captured::Value(value.into())
    }

    pub fn object(object: impl Inspect + 'static) -> Self {
        Captured::Object(Arc::new(object))
    }
}

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Captured::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Captured::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<Value> for Captured {
    fn from(value: Value) -> Self {
        Captured::Value(value)
    }
}

/// Captured object backed by a member map
#[derive(Debug, Clone, Default)]
pub struct CapturedObject {
    members: HashMap<String, Captured>,
}

impl CapturedObject {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, member: impl Into<Captured>) -> Self {
        self.members.insert(name.to_string(), member.into());
        self
    }
}

impl Inspect for CapturedObject {
    fn member(&self, name: &str) -> Option<Captured> {
        self.members.get(name).cloned()
    }
}

impl From<CapturedObject> for Captured {
    fn from(object: CapturedObject) -> Self {
        Captured::object(object)
    }
}

#[derive(Debug, Clone)]
pub enum MemberAccess {
    /// Property path off the predicate parameter
    Param(Vec<String>),
    /// Member chain off a captured root
    Captured {
        name: String,
        root: Captured,
        path: Vec<String>,
    },
}

impl MemberAccess {
    /// Dotted form, `e.first_name` or `filter.author.nick`
    pub fn text(&self) -> String {
        let (root, path) = match self {
            MemberAccess::Param(path) => ("e", path),
            MemberAccess::Captured { name, path, .. } => (name.as_str(), path),
        };
        std::iter::once(root)
            .chain(path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Member(MemberAccess),
    Constant(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Call { method: String, args: Vec<Expr> },
}

/// Conversion of operands into expression nodes
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! constant_operand {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Constant(Value::from(self))
                }
            }
        )*
    };
}

constant_operand!(Value, &str, String, i32, i64, f64, bool, NaiveDateTime);

/// Access to a property of the predicate parameter
pub fn prop(property: &str) -> Expr {
    Expr::Member(MemberAccess::Param(vec![property.to_string()]))
}

/// Chained access through the predicate parameter, such as `e.author.nick`
pub fn prop_path(path: &[&str]) -> Expr {
    Expr::Member(MemberAccess::Param(
        path.iter().map(|p| p.to_string()).collect(),
    ))
}

pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

/// Member chain off a captured value, evaluated at translation time
pub fn captured(name: &str, root: impl Into<Captured>, path: &[&str]) -> Expr {
    Expr::Member(MemberAccess::Captured {
        name: name.to_string(),
        root: root.into(),
        path: path.iter().map(|p| p.to_string()).collect(),
    })
}

impl Expr {
    /// Name of the node kind, as reported in translation errors
    pub fn node_kind(&self) -> &'static str {
        match self {
            Expr::Member(_) => "MemberAccess",
            Expr::Constant(_) => "Constant",
            Expr::Binary { op, .. } => op.node_kind(),
            Expr::Not(_) => "Not",
            Expr::Call { .. } => "Call",
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl IntoExpr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into_expr()),
        }
    }

    #[must_use]
    pub fn eq(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Equal, rhs)
    }

    #[must_use]
    pub fn ne(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::NotEqual, rhs)
    }

    #[must_use]
    pub fn gt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::GreaterThan, rhs)
    }

    #[must_use]
    pub fn gte(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::GreaterThanOrEqual, rhs)
    }

    #[must_use]
    pub fn lt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::LessThan, rhs)
    }

    #[must_use]
    pub fn lte(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::LessThanOrEqual, rhs)
    }

    #[must_use]
    pub fn and(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::AndAlso, rhs)
    }

    #[must_use]
    pub fn or(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::OrElse, rhs)
    }

    #[must_use]
    pub fn plus(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }

    #[must_use]
    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Method call on this node, e.g. `e.title.contains("rust")`
    #[must_use]
    pub fn call(self, method: &str, args: Vec<Expr>) -> Expr {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(self);
        all.extend(args);
        Expr::Call {
            method: method.to_string(),
            args: all,
        }
    }
}

/// Boolean expression over one `E` parameter
pub struct Predicate<E> {
    body: Expr,
    _entity: PhantomData<fn(&E) -> bool>,
}

impl<E: Entity> Predicate<E> {
    pub fn new(body: Expr) -> Self {
        Self {
            body,
            _entity: PhantomData,
        }
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.body).finish()
    }
}

// ========== Chain Getters ==========

pub type ChainGetter = Arc<dyn Fn(&Captured) -> Result<Value> + Send + Sync>;

static GLOBAL_CACHE: OnceLock<Arc<GetterCache>> = OnceLock::new();

/// Compiled getters of captured member chains, keyed by their dotted form
///
/// Append-only. Two threads compiling the same chain keep whichever
/// insert lands first; both getters are equivalent.
#[derive(Default)]
pub struct GetterCache {
    getters: RwLock<HashMap<String, ChainGetter>>,
    compiled: AtomicUsize,
}

impl GetterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache
    pub fn global() -> Arc<GetterCache> {
        Arc::clone(GLOBAL_CACHE.get_or_init(|| Arc::new(GetterCache::new())))
    }

    /// Getter for `key`, compiling it from `path` on first use
    pub fn get_or_compile(&self, key: &str, path: &[String]) -> Result<ChainGetter> {
        {
            let getters = self
                .getters
                .read()
                .map_err(|_| internal("chain getter cache poisoned"))?;
            if let Some(getter) = getters.get(key) {
                return Ok(Arc::clone(getter));
            }
        }

        let compiled = compile_chain(key.to_string(), path.to_vec());
        let mut getters = self
            .getters
            .write()
            .map_err(|_| internal("chain getter cache poisoned"))?;
        let getter = getters.entry(key.to_string()).or_insert_with(|| {
            self.compiled.fetch_add(1, Ordering::Relaxed);
            compiled
        });
        Ok(Arc::clone(getter))
    }

    pub fn len(&self) -> usize {
        self.getters.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of getters compiled into the cache so far
    pub fn compiled(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }
}

fn compile_chain(text: String, path: Vec<String>) -> ChainGetter {
    Arc::new(move |root: &Captured| {
        let mut current = root.clone();
        for name in &path {
            current = match current {
                Captured::Object(object) => object.member(name).ok_or_else(|| {
                    translation("MemberAccess", format!("{} has no member {}", text, name))
                })?,
                Captured::Value(_) => {
                    return Err(translation(
                        "MemberAccess",
                        format!("{}: cannot read {} from a plain value", text, name),
                    ))
                }
            };
        }
        match current {
            Captured::Value(value) => Ok(value),
            Captured::Object(_) => Err(translation(
                "MemberAccess",
                format!("{} does not evaluate to a value", text),
            )),
        }
    })
}

// ========== Translator ==========

/// Renders predicates as SQL boolean fragments
#[derive(Clone)]
pub struct Translator {
    mapping: ComparisonMapping,
    cache: Arc<GetterCache>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Translator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            mapping: config.comparison_mapping,
            cache: GetterCache::global(),
        }
    }

    /// Use a dedicated getter cache instead of the process-wide one
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<GetterCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn comparison_mapping(&self) -> ComparisonMapping {
        self.mapping
    }

    /// Translate `predicate`, registering `E` on first use
    ///
    /// Fails on the first unsupported node; no partial SQL is returned.
    pub fn translate<E: Entity>(&self, registry: &Registry, predicate: &Predicate<E>) -> Result<String> {
        let descriptor = registry.ensure_registered::<E>()?;
        let mut sql = String::new();
        self.walk(&descriptor, predicate.body(), &mut sql)?;
        Ok(sql)
    }

    fn walk(&self, descriptor: &EntityDescriptor, expr: &Expr, sql: &mut String) -> Result<()> {
        match expr {
            Expr::Member(member) => self.member(descriptor, member, sql),
            Expr::Constant(value) => {
                sql.push_str(&inline_value(value)?);
                Ok(())
            }
            Expr::Binary { op, left, right } => {
                let operator = match op {
                    BinaryOp::Equal => "=",
                    BinaryOp::NotEqual => "<>",
                    BinaryOp::GreaterThan => ">",
                    BinaryOp::GreaterThanOrEqual => ">=",
                    BinaryOp::LessThan => "<",
                    BinaryOp::LessThanOrEqual => self.mapping.less_or_equal(),
                    BinaryOp::AndAlso => return self.logical(descriptor, "AND", left, right, sql),
                    BinaryOp::OrElse => return self.logical(descriptor, "OR", left, right, sql),
                    BinaryOp::Add => return Err(unsupported(expr)),
                };
                self.walk(descriptor, left, sql)?;
                sql.push(' ');
                sql.push_str(operator);
                sql.push(' ');
                self.walk(descriptor, right, sql)
            }
            Expr::Not(_) | Expr::Call { .. } => Err(unsupported(expr)),
        }
    }

    fn logical(
        &self,
        descriptor: &EntityDescriptor,
        keyword: &str,
        left: &Expr,
        right: &Expr,
        sql: &mut String,
    ) -> Result<()> {
        sql.push('(');
        self.walk(descriptor, left, sql)?;
        sql.push_str(") ");
        sql.push_str(keyword);
        sql.push_str(" (");
        self.walk(descriptor, right, sql)?;
        sql.push(')');
        Ok(())
    }

    fn member(&self, descriptor: &EntityDescriptor, member: &MemberAccess, sql: &mut String) -> Result<()> {
        match member {
            MemberAccess::Param(path) => {
                let [property] = path.as_slice() else {
                    return Err(translation(
                        "MemberAccess",
                        format!(
                            "nested member access {} through the predicate parameter",
                            member.text()
                        ),
                    ));
                };
                let column = descriptor
                    .key_by_property(property)
                    .map(|k| k.column.as_str())
                    .or_else(|| descriptor.field_by_property(property).map(|f| f.column.as_str()))
                    .ok_or_else(|| {
                        translation(
                            "MemberAccess",
                            format!("property {} is not mapped on {}", property, descriptor.table()),
                        )
                    })?;
                sql.push_str(column);
                Ok(())
            }
            MemberAccess::Captured { root, path, .. } => {
                let getter = self.cache.get_or_compile(&member.text(), path)?;
                let value = getter(root)?;
                sql.push_str(&inline_value(&value)?);
                Ok(())
            }
        }
    }
}

fn unsupported(expr: &Expr) -> crate::errors::MapError {
    translation(expr.node_kind(), "unsupported operation")
}
