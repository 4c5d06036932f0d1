//! Metadata registry
//!
//! Maps table names to descriptors for the life of the process. A type is
//! registered the first time it is used; the descriptor of every type
//! reachable through its relations is built in the same pass and published
//! together, so a failing type never leaves part of its graph behind.

#![allow(clippy::result_large_err)]

use crate::descriptor::EntityDescriptor;
use crate::errors::{internal, registration, unknown_table, MapError, Result};
use crate::mapping::Entity;
use crate::{log_op_end, log_op_error, log_op_start};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Instant;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Descriptor registry keyed by table name and by Rust type
#[derive(Default)]
pub struct Registry {
    tables: RwLock<HashMap<String, Arc<EntityDescriptor>>>,
    types: RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>,
    // Serializes first-time builds; lookups of registered types never take it.
    build_lock: Mutex<()>,
}

/// State of one registration pass
#[derive(Default)]
pub(crate) struct BuildContext {
    // Types still being built, with their table
    in_progress: HashMap<TypeId, String>,
    built: Vec<EntityDescriptor>,
}

impl BuildContext {
    fn table_of(&self, type_id: TypeId) -> Option<&str> {
        self.in_progress
            .get(&type_id)
            .map(String::as_str)
            .or_else(|| {
                self.built
                    .iter()
                    .find(|d| d.type_id() == type_id)
                    .map(EntityDescriptor::table)
            })
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register `E` (and every type reachable through its relations) if needed
    ///
    /// Idempotent: once `E` is registered this is a read-locked lookup
    /// returning the same descriptor instance to every caller.
    pub fn ensure_registered<E: Entity>(&self) -> Result<Arc<EntityDescriptor>> {
        let type_id = TypeId::of::<E>();
        if let Some(descriptor) = self.by_type(type_id)? {
            return Ok(descriptor);
        }

        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| internal("registry build lock poisoned"))?;

        // Another caller may have finished while we waited for the lock
        if let Some(descriptor) = self.by_type(type_id)? {
            return Ok(descriptor);
        }

        let start = Instant::now();
        log_op_start!("register", entity = type_name::<E>());

        let result = self.build_and_publish::<E>();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(descriptor) => {
                log_op_end!("register", duration_ms = duration_ms, table = descriptor.table());
            }
            Err(err) => {
                log_op_error!("register", err, duration_ms = duration_ms);
            }
        }
        result
    }

    fn build_and_publish<E: Entity>(&self) -> Result<Arc<EntityDescriptor>> {
        let mut ctx = BuildContext::default();
        register_related::<E>(self, &mut ctx)?;
        self.publish(ctx)?;
        self.by_type(TypeId::of::<E>())?
            .ok_or_else(|| internal(format!("{} missing after registration", type_name::<E>())))
    }

    fn publish(&self, ctx: BuildContext) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| internal("registry table map poisoned"))?;
        let mut types = self
            .types
            .write()
            .map_err(|_| internal("registry type map poisoned"))?;

        // Check every table first so a conflict publishes nothing
        let mut claimed: HashMap<&str, &EntityDescriptor> = HashMap::new();
        for descriptor in &ctx.built {
            let existing = tables
                .get(descriptor.table())
                .map(|d| (d.type_id(), d.type_name()))
                .or_else(|| {
                    claimed
                        .get(descriptor.table())
                        .map(|d| (d.type_id(), d.type_name()))
                });
            if let Some((existing_id, existing_name)) = existing {
                if existing_id != descriptor.type_id() {
                    return Err(MapError::RegistryConflict {
                        table: descriptor.table().to_string(),
                        existing: existing_name.to_string(),
                        incoming: descriptor.type_name().to_string(),
                    });
                }
            }
            claimed.insert(descriptor.table(), descriptor);
        }
        drop(claimed);

        for descriptor in ctx.built {
            let descriptor = Arc::new(descriptor);
            tracing::debug!(
                component = module_path!(),
                table = descriptor.table(),
                entity = descriptor.type_name(),
                "descriptor published"
            );
            types.insert(descriptor.type_id(), Arc::clone(&descriptor));
            tables.insert(descriptor.table().to_string(), descriptor);
        }
        Ok(())
    }

    fn by_type(&self, type_id: TypeId) -> Result<Option<Arc<EntityDescriptor>>> {
        let types = self
            .types
            .read()
            .map_err(|_| internal("registry type map poisoned"))?;
        Ok(types.get(&type_id).cloned())
    }

    /// Descriptor of a registered table
    pub fn descriptor(&self, table: &str) -> Result<Arc<EntityDescriptor>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| internal("registry table map poisoned"))?;
        tables.get(table).cloned().ok_or_else(|| unknown_table(table))
    }

    /// Descriptor of `E`, registering it on first use
    pub fn descriptor_of<E: Entity>(&self) -> Result<Arc<EntityDescriptor>> {
        self.ensure_registered::<E>()
    }

    pub fn is_registered(&self, table: &str) -> bool {
        self.tables
            .read()
            .map(|tables| tables.contains_key(table))
            .unwrap_or(false)
    }

    /// Registered table names, sorted
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Build `R` within an ongoing registration pass and return its table
///
/// Skips types already registered, already built in this pass, or still in
/// progress higher up the stack (mutually referencing types). Every relation
/// of `R` must name the table of the type it points at.
pub(crate) fn register_related<R: Entity>(
    registry: &Registry,
    ctx: &mut BuildContext,
) -> Result<String> {
    let type_id = TypeId::of::<R>();
    if let Some(table) = ctx.table_of(type_id) {
        return Ok(table.to_string());
    }
    if let Some(descriptor) = registry.by_type(type_id)? {
        return Ok(descriptor.table().to_string());
    }

    let parts = R::mapping().into_parts();
    let relations: Vec<_> = parts
        .relations
        .iter()
        .map(|r| {
            (
                r.register,
                r.descriptor.property.clone(),
                r.descriptor.related_table.clone(),
            )
        })
        .collect();
    let descriptor = EntityDescriptor::build(parts)?;
    let table = descriptor.table().to_string();
    ctx.in_progress.insert(type_id, table.clone());

    for (register, property, related_table) in relations {
        let target = register(registry, ctx)?;
        if target != related_table {
            return Err(registration(
                type_name::<R>(),
                format!(
                    "relation {} names table {} but its type is mapped on {}",
                    property, related_table, target
                ),
            ));
        }
    }

    ctx.in_progress.remove(&type_id);
    ctx.built.push(descriptor);
    Ok(table)
}
