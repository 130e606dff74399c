//! Descriptor types, schemas and the per-type schema registry.
//!
//! A type opts into descriptor-backed storage by implementing
//! [`DescriptorType`]: it names its parent in the descriptor hierarchy and
//! registers the fields it declares directly. The first time a model of the
//! type is constructed, the hierarchy is walked from the most-derived type up
//! to (but excluding) [`DescriptorBase`], and every field is given the next
//! sequential index. The resulting [`Schema`] is cached process-wide and
//! shared by all instances of the type.
//!
//! # Index assignment
//!
//! ```text
//! Child  { c }          ──►  0: c
//!   └─ Parent { a, b }  ──►  1: a, 2: b
//!        └─ DescriptorBase (excluded)
//! ```
//!
//! Fields of the most-derived type come first, in declaration order, then
//! the fields of each ancestor in turn. Two fields with the same name
//! anywhere in one hierarchy are rejected with
//! [`BindingError::NameCollision`].

use std::any::{TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock};

use horizon_binding_core::PerfSpan;
use horizon_binding_core::logging::{span_names, targets};
use parking_lot::RwLock;

use super::descriptor::FieldDescriptor;
use crate::error::{BindingError, Result};

/// A type whose values are stored in descriptor-backed slots.
///
/// # Example
///
/// ```
/// use std::sync::LazyLock;
/// use horizon_binding::model::{DescriptorBase, DescriptorType, Field, SchemaBuilder};
///
/// static X: LazyLock<Field<i64>> = LazyLock::new(|| Field::declare("x"));
/// static Y: LazyLock<Field<i64>> = LazyLock::new(|| Field::declare("y"));
///
/// struct Point;
///
/// impl DescriptorType for Point {
///     type Parent = DescriptorBase;
///
///     fn declare(fields: &mut SchemaBuilder) {
///         fields.field(&X).field(&Y);
///     }
/// }
///
/// let schema = Point::schema().unwrap();
/// assert_eq!(schema.names().collect::<Vec<_>>(), ["x", "y"]);
/// ```
pub trait DescriptorType: 'static {
    /// The next type up the hierarchy. Use [`DescriptorBase`] for roots.
    type Parent: DescriptorType;

    /// Registers the fields this type declares directly, in declaration
    /// order. Inherited fields are registered by the parent.
    ///
    /// This must be deterministic: it runs once per resolution attempt.
    fn declare(fields: &mut SchemaBuilder);

    /// Resolves (once) and returns the schema for this type.
    fn schema() -> Result<Arc<Schema>>
    where
        Self: Sized,
    {
        resolve::<Self>()
    }
}

/// The root of every descriptor hierarchy. Declares nothing and is never
/// part of a schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorBase;

impl DescriptorType for DescriptorBase {
    type Parent = DescriptorBase;

    fn declare(_fields: &mut SchemaBuilder) {}
}

/// Collects the fields one type declares directly.
pub struct SchemaBuilder {
    owner: &'static str,
    fields: Vec<&'static FieldDescriptor>,
}

impl SchemaBuilder {
    fn new(owner: &'static str) -> Self {
        Self {
            owner,
            fields: Vec::new(),
        }
    }

    /// Registers a field. Registration order is declaration order.
    pub fn field(&mut self, descriptor: &'static FieldDescriptor) -> &mut Self {
        self.fields.push(descriptor);
        self
    }

    /// The type whose fields are being collected.
    pub fn owner(&self) -> &'static str {
        self.owner
    }
}

struct Entry {
    descriptor: &'static FieldDescriptor,
    owner: &'static str,
}

/// The resolved, immutable index table of a descriptor type.
///
/// Index `i` maps to exactly one field name and every declared field has
/// exactly one index in `0..len()`.
pub struct Schema {
    type_name: &'static str,
    entries: Vec<Entry>,
    by_name: HashMap<&'static str, usize>,
}

impl Schema {
    /// Builds a schema from per-type declarations, most-derived first.
    fn from_levels(type_name: &'static str, levels: &[SchemaBuilder]) -> Result<Self> {
        let mut entries: Vec<Entry> = Vec::new();
        let mut by_name = HashMap::new();

        for level in levels {
            for descriptor in &level.fields {
                if let Some(owner) = descriptor.owner()
                    && owner != level.owner
                {
                    return Err(BindingError::OwnerConflict {
                        name: descriptor.name().to_string(),
                        owner,
                        claimant: level.owner,
                    });
                }
                if let Some(&existing) = by_name.get(descriptor.name()) {
                    let first: &Entry = &entries[existing];
                    return Err(BindingError::NameCollision {
                        name: descriptor.name().to_string(),
                        first_owner: first.owner,
                        second_owner: level.owner,
                    });
                }
                by_name.insert(descriptor.name(), entries.len());
                entries.push(Entry {
                    descriptor,
                    owner: level.owner,
                });
            }
        }

        Ok(Self {
            type_name,
            entries,
            by_name,
        })
    }

    /// The type this schema was resolved for.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of fields (rows).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The field name at `index`.
    pub fn name_at(&self, index: usize) -> Result<&'static str> {
        self.descriptor_at(index).map(FieldDescriptor::name)
    }

    /// The descriptor at `index`.
    pub fn descriptor_at(&self, index: usize) -> Result<&'static FieldDescriptor> {
        self.entries
            .get(index)
            .map(|entry| entry.descriptor)
            .ok_or_else(|| BindingError::out_of_range(index, self.len()))
    }

    /// The type that declared the field at `index`.
    pub fn owner_at(&self, index: usize) -> Result<&'static str> {
        self.entries
            .get(index)
            .map(|entry| entry.owner)
            .ok_or_else(|| BindingError::out_of_range(index, self.len()))
    }

    /// The index of the field called `name`, if the type has one.
    pub fn section_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// The index of `descriptor` in this schema.
    ///
    /// Fails with [`BindingError::IndexUnassigned`] if the descriptor is not
    /// one of this type's fields.
    pub fn section_for(&self, descriptor: &FieldDescriptor) -> Result<usize> {
        self.by_name
            .get(descriptor.name())
            .copied()
            .filter(|&i| std::ptr::eq(self.entries[i].descriptor, descriptor))
            .ok_or_else(|| BindingError::unassigned(descriptor.name()))
    }

    /// Field names in index order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.descriptor.name())
    }

    /// `(index, descriptor)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static FieldDescriptor)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, entry.descriptor))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Schema {
    /// Renders the index table, one row per field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} fields):", self.type_name, self.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            let descriptor = entry.descriptor;
            writeln!(
                f,
                "  {i}: {} [{}] = {} (from {})",
                descriptor.name(),
                descriptor.backing_name(),
                descriptor.initial_value(),
                entry.owner
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Resolved schemas, keyed by the concrete descriptor type.
static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, Arc<Schema>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Walks the hierarchy of `T` collecting each level's declarations.
fn collect_levels<T: DescriptorType>(levels: &mut Vec<SchemaBuilder>, seen: &mut HashSet<TypeId>) {
    let id = TypeId::of::<T>();
    // A cyclic `Parent` chain stops at the first repeat.
    if id == TypeId::of::<DescriptorBase>() || !seen.insert(id) {
        return;
    }
    let mut builder = SchemaBuilder::new(type_name::<T>());
    T::declare(&mut builder);
    levels.push(builder);
    collect_levels::<T::Parent>(levels, seen);
}

/// Returns the schema of `T`, resolving it on first use.
///
/// Resolution happens at most once per type. Concurrent first resolutions
/// are serialized by the registry's write lock, and descriptors are claimed
/// under that lock, so every field's class-level index is written once.
/// Failed resolutions are not cached and fail the same way on every call.
pub fn resolve<T: DescriptorType>() -> Result<Arc<Schema>> {
    let key = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.read().get(&key) {
        return Ok(schema.clone());
    }

    let _span = PerfSpan::new(span_names::SCHEMA_RESOLVE);
    let mut levels = Vec::new();
    collect_levels::<T>(&mut levels, &mut HashSet::new());

    let mut schemas = SCHEMAS.write();
    if let Some(schema) = schemas.get(&key) {
        return Ok(schema.clone());
    }

    let schema = Schema::from_levels(type_name::<T>(), &levels).inspect_err(|err| {
        tracing::error!(target: targets::SCHEMA, type_name = type_name::<T>(), %err, "schema resolution failed");
    })?;
    for level in &levels {
        for (position, descriptor) in level.fields.iter().enumerate() {
            descriptor.claim(level.owner, position);
        }
    }

    tracing::debug!(
        target: targets::SCHEMA,
        type_name = schema.type_name(),
        fields = schema.len(),
        levels = levels.len(),
        "resolved descriptor schema"
    );

    let schema = Arc::new(schema);
    schemas.insert(key, schema.clone());
    Ok(schema)
}

/// Returns `true` if the schema of `T` has already been resolved.
pub fn is_resolved<T: DescriptorType>() -> bool {
    SCHEMAS.read().contains_key(&TypeId::of::<T>())
}
