//! Record shapes and the registry that hands out their identities.
//!
//! A [`Shape`] is the runtime type of a record: an ordered list of typed
//! fields plus the member table mapping every field name and its generated
//! `get_<name>` / `set_<name>` accessors to a field index.
//!
//! Shapes are never deduplicated. Two maps with identical keys still get two
//! distinct shapes, and identifiers are never reused. The registry keeps only
//! weak references, so a shape lives exactly as long as the records using it.

use crate::config::BuilderConfig;
use crate::error::GenerationError;
use crate::value::{NumberKind, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

/// Dead weak entries are swept once the table reaches this size (then twice
/// the surviving size).
const SWEEP_THRESHOLD: usize = 1024;

static GLOBAL: LazyLock<ShapeRegistry> = LazyLock::new(ShapeRegistry::new);

/// Unique, monotonically increasing identity of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// The declared type of a record field, resolved from its value at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Unconstrained. Fields built from `null` get this type.
    Any,
    Bool,
    Char,
    Number(NumberKind),
    String,
    Enum,
    Record(ShapeId),
    Array,
}

impl FieldType {
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Bool(_) => FieldType::Bool,
            Value::Char(_) => FieldType::Char,
            Value::Number(n) => FieldType::Number(n.kind()),
            Value::String(_) => FieldType::String,
            Value::Enum(_) => FieldType::Enum,
            Value::Record(r) => FieldType::Record(r.shape_id()),
            Value::Array(_) => FieldType::Array,
            Value::Null | Value::Comparator(_) | Value::Expression(_) => FieldType::Any,
        }
    }

    /// Whether `value` may be stored in a field of this type.
    ///
    /// Reference-like types (string, record, array) also accept `null`;
    /// bool, char, number and enum fields do not.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::String | FieldType::Record(_) | FieldType::Array, Value::Null) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Char, Value::Char(_)) => true,
            (FieldType::Number(kind), Value::Number(n)) => n.kind() == *kind,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Enum, Value::Enum(_)) => true,
            (FieldType::Record(id), Value::Record(r)) => r.shape_id() == *id,
            (FieldType::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => f.write_str("any"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Char => f.write_str("char"),
            FieldType::Number(kind) => write!(f, "{kind}"),
            FieldType::String => f.write_str("string"),
            FieldType::Enum => f.write_str("enum"),
            FieldType::Record(id) => write!(f, "{id}"),
            FieldType::Array => f.write_str("array"),
        }
    }
}

/// A named, typed field of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// What a member name resolves to, carrying the field index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Field(usize),
    Get(usize),
    Set(usize),
}

impl Accessor {
    pub fn index(self) -> usize {
        match self {
            Accessor::Field(i) | Accessor::Get(i) | Accessor::Set(i) => i,
        }
    }
}

/// The runtime type of a record.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    fields: Vec<FieldDef>,
    members: HashMap<String, Accessor>,
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Fields in declaration (source insertion) order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        match self.members.get(name)? {
            Accessor::Field(i) => Some(*i),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    /// Resolve any member name: a field name, `get_<field>` or `set_<field>`.
    pub fn accessor(&self, member: &str) -> Option<Accessor> {
        self.members.get(member).copied()
    }
}

impl fmt::Display for Shape {
    /// `shape#3 { name: string, age: i64 }`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.id)?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{}: {}", field.name, field.ty)?;
        }
        if self.fields.is_empty() {
            f.write_str("}")
        } else {
            f.write_str(" }")
        }
    }
}

/// Validate every field name and build the member table.
fn member_table(
    fields: &[FieldDef],
    config: &BuilderConfig,
) -> Result<HashMap<String, Accessor>, GenerationError> {
    let mut table = HashMap::with_capacity(fields.len() * 3);

    for (index, field) in fields.iter().enumerate() {
        if !config.identifier_policy.accepts(&field.name) {
            return Err(GenerationError::InvalidIdentifier {
                name: field.name.clone(),
            });
        }

        let members = [
            (field.name.clone(), Accessor::Field(index)),
            (format!("get_{}", field.name), Accessor::Get(index)),
            (format!("set_{}", field.name), Accessor::Set(index)),
        ];

        for (member, accessor) in members {
            if config.is_reserved(&member) {
                return Err(GenerationError::Reserved {
                    name: field.name.clone(),
                    member,
                });
            }
            match table.entry(member) {
                Entry::Vacant(slot) => {
                    slot.insert(accessor);
                }
                Entry::Occupied(slot) => {
                    let first = &fields[slot.get().index()].name;
                    if *first == field.name {
                        return Err(GenerationError::DuplicateField {
                            name: field.name.clone(),
                        });
                    }
                    return Err(GenerationError::AccessorCollision {
                        member: slot.key().clone(),
                        first: first.clone(),
                        second: field.name.clone(),
                    });
                }
            }
        }
    }

    Ok(table)
}

#[derive(Debug)]
struct RegistryState {
    next_id: u64,
    live: HashMap<ShapeId, Weak<Shape>>,
    sweep_at: usize,
}

/// Allocates shape identifiers and commits shapes.
///
/// Allocation and commit happen under one lock, so concurrent builders never
/// observe the same identifier. Most callers use [`ShapeRegistry::global`];
/// a private registry gives an isolated identifier sequence (handy in tests).
#[derive(Debug)]
pub struct ShapeRegistry {
    state: Mutex<RegistryState>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_id: 0,
                live: HashMap::new(),
                sweep_at: SWEEP_THRESHOLD,
            }),
        }
    }

    /// The process-wide registry. Empty at startup, never torn down.
    pub fn global() -> &'static ShapeRegistry {
        &GLOBAL
    }

    /// Validate `fields`, then allocate a fresh identifier and commit the shape.
    ///
    /// # Errors
    /// Returns a [`GenerationError`] if a field name is not a valid identifier
    /// under `config`, is reserved, is duplicated, or generates an accessor that
    /// collides with another field's member. No identifier is consumed on error.
    pub fn register(
        &self,
        fields: Vec<FieldDef>,
        config: &BuilderConfig,
    ) -> Result<Arc<Shape>, GenerationError> {
        let members = member_table(&fields, config)?;

        let mut state = self.lock();
        let id = ShapeId(state.next_id);
        state.next_id += 1;

        let shape = Arc::new(Shape {
            id,
            fields,
            members,
        });
        state.live.insert(id, Arc::downgrade(&shape));

        if state.live.len() >= state.sweep_at {
            state.live.retain(|_, shape| shape.strong_count() > 0);
            state.sweep_at = (state.live.len() * 2).max(SWEEP_THRESHOLD);
        }

        debug!(shape = %id, fields = shape.len(), "registered shape");
        Ok(shape)
    }

    /// Look up a shape that is still in use by at least one record.
    pub fn lookup(&self, id: ShapeId) -> Option<Arc<Shape>> {
        let state = self.lock();
        state.live.get(&id).and_then(Weak::upgrade)
    }

    /// Total number of identifiers handed out so far.
    pub fn allocated(&self) -> u64 {
        self.lock().next_id
    }

    /// Number of shapes still referenced by a live record.
    pub fn live_shapes(&self) -> usize {
        self.lock()
            .live
            .values()
            .filter(|shape| shape.strong_count() > 0)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(names: &[&str]) -> Vec<FieldDef> {
        names
            .iter()
            .map(|n| FieldDef::new(*n, FieldType::Any))
            .collect()
    }

    #[test]
    fn identical_field_sets_get_distinct_ids() {
        let registry = ShapeRegistry::new();
        let config = BuilderConfig::default();
        let a = registry.register(defs(&["x", "y"]), &config).unwrap();
        let b = registry.register(defs(&["x", "y"]), &config).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn failed_registration_consumes_no_id() {
        let registry = ShapeRegistry::new();
        let config = BuilderConfig::default();
        assert!(registry.register(defs(&["bad-name"]), &config).is_err());
        assert_eq!(registry.allocated(), 0);
        let shape = registry.register(defs(&["ok"]), &config).unwrap();
        assert_eq!(shape.id().get(), 0);
    }

    #[test]
    fn accessors_resolve_to_field_index() {
        let registry = ShapeRegistry::new();
        let shape = registry
            .register(defs(&["name", "age"]), &BuilderConfig::default())
            .unwrap();
        assert_eq!(shape.accessor("age"), Some(Accessor::Field(1)));
        assert_eq!(shape.accessor("get_name"), Some(Accessor::Get(0)));
        assert_eq!(shape.accessor("set_age"), Some(Accessor::Set(1)));
        assert_eq!(shape.accessor("get_missing"), None);
        assert_eq!(shape.field_index("get_name"), None);
    }

    #[test]
    fn field_named_like_sibling_getter_collides() {
        let registry = ShapeRegistry::new();
        let err = registry
            .register(defs(&["x", "get_x"]), &BuilderConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::AccessorCollision {
                member: "get_x".into(),
                first: "x".into(),
                second: "get_x".into(),
            }
        );
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let registry = ShapeRegistry::new();
        let err = registry
            .register(defs(&["a", "a"]), &BuilderConfig::default())
            .unwrap_err();
        assert_eq!(err, GenerationError::DuplicateField { name: "a".into() });
    }

    #[test]
    fn reserved_accessor_name_is_rejected() {
        let registry = ShapeRegistry::new();
        let config = BuilderConfig::default().reserve("get_type");
        let err = registry.register(defs(&["type"]), &config).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Reserved {
                name: "type".into(),
                member: "get_type".into(),
            }
        );
    }

    #[test]
    fn dropped_shapes_are_no_longer_live() {
        let registry = ShapeRegistry::new();
        let config = BuilderConfig::default();
        let kept = registry.register(defs(&["a"]), &config).unwrap();
        let dropped = registry.register(defs(&["b"]), &config).unwrap();
        let dropped_id = dropped.id();
        drop(dropped);
        assert_eq!(registry.live_shapes(), 1);
        assert!(registry.lookup(dropped_id).is_none());
        assert_eq!(registry.lookup(kept.id()).unwrap().id(), kept.id());
    }

    #[test]
    fn shape_display_lists_fields_in_order() {
        let registry = ShapeRegistry::new();
        let shape = registry
            .register(
                vec![
                    FieldDef::new("name", FieldType::String),
                    FieldDef::new("age", FieldType::Number(NumberKind::I64)),
                ],
                &BuilderConfig::default(),
            )
            .unwrap();
        assert_eq!(shape.to_string(), "shape#0 { name: string, age: i64 }");
    }
}
