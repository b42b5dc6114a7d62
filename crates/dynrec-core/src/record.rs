//! Record instances: a shared [`Shape`] plus one value per field.

use crate::config::BuilderConfig;
use crate::error::{GenerationError, RecordError};
use crate::registry::{Accessor, FieldDef, FieldType, Shape, ShapeId, ShapeRegistry};
use crate::value::Value;
use std::sync::Arc;

/// A runtime-synthesized record with named fields.
///
/// Field order is fixed by the shape and never changes. Values can be
/// replaced through [`Record::set`], which enforces the field's declared type.
#[derive(Debug, Clone)]
pub struct Record {
    shape: Arc<Shape>,
    values: Vec<Value>,
}

impl Record {
    /// Build a record directly from name/value pairs, registering a fresh
    /// shape in the global registry. Mostly used to write filter patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynrec_core::{Comparator, Record};
    ///
    /// let pattern = Record::from_fields([
    ///     ("status", "active".into()),
    ///     ("age", Comparator::value(|age: &i64| *age >= 18).into()),
    /// ])
    /// .unwrap();
    /// assert_eq!(pattern.len(), 2);
    /// ```
    ///
    /// # Errors
    /// Same rules as the builder: see [`GenerationError`].
    pub fn from_fields<I, K>(fields: I) -> Result<Record, GenerationError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::from_fields_in(ShapeRegistry::global(), &BuilderConfig::default(), fields)
    }

    /// [`Record::from_fields`] against an explicit registry and configuration.
    pub fn from_fields_in<I, K>(
        registry: &ShapeRegistry,
        config: &BuilderConfig,
        fields: I,
    ) -> Result<Record, GenerationError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (defs, values): (Vec<FieldDef>, Vec<Value>) = fields
            .into_iter()
            .map(|(name, value)| (FieldDef::new(name, FieldType::of(&value)), value))
            .unzip();
        let shape = registry.register(defs, config)?;
        Ok(Record::instantiate(shape, values))
    }

    /// Pair a committed shape with its field values (same length and order).
    pub(crate) fn instantiate(shape: Arc<Shape>, values: Vec<Value>) -> Record {
        debug_assert_eq!(shape.len(), values.len());
        Record { shape, values }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape.id()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.shape.field_index(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape.field_index(name).map(|i| &self.values[i])
    }

    /// Replace a field's value, returning the previous one.
    ///
    /// # Errors
    /// `UnknownField` if the shape has no such field, `TypeMismatch` if the
    /// value is not assignable to the field's declared type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value, RecordError> {
        let index = self
            .shape
            .field_index(name)
            .ok_or_else(|| RecordError::UnknownField {
                name: name.to_string(),
                shape: self.shape_id(),
            })?;
        self.set_at(index, value.into())
    }

    /// Read through any member name: `name` or `get_name`.
    pub fn invoke_get(&self, member: &str) -> Option<&Value> {
        match self.shape.accessor(member)? {
            Accessor::Field(i) | Accessor::Get(i) => Some(&self.values[i]),
            Accessor::Set(_) => None,
        }
    }

    /// Write through a `set_<name>` member (or the bare field name).
    pub fn invoke_set(&mut self, member: &str, value: impl Into<Value>) -> Result<Value, RecordError> {
        match self.shape.accessor(member) {
            Some(Accessor::Field(i) | Accessor::Set(i)) => self.set_at(i, value.into()),
            _ => Err(RecordError::UnknownField {
                name: member.to_string(),
                shape: self.shape_id(),
            }),
        }
    }

    /// Fields as `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.shape
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(def, value)| (def.name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.shape.fields().iter().map(|def| def.name.as_str())
    }

    fn set_at(&mut self, index: usize, value: Value) -> Result<Value, RecordError> {
        let def = &self.shape.fields()[index];
        if !def.ty.accepts(&value) {
            return Err(RecordError::TypeMismatch {
                name: def.name.clone(),
                expected: def.ty,
                actual: value.type_name(),
            });
        }
        Ok(std::mem::replace(&mut self.values[index], value))
    }
}

/// Native equality: same shape identity and natively equal field values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.shape_id() == other.shape_id() && self.values == other.values
    }
}
