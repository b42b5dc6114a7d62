//! Build a record graph from a parsed JSON value tree.
//!
//! The builder walks the tree bottom-up: nested maps become nested records
//! (each with a brand new shape), lists become arrays, and everything else
//! becomes a scalar. Construction is all-or-nothing; if any field name
//! anywhere in the tree is rejected, the caller gets the error and no graph.

use crate::config::BuilderConfig;
use crate::error::{GenerationError, Result};
use crate::record::Record;
use crate::registry::{FieldDef, FieldType, ShapeRegistry};
use crate::value::Value;
use serde_json::{Map, Number as JsonNumber, Value as Json};
use tracing::debug;

/// Synthesizes shapes and instantiates records from `serde_json` values.
///
/// # Examples
///
/// ```
/// use dynrec_core::RecordBuilder;
/// use serde_json::json;
///
/// let builder = RecordBuilder::new();
/// let value = builder.build_any(&json!({"name": "Ada", "langs": ["en", "fr"]})).unwrap();
/// let record = value.as_record().unwrap();
/// assert_eq!(record.field_names().collect::<Vec<_>>(), ["name", "langs"]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordBuilder<'r> {
    registry: &'r ShapeRegistry,
    config: BuilderConfig,
}

impl Default for RecordBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordBuilder<'static> {
    /// A builder backed by the process-wide registry with default configuration.
    pub fn new() -> Self {
        Self::with_registry(ShapeRegistry::global())
    }
}

impl<'r> RecordBuilder<'r> {
    pub fn with_registry(registry: &'r ShapeRegistry) -> Self {
        Self {
            registry,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build any JSON value: maps become records, lists become arrays,
    /// scalars convert directly. A top-level `null` yields `Value::Null`.
    ///
    /// # Errors
    /// Returns the first [`GenerationError`] met anywhere in the tree.
    pub fn build_any(&self, value: &Json) -> std::result::Result<Value, GenerationError> {
        match value {
            Json::Object(map) => self.build_record(map).map(Value::Record),
            Json::Array(list) => self.build_array(list).map(Value::Array),
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => Ok(number_value(n)),
            Json::String(s) => Ok(Value::String(s.clone())),
        }
    }

    /// Build one record from a JSON object, preserving key order.
    pub fn build_record(&self, map: &Map<String, Json>) -> std::result::Result<Record, GenerationError> {
        let mut defs = Vec::with_capacity(map.len());
        let mut values = Vec::with_capacity(map.len());

        for (name, source) in map {
            let value = self.build_any(source)?;
            defs.push(FieldDef::new(name.as_str(), FieldType::of(&value)));
            values.push(value);
        }

        let shape = self.registry.register(defs, &self.config).inspect_err(|err| {
            debug!(error = %err, "shape synthesis rejected");
        })?;
        Ok(Record::instantiate(shape, values))
    }

    /// Build every element of a JSON array, preserving order and length.
    pub fn build_array(&self, list: &[Json]) -> std::result::Result<Vec<Value>, GenerationError> {
        list.iter().map(|item| self.build_any(item)).collect()
    }

    /// Parse a JSON string and build it.
    ///
    /// # Errors
    /// `DynrecError::JsonParse` for malformed input, `DynrecError::Generation`
    /// for a rejected field name.
    pub fn build_str(&self, json: &str) -> Result<Value> {
        let tree: Json = serde_json::from_str(json)?;
        Ok(self.build_any(&tree)?)
    }
}

/// Parse a JSON string and build it with the global registry and default config.
///
/// ```
/// let value = dynrec_core::from_json(r#"{"x": 1}"#).unwrap();
/// assert!(value.as_record().unwrap().has_field("x"));
/// ```
pub fn from_json(json: &str) -> Result<Value> {
    RecordBuilder::new().build_str(json)
}

/// Integers keep an integral type (`i64`, or `u64` past `i64::MAX`); the rest are `f64`.
fn number_value(n: &JsonNumber) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        Value::from(n.as_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use serde_json::json;

    #[test]
    fn numbers_keep_integral_types() {
        assert_eq!(number_value(&JsonNumber::from(5)), Value::Number(Number::I64(5)));
        assert_eq!(
            number_value(&JsonNumber::from(u64::MAX)),
            Value::Number(Number::U64(u64::MAX))
        );
        let half = JsonNumber::from_f64(2.5).unwrap();
        assert_eq!(number_value(&half), Value::Number(Number::F64(2.5)));
    }

    #[test]
    fn nested_failure_returns_no_graph() {
        let registry = ShapeRegistry::new();
        let builder = RecordBuilder::with_registry(&registry);
        let err = builder
            .build_any(&json!({"ok": 1, "inner": {"not valid": true}}))
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidIdentifier {
                name: "not valid".into()
            }
        );
        assert_eq!(registry.live_shapes(), 0);
    }
}
