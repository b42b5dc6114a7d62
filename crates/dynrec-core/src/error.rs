//! Error types for record synthesis, record access and section rendering.
//!
//! Filtering and structural equality never fail: type mismatches, unsupported
//! patterns and numeric overflow all resolve to `false`. Only shape synthesis
//! and explicit field mutation surface errors.

use crate::registry::{FieldType, ShapeId};
use thiserror::Error;

/// A field name could not be turned into a record member.
///
/// Raised while a shape is being synthesized. The enclosing build call is
/// aborted and no part of the record graph is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The name is not usable as an accessor identifier.
    #[error("invalid field name {name:?}: not a valid accessor identifier")]
    InvalidIdentifier { name: String },

    /// The name (or one of its accessors) is on the reserved list.
    #[error("field name {name:?} collides with reserved member {member:?}")]
    Reserved { name: String, member: String },

    /// The same field name appears twice in one record.
    #[error("duplicate field name {name:?}")]
    DuplicateField { name: String },

    /// Two fields generate the same member name, e.g. `x` (whose getter is
    /// `get_x`) next to a field literally named `get_x`.
    #[error("member {member:?} is defined by both field {first:?} and field {second:?}")]
    AccessorCollision {
        member: String,
        first: String,
        second: String,
    },
}

/// Errors from reading or writing fields of an already-built record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("{shape} has no field named {name:?}")]
    UnknownField { name: String, shape: ShapeId },

    #[error("field {name:?} is declared as {expected}, cannot assign {actual}")]
    TypeMismatch {
        name: String,
        expected: FieldType,
        actual: &'static str,
    },
}

/// Errors from the view-section helper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("section {0:?} is required but was never defined")]
    Missing(String),
}

/// Errors for the text-in entry points that parse JSON before building.
#[derive(Error, Debug)]
pub enum DynrecError {
    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The JSON parsed, but a record shape could not be synthesized from it.
    #[error("record generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Convenience alias used by the text-in entry points.
pub type Result<T> = std::result::Result<T, DynrecError>;
