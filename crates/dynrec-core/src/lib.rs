//! # dynrec-core
//!
//! Typed records from schema-less data, built at runtime, plus an engine to
//! compare and filter them by structure.
//!
//! Any JSON document becomes a graph of [`Record`]s (one freshly synthesized
//! shape per object, fields in source order), [`Value::Array`]s and scalars.
//! Those values can then be matched against *patterns*: partial records whose
//! fields are literals or [`Comparator`]s.
//!
//! ## Quick start
//!
//! ```rust
//! use dynrec_core::{filter, from_json, Comparator, Record};
//!
//! let people = from_json(r#"[
//!     {"name": "Ada", "age": 36, "langs": ["en", "fr"]},
//!     {"name": "Alan", "age": 41, "langs": ["en"]},
//!     {"name": "Grace", "age": 29, "langs": ["en", "es"]}
//! ]"#).unwrap();
//!
//! let pattern = Record::from_fields([
//!     ("age", Comparator::value(|age: &i64| *age > 30).into()),
//!     ("langs", Comparator::contains(|lang: &str| lang == "fr").into()),
//! ])
//! .unwrap()
//! .into();
//!
//! let names: Vec<String> = filter(people.as_array().unwrap(), &pattern)
//!     .map(|person| person.pointer("name").unwrap().to_string())
//!     .collect();
//! assert_eq!(names, ["Ada"]);
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: JSON value tree → record graph (`RecordBuilder`, `from_json`)
//! - [`registry`]: shapes, field types and the shape identity registry
//! - [`record`]: record instances with name-based get/set
//! - [`value`]: the dynamic `Value` model
//! - [`combinator`]: `Value` / `All` / `Contains` comparators
//! - [`equality`]: asymmetric structural equality
//! - [`filter`]: lazy pattern filtering over sequences
//! - [`section`]: keyed accumulate-and-render view sections
//! - [`config`]: builder configuration
//! - [`error`]: error types

pub mod builder;
pub mod combinator;
pub mod config;
pub mod equality;
pub mod error;
pub mod filter;
pub mod record;
pub mod registry;
pub mod section;
pub mod value;

pub use builder::{from_json, RecordBuilder};
pub use combinator::{Comparator, ComparatorKind, Element, TypeTag};
pub use config::{BuilderConfig, IdentifierPolicy};
pub use equality::structural_equals;
pub use error::{DynrecError, GenerationError, RecordError, SectionError};
pub use filter::{filter, Filter, FilterExt};
pub use record::Record;
pub use registry::{Accessor, FieldDef, FieldType, Shape, ShapeId, ShapeRegistry};
pub use value::{EnumValue, Number, NumberKind, Value};
