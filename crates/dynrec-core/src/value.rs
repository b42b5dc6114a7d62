//! The dynamic value model: scalars, records, arrays and filter-only values.
//!
//! `Value` is what the builder produces and what equality and filtering
//! consume. Numbers keep their concrete machine type (`i32` and `i64` are
//! different variants) so that cross-type comparison rules can be applied
//! explicitly rather than by accident of representation.

use crate::combinator::Comparator;
use crate::record::Record;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// The concrete machine type of a [`Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Isize,
    Usize,
    F32,
    F64,
}

impl NumberKind {
    pub fn is_float(self) -> bool {
        matches!(self, NumberKind::F32 | NumberKind::F64)
    }

    /// `isize` / `usize`: never equal to a number of any other kind.
    pub fn is_pointer_sized(self) -> bool {
        matches!(self, NumberKind::Isize | NumberKind::Usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumberKind::I8 => "i8",
            NumberKind::I16 => "i16",
            NumberKind::I32 => "i32",
            NumberKind::I64 => "i64",
            NumberKind::U8 => "u8",
            NumberKind::U16 => "u16",
            NumberKind::U32 => "u32",
            NumberKind::U64 => "u64",
            NumberKind::Isize => "isize",
            NumberKind::Usize => "usize",
            NumberKind::F32 => "f32",
            NumberKind::F64 => "f64",
        }
    }

    /// Narrow an integer into this kind. `None` on overflow or when this
    /// kind is floating-point.
    fn cast(self, n: i128) -> Option<Number> {
        Some(match self {
            NumberKind::I8 => Number::I8(i8::try_from(n).ok()?),
            NumberKind::I16 => Number::I16(i16::try_from(n).ok()?),
            NumberKind::I32 => Number::I32(i32::try_from(n).ok()?),
            NumberKind::I64 => Number::I64(i64::try_from(n).ok()?),
            NumberKind::U8 => Number::U8(u8::try_from(n).ok()?),
            NumberKind::U16 => Number::U16(u16::try_from(n).ok()?),
            NumberKind::U32 => Number::U32(u32::try_from(n).ok()?),
            NumberKind::U64 => Number::U64(u64::try_from(n).ok()?),
            NumberKind::Isize => Number::Isize(isize::try_from(n).ok()?),
            NumberKind::Usize => Number::Usize(usize::try_from(n).ok()?),
            NumberKind::F32 | NumberKind::F64 => return None,
        })
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A number tagged with its machine type.
///
/// The derived `PartialEq` is "native" equality: `I32(5) != I64(5)`. Use
/// [`crate::structural_equals`] for cross-type comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Isize(isize),
    Usize(usize),
    F32(f32),
    F64(f64),
}

impl Number {
    pub fn kind(self) -> NumberKind {
        match self {
            Number::I8(_) => NumberKind::I8,
            Number::I16(_) => NumberKind::I16,
            Number::I32(_) => NumberKind::I32,
            Number::I64(_) => NumberKind::I64,
            Number::U8(_) => NumberKind::U8,
            Number::U16(_) => NumberKind::U16,
            Number::U32(_) => NumberKind::U32,
            Number::U64(_) => NumberKind::U64,
            Number::Isize(_) => NumberKind::Isize,
            Number::Usize(_) => NumberKind::Usize,
            Number::F32(_) => NumberKind::F32,
            Number::F64(_) => NumberKind::F64,
        }
    }

    pub fn is_float(self) -> bool {
        self.kind().is_float()
    }

    /// Widen to `f64`. Lossy for integers beyond 2^53.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::I8(n) => n as f64,
            Number::I16(n) => n as f64,
            Number::I32(n) => n as f64,
            Number::I64(n) => n as f64,
            Number::U8(n) => n as f64,
            Number::U16(n) => n as f64,
            Number::U32(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::Isize(n) => n as f64,
            Number::Usize(n) => n as f64,
            Number::F32(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// The exact integer value, or `None` for floating-point numbers.
    pub fn as_i128(self) -> Option<i128> {
        Some(match self {
            Number::I8(n) => n.into(),
            Number::I16(n) => n.into(),
            Number::I32(n) => n.into(),
            Number::I64(n) => n.into(),
            Number::U8(n) => n.into(),
            Number::U16(n) => n.into(),
            Number::U32(n) => n.into(),
            Number::U64(n) => n.into(),
            Number::Isize(n) => n as i128,
            Number::Usize(n) => n as i128,
            Number::F32(_) | Number::F64(_) => return None,
        })
    }

    /// Convert an integer into another integer kind, `None` if it does not fit.
    pub fn convert(self, kind: NumberKind) -> Option<Number> {
        kind.cast(self.as_i128()?)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I8(n) => write!(f, "{n}"),
            Number::I16(n) => write!(f, "{n}"),
            Number::I32(n) => write!(f, "{n}"),
            Number::I64(n) => write!(f, "{n}"),
            Number::U8(n) => write!(f, "{n}"),
            Number::U16(n) => write!(f, "{n}"),
            Number::U32(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::Isize(n) => write!(f, "{n}"),
            Number::Usize(n) => write!(f, "{n}"),
            Number::F32(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

/// A value of an enumerated type: a variant name plus its underlying integer code.
///
/// Compared by code: `EnumValue::new("Pending", 0)` equals the literal `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    name: String,
    code: Number,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, code: impl Into<Number>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Number {
        self.code
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Number(Number),
    String(String),
    Enum(EnumValue),
    Record(Record),
    Array(Vec<Value>),
    /// A predicate wrapper; only meaningful on the pattern side of a comparison.
    Comparator(Comparator),
    /// An opaque query expression. Expression patterns are not supported and
    /// never match anything, themselves included.
    Expression(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Booleans, characters and numbers.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Char(_) | Value::Number(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Follow a dotted path (`"owner.name"`) through nested records.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |current, segment| current.as_record()?.get(segment))
    }

    /// Short, human-readable name of the variant (used in error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Number(n) => n.kind().name(),
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
            Value::Comparator(_) => "comparator",
            Value::Expression(_) => "expression",
        }
    }
}

/// Native equality: same variant and same contents.
///
/// Records are natively equal only when they share a shape id, which in
/// practice means one is a clone of the other. Comparators are equal only
/// to clones of themselves. Expressions are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Comparator(a), Value::Comparator(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Scalars print bare; records and arrays print as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Enum(e) => f.write_str(e.name()),
            Value::Record(_) | Value::Array(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
            Value::Comparator(c) => write!(f, "{c:?}"),
            Value::Expression(source) => write!(f, "<expression {source}>"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Number(n) => match *n {
                Number::I8(v) => serializer.serialize_i8(v),
                Number::I16(v) => serializer.serialize_i16(v),
                Number::I32(v) => serializer.serialize_i32(v),
                Number::I64(v) => serializer.serialize_i64(v),
                Number::U8(v) => serializer.serialize_u8(v),
                Number::U16(v) => serializer.serialize_u16(v),
                Number::U32(v) => serializer.serialize_u32(v),
                Number::U64(v) => serializer.serialize_u64(v),
                Number::Isize(v) => serializer.serialize_i64(v as i64),
                Number::Usize(v) => serializer.serialize_u64(v as u64),
                Number::F32(v) => serializer.serialize_f32(v),
                Number::F64(v) => serializer.serialize_f64(v),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Enum(e) => serializer.serialize_str(e.name()),
            Value::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (name, value) in record.fields() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Comparator(_) => Err(S::Error::custom("comparators cannot be serialized")),
            Value::Expression(_) => Err(S::Error::custom("expressions cannot be serialized")),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n)
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::$variant(n))
                }
            }
        )*
    };
}

number_from! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    isize => Isize, usize => Usize,
    f32 => F32, f64 => F64,
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Comparator> for Value {
    fn from(c: Comparator) -> Self {
        Value::Comparator(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
