//! Predicate combinators usable as filter arguments.
//!
//! A [`Comparator`] wraps a predicate (or a literal pattern) together with a
//! tag saying how it applies:
//!
//! - [`ComparatorKind::Value`]: the predicate is applied to the candidate itself.
//! - [`ComparatorKind::All`]: the candidate is a collection; every element must match.
//! - [`ComparatorKind::Contains`]: the candidate is a collection; at least one element must match.
//!
//! Each comparator also declares the element type its predicate accepts. A
//! candidate (or element) of another type never reaches the predicate; the
//! comparator simply reports `false` for it.
//!
//! Comparators are placed inside patterns like any other value:
//!
//! ```
//! use dynrec_core::{from_json, structural_equals, Comparator, Record};
//!
//! let order = from_json(r#"{"id": 7, "tags": ["rush", "gift"]}"#).unwrap();
//! let pattern = Record::from_fields([
//!     ("tags", Comparator::contains(|tag: &str| tag == "gift").into()),
//! ])
//! .unwrap();
//! assert!(structural_equals(&order, &pattern.into()));
//! ```

use crate::equality::structural_equals;
use crate::record::Record;
use crate::value::{EnumValue, Number, NumberKind, Value};
use std::fmt;
use std::sync::Arc;

/// How a comparator applies to its candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorKind {
    Value,
    All,
    Contains,
}

/// The runtime type a comparator's predicate is declared over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Any value at all (predicates over [`Value`], and literal patterns).
    Any,
    Bool,
    Char,
    Number(NumberKind),
    String,
    Enum,
    Record,
    Array,
}

impl TypeTag {
    /// Whether `value`'s runtime type is assignable to this tag. `null` is
    /// only assignable to `Any`.
    pub fn is_assignable_from(self, value: &Value) -> bool {
        match (self, value) {
            (TypeTag::Any, _) => true,
            (TypeTag::Bool, Value::Bool(_)) => true,
            (TypeTag::Char, Value::Char(_)) => true,
            (TypeTag::Number(kind), Value::Number(n)) => n.kind() == kind,
            (TypeTag::String, Value::String(_)) => true,
            (TypeTag::Enum, Value::Enum(_)) => true,
            (TypeTag::Record, Value::Record(_)) => true,
            (TypeTag::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

/// A Rust type a comparator predicate can be written over.
///
/// `extract` returns `None` when the value is not of this type, which is
/// exactly the assignability gate.
pub trait Element: 'static {
    const TAG: TypeTag;

    fn extract(value: &Value) -> Option<&Self>;
}

impl Element for Value {
    const TAG: TypeTag = TypeTag::Any;

    fn extract(value: &Value) -> Option<&Self> {
        Some(value)
    }
}

impl Element for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl Element for char {
    const TAG: TypeTag = TypeTag::Char;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Char(c) => Some(c),
            _ => None,
        }
    }
}

impl Element for str {
    const TAG: TypeTag = TypeTag::String;

    fn extract(value: &Value) -> Option<&Self> {
        value.as_str()
    }
}

impl Element for String {
    const TAG: TypeTag = TypeTag::String;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Element for EnumValue {
    const TAG: TypeTag = TypeTag::Enum;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }
}

impl Element for Record {
    const TAG: TypeTag = TypeTag::Record;

    fn extract(value: &Value) -> Option<&Self> {
        value.as_record()
    }
}

impl Element for Vec<Value> {
    const TAG: TypeTag = TypeTag::Array;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

macro_rules! number_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const TAG: TypeTag = TypeTag::Number(NumberKind::$variant);

                fn extract(value: &Value) -> Option<&Self> {
                    match value {
                        Value::Number(Number::$variant(n)) => Some(n),
                        _ => None,
                    }
                }
            }
        )*
    };
}

number_element! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    isize => Isize, usize => Usize,
    f32 => F32, f64 => F64,
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A tagged predicate wrapper. See the module docs.
#[derive(Clone)]
pub struct Comparator {
    kind: ComparatorKind,
    element: TypeTag,
    predicate: Predicate,
}

impl Comparator {
    /// Match a single value with a typed predicate.
    pub fn value<T, F>(predicate: F) -> Self
    where
        T: Element + ?Sized,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::typed(ComparatorKind::Value, predicate)
    }

    /// Match a collection whose every element satisfies the predicate.
    /// True for an empty collection.
    pub fn all<T, F>(predicate: F) -> Self
    where
        T: Element + ?Sized,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::typed(ComparatorKind::All, predicate)
    }

    /// Match a collection with at least one element satisfying the predicate.
    /// False for an empty collection.
    pub fn contains<T, F>(predicate: F) -> Self
    where
        T: Element + ?Sized,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::typed(ComparatorKind::Contains, predicate)
    }

    /// [`Comparator::value`] with a literal pattern instead of a predicate.
    /// Accepts a candidate of any type; see [`Comparator::value_eq_as`].
    pub fn value_eq(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::Value, TypeTag::Any, pattern.into())
    }

    /// [`Comparator::all`] with a literal pattern instead of a predicate.
    /// Accepts elements of any type; see [`Comparator::all_eq_as`].
    pub fn all_eq(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::All, TypeTag::Any, pattern.into())
    }

    /// [`Comparator::contains`] with a literal pattern instead of a predicate.
    /// Accepts elements of any type; see [`Comparator::contains_eq_as`].
    pub fn contains_eq(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::Contains, TypeTag::Any, pattern.into())
    }

    /// A literal `Value` comparator declared over `T`: candidates of another
    /// type are rejected before the pattern is consulted.
    pub fn value_eq_as<T: Element + ?Sized>(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::Value, T::TAG, pattern.into())
    }

    /// A literal `All` comparator declared over `T`.
    ///
    /// ```
    /// use dynrec_core::{from_json, Comparator};
    ///
    /// let fives = Comparator::all_eq_as::<i64>(5i64);
    /// assert!(fives.apply(&from_json("[5, 5]").unwrap()));
    /// assert!(!fives.apply(&from_json("[5, 5.0]").unwrap()));
    /// ```
    pub fn all_eq_as<T: Element + ?Sized>(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::All, T::TAG, pattern.into())
    }

    /// A literal `Contains` comparator declared over `T`.
    pub fn contains_eq_as<T: Element + ?Sized>(pattern: impl Into<Value>) -> Self {
        Self::literal(ComparatorKind::Contains, T::TAG, pattern.into())
    }

    fn typed<T, F>(kind: ComparatorKind, predicate: F) -> Self
    where
        T: Element + ?Sized,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            kind,
            element: T::TAG,
            predicate: Arc::new(move |value: &Value| T::extract(value).is_some_and(&predicate)),
        }
    }

    fn literal(kind: ComparatorKind, element: TypeTag, pattern: Value) -> Self {
        Self {
            kind,
            element,
            predicate: Arc::new(move |value: &Value| structural_equals(value, &pattern)),
        }
    }

    pub fn kind(&self) -> ComparatorKind {
        self.kind
    }

    /// The element type the predicate was declared over.
    pub fn element_type(&self) -> TypeTag {
        self.element
    }

    /// Apply the predicate to one value, behind the type gate.
    pub fn test(&self, value: &Value) -> bool {
        self.element.is_assignable_from(value) && (self.predicate)(value)
    }

    /// Evaluate this comparator against a candidate according to its kind.
    ///
    /// `All` and `Contains` need a collection: an array, or a string (seen as
    /// a sequence of `char`). Any other candidate yields `false`. Under `All`
    /// a single element of the wrong type fails the whole match; under
    /// `Contains` such elements are skipped.
    pub fn apply(&self, candidate: &Value) -> bool {
        match self.kind {
            ComparatorKind::Value => self.test(candidate),
            ComparatorKind::All => match candidate {
                Value::Array(items) => items.iter().all(|item| self.test(item)),
                Value::String(s) => s.chars().all(|c| self.test(&Value::Char(c))),
                _ => false,
            },
            ComparatorKind::Contains => match candidate {
                Value::Array(items) => items.iter().any(|item| self.test(item)),
                Value::String(s) => s.chars().any(|c| self.test(&Value::Char(c))),
                _ => false,
            },
        }
    }

    /// True if `other` is a clone of this comparator.
    pub fn same_as(&self, other: &Comparator) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("kind", &self.kind)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_blocks_predicate_for_other_types() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let c = Comparator::value(move |_: &i64| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            true
        });
        assert!(!c.apply(&Value::from(5i32)));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        assert!(c.apply(&Value::from(5i64)));
        assert!(called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn null_is_only_assignable_to_any() {
        assert!(TypeTag::Any.is_assignable_from(&Value::Null));
        assert!(!TypeTag::String.is_assignable_from(&Value::Null));
        assert!(!TypeTag::Record.is_assignable_from(&Value::Null));
    }

    #[test]
    fn strings_are_char_collections() {
        let vowels_only = Comparator::all(|c: &char| "aeiou".contains(*c));
        assert!(vowels_only.apply(&Value::from("aei")));
        assert!(!vowels_only.apply(&Value::from("abc")));
        let has_digit = Comparator::contains(|c: &char| c.is_ascii_digit());
        assert!(has_digit.apply(&Value::from("r2d2")));
    }

    #[test]
    fn all_and_contains_reject_non_collections() {
        let any = Comparator::all(|_: &Value| true);
        assert!(!any.apply(&Value::from(1i64)));
        assert!(!any.apply(&Value::Null));
        let some = Comparator::contains(|_: &Value| true);
        assert!(!some.apply(&Value::Bool(true)));
    }

    #[test]
    fn clones_are_the_same_comparator() {
        let c = Comparator::value(|_: &Value| true);
        let d = c.clone();
        let e = Comparator::value(|_: &Value| true);
        assert!(c.same_as(&d));
        assert!(!c.same_as(&e));
    }
}
