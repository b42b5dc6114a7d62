//! Structural equality between a candidate value and a pattern.
//!
//! The comparison is asymmetric. The right-hand side is a *pattern*: it
//! decides which fields matter, and may carry comparators in place of
//! literals. A candidate with extra fields still matches a pattern that
//! names only some of them.
//!
//! Rules, applied in order; the first one that decides wins:
//!
//! 1. A comparator pattern is evaluated against the candidate.
//! 2. `null` equals only `null`.
//! 3. Enumerated values are replaced by their underlying integer code.
//! 4. Natively equal values (same variant, same contents) are equal.
//! 5. Primitive candidates (bool, char, number): bool, char and pointer-sized
//!    numbers never equal a value of another type. If either side is a
//!    float, both are compared as `f64` (NaN equals nothing). Otherwise the
//!    pattern is converted to the candidate's integer type, or the other way
//!    round if that overflows. Both overflowing means unequal.
//! 6. Everything else: strings and expression patterns are unequal; a record
//!    pattern matches when every one of its fields exists on the candidate
//!    and matches recursively; array patterns match arrays of the same
//!    length element by element.
//! 7. Otherwise unequal.
//!
//! None of this can fail. Mismatches of any kind are simply `false`.

use crate::record::Record;
use crate::value::{Number, Value};
use std::borrow::Cow;
use tracing::warn;

/// Decide whether `left` (the candidate) matches `right` (the pattern).
///
/// # Examples
///
/// ```
/// use dynrec_core::{from_json, structural_equals};
///
/// let candidate = from_json(r#"{"a": 1, "b": 2}"#).unwrap();
/// let pattern = from_json(r#"{"a": 1}"#).unwrap();
/// assert!(structural_equals(&candidate, &pattern));
/// assert!(!structural_equals(&pattern, &candidate));
/// ```
pub fn structural_equals(left: &Value, right: &Value) -> bool {
    if let Value::Comparator(comparator) = right {
        return comparator.apply(left);
    }

    match (left, right) {
        (Value::Null, Value::Null) => return true,
        (Value::Null, _) | (_, Value::Null) => return false,
        _ => {}
    }

    let left = normalize(left);
    let right = normalize(right);

    if *left == *right {
        return true;
    }

    if left.is_primitive() {
        primitive_equals(&left, &right)
    } else {
        object_equals(&left, &right)
    }
}

/// Enumerated values compare by their underlying code.
fn normalize(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Enum(e) => Cow::Owned(Value::Number(e.code())),
        other => Cow::Borrowed(other),
    }
}

fn primitive_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => numbers_equal(*l, *r),
        // bool and char only ever match themselves, which step 4 already covered.
        _ => false,
    }
}

fn numbers_equal(left: Number, right: Number) -> bool {
    if left.kind().is_pointer_sized() || right.kind().is_pointer_sized() {
        return false;
    }

    if left.is_float() || right.is_float() {
        return left.as_f64() == right.as_f64();
    }

    match right.convert(left.kind()) {
        Some(converted) => converted == left,
        None => left
            .convert(right.kind())
            .is_some_and(|converted| converted == right),
    }
}

fn object_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(_), _) | (_, Value::String(_)) => false,
        (_, Value::Expression(source)) => {
            warn!(expression = %source, "expression patterns are not supported; treating as no match");
            false
        }
        (Value::Record(_) | Value::Array(_), Value::Record(pattern)) => {
            fields_match(left, pattern)
        }
        (Value::Array(items), Value::Array(patterns)) => {
            items.len() == patterns.len()
                && items
                    .iter()
                    .zip(patterns)
                    .all(|(item, pattern)| structural_equals(item, pattern))
        }
        _ => false,
    }
}

/// Every field the pattern exposes must exist on the candidate and match.
/// A pattern with no fields matches any record or array candidate.
fn fields_match(candidate: &Value, pattern: &Record) -> bool {
    pattern.fields().all(|(name, expected)| {
        match candidate.as_record().and_then(|record| record.get(name)) {
            Some(actual) => structural_equals(actual, expected),
            None => false,
        }
    })
}
