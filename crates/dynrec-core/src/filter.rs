//! Filter a sequence of values by a pattern or a comparator.
//!
//! The filter is lazy: it wraps the input iterator and yields matching
//! elements in their original order. It is finite when the input is, and
//! it can be cloned (and so re-iterated) when the input iterator can.

use crate::combinator::{Comparator, ComparatorKind};
use crate::equality::structural_equals;
use crate::value::Value;
use std::borrow::Borrow;
use tracing::trace;

/// How each element is tested, decided once when the filter is created.
#[derive(Debug, Clone, Copy)]
enum Mode<'p> {
    /// A bare `All`/`Contains` comparator. An element its declared type
    /// accepts is handed to the predicate whole; any other element is
    /// compared structurally, which treats it as a collection.
    Direct(&'p Comparator),
    /// Anything else: keep elements structurally equal to the pattern.
    Pattern,
}

/// Iterator returned by [`filter`] and [`FilterExt::filter_by`].
#[derive(Debug, Clone)]
pub struct Filter<'p, I> {
    iter: I,
    arg: &'p Value,
    mode: Mode<'p>,
}

impl<'p, I> Filter<'p, I> {
    fn new(iter: I, arg: &'p Value) -> Self {
        let mode = match arg {
            Value::Comparator(c) if c.kind() != ComparatorKind::Value => Mode::Direct(c),
            _ => Mode::Pattern,
        };
        Self { iter, arg, mode }
    }

    fn keep(&self, item: &Value) -> bool {
        let keep = match self.mode {
            Mode::Direct(comparator) if comparator.element_type().is_assignable_from(item) => {
                comparator.test(item)
            }
            Mode::Direct(_) | Mode::Pattern => structural_equals(item, self.arg),
        };
        trace!(keep, item = item.type_name(), "filter decision");
        keep
    }
}

impl<I> Iterator for Filter<'_, I>
where
    I: Iterator,
    I::Item: Borrow<Value>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.iter.next()?;
            if self.keep(item.borrow()) {
                return Some(item);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

/// Keep the elements of `items` that match `arg`.
///
/// `arg` is usually a pattern, checked with [`structural_equals`]. A bare
/// `All`/`Contains` comparator is special: an element whose runtime type its
/// declared element type accepts is passed to the predicate directly, and
/// every other element goes through [`structural_equals`], where the
/// comparator iterates it as a collection.
///
/// # Examples
///
/// ```
/// use dynrec_core::{filter, from_json, Comparator, Record};
///
/// let rows = from_json(r#"[{"x": 1}, {"x": 2}, {"x": 3}]"#).unwrap();
/// let pattern = Record::from_fields([
///     ("x", Comparator::value(|x: &i64| *x > 1).into()),
/// ])
/// .unwrap()
/// .into();
///
/// let kept: Vec<_> = filter(rows.as_array().unwrap(), &pattern).collect();
/// assert_eq!(kept.len(), 2);
/// ```
pub fn filter<'p, I>(items: I, arg: &'p Value) -> Filter<'p, I::IntoIter>
where
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    Filter::new(items.into_iter(), arg)
}

/// Method-style [`filter`] on any iterator of values.
pub trait FilterExt: Iterator + Sized
where
    Self::Item: Borrow<Value>,
{
    fn filter_by(self, arg: &Value) -> Filter<'_, Self> {
        Filter::new(self, arg)
    }
}

impl<I> FilterExt for I
where
    I: Iterator,
    I::Item: Borrow<Value>,
{
}
