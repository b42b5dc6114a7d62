//! Named view sections: accumulate content now, render it later.
//!
//! A view adds pieces of content to a named section while it is being
//! processed; a layout later renders the whole section at once. Each piece
//! is a closure bound to the page (view model) it was added from, and reads
//! the page's fields by name only.
//!
//! ```
//! use dynrec_core::section::{template, Sections, SectionRenderer};
//! use dynrec_core::from_json;
//!
//! let page = from_json(r#"{"title": "Home", "script": "app.js"}"#).unwrap();
//! let mut sections = Sections::new();
//! sections.add("scripts", &page, template("<script src=\"{script}\"></script>"));
//!
//! let html = sections.section("scripts").unwrap().render();
//! assert_eq!(html, "<script src=\"app.js\"></script>");
//! ```

use crate::error::SectionError;
use crate::value::Value;
use std::collections::HashMap;

/// Deferred content: renders a page into a fragment.
pub type Content = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Something that can be rendered and cleared.
pub trait SectionRenderer {
    fn clear(&mut self);

    /// Render and clear.
    fn render(&mut self) -> String {
        self.render_with(true)
    }

    fn render_with(&mut self, clear: bool) -> String;
}

struct Item {
    page: Value,
    content: Content,
}

/// A section with content.
#[derive(Default)]
pub struct Section {
    items: Vec<Item>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SectionRenderer for Section {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn render_with(&mut self, clear: bool) -> String {
        let out: String = self
            .items
            .iter()
            .map(|item| (item.content)(&item.page))
            .collect();
        if clear {
            self.clear();
        }
        out
    }
}

/// Stand-in for an optional section nobody defined. Always renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySection;

impl SectionRenderer for EmptySection {
    fn clear(&mut self) {}

    fn render_with(&mut self, _clear: bool) -> String {
        String::new()
    }
}

/// All sections of one render pass, keyed by name.
///
/// Owned by the caller for the duration of a request (or any other unit of
/// work) and dropped afterwards; there is no process-wide section state.
#[derive(Default)]
pub struct Sections {
    sections: HashMap<String, Section>,
    empty: EmptySection,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append content to a section, creating the section on first use.
    pub fn add<F>(&mut self, section: &str, page: &Value, content: F)
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.sections
            .entry(section.to_string())
            .or_default()
            .items
            .push(Item {
                page: page.clone(),
                content: Box::new(content),
            });
    }

    /// A section that must exist.
    ///
    /// # Errors
    /// `SectionError::Missing` if nothing was ever added under `name`.
    pub fn section(&mut self, name: &str) -> Result<&mut dyn SectionRenderer, SectionError> {
        self.sections
            .get_mut(name)
            .map(|s| s as &mut dyn SectionRenderer)
            .ok_or_else(|| SectionError::Missing(name.to_string()))
    }

    /// A section that may be missing; missing sections render as nothing.
    pub fn optional(&mut self, name: &str) -> &mut dyn SectionRenderer {
        match self.sections.get_mut(name) {
            Some(section) => section,
            None => &mut self.empty,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}

/// Content from a `{field}` template.
///
/// Placeholders are field names or dotted paths (`{owner.name}`) looked up
/// on the page. Missing fields render as nothing. `{{` and `}}` are literal
/// braces.
pub fn template(source: &str) -> impl Fn(&Value) -> String + Send + Sync + 'static {
    let parts = parse_template(source);
    move |page: &Value| {
        let mut out = String::new();
        for part in &parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Field(path) => {
                    if let Some(value) = page.pointer(path) {
                        if !value.is_null() {
                            out.push_str(&value.to_string());
                        }
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, PartialEq)]
enum Part {
    Text(String),
    Field(String),
}

fn parse_template(source: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if closed {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Field(name.trim().to_string()));
                } else {
                    // Unterminated placeholder: keep it as text.
                    text.push('{');
                    text.push_str(&name);
                }
            }
            other => text.push(other),
        }
    }

    if !text.is_empty() {
        parts.push(Part::Text(text));
    }
    parts
}
