//! Builder configuration: which field names may become record members.

/// How strictly field names are checked before they become members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// A letter or `_`, followed by letters, digits or `_` (Unicode letters allowed).
    #[default]
    Strict,
    /// Any non-empty name. Useful for JSON keys such as `"first-name"` or `"@id"`.
    Lenient,
}

impl IdentifierPolicy {
    pub fn accepts(self, name: &str) -> bool {
        match self {
            IdentifierPolicy::Strict => is_identifier(name),
            IdentifierPolicy::Lenient => !name.is_empty(),
        }
    }
}

/// Options shared by every shape a [`crate::RecordBuilder`] synthesizes.
///
/// # Examples
///
/// ```
/// use dynrec_core::{BuilderConfig, IdentifierPolicy};
///
/// let config = BuilderConfig::default()
///     .identifier_policy(IdentifierPolicy::Lenient)
///     .reserve("shape_id");
/// assert!(config.is_reserved("shape_id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    pub identifier_policy: IdentifierPolicy,
    /// Member names no field may define, either directly or through its
    /// generated `get_`/`set_` accessors.
    pub reserved_names: Vec<String>,
}

impl BuilderConfig {
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn reserve(mut self, name: impl Into<String>) -> Self {
        self.reserved_names.push(name.into());
        self
    }

    pub fn is_reserved(&self, member: &str) -> bool {
        self.reserved_names.iter().any(|r| r == member)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_accepts_plain_identifiers() {
        for name in ["a", "_", "name", "first_name", "x1", "_private", "café"] {
            assert!(IdentifierPolicy::Strict.accepts(name), "{name} should be accepted");
        }
    }

    #[test]
    fn strict_rejects_non_identifiers() {
        for name in ["", "1st", "first-name", "@id", "a b", "a.b", "$ref"] {
            assert!(!IdentifierPolicy::Strict.accepts(name), "{name} should be rejected");
        }
    }

    #[test]
    fn lenient_only_rejects_empty() {
        assert!(IdentifierPolicy::Lenient.accepts("first-name"));
        assert!(IdentifierPolicy::Lenient.accepts("@id"));
        assert!(!IdentifierPolicy::Lenient.accepts(""));
    }
}
