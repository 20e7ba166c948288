//! Identity fields common to all first-class ReqIF elements.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// The identity block every first-class ReqIF element carries.
///
/// The identifier is mandatory and unique within one document; everything
/// else is optional metadata. Identity equality within a document is by
/// identifier string, which is why cross-references elsewhere in the model
/// are stored as identifier handles rather than object references.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identifiable {
    identifier: String,

    /// Human-readable name of the element.
    pub long_name: Option<String>,

    /// When the element was last changed, with its original UTC offset.
    pub last_change: Option<DateTime<FixedOffset>>,

    /// Free-text description.
    pub desc: Option<String>,

    /// Optional secondary identifier attached by an exchange partner.
    pub alternative_id: Option<AlternativeId>,
}

impl Identifiable {
    /// Creates an identity block with the given identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Creates an identity block with a freshly generated identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("_{}", Uuid::new_v4()))
    }

    /// The element's unique identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// A secondary identifier attachable to any identifiable element.
///
/// Created on demand and owned 1:1 by its element, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeId {
    /// The secondary identifier string.
    pub identifier: String,
}

impl AlternativeId {
    /// Creates an alternative identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identifiers_are_unique() {
        let a = Identifiable::generate();
        let b = Identifiable::generate();
        assert_ne!(a.identifier(), b.identifier());
        assert!(a.identifier().starts_with('_'));
    }

    #[test]
    fn optional_fields_default_to_none() {
        let ident = Identifiable::new("id-1");
        assert_eq!(ident.identifier(), "id-1");
        assert!(ident.long_name.is_none());
        assert!(ident.last_change.is_none());
        assert!(ident.desc.is_none());
        assert!(ident.alternative_id.is_none());
    }
}
