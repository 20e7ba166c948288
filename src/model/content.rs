//! The document root, its header and the content container.

use chrono::{DateTime, FixedOffset};

use super::{
    DatatypeDefinition, RelationGroup, SpecObject, SpecRelation, SpecType, Specification,
};

/// A complete ReqIF document: one header and one content container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReqIf {
    /// Document language, carried on the root element.
    pub lang: Option<String>,

    /// Exchange metadata.
    pub header: ReqIfHeader,

    /// The document's element graph.
    pub content: ReqIfContent,
}

/// Exchange metadata of a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReqIfHeader {
    /// Unique identifier of this exchange document.
    pub identifier: String,

    /// Free-text comment from the exporting tool.
    pub comment: Option<String>,

    /// When the document was created.
    pub creation_time: Option<DateTime<FixedOffset>>,

    /// Identifier of the repository the document was exported from.
    pub repository_id: Option<String>,

    /// The tool that wrote the ReqIF file.
    pub req_if_tool_id: Option<String>,

    /// Version of the ReqIF standard the document conforms to.
    pub req_if_version: Option<String>,

    /// The tool the requirements originate from.
    pub source_tool_id: Option<String>,

    /// Document title.
    pub title: Option<String>,
}

impl ReqIfHeader {
    /// Creates a header with the given document identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

/// The container owning every element of one document.
///
/// All six collections are insertion-ordered and their iteration order is
/// preserved on every round trip; ordering is semantically meaningful for
/// hierarchy children, enumeration values and attribute lists. All
/// cross-references among the collections resolve within this container
/// only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReqIfContent {
    /// Data-type definitions, in declaration order.
    pub datatypes: Vec<DatatypeDefinition>,

    /// Spec types of all four kinds, in declaration order.
    pub spec_types: Vec<SpecType>,

    /// Spec objects, in declaration order.
    pub spec_objects: Vec<SpecObject>,

    /// Spec relations, in declaration order.
    pub spec_relations: Vec<SpecRelation>,

    /// Specifications, in declaration order.
    pub specifications: Vec<Specification>,

    /// Relation groups, in declaration order.
    pub relation_groups: Vec<RelationGroup>,
}

impl ReqIf {
    /// Creates an empty document with the given header identifier.
    #[must_use]
    pub fn new(header_identifier: impl Into<String>) -> Self {
        Self {
            lang: None,
            header: ReqIfHeader::new(header_identifier),
            content: ReqIfContent::default(),
        }
    }
}

impl ReqIfContent {
    /// True when the container holds no elements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
            && self.spec_types.is_empty()
            && self.spec_objects.is_empty()
            && self.spec_relations.is_empty()
            && self.specifications.is_empty()
            && self.relation_groups.is_empty()
    }
}

/// Convenience constructor used in tests and examples.
impl From<ReqIfHeader> for ReqIf {
    fn from(header: ReqIfHeader) -> Self {
        Self {
            lang: None,
            header,
            content: ReqIfContent::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataKind, Identifiable};

    #[test]
    fn empty_container_reports_empty() {
        let content = ReqIfContent::default();
        assert!(content.is_empty());
    }

    #[test]
    fn container_preserves_insertion_order() {
        let mut content = ReqIfContent::default();
        for id in ["b", "a", "c"] {
            content.datatypes.push(DatatypeDefinition::new(
                Identifiable::new(id),
                DataKind::Boolean,
            ));
        }
        let ids: Vec<_> = content
            .datatypes
            .iter()
            .map(|d| d.ident.identifier())
            .collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert!(!content.is_empty());
    }
}
