//! In-memory document model for ReqIF.
//!
//! The model holds the graph of typed, cross-referencing elements that make
//! up a ReqIF document. Cross-references between elements are identifier
//! handles resolved against the owning [`ReqIfContent`] container, never
//! direct object references, so the container remains the sole owner of
//! every element.

/// Common identity fields shared by every first-class ReqIF element.
pub mod identifiable;
pub use identifiable::{AlternativeId, Identifiable};

/// The seven-variant data-type definition family.
pub mod datatype;
pub use datatype::{DataKind, DatatypeContent, DatatypeDefinition, EmbeddedValue, EnumValue};

/// Attribute definitions and attribute values.
pub mod attribute;
pub use attribute::{
    AttributeDefinition, AttributeValue, AttributeValueContent, TypeMismatch, XhtmlContent,
};

/// Spec elements: types, objects, relations, specifications and hierarchies.
pub mod spec;
pub use spec::{
    RelationGroup, SpecElement, SpecHierarchy, SpecObject, SpecRelation, SpecType, SpecTypeKind,
    SpecTypeMismatch, Specification,
};

mod content;
pub use content::{ReqIf, ReqIfContent, ReqIfHeader};

mod resolve;
