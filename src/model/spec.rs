//! Spec types and the spec elements that carry attribute values.

use std::fmt;

use thiserror::Error;

use super::{AttributeDefinition, AttributeValue, Identifiable};

/// The four kinds of spec type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecTypeKind {
    /// Types spec objects.
    SpecObjectType,
    /// Types specifications.
    SpecificationType,
    /// Types spec relations.
    SpecRelationType,
    /// Types relation groups.
    RelationGroupType,
}

impl fmt::Display for SpecTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpecObjectType => "spec-object type",
            Self::SpecificationType => "specification type",
            Self::SpecRelationType => "spec-relation type",
            Self::RelationGroupType => "relation-group type",
        };
        f.write_str(name)
    }
}

/// Error raised when a spec element is pointed at a spec type of the wrong
/// kind.
#[derive(Debug, Clone, Copy, Error)]
#[error("expected a {expected}, got a {actual}")]
pub struct SpecTypeMismatch {
    /// The kind the spec element requires.
    pub expected: SpecTypeKind,
    /// The kind actually supplied.
    pub actual: SpecTypeKind,
}

/// A spec type: an ordered list of attribute definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecType {
    /// Common identity fields.
    pub ident: Identifiable,

    kind: SpecTypeKind,

    /// Attribute definitions, in declaration order.
    pub attributes: Vec<AttributeDefinition>,
}

impl SpecType {
    /// Creates an empty spec type of the given kind.
    #[must_use]
    pub const fn new(ident: Identifiable, kind: SpecTypeKind) -> Self {
        Self {
            ident,
            kind,
            attributes: Vec::new(),
        }
    }

    /// The kind tag of this spec type.
    #[must_use]
    pub const fn kind(&self) -> SpecTypeKind {
        self.kind
    }

    /// Appends an attribute definition, transferring ownership to this type.
    pub fn add_attribute(&mut self, definition: AttributeDefinition) {
        self.attributes.push(definition);
    }

    /// Finds an attribute definition by identifier.
    #[must_use]
    pub fn attribute(&self, identifier: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|a| a.ident.identifier() == identifier)
    }
}

/// The role shared by every element that carries attribute values: an
/// ordered value list plus a spec-type handle.
pub trait SpecElement {
    /// The kind of spec type this element requires.
    const TYPE_KIND: SpecTypeKind;

    /// Common identity fields.
    fn ident(&self) -> &Identifiable;

    /// Identifier of the element's spec type, if set.
    fn type_ref(&self) -> Option<&str>;

    /// The element's attribute values, in declaration order.
    fn values(&self) -> &[AttributeValue];

    /// Mutable access to the element's attribute values.
    fn values_mut(&mut self) -> &mut Vec<AttributeValue>;

    /// Points this element at its spec type.
    ///
    /// # Errors
    ///
    /// Returns [`SpecTypeMismatch`] when the type's kind differs from the
    /// kind this element requires.
    fn set_spec_type(&mut self, spec_type: &SpecType) -> Result<(), SpecTypeMismatch>;
}

macro_rules! spec_element {
    ($entity:ty, $kind:expr) => {
        impl SpecElement for $entity {
            const TYPE_KIND: SpecTypeKind = $kind;

            fn ident(&self) -> &Identifiable {
                &self.ident
            }

            fn type_ref(&self) -> Option<&str> {
                self.type_ref.as_deref()
            }

            fn values(&self) -> &[AttributeValue] {
                &self.values
            }

            fn values_mut(&mut self) -> &mut Vec<AttributeValue> {
                &mut self.values
            }

            fn set_spec_type(&mut self, spec_type: &SpecType) -> Result<(), SpecTypeMismatch> {
                if spec_type.kind() == Self::TYPE_KIND {
                    self.type_ref = Some(spec_type.ident.identifier().to_owned());
                    Ok(())
                } else {
                    Err(SpecTypeMismatch {
                        expected: Self::TYPE_KIND,
                        actual: spec_type.kind(),
                    })
                }
            }
        }
    };
}

/// A requirement artefact: the carrier of actual attribute content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecObject {
    /// Common identity fields.
    pub ident: Identifiable,

    /// Identifier handle to the object's spec type.
    pub(crate) type_ref: Option<String>,

    /// Attribute values, in declaration order.
    pub values: Vec<AttributeValue>,
}

impl SpecObject {
    /// Creates a spec object with no type and no values.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            type_ref: None,
            values: Vec::new(),
        }
    }
}

spec_element!(SpecObject, SpecTypeKind::SpecObjectType);

/// A directed, typed link between two spec objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRelation {
    /// Common identity fields.
    pub ident: Identifiable,

    pub(crate) type_ref: Option<String>,

    /// Attribute values, in declaration order.
    pub values: Vec<AttributeValue>,

    /// Identifier handle to the source spec object.
    pub source: Option<String>,

    /// Identifier handle to the target spec object.
    pub target: Option<String>,
}

impl SpecRelation {
    /// Creates a relation with no type, endpoints or values.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            type_ref: None,
            values: Vec::new(),
            source: None,
            target: None,
        }
    }
}

spec_element!(SpecRelation, SpecTypeKind::SpecRelationType);

/// A document view: an ordered tree of hierarchy nodes over spec objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Specification {
    /// Common identity fields.
    pub ident: Identifiable,

    pub(crate) type_ref: Option<String>,

    /// Attribute values, in declaration order.
    pub values: Vec<AttributeValue>,

    /// Top-level hierarchy nodes, in declaration order.
    pub children: Vec<SpecHierarchy>,
}

impl Specification {
    /// Creates a specification with no type, values or children.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            type_ref: None,
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Depth-first traversal of the content tree.
    ///
    /// Yields each node before its children; children are visited in
    /// declaration order.
    pub fn iter_hierarchy(&self) -> impl Iterator<Item = &SpecHierarchy> {
        HierarchyIter {
            stack: self.children.iter().rev().collect(),
        }
    }
}

spec_element!(Specification, SpecTypeKind::SpecificationType);

/// A node in a specification's content tree.
///
/// References exactly one spec object and owns its child subtrees, so
/// ownership cycles cannot be constructed even when object handles repeat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecHierarchy {
    /// Common identity fields.
    pub ident: Identifiable,

    /// Identifier handle to the referenced spec object.
    pub object: Option<String>,

    /// Child nodes, in declaration order.
    pub children: Vec<SpecHierarchy>,
}

impl SpecHierarchy {
    /// Creates a hierarchy node with no object and no children.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            object: None,
            children: Vec::new(),
        }
    }
}

struct HierarchyIter<'a> {
    stack: Vec<&'a SpecHierarchy>,
}

impl<'a> Iterator for HierarchyIter<'a> {
    type Item = &'a SpecHierarchy;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A typed grouping of spec relations between two specifications.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationGroup {
    /// Common identity fields.
    pub ident: Identifiable,

    pub(crate) type_ref: Option<String>,

    /// Attribute values, in declaration order.
    pub values: Vec<AttributeValue>,

    /// Identifier handle to the source specification.
    pub source_specification: Option<String>,

    /// Identifier handle to the target specification.
    pub target_specification: Option<String>,

    /// Identifier handles to the grouped spec relations, in declaration
    /// order.
    pub spec_relations: Vec<String>,
}

impl RelationGroup {
    /// Creates a relation group with no type, endpoints or relations.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            type_ref: None,
            values: Vec::new(),
            source_specification: None,
            target_specification: None,
            spec_relations: Vec::new(),
        }
    }
}

spec_element!(RelationGroup, SpecTypeKind::RelationGroupType);
