//! Attribute definitions and attribute values.
//!
//! Both families mirror the seven data kinds. A definition references its
//! data type and a value references its definition by identifier handle;
//! the only validation performed at mutation time is that the kinds of the
//! two sides match. Whether the referenced element actually exists is the
//! resolver's concern during parsing, not the model's.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use super::{DataKind, DatatypeDefinition, Identifiable};
use crate::payload::ExternalObject;

/// Error raised when a reference of one data kind is pointed at an element
/// of another.
///
/// This is a programming error, not a data error: the codec never produces
/// mismatched pairs, so hitting this outside of direct model manipulation
/// indicates a bug in the caller.
#[derive(Debug, Clone, Copy, Error)]
#[error("expected a {expected} reference, got {actual}")]
pub struct TypeMismatch {
    /// The kind the receiving element requires.
    pub expected: DataKind,
    /// The kind of the element actually supplied.
    pub actual: DataKind,
}

/// An attribute definition, owned by exactly one spec type.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Common identity fields.
    pub ident: Identifiable,

    kind: DataKind,
    datatype_ref: Option<String>,
    default_value: Option<Box<AttributeValue>>,

    /// Whether an enumeration attribute may select more than one value.
    ///
    /// Meaningless (and ignored by the codec) for every other kind.
    pub multi_valued: bool,
}

impl AttributeDefinition {
    /// Creates a definition of the given kind with no data-type reference.
    #[must_use]
    pub const fn new(ident: Identifiable, kind: DataKind) -> Self {
        Self {
            ident,
            kind,
            datatype_ref: None,
            default_value: None,
            multi_valued: false,
        }
    }

    /// The kind tag of this definition.
    #[must_use]
    pub const fn kind(&self) -> DataKind {
        self.kind
    }

    /// Identifier of the referenced data-type definition, if set.
    #[must_use]
    pub fn datatype_ref(&self) -> Option<&str> {
        self.datatype_ref.as_deref()
    }

    /// Points this definition at its data type.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] when the data type's kind differs from this
    /// definition's kind.
    pub fn set_datatype(&mut self, datatype: &DatatypeDefinition) -> Result<(), TypeMismatch> {
        if datatype.kind() == self.kind {
            self.datatype_ref = Some(datatype.ident.identifier().to_owned());
            Ok(())
        } else {
            Err(TypeMismatch {
                expected: self.kind,
                actual: datatype.kind(),
            })
        }
    }

    /// Sets the data-type handle without an existence or kind check.
    ///
    /// Reserved for the codec, which validates through the resolver instead.
    pub(crate) fn set_datatype_ref(&mut self, identifier: impl Into<String>) {
        self.datatype_ref = Some(identifier.into());
    }

    /// The default value of this definition, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_deref()
    }

    /// Sets the default value.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] when the value's kind differs from this
    /// definition's kind.
    pub fn set_default_value(&mut self, value: AttributeValue) -> Result<(), TypeMismatch> {
        if value.kind() == self.kind {
            self.default_value = Some(Box::new(value));
            Ok(())
        } else {
            Err(TypeMismatch {
                expected: self.kind,
                actual: value.kind(),
            })
        }
    }
}

/// An attribute value, owned by exactly one spec element.
///
/// Values carry no identity of their own; they are addressed through their
/// owner and typed through their definition.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    definition_ref: Option<String>,

    /// Kind-specific payload.
    pub content: AttributeValueContent,
}

/// Kind-specific payload of an [`AttributeValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValueContent {
    /// A boolean payload.
    Boolean(bool),
    /// A timestamp payload.
    Date(DateTime<FixedOffset>),
    /// Identifiers of the selected enumeration values, in selection order.
    Enumeration(Vec<String>),
    /// A 64-bit integer payload.
    Integer(i64),
    /// A double-precision payload.
    Real(f64),
    /// A plain-string payload.
    String(String),
    /// Raw XHTML markup plus anything extracted from it.
    Xhtml(XhtmlContent),
}

/// The payload of an XHTML attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XhtmlContent {
    /// The raw inner markup, kept opaque apart from the embedded-object scan.
    pub value: String,

    /// Pre-simplification markup, present when a tool simplified the value.
    pub original_value: Option<String>,

    /// Whether `value` is the simplified form of `original_value`.
    pub is_simplified: bool,

    /// Embedded binary-object references found in `value`, in document order.
    pub external_objects: Vec<ExternalObject>,
}

impl AttributeValue {
    /// Creates a value with the given payload and no definition reference.
    #[must_use]
    pub const fn new(content: AttributeValueContent) -> Self {
        Self {
            definition_ref: None,
            content,
        }
    }

    /// The kind tag of this value.
    #[must_use]
    pub const fn kind(&self) -> DataKind {
        match self.content {
            AttributeValueContent::Boolean(_) => DataKind::Boolean,
            AttributeValueContent::Date(_) => DataKind::Date,
            AttributeValueContent::Enumeration(_) => DataKind::Enumeration,
            AttributeValueContent::Integer(_) => DataKind::Integer,
            AttributeValueContent::Real(_) => DataKind::Real,
            AttributeValueContent::String(_) => DataKind::String,
            AttributeValueContent::Xhtml(_) => DataKind::Xhtml,
        }
    }

    /// Identifier of the referenced attribute definition, if set.
    #[must_use]
    pub fn definition_ref(&self) -> Option<&str> {
        self.definition_ref.as_deref()
    }

    /// Points this value at its definition.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] when the definition's kind differs from this
    /// value's kind.
    pub fn set_definition(&mut self, definition: &AttributeDefinition) -> Result<(), TypeMismatch> {
        if definition.kind() == self.kind() {
            self.definition_ref = Some(definition.ident.identifier().to_owned());
            Ok(())
        } else {
            Err(TypeMismatch {
                expected: self.kind(),
                actual: definition.kind(),
            })
        }
    }

    /// Sets the definition handle without an existence or kind check.
    ///
    /// Reserved for the codec, which validates through the resolver instead.
    pub(crate) fn set_definition_ref(&mut self, identifier: impl Into<String>) {
        self.definition_ref = Some(identifier.into());
    }

    /// The XHTML payload, when this is an XHTML value.
    #[must_use]
    pub const fn xhtml(&self) -> Option<&XhtmlContent> {
        match &self.content {
            AttributeValueContent::Xhtml(xhtml) => Some(xhtml),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datatype(kind: DataKind) -> DatatypeDefinition {
        DatatypeDefinition::new(Identifiable::new(format!("dt-{kind}")), kind)
    }

    fn value(kind: DataKind) -> AttributeValue {
        let content = match kind {
            DataKind::Boolean => AttributeValueContent::Boolean(true),
            DataKind::Date => AttributeValueContent::Date(
                DateTime::parse_from_rfc3339("2026-01-02T03:04:05+01:00").unwrap(),
            ),
            DataKind::Enumeration => AttributeValueContent::Enumeration(vec![]),
            DataKind::Integer => AttributeValueContent::Integer(42),
            DataKind::Real => AttributeValueContent::Real(4.2),
            DataKind::String => AttributeValueContent::String("forty-two".to_owned()),
            DataKind::Xhtml => AttributeValueContent::Xhtml(XhtmlContent::default()),
        };
        AttributeValue::new(content)
    }

    #[test]
    fn matching_datatype_is_accepted() {
        for kind in DataKind::ALL {
            let mut definition = AttributeDefinition::new(Identifiable::new("ad"), kind);
            definition.set_datatype(&datatype(kind)).unwrap();
            assert_eq!(definition.datatype_ref(), Some(format!("dt-{kind}").as_str()));
        }
    }

    #[test]
    fn mismatched_datatype_is_rejected_for_every_pair() {
        for expected in DataKind::ALL {
            for actual in DataKind::ALL {
                if expected == actual {
                    continue;
                }
                let mut definition = AttributeDefinition::new(Identifiable::new("ad"), expected);
                let err = definition.set_datatype(&datatype(actual)).unwrap_err();
                assert_eq!(err.expected, expected);
                assert_eq!(err.actual, actual);
                assert!(definition.datatype_ref().is_none());
            }
        }
    }

    #[test]
    fn mismatched_definition_is_rejected_for_every_pair() {
        for expected in DataKind::ALL {
            for actual in DataKind::ALL {
                if expected == actual {
                    continue;
                }
                let definition = AttributeDefinition::new(Identifiable::new("ad"), actual);
                let mut val = value(expected);
                let err = val.set_definition(&definition).unwrap_err();
                assert_eq!(err.expected, expected);
                assert_eq!(err.actual, actual);
            }
        }
    }

    #[test]
    fn mismatched_default_value_is_rejected() {
        let mut definition =
            AttributeDefinition::new(Identifiable::new("ad"), DataKind::Boolean);
        assert!(definition.set_default_value(value(DataKind::Integer)).is_err());
        definition.set_default_value(value(DataKind::Boolean)).unwrap();
        assert!(definition.default_value().is_some());
    }
}
