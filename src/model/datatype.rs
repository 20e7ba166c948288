//! Data-type definitions.
//!
//! ReqIF has exactly seven kinds of data type. The set is closed, so the
//! variant payload is a tagged enum ([`DatatypeContent`]) rather than an
//! open subclass hierarchy, and every dispatch on it is exhaustive.

use std::fmt;

use super::Identifiable;

/// The seven data kinds of the ReqIF type system.
///
/// The same tag classifies data-type definitions, attribute definitions and
/// attribute values; a definition or value of kind `K` may only ever
/// reference a peer of kind `K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// `true` / `false`.
    Boolean,
    /// Timestamp with explicit UTC offset.
    Date,
    /// Closed, ordered set of named values.
    Enumeration,
    /// 64-bit signed integer.
    Integer,
    /// Double-precision real.
    Real,
    /// Plain string with an optional maximum length.
    String,
    /// Raw XHTML markup.
    Xhtml,
}

impl DataKind {
    /// All seven kinds, in the order the standard lists them.
    pub const ALL: [Self; 7] = [
        Self::Boolean,
        Self::Date,
        Self::Enumeration,
        Self::Integer,
        Self::Real,
        Self::String,
        Self::Xhtml,
    ];
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enumeration => "enumeration",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
            Self::Xhtml => "xhtml",
        };
        f.write_str(name)
    }
}

/// A data-type definition.
///
/// The kind is fixed at construction and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DatatypeDefinition {
    /// Common identity fields.
    pub ident: Identifiable,

    /// Kind-specific payload.
    pub content: DatatypeContent,
}

/// Kind-specific payload of a [`DatatypeDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub enum DatatypeContent {
    /// No further constraints.
    Boolean,
    /// No further constraints.
    Date,
    /// The ordered set of permitted values.
    Enumeration {
        /// Permitted values, in declaration order.
        values: Vec<EnumValue>,
    },
    /// 64-bit signed integer domain.
    Integer {
        /// Lower bound, inclusive.
        min: Option<i64>,
        /// Upper bound, inclusive.
        max: Option<i64>,
    },
    /// Double-precision real domain.
    Real {
        /// Lower bound, inclusive.
        min: Option<f64>,
        /// Upper bound, inclusive.
        max: Option<f64>,
        /// Number of significant digits.
        accuracy: Option<u64>,
    },
    /// String domain.
    String {
        /// Maximum permitted length.
        max_length: Option<u64>,
    },
    /// Raw XHTML markup; no further constraints.
    Xhtml,
}

impl DatatypeDefinition {
    /// Creates a definition of the given kind with empty constraints.
    #[must_use]
    pub const fn new(ident: Identifiable, kind: DataKind) -> Self {
        let content = match kind {
            DataKind::Boolean => DatatypeContent::Boolean,
            DataKind::Date => DatatypeContent::Date,
            DataKind::Enumeration => DatatypeContent::Enumeration { values: Vec::new() },
            DataKind::Integer => DatatypeContent::Integer {
                min: None,
                max: None,
            },
            DataKind::Real => DatatypeContent::Real {
                min: None,
                max: None,
                accuracy: None,
            },
            DataKind::String => DatatypeContent::String { max_length: None },
            DataKind::Xhtml => DatatypeContent::Xhtml,
        };
        Self { ident, content }
    }

    /// The kind tag of this definition.
    #[must_use]
    pub const fn kind(&self) -> DataKind {
        match self.content {
            DatatypeContent::Boolean => DataKind::Boolean,
            DatatypeContent::Date => DataKind::Date,
            DatatypeContent::Enumeration { .. } => DataKind::Enumeration,
            DatatypeContent::Integer { .. } => DataKind::Integer,
            DatatypeContent::Real { .. } => DataKind::Real,
            DatatypeContent::String { .. } => DataKind::String,
            DatatypeContent::Xhtml => DataKind::Xhtml,
        }
    }

    /// The permitted values of an enumeration definition.
    ///
    /// Empty for every other kind.
    #[must_use]
    pub fn enum_values(&self) -> &[EnumValue] {
        match &self.content {
            DatatypeContent::Enumeration { values } => values,
            _ => &[],
        }
    }
}

/// One permitted value of an enumeration data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Common identity fields.
    pub ident: Identifiable,

    /// The embedded key/content pair carried by this value.
    pub properties: Option<EmbeddedValue>,
}

impl EnumValue {
    /// Creates an enumeration value without embedded properties.
    #[must_use]
    pub const fn new(ident: Identifiable) -> Self {
        Self {
            ident,
            properties: None,
        }
    }
}

/// The key/content pair embedded in an [`EnumValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedValue {
    /// Numeric key of the value.
    pub key: i64,

    /// Tool-specific companion content.
    pub other_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_fixed_at_construction() {
        for kind in DataKind::ALL {
            let definition = DatatypeDefinition::new(Identifiable::new("dt"), kind);
            assert_eq!(definition.kind(), kind);
        }
    }

    #[test]
    fn enum_values_empty_for_scalar_kinds() {
        let definition = DatatypeDefinition::new(Identifiable::new("dt"), DataKind::Integer);
        assert!(definition.enum_values().is_empty());
    }

    #[test]
    fn enumeration_preserves_value_order() {
        let mut definition =
            DatatypeDefinition::new(Identifiable::new("dt"), DataKind::Enumeration);
        if let DatatypeContent::Enumeration { values } = &mut definition.content {
            values.push(EnumValue::new(Identifiable::new("low")));
            values.push(EnumValue::new(Identifiable::new("high")));
        }
        let ids: Vec<_> = definition
            .enum_values()
            .iter()
            .map(|v| v.ident.identifier())
            .collect();
        assert_eq!(ids, ["low", "high"]);
    }
}
