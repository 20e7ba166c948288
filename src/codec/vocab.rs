//! The fixed XML vocabulary of the ReqIF exchange format.
//!
//! Element and attribute names are dictated by the standard and must be
//! reproduced exactly for interoperability.

use crate::model::{DataKind, SpecTypeKind};

pub(crate) const NS_REQIF: &str = "http://www.omg.org/spec/ReqIF/20110401/reqif.xsd";
pub(crate) const NS_XHTML: &str = "http://www.w3.org/1999/xhtml";

pub(crate) const REQ_IF: &str = "REQ-IF";
pub(crate) const THE_HEADER: &str = "THE-HEADER";
pub(crate) const REQ_IF_HEADER: &str = "REQ-IF-HEADER";
pub(crate) const CORE_CONTENT: &str = "CORE-CONTENT";
pub(crate) const REQ_IF_CONTENT: &str = "REQ-IF-CONTENT";
pub(crate) const TOOL_EXTENSIONS: &str = "TOOL-EXTENSIONS";

pub(crate) const COMMENT: &str = "COMMENT";
pub(crate) const CREATION_TIME: &str = "CREATION-TIME";
pub(crate) const REPOSITORY_ID: &str = "REPOSITORY-ID";
pub(crate) const REQ_IF_TOOL_ID: &str = "REQ-IF-TOOL-ID";
pub(crate) const REQ_IF_VERSION: &str = "REQ-IF-VERSION";
pub(crate) const SOURCE_TOOL_ID: &str = "SOURCE-TOOL-ID";
pub(crate) const TITLE: &str = "TITLE";

pub(crate) const DATATYPES: &str = "DATATYPES";
pub(crate) const SPEC_TYPES: &str = "SPEC-TYPES";
pub(crate) const SPEC_OBJECTS: &str = "SPEC-OBJECTS";
pub(crate) const SPEC_RELATIONS: &str = "SPEC-RELATIONS";
pub(crate) const SPECIFICATIONS: &str = "SPECIFICATIONS";
pub(crate) const SPEC_RELATION_GROUPS: &str = "SPEC-RELATION-GROUPS";

pub(crate) const IDENTIFIER: &str = "IDENTIFIER";
pub(crate) const LONG_NAME: &str = "LONG-NAME";
pub(crate) const LAST_CHANGE: &str = "LAST-CHANGE";
pub(crate) const DESC: &str = "DESC";
pub(crate) const ALTERNATIVE_ID: &str = "ALTERNATIVE-ID";

pub(crate) const MIN: &str = "MIN";
pub(crate) const MAX: &str = "MAX";
pub(crate) const ACCURACY: &str = "ACCURACY";
pub(crate) const MAX_LENGTH: &str = "MAX-LENGTH";
pub(crate) const MULTI_VALUED: &str = "MULTI-VALUED";
pub(crate) const IS_SIMPLIFIED: &str = "IS-SIMPLIFIED";
pub(crate) const KEY: &str = "KEY";
pub(crate) const OTHER_CONTENT: &str = "OTHER-CONTENT";

pub(crate) const SPECIFIED_VALUES: &str = "SPECIFIED-VALUES";
pub(crate) const ENUM_VALUE: &str = "ENUM-VALUE";
pub(crate) const ENUM_VALUE_REF: &str = "ENUM-VALUE-REF";
pub(crate) const PROPERTIES: &str = "PROPERTIES";
pub(crate) const EMBEDDED_VALUE: &str = "EMBEDDED-VALUE";

pub(crate) const TYPE: &str = "TYPE";
pub(crate) const DEFINITION: &str = "DEFINITION";
pub(crate) const DEFAULT_VALUE: &str = "DEFAULT-VALUE";
pub(crate) const SPEC_ATTRIBUTES: &str = "SPEC-ATTRIBUTES";
pub(crate) const VALUES: &str = "VALUES";
pub(crate) const THE_VALUE: &str = "THE-VALUE";
pub(crate) const THE_ORIGINAL_VALUE: &str = "THE-ORIGINAL-VALUE";

pub(crate) const SPEC_OBJECT: &str = "SPEC-OBJECT";
pub(crate) const SPEC_OBJECT_REF: &str = "SPEC-OBJECT-REF";
pub(crate) const SPEC_RELATION: &str = "SPEC-RELATION";
pub(crate) const SPEC_RELATION_REF: &str = "SPEC-RELATION-REF";
pub(crate) const SPECIFICATION: &str = "SPECIFICATION";
pub(crate) const SPECIFICATION_REF: &str = "SPECIFICATION-REF";
pub(crate) const SPEC_HIERARCHY: &str = "SPEC-HIERARCHY";
pub(crate) const CHILDREN: &str = "CHILDREN";
pub(crate) const OBJECT: &str = "OBJECT";
pub(crate) const SOURCE: &str = "SOURCE";
pub(crate) const TARGET: &str = "TARGET";
pub(crate) const RELATION_GROUP: &str = "RELATION-GROUP";
pub(crate) const SOURCE_SPECIFICATION: &str = "SOURCE-SPECIFICATION";
pub(crate) const TARGET_SPECIFICATION: &str = "TARGET-SPECIFICATION";

pub(crate) const XHTML_OBJECT: &str = "object";
pub(crate) const XHTML_DATA: &str = "data";
pub(crate) const XHTML_TYPE: &str = "type";
pub(crate) const XHTML_HEIGHT: &str = "height";
pub(crate) const XHTML_WIDTH: &str = "width";

impl DataKind {
    /// `DATATYPE-DEFINITION-*` element name for this kind.
    pub(crate) const fn datatype_element(self) -> &'static str {
        match self {
            Self::Boolean => "DATATYPE-DEFINITION-BOOLEAN",
            Self::Date => "DATATYPE-DEFINITION-DATE",
            Self::Enumeration => "DATATYPE-DEFINITION-ENUMERATION",
            Self::Integer => "DATATYPE-DEFINITION-INTEGER",
            Self::Real => "DATATYPE-DEFINITION-REAL",
            Self::String => "DATATYPE-DEFINITION-STRING",
            Self::Xhtml => "DATATYPE-DEFINITION-XHTML",
        }
    }

    /// `DATATYPE-DEFINITION-*-REF` element name for this kind.
    pub(crate) const fn datatype_ref_element(self) -> &'static str {
        match self {
            Self::Boolean => "DATATYPE-DEFINITION-BOOLEAN-REF",
            Self::Date => "DATATYPE-DEFINITION-DATE-REF",
            Self::Enumeration => "DATATYPE-DEFINITION-ENUMERATION-REF",
            Self::Integer => "DATATYPE-DEFINITION-INTEGER-REF",
            Self::Real => "DATATYPE-DEFINITION-REAL-REF",
            Self::String => "DATATYPE-DEFINITION-STRING-REF",
            Self::Xhtml => "DATATYPE-DEFINITION-XHTML-REF",
        }
    }

    /// `ATTRIBUTE-DEFINITION-*` element name for this kind.
    pub(crate) const fn definition_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-DEFINITION-BOOLEAN",
            Self::Date => "ATTRIBUTE-DEFINITION-DATE",
            Self::Enumeration => "ATTRIBUTE-DEFINITION-ENUMERATION",
            Self::Integer => "ATTRIBUTE-DEFINITION-INTEGER",
            Self::Real => "ATTRIBUTE-DEFINITION-REAL",
            Self::String => "ATTRIBUTE-DEFINITION-STRING",
            Self::Xhtml => "ATTRIBUTE-DEFINITION-XHTML",
        }
    }

    /// `ATTRIBUTE-DEFINITION-*-REF` element name for this kind.
    pub(crate) const fn definition_ref_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-DEFINITION-BOOLEAN-REF",
            Self::Date => "ATTRIBUTE-DEFINITION-DATE-REF",
            Self::Enumeration => "ATTRIBUTE-DEFINITION-ENUMERATION-REF",
            Self::Integer => "ATTRIBUTE-DEFINITION-INTEGER-REF",
            Self::Real => "ATTRIBUTE-DEFINITION-REAL-REF",
            Self::String => "ATTRIBUTE-DEFINITION-STRING-REF",
            Self::Xhtml => "ATTRIBUTE-DEFINITION-XHTML-REF",
        }
    }

    /// `ATTRIBUTE-VALUE-*` element name for this kind.
    pub(crate) const fn value_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-VALUE-BOOLEAN",
            Self::Date => "ATTRIBUTE-VALUE-DATE",
            Self::Enumeration => "ATTRIBUTE-VALUE-ENUMERATION",
            Self::Integer => "ATTRIBUTE-VALUE-INTEGER",
            Self::Real => "ATTRIBUTE-VALUE-REAL",
            Self::String => "ATTRIBUTE-VALUE-STRING",
            Self::Xhtml => "ATTRIBUTE-VALUE-XHTML",
        }
    }

    /// Maps a `DATATYPE-DEFINITION-*` local name back to its kind.
    pub(crate) fn from_datatype_element(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.datatype_element().as_bytes() == name)
    }

    /// Maps an `ATTRIBUTE-DEFINITION-*` local name back to its kind.
    pub(crate) fn from_definition_element(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.definition_element().as_bytes() == name)
    }

    /// Maps an `ATTRIBUTE-VALUE-*` local name back to its kind.
    pub(crate) fn from_value_element(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.value_element().as_bytes() == name)
    }
}

impl SpecTypeKind {
    /// Element name of this spec-type kind.
    pub(crate) const fn element(self) -> &'static str {
        match self {
            Self::SpecObjectType => "SPEC-OBJECT-TYPE",
            Self::SpecificationType => "SPECIFICATION-TYPE",
            Self::SpecRelationType => "SPEC-RELATION-TYPE",
            Self::RelationGroupType => "RELATION-GROUP-TYPE",
        }
    }

    /// `*-REF` element name of this spec-type kind.
    pub(crate) const fn ref_element(self) -> &'static str {
        match self {
            Self::SpecObjectType => "SPEC-OBJECT-TYPE-REF",
            Self::SpecificationType => "SPECIFICATION-TYPE-REF",
            Self::SpecRelationType => "SPEC-RELATION-TYPE-REF",
            Self::RelationGroupType => "RELATION-GROUP-TYPE-REF",
        }
    }

    /// Maps a spec-type element local name back to its kind.
    pub(crate) fn from_element(name: &[u8]) -> Option<Self> {
        [
            Self::SpecObjectType,
            Self::SpecificationType,
            Self::SpecRelationType,
            Self::RelationGroupType,
        ]
        .into_iter()
        .find(|kind| kind.element().as_bytes() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_names_round_trip_through_kind_lookup() {
        for kind in DataKind::ALL {
            assert_eq!(
                DataKind::from_datatype_element(kind.datatype_element().as_bytes()),
                Some(kind)
            );
            assert_eq!(
                DataKind::from_definition_element(kind.definition_element().as_bytes()),
                Some(kind)
            );
            assert_eq!(
                DataKind::from_value_element(kind.value_element().as_bytes()),
                Some(kind)
            );
        }
    }

    #[test]
    fn unknown_element_names_map_to_none() {
        assert!(DataKind::from_datatype_element(b"DATATYPE-DEFINITION-COLOUR").is_none());
        assert!(SpecTypeKind::from_element(b"SPEC-TYPE").is_none());
    }
}
