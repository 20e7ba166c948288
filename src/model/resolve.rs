//! Reference resolution over a content container.
//!
//! Every lookup answers "the unique element of this collection whose
//! identifier equals the given string". Zero matches and multiple matches
//! both yield `None`; it is the caller's decision whether a missing
//! reference is tolerable (a definition's data type is logged and left
//! unset) or fatal (a value's definition, without which the value cannot be
//! typed or formatted).

use super::{
    AttributeDefinition, DataKind, DatatypeDefinition, EnumValue, ReqIfContent, SpecObject,
    SpecRelation, SpecType, SpecTypeKind, Specification,
};

fn unique<T>(mut matches: impl Iterator<Item = T>) -> Option<T> {
    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}

impl ReqIfContent {
    /// Finds the unique data-type definition with the given identifier.
    #[must_use]
    pub fn find_datatype(&self, identifier: &str) -> Option<&DatatypeDefinition> {
        unique(
            self.datatypes
                .iter()
                .filter(|d| d.ident.identifier() == identifier),
        )
    }

    /// Finds the unique data-type definition with the given identifier and
    /// kind.
    #[must_use]
    pub fn find_datatype_of_kind(
        &self,
        identifier: &str,
        kind: DataKind,
    ) -> Option<&DatatypeDefinition> {
        self.find_datatype(identifier).filter(|d| d.kind() == kind)
    }

    /// Finds the unique spec type with the given identifier and kind.
    #[must_use]
    pub fn find_spec_type(&self, identifier: &str, kind: SpecTypeKind) -> Option<&SpecType> {
        unique(
            self.spec_types
                .iter()
                .filter(|t| t.ident.identifier() == identifier),
        )
        .filter(|t| t.kind() == kind)
    }

    /// Finds the unique spec object with the given identifier.
    #[must_use]
    pub fn find_spec_object(&self, identifier: &str) -> Option<&SpecObject> {
        unique(
            self.spec_objects
                .iter()
                .filter(|o| o.ident.identifier() == identifier),
        )
    }

    /// Finds the unique spec relation with the given identifier.
    #[must_use]
    pub fn find_spec_relation(&self, identifier: &str) -> Option<&SpecRelation> {
        unique(
            self.spec_relations
                .iter()
                .filter(|r| r.ident.identifier() == identifier),
        )
    }

    /// Finds the unique specification with the given identifier.
    #[must_use]
    pub fn find_specification(&self, identifier: &str) -> Option<&Specification> {
        unique(
            self.specifications
                .iter()
                .filter(|s| s.ident.identifier() == identifier),
        )
    }

    /// Finds the unique attribute definition with the given identifier and
    /// kind, searching the attribute lists of every spec type.
    #[must_use]
    pub fn find_attribute_definition(
        &self,
        identifier: &str,
        kind: DataKind,
    ) -> Option<&AttributeDefinition> {
        unique(
            self.spec_types
                .iter()
                .flat_map(|t| t.attributes.iter())
                .filter(|a| a.ident.identifier() == identifier),
        )
        .filter(|a| a.kind() == kind)
    }

    /// Finds the unique enumeration value with the given identifier,
    /// searching every enumeration data type.
    #[must_use]
    pub fn find_enum_value(&self, identifier: &str) -> Option<&EnumValue> {
        unique(
            self.datatypes
                .iter()
                .flat_map(|d| d.enum_values().iter())
                .filter(|v| v.ident.identifier() == identifier),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifiable;

    fn content_with_datatypes(ids: &[&str]) -> ReqIfContent {
        let mut content = ReqIfContent::default();
        for id in ids {
            content.datatypes.push(DatatypeDefinition::new(
                Identifiable::new(*id),
                DataKind::Integer,
            ));
        }
        content
    }

    #[test]
    fn missing_identifier_resolves_to_none() {
        let content = content_with_datatypes(&["dt-1"]);
        assert!(content.find_datatype("dt-2").is_none());
    }

    #[test]
    fn duplicate_identifiers_resolve_to_none() {
        let content = content_with_datatypes(&["dt-1", "dt-1"]);
        assert!(content.find_datatype("dt-1").is_none());
    }

    #[test]
    fn kind_filter_applies_after_identity() {
        let content = content_with_datatypes(&["dt-1"]);
        assert!(content
            .find_datatype_of_kind("dt-1", DataKind::Integer)
            .is_some());
        assert!(content
            .find_datatype_of_kind("dt-1", DataKind::Boolean)
            .is_none());
    }

    #[test]
    fn attribute_definitions_resolve_across_spec_types() {
        use crate::model::{AttributeDefinition, SpecType, SpecTypeKind};

        let mut content = ReqIfContent::default();
        let mut spec_type =
            SpecType::new(Identifiable::new("st"), SpecTypeKind::SpecObjectType);
        spec_type.add_attribute(AttributeDefinition::new(
            Identifiable::new("ad"),
            DataKind::String,
        ));
        content.spec_types.push(spec_type);

        assert!(content
            .find_attribute_definition("ad", DataKind::String)
            .is_some());
        assert!(content
            .find_attribute_definition("ad", DataKind::Boolean)
            .is_none());
    }
}
