//! Readers and writers for attribute definitions and attribute values.
//!
//! Definitions and values are the asymmetric half of the resolver policy:
//! a definition whose data type cannot be resolved is logged and left
//! unset, while a value whose definition cannot be resolved is a hard
//! parse error, because without its definition a value cannot be typed or
//! formatted.

use std::io::{BufRead, Write};

use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::{
    Error, XmlSink, XmlSource, attrs_to_map, local_name, primitive, push_identifiable_attrs,
    read_alternative_id, read_identifiable, vocab, write_alternative_id, xhtml,
};
use crate::model::{
    AttributeDefinition, AttributeValue, AttributeValueContent, DataKind, ReqIfContent,
    XhtmlContent,
};

/// Reads the single `*-REF` child of a wrapper element such as `TYPE` or
/// `DEFINITION`, returning the referenced identifier.
pub(crate) fn read_single_ref<R: BufRead>(
    src: &mut XmlSource<R>,
) -> Result<Option<String>, Error> {
    let mut identifier = None;
    loop {
        match src.next()? {
            Event::Start(_) => {
                let text = src.read_text()?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    identifier = Some(trimmed.to_owned());
                }
            }
            Event::End(_) => return Ok(identifier),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one `ATTRIBUTE-DEFINITION-*` element of the given kind.
///
/// The data-type reference is resolved against the container parsed so
/// far; an unresolvable reference is logged at trace level and left unset.
pub(crate) fn read_definition<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    kind: DataKind,
    content: &ReqIfContent,
) -> Result<AttributeDefinition, Error> {
    let attrs = attrs_to_map(e)?;
    let ident = read_identifiable(kind.definition_element(), &attrs)?;
    let mut definition = AttributeDefinition::new(ident, kind);

    if kind == DataKind::Enumeration {
        definition.multi_valued = attrs
            .get(vocab::MULTI_VALUED)
            .map(|t| primitive::parse_bool(vocab::MULTI_VALUED, t))
            .transpose()?
            .unwrap_or(false);
    }

    if !has_children {
        return Ok(definition);
    }

    let enclosing = (definition.ident.identifier().to_owned(), kind);
    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    definition.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::TYPE.as_bytes() => {
                    if let Some(reference) = read_single_ref(src)? {
                        if content.find_datatype_of_kind(&reference, kind).is_some() {
                            definition.set_datatype_ref(reference);
                        } else {
                            trace!(
                                definition = definition.ident.identifier(),
                                reference,
                                "data-type reference did not resolve, leaving unset"
                            );
                        }
                    }
                }
                name if name == vocab::DEFAULT_VALUE.as_bytes() => {
                    if let Some(value) = read_default_value(src, kind, content, &enclosing)? {
                        // Cannot mismatch: the nested read only accepts the
                        // definition's own kind.
                        definition
                            .set_default_value(value)
                            .map_err(|_| Error::UnexpectedElement {
                                name: vocab::DEFAULT_VALUE.to_owned(),
                            })?;
                    }
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized attribute-definition child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(definition),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads the value element nested inside `DEFAULT-VALUE`.
///
/// The nested read is scoped to its own subtree so the outer child
/// iteration position is undisturbed.
fn read_default_value<R: BufRead>(
    src: &mut XmlSource<R>,
    kind: DataKind,
    content: &ReqIfContent,
    enclosing: &(String, DataKind),
) -> Result<Option<AttributeValue>, Error> {
    let mut value = None;
    loop {
        match src.next()? {
            Event::Start(e) => {
                let value_kind = DataKind::from_value_element(local_name(e.name().as_ref()));
                if value_kind == Some(kind) {
                    value = Some(read_value(src, &e, true, kind, content, Some(enclosing))?);
                } else {
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unrecognized element in DEFAULT-VALUE"
                    );
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                let value_kind = DataKind::from_value_element(local_name(e.name().as_ref()));
                if value_kind == Some(kind) {
                    value = Some(read_value(src, &e, false, kind, content, Some(enclosing))?);
                }
            }
            Event::End(_) => return Ok(value),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one `ATTRIBUTE-VALUE-*` element of the given kind.
///
/// `enclosing` names the attribute definition currently being read, so a
/// default value may reference its own enclosing definition before that
/// definition is registered in the container.
///
/// # Errors
///
/// Unlike every other reference in the format, a value's definition
/// reference that cannot be resolved is a hard error.
pub(crate) fn read_value<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    kind: DataKind,
    content: &ReqIfContent,
    enclosing: Option<&(String, DataKind)>,
) -> Result<AttributeValue, Error> {
    let attrs = attrs_to_map(e)?;
    let element = kind.value_element();

    let scalar = |field: &'static str| -> Result<&String, Error> {
        attrs.get(field).ok_or(Error::MissingAttribute {
            element,
            attribute: field,
        })
    };

    let value_content = match kind {
        DataKind::Boolean => AttributeValueContent::Boolean(primitive::parse_bool(
            vocab::THE_VALUE,
            scalar(vocab::THE_VALUE)?,
        )?),
        DataKind::Date => AttributeValueContent::Date(primitive::parse_date(
            vocab::THE_VALUE,
            scalar(vocab::THE_VALUE)?,
        )?),
        DataKind::Integer => AttributeValueContent::Integer(primitive::parse_i64_value(
            vocab::THE_VALUE,
            scalar(vocab::THE_VALUE)?,
        )?),
        DataKind::Real => AttributeValueContent::Real(primitive::parse_f64_value(
            vocab::THE_VALUE,
            scalar(vocab::THE_VALUE)?,
        )?),
        DataKind::String => {
            AttributeValueContent::String(scalar(vocab::THE_VALUE)?.clone())
        }
        DataKind::Enumeration => AttributeValueContent::Enumeration(Vec::new()),
        DataKind::Xhtml => AttributeValueContent::Xhtml(XhtmlContent {
            is_simplified: attrs
                .get(vocab::IS_SIMPLIFIED)
                .map(|t| primitive::parse_bool(vocab::IS_SIMPLIFIED, t))
                .transpose()?
                .unwrap_or(false),
            ..XhtmlContent::default()
        }),
    };
    let mut value = AttributeValue::new(value_content);

    if has_children {
        loop {
            match src.next()? {
                Event::Start(child) => match local_name(child.name().as_ref()) {
                    name if name == vocab::DEFINITION.as_bytes() => {
                        if let Some(reference) = read_single_ref(src)? {
                            resolve_definition(&mut value, reference, kind, content, enclosing)?;
                        }
                    }
                    name if name == vocab::VALUES.as_bytes() => {
                        let selected = read_enum_refs(src, content)?;
                        if let AttributeValueContent::Enumeration(slot) = &mut value.content {
                            *slot = selected;
                        } else {
                            trace!(element, "ignoring VALUES on a non-enumeration value");
                        }
                    }
                    name if name == vocab::THE_VALUE.as_bytes() => {
                        let markup = src.read_raw_inner()?;
                        if let AttributeValueContent::Xhtml(xhtml_content) = &mut value.content {
                            xhtml_content.external_objects =
                                xhtml::scan_external_objects(&markup)?;
                            xhtml_content.value = markup;
                        } else {
                            trace!(element, "ignoring THE-VALUE child on a scalar value");
                        }
                    }
                    name if name == vocab::THE_ORIGINAL_VALUE.as_bytes() => {
                        let markup = src.read_raw_inner()?;
                        if let AttributeValueContent::Xhtml(xhtml_content) = &mut value.content {
                            xhtml_content.original_value = Some(markup);
                        }
                    }
                    other => {
                        trace!(
                            element = %String::from_utf8_lossy(other),
                            "ignoring unrecognized attribute-value child"
                        );
                        src.skip_subtree()?;
                    }
                },
                Event::Empty(_) => {}
                Event::End(_) => break,
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
        }
    }

    if value.definition_ref().is_none() {
        // A default value may omit the reference to its enclosing
        // definition; a free-standing value may not.
        if let Some((identifier, enclosing_kind)) = enclosing {
            if *enclosing_kind == kind {
                value.set_definition_ref(identifier.clone());
            }
        }
    }
    if value.definition_ref().is_none() {
        return Err(Error::MissingReference {
            element: element.to_owned(),
            reference: vocab::DEFINITION,
        });
    }

    Ok(value)
}

fn resolve_definition(
    value: &mut AttributeValue,
    reference: String,
    kind: DataKind,
    content: &ReqIfContent,
    enclosing: Option<&(String, DataKind)>,
) -> Result<(), Error> {
    let matches_enclosing =
        enclosing.is_some_and(|(identifier, enclosing_kind)| {
            *identifier == reference && *enclosing_kind == kind
        });
    if matches_enclosing || content.find_attribute_definition(&reference, kind).is_some() {
        value.set_definition_ref(reference);
        Ok(())
    } else {
        Err(Error::MissingReference {
            element: kind.value_element().to_owned(),
            reference: vocab::DEFINITION,
        })
    }
}

fn read_enum_refs<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &ReqIfContent,
) -> Result<Vec<String>, Error> {
    let mut selected = Vec::new();
    loop {
        match src.next()? {
            Event::Start(e) => {
                let is_ref = local_name(e.name().as_ref()) == vocab::ENUM_VALUE_REF.as_bytes();
                let text = src.read_text()?;
                let trimmed = text.trim();
                if is_ref && !trimmed.is_empty() {
                    if content.find_enum_value(trimmed).is_none() {
                        trace!(
                            reference = trimmed,
                            "enum value reference did not resolve, keeping identifier"
                        );
                    }
                    selected.push(trimmed.to_owned());
                }
            }
            Event::End(_) => return Ok(selected),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Writes one `ATTRIBUTE-DEFINITION-*` element.
///
/// # Errors
///
/// Refuses to serialize a definition whose data-type reference is unset;
/// the exchange format requires every attribute/data-type pairing to be
/// explicit.
pub(crate) fn write_definition<W: Write>(
    sink: &mut XmlSink<W>,
    definition: &AttributeDefinition,
) -> Result<(), Error> {
    let kind = definition.kind();
    let Some(datatype_ref) = definition.datatype_ref() else {
        return Err(Error::MissingReference {
            element: definition.ident.identifier().to_owned(),
            reference: vocab::TYPE,
        });
    };

    let name = kind.definition_element();
    let mut start = BytesStart::new(name);
    push_identifiable_attrs(&mut start, &definition.ident);
    if kind == DataKind::Enumeration {
        start.push_attribute((
            vocab::MULTI_VALUED,
            primitive::format_bool(definition.multi_valued),
        ));
    }
    sink.start(start)?;

    write_alternative_id(sink, &definition.ident)?;

    if let Some(default) = definition.default_value() {
        sink.start(BytesStart::new(vocab::DEFAULT_VALUE))?;
        write_value(sink, default)?;
        sink.end(vocab::DEFAULT_VALUE)?;
    }

    sink.start(BytesStart::new(vocab::TYPE))?;
    sink.simple(kind.datatype_ref_element(), datatype_ref)?;
    sink.end(vocab::TYPE)?;

    sink.end(name)
}

/// Writes one `ATTRIBUTE-VALUE-*` element.
///
/// # Errors
///
/// Refuses to serialize a value whose definition reference is unset, for
/// the same conformance reason as definitions.
pub(crate) fn write_value<W: Write>(
    sink: &mut XmlSink<W>,
    value: &AttributeValue,
) -> Result<(), Error> {
    let kind = value.kind();
    let element = kind.value_element();
    let Some(definition_ref) = value.definition_ref() else {
        return Err(Error::MissingReference {
            element: element.to_owned(),
            reference: vocab::DEFINITION,
        });
    };

    let mut start = BytesStart::new(element);
    match &value.content {
        AttributeValueContent::Boolean(b) => {
            start.push_attribute((vocab::THE_VALUE, primitive::format_bool(*b)));
        }
        AttributeValueContent::Date(d) => {
            start.push_attribute((vocab::THE_VALUE, primitive::format_date(d).as_str()));
        }
        AttributeValueContent::Integer(i) => {
            start.push_attribute((vocab::THE_VALUE, primitive::format_i64(*i).as_str()));
        }
        AttributeValueContent::Real(r) => {
            start.push_attribute((vocab::THE_VALUE, primitive::format_f64(*r).as_str()));
        }
        AttributeValueContent::String(s) => {
            start.push_attribute((vocab::THE_VALUE, s.as_str()));
        }
        AttributeValueContent::Xhtml(xhtml_content) => {
            if xhtml_content.is_simplified {
                start.push_attribute((vocab::IS_SIMPLIFIED, primitive::format_bool(true)));
            }
        }
        AttributeValueContent::Enumeration(_) => {}
    }
    sink.start(start)?;

    sink.start(BytesStart::new(vocab::DEFINITION))?;
    sink.simple(kind.definition_ref_element(), definition_ref)?;
    sink.end(vocab::DEFINITION)?;

    match &value.content {
        AttributeValueContent::Enumeration(selected) => {
            sink.start(BytesStart::new(vocab::VALUES))?;
            for identifier in selected {
                sink.simple(vocab::ENUM_VALUE_REF, identifier)?;
            }
            sink.end(vocab::VALUES)?;
        }
        AttributeValueContent::Xhtml(xhtml_content) => {
            if let Some(original) = &xhtml_content.original_value {
                sink.start(BytesStart::new(vocab::THE_ORIGINAL_VALUE))?;
                sink.raw(original)?;
                sink.end(vocab::THE_ORIGINAL_VALUE)?;
            }
            sink.start(BytesStart::new(vocab::THE_VALUE))?;
            sink.raw(&xhtml_content.value)?;
            sink.end(vocab::THE_VALUE)?;
        }
        _ => {}
    }

    sink.end(element)
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::model::{DatatypeDefinition, Identifiable, SpecType, SpecTypeKind};

    fn content_with_datatype(id: &str, kind: DataKind) -> ReqIfContent {
        let mut content = ReqIfContent::default();
        content
            .datatypes
            .push(DatatypeDefinition::new(Identifiable::new(id), kind));
        content
    }

    fn parse_definition(xml: &str, kind: DataKind, content: &ReqIfContent) -> AttributeDefinition {
        let mut src = XmlSource::new(xml.as_bytes(), CancellationToken::new());
        match src.next().unwrap() {
            Event::Start(e) => read_definition(&mut src, &e, true, kind, content).unwrap(),
            Event::Empty(e) => read_definition(&mut src, &e, false, kind, content).unwrap(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn parse_value(
        xml: &str,
        kind: DataKind,
        content: &ReqIfContent,
    ) -> Result<AttributeValue, Error> {
        let mut src = XmlSource::new(xml.as_bytes(), CancellationToken::new());
        match src.next().unwrap() {
            Event::Start(e) => read_value(&mut src, &e, true, kind, content, None),
            Event::Empty(e) => read_value(&mut src, &e, false, kind, content, None),
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn content_with_definition(
        datatype_id: &str,
        definition_id: &str,
        kind: DataKind,
    ) -> ReqIfContent {
        let mut content = content_with_datatype(datatype_id, kind);
        let mut spec_type = SpecType::new(Identifiable::new("st"), SpecTypeKind::SpecObjectType);
        let mut definition = AttributeDefinition::new(Identifiable::new(definition_id), kind);
        definition.set_datatype_ref(datatype_id);
        spec_type.add_attribute(definition);
        content.spec_types.push(spec_type);
        content
    }

    #[test]
    fn definition_resolves_its_datatype() {
        let content = content_with_datatype("dt-bool", DataKind::Boolean);
        let xml = concat!(
            r#"<ATTRIBUTE-DEFINITION-BOOLEAN IDENTIFIER="ad-bool" LONG-NAME="Reviewed">"#,
            r#"<TYPE><DATATYPE-DEFINITION-BOOLEAN-REF>dt-bool</DATATYPE-DEFINITION-BOOLEAN-REF></TYPE>"#,
            r#"</ATTRIBUTE-DEFINITION-BOOLEAN>"#,
        );
        let definition = parse_definition(xml, DataKind::Boolean, &content);
        assert_eq!(definition.datatype_ref(), Some("dt-bool"));
    }

    #[test]
    fn unresolvable_datatype_is_left_unset_not_fatal() {
        let content = ReqIfContent::default();
        let xml = concat!(
            r#"<ATTRIBUTE-DEFINITION-BOOLEAN IDENTIFIER="ad-bool">"#,
            r#"<TYPE><DATATYPE-DEFINITION-BOOLEAN-REF>missing</DATATYPE-DEFINITION-BOOLEAN-REF></TYPE>"#,
            r#"</ATTRIBUTE-DEFINITION-BOOLEAN>"#,
        );
        let definition = parse_definition(xml, DataKind::Boolean, &content);
        assert!(definition.datatype_ref().is_none());
    }

    #[test]
    fn unresolvable_value_definition_is_fatal() {
        let content = ReqIfContent::default();
        let xml = concat!(
            r#"<ATTRIBUTE-VALUE-INTEGER THE-VALUE="5">"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-INTEGER-REF>missing</ATTRIBUTE-DEFINITION-INTEGER-REF></DEFINITION>"#,
            r#"</ATTRIBUTE-VALUE-INTEGER>"#,
        );
        let err = parse_value(xml, DataKind::Integer, &content).unwrap_err();
        assert!(matches!(err, Error::MissingReference { .. }));
    }

    #[test]
    fn overflowing_value_content_becomes_zero() {
        let content = content_with_definition("dt-int", "ad-int", DataKind::Integer);
        let xml = concat!(
            r#"<ATTRIBUTE-VALUE-INTEGER THE-VALUE="9223372036854775808">"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-INTEGER-REF>ad-int</ATTRIBUTE-DEFINITION-INTEGER-REF></DEFINITION>"#,
            r#"</ATTRIBUTE-VALUE-INTEGER>"#,
        );
        let value = parse_value(xml, DataKind::Integer, &content).unwrap();
        assert_eq!(value.content, AttributeValueContent::Integer(0));
    }

    #[test]
    fn default_value_may_reference_its_enclosing_definition() {
        let content = content_with_datatype("dt-int", DataKind::Integer);
        let xml = concat!(
            r#"<ATTRIBUTE-DEFINITION-INTEGER IDENTIFIER="ad-int">"#,
            r#"<DEFAULT-VALUE>"#,
            r#"<ATTRIBUTE-VALUE-INTEGER THE-VALUE="7">"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-INTEGER-REF>ad-int</ATTRIBUTE-DEFINITION-INTEGER-REF></DEFINITION>"#,
            r#"</ATTRIBUTE-VALUE-INTEGER>"#,
            r#"</DEFAULT-VALUE>"#,
            r#"<TYPE><DATATYPE-DEFINITION-INTEGER-REF>dt-int</DATATYPE-DEFINITION-INTEGER-REF></TYPE>"#,
            r#"</ATTRIBUTE-DEFINITION-INTEGER>"#,
        );
        let definition = parse_definition(xml, DataKind::Integer, &content);
        let default = definition.default_value().unwrap();
        assert_eq!(default.content, AttributeValueContent::Integer(7));
        assert_eq!(default.definition_ref(), Some("ad-int"));
        assert_eq!(definition.datatype_ref(), Some("dt-int"));
    }

    #[test]
    fn definition_without_datatype_refuses_to_serialize() {
        let definition =
            AttributeDefinition::new(Identifiable::new("ad"), DataKind::String);
        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        let err = write_definition(&mut sink, &definition).unwrap_err();
        assert!(matches!(err, Error::MissingReference { .. }));
    }

    #[test]
    fn value_without_definition_refuses_to_serialize() {
        let value = AttributeValue::new(AttributeValueContent::Boolean(true));
        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        let err = write_value(&mut sink, &value).unwrap_err();
        assert!(matches!(err, Error::MissingReference { .. }));
    }

    #[test]
    fn enumeration_value_round_trips_selection_order() {
        let mut content = content_with_definition("dt-enum", "ad-enum", DataKind::Enumeration);
        // Register the two enum values so resolution succeeds.
        if let crate::model::DatatypeContent::Enumeration { values } =
            &mut content.datatypes[0].content
        {
            values.push(crate::model::EnumValue::new(Identifiable::new("ev-b")));
            values.push(crate::model::EnumValue::new(Identifiable::new("ev-a")));
        }
        let xml = concat!(
            r#"<ATTRIBUTE-VALUE-ENUMERATION>"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-ENUMERATION-REF>ad-enum</ATTRIBUTE-DEFINITION-ENUMERATION-REF></DEFINITION>"#,
            r#"<VALUES>"#,
            r#"<ENUM-VALUE-REF>ev-b</ENUM-VALUE-REF>"#,
            r#"<ENUM-VALUE-REF>ev-a</ENUM-VALUE-REF>"#,
            r#"</VALUES>"#,
            r#"</ATTRIBUTE-VALUE-ENUMERATION>"#,
        );
        let value = parse_value(xml, DataKind::Enumeration, &content).unwrap();
        assert_eq!(
            value.content,
            AttributeValueContent::Enumeration(vec!["ev-b".to_owned(), "ev-a".to_owned()])
        );

        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        write_value(&mut sink, &value).unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        let reparsed = parse_value(&written, DataKind::Enumeration, &content).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn xhtml_value_extracts_external_objects_and_round_trips() {
        let content = content_with_definition("dt-x", "ad-x", DataKind::Xhtml);
        let xml = concat!(
            r#"<ATTRIBUTE-VALUE-XHTML>"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-XHTML-REF>ad-x</ATTRIBUTE-DEFINITION-XHTML-REF></DEFINITION>"#,
            r#"<THE-VALUE><xhtml:div>see "#,
            r#"<xhtml:object data="files/plan.png" type="image/png" height="64" width="48"/>"#,
            r#"</xhtml:div></THE-VALUE>"#,
            r#"</ATTRIBUTE-VALUE-XHTML>"#,
        );
        let value = parse_value(xml, DataKind::Xhtml, &content).unwrap();
        let xhtml_content = value.xhtml().unwrap();
        assert_eq!(xhtml_content.external_objects.len(), 1);
        assert_eq!(xhtml_content.external_objects[0].uri, "files/plan.png");
        assert_eq!(xhtml_content.external_objects[0].height, Some(64));

        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        write_value(&mut sink, &value).unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        let reparsed = parse_value(&written, DataKind::Xhtml, &content).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn simplified_xhtml_value_keeps_the_original_content() {
        let content = content_with_definition("dt-x", "ad-x", DataKind::Xhtml);
        let xml = concat!(
            r#"<ATTRIBUTE-VALUE-XHTML IS-SIMPLIFIED="true">"#,
            r#"<DEFINITION><ATTRIBUTE-DEFINITION-XHTML-REF>ad-x</ATTRIBUTE-DEFINITION-XHTML-REF></DEFINITION>"#,
            r#"<THE-ORIGINAL-VALUE><xhtml:div><xhtml:span>rich</xhtml:span></xhtml:div></THE-ORIGINAL-VALUE>"#,
            r#"<THE-VALUE><xhtml:div>rich</xhtml:div></THE-VALUE>"#,
            r#"</ATTRIBUTE-VALUE-XHTML>"#,
        );
        let value = parse_value(xml, DataKind::Xhtml, &content).unwrap();
        let xhtml_content = value.xhtml().unwrap();
        assert!(xhtml_content.is_simplified);
        assert_eq!(
            xhtml_content.original_value.as_deref(),
            Some("<xhtml:div><xhtml:span>rich</xhtml:span></xhtml:div>")
        );
        assert_eq!(xhtml_content.value, "<xhtml:div>rich</xhtml:div>");

        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        write_value(&mut sink, &value).unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        let reparsed = parse_value(&written, DataKind::Xhtml, &content).unwrap();
        assert_eq!(reparsed, value);
    }
}
