//! Readers and writers for the seven data-type definition kinds.

use std::io::{BufRead, Write};

use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::{
    Error, XmlSink, XmlSource, attrs_to_map, local_name, primitive, push_identifiable_attrs,
    read_alternative_id, read_identifiable, vocab, write_alternative_id,
};
use crate::model::{DataKind, DatatypeContent, DatatypeDefinition, EmbeddedValue, EnumValue};

/// Reads one `DATATYPE-DEFINITION-*` element of the given kind.
///
/// `has_children` distinguishes `<X>...</X>` from `<X/>`; only the former
/// requires the child pass.
pub(crate) fn read<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    kind: DataKind,
) -> Result<DatatypeDefinition, Error> {
    let attrs = attrs_to_map(e)?;
    let ident = read_identifiable(kind.datatype_element(), &attrs)?;
    let mut definition = DatatypeDefinition::new(ident, kind);

    match &mut definition.content {
        DatatypeContent::Integer { min, max } => {
            *min = attrs
                .get(vocab::MIN)
                .map(|t| primitive::parse_i64_bound(vocab::MIN, t))
                .transpose()?;
            *max = attrs
                .get(vocab::MAX)
                .map(|t| primitive::parse_i64_bound(vocab::MAX, t))
                .transpose()?;
        }
        DatatypeContent::Real { min, max, accuracy } => {
            *min = attrs
                .get(vocab::MIN)
                .map(|t| primitive::parse_f64_bound(vocab::MIN, t))
                .transpose()?;
            *max = attrs
                .get(vocab::MAX)
                .map(|t| primitive::parse_f64_bound(vocab::MAX, t))
                .transpose()?;
            *accuracy = attrs
                .get(vocab::ACCURACY)
                .map(|t| primitive::parse_u64_bound(vocab::ACCURACY, t))
                .transpose()?;
        }
        DatatypeContent::String { max_length } => {
            *max_length = attrs
                .get(vocab::MAX_LENGTH)
                .map(|t| primitive::parse_u64_bound(vocab::MAX_LENGTH, t))
                .transpose()?;
        }
        DatatypeContent::Boolean
        | DatatypeContent::Date
        | DatatypeContent::Enumeration { .. }
        | DatatypeContent::Xhtml => {}
    }

    if !has_children {
        return Ok(definition);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    definition.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::SPECIFIED_VALUES.as_bytes() => {
                    let values = read_specified_values(src)?;
                    if let DatatypeContent::Enumeration { values: slot } = &mut definition.content {
                        *slot = values;
                    } else {
                        trace!(
                            kind = %kind,
                            "ignoring SPECIFIED-VALUES on a non-enumeration data type"
                        );
                    }
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized data-type child"
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

fn read_specified_values<R: BufRead>(src: &mut XmlSource<R>) -> Result<Vec<EnumValue>, Error> {
    let mut values = Vec::new();
    loop {
        match src.next()? {
            Event::Start(e) if local_name(e.name().as_ref()) == vocab::ENUM_VALUE.as_bytes() => {
                values.push(read_enum_value(src, &e, true)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == vocab::ENUM_VALUE.as_bytes() => {
                values.push(read_enum_value(src, &e, false)?);
            }
            Event::Start(e) => {
                trace!(
                    element = %String::from_utf8_lossy(e.name().as_ref()),
                    "ignoring unrecognized element in SPECIFIED-VALUES"
                );
                src.skip_subtree()?;
            }
            Event::End(_) => return Ok(values),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_enum_value<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<EnumValue, Error> {
    let attrs = attrs_to_map(e)?;
    let mut value = EnumValue::new(read_identifiable(vocab::ENUM_VALUE, &attrs)?);
    if !has_children {
        return Ok(value);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    value.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::PROPERTIES.as_bytes() => {
                    value.properties = read_properties(src)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized enum-value child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(value),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_properties<R: BufRead>(src: &mut XmlSource<R>) -> Result<Option<EmbeddedValue>, Error> {
    let mut properties = None;
    loop {
        match src.next()? {
            Event::Start(e) | Event::Empty(e)
                if local_name(e.name().as_ref()) == vocab::EMBEDDED_VALUE.as_bytes() =>
            {
                let attrs = attrs_to_map(&e)?;
                let key = attrs
                    .get(vocab::KEY)
                    .map(|t| primitive::parse_i64_bound(vocab::KEY, t))
                    .transpose()?
                    .unwrap_or_default();
                properties = Some(EmbeddedValue {
                    key,
                    other_content: attrs.get(vocab::OTHER_CONTENT).cloned(),
                });
            }
            Event::Start(_) => src.skip_subtree()?,
            Event::End(_) => return Ok(properties),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Writes one `DATATYPE-DEFINITION-*` element.
pub(crate) fn write<W: Write>(
    sink: &mut XmlSink<W>,
    definition: &DatatypeDefinition,
) -> Result<(), Error> {
    let name = definition.kind().datatype_element();
    let mut start = BytesStart::new(name);
    push_identifiable_attrs(&mut start, &definition.ident);

    match &definition.content {
        DatatypeContent::Integer { min, max } => {
            if let Some(min) = min {
                start.push_attribute((vocab::MIN, primitive::format_i64(*min).as_str()));
            }
            if let Some(max) = max {
                start.push_attribute((vocab::MAX, primitive::format_i64(*max).as_str()));
            }
        }
        DatatypeContent::Real { min, max, accuracy } => {
            if let Some(accuracy) = accuracy {
                start.push_attribute((vocab::ACCURACY, accuracy.to_string().as_str()));
            }
            if let Some(min) = min {
                start.push_attribute((vocab::MIN, primitive::format_f64(*min).as_str()));
            }
            if let Some(max) = max {
                start.push_attribute((vocab::MAX, primitive::format_f64(*max).as_str()));
            }
        }
        DatatypeContent::String { max_length } => {
            if let Some(max_length) = max_length {
                start.push_attribute((vocab::MAX_LENGTH, max_length.to_string().as_str()));
            }
        }
        DatatypeContent::Boolean
        | DatatypeContent::Date
        | DatatypeContent::Enumeration { .. }
        | DatatypeContent::Xhtml => {}
    }

    let enum_values = definition.enum_values();
    if definition.ident.alternative_id.is_none() && enum_values.is_empty() {
        return sink.empty(start);
    }

    sink.start(start)?;
    write_alternative_id(sink, &definition.ident)?;
    if !enum_values.is_empty() {
        sink.start(BytesStart::new(vocab::SPECIFIED_VALUES))?;
        for value in enum_values {
            write_enum_value(sink, value)?;
        }
        sink.end(vocab::SPECIFIED_VALUES)?;
    }
    sink.end(name)
}

fn write_enum_value<W: Write>(sink: &mut XmlSink<W>, value: &EnumValue) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::ENUM_VALUE);
    push_identifiable_attrs(&mut start, &value.ident);

    if value.ident.alternative_id.is_none() && value.properties.is_none() {
        return sink.empty(start);
    }

    sink.start(start)?;
    write_alternative_id(sink, &value.ident)?;
    if let Some(properties) = &value.properties {
        sink.start(BytesStart::new(vocab::PROPERTIES))?;
        let mut embedded = BytesStart::new(vocab::EMBEDDED_VALUE);
        embedded.push_attribute((vocab::KEY, primitive::format_i64(properties.key).as_str()));
        if let Some(other) = &properties.other_content {
            embedded.push_attribute((vocab::OTHER_CONTENT, other.as_str()));
        }
        sink.empty(embedded)?;
        sink.end(vocab::PROPERTIES)?;
    }
    sink.end(vocab::ENUM_VALUE)
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn parse(xml: &str, kind: DataKind) -> DatatypeDefinition {
        let mut src = XmlSource::new(xml.as_bytes(), CancellationToken::new());
        match src.next().unwrap() {
            Event::Start(e) => read(&mut src, &e, true, kind).unwrap(),
            Event::Empty(e) => read(&mut src, &e, false, kind).unwrap(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn serialize(definition: &DatatypeDefinition) -> String {
        let mut sink = XmlSink::new(Vec::new(), CancellationToken::new());
        write(&mut sink, definition).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn integer_bounds_round_trip() {
        let xml = r#"<DATATYPE-DEFINITION-INTEGER IDENTIFIER="dt-int" LONG-NAME="Priority" MIN="-5" MAX="10"/>"#;
        let definition = parse(xml, DataKind::Integer);
        assert_eq!(
            definition.content,
            DatatypeContent::Integer {
                min: Some(-5),
                max: Some(10)
            }
        );

        let reparsed = parse(&serialize(&definition), DataKind::Integer);
        assert_eq!(reparsed, definition);
    }

    #[test]
    fn overflowing_max_bound_clamps_to_i64_max() {
        let xml = r#"<DATATYPE-DEFINITION-INTEGER IDENTIFIER="dt-int" MAX="9223372036854775808"/>"#;
        let definition = parse(xml, DataKind::Integer);
        assert_eq!(
            definition.content,
            DatatypeContent::Integer {
                min: None,
                max: Some(i64::MAX)
            }
        );
    }

    #[test]
    fn enumeration_values_round_trip_in_order() {
        let xml = concat!(
            r#"<DATATYPE-DEFINITION-ENUMERATION IDENTIFIER="dt-enum">"#,
            r#"<SPECIFIED-VALUES>"#,
            r#"<ENUM-VALUE IDENTIFIER="ev-low" LONG-NAME="Low">"#,
            r#"<PROPERTIES><EMBEDDED-VALUE KEY="1" OTHER-CONTENT="silver"/></PROPERTIES>"#,
            r#"</ENUM-VALUE>"#,
            r#"<ENUM-VALUE IDENTIFIER="ev-high" LONG-NAME="High"/>"#,
            r#"</SPECIFIED-VALUES>"#,
            r#"</DATATYPE-DEFINITION-ENUMERATION>"#,
        );
        let definition = parse(xml, DataKind::Enumeration);
        let values = definition.enum_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].ident.identifier(), "ev-low");
        assert_eq!(
            values[0].properties,
            Some(EmbeddedValue {
                key: 1,
                other_content: Some("silver".to_owned())
            })
        );
        assert_eq!(values[1].ident.identifier(), "ev-high");
        assert!(values[1].properties.is_none());

        let reparsed = parse(&serialize(&definition), DataKind::Enumeration);
        assert_eq!(reparsed, definition);
    }

    #[test]
    fn alternative_id_round_trips() {
        let xml = concat!(
            r#"<DATATYPE-DEFINITION-BOOLEAN IDENTIFIER="dt-bool">"#,
            r#"<ALTERNATIVE-ID><ALTERNATIVE-ID IDENTIFIER="alt-1"/></ALTERNATIVE-ID>"#,
            r#"</DATATYPE-DEFINITION-BOOLEAN>"#,
        );
        let definition = parse(xml, DataKind::Boolean);
        assert_eq!(
            definition
                .ident
                .alternative_id
                .as_ref()
                .map(|a| a.identifier.as_str()),
            Some("alt-1")
        );
        let reparsed = parse(&serialize(&definition), DataKind::Boolean);
        assert_eq!(reparsed, definition);
    }

    #[test]
    fn unrecognized_children_are_skipped_without_error() {
        let xml = concat!(
            r#"<DATATYPE-DEFINITION-STRING IDENTIFIER="dt-str" MAX-LENGTH="32">"#,
            r#"<FUTURE-EXTENSION><NESTED/></FUTURE-EXTENSION>"#,
            r#"</DATATYPE-DEFINITION-STRING>"#,
        );
        let definition = parse(xml, DataKind::String);
        assert_eq!(
            definition.content,
            DatatypeContent::String {
                max_length: Some(32)
            }
        );
    }

    #[test]
    fn real_bounds_and_accuracy_round_trip() {
        let xml = r#"<DATATYPE-DEFINITION-REAL IDENTIFIER="dt-real" ACCURACY="5" MIN="-2.5" MAX="1e3"/>"#;
        let definition = parse(xml, DataKind::Real);
        let reparsed = parse(&serialize(&definition), DataKind::Real);
        assert_eq!(reparsed, definition);
    }
}
