//! Readers and writers for spec types, spec elements and hierarchies.

use std::io::{BufRead, Write};

use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::{
    Error, XmlSink, XmlSource,
    attribute::{self, read_single_ref},
    attrs_to_map, local_name, push_identifiable_attrs, read_alternative_id, read_identifiable,
    vocab, write_alternative_id,
};
use crate::model::{
    AttributeValue, DataKind, RelationGroup, ReqIfContent, SpecElement, SpecHierarchy, SpecObject,
    SpecRelation, SpecType, SpecTypeKind, Specification,
};

/// Reads one spec-type element of the given kind.
pub(crate) fn read_spec_type<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    kind: SpecTypeKind,
    content: &ReqIfContent,
) -> Result<SpecType, Error> {
    let attrs = attrs_to_map(e)?;
    let mut spec_type = SpecType::new(read_identifiable(kind.element(), &attrs)?, kind);
    if !has_children {
        return Ok(spec_type);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    spec_type.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::SPEC_ATTRIBUTES.as_bytes() => {
                    read_spec_attributes(src, &mut spec_type, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized spec-type child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(spec_type),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_spec_attributes<R: BufRead>(
    src: &mut XmlSource<R>,
    spec_type: &mut SpecType,
    content: &ReqIfContent,
) -> Result<(), Error> {
    loop {
        match src.next()? {
            Event::Start(e) => {
                if let Some(kind) =
                    DataKind::from_definition_element(local_name(e.name().as_ref()))
                {
                    spec_type
                        .add_attribute(attribute::read_definition(src, &e, true, kind, content)?);
                } else {
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unrecognized element in SPEC-ATTRIBUTES"
                    );
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                if let Some(kind) =
                    DataKind::from_definition_element(local_name(e.name().as_ref()))
                {
                    spec_type
                        .add_attribute(attribute::read_definition(src, &e, false, kind, content)?);
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads a `VALUES` list of attribute values.
fn read_values<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &ReqIfContent,
) -> Result<Vec<AttributeValue>, Error> {
    let mut values = Vec::new();
    loop {
        match src.next()? {
            Event::Start(e) => {
                if let Some(kind) = DataKind::from_value_element(local_name(e.name().as_ref())) {
                    values.push(attribute::read_value(src, &e, true, kind, content, None)?);
                } else {
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unrecognized element in VALUES"
                    );
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                if let Some(kind) = DataKind::from_value_element(local_name(e.name().as_ref())) {
                    values.push(attribute::read_value(src, &e, false, kind, content, None)?);
                }
            }
            Event::End(_) => return Ok(values),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Resolves a spec-type reference leniently: unresolvable references are
/// logged and kept as-is so the document still round-trips.
fn noted_ref(
    owner: &str,
    reference: Option<String>,
    resolves: impl FnOnce(&str) -> bool,
) -> Option<String> {
    if let Some(identifier) = &reference {
        if !resolves(identifier) {
            trace!(owner, reference = identifier.as_str(), "reference did not resolve");
        }
    }
    reference
}

/// Reads one `SPEC-OBJECT` element.
pub(crate) fn read_spec_object<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    content: &ReqIfContent,
) -> Result<SpecObject, Error> {
    let attrs = attrs_to_map(e)?;
    let mut object = SpecObject::new(read_identifiable(vocab::SPEC_OBJECT, &attrs)?);
    if !has_children {
        return Ok(object);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    object.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::TYPE.as_bytes() => {
                    object.type_ref = noted_ref(
                        object.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_spec_type(id, SpecTypeKind::SpecObjectType).is_some(),
                    );
                }
                name if name == vocab::VALUES.as_bytes() => {
                    object.values = read_values(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized spec-object child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(object),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one `SPEC-RELATION` element.
pub(crate) fn read_spec_relation<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    content: &ReqIfContent,
) -> Result<SpecRelation, Error> {
    let attrs = attrs_to_map(e)?;
    let mut relation = SpecRelation::new(read_identifiable(vocab::SPEC_RELATION, &attrs)?);
    if !has_children {
        return Ok(relation);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    relation.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::TYPE.as_bytes() => {
                    relation.type_ref = noted_ref(
                        relation.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_spec_type(id, SpecTypeKind::SpecRelationType).is_some(),
                    );
                }
                name if name == vocab::SOURCE.as_bytes() => {
                    relation.source = noted_ref(
                        relation.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_spec_object(id).is_some(),
                    );
                }
                name if name == vocab::TARGET.as_bytes() => {
                    relation.target = noted_ref(
                        relation.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_spec_object(id).is_some(),
                    );
                }
                name if name == vocab::VALUES.as_bytes() => {
                    relation.values = read_values(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized spec-relation child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(relation),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one `SPECIFICATION` element, including its hierarchy tree.
pub(crate) fn read_specification<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    content: &ReqIfContent,
) -> Result<Specification, Error> {
    let attrs = attrs_to_map(e)?;
    let mut specification = Specification::new(read_identifiable(vocab::SPECIFICATION, &attrs)?);
    if !has_children {
        return Ok(specification);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    specification.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::TYPE.as_bytes() => {
                    specification.type_ref = noted_ref(
                        specification.ident.identifier(),
                        read_single_ref(src)?,
                        |id| {
                            content
                                .find_spec_type(id, SpecTypeKind::SpecificationType)
                                .is_some()
                        },
                    );
                }
                name if name == vocab::VALUES.as_bytes() => {
                    specification.values = read_values(src, content)?;
                }
                name if name == vocab::CHILDREN.as_bytes() => {
                    specification.children = read_hierarchy_list(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized specification child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(specification),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_hierarchy_list<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &ReqIfContent,
) -> Result<Vec<SpecHierarchy>, Error> {
    let mut nodes = Vec::new();
    loop {
        match src.next()? {
            Event::Start(e)
                if local_name(e.name().as_ref()) == vocab::SPEC_HIERARCHY.as_bytes() =>
            {
                nodes.push(read_hierarchy(src, &e, true, content)?);
            }
            Event::Empty(e)
                if local_name(e.name().as_ref()) == vocab::SPEC_HIERARCHY.as_bytes() =>
            {
                nodes.push(read_hierarchy(src, &e, false, content)?);
            }
            Event::Start(e) => {
                trace!(
                    element = %String::from_utf8_lossy(e.name().as_ref()),
                    "ignoring unrecognized element in CHILDREN"
                );
                src.skip_subtree()?;
            }
            Event::End(_) => return Ok(nodes),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_hierarchy<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    content: &ReqIfContent,
) -> Result<SpecHierarchy, Error> {
    let attrs = attrs_to_map(e)?;
    let mut node = SpecHierarchy::new(read_identifiable(vocab::SPEC_HIERARCHY, &attrs)?);
    if !has_children {
        return Ok(node);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    node.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::OBJECT.as_bytes() => {
                    node.object = noted_ref(
                        node.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_spec_object(id).is_some(),
                    );
                }
                name if name == vocab::CHILDREN.as_bytes() => {
                    node.children = read_hierarchy_list(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized spec-hierarchy child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(node),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one `RELATION-GROUP` element.
pub(crate) fn read_relation_group<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
    content: &ReqIfContent,
) -> Result<RelationGroup, Error> {
    let attrs = attrs_to_map(e)?;
    let mut group = RelationGroup::new(read_identifiable(vocab::RELATION_GROUP, &attrs)?);
    if !has_children {
        return Ok(group);
    }

    loop {
        match src.next()? {
            Event::Start(child) => match local_name(child.name().as_ref()) {
                name if name == vocab::ALTERNATIVE_ID.as_bytes() => {
                    group.ident.alternative_id = read_alternative_id(src)?;
                }
                name if name == vocab::TYPE.as_bytes() => {
                    group.type_ref = noted_ref(
                        group.ident.identifier(),
                        read_single_ref(src)?,
                        |id| {
                            content
                                .find_spec_type(id, SpecTypeKind::RelationGroupType)
                                .is_some()
                        },
                    );
                }
                name if name == vocab::SOURCE_SPECIFICATION.as_bytes() => {
                    group.source_specification = noted_ref(
                        group.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_specification(id).is_some(),
                    );
                }
                name if name == vocab::TARGET_SPECIFICATION.as_bytes() => {
                    group.target_specification = noted_ref(
                        group.ident.identifier(),
                        read_single_ref(src)?,
                        |id| content.find_specification(id).is_some(),
                    );
                }
                name if name == vocab::SPEC_RELATIONS.as_bytes() => {
                    group.spec_relations = read_relation_refs(src, content)?;
                }
                name if name == vocab::VALUES.as_bytes() => {
                    group.values = read_values(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized relation-group child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(group),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_relation_refs<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &ReqIfContent,
) -> Result<Vec<String>, Error> {
    let mut references = Vec::new();
    loop {
        match src.next()? {
            Event::Start(e) => {
                let is_ref = local_name(e.name().as_ref()) == vocab::SPEC_RELATION_REF.as_bytes();
                let text = src.read_text()?;
                let trimmed = text.trim();
                if is_ref && !trimmed.is_empty() {
                    if content.find_spec_relation(trimmed).is_none() {
                        trace!(
                            reference = trimmed,
                            "spec-relation reference did not resolve"
                        );
                    }
                    references.push(trimmed.to_owned());
                }
            }
            Event::End(_) => return Ok(references),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Writes one spec-type element.
pub(crate) fn write_spec_type<W: Write>(
    sink: &mut XmlSink<W>,
    spec_type: &SpecType,
) -> Result<(), Error> {
    let name = spec_type.kind().element();
    let mut start = BytesStart::new(name);
    push_identifiable_attrs(&mut start, &spec_type.ident);

    if spec_type.ident.alternative_id.is_none() && spec_type.attributes.is_empty() {
        return sink.empty(start);
    }

    sink.start(start)?;
    write_alternative_id(sink, &spec_type.ident)?;
    if !spec_type.attributes.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_ATTRIBUTES))?;
        for definition in &spec_type.attributes {
            attribute::write_definition(sink, definition)?;
        }
        sink.end(vocab::SPEC_ATTRIBUTES)?;
    }
    sink.end(name)
}

fn write_ref_child<W: Write>(
    sink: &mut XmlSink<W>,
    wrapper: &str,
    ref_element: &str,
    reference: Option<&str>,
) -> Result<(), Error> {
    let Some(identifier) = reference else {
        return Ok(());
    };
    sink.start(BytesStart::new(wrapper))?;
    sink.simple(ref_element, identifier)?;
    sink.end(wrapper)
}

fn write_values<W: Write>(sink: &mut XmlSink<W>, values: &[AttributeValue]) -> Result<(), Error> {
    if values.is_empty() {
        return Ok(());
    }
    sink.start(BytesStart::new(vocab::VALUES))?;
    for value in values {
        attribute::write_value(sink, value)?;
    }
    sink.end(vocab::VALUES)
}

/// Writes one `SPEC-OBJECT` element.
pub(crate) fn write_spec_object<W: Write>(
    sink: &mut XmlSink<W>,
    object: &SpecObject,
) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::SPEC_OBJECT);
    push_identifiable_attrs(&mut start, &object.ident);
    sink.start(start)?;
    write_alternative_id(sink, &object.ident)?;
    write_values(sink, &object.values)?;
    write_ref_child(
        sink,
        vocab::TYPE,
        SpecTypeKind::SpecObjectType.ref_element(),
        object.type_ref(),
    )?;
    sink.end(vocab::SPEC_OBJECT)
}

/// Writes one `SPEC-RELATION` element.
pub(crate) fn write_spec_relation<W: Write>(
    sink: &mut XmlSink<W>,
    relation: &SpecRelation,
) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::SPEC_RELATION);
    push_identifiable_attrs(&mut start, &relation.ident);
    sink.start(start)?;
    write_alternative_id(sink, &relation.ident)?;
    write_values(sink, &relation.values)?;
    write_ref_child(
        sink,
        vocab::SOURCE,
        vocab::SPEC_OBJECT_REF,
        relation.source.as_deref(),
    )?;
    write_ref_child(
        sink,
        vocab::TARGET,
        vocab::SPEC_OBJECT_REF,
        relation.target.as_deref(),
    )?;
    write_ref_child(
        sink,
        vocab::TYPE,
        SpecTypeKind::SpecRelationType.ref_element(),
        relation.type_ref(),
    )?;
    sink.end(vocab::SPEC_RELATION)
}

/// Writes one `SPECIFICATION` element and its hierarchy tree.
pub(crate) fn write_specification<W: Write>(
    sink: &mut XmlSink<W>,
    specification: &Specification,
) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::SPECIFICATION);
    push_identifiable_attrs(&mut start, &specification.ident);
    sink.start(start)?;
    write_alternative_id(sink, &specification.ident)?;
    write_values(sink, &specification.values)?;
    write_ref_child(
        sink,
        vocab::TYPE,
        SpecTypeKind::SpecificationType.ref_element(),
        specification.type_ref(),
    )?;
    write_hierarchy_list(sink, &specification.children)?;
    sink.end(vocab::SPECIFICATION)
}

fn write_hierarchy_list<W: Write>(
    sink: &mut XmlSink<W>,
    nodes: &[SpecHierarchy],
) -> Result<(), Error> {
    if nodes.is_empty() {
        return Ok(());
    }
    sink.start(BytesStart::new(vocab::CHILDREN))?;
    for node in nodes {
        write_hierarchy(sink, node)?;
    }
    sink.end(vocab::CHILDREN)
}

fn write_hierarchy<W: Write>(sink: &mut XmlSink<W>, node: &SpecHierarchy) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::SPEC_HIERARCHY);
    push_identifiable_attrs(&mut start, &node.ident);
    sink.start(start)?;
    write_alternative_id(sink, &node.ident)?;
    write_ref_child(
        sink,
        vocab::OBJECT,
        vocab::SPEC_OBJECT_REF,
        node.object.as_deref(),
    )?;
    write_hierarchy_list(sink, &node.children)?;
    sink.end(vocab::SPEC_HIERARCHY)
}

/// Writes one `RELATION-GROUP` element.
pub(crate) fn write_relation_group<W: Write>(
    sink: &mut XmlSink<W>,
    group: &RelationGroup,
) -> Result<(), Error> {
    let mut start = BytesStart::new(vocab::RELATION_GROUP);
    push_identifiable_attrs(&mut start, &group.ident);
    sink.start(start)?;
    write_alternative_id(sink, &group.ident)?;
    write_values(sink, &group.values)?;
    write_ref_child(
        sink,
        vocab::SOURCE_SPECIFICATION,
        vocab::SPECIFICATION_REF,
        group.source_specification.as_deref(),
    )?;
    write_ref_child(
        sink,
        vocab::TARGET_SPECIFICATION,
        vocab::SPECIFICATION_REF,
        group.target_specification.as_deref(),
    )?;
    if !group.spec_relations.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_RELATIONS))?;
        for reference in &group.spec_relations {
            sink.simple(vocab::SPEC_RELATION_REF, reference)?;
        }
        sink.end(vocab::SPEC_RELATIONS)?;
    }
    write_ref_child(
        sink,
        vocab::TYPE,
        SpecTypeKind::RelationGroupType.ref_element(),
        group.type_ref(),
    )?;
    sink.end(vocab::RELATION_GROUP)
}
