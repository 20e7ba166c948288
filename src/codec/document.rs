//! Whole-document reading and writing.
//!
//! The document codec drives the per-kind element readers and writers over
//! the fixed ReqIF envelope: the `REQ-IF` root, the header block and the
//! six content sections. Both directions exist in a synchronous form over
//! [`BufRead`]/[`Write`] and an asynchronous, cancellable form over the
//! tokio I/O traits.

use std::io::{BufRead, Write};

use quick_xml::events::{BytesStart, Event};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{
    Error, XmlSink, XmlSource, attrs_to_map, datatype, local_name, primitive, spec, vocab,
};
use crate::model::{DataKind, ReqIf, ReqIfContent, ReqIfHeader, SpecTypeKind};

/// Chunk size for the cancellable async I/O loops.
const ASYNC_CHUNK: usize = 8192;

/// Reads ReqIF documents from XML streams.
///
/// The reader is a configuration handle and can be reused across
/// documents. A cancellation token supplied via [`Self::with_cancellation`]
/// aborts an in-flight parse at the next XML event.
#[derive(Debug, Clone, Default)]
pub struct ReqIfReader {
    cancel: CancellationToken,
}

impl ReqIfReader {
    /// Creates a reader that never cancels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader that aborts when the given token fires.
    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Parses one document from a synchronous stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream is not a well-formed ReqIF
    /// document, when a value's definition reference cannot be resolved,
    /// or when the cancellation token fires mid-parse.
    pub fn read<R: BufRead>(&self, input: R) -> Result<ReqIf, Error> {
        let mut src = XmlSource::new(input, self.cancel.clone());
        loop {
            match src.next()? {
                Event::Start(e) if local_name(e.name().as_ref()) == vocab::REQ_IF.as_bytes() => {
                    return read_document(&mut src, &e);
                }
                Event::Empty(e) if local_name(e.name().as_ref()) == vocab::REQ_IF.as_bytes() => {
                    let attrs = attrs_to_map(&e)?;
                    return Ok(ReqIf {
                        lang: attrs.get("xml:lang").cloned(),
                        ..ReqIf::default()
                    });
                }
                Event::Start(e) => {
                    return Err(Error::UnexpectedElement {
                        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    });
                }
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
        }
    }

    /// Parses one document from an asynchronous stream.
    ///
    /// The input is drained in chunks with the cancellation token checked
    /// between chunks, then parsed in memory with the token still live, so
    /// cancellation interrupts both the I/O and the parse phases.
    ///
    /// # Errors
    ///
    /// As [`Self::read`], plus I/O errors from the async stream.
    pub async fn read_async<R: AsyncRead + Unpin>(&self, mut input: R) -> Result<ReqIf, Error> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; ASYNC_CHUNK];
        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let n = input.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
        }
        self.read(buffer.as_slice())
    }
}

fn read_document<R: BufRead>(
    src: &mut XmlSource<R>,
    root: &BytesStart<'_>,
) -> Result<ReqIf, Error> {
    let attrs = attrs_to_map(root)?;
    let mut document = ReqIf {
        lang: attrs.get("xml:lang").cloned(),
        ..ReqIf::default()
    };

    loop {
        match src.next()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                name if name == vocab::THE_HEADER.as_bytes() => {
                    document.header = read_header_block(src)?;
                }
                name if name == vocab::CORE_CONTENT.as_bytes() => {
                    document.content = read_core_content(src)?;
                }
                name if name == vocab::TOOL_EXTENSIONS.as_bytes() => {
                    debug!("skipping TOOL-EXTENSIONS block");
                    src.skip_subtree()?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized document child"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(document),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads `THE-HEADER`, which wraps exactly one `REQ-IF-HEADER`.
fn read_header_block<R: BufRead>(src: &mut XmlSource<R>) -> Result<ReqIfHeader, Error> {
    let mut header = ReqIfHeader::default();
    loop {
        match src.next()? {
            Event::Start(e) => {
                if local_name(e.name().as_ref()) == vocab::REQ_IF_HEADER.as_bytes() {
                    header = read_header(src, &e, true)?;
                } else {
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == vocab::REQ_IF_HEADER.as_bytes() {
                    header = read_header(src, &e, false)?;
                }
            }
            Event::End(_) => return Ok(header),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_header<R: BufRead>(
    src: &mut XmlSource<R>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<ReqIfHeader, Error> {
    let attrs = attrs_to_map(e)?;
    let identifier = attrs
        .get(vocab::IDENTIFIER)
        .ok_or(Error::MissingAttribute {
            element: vocab::REQ_IF_HEADER,
            attribute: vocab::IDENTIFIER,
        })?;
    let mut header = ReqIfHeader::new(identifier.as_str());
    if !has_children {
        return Ok(header);
    }

    loop {
        match src.next()? {
            Event::Start(e) => {
                let name = local_name(e.name().as_ref()).to_owned();
                let text = src.read_text()?;
                match name.as_slice() {
                    n if n == vocab::COMMENT.as_bytes() => header.comment = Some(text),
                    n if n == vocab::CREATION_TIME.as_bytes() => {
                        header.creation_time =
                            Some(primitive::parse_date(vocab::CREATION_TIME, text.trim())?);
                    }
                    n if n == vocab::REPOSITORY_ID.as_bytes() => {
                        header.repository_id = Some(text);
                    }
                    n if n == vocab::REQ_IF_TOOL_ID.as_bytes() => {
                        header.req_if_tool_id = Some(text);
                    }
                    n if n == vocab::REQ_IF_VERSION.as_bytes() => {
                        header.req_if_version = Some(text);
                    }
                    n if n == vocab::SOURCE_TOOL_ID.as_bytes() => {
                        header.source_tool_id = Some(text);
                    }
                    n if n == vocab::TITLE.as_bytes() => header.title = Some(text),
                    other => {
                        trace!(
                            element = %String::from_utf8_lossy(other),
                            "ignoring unrecognized header child"
                        );
                    }
                }
            }
            Event::Empty(_) => {}
            Event::End(_) => return Ok(header),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads `CORE-CONTENT`, which wraps exactly one `REQ-IF-CONTENT`.
fn read_core_content<R: BufRead>(src: &mut XmlSource<R>) -> Result<ReqIfContent, Error> {
    let mut content = ReqIfContent::default();
    loop {
        match src.next()? {
            Event::Start(e) => {
                if local_name(e.name().as_ref()) == vocab::REQ_IF_CONTENT.as_bytes() {
                    read_content_sections(src, &mut content)?;
                } else {
                    src.skip_subtree()?;
                }
            }
            Event::Empty(_) => {}
            Event::End(_) => return Ok(content),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads the six content sections in document order.
///
/// A conforming document declares referents before their referrers, so
/// resolving each element against the container parsed so far is enough.
fn read_content_sections<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &mut ReqIfContent,
) -> Result<(), Error> {
    loop {
        match src.next()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                name if name == vocab::DATATYPES.as_bytes() => read_datatypes(src, content)?,
                name if name == vocab::SPEC_TYPES.as_bytes() => read_spec_types(src, content)?,
                name if name == vocab::SPEC_OBJECTS.as_bytes() => read_spec_objects(src, content)?,
                name if name == vocab::SPEC_RELATIONS.as_bytes() => {
                    read_spec_relations(src, content)?;
                }
                name if name == vocab::SPECIFICATIONS.as_bytes() => {
                    read_specifications(src, content)?;
                }
                name if name == vocab::SPEC_RELATION_GROUPS.as_bytes() => {
                    read_relation_groups(src, content)?;
                }
                other => {
                    trace!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unrecognized content section"
                    );
                    src.skip_subtree()?;
                }
            },
            Event::Empty(_) => {}
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_datatypes<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &mut ReqIfContent,
) -> Result<(), Error> {
    loop {
        match src.next()? {
            Event::Start(e) => {
                if let Some(kind) = DataKind::from_datatype_element(local_name(e.name().as_ref()))
                {
                    let definition = datatype::read(src, &e, true, kind)?;
                    content.datatypes.push(definition);
                } else {
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unrecognized element in DATATYPES"
                    );
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                if let Some(kind) = DataKind::from_datatype_element(local_name(e.name().as_ref()))
                {
                    let definition = datatype::read(src, &e, false, kind)?;
                    content.datatypes.push(definition);
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_spec_types<R: BufRead>(
    src: &mut XmlSource<R>,
    content: &mut ReqIfContent,
) -> Result<(), Error> {
    loop {
        match src.next()? {
            Event::Start(e) => {
                if let Some(kind) = SpecTypeKind::from_element(local_name(e.name().as_ref())) {
                    let spec_type = spec::read_spec_type(src, &e, true, kind, content)?;
                    content.spec_types.push(spec_type);
                } else {
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unrecognized element in SPEC-TYPES"
                    );
                    src.skip_subtree()?;
                }
            }
            Event::Empty(e) => {
                if let Some(kind) = SpecTypeKind::from_element(local_name(e.name().as_ref())) {
                    let spec_type = spec::read_spec_type(src, &e, false, kind, content)?;
                    content.spec_types.push(spec_type);
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

macro_rules! section_reader {
    ($fn_name:ident, $element:expr, $read:path, $collection:ident) => {
        fn $fn_name<R: BufRead>(
            src: &mut XmlSource<R>,
            content: &mut ReqIfContent,
        ) -> Result<(), Error> {
            loop {
                match src.next()? {
                    Event::Start(e) => {
                        if local_name(e.name().as_ref()) == $element.as_bytes() {
                            let parsed = $read(src, &e, true, content)?;
                            content.$collection.push(parsed);
                        } else {
                            trace!(
                                element = %String::from_utf8_lossy(e.name().as_ref()),
                                "ignoring unrecognized section entry"
                            );
                            src.skip_subtree()?;
                        }
                    }
                    Event::Empty(e) => {
                        if local_name(e.name().as_ref()) == $element.as_bytes() {
                            let parsed = $read(src, &e, false, content)?;
                            content.$collection.push(parsed);
                        }
                    }
                    Event::End(_) => return Ok(()),
                    Event::Eof => return Err(Error::UnexpectedEof),
                    _ => {}
                }
            }
        }
    };
}

section_reader!(
    read_spec_objects,
    vocab::SPEC_OBJECT,
    spec::read_spec_object,
    spec_objects
);
section_reader!(
    read_spec_relations,
    vocab::SPEC_RELATION,
    spec::read_spec_relation,
    spec_relations
);
section_reader!(
    read_specifications,
    vocab::SPECIFICATION,
    spec::read_specification,
    specifications
);
section_reader!(
    read_relation_groups,
    vocab::RELATION_GROUP,
    spec::read_relation_group,
    relation_groups
);

/// Writes ReqIF documents as XML streams.
///
/// Like [`ReqIfReader`], a reusable configuration handle with an optional
/// cancellation token checked at every element start.
#[derive(Debug, Clone, Default)]
pub struct ReqIfWriter {
    cancel: CancellationToken,
}

impl ReqIfWriter {
    /// Creates a writer that never cancels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer that aborts when the given token fires.
    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Serializes one document to a synchronous stream.
    ///
    /// # Errors
    ///
    /// Returns an error when an attribute definition lacks its data-type
    /// reference, an attribute value lacks its definition reference, the
    /// output stream fails, or the cancellation token fires mid-write.
    pub fn write<W: Write>(&self, document: &ReqIf, output: W) -> Result<(), Error> {
        let mut sink = XmlSink::new(output, self.cancel.clone());
        sink.declaration()?;

        let mut root = BytesStart::new(vocab::REQ_IF);
        root.push_attribute(("xmlns", vocab::NS_REQIF));
        root.push_attribute(("xmlns:xhtml", vocab::NS_XHTML));
        if let Some(lang) = &document.lang {
            root.push_attribute(("xml:lang", lang.as_str()));
        }
        sink.start(root)?;

        write_header(&mut sink, &document.header)?;
        write_core_content(&mut sink, &document.content)?;

        sink.end(vocab::REQ_IF)
    }

    /// Serializes one document to an asynchronous stream.
    ///
    /// The document is serialized in memory first, then flushed to the
    /// stream in chunks with the cancellation token checked between
    /// chunks.
    ///
    /// # Errors
    ///
    /// As [`Self::write`], plus I/O errors from the async stream.
    pub async fn write_async<W: AsyncWrite + Unpin>(
        &self,
        document: &ReqIf,
        mut output: W,
    ) -> Result<(), Error> {
        let mut buffer = Vec::new();
        self.write(document, &mut buffer)?;

        for chunk in buffer.chunks(ASYNC_CHUNK) {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            output.write_all(chunk).await?;
        }
        output.flush().await?;
        Ok(())
    }
}

fn write_header<W: Write>(sink: &mut XmlSink<W>, header: &ReqIfHeader) -> Result<(), Error> {
    sink.start(BytesStart::new(vocab::THE_HEADER))?;

    let mut start = BytesStart::new(vocab::REQ_IF_HEADER);
    start.push_attribute((vocab::IDENTIFIER, header.identifier.as_str()));
    sink.start(start)?;

    if let Some(comment) = &header.comment {
        sink.simple(vocab::COMMENT, comment)?;
    }
    if let Some(creation_time) = &header.creation_time {
        sink.simple(vocab::CREATION_TIME, &primitive::format_date(creation_time))?;
    }
    if let Some(repository_id) = &header.repository_id {
        sink.simple(vocab::REPOSITORY_ID, repository_id)?;
    }
    if let Some(tool_id) = &header.req_if_tool_id {
        sink.simple(vocab::REQ_IF_TOOL_ID, tool_id)?;
    }
    if let Some(version) = &header.req_if_version {
        sink.simple(vocab::REQ_IF_VERSION, version)?;
    }
    if let Some(source_tool_id) = &header.source_tool_id {
        sink.simple(vocab::SOURCE_TOOL_ID, source_tool_id)?;
    }
    if let Some(title) = &header.title {
        sink.simple(vocab::TITLE, title)?;
    }

    sink.end(vocab::REQ_IF_HEADER)?;
    sink.end(vocab::THE_HEADER)
}

fn write_core_content<W: Write>(
    sink: &mut XmlSink<W>,
    content: &ReqIfContent,
) -> Result<(), Error> {
    sink.start(BytesStart::new(vocab::CORE_CONTENT))?;
    if content.is_empty() {
        sink.empty(BytesStart::new(vocab::REQ_IF_CONTENT))?;
        return sink.end(vocab::CORE_CONTENT);
    }
    sink.start(BytesStart::new(vocab::REQ_IF_CONTENT))?;

    if !content.datatypes.is_empty() {
        sink.start(BytesStart::new(vocab::DATATYPES))?;
        for definition in &content.datatypes {
            datatype::write(sink, definition)?;
        }
        sink.end(vocab::DATATYPES)?;
    }
    if !content.spec_types.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_TYPES))?;
        for spec_type in &content.spec_types {
            spec::write_spec_type(sink, spec_type)?;
        }
        sink.end(vocab::SPEC_TYPES)?;
    }
    if !content.spec_objects.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_OBJECTS))?;
        for object in &content.spec_objects {
            spec::write_spec_object(sink, object)?;
        }
        sink.end(vocab::SPEC_OBJECTS)?;
    }
    if !content.spec_relations.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_RELATIONS))?;
        for relation in &content.spec_relations {
            spec::write_spec_relation(sink, relation)?;
        }
        sink.end(vocab::SPEC_RELATIONS)?;
    }
    if !content.specifications.is_empty() {
        sink.start(BytesStart::new(vocab::SPECIFICATIONS))?;
        for specification in &content.specifications {
            spec::write_specification(sink, specification)?;
        }
        sink.end(vocab::SPECIFICATIONS)?;
    }
    if !content.relation_groups.is_empty() {
        sink.start(BytesStart::new(vocab::SPEC_RELATION_GROUPS))?;
        for group in &content.relation_groups {
            spec::write_relation_group(sink, group)?;
        }
        sink.end(vocab::SPEC_RELATION_GROUPS)?;
    }

    sink.end(vocab::REQ_IF_CONTENT)?;
    sink.end(vocab::CORE_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifiable;

    const MINIMAL: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        r#"<REQ-IF xmlns="http://www.omg.org/spec/ReqIF/20110401/reqif.xsd" xml:lang="en">"#,
        r#"<THE-HEADER>"#,
        r#"<REQ-IF-HEADER IDENTIFIER="doc-1">"#,
        r#"<CREATION-TIME>2024-03-01T12:00:00Z</CREATION-TIME>"#,
        r#"<REQ-IF-TOOL-ID>exporter</REQ-IF-TOOL-ID>"#,
        r#"<TITLE>Sample</TITLE>"#,
        r#"</REQ-IF-HEADER>"#,
        r#"</THE-HEADER>"#,
        r#"<CORE-CONTENT><REQ-IF-CONTENT/></CORE-CONTENT>"#,
        r#"</REQ-IF>"#,
    );

    #[test]
    fn minimal_document_parses() {
        let document = ReqIfReader::new().read(MINIMAL.as_bytes()).unwrap();
        assert_eq!(document.lang.as_deref(), Some("en"));
        assert_eq!(document.header.identifier, "doc-1");
        assert_eq!(document.header.title.as_deref(), Some("Sample"));
        assert_eq!(document.header.req_if_tool_id.as_deref(), Some("exporter"));
        assert!(document.header.creation_time.is_some());
        assert!(document.content.is_empty());
    }

    #[test]
    fn header_without_identifier_is_rejected() {
        let xml = concat!(
            r#"<REQ-IF><THE-HEADER><REQ-IF-HEADER>"#,
            r#"<TITLE>t</TITLE>"#,
            r#"</REQ-IF-HEADER></THE-HEADER></REQ-IF>"#,
        );
        let err = ReqIfReader::new().read(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { .. }));
    }

    #[test]
    fn tool_extensions_are_skipped() {
        let xml = concat!(
            r#"<REQ-IF>"#,
            r#"<THE-HEADER><REQ-IF-HEADER IDENTIFIER="doc-1"/></THE-HEADER>"#,
            r#"<CORE-CONTENT><REQ-IF-CONTENT/></CORE-CONTENT>"#,
            r#"<TOOL-EXTENSIONS><REQ-IF-TOOL-EXTENSION><custom>x</custom></REQ-IF-TOOL-EXTENSION></TOOL-EXTENSIONS>"#,
            r#"</REQ-IF>"#,
        );
        let document = ReqIfReader::new().read(xml.as_bytes()).unwrap();
        assert_eq!(document.header.identifier, "doc-1");
    }

    #[test]
    fn non_reqif_root_is_rejected() {
        let err = ReqIfReader::new().read("<OTHER/>".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedElement { .. }));
    }

    #[test]
    fn truncated_document_is_rejected() {
        let xml = r#"<REQ-IF><THE-HEADER>"#;
        let err = ReqIfReader::new().read(xml.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof | Error::Xml(_)
        ));
    }

    #[test]
    fn written_document_parses_back() {
        let mut document = ReqIf::new("doc-1");
        document.lang = Some("en".to_owned());
        document.header.title = Some("Round trip".to_owned());
        document.content.datatypes.push(
            crate::model::DatatypeDefinition::new(Identifiable::new("dt-bool"), DataKind::Boolean),
        );

        let mut out = Vec::new();
        ReqIfWriter::new().write(&document, &mut out).unwrap();
        let reparsed = ReqIfReader::new().read(out.as_slice()).unwrap();
        assert_eq!(reparsed, document);
    }

    #[test]
    fn cancelled_reader_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let reader = ReqIfReader::with_cancellation(token);
        assert!(matches!(
            reader.read(MINIMAL.as_bytes()),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn cancelled_writer_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let writer = ReqIfWriter::with_cancellation(token);
        let document = ReqIf::new("doc-1");
        assert!(matches!(
            writer.write(&document, Vec::new()),
            Err(Error::Cancelled)
        ));
    }
}
