//! Bidirectional streaming codec for ReqIF XML.
//!
//! The codec is a single forward pass in both directions: reading consumes
//! a stream of XML events and accumulates the element graph, writing walks
//! the graph and emits events in the mirror order. Per-kind element
//! readers and writers live in the submodules; this module owns the error
//! type and the event source/sink plumbing they share.

use std::io::{BufRead, Write};

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event, attributes::AttrError},
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Scalar conversions between XML text and typed values.
pub mod primitive;

pub(crate) mod vocab;

mod datatype;
mod attribute;
mod spec;
mod xhtml;

mod document;
pub use document::{ReqIfReader, ReqIfWriter};

/// Errors raised while reading or writing a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The XML stream itself was malformed.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element attribute was malformed.
    #[error("attribute error: {0}")]
    Attr(#[from] AttrError),

    /// Element or attribute content was not valid UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Element or attribute content could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// An escape sequence could not be resolved.
    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// An I/O error occurred on the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Scalar text that is not parseable at all. Always fatal, for bounds
    /// and values alike.
    #[error("invalid {field} value: {value:?}")]
    InvalidScalar {
        /// The attribute or bound being parsed.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// A required attribute was absent from an element.
    #[error("element {element} is missing required attribute {attribute}")]
    MissingAttribute {
        /// Local name of the element.
        element: &'static str,
        /// Name of the absent attribute.
        attribute: &'static str,
    },

    /// A required reference was absent or unresolvable.
    ///
    /// Raised when a value's definition cannot be resolved during reading,
    /// and when a definition's data type or a value's definition is unset
    /// at write time.
    #[error("element {element} is missing required {reference} reference")]
    MissingReference {
        /// Identifier or local name of the element.
        element: String,
        /// Which reference is missing.
        reference: &'static str,
    },

    /// The stream ended inside an element.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// An element appeared somewhere the schema does not allow it.
    #[error("unexpected element {name}")]
    UnexpectedElement {
        /// Local name of the offending element.
        name: String,
    },

    /// The operation's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

/// Strips a namespace prefix from a qualified name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map_or(name, |i| &name[i + 1..])
}

/// The event side of a parse: a streaming reader plus the cancellation
/// token checked on every event.
pub(crate) struct XmlSource<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    cancel: CancellationToken,
}

impl<R: BufRead> XmlSource<R> {
    pub(crate) fn new(input: R, cancel: CancellationToken) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            cancel,
        }
    }

    /// Pulls the next event, owned so it outlives the internal buffer.
    ///
    /// Cancellation is checked here, which bounds a cancelled parse by one
    /// element's processing time.
    pub(crate) fn next(&mut self) -> Result<Event<'static>, Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        Ok(event.into_owned())
    }

    /// Consumes events up to and including the end of the current element.
    ///
    /// Call after an [`Event::Start`] whose subtree should be ignored.
    pub(crate) fn skip_subtree(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
        }
    }

    /// Reads the text content of the current element up to its end tag.
    pub(crate) fn read_text(&mut self) -> Result<String, Error> {
        let mut out = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => out.push_str(&t.unescape()?),
                Event::CData(c) => out.push_str(std::str::from_utf8(&c)?),
                Event::End(_) => return Ok(out),
                Event::Eof => return Err(Error::UnexpectedEof),
                Event::Start(e) => {
                    tracing::trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "ignoring unexpected element inside text content"
                    );
                    self.skip_subtree()?;
                }
                _ => {}
            }
        }
    }

    /// Captures the raw inner markup of the current element verbatim.
    ///
    /// Nested elements, text and CDATA are re-emitted byte-faithfully into
    /// a string; the enclosing end tag is consumed but not included.
    pub(crate) fn read_raw_inner(&mut self) -> Result<String, Error> {
        let mut depth = 0usize;
        let mut writer = Writer::new(Vec::new());
        loop {
            match self.next()? {
                Event::Start(e) => {
                    depth += 1;
                    writer.write_event(Event::Start(e))?;
                }
                Event::Empty(e) => writer.write_event(Event::Empty(e))?,
                Event::End(e) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    writer.write_event(Event::End(e))?;
                }
                Event::Text(t) => writer.write_event(Event::Text(t))?,
                Event::CData(c) => writer.write_event(Event::CData(c))?,
                Event::Comment(c) => writer.write_event(Event::Comment(c))?,
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
        }
        String::from_utf8(writer.into_inner()).map_err(|e| Error::Utf8(e.utf8_error()))
    }
}

/// The event side of a write: a streaming writer plus the cancellation
/// token checked on every element start.
pub(crate) struct XmlSink<W> {
    writer: Writer<W>,
    cancel: CancellationToken,
}

impl<W: Write> XmlSink<W> {
    pub(crate) fn new(output: W, cancel: CancellationToken) -> Self {
        Self {
            writer: Writer::new(output),
            cancel,
        }
    }

    fn checkpoint(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn declaration(&mut self) -> Result<(), Error> {
        self.writer.write_event(Event::Decl(
            quick_xml::events::BytesDecl::new("1.0", Some("UTF-8"), None),
        ))?;
        Ok(())
    }

    pub(crate) fn start(&mut self, element: BytesStart<'_>) -> Result<(), Error> {
        self.checkpoint()?;
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub(crate) fn empty(&mut self, element: BytesStart<'_>) -> Result<(), Error> {
        self.checkpoint()?;
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), Error> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), Error> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Writes already-escaped markup without re-escaping it.
    pub(crate) fn raw(&mut self, markup: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(markup)))?;
        Ok(())
    }

    /// Writes `<NAME>text</NAME>` in one call.
    pub(crate) fn simple(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.start(BytesStart::new(name))?;
        self.text(text)?;
        self.end(name)
    }

    /// Unwraps the underlying output.
    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

/// Collects an element's attributes into a map, unescaped.
pub(crate) fn attrs_to_map(
    e: &BytesStart<'_>,
) -> Result<std::collections::BTreeMap<String, String>, Error> {
    let mut out = std::collections::BTreeMap::new();
    for a in e.attributes() {
        let a = a?;
        let key = std::str::from_utf8(a.key.as_ref())?.to_owned();
        let value = a.unescape_value()?.into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

/// Reads the identity attribute block shared by every element kind.
pub(crate) fn read_identifiable(
    element: &'static str,
    attrs: &std::collections::BTreeMap<String, String>,
) -> Result<crate::model::Identifiable, Error> {
    let identifier = attrs
        .get(vocab::IDENTIFIER)
        .ok_or(Error::MissingAttribute {
            element,
            attribute: vocab::IDENTIFIER,
        })?;
    let mut ident = crate::model::Identifiable::new(identifier.as_str());
    ident.long_name = attrs.get(vocab::LONG_NAME).cloned();
    ident.desc = attrs.get(vocab::DESC).cloned();
    ident.last_change = attrs
        .get(vocab::LAST_CHANGE)
        .map(|text| primitive::parse_date(vocab::LAST_CHANGE, text))
        .transpose()?;
    Ok(ident)
}

/// Reads the `ALTERNATIVE-ID` wrapper: one nested `ALTERNATIVE-ID` element
/// carrying the secondary identifier.
pub(crate) fn read_alternative_id<R: BufRead>(
    src: &mut XmlSource<R>,
) -> Result<Option<crate::model::AlternativeId>, Error> {
    fn inner(e: &BytesStart<'_>) -> Result<Option<crate::model::AlternativeId>, Error> {
        if local_name(e.name().as_ref()) != vocab::ALTERNATIVE_ID.as_bytes() {
            return Ok(None);
        }
        Ok(attrs_to_map(e)?
            .get(vocab::IDENTIFIER)
            .map(|id| crate::model::AlternativeId::new(id.as_str())))
    }

    let mut alternative = None;
    loop {
        match src.next()? {
            Event::Empty(e) => {
                if let Some(found) = inner(&e)? {
                    alternative = Some(found);
                }
            }
            Event::Start(e) => {
                if let Some(found) = inner(&e)? {
                    alternative = Some(found);
                }
                src.skip_subtree()?;
            }
            Event::End(_) => return Ok(alternative),
            Event::Eof => return Err(Error::UnexpectedEof),
            _ => {}
        }
    }
}

/// Appends the identity attributes to an element start tag.
pub(crate) fn push_identifiable_attrs(
    start: &mut BytesStart<'_>,
    ident: &crate::model::Identifiable,
) {
    start.push_attribute((vocab::IDENTIFIER, ident.identifier()));
    if let Some(last_change) = &ident.last_change {
        start.push_attribute((vocab::LAST_CHANGE, primitive::format_date(last_change).as_str()));
    }
    if let Some(long_name) = &ident.long_name {
        start.push_attribute((vocab::LONG_NAME, long_name.as_str()));
    }
    if let Some(desc) = &ident.desc {
        start.push_attribute((vocab::DESC, desc.as_str()));
    }
}

/// Writes the `ALTERNATIVE-ID` wrapper when the element carries one.
pub(crate) fn write_alternative_id<W: Write>(
    sink: &mut XmlSink<W>,
    ident: &crate::model::Identifiable,
) -> Result<(), Error> {
    let Some(alternative) = &ident.alternative_id else {
        return Ok(());
    };
    sink.start(BytesStart::new(vocab::ALTERNATIVE_ID))?;
    let mut inner = BytesStart::new(vocab::ALTERNATIVE_ID);
    inner.push_attribute((vocab::IDENTIFIER, alternative.identifier.as_str()));
    sink.empty(inner)?;
    sink.end(vocab::ALTERNATIVE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(xml: &str) -> XmlSource<&[u8]> {
        XmlSource::new(xml.as_bytes(), CancellationToken::new())
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(local_name(b"xhtml:object"), b"object");
        assert_eq!(local_name(b"SPEC-OBJECT"), b"SPEC-OBJECT");
    }

    #[test]
    fn raw_inner_is_captured_verbatim() {
        let mut src = source("<a><xhtml:p>one &amp; two<br/></xhtml:p></a>");
        let Event::Start(_) = src.next().unwrap() else {
            panic!("expected start event");
        };
        let inner = src.read_raw_inner().unwrap();
        assert_eq!(inner, "<xhtml:p>one &amp; two<br/></xhtml:p>");
    }

    #[test]
    fn skip_subtree_leaves_siblings_intact() {
        let mut src = source("<a><skip><x/><y>t</y></skip><b/></a>");
        src.next().unwrap(); // <a>
        src.next().unwrap(); // <skip>
        src.skip_subtree().unwrap();
        let Event::Empty(e) = src.next().unwrap() else {
            panic!("expected empty <b/>");
        };
        assert_eq!(e.name().as_ref(), b"b");
    }

    #[test]
    fn cancelled_source_raises_on_first_event() {
        let token = CancellationToken::new();
        token.cancel();
        let mut src = XmlSource::new("<a/>".as_bytes(), token);
        assert!(matches!(src.next(), Err(Error::Cancelled)));
    }
}
