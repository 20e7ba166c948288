//! Embedded-object detection inside XHTML attribute content.
//!
//! XHTML values are kept as opaque markup. The one piece of structure the
//! codec cares about is the `object` element carrying a `data` URI, which
//! references a binary payload. Most values contain no such reference, so
//! a cheap textual pre-check runs before the structured scan.

use quick_xml::{Reader, events::{BytesStart, Event}};
use tracing::trace;

use super::{Error, local_name, vocab};
use crate::payload::ExternalObject;

/// True when the fragment may contain an embedded object reference.
///
/// Purely textual; false positives are resolved by the structured scan,
/// false negatives do not occur because a reference requires both tokens.
fn may_contain_objects(fragment: &str) -> bool {
    fragment.contains(vocab::XHTML_OBJECT) && fragment.contains(vocab::XHTML_DATA)
}

/// Extracts every embedded object reference from an XHTML fragment.
///
/// References are returned in document order, nested fallback objects
/// included. A fragment with no references yields an empty list.
///
/// # Errors
///
/// Returns an error when the fragment is not well-formed XML or an
/// attribute cannot be decoded.
pub(crate) fn scan_external_objects(fragment: &str) -> Result<Vec<ExternalObject>, Error> {
    if !may_contain_objects(fragment) {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(fragment);
    reader.config_mut().check_end_names = false;

    let mut objects = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if local_name(e.name().as_ref()) == vocab::XHTML_OBJECT.as_bytes() {
                    if let Some(object) = object_from_element(&e)? {
                        objects.push(object);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(objects)
}

fn object_from_element(e: &BytesStart<'_>) -> Result<Option<ExternalObject>, Error> {
    let mut uri = None;
    let mut mime_type = None;
    let mut height = None;
    let mut width = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match local_name(attr.key.as_ref()) {
            b"data" => uri = Some(value.into_owned()),
            b"type" => mime_type = Some(value.into_owned()),
            b"height" => height = value.trim().parse().ok(),
            b"width" => width = value.trim().parse().ok(),
            _ => {}
        }
    }

    let Some(uri) = uri else {
        // An object without a data URI references nothing retrievable.
        trace!("skipping object element without data attribute");
        return Ok(None);
    };

    Ok(Some(ExternalObject {
        uri,
        mime_type,
        height,
        width,
    }))
}
