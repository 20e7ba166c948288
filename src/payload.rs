//! External binary payloads referenced from XHTML attribute content.
//!
//! An [`ExternalObject`] is a handle to bytes stored outside the XML: either
//! an entry of the surrounding `.reqifz` container (relative URI) or a
//! resource the caller must fetch itself (absolute URI). The two retrieval
//! mechanisms are mutually exclusive; asking this module to retrieve an
//! absolute URI is an error, not a fallback.

use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::Path,
};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use zip::{ZipArchive, result::ZipError};

/// Errors raised by payload retrieval.
#[derive(Debug, Error)]
pub enum Error {
    /// The source container path was empty.
    #[error("source container path must not be empty")]
    EmptySource,

    /// Local retrieval was attempted on an absolute URI.
    #[error("cannot retrieve absolute URI {0:?} from a local container")]
    AbsoluteUri(String),

    /// The container holds no entry at the object's relative URI.
    #[error("container entry {0:?} not found")]
    EntryNotFound(String),

    /// The container could not be read as a zip archive.
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),

    /// An I/O error occurred while copying payload bytes.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A handle to a binary payload referenced from rich-text content.
///
/// Created during parsing when an embedded object reference is found inside
/// an XHTML value; owned by that value and destroyed with it. Not
/// independently identifiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalObject {
    /// URI of the payload, relative to the container root or absolute.
    pub uri: String,

    /// MIME type of the payload, when declared.
    pub mime_type: Option<String>,

    /// Declared height in pixels.
    pub height: Option<u32>,

    /// Declared width in pixels.
    pub width: Option<u32>,
}

impl ExternalObject {
    /// Creates a handle for the given URI with no metadata.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
            height: None,
            width: None,
        }
    }

    /// True when the URI carries a scheme and must be retrieved elsewhere.
    ///
    /// A single letter before the colon is treated as a Windows drive
    /// prefix, not a scheme.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.uri.split_once(':').is_some_and(|(scheme, _)| {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphabetic() || c == '+' || c == '-' || c == '.')
        })
    }

    /// Copies the payload bytes out of a local zip container.
    ///
    /// Opens the container entry named by this object's relative URI and
    /// copies it to `sink`. No decompressed bytes are cached; callers that
    /// need repeated access must cache themselves.
    ///
    /// # Errors
    ///
    /// Fails before any I/O when `source` is empty or the URI is absolute;
    /// fails during retrieval when the container cannot be opened, the
    /// entry does not exist, or copying fails.
    pub fn query_local<W: Write>(&self, source: &Path, sink: &mut W) -> Result<u64, Error> {
        if source.as_os_str().is_empty() {
            return Err(Error::EmptySource);
        }
        if self.is_absolute() {
            return Err(Error::AbsoluteUri(self.uri.clone()));
        }

        let file = File::open(source)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut entry = match archive.by_name(&self.uri) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(Error::EntryNotFound(self.uri.clone())),
            Err(e) => return Err(e.into()),
        };
        Ok(io::copy(&mut entry, sink)?)
    }

    /// Builds the externally-visible locator for this object.
    ///
    /// The locator is opaque: it is a stable reference a caller can later
    /// exchange for bytes through [`Self::query_local`], not itself a
    /// retrieval mechanism. The trailing space is part of the reference
    /// format and kept for compatibility.
    #[must_use]
    pub fn locator(&self, header_identifier: &str) -> String {
        let encoded = STANDARD.encode(self.uri.as_bytes());
        format!("/reqif/{header_identifier}/externalobject/{encoded} ")
    }
}
