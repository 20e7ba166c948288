//! File-level loading of ReqIF sources.
//!
//! A source on disk is either a plain `.reqif` XML file holding one
//! document or a `.reqifz` zip container holding one or more documents
//! plus their binary payloads. This module classifies a path, drives the
//! right codec path and joins payload retrieval to the container the
//! document came from.

use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use crate::{
    codec::{self, ReqIfReader},
    model::ReqIf,
    payload::{self, ExternalObject},
};

/// Errors raised while loading sources from disk.
#[derive(Debug, Error)]
pub enum Error {
    /// A document inside the source failed to parse.
    ///
    /// Cancellation also surfaces here, as [`codec::Error::Cancelled`].
    #[error(transparent)]
    Codec(#[from] codec::Error),

    /// A payload could not be retrieved.
    #[error(transparent)]
    Payload(#[from] payload::Error),

    /// The container could not be read as a zip archive.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An I/O error occurred on the source file.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A container held no document entries at all.
    #[error("no .reqif entries in container {0:?}")]
    NoDocuments(PathBuf),
}

/// How a source path is to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A plain XML file holding one document.
    Xml,

    /// A zip container holding documents and payloads.
    Zip,
}

impl SourceKind {
    /// Classifies a path by extension.
    ///
    /// `.reqifz` and `.zip` are containers; everything else, including
    /// `.reqif` and extensionless paths, is treated as plain XML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_container = path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("reqifz") || ext.eq_ignore_ascii_case("zip")
        });
        if is_container { Self::Zip } else { Self::Xml }
    }
}

/// True for zip entries that hold ReqIF documents.
fn is_document_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".reqif") || lower.ends_with(".xml")
}

/// Loads every document held by the source at `path`.
///
/// A plain XML source yields exactly one document; a container yields one
/// per `.reqif` entry, in archive order.
///
/// # Errors
///
/// Returns an error when the source cannot be opened, is not a valid
/// container, holds no documents, or any document fails to parse.
pub fn load(path: &Path) -> Result<Vec<ReqIf>, Error> {
    load_with(path, &CancellationToken::new())
}

fn load_with(path: &Path, cancel: &CancellationToken) -> Result<Vec<ReqIf>, Error> {
    match SourceKind::from_path(path) {
        SourceKind::Xml => {
            let reader = ReqIfReader::with_cancellation(cancel.clone());
            let document = reader.read(BufReader::new(File::open(path)?))?;
            Ok(vec![document])
        }
        SourceKind::Zip => {
            let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
            load_container(path, &mut archive, cancel)
        }
    }
}

fn load_container<R: Read + Seek>(
    path: &Path,
    archive: &mut ZipArchive<R>,
    cancel: &CancellationToken,
) -> Result<Vec<ReqIf>, Error> {
    let reader = ReqIfReader::with_cancellation(cancel.clone());
    let mut documents = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !is_document_entry(entry.name()) {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        documents.push(reader.read(bytes.as_slice())?);
    }
    if documents.is_empty() {
        return Err(Error::NoDocuments(path.to_owned()));
    }
    Ok(documents)
}

/// Loads every document held by the source at `path`, cancellably.
///
/// The source bytes are drained with the token checked between chunks;
/// parsing checks the same token at every XML event.
///
/// # Errors
///
/// As [`load`], plus [`codec::Error::Cancelled`] (wrapped in
/// [`Error::Codec`]) when the token fires.
pub async fn load_async(path: &Path, cancel: CancellationToken) -> Result<Vec<ReqIf>, Error> {
    match SourceKind::from_path(path) {
        SourceKind::Xml => {
            let file = tokio::fs::File::open(path).await?;
            let reader = ReqIfReader::with_cancellation(cancel);
            Ok(vec![reader.read_async(file).await?])
        }
        SourceKind::Zip => {
            let bytes = read_all_cancellable(path, &cancel).await?;
            let mut archive = ZipArchive::new(io::Cursor::new(bytes))?;
            load_container(path, &mut archive, &cancel)
        }
    }
}

async fn read_all_cancellable(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, Error> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        if cancel.is_cancelled() {
            return Err(codec::Error::Cancelled.into());
        }
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            return Ok(bytes);
        }
        bytes.extend_from_slice(&chunk[..n]);
    }
}

/// Copies an external object's payload bytes out of the source at `path`.
///
/// For a container source the object's relative URI names a zip entry;
/// for a plain XML source it is resolved against the file's directory.
///
/// # Errors
///
/// Fails when the URI is absolute, the source path is empty, or the entry
/// or sibling file does not exist.
pub fn query_data<W: Write>(
    path: &Path,
    object: &ExternalObject,
    sink: &mut W,
) -> Result<u64, Error> {
    match SourceKind::from_path(path) {
        SourceKind::Zip => Ok(object.query_local(path, sink)?),
        SourceKind::Xml => {
            if path.as_os_str().is_empty() {
                return Err(payload::Error::EmptySource.into());
            }
            if object.is_absolute() {
                return Err(payload::Error::AbsoluteUri(object.uri.clone()).into());
            }
            let sibling = path.parent().unwrap_or_else(|| Path::new("")).join(&object.uri);
            let mut file = match File::open(&sibling) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(payload::Error::EntryNotFound(object.uri.clone()).into());
                }
                Err(e) => return Err(e.into()),
            };
            Ok(io::copy(&mut file, sink)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    use super::*;

    const MINIMAL: &str = concat!(
        r#"<REQ-IF xmlns="http://www.omg.org/spec/ReqIF/20110401/reqif.xsd">"#,
        r#"<THE-HEADER><REQ-IF-HEADER IDENTIFIER="doc-1"/></THE-HEADER>"#,
        r#"<CORE-CONTENT><REQ-IF-CONTENT/></CORE-CONTENT>"#,
        r#"</REQ-IF>"#,
    );

    #[test]
    fn paths_classify_by_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a.reqif")), SourceKind::Xml);
        assert_eq!(SourceKind::from_path(Path::new("a.xml")), SourceKind::Xml);
        assert_eq!(SourceKind::from_path(Path::new("a")), SourceKind::Xml);
        assert_eq!(SourceKind::from_path(Path::new("a.reqifz")), SourceKind::Zip);
        assert_eq!(SourceKind::from_path(Path::new("a.REQIFZ")), SourceKind::Zip);
        assert_eq!(SourceKind::from_path(Path::new("a.zip")), SourceKind::Zip);
    }

    #[test]
    fn plain_xml_source_yields_one_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.reqif");
        std::fs::write(&path, MINIMAL).unwrap();

        let documents = load(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].header.identifier, "doc-1");
    }

    #[test]
    fn container_yields_all_document_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bundle.reqifz");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for (name, identifier) in [("first.reqif", "doc-1"), ("second.reqif", "doc-2")] {
            writer
                .start_file(name, SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(MINIMAL.replace("doc-1", identifier).as_bytes())
                .unwrap();
        }
        writer
            .start_file("files/image.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"not a document").unwrap();
        writer.finish().unwrap();

        let documents = load(&path).unwrap();
        let identifiers: Vec<_> = documents
            .iter()
            .map(|d| d.header.identifier.as_str())
            .collect();
        assert_eq!(identifiers, ["doc-1", "doc-2"]);
    }

    #[test]
    fn container_without_documents_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.reqifz");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("files/image.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"x").unwrap();
        writer.finish().unwrap();

        assert!(matches!(load(&path), Err(Error::NoDocuments(_))));
    }

    #[test]
    fn query_data_reads_container_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bundle.reqifz");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("files/image.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"png-bytes").unwrap();
        writer.finish().unwrap();

        let object = ExternalObject::new("files/image.png");
        let mut sink = Vec::new();
        query_data(&path, &object, &mut sink).unwrap();
        assert_eq!(sink, b"png-bytes");
    }

    #[test]
    fn query_data_reads_sibling_file_for_plain_xml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.reqif");
        std::fs::write(&path, MINIMAL).unwrap();
        std::fs::create_dir(dir.path().join("files")).unwrap();
        std::fs::write(dir.path().join("files/image.png"), b"png-bytes").unwrap();

        let object = ExternalObject::new("files/image.png");
        let mut sink = Vec::new();
        query_data(&path, &object, &mut sink).unwrap();
        assert_eq!(sink, b"png-bytes");

        let missing = ExternalObject::new("files/other.png");
        let err = query_data(&path, &missing, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Payload(payload::Error::EntryNotFound(_))));
    }
}
