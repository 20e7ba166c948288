//! Document model and bidirectional codec for the Requirements Interchange
//! Format (ReqIF).
//!
//! A ReqIF document is a self-contained exchange file: typed requirement
//! objects, the relations and document views over them, and the data-type
//! and attribute schemas they conform to, all cross-referenced by string
//! identifier within one container. This crate parses such documents from
//! XML, exposes them as an owned element graph and serializes them back
//! with round-trip fidelity, including opaque XHTML rich text and the
//! binary payloads it references.
//!
//! Parsing and writing exist in synchronous and cancellable asynchronous
//! forms; see [`codec::ReqIfReader`] and [`codec::ReqIfWriter`]. For
//! whole-file handling, including `.reqifz` zip containers, use the
//! [`loader`] module.

/// The owned element graph of a document.
pub mod model;
pub use model::{ReqIf, ReqIfContent, ReqIfHeader};

/// Streaming XML reading and writing.
pub mod codec;
pub use codec::{ReqIfReader, ReqIfWriter};

/// Binary payloads referenced from rich-text content.
pub mod payload;
pub use payload::ExternalObject;

/// File-level loading of plain XML files and zip containers.
pub mod loader;
