//! Marker-anchored insertion
//!
//! New blocks go immediately before the first catch-all `location / {`.

use crate::document::Document;
use crate::error::{PatchError, PatchResult};
use crate::template::ProxyBlock;

/// Catch-all marker as it appears inside a `server` block
pub const INDENTED_MARKER: &str = "    location / {";

/// Catch-all marker without indentation, tried when the indented form is absent
pub const BARE_MARKER: &str = "location / {";

/// Marker forms in the order they are tried
pub const MARKERS: [&str; 2] = [INDENTED_MARKER, BARE_MARKER];

/// First marker form present in `doc`
pub fn find_marker(doc: &Document) -> Option<&'static str> {
    MARKERS.into_iter().find(|marker| doc.contains(marker))
}

/// Result of an insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Document with the block inserted
    pub document: Document,
    /// Marker form the block was anchored to
    pub marker: &'static str,
    /// Byte offset at which the block now starts
    pub offset: usize,
}

/// 📍 Inserts the canonical block before the catch-all route
#[derive(Debug, Clone)]
pub struct MarkerInserter {
    text: String,
}

impl MarkerInserter {
    pub fn new(block: &ProxyBlock) -> Self {
        Self {
            text: block.with_separator(),
        }
    }

    /// Insert once, before the first occurrence of the marker.
    ///
    /// Existing copies of the block are not looked for; pair this with
    /// [`BlockRemover`](crate::block::BlockRemover) to keep a single copy.
    pub fn insert(&self, doc: &Document) -> PatchResult<Insertion> {
        let marker = find_marker(doc).ok_or(PatchError::MarkerNotFound { marker: BARE_MARKER })?;
        let offset = doc
            .find(marker)
            .ok_or(PatchError::MarkerNotFound { marker: BARE_MARKER })?;

        let source = doc.as_str();
        let mut out = String::with_capacity(source.len() + self.text.len());
        out.push_str(&source[..offset]);
        out.push_str(&self.text);
        out.push_str(&source[offset..]);

        tracing::debug!("📍 Inserted {} bytes before {:?} at offset {}", self.text.len(), marker, offset);

        Ok(Insertion {
            document: Document::new(out),
            marker,
            offset,
        })
    }
}
