#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Public facade over `tomledit-core`.
//!
//! Re-exports the engine's full surface for callers who want to work
//! directly with spans and cursors, plus [`TomlDocument`]: a thin wrapper
//! that covers the common "read one value, write one value" case without
//! making every caller thread a `Span` through `find_by_name`/`keyval_slice`
//! by hand.

pub use tomledit_core::*;

use std::path::Path;

use tomledit_core::{doc_span, find_by_name, get_string, keyval_slice, set_value, Document, Result};

/// A parsed document plus convenience accessors for top-level keys.
///
/// For anything beyond simple get/set on the document root — nested
/// tables, array-table iteration, multi-line replacement — use the
/// re-exported `tomledit_core` functions directly against `document()`.
pub struct TomlDocument {
    doc: Document,
}

impl TomlDocument {
    /// Parses `bytes` as a document.
    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            doc: Document::from_bytes(bytes),
        }
    }

    /// Reads a document from a file path.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            doc: Document::load_path(path)?,
        })
    }

    /// Writes the document back to a file path.
    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.doc.save_path(path)
    }

    /// Reads the string value of a top-level key.
    pub fn get_string(&self, key: &[u8]) -> Result<Vec<u8>> {
        let span = doc_span(&self.doc);
        get_string(&self.doc, &span, key)
    }

    /// Replaces the value of a top-level key in place.
    pub fn set_value(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let span = doc_span(&self.doc);
        let keyval = find_by_name(&self.doc, &span, key)?;
        let (_, mut value_span) = keyval_slice(&self.doc, &keyval)?;
        set_value(&mut self.doc, &mut value_span, value)
    }

    /// Borrows the underlying document for lower-level navigation.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Borrows the underlying document mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Unwraps into the underlying document.
    pub fn into_document(self) -> Document {
        self.doc
    }
}
