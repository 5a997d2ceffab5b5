#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! The engine behind a format-preserving TOML editor: a line-addressed
//! document model, a cursor/span system over it, a lexer that recognizes
//! TOML's structural tokens, a navigator that walks and searches the
//! resulting tree without ever building one, and an editor that replaces a
//! value's bytes in place with validate-before-commit semantics.
//!
//! Every edit keeps the rest of the document byte-identical: comments,
//! whitespace, quote style, and key order are never touched except where
//! an operation explicitly targets them.

pub mod config;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod lexer;
pub mod navigator;
pub mod serializer;
pub mod span;

pub use config::{EditorConfig, IterationGuard};
pub use cursor::Cursor;
pub use document::{Document, Line, LineId};
pub use editor::{relink_span, set_value, set_value_multiline, unlink_span, UnlinkedSpan};
pub use error::{Error, Result};
pub use navigator::{
    doc_span, find_by_name, find_next, find_next_by_name, get_string, get_text, iter_line, keyval_slice,
    parse_key, parse_value, ValueType,
};
pub use span::{Span, SpanKind};
