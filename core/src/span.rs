//! Spans: tagged regions of a document bounded by cursors.
//!
//! Every span carries two coordinate systems. The *lexical* extent is what
//! the lexer actually consumed — delimiters, trailing separators, the
//! structural header line. The *semantic* extent is the content a caller
//! actually wants: the three bytes inside a quoted string, say, rather than
//! the quotes around them. When a span has no semantic bounds of its own,
//! semantic and lexical coincide.

use crate::cursor::Cursor;

/// What kind of structural element a span denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// The whole-document sentinel returned by `Document::span`.
    None,
    /// A `[table]` section: header line through the line before the next
    /// header (or end of document).
    NodeTable,
    /// A `[[table]]` array-of-tables section, same extent rule as
    /// `NodeTable`.
    NodeArrayTable,
    /// An inline `[ ... ]` array value, which may itself span multiple
    /// lines.
    NodeArray,
    /// An inline `{ ... }` table value. Always single-line.
    NodeInlineTable,
    /// A `key = value` pair, including any multi-line string or array
    /// value.
    LeafKeyval,
    /// A `# ...` comment line.
    LeafComment,
    /// The key half of a keyval, produced by `keyval_slice`.
    SliceKey,
    /// The value half of a keyval, produced by `keyval_slice`.
    SliceValue,
}

impl SpanKind {
    /// True for the two table-section kinds, which share the
    /// header-through-next-header extent rule.
    pub const fn is_node(self) -> bool {
        matches!(
            self,
            SpanKind::NodeTable | SpanKind::NodeArrayTable | SpanKind::NodeArray | SpanKind::NodeInlineTable
        )
    }

    /// A human-readable name, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            SpanKind::None => "none",
            SpanKind::NodeTable => "table",
            SpanKind::NodeArrayTable => "array-table",
            SpanKind::NodeArray => "array",
            SpanKind::NodeInlineTable => "inline-table",
            SpanKind::LeafKeyval => "keyval",
            SpanKind::LeafComment => "comment",
            SpanKind::SliceKey => "key",
            SpanKind::SliceValue => "value",
        }
    }
}

/// A tagged region of a document, with both lexical and semantic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub lex_start: Cursor,
    pub lex_end: Cursor,
    pub sem_start: Option<Cursor>,
    pub sem_end: Option<Cursor>,
}

impl Span {
    /// Builds a span whose semantic bounds equal its lexical bounds.
    pub const fn lexical(kind: SpanKind, start: Cursor, end: Cursor) -> Self {
        Self {
            kind,
            lex_start: start,
            lex_end: end,
            sem_start: None,
            sem_end: None,
        }
    }

    /// Builds a span with distinct semantic bounds (e.g. a quoted string's
    /// inner content).
    pub const fn with_semantic(kind: SpanKind, lex_start: Cursor, lex_end: Cursor, sem_start: Cursor, sem_end: Cursor) -> Self {
        Self {
            kind,
            lex_start,
            lex_end,
            sem_start: Some(sem_start),
            sem_end: Some(sem_end),
        }
    }

    /// The start cursor to use for reading content: semantic if present,
    /// else lexical.
    pub fn content_start(&self) -> Cursor {
        self.sem_start.unwrap_or(self.lex_start)
    }

    /// The end cursor to use for reading content: semantic if present,
    /// else lexical.
    pub fn content_end(&self) -> Cursor {
        self.sem_end.unwrap_or(self.lex_end)
    }

    /// True if the span's lexical bounds fall on a single line.
    pub fn is_single_line(&self) -> bool {
        self.lex_start.line() == self.lex_end.line()
    }
}
