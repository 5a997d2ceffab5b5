//! Structural navigation over a document: walking a span's children,
//! resolving dotted names, and slicing a keyval into its key and value.
//!
//! `find_next` is the single traversal primitive everything else builds on
//! — `find_by_name` is just `find_next` plus a name comparison, and
//! `iter_line` walks the *byte* content a span already covers rather than
//! its children.

use crate::cursor::Cursor;
use crate::document::{Document, LineId};
use crate::error::{Error, Result};
use crate::lexer::{self, Token};
use crate::span::{Span, SpanKind};

fn require_line(cursor: &Cursor) -> Result<LineId> {
    cursor.line().ok_or(Error::InvalidArg {
        message: "cursor lost its line reference mid-traversal",
    })
}

/// The shape of a value found inside a keyval, per `keyval_slice`/`parse_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Number, bool, date, time, inf/nan — anything the lexer treats as a
    /// bare run of non-whitespace/non-delimiter bytes.
    BareValue,
    /// A quoted string, basic or literal, single- or multi-line.
    String,
    Array,
    InlineTable,
}

fn byte_at(doc: &Document, cursor: Cursor, offset: usize) -> u8 {
    let Some(line) = cursor.line() else { return 0 };
    let text = doc.line(line).text();
    let pos = cursor.pos() + offset;
    if pos < text.len() {
        text[pos]
    } else {
        0
    }
}

#[inline]
fn same_pos(a: Cursor, b: Cursor) -> bool {
    a.line() == b.line() && a.pos() == b.pos()
}

fn is_bare_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

/// Returns the whole-document span: a `SpanKind::None` sentinel covering the
/// entire active list. If the document is empty both bounds carry no line
/// reference, and iteration over it yields done immediately.
pub fn doc_span(doc: &Document) -> Span {
    let lex_start = match doc.head() {
        Some(h) => Cursor::at(h, 0),
        None => Cursor::empty(),
    };
    let lex_end = match doc.tail() {
        Some(t) => Cursor::at(t, doc.line(t).len()),
        None => Cursor::empty(),
    };
    Span::lexical(SpanKind::None, lex_start, lex_end)
}

fn valid_for_find_next(kind: SpanKind) -> bool {
    !matches!(
        kind,
        SpanKind::LeafComment | SpanKind::LeafKeyval | SpanKind::SliceKey | SpanKind::SliceValue
    )
}

/// Produces the next structural element inside `in_span`.
///
/// `cursor` is the threading handle: pass the same cursor across repeated
/// calls to walk every child of `in_span` in document order, or an empty
/// cursor to start from `in_span.lex_start`. It is updated in place to just
/// past the returned element, ready for the next call. Returns `Ok(None)`
/// once the span is exhausted ("done" is not an error).
pub fn find_next(doc: &Document, in_span: &Span, cursor: &mut Cursor) -> Result<Option<Span>> {
    #[cfg(feature = "trace")]
    let _span = tracing::trace_span!("find_next", kind = in_span.kind.name()).entered();

    if in_span.lex_start.is_empty() {
        return Err(Error::InvalidArg {
            message: "find_next called on a span with no start line",
        });
    }
    if !valid_for_find_next(in_span.kind) {
        return Err(Error::InvalidArg {
            message: "find_next called on a leaf/slice span kind",
        });
    }

    if cursor.is_empty() {
        *cursor = in_span.lex_start;
    }
    let mut cr = *cursor;
    let mut skip_first = in_span.kind != SpanKind::None && same_pos(cr, in_span.lex_start);

    if in_span.kind == SpanKind::NodeArray {
        if same_pos(cr, in_span.lex_start) && byte_at(doc, cr, 0) == b'[' {
            cr.pos += 1;
            let _ = cr.skip_ws(doc);
        }
        match cr.line() {
            Some(line) if cr.pos() < doc.line(line).len() => {}
            _ => return Err(Error::NotFound),
        }
        if byte_at(doc, cr, 0) == b']' {
            return Ok(None);
        }
        let start = cr;
        lexer::consume(doc, &mut cr, Token::Value)?;
        let span = Span::lexical(SpanKind::SliceValue, start, cr);
        let _ = cr.skip_ws(doc);
        let _ = cr.skip_any(doc, b",");
        let _ = cr.skip_ws(doc);
        *cursor = cr;
        return Ok(Some(span));
    }

    // Inline tables are always single-line and their `{`/`}` delimiters
    // never match the generic loop's key/table/comment branches, so the
    // "skip consuming my own header" trick the NodeTable/NodeArrayTable
    // cases rely on below doesn't apply here; they get their own branch
    // exactly like NodeArray does.
    if in_span.kind == SpanKind::NodeInlineTable {
        if same_pos(cr, in_span.lex_start) && byte_at(doc, cr, 0) == b'{' {
            cr.pos += 1;
            let _ = cr.skip_ws(doc);
        }
        match cr.line() {
            Some(line) if cr.pos() < doc.line(line).len() => {}
            _ => return Err(Error::NotFound),
        }
        if byte_at(doc, cr, 0) == b'}' {
            return Ok(None);
        }
        let start = cr;
        lexer::consume(doc, &mut cr, Token::Key)?;
        cr.pos += 1; // skip '='
        lexer::consume(doc, &mut cr, Token::Value)?;
        let span = Span::lexical(SpanKind::LeafKeyval, start, cr);
        let _ = cr.skip_ws(doc);
        let _ = cr.skip_any(doc, b",");
        let _ = cr.skip_ws(doc);
        *cursor = cr;
        return Ok(Some(span));
    }

    loop {
        if !cr.skip_ws(doc) {
            return Ok(None);
        }
        let line = require_line(&cr)?;
        let len = doc.line(line).len();
        if cr.pos() >= len {
            return Err(Error::NotFound);
        }
        let c = byte_at(doc, cr, 0);
        let c1 = byte_at(doc, cr, 1);

        if c == b'[' {
            let start = cr;
            if c1 == b'[' {
                lexer::consume(doc, &mut cr, Token::ArrayTableHeader)?;
                if skip_first {
                    skip_first = false;
                    continue;
                }
                lexer::consume(doc, &mut cr, Token::ArrayTableBody)?;
                let span = Span::lexical(SpanKind::NodeArrayTable, start, cr);
                *cursor = cr;
                return Ok(Some(span));
            } else {
                lexer::consume(doc, &mut cr, Token::TableHeader)?;
                if skip_first {
                    skip_first = false;
                    continue;
                }
                lexer::consume(doc, &mut cr, Token::TableBody)?;
                let span = Span::lexical(SpanKind::NodeTable, start, cr);
                *cursor = cr;
                return Ok(Some(span));
            }
        }

        if c == b'#' {
            let start = cr;
            lexer::consume(doc, &mut cr, Token::Comment)?;
            let span = Span::lexical(SpanKind::LeafComment, start, cr);
            if skip_first {
                skip_first = false;
                continue;
            }
            *cursor = cr;
            return Ok(Some(span));
        }

        if is_bare_key_char(c) || c == b'"' || c == b'\'' {
            let start = cr;
            lexer::consume(doc, &mut cr, Token::Key)?;
            cr.pos += 1; // skip '='
            lexer::consume(doc, &mut cr, Token::Value)?;
            let span = Span::lexical(SpanKind::LeafKeyval, start, cr);
            if skip_first {
                skip_first = false;
                continue;
            }
            *cursor = cr;
            return Ok(Some(span));
        }

        // Unknown character: skip it and keep scanning.
        cr.pos += 1;
    }
}

fn span_name(doc: &Document, span: &Span) -> Option<(crate::document::LineId, usize, usize)> {
    let start_line = span.lex_start.line()?;
    let end_line = span.lex_end.line();
    let start = span.lex_start.pos();
    let end = if Some(start_line) == end_line {
        span.lex_end.pos()
    } else {
        doc.line(start_line).len()
    };
    let text = doc.line(start_line).text();

    match span.kind {
        SpanKind::NodeTable => {
            let mut s = start;
            if s < end && text.get(s) == Some(&b'[') {
                s += 1;
            }
            let mut name_end = s;
            while name_end < end && text.get(name_end) != Some(&b']') {
                name_end += 1;
            }
            Some((start_line, s, name_end))
        }
        SpanKind::NodeArrayTable => {
            let mut s = start;
            if s + 1 < end && text.get(s) == Some(&b'[') && text.get(s + 1) == Some(&b'[') {
                s += 2;
            }
            let mut name_end = s;
            while name_end + 1 < end && !(text.get(name_end) == Some(&b']') && text.get(name_end + 1) == Some(&b']')) {
                name_end += 1;
            }
            Some((start_line, s, name_end))
        }
        SpanKind::LeafKeyval => {
            let mut cr = span.lex_start;
            lexer::consume(doc, &mut cr, Token::Key).ok()?;
            let raw_key = Span::lexical(SpanKind::SliceKey, span.lex_start, cr);
            let (key, _) = parse_key(doc, &raw_key).ok()?;
            let line = key.lex_start.line()?;
            Some((line, key.lex_start.pos(), key.lex_end.pos()))
        }
        _ => None,
    }
}

/// Parses the key half of a keyval span, stripping surrounding quotes for
/// quoted keys and checking that only whitespace separates the key from
/// `=`.
pub fn parse_key(doc: &Document, key_span: &Span) -> Result<(Span, ValueType)> {
    let mut cr = key_span.lex_start;
    if !cr.skip_ws(doc) {
        return Err(Error::Syntax {
            message: "no key content",
        });
    }
    let first = byte_at(doc, cr, 0);

    if first == b'"' {
        cr.pos += 1;
        let start = cr;
        let mut escaped = false;
        loop {
            let line = require_line(&cr)?;
            let len = doc.line(line).len();
            if cr.pos >= len {
                return Err(Error::Syntax {
                    message: "unterminated quoted key",
                });
            }
            let c = doc.line(line).text()[cr.pos];
            if escaped {
                escaped = false;
                cr.pos += 1;
                continue;
            }
            if c == b'\\' {
                escaped = true;
                cr.pos += 1;
                continue;
            }
            if c == b'"' {
                let end = cr;
                cr.pos += 1;
                check_key_grammar(doc, &mut cr)?;
                return Ok((Span::lexical(SpanKind::SliceKey, start, end), ValueType::String));
            }
            cr.pos += 1;
        }
    }

    if first == b'\'' {
        cr.pos += 1;
        let start = cr;
        loop {
            let line = require_line(&cr)?;
            let len = doc.line(line).len();
            if cr.pos >= len {
                return Err(Error::Syntax {
                    message: "unterminated quoted key",
                });
            }
            if doc.line(line).text()[cr.pos] == b'\'' {
                let end = cr;
                cr.pos += 1;
                check_key_grammar(doc, &mut cr)?;
                return Ok((Span::lexical(SpanKind::SliceKey, start, end), ValueType::String));
            }
            cr.pos += 1;
        }
    }

    if is_bare_key_char(first) {
        let start = cr;
        let line = require_line(&cr)?;
        let len = doc.line(line).len();
        while cr.pos < len && is_bare_key_char(doc.line(line).text()[cr.pos]) {
            cr.pos += 1;
        }
        let end = cr;
        check_key_grammar(doc, &mut cr)?;
        return Ok((Span::lexical(SpanKind::SliceKey, start, end), ValueType::String));
    }

    Err(Error::Syntax {
        message: "invalid key start character",
    })
}

/// After a key's closing delimiter, only whitespace may precede `=`.
fn check_key_grammar(doc: &Document, cr: &mut Cursor) -> Result<()> {
    if cr.skip_ws(doc) && byte_at(doc, *cr, 0) != b'=' {
        return Err(Error::Syntax {
            message: "unexpected character after key",
        });
    }
    Ok(())
}

/// Parses a value starting at `start` (typically just after a keyval's
/// `=`), returning a span whose semantic bounds exclude any surrounding
/// quotes.
pub fn parse_value(doc: &Document, start: Cursor) -> Result<(Span, ValueType)> {
    let mut cr = start;
    if !cr.skip_ws(doc) {
        return Err(Error::Syntax {
            message: "no value after '='",
        });
    }
    let line = require_line(&cr)?;
    if cr.pos() >= doc.line(line).len() {
        return Err(Error::Syntax {
            message: "no value after '='",
        });
    }

    let c = byte_at(doc, cr, 0);
    let c1 = byte_at(doc, cr, 1);
    let c2 = byte_at(doc, cr, 2);

    if c == b'"' && c1 == b'"' && c2 == b'"' {
        let lex_start = cr;
        cr.pos += 3;
        let cur_line = require_line(&cr)?;
        if cr.pos() >= doc.line(cur_line).len() {
            let next = doc.next(cur_line).ok_or(Error::Syntax {
                message: "unterminated multiline basic string",
            })?;
            cr.line = Some(next);
            cr.pos = 0;
        }
        lexer::consume(doc, &mut cr, Token::StrMlBasic)?;
        cr.pos += 3;
        let lex_end = cr;
        // No semantic bounds: editing a multiline string means supplying the
        // complete syntax including the opening/closing """, so lexical and
        // semantic coincide here (see keyval_slice).
        return Ok((Span::lexical(SpanKind::SliceValue, lex_start, lex_end), ValueType::String));
    }

    if c == b'\'' && c1 == b'\'' && c2 == b'\'' {
        let lex_start = cr;
        cr.pos += 3;
        let cur_line = require_line(&cr)?;
        if cr.pos() >= doc.line(cur_line).len() {
            let next = doc.next(cur_line).ok_or(Error::Syntax {
                message: "unterminated multiline literal string",
            })?;
            cr.line = Some(next);
            cr.pos = 0;
        }
        lexer::consume(doc, &mut cr, Token::StrMlLiteral)?;
        cr.pos += 3;
        let lex_end = cr;
        return Ok((Span::lexical(SpanKind::SliceValue, lex_start, lex_end), ValueType::String));
    }

    if c == b'"' {
        let lex_start = cr;
        cr.pos += 1;
        let sem_start = cr;
        lexer::consume(doc, &mut cr, Token::StrBasic)?;
        let sem_end = cr;
        cr.pos += 1;
        let lex_end = cr;
        return Ok((Span::with_semantic(SpanKind::SliceValue, lex_start, lex_end, sem_start, sem_end), ValueType::String));
    }

    if c == b'\'' {
        let lex_start = cr;
        cr.pos += 1;
        let sem_start = cr;
        lexer::consume(doc, &mut cr, Token::StrLiteral)?;
        let sem_end = cr;
        cr.pos += 1;
        let lex_end = cr;
        return Ok((Span::with_semantic(SpanKind::SliceValue, lex_start, lex_end, sem_start, sem_end), ValueType::String));
    }

    if c == b'[' {
        let start = cr;
        lexer::consume(doc, &mut cr, Token::Array)?;
        return Ok((Span::lexical(SpanKind::NodeArray, start, cr), ValueType::Array));
    }

    if c == b'{' {
        let start = cr;
        lexer::consume(doc, &mut cr, Token::InlineTable)?;
        return Ok((Span::lexical(SpanKind::NodeInlineTable, start, cr), ValueType::InlineTable));
    }

    let start = cr;
    lexer::consume(doc, &mut cr, Token::Value)?;
    Ok((Span::lexical(SpanKind::SliceValue, start, cr), ValueType::BareValue))
}

/// Splits a `LeafKeyval` span into its key and value slices.
pub fn keyval_slice(doc: &Document, span: &Span) -> Result<(Span, Span)> {
    if span.kind != SpanKind::LeafKeyval {
        return Err(Error::TypeMismatch {
            message: "keyval_slice requires a keyval span",
        });
    }
    let mut cr = span.lex_start;
    lexer::consume(doc, &mut cr, Token::Key)?;

    let raw_key = Span::lexical(SpanKind::SliceKey, span.lex_start, cr);
    let (key, _) = parse_key(doc, &raw_key)?;

    cr.pos += 1; // skip '='
    let (value, _) = parse_value(doc, cr)?;
    Ok((key, value))
}

/// Finds the first direct child of `in_span` whose table/array-table/keyval
/// name matches `name` exactly (literal dotted-key comparison — no tree
/// descent through intermediate tables).
pub fn find_by_name(doc: &Document, in_span: &Span, name: &[u8]) -> Result<Span> {
    let mut cursor = in_span.lex_start;
    find_next_by_name(doc, in_span, name, &mut cursor)
}

/// Cursor-threading variant of [`find_by_name`]: pass the same cursor
/// across calls to walk successive matches (array-of-tables sharing a
/// name).
pub fn find_next_by_name(doc: &Document, in_span: &Span, name: &[u8], cursor: &mut Cursor) -> Result<Span> {
    while let Some(out) = find_next(doc, in_span, cursor)? {
        if matches!(out.kind, SpanKind::NodeTable | SpanKind::NodeArrayTable | SpanKind::LeafKeyval) {
            if let Some((line, s, e)) = span_name(doc, &out) {
                let text = doc.line(line).text();
                if &text[s..e] == name {
                    return Ok(out);
                }
            }
        }
    }
    Err(Error::NotFound)
}

/// Yields the intersection of `span` (using semantic bounds if present,
/// else lexical) with each line it covers. The cursor initialised empty
/// starts at the span's beginning; returns `Ok(None)` once exhausted.
pub fn iter_line(doc: &Document, span: &Span, cursor: &mut Cursor) -> Result<Option<Vec<u8>>> {
    if cursor.is_empty() {
        *cursor = span.content_start();
    }
    let line = cursor.line().ok_or(Error::InvalidArg {
        message: "iter_line span has no end line",
    })?;
    let content_end = span.content_end();
    let end_line = content_end.line().ok_or(Error::InvalidArg {
        message: "iter_line span has no end line",
    })?;

    if line == end_line && cursor.pos() >= content_end.pos() {
        return Ok(None);
    }

    let start = cursor.pos();
    let end = if line == end_line { content_end.pos() } else { doc.line(line).len() };
    let text = doc.line(line).text();
    let slice = if end > start { text[start..end].to_vec() } else { Vec::new() };

    if line == end_line {
        cursor.pos = content_end.pos();
    } else {
        cursor.line = doc.next(line);
        cursor.pos = 0;
    }
    Ok(Some(slice))
}

/// Returns the full content of a single-line span (semantic bounds if
/// present). Use [`iter_line`] for spans that cross lines.
pub fn get_text(doc: &Document, span: &Span) -> Result<Vec<u8>> {
    let start = span.content_start();
    let end = span.content_end();
    let line = start.line().ok_or(Error::InvalidArg {
        message: "get_text called on a span with no start line",
    })?;
    if Some(line) != end.line() {
        return Err(Error::TypeMismatch {
            message: "use iter_line for multi-line spans",
        });
    }
    let text = doc.line(line).text();
    Ok(text[start.pos()..end.pos()].to_vec())
}

/// Looks up `key` inside `in_span` and returns its value's text. `key` must
/// resolve to a keyval whose value fits on one line.
pub fn get_string(doc: &Document, in_span: &Span, key: &[u8]) -> Result<Vec<u8>> {
    let keyval = find_by_name(doc, in_span, key)?;
    if keyval.kind != SpanKind::LeafKeyval {
        return Err(Error::TypeMismatch {
            message: "get_string requires a keyval",
        });
    }
    let (_, value) = keyval_slice(doc, &keyval)?;
    get_text(doc, &value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_next_walks_top_level_keyvals() {
        let doc = Document::from_bytes(b"a = 1\nb = 2\n");
        let span = doc_span(&doc);
        let mut cursor = Cursor::empty();
        let first = find_next(&doc, &span, &mut cursor).unwrap().unwrap();
        assert_eq!(first.kind, SpanKind::LeafKeyval);
        let second = find_next(&doc, &span, &mut cursor).unwrap().unwrap();
        assert_eq!(second.kind, SpanKind::LeafKeyval);
        assert!(find_next(&doc, &span, &mut cursor).unwrap().is_none());
    }

    #[test]
    fn find_next_skips_table_header_as_own_first_child() {
        let doc = Document::from_bytes(b"[a]\nx = 1\n");
        let span = doc_span(&doc);
        let mut cursor = Cursor::empty();
        let table = find_next(&doc, &span, &mut cursor).unwrap().unwrap();
        assert_eq!(table.kind, SpanKind::NodeTable);

        let mut inner_cursor = Cursor::empty();
        let child = find_next(&doc, &table, &mut inner_cursor).unwrap().unwrap();
        assert_eq!(child.kind, SpanKind::LeafKeyval);
        assert!(find_next(&doc, &table, &mut inner_cursor).unwrap().is_none());
    }

    #[test]
    fn find_by_name_locates_table_by_literal_name() {
        let doc = Document::from_bytes(b"[a]\nx = 1\n[b]\ny = 2\n");
        let span = doc_span(&doc);
        let found = find_by_name(&doc, &span, b"b").unwrap();
        assert_eq!(found.kind, SpanKind::NodeTable);
    }

    #[test]
    fn keyval_slice_splits_key_and_string_value() {
        let doc = Document::from_bytes(b"name = \"hi\"\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"name").unwrap();
        let (key, value) = keyval_slice(&doc, &keyval).unwrap();
        assert_eq!(get_text(&doc, &key).unwrap(), b"name");
        assert_eq!(get_text(&doc, &value).unwrap(), b"hi");
    }

    #[test]
    fn get_string_reads_value_by_key() {
        let doc = Document::from_bytes(b"name = \"hi\"\n");
        let span = doc_span(&doc);
        let text = get_string(&doc, &span, b"name").unwrap();
        assert_eq!(text, b"hi");
    }

    #[test]
    fn array_iteration_yields_each_value_slice() {
        let doc = Document::from_bytes(b"nums = [1, 2, 3]\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"nums").unwrap();
        let (_, value) = keyval_slice(&doc, &keyval).unwrap();
        assert_eq!(value.kind, SpanKind::NodeArray);

        let mut cursor = Cursor::empty();
        let mut texts = Vec::new();
        while let Some(el) = find_next(&doc, &value, &mut cursor).unwrap() {
            texts.push(get_text(&doc, &el).unwrap());
        }
        assert_eq!(texts, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn quoted_key_with_escape_is_unescaped_by_bounds() {
        let doc = Document::from_bytes(b"\"a\\\"b\" = 1\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"a\\\"b").unwrap();
        let (key, _) = keyval_slice(&doc, &keyval).unwrap();
        assert_eq!(get_text(&doc, &key).unwrap(), b"a\\\"b");
    }

    #[test]
    fn iter_line_covers_multiline_string_value() {
        let doc = Document::from_bytes(b"s = \"\"\"\nabc\ndef\"\"\"\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"s").unwrap();
        let (_, value) = keyval_slice(&doc, &keyval).unwrap();
        let mut cursor = Cursor::empty();
        let mut chunks = Vec::new();
        while let Some(chunk) = iter_line(&doc, &value, &mut cursor).unwrap() {
            chunks.push(chunk);
        }
        assert_eq!(chunks, vec![b"abc".to_vec(), b"def".to_vec()]);
    }
}
