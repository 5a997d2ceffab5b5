//! Byte-level token consumers.
//!
//! Each [`consume`] call advances a cursor to one past the end of a single
//! token — for delimited tokens, one past the closing delimiter. Consumers
//! never allocate; they only walk the cursor across the document's lines,
//! recursing into nested string/array/table tokens to avoid miscounting
//! brackets or quotes that appear inside string content.

use crate::cursor::Cursor;
use crate::document::{Document, LineId};
use crate::error::{Error, Result};

/// The line a cursor with no line reference is on doesn't exist; every
/// consumer needs one to index into the document, so this is the shared
/// "can't happen once `consume` has checked `is_empty`, but stays an error
/// instead of a panic if it somehow does" guard.
fn require_line(cursor: &Cursor) -> Result<LineId> {
    cursor.line().ok_or(Error::InvalidArg {
        message: "cursor lost its line reference mid-token",
    })
}

/// A lexical token a [`consume`] call can walk a cursor across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    TableHeader,
    ArrayTableHeader,
    TableBody,
    ArrayTableBody,
    Comment,
    Key,
    Value,
    StrBasic,
    StrLiteral,
    StrMlBasic,
    StrMlLiteral,
    Array,
    InlineTable,
}

#[inline]
fn is_ws(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

#[inline]
fn is_bare_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

#[inline]
fn same_pos(a: Cursor, b: Cursor) -> bool {
    a.line() == b.line() && a.pos() == b.pos()
}

/// Peeks the byte `offset` positions past `cursor` on its current line, or
/// `0` if that falls past the end of the line or the cursor holds no line
/// at all — the same sentinel `consume_value`'s bare-value loop treats as
/// "no more content here".
fn byte_at(doc: &Document, cursor: Cursor, offset: usize) -> u8 {
    let Some(line) = cursor.line() else {
        return 0;
    };
    let text = doc.line(line).text();
    let pos = cursor.pos() + offset;
    if pos < text.len() {
        text[pos]
    } else {
        0
    }
}

/// Advances `cursor` past whitespace only, never crossing into a skip of
/// other characters. See [`Cursor::skip_ws`] — this just forwards to it,
/// kept here so lexer code reads the same way the original token consumers
/// do (`_skipWS`).
pub fn skip_ws(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    if cursor.is_empty() {
        return Err(Error::InvalidArg {
            message: "skip_ws called on an empty cursor",
        });
    }
    if cursor.skip_ws(doc) {
        Ok(())
    } else {
        Err(Error::InvalidArg {
            message: "skip_ws reached end of document",
        })
    }
}

/// Consumes one token of kind `token`, advancing `cursor` to one past its
/// end (one past the closing delimiter, for delimited tokens).
pub fn consume(doc: &Document, cursor: &mut Cursor, token: Token) -> Result<()> {
    if cursor.is_empty() {
        return Err(Error::InvalidArg {
            message: "consume called on an empty cursor",
        });
    }

    match token {
        Token::Comment => {
            let line = require_line(cursor)?;
            cursor.pos = doc.line(line).len();
            Ok(())
        }

        Token::TableHeader => {
            let line = require_line(cursor)?;
            let len = doc.line(line).len();
            while cursor.pos < len {
                let c = doc.line(line).text()[cursor.pos];
                cursor.pos += 1;
                if c == b']' {
                    return Ok(());
                }
            }
            Err(Error::NotFound)
        }

        Token::ArrayTableHeader => {
            let line = require_line(cursor)?;
            let len = doc.line(line).len();
            while cursor.pos < len {
                let text = doc.line(line).text();
                if text[cursor.pos] == b']' && cursor.pos + 1 < len && text[cursor.pos + 1] == b']' {
                    cursor.pos += 2;
                    return Ok(());
                }
                cursor.pos += 1;
            }
            Err(Error::NotFound)
        }

        Token::TableBody | Token::ArrayTableBody => consume_body(doc, cursor),

        Token::Key => consume_key(doc, cursor),

        Token::Value => consume_value(doc, cursor),

        Token::StrBasic => consume_str_basic(doc, cursor),
        Token::StrLiteral => consume_str_literal(doc, cursor),
        Token::StrMlBasic => consume_str_ml_basic(doc, cursor),
        Token::StrMlLiteral => consume_str_ml_literal(doc, cursor),
        Token::Array => consume_array(doc, cursor),
        Token::InlineTable => consume_inline_table(doc, cursor),
    }
}

/// `TableBody`/`ArrayTableBody` share one algorithm: walk forward until the
/// next line starting with `[`, or end of document.
fn consume_body(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let mut line = require_line(cursor)?;
    loop {
        let l = doc.line(line);
        if cursor.pos == 0 && !l.is_empty() && l.text()[0] == b'[' {
            cursor.line = Some(line);
            return Ok(());
        }
        match doc.next(line) {
            Some(next) => {
                line = next;
                cursor.pos = 0;
            }
            None => {
                cursor.line = Some(line);
                cursor.pos = l.len();
                return Ok(());
            }
        }
    }
}

fn consume_key(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    // Keys never cross a line boundary; this only ever advances `pos`.
    let start = *cursor;
    let line = require_line(cursor)?;
    let len = doc.line(line).len();
    let mut quote = 0u8;
    loop {
        if cursor.pos >= len {
            return Err(Error::NotFound);
        }
        let c = doc.line(line).text()[cursor.pos];

        if quote != 0 {
            if c == b'\\' && quote == b'"' {
                cursor.pos += 2;
                continue;
            }
            if c == quote {
                quote = 0;
            }
            cursor.pos += 1;
            continue;
        }

        if c == b'"' || c == b'\'' {
            quote = c;
            cursor.pos += 1;
            continue;
        }
        if c == b'=' {
            if same_pos(*cursor, start) {
                return Err(Error::NotFound);
            }
            return Ok(());
        }
        if !is_bare_key_char(c) && !is_ws(c) {
            return Err(Error::Syntax {
                message: "illegal character before '=' in key",
            });
        }
        cursor.pos += 1;
    }
}

fn consume_value(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let start = *cursor;
    skip_ws(doc, cursor).map_err(|_| Error::Syntax {
        message: "no content after whitespace",
    })?;
    let line = require_line(cursor)?;
    let len = doc.line(line).len();
    if cursor.pos >= len {
        return Err(Error::Syntax {
            message: "no content at cursor",
        });
    }

    let c = byte_at(doc, *cursor, 0);
    let c1 = byte_at(doc, *cursor, 1);
    let c2 = byte_at(doc, *cursor, 2);

    if c == b'"' && c1 == b'"' && c2 == b'"' {
        cursor.pos += 3;
        consume(doc, cursor, Token::StrMlBasic)?;
        cursor.pos += 3;
        return Ok(());
    }
    if c == b'\'' && c1 == b'\'' && c2 == b'\'' {
        cursor.pos += 3;
        consume(doc, cursor, Token::StrMlLiteral)?;
        cursor.pos += 3;
        return Ok(());
    }
    if c == b'"' {
        cursor.pos += 1;
        consume(doc, cursor, Token::StrBasic)?;
        cursor.pos += 1;
        return Ok(());
    }
    if c == b'\'' {
        cursor.pos += 1;
        consume(doc, cursor, Token::StrLiteral)?;
        cursor.pos += 1;
        return Ok(());
    }
    if c == b'[' {
        consume(doc, cursor, Token::Array)?;
        return Ok(());
    }
    if c == b'{' {
        consume(doc, cursor, Token::InlineTable)?;
        // A zero-length inline table is structurally impossible (it would
        // require consuming `{` and `}` with nothing between, which still
        // advances the cursor by two bytes), so unlike the bare-value case
        // this is not checked as an error condition.
        return Ok(());
    }

    // Bare value: number, bool, date, or similar. Runs until whitespace or
    // a delimiter that can follow a value.
    loop {
        let line = require_line(cursor)?;
        let len = doc.line(line).len();
        if cursor.pos >= len {
            break;
        }
        let c = doc.line(line).text()[cursor.pos];
        if is_ws(c) || c == b',' || c == b']' || c == b'}' || c == b'#' {
            break;
        }
        cursor.pos += 1;
    }
    if same_pos(*cursor, start) {
        return Err(Error::NotFound);
    }
    Ok(())
}

fn consume_str_basic(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let line = require_line(cursor)?;
    let len = doc.line(line).len();
    let mut escaped = false;
    while cursor.pos < len {
        let ch = doc.line(line).text()[cursor.pos];
        if escaped {
            escaped = false;
            cursor.pos += 1;
            continue;
        }
        if ch == b'\\' {
            escaped = true;
            cursor.pos += 1;
            continue;
        }
        if ch == b'"' {
            return Ok(());
        }
        cursor.pos += 1;
    }
    Err(Error::Syntax {
        message: "unterminated basic string",
    })
}

fn consume_str_literal(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let line = require_line(cursor)?;
    let len = doc.line(line).len();
    while cursor.pos < len {
        if doc.line(line).text()[cursor.pos] == b'\'' {
            return Ok(());
        }
        cursor.pos += 1;
    }
    Err(Error::Syntax {
        message: "unterminated literal string",
    })
}

fn consume_str_ml_basic(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let mut line = require_line(cursor)?;
    let mut escaped = false;
    loop {
        let len = doc.line(line).len();
        while cursor.pos < len {
            let ch = doc.line(line).text()[cursor.pos];
            if escaped {
                escaped = false;
                cursor.pos += 1;
                continue;
            }
            if ch == b'\\' {
                escaped = true;
                cursor.pos += 1;
                continue;
            }
            if ch == b'"'
                && cursor.pos + 1 < len
                && doc.line(line).text()[cursor.pos + 1] == b'"'
                && cursor.pos + 2 < len
                && doc.line(line).text()[cursor.pos + 2] == b'"'
            {
                cursor.line = Some(line);
                return Ok(());
            }
            cursor.pos += 1;
        }
        match doc.next(line) {
            Some(next) => {
                line = next;
                cursor.pos = 0;
            }
            None => {
                return Err(Error::Syntax {
                    message: "unterminated multiline basic string",
                })
            }
        }
    }
}

fn consume_str_ml_literal(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    let mut line = require_line(cursor)?;
    loop {
        let len = doc.line(line).len();
        while cursor.pos < len {
            let text = doc.line(line).text();
            if text[cursor.pos] == b'\''
                && cursor.pos + 1 < len
                && text[cursor.pos + 1] == b'\''
                && cursor.pos + 2 < len
                && text[cursor.pos + 2] == b'\''
            {
                cursor.line = Some(line);
                return Ok(());
            }
            cursor.pos += 1;
        }
        match doc.next(line) {
            Some(next) => {
                line = next;
                cursor.pos = 0;
            }
            None => {
                return Err(Error::Syntax {
                    message: "unterminated multiline literal string",
                })
            }
        }
    }
}

/// `consume(doc, cursor, Token::Array)` expects the cursor at `[` and ends
/// one past the matching `]`, descending into nested strings/arrays so
/// brackets inside string content never miscount depth.
fn consume_array(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    if byte_at(doc, *cursor, 0) != b'[' {
        return Err(Error::Syntax {
            message: "array value does not start with '['",
        });
    }
    let mut depth = 1i32;
    cursor.pos += 1;
    let mut line = require_line(cursor)?;
    loop {
        let len = doc.line(line).len();
        while cursor.pos < len {
            let ch = byte_at(doc, *cursor, 0);
            let ch1 = byte_at(doc, *cursor, 1);
            let ch2 = byte_at(doc, *cursor, 2);

            if ch == b'"' && ch1 == b'"' && ch2 == b'"' {
                cursor.pos += 3;
                consume(doc, cursor, Token::StrMlBasic)?;
                cursor.pos += 3;
                line = require_line(cursor)?;
                continue;
            }
            if ch == b'\'' && ch1 == b'\'' && ch2 == b'\'' {
                cursor.pos += 3;
                consume(doc, cursor, Token::StrMlLiteral)?;
                cursor.pos += 3;
                line = require_line(cursor)?;
                continue;
            }
            if ch == b'"' {
                cursor.pos += 1;
                consume(doc, cursor, Token::StrBasic)?;
                cursor.pos += 1;
                continue;
            }
            if ch == b'\'' {
                cursor.pos += 1;
                consume(doc, cursor, Token::StrLiteral)?;
                cursor.pos += 1;
                continue;
            }
            if ch == b'[' {
                depth += 1;
            }
            if ch == b']' {
                depth -= 1;
                cursor.pos += 1;
                if depth == 0 {
                    return Ok(());
                }
                continue;
            }
            cursor.pos += 1;
        }
        match doc.next(line) {
            Some(next) => {
                line = next;
                cursor.line = Some(line);
                cursor.pos = 0;
            }
            None => {
                return Err(Error::Syntax {
                    message: "unclosed array",
                })
            }
        }
    }
}

/// `consume(doc, cursor, Token::InlineTable)` expects the cursor at `{` and
/// ends one past the matching `}`. Inline tables are single-line in TOML —
/// failure to close before the line ends is a syntax error, not a
/// continuation onto the next line.
fn consume_inline_table(doc: &Document, cursor: &mut Cursor) -> Result<()> {
    if byte_at(doc, *cursor, 0) != b'{' {
        return Err(Error::Syntax {
            message: "inline table value does not start with '{'",
        });
    }
    let mut depth = 1i32;
    cursor.pos += 1;
    let line = require_line(cursor)?;
    let len = doc.line(line).len();
    while cursor.pos < len {
        let ch = byte_at(doc, *cursor, 0);
        let ch1 = byte_at(doc, *cursor, 1);
        let ch2 = byte_at(doc, *cursor, 2);

        if ch == b'"' && ch1 == b'"' && ch2 == b'"' {
            cursor.pos += 3;
            consume(doc, cursor, Token::StrMlBasic)?;
            cursor.pos += 3;
            continue;
        }
        if ch == b'\'' && ch1 == b'\'' && ch2 == b'\'' {
            cursor.pos += 3;
            consume(doc, cursor, Token::StrMlLiteral)?;
            cursor.pos += 3;
            continue;
        }
        if ch == b'"' {
            cursor.pos += 1;
            consume(doc, cursor, Token::StrBasic)?;
            cursor.pos += 1;
            continue;
        }
        if ch == b'\'' {
            cursor.pos += 1;
            consume(doc, cursor, Token::StrLiteral)?;
            cursor.pos += 1;
            continue;
        }
        if ch == b'{' {
            depth += 1;
        }
        if ch == b'}' {
            depth -= 1;
            cursor.pos += 1;
            if depth == 0 {
                return Ok(());
            }
            continue;
        }
        cursor.pos += 1;
    }
    Err(Error::Syntax {
        message: "unclosed inline table (must be single-line)",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn cur_at(doc: &Document, pos: usize) -> Cursor {
        Cursor::at(doc.head().unwrap(), pos)
    }

    #[test]
    fn comment_consumes_to_end_of_line() {
        let doc = Document::from_bytes(b"# hello world\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Comment).unwrap();
        assert_eq!(c.pos(), 13);
    }

    #[test]
    fn table_header_stops_after_bracket() {
        let doc = Document::from_bytes(b"[table]\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::TableHeader).unwrap();
        assert_eq!(c.pos(), 7);
    }

    #[test]
    fn array_table_header_requires_double_bracket() {
        let doc = Document::from_bytes(b"[[table]]\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::ArrayTableHeader).unwrap();
        assert_eq!(c.pos(), 9);
    }

    #[test]
    fn key_stops_before_equals() {
        let doc = Document::from_bytes(b"name = 1\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Key).unwrap();
        assert_eq!(c.pos(), 5);
    }

    #[test]
    fn key_with_zero_length_is_not_found() {
        let doc = Document::from_bytes(b"= 1\n");
        let mut c = cur_at(&doc, 0);
        assert!(matches!(consume(&doc, &mut c, Token::Key), Err(Error::NotFound)));
    }

    #[test]
    fn quoted_key_with_escape_is_skipped() {
        let doc = Document::from_bytes(b"\"a\\\"b\" = 1\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Key).unwrap();
        assert_eq!(c.pos(), 7);
    }

    #[test]
    fn value_bare_number() {
        let doc = Document::from_bytes(b"42\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Value).unwrap();
        assert_eq!(c.pos(), 2);
    }

    #[test]
    fn value_basic_string_ends_past_closing_quote() {
        let doc = Document::from_bytes(b"\"abc\"\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Value).unwrap();
        assert_eq!(c.pos(), 5);
    }

    #[test]
    fn str_basic_stops_at_quote_not_past_it() {
        let doc = Document::from_bytes(b"abc\"\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::StrBasic).unwrap();
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn str_basic_handles_escaped_quote() {
        let doc = Document::from_bytes(b"a\\\"b\"\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::StrBasic).unwrap();
        assert_eq!(c.pos(), 4);
    }

    #[test]
    fn str_basic_unterminated_is_syntax_error() {
        let doc = Document::from_bytes(b"abc\n");
        let mut c = cur_at(&doc, 0);
        assert!(matches!(
            consume(&doc, &mut c, Token::StrBasic),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn array_tracks_nested_depth_and_strings() {
        let doc = Document::from_bytes(b"[1, [2, 3], \"]\"]\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::Array).unwrap();
        assert_eq!(c.pos(), 17);
    }

    #[test]
    fn inline_table_must_close_on_same_line() {
        let doc = Document::from_bytes(b"{ a = 1\n");
        let mut c = cur_at(&doc, 0);
        assert!(matches!(
            consume(&doc, &mut c, Token::InlineTable),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn inline_table_closes_with_nested_braces() {
        let doc = Document::from_bytes(b"{ a = { b = 1 } }\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::InlineTable).unwrap();
        assert_eq!(c.pos(), 17);
    }

    #[test]
    fn multiline_basic_string_spans_lines() {
        let doc = Document::from_bytes(b"abc\ndef\"\"\"\n");
        let mut c = cur_at(&doc, 0);
        consume(&doc, &mut c, Token::StrMlBasic).unwrap();
        assert_eq!(c.line(), doc.next(doc.head().unwrap()));
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn table_body_stops_at_next_header() {
        let doc = Document::from_bytes(b"[a]\nx = 1\n[b]\n");
        let first = doc.head().unwrap();
        let mut c = Cursor::at(first, 3);
        consume(&doc, &mut c, Token::TableBody).unwrap();
        assert_eq!(c.pos(), 0);
        assert_ne!(c.line(), Some(first));
    }

    #[test]
    fn table_body_runs_to_end_of_document() {
        let doc = Document::from_bytes(b"[a]\nx = 1\n");
        let first = doc.head().unwrap();
        let mut c = Cursor::at(first, 3);
        consume(&doc, &mut c, Token::TableBody).unwrap();
        let last = doc.tail().unwrap();
        assert_eq!(c.line(), Some(last));
        assert_eq!(c.pos(), doc.line(last).len());
    }
}
