//! In-place value replacement with rollback, plus the lower-level
//! unlink/relink primitives used to snapshot a span for atomic operations.
//!
//! [`set_value`]/[`set_value_multiline`] never touch the live document
//! until the replacement text has been re-lexed as a valid TOML value:
//! the candidate lines are built and validated against a throwaway
//! [`Document`], and only committed to the real one once that validation
//! succeeds. On any failure the real document is untouched.

use crate::cursor::Cursor;
use crate::document::{Document, LineId};
use crate::error::{Error, Result};
use crate::lexer::{self, Token};
use crate::span::Span;

/// The cursors `unlink_span` hands back, needed to undo it with
/// `relink_span`.
#[derive(Debug, Clone, Copy)]
pub struct UnlinkedSpan {
    /// Where the span's lines used to sit: the line that followed them (or
    /// `None` if they were the document's tail).
    reinsert: Option<LineId>,
    /// A synthesized line holding the bytes before the span's lexical
    /// start on its first line, if any.
    prefix: Option<LineId>,
    /// A synthesized line holding the bytes after the span's lexical end
    /// on its last line, if any.
    suffix: Option<LineId>,
}

/// Detaches `span`'s lines into the graveyard. If the span started or
/// ended mid-line, synthesizes a prefix and/or suffix line holding the
/// bytes outside the span on those edge lines, splicing them into the
/// active list at the span's old position so the rest of the document's
/// content is not lost. When both a prefix and a suffix would land on the
/// same original single line, they are merged into one line.
pub fn unlink_span(doc: &mut Document, span: &Span) -> Result<UnlinkedSpan> {
    let first = span.lex_start.line().ok_or(Error::InvalidArg {
        message: "span has no start line",
    })?;
    let last = span.lex_end.line().ok_or(Error::InvalidArg {
        message: "span has no end line",
    })?;

    let start_pos = span.lex_start.pos();
    let end_pos = span.lex_end.pos();
    let prefix_len = start_pos;
    let last_len = doc.line(last).len();
    let suffix_len = if end_pos < last_len { last_len - end_pos } else { 0 };
    let single_line = first == last;

    let reinsert = doc.next(last);

    let first_prefix = doc.line(first).text()[..prefix_len].to_vec();
    let last_suffix = doc.line(last).text()[end_pos..].to_vec();

    let (merged, separate_prefix, separate_suffix) = if single_line && prefix_len > 0 && suffix_len > 0 {
        let mut merged = first_prefix;
        merged.extend_from_slice(&last_suffix);
        (Some(merged), None, None)
    } else {
        let p = if prefix_len > 0 { Some(first_prefix) } else { None };
        let s = if suffix_len > 0 { Some(last_suffix) } else { None };
        (None, p, s)
    };

    // Unlink the span's own lines to the graveyard before splicing in any
    // synthesized prefix/suffix lines.
    let mut id = first;
    loop {
        let next = doc.next(id);
        doc.unlink_line(id);
        if id == last {
            break;
        }
        match next {
            Some(n) => id = n,
            None => break,
        }
    }

    let mut prefix_id = None;
    let mut suffix_id = None;
    if let Some(content) = merged {
        prefix_id = Some(doc.insert_line_before(&content, reinsert));
    } else {
        if let Some(content) = separate_prefix {
            prefix_id = Some(doc.insert_line_before(&content, reinsert));
        }
        if let Some(content) = separate_suffix {
            suffix_id = Some(doc.insert_line_before(&content, reinsert));
        }
    }

    Ok(UnlinkedSpan {
        reinsert,
        prefix: prefix_id,
        suffix: suffix_id,
    })
}

/// Undoes [`unlink_span`] exactly: removes the synthesized prefix/suffix
/// lines, then relinks the span's original lines from the graveyard back
/// into the active list before the saved re-insertion point.
pub fn relink_span(doc: &mut Document, span: &Span, unlinked: &UnlinkedSpan) -> Result<()> {
    if let Some(p) = unlinked.prefix {
        doc.unlink_line(p);
    }
    if let Some(s) = unlinked.suffix {
        doc.unlink_line(s);
    }

    let first = span.lex_start.line().ok_or(Error::InvalidArg {
        message: "span has no start line",
    })?;
    let last = span.lex_end.line().ok_or(Error::InvalidArg {
        message: "span has no end line",
    })?;

    let mut id = first;
    loop {
        // Capture the graveyard-order successor before relinking `id`,
        // since relinking rewrites its `next` to the active-list one.
        let next = doc.next(id);
        let is_last = id == last;
        doc.relink_line(id, unlinked.reinsert);
        if is_last {
            break;
        }
        match next {
            Some(n) => id = n,
            None => break,
        }
    }
    Ok(())
}

/// Replaces a value span's semantic content with a single line of bytes.
/// See [`set_value_multiline`] for the full contract.
pub fn set_value(doc: &mut Document, span: &mut Span, value: &[u8]) -> Result<()> {
    set_value_multiline(doc, span, &[value])
}

/// Replaces the semantic content of a value span with the supplied lines.
/// On success the span's cursors are updated to reference the newly
/// inserted lines and remain valid; on any failure — including the
/// replacement failing to re-lex as a valid TOML value — the document is
/// byte-identical to its pre-call state and the span is unchanged.
pub fn set_value_multiline(doc: &mut Document, span: &mut Span, lines: &[&[u8]]) -> Result<()> {
    if lines.is_empty() {
        return Err(Error::InvalidArg {
            message: "set_value_multiline requires at least one line",
        });
    }

    let sem_start = span.sem_start.unwrap_or(span.lex_start);
    let sem_end = span.sem_end.unwrap_or(span.lex_end);

    let first_old = sem_start.line().ok_or(Error::InvalidArg {
        message: "span has no start line",
    })?;
    let last_old = sem_end.line().ok_or(Error::InvalidArg {
        message: "span has no end line",
    })?;

    let prefix_len = sem_start.pos();
    let line_count = lines.len();

    let first_old_text = doc.line(first_old).text().to_vec();
    let last_old_text = doc.line(last_old).text().to_vec();

    let mut new_contents: Vec<Vec<u8>> = Vec::with_capacity(line_count);
    for (i, content) in lines.iter().enumerate() {
        let mut buf = Vec::new();
        if line_count == 1 {
            buf.extend_from_slice(&first_old_text[..prefix_len]);
            buf.extend_from_slice(content);
            buf.extend_from_slice(&last_old_text[sem_end.pos()..]);
        } else if i == 0 {
            buf.extend_from_slice(&first_old_text[..prefix_len]);
            buf.extend_from_slice(content);
        } else if i == line_count - 1 {
            buf.extend_from_slice(content);
            buf.extend_from_slice(&last_old_text[sem_end.pos()..]);
        } else {
            buf.extend_from_slice(content);
        }
        new_contents.push(buf);
    }

    // Validate against a throwaway document before touching the real one.
    let mut scratch = Document::new();
    let mut scratch_ids = Vec::with_capacity(line_count);
    for content in &new_contents {
        scratch_ids.push(scratch.append_line(content));
    }
    let mut test_cursor = Cursor::at(scratch_ids[0], span.lex_start.pos());
    let validated = lexer::consume(&scratch, &mut test_cursor, Token::Value);

    // The value token's lexical end sits `delta` bytes past the semantic
    // content's end on the old last line (0 for bare/array/inline-table
    // values where lexical and semantic bounds coincide, 1 or 3 for a
    // quoted string's closing delimiter). Whatever follows that on the
    // line — a trailing comment, say — is outside the token and must stay
    // outside it in the replacement too.
    let delta = span.lex_end.pos() - sem_end.pos();
    let new_content_end_pos = if line_count == 1 {
        prefix_len + lines[0].len()
    } else {
        lines[line_count - 1].len()
    };
    let expected_end_pos = new_content_end_pos + delta;
    let expected_end_line = scratch_ids[line_count - 1];

    match validated {
        Ok(()) if test_cursor.line() == Some(expected_end_line) && test_cursor.pos() == expected_end_pos => {}
        _ => {
            #[cfg(feature = "trace")]
            tracing::trace!(line_count, "replacement rejected, document untouched");
            return Err(Error::Syntax {
                message: "replacement value failed to re-lex as a valid TOML value",
            });
        }
    }

    #[cfg(feature = "trace")]
    tracing::trace!(line_count, "replacement validated, committing");

    // Validated. Commit: unlink the old lines, splice in the new ones.
    let insert_before = doc.next(last_old);
    let mut id = first_old;
    loop {
        let next = doc.next(id);
        doc.unlink_line(id);
        if id == last_old {
            break;
        }
        match next {
            Some(n) => id = n,
            None => break,
        }
    }

    let mut new_ids = Vec::with_capacity(line_count);
    for content in &new_contents {
        new_ids.push(doc.insert_line_before(content, insert_before));
    }

    span.lex_start.line = Some(new_ids[0]);
    span.lex_end.line = Some(new_ids[line_count - 1]);
    span.lex_end.pos = new_content_end_pos + delta;

    if span.sem_start.is_some() {
        span.sem_start = Some(Cursor::at(new_ids[0], prefix_len));
        let sem_end_pos = if line_count == 1 { prefix_len + lines[0].len() } else { lines[line_count - 1].len() };
        span.sem_end = Some(Cursor::at(new_ids[line_count - 1], sem_end_pos));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::{doc_span, find_by_name, get_text, keyval_slice};

    #[test]
    fn set_value_replaces_bare_value() {
        let mut doc = Document::from_bytes(b"port = 80\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"port").unwrap();
        let (_, mut value) = keyval_slice(&doc, &keyval).unwrap();

        set_value(&mut doc, &mut value, b"443").unwrap();

        let first = doc.head().unwrap();
        assert_eq!(doc.line(first).text(), b"port = 443");
        assert_eq!(get_text(&doc, &value).unwrap(), b"443");
    }

    #[test]
    fn set_value_replaces_string_content_keeping_quotes() {
        let mut doc = Document::from_bytes(b"name = \"alice\"\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"name").unwrap();
        let (_, mut value) = keyval_slice(&doc, &keyval).unwrap();

        set_value(&mut doc, &mut value, b"bob").unwrap();

        let first = doc.head().unwrap();
        assert_eq!(doc.line(first).text(), b"name = \"bob\"");
        assert_eq!(get_text(&doc, &value).unwrap(), b"bob");
    }

    #[test]
    fn set_value_rolls_back_on_invalid_replacement() {
        let mut doc = Document::from_bytes(b"port = 80\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"port").unwrap();
        let (_, mut value) = keyval_slice(&doc, &keyval).unwrap();

        let before = doc.line(doc.head().unwrap()).text().to_vec();
        let result = set_value(&mut doc, &mut value, b"not a number, but trailing junk ] {");
        assert!(result.is_err());
        assert_eq!(doc.line(doc.head().unwrap()).text(), before.as_slice());
    }

    #[test]
    fn unlink_then_relink_restores_document() {
        let mut doc = Document::from_bytes(b"a = 1\nb = 2\nc = 3\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"b").unwrap();

        let before: Vec<Vec<u8>> = {
            let mut v = Vec::new();
            let mut cur = doc.head();
            while let Some(id) = cur {
                v.push(doc.line(id).text().to_vec());
                cur = doc.next(id);
            }
            v
        };

        let unlinked = unlink_span(&mut doc, &keyval).unwrap();
        relink_span(&mut doc, &keyval, &unlinked).unwrap();

        let after: Vec<Vec<u8>> = {
            let mut v = Vec::new();
            let mut cur = doc.head();
            while let Some(id) = cur {
                v.push(doc.line(id).text().to_vec());
                cur = doc.next(id);
            }
            v
        };
        assert_eq!(before, after);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn set_value_emits_trace_spans_under_a_subscriber() {
        use tracing_subscriber::layer::SubscriberExt as _;

        let subscriber = tracing_subscriber::Registry::default().with(tracing_subscriber::fmt::Layer::default());
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut doc = Document::from_bytes(b"port = 80\n");
        let span = doc_span(&doc);
        let keyval = find_by_name(&doc, &span, b"port").unwrap();
        let (_, mut value) = keyval_slice(&doc, &keyval).unwrap();

        set_value(&mut doc, &mut value, b"443").unwrap();
        assert_eq!(get_text(&doc, &value).unwrap(), b"443");
    }
}
