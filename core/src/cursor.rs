//! The cursor: a (line, byte offset) position that can walk across line
//! boundaries without the document ever handing out a borrow that outlives
//! a single call.
//!
//! Movement methods take `&Document` rather than storing one, so `Cursor`
//! stays `Copy` and can be threaded through repeated [`crate::navigator::find_next`]
//! calls the same way a loop variable is.

use crate::document::{Document, LineId};

/// A position in a document: a line reference and a byte offset into it.
///
/// An *empty* cursor (`line: None`) means "unset" — consumers interpret it
/// as "start from the enclosing span's beginning" rather than a position in
/// its own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) line: Option<LineId>,
    pub(crate) pos: usize,
    /// Set once a movement or skip walks past the last byte of the last
    /// line. Short-circuits further iteration.
    pub(crate) complete: bool,
}

impl Cursor {
    /// An empty cursor: no line reference, not complete.
    pub const fn empty() -> Self {
        Self {
            line: None,
            pos: 0,
            complete: false,
        }
    }

    /// A cursor at a specific line and offset.
    pub const fn at(line: LineId, pos: usize) -> Self {
        Self {
            line: Some(line),
            pos,
            complete: false,
        }
    }

    /// True if this cursor has no line reference.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.line.is_none()
    }

    /// True if a movement has walked this cursor past the document's end.
    #[inline]
    pub const fn is_complete(self) -> bool {
        self.complete
    }

    /// The line this cursor references, if any.
    #[inline]
    pub const fn line(self) -> Option<LineId> {
        self.line
    }

    /// The byte offset into [`Cursor::line`].
    #[inline]
    pub const fn pos(self) -> usize {
        self.pos
    }

    /// Compares two cursors by document order: line order first (by walking
    /// `next` links from `a`), then byte offset on the same line.
    ///
    /// Both cursors must reference lines in the same list (both active, or
    /// both reachable by walking from the same origin) for this to be
    /// meaningful — comparisons are only meant to happen within one span's
    /// bounds.
    pub fn cmp(self, other: Self, doc: &Document) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        let (Some(a), Some(b)) = (self.line, other.line) else {
            return Ordering::Equal;
        };
        if a == b {
            return self.pos.cmp(&other.pos);
        }
        let mut cur = Some(a);
        while let Some(id) = cur {
            if id == b {
                return Ordering::Less;
            }
            cur = doc.next(id);
        }
        Ordering::Greater
    }

    /// Advances the cursor by `n` bytes (negative = backward), crossing
    /// line boundaries. On overrun past document end/start, the cursor is
    /// clamped at the terminal line and `false` is returned ("done"); the
    /// cursor remains valid either way. Called on an empty cursor, it does
    /// nothing and returns `false`.
    pub fn move_by(&mut self, doc: &Document, n: i64) -> bool {
        let Some(mut line) = self.line else {
            return false;
        };
        let mut pos = self.pos as i64;
        pos += n;

        loop {
            let len = doc.line(line).len() as i64;
            if pos < 0 {
                match doc.prev(line) {
                    Some(prev) => {
                        // Crossing to the previous line lands one past its
                        // last byte (the newline separator), not at its end.
                        let prev_len = doc.line(prev).len() as i64;
                        pos += prev_len + 1;
                        line = prev;
                    }
                    None => {
                        self.line = Some(line);
                        self.pos = 0;
                        self.complete = true;
                        return false;
                    }
                }
            } else if pos > len {
                match doc.next(line) {
                    Some(next) => {
                        pos -= len + 1;
                        line = next;
                    }
                    None => {
                        self.line = Some(line);
                        self.pos = len as usize;
                        self.complete = true;
                        return false;
                    }
                }
            } else {
                self.line = Some(line);
                self.pos = pos as usize;
                return true;
            }
        }
    }

    /// Advances past spaces and tabs only (never newlines — those are
    /// implicit at line boundaries). Returns `false` and sets the
    /// complete-flag if exhausted across all remaining lines.
    pub fn skip_ws(&mut self, doc: &Document) -> bool {
        self.skip_any(doc, b" \t")
    }

    /// Advances past any byte in `chars`, stopping at the first byte not in
    /// the set (or at document end).
    pub fn skip_any(&mut self, doc: &Document, chars: &[u8]) -> bool {
        loop {
            let Some(line) = self.line else {
                self.complete = true;
                return false;
            };
            let text = doc.line(line).text();
            while self.pos < text.len() && chars.contains(&text[self.pos]) {
                self.pos += 1;
            }
            if self.pos < text.len() {
                return true;
            }
            match doc.next(line) {
                Some(next) => {
                    self.line = Some(next);
                    self.pos = 0;
                }
                None => {
                    self.complete = true;
                    return false;
                }
            }
        }
    }

    /// The byte at the cursor's current position, if any is left on this
    /// line (does not cross lines).
    pub fn peek(self, doc: &Document) -> Option<u8> {
        let line = self.line?;
        doc.line(line).text().get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_bytes(b"abc\nde\nfghi\n")
    }

    #[test]
    fn move_forward_within_line() {
        let doc = sample();
        let mut c = Cursor::at(doc.head().unwrap(), 0);
        assert!(c.move_by(&doc, 2));
        assert_eq!(c.pos(), 2);
    }

    #[test]
    fn move_forward_crosses_line_boundary() {
        let doc = sample();
        let first = doc.head().unwrap();
        let mut c = Cursor::at(first, 2);
        // 1 byte left on "abc" (pos 2 -> 3 is end), then crossing the
        // newline lands at pos 0 of "de".
        assert!(c.move_by(&doc, 2));
        assert_eq!(c.line(), doc.next(first));
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn move_backward_crosses_line_boundary_to_prev_len_plus_pos() {
        let doc = sample();
        let first = doc.head().unwrap();
        let second = doc.next(first).unwrap();
        let mut c = Cursor::at(second, 1);
        assert!(c.move_by(&doc, -2));
        assert_eq!(c.line(), Some(first));
        // prev.len() == 3, landing pos = prev.len + pos = 3 + (1 - 2) = 2
        assert_eq!(c.pos(), 2);
    }

    #[test]
    fn move_past_document_end_clamps_and_reports_done() {
        let doc = sample();
        let last = doc.tail().unwrap();
        let mut c = Cursor::at(last, 0);
        assert!(!c.move_by(&doc, 100));
        assert!(c.is_complete());
        assert_eq!(c.line(), Some(last));
        assert_eq!(c.pos(), doc.line(last).len());
    }

    #[test]
    fn move_past_document_start_clamps_and_reports_done() {
        let doc = sample();
        let first = doc.head().unwrap();
        let mut c = Cursor::at(first, 1);
        assert!(!c.move_by(&doc, -100));
        assert!(c.is_complete());
        assert_eq!(c.line(), Some(first));
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn skip_ws_stops_at_non_whitespace() {
        let mut doc = Document::new();
        doc.append_line(b"   x");
        let mut c = Cursor::at(doc.head().unwrap(), 0);
        assert!(c.skip_ws(&doc));
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn skip_ws_crossing_all_lines_completes() {
        let mut doc = Document::new();
        doc.append_line(b"  ");
        doc.append_line(b" ");
        let mut c = Cursor::at(doc.head().unwrap(), 0);
        assert!(!c.skip_ws(&doc));
        assert!(c.is_complete());
    }
}
