//! The document model: an arena of lines, threaded into an active list and
//! a graveyard.
//!
//! A pointer-based implementation links `Line` structs via `prev`/`next`
//! pointers and moves a line between the active list and the "boneyard" by
//! re-pointing those links. Rust has no equivalent of "the same struct, just
//! relinked" without either unsafe code or a pointer-stable arena. This
//! crate uses the latter: every [`Line`] lives for the lifetime of the
//! [`Document`] in a single `Vec`, addressed by [`LineId`], and `prev`/
//! `next` are `Option<LineId>` fields instead of pointers. Unlinking a line
//! just rewrites the two lists' links around it and flips its `owner` tag;
//! nothing moves or is freed until the whole arena drops.

use crate::error::Result;

/// An index into a [`Document`]'s line arena.
///
/// Not a line number — line numbers are advisory display metadata on
/// [`Line`] and are not kept in sync across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(u32);

impl LineId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which list a line currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Active,
    Graveyard,
}

/// A single line of the document: an owned byte buffer with no terminator
/// and no embedded newline, plus its position in whichever list owns it.
#[derive(Debug, Clone)]
pub struct Line {
    text: Box<[u8]>,
    /// 1-based, assigned on load, not authoritative after edits.
    pub linenum: u32,
    prev: Option<LineId>,
    next: Option<LineId>,
    owner: Owner,
}

impl Line {
    /// The line's content.
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The line's length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if this line has zero bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An ordered line buffer with a graveyard of logically-deleted lines.
///
/// The active list is what [`crate::serializer`] emits. The graveyard holds
/// lines detached by an edit, retained so that spans which aliased the
/// replaced region keep dereferencing valid (if stale) content — see
/// [`Document::unlink_line`].
#[derive(Debug, Default)]
pub struct Document {
    arena: Vec<Line>,
    head: Option<LineId>,
    tail: Option<LineId>,
    grave_head: Option<LineId>,
    grave_tail: Option<LineId>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `bytes` into lines on `\n`, trimming a trailing `\r` from each,
    /// and appends them to a fresh document. Accepts both `\n` and `\r\n`
    /// line terminators on input.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut doc = Self::new();
        let mut start = 0usize;
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                doc.append_line(trim_cr(&bytes[start..i]));
                start = i + 1;
            }
        }
        if start < bytes.len() {
            doc.append_line(trim_cr(&bytes[start..]));
        }
        doc
    }

    /// Reads a TOML document from a file path.
    pub fn load_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Writes the document to a file path, one `\n` after every line
    /// (including the last) — see [`crate::serializer`].
    pub fn save_path(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        crate::serializer::write_to(self, file)
    }

    /// Appends a new line containing `text` to the tail of the active list.
    /// Returns the new line's id.
    pub fn append_line(&mut self, text: &[u8]) -> LineId {
        let id = LineId(self.arena.len() as u32);
        let linenum = self
            .tail
            .map(|t| self.line(t).linenum + 1)
            .unwrap_or(1);
        self.arena.push(Line {
            text: text.to_vec().into_boxed_slice(),
            linenum,
            prev: self.tail,
            next: None,
            owner: Owner::Active,
        });
        match self.tail {
            Some(tail) => self.arena[tail.index()].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Allocates a new active-list line containing `text`, splicing it in
    /// immediately before `before` (or at the tail if `before` is `None`).
    /// Used by the editor to insert freshly built lines at a specific
    /// position rather than always at the document's end.
    pub fn insert_line_before(&mut self, text: &[u8], before: Option<LineId>) -> LineId {
        let id = LineId(self.arena.len() as u32);
        let prev = match before {
            Some(b) => self.arena[b.index()].prev,
            None => self.tail,
        };
        let linenum = prev.map(|p| self.line(p).linenum + 1).unwrap_or(1);
        self.arena.push(Line {
            text: text.to_vec().into_boxed_slice(),
            linenum,
            prev,
            next: before,
            owner: Owner::Active,
        });
        match prev {
            Some(p) => self.arena[p.index()].next = Some(id),
            None => self.head = Some(id),
        }
        match before {
            Some(b) => self.arena[b.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    /// Moves `id` from the active list to the graveyard tail. O(1).
    ///
    /// The line's content is untouched (not trimmed to any span's bounds),
    /// so a span referencing into it remains readable.
    pub fn unlink_line(&mut self, id: LineId) {
        let (prev, next) = {
            let line = &self.arena[id.index()];
            (line.prev, line.next)
        };
        match prev {
            Some(p) => self.arena[p.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena[n.index()].prev = prev,
            None => self.tail = prev,
        }

        let grave_tail = self.grave_tail;
        {
            let line = &mut self.arena[id.index()];
            line.prev = grave_tail;
            line.next = None;
            line.owner = Owner::Graveyard;
        }
        match grave_tail {
            Some(t) => self.arena[t.index()].next = Some(id),
            None => self.grave_head = Some(id),
        }
        self.grave_tail = Some(id);
    }

    /// Removes `id` from the graveyard and splices it into the active list
    /// immediately before `before` (or at the tail if `before` is `None`).
    /// O(1).
    pub fn relink_line(&mut self, id: LineId, before: Option<LineId>) {
        let (prev, next) = {
            let line = &self.arena[id.index()];
            (line.prev, line.next)
        };
        match prev {
            Some(p) => self.arena[p.index()].next = next,
            None => self.grave_head = next,
        }
        match next {
            Some(n) => self.arena[n.index()].prev = prev,
            None => self.grave_tail = prev,
        }

        let after = match before {
            Some(b) => self.arena[b.index()].prev,
            None => self.tail,
        };
        {
            let line = &mut self.arena[id.index()];
            line.prev = after;
            line.next = before;
            line.owner = Owner::Active;
        }
        match after {
            Some(a) => self.arena[a.index()].next = Some(id),
            None => self.head = Some(id),
        }
        match before {
            Some(b) => self.arena[b.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
    }

    /// Drops the graveyard list. Lines already unlinked from the active
    /// list are simply no longer reachable (the arena slots linger until
    /// the `Document` itself drops — Rust has no O(1) arbitrary-index
    /// removal from a `Vec` worth doing here, and nothing reaches them).
    pub fn clear_graveyard(&mut self) {
        self.grave_head = None;
        self.grave_tail = None;
    }

    /// Looks up a line by id.
    #[inline]
    pub fn line(&self, id: LineId) -> &Line {
        &self.arena[id.index()]
    }

    /// The id of the first line of the active list, if any.
    #[inline]
    pub fn head(&self) -> Option<LineId> {
        self.head
    }

    /// The id of the last line of the active list, if any.
    #[inline]
    pub fn tail(&self) -> Option<LineId> {
        self.tail
    }

    /// The line following `id` in whichever list currently owns it.
    #[inline]
    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.arena[id.index()].next
    }

    /// The line preceding `id` in whichever list currently owns it.
    #[inline]
    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.arena[id.index()].prev
    }

    /// True if `id` is still reachable from the active list head.
    pub fn is_active(&self, id: LineId) -> bool {
        self.arena[id.index()].owner == Owner::Active
    }

    /// Number of lines in the active list (not counting the graveyard).
    pub fn active_len(&self) -> usize {
        let mut count = 0;
        let mut cur = self.head;
        while let Some(id) = cur {
            count += 1;
            cur = self.next(id);
        }
        count
    }
}

fn trim_cr(line: &[u8]) -> &[u8] {
    if line.last() == Some(&b'\r') {
        &line[..line.len() - 1]
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newline_and_trims_cr() {
        let doc = Document::from_bytes(b"a = 1\r\nb = 2\n");
        assert_eq!(doc.active_len(), 2);
        let first = doc.head().unwrap();
        assert_eq!(doc.line(first).text(), b"a = 1");
    }

    #[test]
    fn last_line_without_trailing_newline_is_kept() {
        let doc = Document::from_bytes(b"a = 1\nb = 2");
        assert_eq!(doc.active_len(), 2);
        let last = doc.tail().unwrap();
        assert_eq!(doc.line(last).text(), b"b = 2");
    }

    #[test]
    fn empty_input_yields_empty_document() {
        let doc = Document::from_bytes(b"");
        assert_eq!(doc.active_len(), 0);
        assert!(doc.head().is_none());
    }

    #[test]
    fn unlink_then_relink_restores_active_list() {
        let mut doc = Document::from_bytes(b"a = 1\nb = 2\nc = 3\n");
        let b = doc.next(doc.head().unwrap()).unwrap();
        doc.unlink_line(b);
        assert_eq!(doc.active_len(), 2);
        assert!(!doc.is_active(b));

        let c = doc.next(doc.head().unwrap()).unwrap();
        doc.relink_line(b, Some(c));
        assert_eq!(doc.active_len(), 3);
        assert!(doc.is_active(b));

        let mut texts = Vec::new();
        let mut cur = doc.head();
        while let Some(id) = cur {
            texts.push(doc.line(id).text().to_vec());
            cur = doc.next(id);
        }
        assert_eq!(texts, vec![b"a = 1".to_vec(), b"b = 2".to_vec(), b"c = 3".to_vec()]);
    }

    #[test]
    fn unlinked_line_keeps_full_content() {
        let mut doc = Document::from_bytes(b"hello world\n");
        let id = doc.head().unwrap();
        doc.unlink_line(id);
        assert_eq!(doc.line(id).text(), b"hello world");
    }
}
