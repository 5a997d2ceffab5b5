//! Writing a [`Document`] back out.
//!
//! Every active-list line is written followed by `\n`, including the last
//! one — a document loaded with no trailing newline gains one on save.
//! This mirrors how the document was built in the first place: a line with
//! no `\n` after it is still a complete line, it just wasn't terminated in
//! the source bytes.

use std::io::Write;

use crate::document::Document;
use crate::error::Result;

/// Serializes `doc`'s active list to `writer`, one line per `\n`-terminated
/// write.
pub fn write_to(doc: &Document, mut writer: impl Write) -> Result<()> {
    let mut cur = doc.head();
    while let Some(id) = cur {
        let line = doc.line(id);
        if !line.is_empty() {
            writer.write_all(line.text())?;
        }
        writer.write_all(b"\n")?;
        cur = doc.next(id);
    }
    Ok(())
}
