#![no_main]

use libfuzzer_sys::fuzz_target;
use tomledit_core::{doc_span, find_next, Cursor, Document, EditorConfig, IterationGuard};

fuzz_target!(|data: &[u8]| {
    let doc = Document::from_bytes(data);
    let span = doc_span(&doc);
    let config = EditorConfig::default();
    let mut guard = IterationGuard::new();
    let mut cursor = Cursor::empty();

    loop {
        if guard.step(config.max_iterations).is_err() {
            break;
        }
        match find_next(&doc, &span, &mut cursor) {
            Ok(Some(_child)) => continue,
            Ok(None) | Err(_) => break,
        }
    }
});
