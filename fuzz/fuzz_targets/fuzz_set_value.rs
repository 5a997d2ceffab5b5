#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tomledit::{doc_span, find_by_name, keyval_slice, set_value, Document};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    document: &'a [u8],
    key: &'a [u8],
    value: &'a [u8],
}

fuzz_target!(|input: Input| {
    let mut doc = Document::from_bytes(input.document);
    let before: Vec<u8> = {
        let mut out = Vec::new();
        let mut cur = doc.head();
        while let Some(id) = cur {
            out.extend_from_slice(doc.line(id).text());
            out.push(b'\n');
            cur = doc.next(id);
        }
        out
    };

    let span = doc_span(&doc);
    let Ok(keyval) = find_by_name(&doc, &span, input.key) else {
        return;
    };
    let Ok((_, mut value)) = keyval_slice(&doc, &keyval) else {
        return;
    };

    if set_value(&mut doc, &mut value, input.value).is_err() {
        // On rejection the document must be untouched.
        let mut after = Vec::new();
        let mut cur = doc.head();
        while let Some(id) = cur {
            after.extend_from_slice(doc.line(id).text());
            after.push(b'\n');
            cur = doc.next(id);
        }
        assert_eq!(before, after);
    }
});
