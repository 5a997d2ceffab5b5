//! Read-path scenarios: flat keys, table descent, array-of-tables iteration.

use tomledit_core::{doc_span, find_by_name, find_next_by_name, get_string, keyval_slice, get_text, Cursor, Document, SpanKind};

#[test]
fn flat_read() {
    let doc = Document::from_bytes(b"title = \"Test Document\"\nversion = 42\nenabled = true\n");
    let span = doc_span(&doc);

    assert_eq!(get_string(&doc, &span, b"title").unwrap(), b"Test Document");
    assert_eq!(get_string(&doc, &span, b"version").unwrap(), b"42");
    assert_eq!(get_string(&doc, &span, b"enabled").unwrap(), b"true");
}

#[test]
fn table_descent() {
    let doc = Document::from_bytes(b"[database]\nhost = \"localhost\"\nport = 5432\n");
    let root = doc_span(&doc);

    let database = find_by_name(&doc, &root, b"database").unwrap();
    let host_kv = find_by_name(&doc, &database, b"host").unwrap();
    let (_, value) = keyval_slice(&doc, &host_kv).unwrap();

    assert_eq!(get_text(&doc, &value).unwrap(), b"localhost");
}

#[test]
fn array_of_tables_iteration() {
    let doc = Document::from_bytes(
        b"[[items]]\ndata = {nested = {value = 100}}\n[[items]]\ndata = {x = 30}\n",
    );
    let root = doc_span(&doc);

    let mut cursor = Cursor::empty();
    let first = find_next_by_name(&doc, &root, b"items", &mut cursor).unwrap();
    let second = find_next_by_name(&doc, &root, b"items", &mut cursor).unwrap();
    assert_ne!(first.lex_start.line(), second.lex_start.line());

    let data_kv = find_by_name(&doc, &second, b"data").unwrap();
    let (_, data_value) = keyval_slice(&doc, &data_kv).unwrap();
    assert_eq!(data_value.kind, SpanKind::NodeInlineTable);
    let x_kv = find_by_name(&doc, &data_value, b"x").unwrap();
    let (_, x_value) = keyval_slice(&doc, &x_kv).unwrap();

    assert_eq!(get_text(&doc, &x_value).unwrap(), b"30");
}

#[test]
fn missing_key_returns_not_found() {
    let doc = Document::from_bytes(b"title = \"hi\"\n");
    let span = doc_span(&doc);
    assert!(get_string(&doc, &span, b"missing").is_err());
}

#[test]
fn comment_only_document_has_no_keyvals() {
    let doc = Document::from_bytes(b"# just a comment\n");
    let span = doc_span(&doc);
    assert!(find_by_name(&doc, &span, b"anything").is_err());
}

#[test]
fn empty_document_has_no_start_line_for_traversal() {
    let doc = Document::from_bytes(b"");
    let span = doc_span(&doc);
    let mut cursor = Cursor::empty();
    assert!(tomledit_core::find_next(&doc, &span, &mut cursor).is_err());
}
