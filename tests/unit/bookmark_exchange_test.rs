//! Unit tests for importing bookmark HTML into the store and exporting it again.

use bookmark_transcoder::database::Database;
use bookmark_transcoder::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use bookmark_transcoder::services::bookmark_exchange::{export_html, import_html};
use bookmark_transcoder::services::html_parser::parse;
use bookmark_transcoder::services::html_serializer::SerializeOptions;
use bookmark_transcoder::types::node::BookmarkNode;
use bookmark_transcoder::types::record::NewNode;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Firefox Export</TITLE>
<H1>Bookmarks Menu</H1>
<DL><p>
    <DT><H3 ADD_DATE="1600000000" LAST_MODIFIED="1600000100" PERSONAL_TOOLBAR_FOLDER="true">Toolbar</H3>
    <DL><p>
        <DT><A HREF="https://www.mozilla.org/" ADD_DATE="1600000200" LAST_MODIFIED="1600000300" ICON="data:image/png;base64,AA">Mozilla</A>
        <DT><HR>
        <DT><A HREF="https://developer.mozilla.org/" ADD_DATE="1600000400" LAST_MODIFIED="1600000500">MDN</A>
    </DL><p>
    <DT><A HREF="https://example.com/" ADD_DATE="1600000600" LAST_MODIFIED="1600000700">Example</A>
    <DT>broken item
</DL><p>
"#;

#[test]
fn test_import_summary() {
    let db = Database::open_in_memory().unwrap();
    let mut store = BookmarkStore::new(db.connection());

    let summary = import_html(&mut store, EXPORT).unwrap();
    assert_eq!(summary.metadata.title, "Firefox Export");
    assert_eq!(summary.metadata.root_name, "Bookmarks Menu");
    assert_eq!(summary.imported, 5);
    assert_eq!(summary.dropped_fragments, 1);

    let tree = store.get_tree().unwrap();
    assert_eq!(tree.len(), 2);
    assert!(tree[0].record.toolbar);
    assert_eq!(tree[0].children.len(), 3);
}

#[test]
fn test_export_after_import_preserves_the_file() {
    let db = Database::open_in_memory().unwrap();
    let mut store = BookmarkStore::new(db.connection());
    import_html(&mut store, EXPORT).unwrap();

    let options = SerializeOptions {
        title: "Firefox Export".to_string(),
        root_name: "Bookmarks Menu".to_string(),
        indent: 4,
    };
    let html = export_html(&store, &options).unwrap();

    let original = parse(EXPORT);
    let exported = parse(&html);
    assert_eq!(exported.metadata, original.metadata);
    assert_eq!(exported.bookmarks, original.bookmarks);
}

#[test]
fn test_second_import_appends_after_existing_roots() {
    let db = Database::open_in_memory().unwrap();
    let mut store = BookmarkStore::new(db.connection());
    store.create(NewNode::folder(None, "Existing")).unwrap();

    import_html(&mut store, EXPORT).unwrap();
    import_html(&mut store, EXPORT).unwrap();

    let tree = store.get_tree().unwrap();
    let titles: Vec<&str> = tree.iter().map(|view| view.record.title.as_str()).collect();
    assert_eq!(titles, vec!["Existing", "Toolbar", "Example", "Toolbar", "Example"]);

    let indices: Vec<u32> = tree.iter().map(|view| view.record.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_export_empty_store() {
    let db = Database::open_in_memory().unwrap();
    let store = BookmarkStore::new(db.connection());

    let html = export_html(&store, &SerializeOptions::default()).unwrap();
    assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n"));
    assert!(html.ends_with("<DL><p>\n</DL><p>\n"));
    assert!(parse(&html).bookmarks.is_empty());
}

#[test]
fn test_import_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bookmarks.db");

    {
        let db = Database::open(&path).unwrap();
        let mut store = BookmarkStore::new(db.connection());
        import_html(&mut store, EXPORT).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let store = BookmarkStore::new(db.connection());
    let forest: Vec<BookmarkNode> = store
        .get_tree()
        .unwrap()
        .iter()
        .map(|view| view.to_bookmark_node())
        .collect();
    assert_eq!(forest, parse(EXPORT).bookmarks);
}
