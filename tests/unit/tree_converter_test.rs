//! Unit tests for the flat/tree converter.

use bookmark_transcoder::services::tree_converter::{
    count_views, flatten, flatten_at, unflatten, unflatten_with_report,
};
use bookmark_transcoder::types::errors::Anomaly;
use bookmark_transcoder::types::node::{BookmarkNode, Folder, Link};
use bookmark_transcoder::types::record::{NodeId, RecordKind, StoredRecord, ViewNode};
use pretty_assertions::assert_eq;
use rstest::rstest;

const NOW: i64 = 1_700_000_000;

fn record(id: &str, parent: Option<&str>, index: u32) -> StoredRecord {
    StoredRecord {
        id: NodeId::from(id),
        kind: RecordKind::Folder,
        title: id.to_string(),
        url: None,
        icon: None,
        add_date: 1,
        last_modified: 1,
        parent_id: parent.map(NodeId::from),
        index,
        toolbar: false,
    }
}

fn titles(views: &[ViewNode]) -> Vec<&str> {
    views.iter().map(|view| view.record.title.as_str()).collect()
}

fn sample_forest() -> Vec<BookmarkNode> {
    vec![Folder::new(
        "A",
        vec![
            Link::new("B", "https://b.example").into(),
            Link::new("C", "https://c.example").into(),
        ],
    )
    .into()]
}

// === flatten ===

#[test]
fn test_flatten_folder_with_two_links_scenario() {
    let records = flatten(&sample_forest());

    assert_eq!(records.len(), 3);
    let (a, b, c) = (&records[0], &records[1], &records[2]);

    assert_eq!(a.title, "A");
    assert_eq!(a.kind, RecordKind::Folder);
    assert_eq!(a.parent_id, None);
    assert_eq!(a.index, 0);

    assert_eq!(b.title, "B");
    assert_eq!(b.parent_id.as_ref(), Some(&a.id));
    assert_eq!(b.index, 0);
    assert_eq!(b.url.as_deref(), Some("https://b.example"));

    assert_eq!(c.title, "C");
    assert_eq!(c.parent_id.as_ref(), Some(&a.id));
    assert_eq!(c.index, 1);
}

#[test]
fn test_flatten_is_pre_order() {
    let forest: Vec<BookmarkNode> = vec![
        Folder::new(
            "outer",
            vec![
                Folder::new("inner", vec![Link::new("deep", "d").into()]).into(),
                Link::new("after-inner", "a").into(),
            ],
        )
        .into(),
        Link::new("top", "t").into(),
    ];

    let records = flatten(&forest);
    let order: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(order, vec!["outer", "inner", "deep", "after-inner", "top"]);

    // Every parent appears before its children.
    for (position, record) in records.iter().enumerate() {
        if let Some(parent_id) = &record.parent_id {
            let parent_position = records.iter().position(|r| &r.id == parent_id).unwrap();
            assert!(parent_position < position);
        }
    }
}

#[test]
fn test_flatten_assigns_unique_time_ordered_ids() {
    let forest: Vec<BookmarkNode> = (0..50)
        .map(|i| Link::new(format!("l{}", i), "u").into())
        .collect();
    let records = flatten(&forest);

    let mut ids: Vec<&NodeId> = records.iter().map(|r| &r.id).collect();
    let generated = ids.clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert_eq!(ids, generated, "ids sort in creation order");
}

#[test]
fn test_flatten_stamps_missing_dates_only() {
    let forest: Vec<BookmarkNode> = vec![
        Link {
            add_date: Some(10),
            ..Link::new("dated", "u")
        }
        .into(),
        Link::new("undated", "u").into(),
        BookmarkNode::Separator,
    ];
    let records = flatten_at(&forest, NOW);

    assert_eq!((records[0].add_date, records[0].last_modified), (10, NOW));
    assert_eq!((records[1].add_date, records[1].last_modified), (NOW, NOW));
    assert_eq!(records[2].kind, RecordKind::Separator);
    assert_eq!(records[2].add_date, NOW);
}

#[test]
fn test_flatten_keeps_icon_and_toolbar() {
    let forest: Vec<BookmarkNode> = vec![Folder {
        toolbar: true,
        children: vec![Link {
            icon: Some("data:x".to_string()),
            ..Link::new("i", "u")
        }
        .into()],
        ..Folder::new("bar", Vec::new())
    }
    .into()];
    let records = flatten_at(&forest, NOW);

    assert!(records[0].toolbar);
    assert_eq!(records[1].icon.as_deref(), Some("data:x"));
    assert!(!records[1].toolbar);
}

#[test]
fn test_flatten_empty_forest() {
    assert!(flatten(&[]).is_empty());
}

// === unflatten ===

#[test]
fn test_unflatten_any_input_order() {
    let records = vec![
        record("c2", Some("p"), 2),
        record("c0", Some("p"), 0),
        record("q", None, 1),
        record("c1", Some("p"), 1),
        record("p", None, 0),
    ];
    let forest = unflatten(&records);

    assert_eq!(titles(&forest), vec!["p", "q"]);
    assert_eq!(titles(&forest[0].children), vec!["c0", "c1", "c2"]);
    assert!(forest[1].children.is_empty());
}

#[test]
fn test_unflatten_excludes_missing_parent() {
    let records = vec![
        record("root", None, 0),
        record("orphan", Some("ghost"), 0),
        record("orphan-child", Some("orphan"), 0),
    ];
    let (forest, anomalies) = unflatten_with_report(&records);

    assert_eq!(titles(&forest), vec!["root"]);
    assert_eq!(count_views(&forest), 1);
    assert_eq!(
        anomalies,
        vec![Anomaly::MissingReference {
            id: NodeId::from("orphan"),
            parent_id: NodeId::from("ghost"),
        }]
    );
}

#[test]
fn test_unflatten_tie_break_later_record_wins() {
    let records = vec![
        record("p", None, 0),
        record("first", Some("p"), 1),
        record("second", Some("p"), 1),
        record("zero", Some("p"), 0),
    ];
    let (forest, anomalies) = unflatten_with_report(&records);

    assert_eq!(titles(&forest[0].children), vec!["zero", "second", "first"]);
    assert_eq!(
        anomalies,
        vec![Anomaly::IndexConflict {
            parent: Some(NodeId::from("p")),
            index: 1,
            winner: NodeId::from("second"),
            displaced: NodeId::from("first"),
        }]
    );
}

#[rstest]
#[case::three_way(vec![("a", 0), ("b", 0), ("c", 0)], vec!["c", "b", "a"])]
#[case::gaps_collapse(vec![("a", 7), ("b", 3), ("c", 42)], vec!["b", "a", "c"])]
#[case::conflict_after_gap(vec![("a", 5), ("b", 0), ("c", 5)], vec!["b", "c", "a"])]
fn test_unflatten_root_ordering(#[case] input: Vec<(&str, u32)>, #[case] expected: Vec<&str>) {
    let records: Vec<StoredRecord> = input
        .into_iter()
        .map(|(id, index)| record(id, None, index))
        .collect();
    assert_eq!(titles(&unflatten(&records)), expected);
}

#[test]
fn test_unflatten_duplicate_id_first_wins() {
    let mut duplicate = record("a", None, 1);
    duplicate.title = "impostor".to_string();
    let records = vec![record("a", None, 0), duplicate];

    let (forest, anomalies) = unflatten_with_report(&records);
    assert_eq!(titles(&forest), vec!["a"]);
    assert_eq!(anomalies, vec![Anomaly::DuplicateId(NodeId::from("a"))]);
}

#[test]
fn test_unflatten_cycle_is_not_reachable() {
    let records = vec![
        record("root", None, 0),
        record("x", Some("y"), 0),
        record("y", Some("x"), 0),
    ];
    let (forest, anomalies) = unflatten_with_report(&records);

    assert_eq!(count_views(&forest), 1);
    assert!(anomalies.is_empty());
}

#[test]
fn test_unflatten_empty() {
    assert!(unflatten(&[]).is_empty());
}

// === round trip ===

#[test]
fn test_flatten_then_unflatten_restores_tree() {
    let forest: Vec<BookmarkNode> = vec![
        Folder {
            add_date: Some(5),
            last_modified: Some(6),
            toolbar: true,
            ..Folder::new(
                "bar",
                vec![
                    Link {
                        add_date: Some(7),
                        last_modified: Some(8),
                        icon: Some("i".to_string()),
                        ..Link::new("rust", "https://rust-lang.org")
                    }
                    .into(),
                    BookmarkNode::Separator,
                ],
            )
        }
        .into(),
    ];

    let views = unflatten(&flatten(&forest));
    let restored: Vec<BookmarkNode> = views.iter().map(ViewNode::to_bookmark_node).collect();
    assert_eq!(restored, forest);
}

#[test]
fn test_view_find_by_id() {
    let records = flatten(&sample_forest());
    let forest = unflatten(&records);

    let c = forest[0].find(&records[2].id).unwrap();
    assert_eq!(c.record.title, "C");
    assert!(forest[0].find(&NodeId::from("nope")).is_none());
}
