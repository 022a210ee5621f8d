//! Property-based tests for the flat/tree converter.
//!
//! Flattening an arbitrary forest and rebuilding it must give back the same
//! forest, whatever order the flat records arrive in.

use bookmark_transcoder::services::tree_converter::{count_views, flatten_at, unflatten_with_report};
use bookmark_transcoder::types::node::{BookmarkNode, Folder, Link};
use bookmark_transcoder::types::record::{StoredRecord, ViewNode};
use proptest::prelude::*;

const NOW: i64 = 1_700_000_000;

fn arb_date() -> impl Strategy<Value = Option<i64>> {
    proptest::option::of(0i64..4_000_000_000)
}

fn arb_link() -> impl Strategy<Value = BookmarkNode> {
    (
        "[a-zA-Z0-9 ]{0,12}",
        "https://[a-z]{1,10}\\.example/[a-z0-9]{0,6}",
        proptest::option::of("[a-zA-Z0-9:;,/+=]{1,16}"),
        arb_date(),
        arb_date(),
    )
        .prop_map(|(title, url, icon, add_date, last_modified)| {
            Link {
                title,
                url,
                icon,
                add_date,
                last_modified,
            }
            .into()
        })
}

/// Forests up to four levels deep mixing links, separators and folders.
fn arb_forest() -> impl Strategy<Value = Vec<BookmarkNode>> {
    let leaf = prop_oneof![
        4 => arb_link(),
        1 => Just(BookmarkNode::Separator),
    ];
    let node = leaf.prop_recursive(4, 48, 6, |inner| {
        (
            "[a-zA-Z0-9 ]{0,12}",
            arb_date(),
            arb_date(),
            any::<bool>(),
            prop::collection::vec(inner, 0..6),
        )
            .prop_map(|(title, add_date, last_modified, toolbar, children)| {
                Folder {
                    title,
                    add_date,
                    last_modified,
                    toolbar,
                    children,
                }
                .into()
            })
    });
    prop::collection::vec(node, 0..6)
}

/// The forest as the converter is expected to return it: absent dates
/// stamped with `now`.
fn stamped(forest: &[BookmarkNode], now: i64) -> Vec<BookmarkNode> {
    forest
        .iter()
        .map(|node| match node {
            BookmarkNode::Link(link) => Link {
                add_date: Some(link.add_date.unwrap_or(now)),
                last_modified: Some(link.last_modified.unwrap_or(now)),
                ..link.clone()
            }
            .into(),
            BookmarkNode::Folder(folder) => Folder {
                add_date: Some(folder.add_date.unwrap_or(now)),
                last_modified: Some(folder.last_modified.unwrap_or(now)),
                children: stamped(&folder.children, now),
                ..folder.clone()
            }
            .into(),
            BookmarkNode::Separator => BookmarkNode::Separator,
        })
        .collect()
}

fn to_forest(views: &[ViewNode]) -> Vec<BookmarkNode> {
    views.iter().map(ViewNode::to_bookmark_node).collect()
}

/// A forest together with its flat records in shuffled order.
fn arb_shuffled() -> impl Strategy<Value = (Vec<BookmarkNode>, Vec<StoredRecord>)> {
    arb_forest().prop_flat_map(|forest| {
        let records = flatten_at(&forest, NOW);
        (Just(forest), Just(records).prop_shuffle())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn flatten_then_unflatten_restores_forest(forest in arb_forest()) {
        let records = flatten_at(&forest, NOW);
        let total: usize = forest.iter().map(BookmarkNode::count).sum();
        prop_assert_eq!(records.len(), total);

        let (views, anomalies) = unflatten_with_report(&records);
        prop_assert!(anomalies.is_empty(), "unexpected anomalies: {:?}", anomalies);
        prop_assert_eq!(count_views(&views), total);
        prop_assert_eq!(to_forest(&views), stamped(&forest, NOW));
    }

    #[test]
    fn unflatten_ignores_record_order((forest, shuffled) in arb_shuffled()) {
        let views = unflatten_with_report(&shuffled).0;
        prop_assert_eq!(to_forest(&views), stamped(&forest, NOW));
    }

    #[test]
    fn flatten_places_parents_first_with_dense_indices(forest in arb_forest()) {
        let records = flatten_at(&forest, NOW);
        for (position, record) in records.iter().enumerate() {
            let siblings_before = records[..position]
                .iter()
                .filter(|other| other.parent_id == record.parent_id)
                .count();
            prop_assert_eq!(record.index as usize, siblings_before);

            if let Some(parent_id) = &record.parent_id {
                let parent = records[..position].iter().position(|other| &other.id == parent_id);
                prop_assert!(parent.is_some(), "parent of {} must come first", record.id);
            }
        }
    }
}
