//! Conversion between the hierarchical bookmark tree and flat storage records.
//!
//! `flatten` assigns identifiers and sibling indices; `unflatten` joins records
//! back into [`ViewNode`] trees. Both are pure and never fail: records that
//! cannot be placed are dropped and reported as [`Anomaly`] values.
//!
//! Sibling order on the way back is `index` ascending. When two siblings claim
//! the same index the one that appears later in the input keeps the slot and
//! the earlier one is pushed forward, so the outcome does not depend on how
//! the records happen to be sorted apart from that tie-break.

use std::collections::HashMap;

use tracing::warn;

use crate::types::errors::Anomaly;
use crate::types::node::BookmarkNode;
use crate::types::record::{unix_seconds, NodeId, StoredRecord, ViewNode};

/// Flattens a forest into records in pre-order, stamping absent dates with now.
pub fn flatten(forest: &[BookmarkNode]) -> Vec<StoredRecord> {
    flatten_at(forest, unix_seconds())
}

/// Like [`flatten`] with an explicit `now` (seconds) for absent dates.
pub fn flatten_at(forest: &[BookmarkNode], now: i64) -> Vec<StoredRecord> {
    let mut records = Vec::new();
    flatten_into(forest, None, now, &mut records);
    records
}

fn flatten_into(
    nodes: &[BookmarkNode],
    parent_id: Option<&NodeId>,
    now: i64,
    records: &mut Vec<StoredRecord>,
) {
    for (position, node) in nodes.iter().enumerate() {
        let id = NodeId::generate();
        let index = u32::try_from(position).unwrap_or(u32::MAX);
        records.push(to_record(node, id.clone(), parent_id.cloned(), index, now));

        if let BookmarkNode::Folder(folder) = node {
            flatten_into(&folder.children, Some(&id), now, records);
        }
    }
}

fn to_record(
    node: &BookmarkNode,
    id: NodeId,
    parent_id: Option<NodeId>,
    index: u32,
    now: i64,
) -> StoredRecord {
    let mut record = StoredRecord {
        id,
        kind: node.kind(),
        title: String::new(),
        url: None,
        icon: None,
        add_date: now,
        last_modified: now,
        parent_id,
        index,
        toolbar: false,
    };
    match node {
        BookmarkNode::Link(link) => {
            record.title = link.title.clone();
            record.url = Some(link.url.clone());
            record.icon = link.icon.clone();
            record.add_date = link.add_date.unwrap_or(now);
            record.last_modified = link.last_modified.unwrap_or(now);
        }
        BookmarkNode::Folder(folder) => {
            record.title = folder.title.clone();
            record.add_date = folder.add_date.unwrap_or(now);
            record.last_modified = folder.last_modified.unwrap_or(now);
            record.toolbar = folder.toolbar;
        }
        BookmarkNode::Separator => {}
    }
    record
}

/// Joins records into a forest of view nodes.
pub fn unflatten(records: &[StoredRecord]) -> Vec<ViewNode> {
    unflatten_with_report(records).0
}

/// Joins records into a forest and returns every anomaly met on the way.
///
/// A record is a root iff its `parent_id` is `None`. Records whose parent id
/// does not resolve are left out of the forest rather than promoted to roots.
pub fn unflatten_with_report(records: &[StoredRecord]) -> (Vec<ViewNode>, Vec<Anomaly>) {
    let mut anomalies = Vec::new();

    // Arena: slot number -> record, id -> slot number.
    let mut slots: Vec<&StoredRecord> = Vec::with_capacity(records.len());
    let mut slot_of: HashMap<&NodeId, usize> = HashMap::with_capacity(records.len());
    for record in records {
        if slot_of.contains_key(&record.id) {
            anomalies.push(Anomaly::DuplicateId(record.id.clone()));
            continue;
        }
        slot_of.insert(&record.id, slots.len());
        slots.push(record);
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    for (slot, record) in slots.iter().enumerate() {
        match &record.parent_id {
            None => roots.push(slot),
            Some(parent_id) => match slot_of.get(parent_id) {
                Some(&parent) => children[parent].push(slot),
                None => anomalies.push(Anomaly::MissingReference {
                    id: record.id.clone(),
                    parent_id: parent_id.clone(),
                }),
            },
        }
    }

    order_siblings(&mut roots, &slots, &mut anomalies);
    for siblings in children.iter_mut() {
        order_siblings(siblings, &slots, &mut anomalies);
    }

    for anomaly in &anomalies {
        warn!(%anomaly, "irregular bookmark record");
    }

    let forest = roots
        .into_iter()
        .map(|root| materialize(root, &slots, &mut children))
        .collect();
    (forest, anomalies)
}

/// Sorts by index; on equal indices the later slot goes first.
fn order_siblings(siblings: &mut [usize], slots: &[&StoredRecord], anomalies: &mut Vec<Anomaly>) {
    siblings.sort_by(|&a, &b| slots[a].index.cmp(&slots[b].index).then(b.cmp(&a)));

    for pair in siblings.windows(2) {
        let (winner, displaced) = (slots[pair[0]], slots[pair[1]]);
        if winner.index == displaced.index {
            anomalies.push(Anomaly::IndexConflict {
                parent: winner.parent_id.clone(),
                index: winner.index,
                winner: winner.id.clone(),
                displaced: displaced.id.clone(),
            });
        }
    }
}

// Every slot sits in at most one sibling list and roots in none, so the walk
// from a root cannot revisit a slot even when the input contains cycles.
fn materialize(slot: usize, slots: &[&StoredRecord], children: &mut [Vec<usize>]) -> ViewNode {
    let own = std::mem::take(&mut children[slot]);
    ViewNode {
        record: slots[slot].clone(),
        children: own
            .into_iter()
            .map(|child| materialize(child, slots, children))
            .collect(),
    }
}

/// Number of records in a forest of views.
pub fn count_views(forest: &[ViewNode]) -> usize {
    forest
        .iter()
        .map(|view| 1 + count_views(&view.children))
        .sum()
}
