use serde::{Deserialize, Serialize};

use super::record::{RecordKind, StoredRecord, ViewNode};

/// Converts a storage timestamp (seconds) to the browser API unit (milliseconds).
pub fn seconds_to_millis(seconds: i64) -> i64 {
    seconds.saturating_mul(1000)
}

/// Special folder marker exposed to extension consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderType {
    #[serde(rename = "bookmarks-bar")]
    BookmarksBar,
}

/// Consumer-facing tree node shaped like the browser bookmark API.
///
/// Unlike the file format and the store, timestamps here are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub date_added: i64,
    /// Folders only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_group_modified: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_type: Option<FolderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Builds a childless node from a stored record.
    pub fn from_record(record: &StoredRecord) -> Self {
        let is_folder = record.kind == RecordKind::Folder;
        Self {
            id: record.id.to_string(),
            parent_id: record.parent_id.as_ref().map(ToString::to_string),
            index: record.index,
            kind: record.kind,
            title: record.title.clone(),
            url: match record.kind {
                RecordKind::Link => Some(record.url.clone().unwrap_or_default()),
                _ => None,
            },
            icon: record.icon.clone(),
            date_added: seconds_to_millis(record.add_date),
            date_group_modified: is_folder.then(|| seconds_to_millis(record.last_modified)),
            folder_type: (is_folder && record.toolbar).then_some(FolderType::BookmarksBar),
            children: None,
        }
    }

    /// Builds a node and its whole subtree from a view. Folders always carry
    /// a `children` array, possibly empty.
    pub fn from_view(view: &ViewNode) -> Self {
        let mut node = Self::from_record(&view.record);
        if view.record.kind == RecordKind::Folder {
            node.children = Some(view.children.iter().map(TreeNode::from_view).collect());
        }
        node
    }
}
