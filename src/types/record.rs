use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::node::{BookmarkNode, Folder, Link};

/// Returns the current UNIX timestamp in seconds.
pub fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Identifier of a stored bookmark node.
///
/// Backed by a UUIDv7 string, so ids generated by one process sort
/// lexicographically in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generates a fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl ToSql for NodeId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for NodeId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(NodeId)
    }
}

/// Storage tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Link,
    Folder,
    Separator,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Link => "link",
            RecordKind::Folder => "folder",
            RecordKind::Separator => "separator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "link" => Some(RecordKind::Link),
            "folder" => Some(RecordKind::Folder),
            "separator" => Some(RecordKind::Separator),
            _ => None,
        }
    }
}

impl ToSql for RecordKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecordKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        RecordKind::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown record kind: {}", text).into()))
    }
}

/// Flat, parent-referencing persistence shape of one node.
///
/// Timestamps are whole seconds since the epoch and always concrete.
/// `parent_id == None` marks a top-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub add_date: i64,
    pub last_modified: i64,
    pub parent_id: Option<NodeId>,
    /// Position among the records sharing `parent_id`.
    pub index: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub toolbar: bool,
}

/// A stored record with its children joined in, built on demand for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewNode {
    #[serde(flatten)]
    pub record: StoredRecord,
    #[serde(default)]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    /// Projects the view back onto the parse model. Identifiers, parent
    /// references and indices are storage concepts and are dropped.
    pub fn to_bookmark_node(&self) -> BookmarkNode {
        let record = &self.record;
        match record.kind {
            RecordKind::Link => BookmarkNode::Link(Link {
                title: record.title.clone(),
                url: record.url.clone().unwrap_or_default(),
                icon: record.icon.clone(),
                add_date: Some(record.add_date),
                last_modified: Some(record.last_modified),
            }),
            RecordKind::Folder => BookmarkNode::Folder(Folder {
                title: record.title.clone(),
                add_date: Some(record.add_date),
                last_modified: Some(record.last_modified),
                toolbar: record.toolbar,
                children: self.children.iter().map(ViewNode::to_bookmark_node).collect(),
            }),
            RecordKind::Separator => BookmarkNode::Separator,
        }
    }

    /// Depth-first search for a node by id within this subtree.
    pub fn find(&self, id: &NodeId) -> Option<&ViewNode> {
        if &self.record.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Input of `create`: the id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub parent_id: Option<NodeId>,
    /// Position among the new siblings; appended when `None` or past the end.
    pub index: Option<u32>,
    pub kind: RecordKind,
    pub title: String,
    pub url: Option<String>,
}

impl NewNode {
    pub fn link(parent_id: Option<NodeId>, title: &str, url: &str) -> Self {
        Self {
            parent_id,
            index: None,
            kind: RecordKind::Link,
            title: title.to_string(),
            url: Some(url.to_string()),
        }
    }

    pub fn folder(parent_id: Option<NodeId>, title: &str) -> Self {
        Self {
            parent_id,
            index: None,
            kind: RecordKind::Folder,
            title: title.to_string(),
            url: None,
        }
    }
}

/// Target of `move_node`. `parent_id == None` moves the node to the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub parent_id: Option<NodeId>,
    pub index: Option<u32>,
}

/// Field changes accepted by `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeChanges {
    pub title: Option<String>,
    pub url: Option<String>,
}
