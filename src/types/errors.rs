use super::record::NodeId;

// === Anomaly ===

/// Recoverable irregularities met while parsing or converting.
///
/// None of these abort an operation: the offending unit is dropped or
/// reordered and processing continues. They are logged and, through the
/// `*_with_report` entry points, handed back for inspection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    /// An item container matched neither the link, folder nor separator pattern.
    #[error("Malformed fragment dropped: <{tag}> holds no anchor, heading or rule")]
    MalformedFragment { tag: String },
    /// A record's parent id resolves to no known record.
    #[error("Missing parent reference: {id} points at unknown parent {parent_id}")]
    MissingReference { id: NodeId, parent_id: NodeId },
    /// Two siblings claim the same index; `winner` keeps the slot.
    #[error(
        "Index conflict under {}: index {index} claimed by {winner} and {displaced}",
        parent_label(.parent)
    )]
    IndexConflict {
        parent: Option<NodeId>,
        index: u32,
        winner: NodeId,
        displaced: NodeId,
    },
    /// A second record reuses an id already seen; it is ignored.
    #[error("Duplicate record id dropped: {0}")]
    DuplicateId(NodeId),
}

fn parent_label(parent: &Option<NodeId>) -> String {
    match parent {
        Some(id) => id.to_string(),
        None => "top level".to_string(),
    }
}

// === StoreError ===

/// Errors related to bookmark record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given ID exists.
    #[error("Bookmark node not found: {0}")]
    NotFound(String),
    /// The target of a create or move is not a folder.
    #[error("Bookmark node is not a folder: {0}")]
    NotAFolder(String),
    /// The move would place a folder inside its own subtree.
    #[error("Invalid bookmark move: {0}")]
    InvalidMove(String),
    /// The requested field change does not apply to this node.
    #[error("Invalid bookmark update: {0}")]
    InvalidUpdate(String),
    /// `remove` was called on a folder that still has children.
    #[error("Bookmark folder is not empty: {0}")]
    FolderNotEmpty(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
