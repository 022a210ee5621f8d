use serde::{Deserialize, Serialize};

use super::node::DEFAULT_TITLE;

/// Top-level transcoder settings container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscoderSettings {
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Defaults applied when writing a bookmark HTML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Text of the `<TITLE>` element.
    pub title: String,
    /// Text of the `<H1>` root heading.
    pub root_name: String,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            root_name: DEFAULT_TITLE.to_string(),
            indent: 4,
        }
    }
}

/// Where the record store lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    pub database_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "bookmarks.db".to_string(),
        }
    }
}
