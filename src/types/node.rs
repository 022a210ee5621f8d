use serde::{Deserialize, Serialize};

use super::record::RecordKind;

/// Fallback used for both the document title and the root heading.
pub const DEFAULT_TITLE: &str = "Bookmarks";

/// One entry of a parsed bookmark file.
///
/// Timestamps are whole seconds since the epoch, exactly as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkNode {
    Link(Link),
    Folder(Folder),
    Separator,
}

/// A bookmarked URL (`<A>` inside a `<DT>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

/// A folder (`<H3>` inside a `<DT>`) and its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    /// Set from `PERSONAL_TOOLBAR_FOLDER="true"`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub toolbar: bool,
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Folder {
    pub fn new(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: title.into(),
            children,
            ..Self::default()
        }
    }
}

impl BookmarkNode {
    /// Title of the node; separators have none.
    pub fn title(&self) -> &str {
        match self {
            BookmarkNode::Link(link) => &link.title,
            BookmarkNode::Folder(folder) => &folder.title,
            BookmarkNode::Separator => "",
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            BookmarkNode::Link(_) => RecordKind::Link,
            BookmarkNode::Folder(_) => RecordKind::Folder,
            BookmarkNode::Separator => RecordKind::Separator,
        }
    }

    /// Children of a folder, or an empty slice for links and separators.
    pub fn children(&self) -> &[BookmarkNode] {
        match self {
            BookmarkNode::Folder(folder) => &folder.children,
            _ => &[],
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(BookmarkNode::count).sum::<usize>()
    }
}

impl From<Link> for BookmarkNode {
    fn from(link: Link) -> Self {
        BookmarkNode::Link(link)
    }
}

impl From<Folder> for BookmarkNode {
    fn from(folder: Folder) -> Self {
        BookmarkNode::Folder(folder)
    }
}

/// Header information of a bookmark file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Text of `<TITLE>`.
    pub title: String,
    /// Text of the first `<H1>`.
    pub root_name: String,
}

impl Default for FileMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            root_name: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Result of parsing a whole bookmark file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkFile {
    pub metadata: FileMetadata,
    pub bookmarks: Vec<BookmarkNode>,
}

impl BookmarkFile {
    /// Total number of nodes in the file.
    pub fn count(&self) -> usize {
        self.bookmarks.iter().map(BookmarkNode::count).sum()
    }
}
