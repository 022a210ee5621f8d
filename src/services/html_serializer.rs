//! Netscape bookmark HTML serializer.
//!
//! Renders either parse-side [`BookmarkNode`] trees or storage-side
//! [`ViewNode`] trees through the [`RenderNode`] trait. Identifiers never reach
//! the output: they belong to storage, not to the file format.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::types::node::{BookmarkNode, DEFAULT_TITLE};
use crate::types::record::{RecordKind, ViewNode};
use crate::types::settings::ExportSettings;

const DOCTYPE: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>";
const CONTENT_TYPE: &str = r#"<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">"#;

/// Variant-specific payload of a node being rendered.
pub enum NodeShape<'n, N> {
    Link { url: &'n str, icon: Option<&'n str> },
    Folder { children: &'n [N], toolbar: bool },
    Separator,
}

/// A tree node the serializer can render. Dates are seconds; `None` omits the attribute.
pub trait RenderNode: Sized {
    fn shape(&self) -> NodeShape<'_, Self>;
    fn title(&self) -> &str;
    fn add_date(&self) -> Option<i64>;
    fn last_modified(&self) -> Option<i64>;
}

impl RenderNode for BookmarkNode {
    fn shape(&self) -> NodeShape<'_, Self> {
        match self {
            BookmarkNode::Link(link) => NodeShape::Link {
                url: &link.url,
                icon: link.icon.as_deref(),
            },
            BookmarkNode::Folder(folder) => NodeShape::Folder {
                children: &folder.children,
                toolbar: folder.toolbar,
            },
            BookmarkNode::Separator => NodeShape::Separator,
        }
    }

    fn title(&self) -> &str {
        BookmarkNode::title(self)
    }

    fn add_date(&self) -> Option<i64> {
        match self {
            BookmarkNode::Link(link) => link.add_date,
            BookmarkNode::Folder(folder) => folder.add_date,
            BookmarkNode::Separator => None,
        }
    }

    fn last_modified(&self) -> Option<i64> {
        match self {
            BookmarkNode::Link(link) => link.last_modified,
            BookmarkNode::Folder(folder) => folder.last_modified,
            BookmarkNode::Separator => None,
        }
    }
}

impl RenderNode for ViewNode {
    fn shape(&self) -> NodeShape<'_, Self> {
        match self.record.kind {
            RecordKind::Link => NodeShape::Link {
                url: self.record.url.as_deref().unwrap_or(""),
                icon: self.record.icon.as_deref(),
            },
            RecordKind::Folder => NodeShape::Folder {
                children: &self.children,
                toolbar: self.record.toolbar,
            },
            RecordKind::Separator => NodeShape::Separator,
        }
    }

    fn title(&self) -> &str {
        &self.record.title
    }

    fn add_date(&self) -> Option<i64> {
        (self.record.kind != RecordKind::Separator).then_some(self.record.add_date)
    }

    fn last_modified(&self) -> Option<i64> {
        (self.record.kind != RecordKind::Separator).then_some(self.record.last_modified)
    }
}

/// Document-level options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub title: String,
    pub root_name: String,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            root_name: DEFAULT_TITLE.to_string(),
            indent: 4,
        }
    }
}

impl From<&ExportSettings> for SerializeOptions {
    fn from(settings: &ExportSettings) -> Self {
        Self {
            title: settings.title.clone(),
            root_name: settings.root_name.clone(),
            indent: settings.indent,
        }
    }
}

/// Renders a forest as a complete bookmark HTML document.
pub fn serialize<N: RenderNode>(forest: &[N], options: &SerializeOptions) -> String {
    let mut out = String::new();
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str(CONTENT_TYPE);
    out.push('\n');
    out.push_str(&format!("<TITLE>{}</TITLE>\n", encode_text(&options.title)));
    out.push_str(&format!("<H1>{}</H1>\n", encode_text(&options.root_name)));
    out.push_str("<DL><p>\n");
    render_nodes(forest, 1, options.indent, &mut out);
    out.push_str("</DL><p>\n");
    out
}

fn render_nodes<N: RenderNode>(nodes: &[N], depth: usize, indent: usize, out: &mut String) {
    let pad = " ".repeat(depth * indent);
    for node in nodes {
        match node.shape() {
            NodeShape::Folder { children, toolbar } => {
                let marker = if toolbar {
                    r#" PERSONAL_TOOLBAR_FOLDER="true""#
                } else {
                    ""
                };
                out.push_str(&format!(
                    "{pad}<DT><H3{}{marker}>{}</H3>\n",
                    date_attributes(node),
                    encode_text(node.title()),
                ));
                if !children.is_empty() {
                    out.push_str(&format!("{pad}<DL><p>\n"));
                    render_nodes(children, depth + 1, indent, out);
                    out.push_str(&format!("{pad}</DL><p>\n"));
                }
            }
            NodeShape::Link { url, icon } => {
                // Blank icons carry nothing and read back as absent.
                let icon = icon
                    .filter(|icon| !icon.trim().is_empty())
                    .map(|icon| format!(r#" ICON="{}""#, encode_double_quoted_attribute(icon)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{pad}<DT><A HREF=\"{}\"{}{icon}>{}</A>\n",
                    encode_double_quoted_attribute(url),
                    date_attributes(node),
                    encode_text(node.title()),
                ));
            }
            NodeShape::Separator => out.push_str(&format!("{pad}<DT><HR>\n")),
        }
    }
}

fn date_attributes<N: RenderNode>(node: &N) -> String {
    let mut attributes = String::new();
    if let Some(add_date) = node.add_date() {
        attributes.push_str(&format!(r#" ADD_DATE="{}""#, add_date));
    }
    if let Some(last_modified) = node.last_modified() {
        attributes.push_str(&format!(r#" LAST_MODIFIED="{}""#, last_modified));
    }
    attributes
}
