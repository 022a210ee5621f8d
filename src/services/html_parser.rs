//! Netscape bookmark HTML parser.
//!
//! The document is built into a DOM by `scraper` (html5ever), which copes with
//! the format's unclosed `<DT>`/`<p>` tags and lowercases tag and attribute
//! names. A recursive descent over that DOM then turns the `<DL>`/`<DT>` lists
//! into [`BookmarkNode`] trees. Nothing here fails: fragments that match no
//! pattern are dropped and recorded as [`Anomaly::MalformedFragment`].

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::services::sibling_scan::{self, ScanState, SiblingKind};
use crate::types::errors::Anomaly;
use crate::types::node::{BookmarkFile, BookmarkNode, FileMetadata, Folder, Link, DEFAULT_TITLE};

/// Parses a bookmark HTML document.
pub fn parse(html: &str) -> BookmarkFile {
    parse_with_report(html).0
}

/// Parses a bookmark HTML document and also returns every dropped fragment.
pub fn parse_with_report(html: &str) -> (BookmarkFile, Vec<Anomaly>) {
    let document = Html::parse_document(html);

    let metadata = FileMetadata {
        title: first_text(&document, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        root_name: first_text(&document, "h1").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    };

    let mut parser = ListParser::default();
    let bookmarks = match root_list(&document) {
        Some(root) => parser.parse_list(root),
        None => Vec::new(),
    };

    debug!(
        roots = bookmarks.len(),
        dropped = parser.anomalies.len(),
        "parsed bookmark document"
    );

    (BookmarkFile { metadata, bookmarks }, parser.anomalies)
}

/// Trimmed text of the first `tag` element, if it has any.
fn first_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// The container holding the top-level items.
///
/// That is the parent of the first `<dt>`, widened to the outermost directly
/// enclosing `<dl>` so that a stray nested list at the top does not hide its
/// later siblings. Bare fragments without any `<DL>` resolve to `<body>`.
fn root_list(document: &Html) -> Option<ElementRef<'_>> {
    let item_selector = Selector::parse("dt").ok()?;
    let Some(first_item) = document.select(&item_selector).next() else {
        let list_selector = Selector::parse("dl").ok()?;
        return document.select(&list_selector).next();
    };

    let mut root = first_item.parent().and_then(ElementRef::wrap)?;
    while let Some(parent) = root.parent().and_then(ElementRef::wrap) {
        if !is(parent, "dl") {
            break;
        }
        root = parent;
    }
    Some(root)
}

/// A parsed item plus the list it consumed as its children, if any.
struct ParsedItem<'a> {
    node: BookmarkNode,
    claimed: Option<ElementRef<'a>>,
}

#[derive(Default)]
struct ListParser {
    anomalies: Vec<Anomaly>,
}

impl ListParser {
    /// Parses the entries of a list container in document order.
    fn parse_list(&mut self, list: ElementRef<'_>) -> Vec<BookmarkNode> {
        let mut nodes = Vec::new();
        self.collect_items(list, &mut nodes);
        nodes
    }

    /// Appends the entries found among `container`'s children. `<p>` spacers
    /// and other wrappers are searched at any depth for item containers.
    fn collect_items(&mut self, container: ElementRef<'_>, nodes: &mut Vec<BookmarkNode>) {
        // Lists already taken by a folder as its children.
        let mut claimed = HashSet::new();

        for child in container.child_elements() {
            if claimed.contains(&child.id()) {
                continue;
            }
            match child.value().name() {
                "dt" => {
                    if let Some(list) = self.push_item(child, nodes) {
                        claimed.insert(list.id());
                    }
                }
                // Malformed nesting: keep the items instead of losing them.
                "dl" => nodes.extend(self.parse_list(child)),
                "hr" => nodes.push(BookmarkNode::Separator),
                // Descriptions belong to the item before them.
                "dd" => {}
                _ => self.collect_items(child, nodes),
            }
        }
    }

    /// Parses one item into `nodes` and returns the list it claimed, if any.
    fn push_item<'a>(
        &mut self,
        item: ElementRef<'a>,
        nodes: &mut Vec<BookmarkNode>,
    ) -> Option<ElementRef<'a>> {
        let parsed = self.parse_item(item)?;
        let is_folder = matches!(parsed.node, BookmarkNode::Folder(_));
        nodes.push(parsed.node);

        // An unclosed link or rule item swallows a following <DL>; its
        // entries belong to the enclosing list.
        if !is_folder {
            for stray in item.child_elements().filter(|child| is(*child, "dl")) {
                nodes.extend(self.parse_list(stray));
            }
        }
        parsed.claimed
    }

    /// Classifies one `<dt>` as a link, folder or separator.
    fn parse_item<'a>(&mut self, item: ElementRef<'a>) -> Option<ParsedItem<'a>> {
        if let Some(anchor) = find_own(item, "a") {
            return Some(ParsedItem {
                node: BookmarkNode::Link(read_link(anchor)),
                claimed: None,
            });
        }

        if let Some(heading) = find_own(item, "h3") {
            let list = locate_child_list(item, heading);
            let folder = Folder {
                title: text_of(heading),
                add_date: attribute(heading, "add_date").and_then(parse_timestamp),
                last_modified: attribute(heading, "last_modified").and_then(parse_timestamp),
                toolbar: attribute(heading, "personal_toolbar_folder")
                    .is_some_and(|value| value.trim().eq_ignore_ascii_case("true")),
                children: list.map(|list| self.parse_list(list)).unwrap_or_default(),
            };
            return Some(ParsedItem {
                node: BookmarkNode::Folder(folder),
                claimed: list,
            });
        }

        if find_own(item, "hr").is_some() {
            return Some(ParsedItem {
                node: BookmarkNode::Separator,
                claimed: None,
            });
        }

        let tag = item.value().name().to_string();
        debug!(tag = %tag, "dropping unclassified bookmark item");
        self.anomalies.push(Anomaly::MalformedFragment { tag });
        None
    }
}

fn read_link(anchor: ElementRef<'_>) -> Link {
    Link {
        title: text_of(anchor),
        url: attribute(anchor, "href")
            .map(|href| href.trim().to_string())
            .unwrap_or_default(),
        icon: attribute(anchor, "icon")
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .map(str::to_string),
        add_date: attribute(anchor, "add_date").and_then(parse_timestamp),
        last_modified: attribute(anchor, "last_modified").and_then(parse_timestamp),
    }
}

/// Finds the child list of the folder whose heading is `heading` inside `item`.
///
/// The heading's own following siblings are tried first (the HTML tree
/// builder nests `<DT><H3>..</H3><DL>` inside the `<dt>`), then the item's
/// following siblings in the enclosing list (`<DT><H3>..</H3><DD><DL>`).
fn locate_child_list<'a>(item: ElementRef<'a>, heading: ElementRef<'a>) -> Option<ElementRef<'a>> {
    list_after(heading).or_else(|| list_after(item))
}

/// Runs the sibling scan lazily over the elements after `element`; the scan
/// stops at the next item, so only the siblings up to it are visited.
fn list_after(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let siblings = move || element.next_siblings().filter_map(ElementRef::wrap);
    let ScanState::FoundList(position) = sibling_scan::scan(siblings().map(classify_sibling)) else {
        return None;
    };
    let found = siblings().nth(position)?;
    if is(found, "dl") {
        Some(found)
    } else {
        first_descendant(found, "dl")
    }
}

fn classify_sibling(element: ElementRef<'_>) -> SiblingKind {
    match element.value().name() {
        "p" => SiblingKind::Paragraph,
        "dd" => SiblingKind::Description {
            has_list: first_descendant(element, "dl").is_some(),
        },
        "dl" => SiblingKind::List,
        "dt" | "hr" => SiblingKind::Item,
        _ => SiblingKind::Other,
    }
}

/// Depth-first search for `tag` within the item's own content. Nested lists
/// and descriptions belong to child entries and are not entered.
fn find_own<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    for child in element.child_elements() {
        if is(child, tag) {
            return Some(child);
        }
        if is(child, "dl") || is(child, "dd") {
            continue;
        }
        if let Some(found) = find_own(child, tag) {
            return Some(found);
        }
    }
    None
}

fn first_descendant<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|descendant| is(*descendant, tag))
}

fn is(element: ElementRef<'_>, tag: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(tag)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Attribute lookup ignoring ASCII case of the attribute name.
fn attribute<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attrs()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Reads a leading integer the way browsers read `ADD_DATE`: optional
/// whitespace and sign, then digits; anything after the digits is ignored.
/// No digits, or a value that does not fit, yields `None` rather than zero.
pub(crate) fn parse_timestamp(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
