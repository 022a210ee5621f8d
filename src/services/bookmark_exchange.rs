//! Import and export between bookmark HTML files and a record store.
//!
//! The store is passed in explicitly; the parse, convert and serialize stages
//! stay pure and know nothing about it.

use tracing::info;

use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::services::html_serializer::{self, SerializeOptions};
use crate::services::{html_parser, tree_converter};
use crate::types::errors::StoreError;
use crate::types::node::FileMetadata;

/// Outcome of [`import_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub metadata: FileMetadata,
    /// Records written to the store.
    pub imported: usize,
    /// Item containers the parser could not classify.
    pub dropped_fragments: usize,
}

/// Parses `html` and appends its bookmarks after the store's existing top-level nodes.
pub fn import_html<S>(store: &mut S, html: &str) -> Result<ImportSummary, StoreError>
where
    S: BookmarkStoreTrait + ?Sized,
{
    let (file, anomalies) = html_parser::parse_with_report(html);
    let mut records = tree_converter::flatten(&file.bookmarks);

    let offset = store.child_count(None)?;
    for record in records.iter_mut().filter(|record| record.parent_id.is_none()) {
        record.index = record.index.saturating_add(offset);
    }

    let imported = store.insert_records(&records)?;
    info!(
        imported,
        dropped = anomalies.len(),
        title = %file.metadata.title,
        "imported bookmark file"
    );

    Ok(ImportSummary {
        metadata: file.metadata,
        imported,
        dropped_fragments: anomalies.len(),
    })
}

/// Renders the store's whole tree as a bookmark HTML document.
pub fn export_html<S>(store: &S, options: &SerializeOptions) -> Result<String, StoreError>
where
    S: BookmarkStoreTrait + ?Sized,
{
    let forest = store.get_tree()?;
    let html = html_serializer::serialize(&forest, options);
    info!(
        nodes = tree_converter::count_views(&forest),
        bytes = html.len(),
        "exported bookmark file"
    );
    Ok(html)
}
