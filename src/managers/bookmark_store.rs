//! Bookmark record store.
//!
//! Implements `BookmarkStoreTrait`, the browser-style bookmark operations over
//! flat [`StoredRecord`] rows, backed by SQLite via `rusqlite`. Tree-shaped
//! reads go through the tree converter.

use rusqlite::{params, Connection, OptionalExtension};

use crate::services::tree_converter;
use crate::types::errors::StoreError;
use crate::types::record::{
    unix_seconds, Destination, NewNode, NodeChanges, NodeId, RecordKind, StoredRecord, ViewNode,
};

const COLUMNS: &str =
    "id, kind, title, url, icon, add_date, last_modified, parent_id, position, toolbar";

/// Trait defining record store operations.
pub trait BookmarkStoreTrait {
    /// Inserts ready-made records verbatim. Returns how many were written.
    fn insert_records(&mut self, records: &[StoredRecord]) -> Result<usize, StoreError>;
    fn all_records(&self) -> Result<Vec<StoredRecord>, StoreError>;
    /// Number of direct children of `parent_id` (`None` = top level).
    fn child_count(&self, parent_id: Option<&NodeId>) -> Result<u32, StoreError>;
    fn create(&mut self, node: NewNode) -> Result<StoredRecord, StoreError>;
    fn get(&self, id: &NodeId) -> Result<StoredRecord, StoreError>;
    /// Fails on the first id that does not exist.
    fn get_many(&self, ids: &[NodeId]) -> Result<Vec<StoredRecord>, StoreError>;
    fn get_children(&self, id: &NodeId) -> Result<Vec<StoredRecord>, StoreError>;
    /// Most recently added links, newest first.
    fn get_recent(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError>;
    fn get_sub_tree(&self, id: &NodeId) -> Result<ViewNode, StoreError>;
    fn get_tree(&self) -> Result<Vec<ViewNode>, StoreError>;
    fn move_node(&mut self, id: &NodeId, destination: Destination) -> Result<StoredRecord, StoreError>;
    /// Removes a link, separator or empty folder.
    fn remove(&mut self, id: &NodeId) -> Result<(), StoreError>;
    /// Removes a node together with its whole subtree.
    fn remove_tree(&mut self, id: &NodeId) -> Result<(), StoreError>;
    /// Case-insensitive substring match on title and url. Separators never match.
    fn search(&self, query: &str) -> Result<Vec<StoredRecord>, StoreError>;
    fn update(&mut self, id: &NodeId, changes: NodeChanges) -> Result<StoredRecord, StoreError>;
}

/// Record store backed by a SQLite connection.
pub struct BookmarkStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkStore<'a> {
    /// Creates a new `BookmarkStore` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Reads a single `bookmark_nodes` row into a record.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredRecord> {
        Ok(StoredRecord {
            id: row.get(0)?,
            kind: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            icon: row.get(4)?,
            add_date: row.get(5)?,
            last_modified: row.get(6)?,
            parent_id: row.get(7)?,
            index: row.get(8)?,
            toolbar: row.get(9)?,
        })
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_record)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Checks that `parent_id` is absent (top level) or names an existing folder.
    fn require_folder(&self, parent_id: Option<&NodeId>) -> Result<(), StoreError> {
        if let Some(parent_id) = parent_id {
            let parent = self.get(parent_id)?;
            if parent.kind != RecordKind::Folder {
                return Err(StoreError::NotAFolder(parent_id.to_string()));
            }
        }
        Ok(())
    }

    /// True if `ancestor` is `node` or lies on the parent chain above it.
    fn is_self_or_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> Result<bool, StoreError> {
        let mut current = Some(node.clone());
        let mut steps = 0usize;
        while let Some(id) = current {
            if &id == ancestor {
                return Ok(true);
            }
            // A corrupted table could hold a parent cycle.
            steps += 1;
            if steps > 1_000_000 {
                break;
            }
            current = self
                .conn
                .query_row(
                    "SELECT parent_id FROM bookmark_nodes WHERE id = ?1",
                    params![id],
                    |row| row.get::<_, Option<NodeId>>(0),
                )
                .optional()?
                .flatten();
        }
        Ok(false)
    }

    fn touch(&self, parent_id: Option<&NodeId>, now: i64) -> Result<(), StoreError> {
        if let Some(parent_id) = parent_id {
            self.conn.execute(
                "UPDATE bookmark_nodes SET last_modified = ?1 WHERE id = ?2",
                params![now, parent_id],
            )?;
        }
        Ok(())
    }

    /// Closes the gap left at `position` under `parent_id`.
    fn close_gap(&self, parent_id: Option<&NodeId>, position: u32) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE bookmark_nodes SET position = position - 1 WHERE parent_id IS ?1 AND position > ?2",
            params![parent_id, position],
        )?;
        Ok(())
    }

    /// Opens a slot at `position` under `parent_id`, leaving `except` in place.
    fn open_gap(
        &self,
        parent_id: Option<&NodeId>,
        position: u32,
        except: Option<&NodeId>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE bookmark_nodes SET position = position + 1 \
             WHERE parent_id IS ?1 AND position >= ?2 AND id IS NOT ?3",
            params![parent_id, position, except],
        )?;
        Ok(())
    }

    fn subtree_records(&self, id: &NodeId) -> Result<Vec<StoredRecord>, StoreError> {
        let sql = format!(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT ?1 \
                 UNION \
                 SELECT n.id FROM bookmark_nodes n JOIN subtree s ON n.parent_id = s.id \
             ) \
             SELECT {COLUMNS} FROM bookmark_nodes WHERE id IN (SELECT id FROM subtree) \
             ORDER BY position"
        );
        self.query_records(&sql, params![id])
    }
}

impl<'a> BookmarkStoreTrait for BookmarkStore<'a> {
    fn insert_records(&mut self, records: &[StoredRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO bookmark_nodes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ))?;
            for record in records {
                stmt.execute(params![
                    record.id,
                    record.kind,
                    record.title,
                    record.url,
                    record.icon,
                    record.add_date,
                    record.last_modified,
                    record.parent_id,
                    record.index,
                    record.toolbar,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn all_records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.query_records(
            &format!("SELECT {COLUMNS} FROM bookmark_nodes ORDER BY parent_id, position"),
            [],
        )
    }

    fn child_count(&self, parent_id: Option<&NodeId>) -> Result<u32, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id IS ?1",
            params![parent_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Creates a node. The id and timestamps are assigned here.
    fn create(&mut self, node: NewNode) -> Result<StoredRecord, StoreError> {
        self.require_folder(node.parent_id.as_ref())?;

        let count = self.child_count(node.parent_id.as_ref())?;
        let index = node.index.map_or(count, |index| index.min(count));
        let now = unix_seconds();
        let record = StoredRecord {
            id: NodeId::generate(),
            kind: node.kind,
            title: node.title,
            url: match node.kind {
                RecordKind::Link => Some(node.url.unwrap_or_default()),
                _ => None,
            },
            icon: None,
            add_date: now,
            last_modified: now,
            parent_id: node.parent_id,
            index,
            toolbar: false,
        };

        let tx = self.conn.unchecked_transaction()?;
        self.open_gap(record.parent_id.as_ref(), index, None)?;
        self.conn.execute(
            &format!(
                "INSERT INTO bookmark_nodes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                record.id,
                record.kind,
                record.title,
                record.url,
                record.icon,
                record.add_date,
                record.last_modified,
                record.parent_id,
                record.index,
                record.toolbar,
            ],
        )?;
        self.touch(record.parent_id.as_ref(), now)?;
        tx.commit()?;

        Ok(record)
    }

    fn get(&self, id: &NodeId) -> Result<StoredRecord, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM bookmark_nodes WHERE id = ?1"),
                params![id],
                Self::row_to_record,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_many(&self, ids: &[NodeId]) -> Result<Vec<StoredRecord>, StoreError> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    fn get_children(&self, id: &NodeId) -> Result<Vec<StoredRecord>, StoreError> {
        self.get(id)?;
        self.query_records(
            &format!("SELECT {COLUMNS} FROM bookmark_nodes WHERE parent_id = ?1 ORDER BY position"),
            params![id],
        )
    }

    fn get_recent(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM bookmark_nodes WHERE kind = ?1 \
                 ORDER BY add_date DESC, id DESC LIMIT ?2"
            ),
            params![RecordKind::Link, limit],
        )
    }

    fn get_sub_tree(&self, id: &NodeId) -> Result<ViewNode, StoreError> {
        let root = self.get(id)?;
        let mut records = self.subtree_records(id)?;
        // Detach the root so the converter treats it as one.
        for record in records.iter_mut() {
            if record.id == root.id {
                record.parent_id = None;
            }
        }

        let mut view = tree_converter::unflatten(&records)
            .into_iter()
            .find(|view| view.record.id == root.id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        view.record.parent_id = root.parent_id;
        Ok(view)
    }

    fn get_tree(&self) -> Result<Vec<ViewNode>, StoreError> {
        Ok(tree_converter::unflatten(&self.all_records()?))
    }

    /// Moves a node. The destination index is the node's final position and
    /// is clamped to the end of the new sibling list.
    fn move_node(&mut self, id: &NodeId, destination: Destination) -> Result<StoredRecord, StoreError> {
        let record = self.get(id)?;
        self.require_folder(destination.parent_id.as_ref())?;
        if let Some(parent_id) = &destination.parent_id {
            if self.is_self_or_ancestor(id, parent_id)? {
                return Err(StoreError::InvalidMove(format!(
                    "{} cannot be moved into its own subtree",
                    id
                )));
            }
        }

        let new_parent = destination.parent_id.as_ref();
        let tx = self.conn.unchecked_transaction()?;
        self.close_gap(record.parent_id.as_ref(), record.index)?;

        let siblings: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id IS ?1 AND id != ?2",
            params![new_parent, id],
            |row| row.get(0),
        )?;
        let index = destination.index.map_or(siblings, |index| index.min(siblings));
        self.open_gap(new_parent, index, Some(id))?;

        let now = unix_seconds();
        self.conn.execute(
            "UPDATE bookmark_nodes SET parent_id = ?1, position = ?2 WHERE id = ?3",
            params![new_parent, index, id],
        )?;
        self.touch(record.parent_id.as_ref(), now)?;
        self.touch(new_parent, now)?;
        tx.commit()?;

        self.get(id)
    }

    fn remove(&mut self, id: &NodeId) -> Result<(), StoreError> {
        let record = self.get(id)?;
        if record.kind == RecordKind::Folder && self.child_count(Some(id))? > 0 {
            return Err(StoreError::FolderNotEmpty(id.to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        self.conn
            .execute("DELETE FROM bookmark_nodes WHERE id = ?1", params![id])?;
        self.close_gap(record.parent_id.as_ref(), record.index)?;
        self.touch(record.parent_id.as_ref(), unix_seconds())?;
        tx.commit()?;
        Ok(())
    }

    fn remove_tree(&mut self, id: &NodeId) -> Result<(), StoreError> {
        let record = self.get(id)?;

        let tx = self.conn.unchecked_transaction()?;
        self.conn.execute(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT ?1 \
                 UNION \
                 SELECT n.id FROM bookmark_nodes n JOIN subtree s ON n.parent_id = s.id \
             ) \
             DELETE FROM bookmark_nodes WHERE id IN (SELECT id FROM subtree)",
            params![id],
        )?;
        self.close_gap(record.parent_id.as_ref(), record.index)?;
        self.touch(record.parent_id.as_ref(), unix_seconds())?;
        tx.commit()?;
        Ok(())
    }

    fn search(&self, query: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM bookmark_nodes \
                 WHERE kind != ?1 AND (title LIKE ?2 ESCAPE '\\' OR url LIKE ?2 ESCAPE '\\') \
                 ORDER BY add_date DESC, id"
            ),
            params![RecordKind::Separator, pattern],
        )
    }

    /// Changes title and/or url. A url change on anything but a link is rejected.
    fn update(&mut self, id: &NodeId, changes: NodeChanges) -> Result<StoredRecord, StoreError> {
        let record = self.get(id)?;
        if changes.url.is_some() && record.kind != RecordKind::Link {
            return Err(StoreError::InvalidUpdate(format!(
                "{} is a {} and has no url",
                id,
                record.kind.as_str()
            )));
        }

        self.conn.execute(
            "UPDATE bookmark_nodes SET title = COALESCE(?1, title), url = COALESCE(?2, url), \
             last_modified = ?3 WHERE id = ?4",
            params![changes.title, changes.url, unix_seconds(), id],
        )?;
        self.get(id)
    }
}

/// Escapes `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
