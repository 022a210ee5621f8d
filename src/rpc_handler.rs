//! RPC method handler for the bookmark transcoder's JSON-lines protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a method call to the record store, the HTML
//! exchange or the settings engine via the `App` struct. Bookmark results use
//! the browser bookmark API shape ([`TreeNode`]), with millisecond timestamps.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::services::bookmark_exchange;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::record::{Destination, NewNode, NodeChanges, NodeId, RecordKind, StoredRecord};
use crate::types::tree_node::TreeNode;

/// Dispatch a method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "bookmarks.create" => {
            let node = new_node_from(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let record = a.store().create(node).map_err(|e| e.to_string())?;
            to_json(&TreeNode::from_record(&record))
        }
        "bookmarks.get" => {
            let ids = id_list(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let records = a.store().get_many(&ids).map_err(|e| e.to_string())?;
            records_json(&records)
        }
        "bookmarks.getChildren" => {
            let id = required_id(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let records = a.store().get_children(&id).map_err(|e| e.to_string())?;
            records_json(&records)
        }
        "bookmarks.getRecent" => {
            let count = params
                .get("numberOfItems")
                .and_then(|v| v.as_u64())
                .ok_or("missing numberOfItems")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let records = a
                .store()
                .get_recent(usize::try_from(count).unwrap_or(usize::MAX))
                .map_err(|e| e.to_string())?;
            records_json(&records)
        }
        "bookmarks.getSubTree" => {
            let id = required_id(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let view = a.store().get_sub_tree(&id).map_err(|e| e.to_string())?;
            to_json(&vec![TreeNode::from_view(&view)])
        }
        "bookmarks.getTree" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let forest = a.store().get_tree().map_err(|e| e.to_string())?;
            let nodes: Vec<TreeNode> = forest.iter().map(TreeNode::from_view).collect();
            to_json(&nodes)
        }
        "bookmarks.move" => {
            let id = required_id(params)?;
            let destination = params.get("destination").unwrap_or(&Value::Null);
            let destination = Destination {
                parent_id: optional_string(destination, "parentId").map(NodeId::from),
                index: optional_index(destination)?,
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let record = a
                .store()
                .move_node(&id, destination)
                .map_err(|e| e.to_string())?;
            to_json(&TreeNode::from_record(&record))
        }
        "bookmarks.remove" => {
            let id = required_id(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.store().remove(&id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmarks.removeTree" => {
            let id = required_id(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.store().remove_tree(&id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmarks.search" => {
            let query = params.get("query").and_then(|v| v.as_str()).ok_or("missing query")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let records = a.store().search(query).map_err(|e| e.to_string())?;
            records_json(&records)
        }
        "bookmarks.update" => {
            let id = required_id(params)?;
            let changes = params.get("changes").unwrap_or(&Value::Null);
            let changes = NodeChanges {
                title: optional_string(changes, "title"),
                url: optional_string(changes, "url"),
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let record = a.store().update(&id, changes).map_err(|e| e.to_string())?;
            to_json(&TreeNode::from_record(&record))
        }
        "bookmarks.importHtml" => {
            let html = params.get("html").and_then(|v| v.as_str()).ok_or("missing html")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let summary =
                bookmark_exchange::import_html(&mut a.store(), html).map_err(|e| e.to_string())?;
            Ok(json!({
                "title": summary.metadata.title,
                "rootName": summary.metadata.root_name,
                "imported": summary.imported,
                "droppedFragments": summary.dropped_fragments,
            }))
        }
        "bookmarks.exportHtml" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut options = a.export_options();
            if let Some(title) = optional_string(params, "title") {
                options.title = title;
            }
            if let Some(root_name) = optional_string(params, "rootName") {
                options.root_name = root_name;
            }
            let html =
                bookmark_exchange::export_html(&a.store(), &options).map_err(|e| e.to_string())?;
            Ok(json!({"html": html}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings_engine.get_settings();
            serde_json::to_value(settings).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn records_json(records: &[StoredRecord]) -> Result<Value, String> {
    let nodes: Vec<TreeNode> = records.iter().map(TreeNode::from_record).collect();
    to_json(&nodes)
}

fn required_id(params: &Value) -> Result<NodeId, String> {
    params
        .get("id")
        .and_then(|v| v.as_str())
        .map(NodeId::from)
        .ok_or_else(|| "missing id".to_string())
}

/// `id` may be a single string or a non-empty array of strings.
fn id_list(params: &Value) -> Result<Vec<NodeId>, String> {
    match params.get("id") {
        Some(Value::String(id)) => Ok(vec![NodeId::from(id.as_str())]),
        Some(Value::Array(ids)) if !ids.is_empty() => ids
            .iter()
            .map(|v| {
                v.as_str()
                    .map(NodeId::from)
                    .ok_or_else(|| "invalid id: expected a string".to_string())
            })
            .collect(),
        _ => Err("missing id".to_string()),
    }
}

fn optional_string(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn optional_index(params: &Value) -> Result<Option<u32>, String> {
    match params.get("index") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|index| u32::try_from(index).ok())
            .map(Some)
            .ok_or_else(|| "invalid index: expected a non-negative integer".to_string()),
    }
}

fn new_node_from(params: &Value) -> Result<NewNode, String> {
    let url = optional_string(params, "url");
    let kind = match params.get("type").and_then(|v| v.as_str()) {
        Some(kind) => RecordKind::parse(kind).ok_or_else(|| format!("invalid type: {}", kind))?,
        None if url.is_some() => RecordKind::Link,
        None => RecordKind::Folder,
    };
    if kind == RecordKind::Link && url.is_none() {
        return Err("missing url".to_string());
    }

    Ok(NewNode {
        parent_id: optional_string(params, "parentId").map(NodeId::from),
        index: optional_index(params)?,
        kind,
        title: optional_string(params, "title").unwrap_or_default(),
        url: if kind == RecordKind::Link { url } else { None },
    })
}
