//! Bookmark transcoder RPC server: JSON over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmarks.create", "params":{"title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr so they never interleave with responses.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use bookmark_transcoder::app::App;
use bookmark_transcoder::rpc_handler::handle_method;

use serde_json::{json, Value};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let settings_path = std::env::var("BOOKMARK_TRANSCODER_CONFIG").ok();
    let db_override = std::env::var("BOOKMARK_TRANSCODER_DB").ok();
    let app = App::new(settings_path, db_override.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to initialize: {}", e))?;
    let app = Mutex::new(app);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;
    out.flush()?;
    info!("rpc server ready");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                writeln!(out, "{}", json!({"id": null, "error": format!("parse error: {}", e)}))?;
                out.flush()?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "rpc request");

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                debug!(method, error = %err, "rpc request failed");
                json!({"id": id, "error": err})
            }
        };
        writeln!(out, "{}", response)?;
        out.flush()?;
    }

    Ok(())
}
