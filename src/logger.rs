/*
 * This file is part of Yukon Detect.
 *
 * Copyright (C) 2025 Yukon Detect contributors
 *
 * Yukon Detect is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Yukon Detect is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Yukon Detect. If not, see <https://www.gnu.org/licenses/>.
 */

//! Logging setup
//!
//! Diagnostics go through `tracing`. Detection events can additionally be
//! appended to a JSON-lines file with `--log-file`, one record per line:
//! `{"ts_ms": .., "event": "..", "data": {..}}`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

lazy_static! {
    static ref EVENT_LOG: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Pick the tracing filter: RUST_LOG wins, then --verbose, then the configured level
pub fn filter_directive(rust_log: Option<&str>, verbose: bool, configured: &str) -> String {
    match rust_log {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Install the stderr tracing subscriber
pub fn init_tracing(verbose: bool, configured_level: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(rust_log.as_deref(), verbose, configured_level);

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(directive))
        .try_init();
}

/// Open (or create) the JSON event log for appending
pub fn init_event_log(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if let Ok(mut guard) = EVENT_LOG.lock() {
        *guard = Some(file);
    }
    Ok(())
}

/// Close the event log; later events are dropped
pub fn close_event_log() {
    if let Ok(mut guard) = EVENT_LOG.lock() {
        *guard = None;
    }
}

/// Append one event if the event log is open
pub fn log_event(event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = EVENT_LOG.lock() {
        if let Some(f) = guard.as_mut() {
            if let Err(e) = writeln!(f, "{}", line) {
                tracing::warn!("Failed to write event log: {}", e);
            }
        }
    }
}
