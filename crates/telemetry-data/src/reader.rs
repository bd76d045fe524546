//! Snapshot discovery and loading for proctor-view.
//!
//! A snapshot lives at `<root>/<assignment_id>/<device_id>/` and contains
//! `signals.jsonl` (one raw signal per line; the exporter may split large
//! windows across several `.jsonl` files) plus an optional `report.json`
//! holding the server-side summary. The reader owns deduplication: the
//! aggregation core trusts its caller to supply a clean window, so duplicate
//! `event_id`s are dropped here.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use telemetry_core::models::{ServerReport, Signal};
use tracing::{debug, warn};

/// File name of the server report inside a snapshot directory.
pub const REPORT_FILE: &str = "report.json";

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve the snapshot directory for an (assignment, device) pair.
pub fn snapshot_dir(root: &Path, assignment: &str, device: &str) -> PathBuf {
    root.join(assignment).join(device)
}

/// Find all `.jsonl` signal files recursively under `snapshot_dir`, sorted
/// by path.
pub fn find_signal_files(snapshot_dir: &Path) -> Vec<PathBuf> {
    if !snapshot_dir.exists() {
        warn!("Snapshot dir does not exist: {}", snapshot_dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(snapshot_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "jsonl")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load the raw signal window from a snapshot directory.
///
/// All `.jsonl` files are merged; unparseable lines are skipped with a debug
/// log; duplicate `event_id`s (first occurrence wins) are dropped. The result
/// is sorted by the raw `ts` string so display order is stable across runs
/// regardless of file layout. Signals with an empty `event_id` are never
/// treated as duplicates of one another.
pub fn load_signal_window(snapshot_dir: &Path) -> Vec<Signal> {
    let files = find_signal_files(snapshot_dir);
    if files.is_empty() {
        debug!("No signal files in {}", snapshot_dir.display());
        return Vec::new();
    }

    let mut signals: Vec<Signal> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for file_path in &files {
        let file = match std::fs::File::open(file_path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to read file {}: {}", file_path.display(), e);
                continue;
            }
        };

        let reader = std::io::BufReader::new(file);
        let mut lines_read = 0u64;
        let mut lines_skipped = 0u64;
        let mut duplicates = 0u64;

        for line_result in reader.lines() {
            let line = match line_result {
                Ok(l) => l,
                Err(_) => continue,
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            lines_read += 1;

            let signal: Signal = match serde_json::from_str(trimmed) {
                Ok(s) => s,
                Err(e) => {
                    debug!(
                        "Skipping unparseable line in {}: {}",
                        file_path.display(),
                        e
                    );
                    lines_skipped += 1;
                    continue;
                }
            };

            if !signal.event_id.is_empty() && !seen_ids.insert(signal.event_id.clone()) {
                duplicates += 1;
                continue;
            }
            signals.push(signal);
        }

        debug!(
            "File {}: {} read, {} skipped, {} duplicates",
            file_path.display(),
            lines_read,
            lines_skipped,
            duplicates,
        );
    }

    signals.sort_by(|a, b| a.ts.cmp(&b.ts));
    signals
}

/// Load the server report from a snapshot directory.
///
/// An absent or unparseable `report.json` yields `None`; the viewer then
/// falls back entirely to event-derived metrics. Never fatal.
pub fn load_server_report(snapshot_dir: &Path) -> Option<ServerReport> {
    let path = snapshot_dir.join(REPORT_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            debug!("No server report at {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Unparseable server report {}: {}", path.display(), e);
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
