//! Top-level review pipeline for proctor-view.
//!
//! Loads the signal window and server report for one (assignment, device)
//! pair, aggregates the window and reconciles it with the report, returning a
//! [`ReviewResult`] ready for the UI layer.

use std::path::Path;

use chrono::Utc;
use telemetry_core::aggregate::EventAggregator;
use telemetry_core::models::{DerivedSummary, ReconciledMetrics, ServerReport, Signal};
use telemetry_core::reconcile::reconcile;
use tracing::info;

use crate::reader::{load_server_report, load_signal_window, snapshot_dir};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the review result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReviewMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of deduplicated signals fed to the aggregator.
    pub signals_processed: usize,
    /// Whether a server report was loaded for this refresh.
    pub report_loaded: bool,
    /// Wall-clock seconds spent loading the snapshot from disk.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating and reconciling.
    pub reconcile_time_seconds: f64,
}

/// The complete output of [`review_student`].
#[derive(Debug, Clone)]
pub struct ReviewResult {
    /// The deduplicated signal window, sorted by raw timestamp string.
    pub signals: Vec<Signal>,
    /// Event-derived summary, untouched by reconciliation – the UI shows raw
    /// breakdowns (signal-type distribution) straight from this.
    pub summary: DerivedSummary,
    /// The server report, when one was present and parseable.
    pub report: Option<ServerReport>,
    /// Reconciled display metrics.
    pub metrics: ReconciledMetrics,
    /// Metadata about this review run.
    pub metadata: ReviewMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full review pipeline for one (assignment, device) pair.
///
/// 1. Load the deduplicated signal window from `<root>/<assignment>/<device>/`.
/// 2. Load the server report, if any.
/// 3. Aggregate the window into a [`DerivedSummary`].
/// 4. Reconcile summary and report into [`ReconciledMetrics`].
///
/// A missing snapshot directory degrades to an empty result; the pipeline
/// never panics on bad input.
pub fn review_student(root: &Path, assignment: &str, device: &str) -> ReviewResult {
    let dir = snapshot_dir(root, assignment, device);

    let load_start = std::time::Instant::now();
    let signals = load_signal_window(&dir);
    let report = load_server_report(&dir);
    let load_time = load_start.elapsed().as_secs_f64();

    let reconcile_start = std::time::Instant::now();
    let summary = EventAggregator::aggregate(&signals);
    let metrics = reconcile(&summary, report.as_ref());
    let reconcile_time = reconcile_start.elapsed().as_secs_f64();

    info!(
        assignment,
        device,
        signals = signals.len(),
        report_loaded = report.is_some(),
        using_fallback = metrics.using_fallback,
        "review complete"
    );

    let metadata = ReviewMetadata {
        generated_at: Utc::now().to_rfc3339(),
        signals_processed: signals.len(),
        report_loaded: report.is_some(),
        load_time_seconds: load_time,
        reconcile_time_seconds: reconcile_time,
    };

    ReviewResult {
        signals,
        summary,
        report,
        metrics,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
