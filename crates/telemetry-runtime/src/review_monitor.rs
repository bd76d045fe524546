//! Staleness guard for review snapshots.
//!
//! Refreshes can overlap: a snapshot from a refresh that started earlier may
//! arrive after one from a later refresh. [`ReviewMonitor`] consumes
//! snapshots in arrival order and rejects any whose `refresh_seq` is not
//! strictly greater than the last applied one, so the display never moves
//! backwards in time. It also records fallback and integrity transitions
//! across accepted refreshes for the log.

use telemetry_data::review::ReviewResult;

use crate::orchestrator::ReviewSnapshot;

// ── Public types ──────────────────────────────────────────────────────────────

/// One accepted refresh, as remembered by the monitor.
#[derive(Debug, Clone)]
pub struct RefreshRecord {
    /// Sequence number of the refresh.
    pub refresh_seq: u64,
    /// ISO-8601 timestamp when the result was generated.
    pub generated_at: String,
    /// Whether the displayed totals came from client-side reconstruction.
    pub using_fallback: bool,
    /// Whether the server report's integrity check passed (`None` when no
    /// report was loaded).
    pub integrity_passed: Option<bool>,
}

// ── ReviewMonitor ─────────────────────────────────────────────────────────────

/// Tracks the most recently applied snapshot and enforces last-started-wins.
pub struct ReviewMonitor {
    /// Sequence number of the last accepted snapshot.
    last_applied_seq: Option<u64>,
    /// Ordered log of accepted refreshes.
    refresh_history: Vec<RefreshRecord>,
}

impl ReviewMonitor {
    /// Create a new, empty monitor.
    pub fn new() -> Self {
        Self {
            last_applied_seq: None,
            refresh_history: Vec::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Offer a snapshot to the monitor.
    ///
    /// Returns `true` when the snapshot is fresher than the last applied one
    /// and should be displayed; `false` when it is stale and must be
    /// discarded. Accepted snapshots are recorded, and fallback / integrity
    /// transitions relative to the previous accepted refresh are logged.
    pub fn accept(&mut self, snapshot: &ReviewSnapshot) -> bool {
        if let Some(last) = self.last_applied_seq {
            if snapshot.refresh_seq <= last {
                tracing::debug!(
                    refresh_seq = snapshot.refresh_seq,
                    last_applied = last,
                    "discarding stale review snapshot"
                );
                return false;
            }
        }

        self.log_transitions(&snapshot.result);
        self.last_applied_seq = Some(snapshot.refresh_seq);
        self.refresh_history.push(RefreshRecord {
            refresh_seq: snapshot.refresh_seq,
            generated_at: snapshot.result.metadata.generated_at.clone(),
            using_fallback: snapshot.result.metrics.using_fallback,
            integrity_passed: snapshot.result.report.as_ref().map(|r| r.integrity.passed),
        });
        true
    }

    /// Sequence number of the last accepted snapshot, or `None`.
    pub fn last_applied_seq(&self) -> Option<u64> {
        self.last_applied_seq
    }

    /// Number of snapshots accepted so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_history.len()
    }

    /// Ordered log of accepted refreshes.
    pub fn refresh_history(&self) -> &[RefreshRecord] {
        &self.refresh_history
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Log fallback / integrity changes relative to the previous accepted
    /// refresh.
    fn log_transitions(&self, result: &ReviewResult) {
        let Some(prev) = self.refresh_history.last() else {
            return;
        };

        if result.metrics.using_fallback != prev.using_fallback {
            tracing::info!(
                using_fallback = result.metrics.using_fallback,
                "time-total source changed between refreshes"
            );
        }

        let integrity = result.report.as_ref().map(|r| r.integrity.passed);
        if integrity != prev.integrity_passed {
            tracing::info!(
                integrity_passed = ?integrity,
                "integrity verdict changed between refreshes"
            );
        }
    }
}

impl Default for ReviewMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
