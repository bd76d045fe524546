//! Async refresh orchestrator.
//!
//! Runs the review pipeline in a tokio task at a fixed interval, sending
//! numbered [`ReviewSnapshot`]s through an `mpsc` channel so the TUI event
//! loop can consume them without any shared mutable state. Each snapshot
//! carries a monotonically increasing `refresh_seq`; consumers pair the
//! channel with a [`ReviewMonitor`](crate::review_monitor::ReviewMonitor) to
//! reject snapshots from refreshes that were started earlier but landed
//! later.

use std::path::PathBuf;
use std::time::Duration;

use telemetry_data::review::ReviewResult;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::{DataManager, DEFAULT_CACHE_TTL_SECS};

// ── Public types ──────────────────────────────────────────────────────────────

/// A single numbered review snapshot forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct ReviewSnapshot {
    /// Full review result from the data pipeline.
    pub result: ReviewResult,
    /// Sequence number of the refresh that produced this snapshot, strictly
    /// increasing per orchestrator.
    pub refresh_seq: u64,
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`RefreshOrchestrator::start`] to spin up the refresh loop in a
/// dedicated tokio task and receive a channel endpoint for [`ReviewSnapshot`]
/// updates.
pub struct RefreshOrchestrator {
    /// How often to re-run the review pipeline.
    update_interval: Duration,
    /// Snapshot root directory.
    root: PathBuf,
    /// Assignment under review.
    assignment: String,
    /// Student device under review.
    device: String,
}

impl RefreshOrchestrator {
    /// Create a new orchestrator for one (assignment, device) pair.
    pub fn new(update_interval_secs: u64, root: PathBuf, assignment: &str, device: &str) -> Self {
        Self {
            update_interval: Duration::from_secs(update_interval_secs),
            root,
            assignment: assignment.to_string(),
            device: device.to_string(),
        }
    }

    /// Start the refresh loop.
    ///
    /// Spawns a tokio task that runs the loop. Returns:
    /// - An `mpsc::Receiver<ReviewSnapshot>` for the caller to poll.
    /// - A [`RefreshHandle`] that can be used to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<ReviewSnapshot>, RefreshHandle) {
        // Buffer a modest number of snapshots so slow consumers don't stall
        // the loop.
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main refresh loop.
    ///
    /// Performs an immediate fetch on startup, then repeats on
    /// `update_interval`. The loop exits when the receiver side of the
    /// channel is closed.
    async fn refresh_loop(self, tx: mpsc::Sender<ReviewSnapshot>) {
        let mut data_manager = DataManager::new(
            DEFAULT_CACHE_TTL_SECS,
            self.root.clone(),
            &self.assignment,
            &self.device,
        );
        let mut refresh_seq: u64 = 0;

        // Initial fetch (force refresh to populate immediately).
        refresh_seq += 1;
        Self::fetch_and_send(&mut data_manager, &tx, refresh_seq, true).await;

        let mut interval = time::interval(self.update_interval);
        // Consume the first tick which fires immediately; we already fetched
        // above.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("snapshot channel closed; exiting loop");
                break;
            }

            refresh_seq += 1;
            Self::fetch_and_send(&mut data_manager, &tx, refresh_seq, false).await;
        }
    }

    /// Run one refresh and send a numbered [`ReviewSnapshot`] to the channel.
    async fn fetch_and_send(
        data_manager: &mut DataManager,
        tx: &mpsc::Sender<ReviewSnapshot>,
        refresh_seq: u64,
        force: bool,
    ) {
        let result = match data_manager.get_data(force) {
            Some(r) => r.clone(),
            None => {
                tracing::warn!(refresh_seq, "no review data available; skipping send");
                return;
            }
        };

        let snapshot = ReviewSnapshot {
            result,
            refresh_seq,
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send review snapshot; receiver dropped");
        }
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// A handle to the background refresh task.
///
/// Drop or call [`RefreshHandle::abort`] to stop the loop.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
