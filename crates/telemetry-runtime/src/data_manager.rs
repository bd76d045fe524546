//! TTL-cached data manager for the viewer runtime.
//!
//! Wraps [`review_student`] with a configurable time-to-live cache and
//! transparent retry logic. Callers use [`DataManager::get_data`] to obtain a
//! fresh-or-cached [`ReviewResult`]; the manager handles staleness checks, up
//! to three fetch attempts with back-off, and graceful fallback to the
//! previous cache on transient failure.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use telemetry_data::review::{review_student, ReviewResult};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Maximum number of fetch attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around the review pipeline for one (assignment, device)
/// pair.
///
/// # Example
/// ```no_run
/// use std::path::PathBuf;
/// use telemetry_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(30, PathBuf::from("/srv/snapshots"), "hw3", "dev-1");
/// if let Some(result) = mgr.get_data(false) {
///     println!("signals: {}", result.signals.len());
/// }
/// ```
pub struct DataManager {
    /// Maximum age of cached data before it is considered stale.
    cache_ttl: Duration,
    /// Snapshot root directory.
    root: PathBuf,
    /// Assignment under review.
    assignment: String,
    /// Student device under review.
    device: String,
    /// Most recently fetched review result.
    cache: Option<ReviewResult>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl DataManager {
    /// Create a new manager for one (assignment, device) pair.
    pub fn new(cache_ttl_secs: u64, root: PathBuf, assignment: &str, device: &str) -> Self {
        Self {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            root,
            assignment: assignment.to_string(),
            device: device.to_string(),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return review data, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh fetch
    /// is always attempted. On fetch failure the previous cache (if any) is
    /// returned as a best-effort fallback.
    ///
    /// The fetch is retried up to [`MAX_RETRY_ATTEMPTS`] times with back-off
    /// (0 ms → 100 ms → 200 ms).
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&ReviewResult> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached review result");
            return self.cache.as_ref();
        }

        match self.fetch_with_retry() {
            Ok(result) => {
                tracing::debug!(
                    signals = result.signals.len(),
                    report_loaded = result.metadata.report_loaded,
                    "review cache updated"
                );
                self.cache = Some(result);
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed; falling back to cached data");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.as_ref()
            }
        }
    }

    /// Discard the current cache, forcing the next [`Self::get_data`] call to
    /// fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds data that is still within its TTL.
    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] fetches with back-off.
    fn fetch_with_retry(&mut self) -> Result<ReviewResult, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            // Back-off: 0, 100, 200 ms.
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.fetch_fresh() {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Call the review pipeline with this manager's configuration.
    fn fetch_fresh(&self) -> Result<ReviewResult, String> {
        // review_student is infallible by design; missing snapshots surface
        // as empty results rather than panics, so we wrap in a catch-unwind
        // for maximum robustness.
        let root = self.root.clone();
        let assignment = self.assignment.clone();
        let device = self.device.clone();
        std::panic::catch_unwind(move || review_student(&root, &assignment, &device)).map_err(
            |e| {
                format!(
                    "review_student panicked: {:?}",
                    e.downcast_ref::<&str>().unwrap_or(&"unknown panic")
                )
            },
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
