use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.proctor-view/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.proctor-view/`
/// - `~/.proctor-view/logs/`
/// - `~/.proctor-view/cache/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let viewer_dir = home.join(".proctor-view");
    std::fs::create_dir_all(&viewer_dir)?;
    std::fs::create_dir_all(viewer_dir.join("logs"))?;
    std::fs::create_dir_all(viewer_dir.join("cache"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Accept classic log-level names (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Snapshot-root discovery ────────────────────────────────────────────────────

/// Attempt to locate the synced snapshot root on the local system.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `~/.proctor-view/snapshots/`
/// 2. `~/.local/share/proctor-view/snapshots/`
///
/// Returns `None` when neither path exists; callers then require an explicit
/// `--data-path`.
pub fn discover_snapshot_root() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let candidates = [
        home.join(".proctor-view").join("snapshots"),
        home.join(".local")
            .join("share")
            .join("proctor-view")
            .join("snapshots"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
