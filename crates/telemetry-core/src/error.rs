use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the proctoring viewer.
///
/// Aggregation and reconciliation never produce these – they are total
/// functions. Errors arise only at the edges: snapshot I/O, configuration
/// and the terminal layer.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A snapshot file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The expected snapshot root does not exist.
    #[error("Snapshot root not found: {0}")]
    SnapshotRootNotFound(PathBuf),

    /// No snapshot directory exists for the requested assignment/device pair.
    #[error("No snapshot for assignment \"{assignment}\", device \"{device}\"")]
    SnapshotMissing { assignment: String, device: String },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the viewer crates.
pub type Result<T> = std::result::Result<T, ViewerError>;
