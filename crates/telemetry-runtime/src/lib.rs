//! Runtime layer for proctor-view.
//!
//! Coordinates the snapshot-review pipeline and the UI: a TTL-cached data
//! manager, an async refresh orchestrator, and a staleness guard that keeps
//! out-of-order refreshes from clobbering fresher ones.

pub mod data_manager;
pub mod orchestrator;
pub mod review_monitor;

pub use telemetry_core as core;
pub use telemetry_data as data;
