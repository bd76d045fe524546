//! Terminal UI layer for proctor-view.
//!
//! Provides themes, the reconciled report dashboard, the raw-signal timeline
//! table, and the main application event loop built on top of [`ratatui`].

pub mod app;
pub mod report_view;
pub mod themes;
pub mod timeline_view;

pub use telemetry_core as core;
