//! Core domain layer for proctor-view.
//!
//! Defines the signal and report data model, the event aggregation and
//! reconciliation logic, plus shared settings, time and formatting helpers
//! used by the data, runtime and UI crates.

pub mod aggregate;
pub mod error;
pub mod formatting;
pub mod models;
pub mod reconcile;
pub mod settings;
pub mod time_utils;
