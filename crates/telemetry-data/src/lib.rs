//! Data layer for proctor-view.
//!
//! Responsible for discovering and loading locally exported telemetry
//! snapshots (signal windows plus server reports) and running the top-level
//! review pipeline that aggregates and reconciles them.

pub mod reader;
pub mod review;

pub use telemetry_core as core;
