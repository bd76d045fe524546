//! Client-side aggregation of a raw signal window.
//!
//! One pass over the signals produces a [`DerivedSummary`]: session counts,
//! per-tag totals, time sums from both TIME_TICK deltas and SESSION_END
//! rollups, burst severity counts and the observed timestamp range. The pass
//! is total – malformed timestamps or payload fields degrade field-by-field
//! and never abort the scan.

use std::collections::HashSet;

use crate::models::{DerivedSummary, Signal, SignalPayload};
use crate::time_utils::parse_signal_timestamp;

/// Aggregates raw signal windows into [`DerivedSummary`] values.
///
/// Stateless; the input window is treated as already deduplicated by the
/// loading layer, so every signal counts exactly once.
pub struct EventAggregator;

impl EventAggregator {
    /// Summarise `signals` in one pass.
    ///
    /// An empty window yields the all-zero summary. Signals with an
    /// unparseable `ts` still contribute to every count and sum; they are
    /// only excluded from the first/last timestamp range.
    pub fn aggregate(signals: &[Signal]) -> DerivedSummary {
        let mut summary = DerivedSummary::default();
        let mut session_ids: HashSet<&str> = HashSet::new();

        for signal in signals {
            session_ids.insert(signal.session_id.as_str());
            *summary
                .type_counts
                .entry(signal.signal_type.clone())
                .or_insert(0) += 1;

            if let Some(ts) = parse_signal_timestamp(&signal.ts) {
                // Strict comparisons: on exact ties the first-seen signal
                // keeps the boundary.
                match summary.first_timestamp {
                    Some(first) if ts < first => summary.first_timestamp = Some(ts),
                    None => summary.first_timestamp = Some(ts),
                    _ => {}
                }
                match summary.last_timestamp {
                    Some(last) if ts > last => summary.last_timestamp = Some(ts),
                    None => summary.last_timestamp = Some(ts),
                    _ => {}
                }
            }

            match &signal.payload {
                SignalPayload::TimeTick {
                    focused_delta_seconds,
                    active_delta_seconds,
                } => {
                    summary.focused_seconds_from_ticks += focused_delta_seconds;
                    summary.active_seconds_from_ticks += active_delta_seconds;
                }
                SignalPayload::SessionEnd {
                    focused_seconds,
                    active_seconds,
                } => {
                    summary.focused_seconds_from_session_end += focused_seconds;
                    summary.active_seconds_from_session_end += active_seconds;
                }
                SignalPayload::BurstFlag { severity } => {
                    // Unrecognised severities parsed to None; they count
                    // toward the BURST_FLAG tag total only.
                    if let Some(severity) = severity {
                        summary.bursts_by_severity.increment(*severity);
                    }
                }
                _ => {}
            }
        }

        summary.session_count = session_ids.len();
        summary
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
