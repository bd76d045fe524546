//! Reconciliation of server-reported and event-derived activity metrics.
//!
//! The server report reflects session boundaries the client cannot always
//! observe, but it may be stale or missing per-metric; the event-derived
//! summary is always available locally but may over- or under-count when the
//! fetched window is truncated. The merge rule is the maximum of the two
//! candidate values per metric, never a blend. Burst counts are the one
//! asymmetry: the server's counts replace the event-derived ones outright
//! whenever a report exists.

use crate::models::{DerivedSummary, ReconciledMetrics, ServerReport};

/// Merge a [`DerivedSummary`] with an optional [`ServerReport`] into the
/// metrics the dashboard displays.
///
/// Deterministic combinator with no I/O and no failure modes; an absent
/// report means every server-side candidate is treated as zero/absent and
/// the event-derived value wins unconditionally.
pub fn reconcile(summary: &DerivedSummary, report: Option<&ServerReport>) -> ReconciledMetrics {
    let report_focused = report.map_or(0.0, |r| r.time.total_focused_seconds);
    let report_active = report.map_or(0.0, |r| r.time.total_active_seconds);
    let report_sessions = report.map_or(0, |r| r.time.session_count);

    let event_focused = summary.preferred_focused_seconds();
    let event_active = summary.preferred_active_seconds();

    let bursts_by_severity = match report {
        // Server burst counts are authoritative when a report exists, even
        // if all zero; the event-derived counts are a last-resort estimate,
        // not a competing measurement window.
        Some(r) => r.bursts.by_severity,
        None => summary.bursts_by_severity,
    };

    let report_has_time = report_focused > 0.0 || report_active > 0.0;
    let events_have_time = event_focused > 0.0 || event_active > 0.0;

    let first_seen = report
        .and_then(|r| r.time.first_session_start.clone())
        .or_else(|| summary.first_timestamp.map(|ts| ts.to_rfc3339()));
    let last_seen = report
        .and_then(|r| r.time.last_session_end.clone())
        .or_else(|| summary.last_timestamp.map(|ts| ts.to_rfc3339()));

    ReconciledMetrics {
        focused_seconds: report_focused.max(event_focused),
        active_seconds: report_active.max(event_active),
        session_count: report_sessions.max(summary.session_count as u64),
        bursts_by_severity,
        using_fallback: !report_has_time && events_have_time,
        first_seen,
        last_seen,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::EventAggregator;
    use crate::models::{tags, SeverityCounts, Signal, TimeSection};
    use serde_json::json;

    fn make_signal(event_id: &str, signal_type: &str, payload: serde_json::Value) -> Signal {
        serde_json::from_value(json!({
            "event_id": event_id,
            "ts": "2024-03-10T09:00:00Z",
            "session_id": "s1",
            "type": signal_type,
            "payload": payload,
        }))
        .unwrap()
    }

    fn report_with_time(focused: f64, active: f64, sessions: u64) -> ServerReport {
        ServerReport {
            time: TimeSection {
                total_focused_seconds: focused,
                total_active_seconds: active,
                session_count: sessions,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // ── Scenario: SESSION_END preferred over ticks, report absent ────────────

    #[test]
    fn test_session_end_preferred_over_ticks_without_report() {
        let signals = vec![
            make_signal(
                "e1",
                tags::SESSION_END,
                json!({"focused_seconds": 600.0, "active_seconds": 300.0}),
            ),
            make_signal(
                "e2",
                tags::TIME_TICK,
                json!({"focused_delta_seconds": 50.0, "active_delta_seconds": 20.0}),
            ),
        ];
        let summary = EventAggregator::aggregate(&signals);
        let metrics = reconcile(&summary, None);
        assert_eq!(metrics.focused_seconds, 600.0);
        assert_eq!(metrics.active_seconds, 300.0);
        assert!(metrics.using_fallback);
    }

    // ── Scenario: all-zero report behaves like an absent one ─────────────────

    #[test]
    fn test_zero_report_treated_as_absent() {
        let signals = vec![
            make_signal(
                "e1",
                tags::SESSION_END,
                json!({"focused_seconds": 600.0, "active_seconds": 300.0}),
            ),
            make_signal(
                "e2",
                tags::TIME_TICK,
                json!({"focused_delta_seconds": 50.0, "active_delta_seconds": 20.0}),
            ),
        ];
        let summary = EventAggregator::aggregate(&signals);
        let report = report_with_time(0.0, 0.0, 0);
        let metrics = reconcile(&summary, Some(&report));
        assert_eq!(metrics.focused_seconds, 600.0);
        assert_eq!(metrics.active_seconds, 300.0);
        assert!(metrics.using_fallback);
    }

    // ── Scenario: max rule favours the larger report value ───────────────────

    #[test]
    fn test_max_rule_favours_report() {
        let summary = DerivedSummary {
            focused_seconds_from_session_end: 600.0,
            ..Default::default()
        };
        let report = report_with_time(1000.0, 0.0, 0);
        let metrics = reconcile(&summary, Some(&report));
        assert_eq!(metrics.focused_seconds, 1000.0);
        assert!(!metrics.using_fallback);
    }

    // ── Scenario: event-derived burst counts when report absent ──────────────

    #[test]
    fn test_burst_counts_from_events_without_report() {
        let signals = vec![
            make_signal("e1", tags::BURST_FLAG, json!({"severity": "low"})),
            make_signal("e2", tags::BURST_FLAG, json!({"severity": "medium"})),
            make_signal("e3", tags::BURST_FLAG, json!({"severity": "medium"})),
        ];
        let summary = EventAggregator::aggregate(&signals);
        let metrics = reconcile(&summary, None);
        assert_eq!(metrics.bursts_by_severity.low, 1);
        assert_eq!(metrics.bursts_by_severity.medium, 2);
        assert_eq!(metrics.bursts_by_severity.high, 0);
    }

    // ── Burst asymmetry: report counts replace, never max ────────────────────

    #[test]
    fn test_burst_counts_from_report_are_not_maxed() {
        let summary = DerivedSummary {
            bursts_by_severity: SeverityCounts {
                low: 5,
                medium: 5,
                high: 5,
            },
            ..Default::default()
        };
        let report = ServerReport {
            bursts: crate::models::BurstSection {
                total_count: 1,
                by_severity: SeverityCounts {
                    low: 1,
                    medium: 0,
                    high: 0,
                },
            },
            ..Default::default()
        };
        let metrics = reconcile(&summary, Some(&report));
        assert_eq!(metrics.bursts_by_severity.low, 1);
        assert_eq!(metrics.bursts_by_severity.medium, 0);
        assert_eq!(metrics.bursts_by_severity.high, 0);
    }

    // ── Session count max rule ───────────────────────────────────────────────

    #[test]
    fn test_session_count_is_maxed() {
        let summary = DerivedSummary {
            session_count: 4,
            ..Default::default()
        };
        let report = report_with_time(0.0, 0.0, 2);
        assert_eq!(reconcile(&summary, Some(&report)).session_count, 4);

        let report = report_with_time(0.0, 0.0, 7);
        assert_eq!(reconcile(&summary, Some(&report)).session_count, 7);
    }

    // ── Fallback flag ────────────────────────────────────────────────────────

    #[test]
    fn test_no_fallback_when_everything_is_zero() {
        let metrics = reconcile(&DerivedSummary::default(), None);
        assert!(!metrics.using_fallback);
        assert_eq!(metrics.focused_seconds, 0.0);
        assert_eq!(metrics.session_count, 0);
    }

    #[test]
    fn test_no_fallback_when_report_has_time() {
        let summary = DerivedSummary {
            focused_seconds_from_ticks: 50.0,
            ..Default::default()
        };
        let report = report_with_time(40.0, 0.0, 1);
        let metrics = reconcile(&summary, Some(&report));
        // Events still win via max, but the server did report time.
        assert_eq!(metrics.focused_seconds, 50.0);
        assert!(!metrics.using_fallback);
    }

    #[test]
    fn test_fallback_when_only_active_seconds_derived() {
        let summary = DerivedSummary {
            active_seconds_from_ticks: 20.0,
            ..Default::default()
        };
        let metrics = reconcile(&summary, None);
        assert!(metrics.using_fallback);
        assert_eq!(metrics.active_seconds, 20.0);
    }

    // ── Seen boundaries ──────────────────────────────────────────────────────

    #[test]
    fn test_seen_boundaries_prefer_report() {
        let signals = vec![make_signal("e1", tags::SESSION_START, json!({}))];
        let summary = EventAggregator::aggregate(&signals);
        let report = ServerReport {
            time: TimeSection {
                first_session_start: Some("2024-02-01T08:00:00Z".to_string()),
                last_session_end: Some("2024-02-01T10:00:00Z".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let metrics = reconcile(&summary, Some(&report));
        assert_eq!(metrics.first_seen.as_deref(), Some("2024-02-01T08:00:00Z"));
        assert_eq!(metrics.last_seen.as_deref(), Some("2024-02-01T10:00:00Z"));
    }

    #[test]
    fn test_seen_boundaries_fall_back_to_events() {
        let signals = vec![make_signal("e1", tags::SESSION_START, json!({}))];
        let summary = EventAggregator::aggregate(&signals);
        let metrics = reconcile(&summary, None);
        assert_eq!(
            metrics.first_seen.as_deref(),
            Some("2024-03-10T09:00:00+00:00")
        );
        assert_eq!(metrics.first_seen, metrics.last_seen);
    }

    #[test]
    fn test_seen_boundaries_absent_when_nothing_parses() {
        let metrics = reconcile(&DerivedSummary::default(), None);
        assert!(metrics.first_seen.is_none());
        assert!(metrics.last_seen.is_none());
    }

    // ── Purity / idempotence ─────────────────────────────────────────────────

    #[test]
    fn test_reconcile_is_idempotent() {
        let summary = DerivedSummary {
            session_count: 2,
            focused_seconds_from_ticks: 120.0,
            active_seconds_from_ticks: 60.0,
            ..Default::default()
        };
        let report = report_with_time(100.0, 80.0, 1);
        let first = reconcile(&summary, Some(&report));
        let second = reconcile(&summary, Some(&report));
        assert_eq!(first, second);
    }
}
