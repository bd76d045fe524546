//! Data model for proctoring telemetry.
//!
//! A [`Signal`] is one timestamped event emitted by the student-side agent.
//! On the wire its payload is a loosely shaped JSON value; here it is mapped
//! into the tagged [`SignalPayload`] enum so downstream code never probes
//! untyped structures. [`ServerReport`] mirrors the reporting service's
//! per-student summary document and tolerates missing fields throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Signal tags ───────────────────────────────────────────────────────────────

/// Well-known signal type tags. Tags outside this set are preserved verbatim
/// and counted, but carry no typed payload.
pub mod tags {
    pub const SESSION_START: &str = "SESSION_START";
    pub const SESSION_END: &str = "SESSION_END";
    pub const TIME_TICK: &str = "TIME_TICK";
    pub const BURST_FLAG: &str = "BURST_FLAG";
    pub const CHECKPOINT_CREATED: &str = "CHECKPOINT_CREATED";
    pub const UNVERIFIED_CHANGES: &str = "UNVERIFIED_CHANGES";
    pub const INTEGRITY_COMPROMISED: &str = "INTEGRITY_COMPROMISED";
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// Burst-edit severity levels recognised by the reconciliation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parse a raw severity string. Anything outside the known set is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Per-severity burst counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(default)]
    pub low: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub high: u64,
}

impl SeverityCounts {
    /// Increment the counter for `severity`.
    pub fn increment(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
        }
    }

    /// Read the counter for `severity`.
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }

    /// Sum across all three severities.
    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high
    }
}

// ── SignalPayload ─────────────────────────────────────────────────────────────

/// Typed view of a signal's payload, one variant per known tag.
///
/// Construction from wire data never fails: missing or non-numeric fields
/// contribute 0.0, unrecognised severities become `None`, and unknown tags
/// map to [`SignalPayload::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPayload {
    SessionStart,
    SessionEnd {
        focused_seconds: f64,
        active_seconds: f64,
    },
    TimeTick {
        focused_delta_seconds: f64,
        active_delta_seconds: f64,
    },
    BurstFlag {
        severity: Option<Severity>,
    },
    CheckpointCreated {
        checkpoint_id: Option<String>,
    },
    UnverifiedChanges,
    IntegrityCompromised {
        description: Option<String>,
    },
    /// Unknown or future signal tags; counted but otherwise opaque.
    Other,
}

impl SignalPayload {
    /// Build the typed payload from the raw tag plus the wire JSON value.
    ///
    /// Non-object payloads (null, arrays, scalars) yield the variant's
    /// zero/absent defaults rather than an error.
    pub fn from_wire(signal_type: &str, payload: &serde_json::Value) -> Self {
        match signal_type {
            tags::SESSION_START => SignalPayload::SessionStart,
            tags::SESSION_END => SignalPayload::SessionEnd {
                focused_seconds: num_field(payload, "focused_seconds"),
                active_seconds: num_field(payload, "active_seconds"),
            },
            tags::TIME_TICK => SignalPayload::TimeTick {
                focused_delta_seconds: num_field(payload, "focused_delta_seconds"),
                active_delta_seconds: num_field(payload, "active_delta_seconds"),
            },
            tags::BURST_FLAG => SignalPayload::BurstFlag {
                severity: str_field(payload, "severity")
                    .as_deref()
                    .and_then(Severity::parse),
            },
            tags::CHECKPOINT_CREATED => SignalPayload::CheckpointCreated {
                checkpoint_id: str_field(payload, "checkpoint_id"),
            },
            tags::UNVERIFIED_CHANGES => SignalPayload::UnverifiedChanges,
            tags::INTEGRITY_COMPROMISED => SignalPayload::IntegrityCompromised {
                description: str_field(payload, "description"),
            },
            _ => SignalPayload::Other,
        }
    }
}

/// Extract a numeric field from an object payload; anything else is 0.0.
fn num_field(payload: &serde_json::Value, name: &str) -> f64 {
    payload.get(name).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// Extract a string field from an object payload.
fn str_field(payload: &serde_json::Value, name: &str) -> Option<String> {
    payload
        .get(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

// ── Signal ────────────────────────────────────────────────────────────────────

/// One timestamped telemetry event for a student on an assignment.
///
/// `ts` keeps the raw wire string because it may be malformed; parsing into a
/// [`DateTime`] happens lazily during aggregation and display. `raw_payload`
/// keeps the original JSON so the timeline view can show it unmodified.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "WireSignal")]
pub struct Signal {
    pub event_id: String,
    pub ts: String,
    pub session_id: String,
    pub signal_type: String,
    pub payload: SignalPayload,
    pub raw_payload: serde_json::Value,
}

/// Wire shape of a signal as exported by the proctoring backend.
#[derive(Debug, Deserialize)]
struct WireSignal {
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    session_id: String,
    #[serde(rename = "type", default)]
    signal_type: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl From<WireSignal> for Signal {
    fn from(wire: WireSignal) -> Self {
        let payload = SignalPayload::from_wire(&wire.signal_type, &wire.payload);
        Signal {
            event_id: wire.event_id,
            ts: wire.ts,
            session_id: wire.session_id,
            signal_type: wire.signal_type,
            payload,
            raw_payload: wire.payload,
        }
    }
}

// ── DerivedSummary ────────────────────────────────────────────────────────────

/// Client-side summary derived from one raw signal window.
///
/// Recomputed from scratch on every refresh; holds no identity between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSummary {
    /// Number of distinct `session_id` values seen.
    pub session_count: usize,
    /// Occurrence count per raw signal tag (unknown tags included).
    pub type_counts: HashMap<String, u64>,
    /// Burst counts for recognised severities only.
    pub bursts_by_severity: SeverityCounts,
    /// Sum of `focused_delta_seconds` over TIME_TICK payloads.
    pub focused_seconds_from_ticks: f64,
    /// Sum of `active_delta_seconds` over TIME_TICK payloads.
    pub active_seconds_from_ticks: f64,
    /// Sum of `focused_seconds` over SESSION_END payloads.
    pub focused_seconds_from_session_end: f64,
    /// Sum of `active_seconds` over SESSION_END payloads.
    pub active_seconds_from_session_end: f64,
    /// Earliest parseable event timestamp, if any parsed.
    pub first_timestamp: Option<DateTime<Utc>>,
    /// Latest parseable event timestamp, if any parsed.
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl DerivedSummary {
    /// Event-derived focused seconds with SESSION_END rollups preferred:
    /// per-session rollups are authoritative when any session closed cleanly,
    /// otherwise fall back to the finer-grained tick deltas.
    pub fn preferred_focused_seconds(&self) -> f64 {
        if self.focused_seconds_from_session_end > 0.0 {
            self.focused_seconds_from_session_end
        } else {
            self.focused_seconds_from_ticks
        }
    }

    /// Same preference rule as [`Self::preferred_focused_seconds`], applied
    /// independently to active seconds.
    pub fn preferred_active_seconds(&self) -> f64 {
        if self.active_seconds_from_session_end > 0.0 {
            self.active_seconds_from_session_end
        } else {
            self.active_seconds_from_ticks
        }
    }

    /// Total number of signals represented (sum over all type counts).
    pub fn total_signals(&self) -> u64 {
        self.type_counts.values().sum()
    }
}

// ── ServerReport ──────────────────────────────────────────────────────────────

/// Integrity verdict plus the issues that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegritySection {
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub issues: Vec<IntegrityIssue>,
}

/// One integrity issue recorded by the reporting service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityIssue {
    #[serde(rename = "type", default)]
    pub issue_type: String,
    #[serde(default)]
    pub description: String,
}

/// Server-computed time totals and session boundaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSection {
    #[serde(default)]
    pub total_focused_seconds: f64,
    #[serde(default)]
    pub total_active_seconds: f64,
    #[serde(default)]
    pub session_count: u64,
    #[serde(default)]
    pub first_session_start: Option<String>,
    #[serde(default)]
    pub last_session_end: Option<String>,
}

/// Server-computed burst totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BurstSection {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub by_severity: SeverityCounts,
}

/// Server-side checkpoint bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointSection {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub latest_checkpoint_id: Option<String>,
}

/// The per-(assignment, student) summary produced by the external reporting
/// service. Every field is defaulted so a partial document still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerReport {
    #[serde(default)]
    pub assignment_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub integrity: IntegritySection,
    #[serde(default)]
    pub time: TimeSection,
    #[serde(default)]
    pub bursts: BurstSection,
    #[serde(default)]
    pub checkpoints: CheckpointSection,
    #[serde(default)]
    pub unverified_changes: u64,
}

// ── ReconciledMetrics ─────────────────────────────────────────────────────────

/// Final display metrics produced by reconciling a [`DerivedSummary`] with a
/// [`ServerReport`].
///
/// Focused/active seconds and session count are the maximum of the two
/// candidate sources, so they are never negative and never double-counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciledMetrics {
    pub focused_seconds: f64,
    pub active_seconds: f64,
    pub session_count: u64,
    pub bursts_by_severity: SeverityCounts,
    /// `true` when the displayed time totals come from client-side
    /// reconstruction because the server report carried none.
    pub using_fallback: bool,
    /// ISO-8601 first-seen boundary (server's when available).
    pub first_seen: Option<String>,
    /// ISO-8601 last-seen boundary (server's when available).
    pub last_seen: Option<String>,
}

impl ReconciledMetrics {
    /// Active-to-focused percentage, rounded. 0 when no focused time exists;
    /// may exceed 100 when active time outruns focused time.
    pub fn focus_ratio(&self) -> u64 {
        if self.focused_seconds > 0.0 {
            (self.active_seconds / self.focused_seconds * 100.0).round() as u64
        } else {
            0
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
