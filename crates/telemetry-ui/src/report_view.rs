//! Reconciled report dashboard for the proctor-view TUI.
//!
//! Renders the per-student summary screen: integrity verdict, session
//! boundaries, reconciled time totals with a focus-ratio bar, burst
//! breakdown, checkpoint bookkeeping, and a signal-mix strip comparing the
//! raw timeline against the server's report.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use telemetry_core::formatting;
use telemetry_core::models::{
    DerivedSummary, ReconciledMetrics, Severity, ServerReport,
};

use crate::themes::Theme;

/// All data required to render the report view.
pub struct ReportViewData {
    /// Assignment under review.
    pub assignment: String,
    /// Student device under review.
    pub device: String,
    /// Display timezone name.
    pub timezone: String,
    /// Reconciled display metrics.
    pub metrics: ReconciledMetrics,
    /// Client-side summary derived from the raw signal window.
    pub summary: DerivedSummary,
    /// Server report, when one was loaded.
    pub report: Option<ServerReport>,
    /// Formatted current wall-clock time string.
    pub current_time: String,
}

// ── Line helpers ──────────────────────────────────────────────────────────────

/// Build a bar string, capping fill at 100 %.
///
/// Returns a tuple `(filled_str, empty_str)` each ready for display.
fn build_bar(pct: f64, width: usize) -> (String, String) {
    let capped = pct.clamp(0.0, 100.0);
    let filled = ((capped / 100.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    ("█".repeat(filled), "░".repeat(empty))
}

/// Pad a label to 22 display columns so value columns line up.
fn pad_label(label: &str) -> String {
    format!("{:<22}", label)
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the report view into `area`.
pub fn render_report_view(frame: &mut Frame, area: Rect, data: &ReportViewData, theme: &Theme) {
    let lines = build_report_lines(data, theme);
    let paragraph = Paragraph::new(Text::from(lines));
    frame.render_widget(paragraph, area);
}

/// Build the full `Vec<Line>` for the report view (extracted for testability).
pub fn build_report_lines<'a>(data: &ReportViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(32);

    // ── Header ────────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "PROCTOR VIEW — ASSIGNMENT REVIEW",
        theme.header,
    )));
    lines.push(Line::from(Span::styled("=".repeat(78), theme.separator)));
    lines.push(Line::from(vec![
        Span::styled("[ ", theme.label),
        Span::styled(data.assignment.clone(), theme.value),
        Span::styled(" | ", theme.label),
        Span::styled(data.device.clone(), theme.value),
        Span::styled(" | ", theme.label),
        Span::styled(data.timezone.clone(), theme.value),
        Span::styled(" ]", theme.label),
    ]));
    lines.push(Line::from(""));

    // ── Integrity ─────────────────────────────────────────────────────────────
    match &data.report {
        Some(report) if report.integrity.passed => {
            lines.push(Line::from(vec![
                Span::styled(pad_label("Integrity:"), theme.label),
                Span::styled("✔ passed", theme.success),
            ]));
        }
        Some(report) => {
            lines.push(Line::from(vec![
                Span::styled(pad_label("Integrity:"), theme.label),
                Span::styled("✘ flagged", theme.error),
            ]));
            for issue in &report.integrity.issues {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(22)),
                    Span::styled(format!("· {}: ", issue.issue_type), theme.dim),
                    Span::styled(issue.description.clone(), theme.text),
                ]));
            }
        }
        None => {
            lines.push(Line::from(vec![
                Span::styled(pad_label("Integrity:"), theme.label),
                Span::styled("no server report loaded", theme.warning),
            ]));
        }
    }

    if data.metrics.using_fallback {
        lines.push(Line::from(Span::styled(
            "⚠ Time totals reconstructed from raw signals (server report had none)",
            theme.warning,
        )));
    }
    lines.push(Line::from(""));

    // ── Sessions ──────────────────────────────────────────────────────────────
    lines.push(Line::from(vec![
        Span::styled(pad_label("Sessions:"), theme.label),
        Span::styled(formatting::format_count(data.metrics.session_count), theme.value),
    ]));
    lines.push(Line::from(vec![
        Span::styled(pad_label("First seen:"), theme.label),
        Span::styled(
            data.metrics
                .first_seen
                .clone()
                .unwrap_or_else(|| "—".to_string()),
            theme.text,
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled(pad_label("Last seen:"), theme.label),
        Span::styled(
            data.metrics
                .last_seen
                .clone()
                .unwrap_or_else(|| "—".to_string()),
            theme.text,
        ),
    ]));
    lines.push(Line::from(""));

    // ── Time totals ───────────────────────────────────────────────────────────
    lines.push(Line::from(vec![
        Span::styled(pad_label("Focused time:"), theme.label),
        Span::styled(
            formatting::format_duration(data.metrics.focused_seconds),
            theme.value,
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled(pad_label("Active time:"), theme.label),
        Span::styled(
            formatting::format_duration(data.metrics.active_seconds),
            theme.value,
        ),
    ]));

    // Focus ratio bar; the ratio can exceed 100 % but the bar is capped.
    let ratio = data.metrics.focus_ratio();
    let (filled, empty) = build_bar(ratio as f64, 50);
    let bar_style = theme.progress_style((ratio as f64).min(100.0));
    lines.push(Line::from(vec![
        Span::styled(pad_label("Focus ratio:"), theme.label),
        Span::styled("[", theme.dim),
        Span::styled(filled, bar_style),
        Span::styled(empty, theme.progress_empty),
        Span::styled("] ", theme.dim),
        Span::styled(format!("{}%", ratio), bar_style),
    ]));
    lines.push(Line::from(""));

    // ── Separator ─────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled("─".repeat(78), theme.separator)));

    // ── Bursts ────────────────────────────────────────────────────────────────
    let bursts = &data.metrics.bursts_by_severity;
    let mut burst_spans: Vec<Span<'a>> = vec![Span::styled(pad_label("Burst edits:"), theme.label)];
    if bursts.total() == 0 {
        burst_spans.push(Span::styled("none", theme.dim));
    } else {
        for (i, severity) in [Severity::Low, Severity::Medium, Severity::High]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                burst_spans.push(Span::styled(" | ", theme.dim));
            }
            burst_spans.push(Span::styled(
                format!("{} {}", severity.label(), bursts.get(severity)),
                theme.severity_style(severity),
            ));
        }
        burst_spans.push(Span::styled(
            format!("   ({} total)", bursts.total()),
            theme.dim,
        ));
    }
    lines.push(Line::from(burst_spans));

    // ── Checkpoints and unverified changes (server bookkeeping) ───────────────
    if let Some(report) = &data.report {
        let mut ckpt_spans: Vec<Span<'a>> = vec![
            Span::styled(pad_label("Checkpoints:"), theme.label),
            Span::styled(
                formatting::format_count(report.checkpoints.count),
                theme.value,
            ),
        ];
        if let Some(latest) = &report.checkpoints.latest_checkpoint_id {
            ckpt_spans.push(Span::styled("   latest ", theme.dim));
            ckpt_spans.push(Span::styled(formatting::short_id(latest), theme.info));
        }
        lines.push(Line::from(ckpt_spans));

        let unverified_style = if report.unverified_changes > 0 {
            theme.warning
        } else {
            theme.value
        };
        lines.push(Line::from(vec![
            Span::styled(pad_label("Unverified changes:"), theme.label),
            Span::styled(
                formatting::format_count(report.unverified_changes),
                unverified_style,
            ),
        ]));
    }
    lines.push(Line::from(""));

    // ── Signal mix ────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled("─".repeat(78), theme.separator)));
    let total = data.summary.total_signals();
    lines.push(Line::from(vec![
        Span::styled(pad_label("Signals in window:"), theme.label),
        Span::styled(formatting::format_count(total), theme.value),
    ]));

    let mut counted: Vec<(&String, &u64)> = data.summary.type_counts.iter().collect();
    counted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (tag, count) in counted {
        let pct = formatting::percentage(*count as f64, total as f64, 1);
        let (filled, _) = build_bar(pct, 30);
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(2)),
            Span::styled(format!("{:<22}", tag), theme.signal_style(tag)),
            Span::styled(filled, theme.signal_style(tag)),
            Span::styled(
                format!(" {} ({:.1}%)", formatting::format_count(*count), pct),
                theme.dim,
            ),
        ]));
    }
    lines.push(Line::from(""));

    // ── Coverage: timeline-derived vs reported totals ─────────────────────────
    if let Some(report) = &data.report {
        lines.push(Line::from(vec![
            Span::styled(pad_label("Timeline focused:"), theme.label),
            Span::styled(
                formatting::format_duration(data.summary.preferred_focused_seconds()),
                theme.text,
            ),
            Span::styled("   reported ", theme.dim),
            Span::styled(
                formatting::format_duration(report.time.total_focused_seconds),
                theme.text,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled(pad_label("Timeline active:"), theme.label),
            Span::styled(
                formatting::format_duration(data.summary.preferred_active_seconds()),
                theme.text,
            ),
            Span::styled("   reported ", theme.dim),
            Span::styled(
                formatting::format_duration(report.time.total_active_seconds),
                theme.text,
            ),
        ]));
        lines.push(Line::from(""));
    }

    // ── Footer ────────────────────────────────────────────────────────────────
    lines.push(Line::from(vec![
        Span::styled(data.current_time.clone(), theme.dim),
        Span::styled("   q quit · tab switch view", theme.dim),
    ]));

    lines
}

// ── Tests ─────────────────────────────────────────────────────────────────────
