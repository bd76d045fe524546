//! Raw-signal timeline table for the proctor-view TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per telemetry
//! signal, newest-first by default, with an optional type filter the app
//! layer cycles through the tags present in the window.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use telemetry_core::formatting;
use telemetry_core::models::{Signal, SignalPayload};
use telemetry_core::time_utils::{self, TimezoneHandler};

use crate::themes::Theme;

/// Widest the payload column gets before truncation.
const PAYLOAD_COL_WIDTH: usize = 48;

/// View state for the timeline: sort order and optional type filter.
#[derive(Debug, Clone, Default)]
pub struct TimelineState {
    /// Show only signals with this raw tag when set.
    pub type_filter: Option<String>,
    /// Newest-first when `true` (the default presentation).
    pub newest_first: bool,
}

impl TimelineState {
    pub fn new() -> Self {
        Self {
            type_filter: None,
            newest_first: true,
        }
    }

    /// Flip between newest-first and oldest-first.
    pub fn toggle_order(&mut self) {
        self.newest_first = !self.newest_first;
    }

    /// Advance the type filter through `available` (sorted distinct tags),
    /// returning to "all signals" after the last one.
    pub fn cycle_filter(&mut self, available: &[String]) {
        self.type_filter = match &self.type_filter {
            None => available.first().cloned(),
            Some(current) => available
                .iter()
                .position(|t| t == current)
                .and_then(|i| available.get(i + 1))
                .cloned(),
        };
    }
}

/// Sorted distinct raw tags present in `signals`, for filter cycling.
pub fn distinct_types(signals: &[Signal]) -> Vec<String> {
    let mut types: Vec<String> = signals.iter().map(|s| s.signal_type.clone()).collect();
    types.sort();
    types.dedup();
    types
}

/// Render the signal timeline into `area`.
///
/// Signals arrive oldest-first from the reader; this applies the state's
/// filter and order before building rows.
pub fn render_timeline_view(
    frame: &mut Frame,
    area: Rect,
    signals: &[Signal],
    state: &TimelineState,
    tz: &TimezoneHandler,
    use_12h: bool,
    theme: &Theme,
) {
    let mut visible: Vec<&Signal> = signals
        .iter()
        .filter(|s| {
            state
                .type_filter
                .as_deref()
                .map_or(true, |t| s.signal_type == t)
        })
        .collect();
    if state.newest_first {
        visible.reverse();
    }

    if visible.is_empty() {
        render_no_signals(frame, area, state, theme);
        return;
    }

    let header_cells = ["Time", "Type", "Session", "Payload"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, signal)| {
            let row_style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(display_time(signal, tz, use_12h)),
                Cell::from(signal.signal_type.clone())
                    .style(theme.signal_style(&signal.signal_type)),
                Cell::from(formatting::short_id(&signal.session_id)),
                Cell::from(payload_summary(signal)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(22),
        Constraint::Length(12),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(timeline_title(state, visible.len())),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when the window (after filtering) is empty.
pub fn render_no_signals(frame: &mut Frame, area: Rect, state: &TimelineState, theme: &Theme) {
    let message = match &state.type_filter {
        Some(tag) => format!("No {} signals in this snapshot", tag),
        None => "No telemetry signals found".to_string(),
    };
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "The student device may not have uploaded a snapshot yet.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Timeline "),
        ),
        area,
    );
}

// ── Row helpers ───────────────────────────────────────────────────────────────

/// Format a signal's timestamp in the display timezone; malformed timestamps
/// fall through as their raw wire string.
fn display_time(signal: &Signal, tz: &TimezoneHandler, use_12h: bool) -> String {
    match time_utils::parse_signal_timestamp(&signal.ts) {
        Some(dt) => time_utils::format_timeline_time(&tz.to_display(dt), use_12h),
        None => signal.ts.clone(),
    }
}

/// One-line payload description for the table's last column.
fn payload_summary(signal: &Signal) -> String {
    let summary = match &signal.payload {
        SignalPayload::SessionStart => String::new(),
        SignalPayload::SessionEnd {
            focused_seconds,
            active_seconds,
        } => format!(
            "focused {}, active {}",
            formatting::format_duration(*focused_seconds),
            formatting::format_duration(*active_seconds)
        ),
        SignalPayload::TimeTick {
            focused_delta_seconds,
            active_delta_seconds,
        } => format!(
            "+{:.0}s focused, +{:.0}s active",
            focused_delta_seconds, active_delta_seconds
        ),
        SignalPayload::BurstFlag { severity } => match severity {
            Some(s) => format!("severity: {}", s.label()),
            None => "severity: unknown".to_string(),
        },
        SignalPayload::CheckpointCreated { checkpoint_id } => match checkpoint_id {
            Some(id) => formatting::short_id(id),
            None => String::new(),
        },
        SignalPayload::IntegrityCompromised { description } => {
            description.clone().unwrap_or_default()
        }
        SignalPayload::UnverifiedChanges | SignalPayload::Other => {
            // No typed view; show the raw JSON compactly.
            if signal.raw_payload.is_null() {
                String::new()
            } else {
                signal.raw_payload.to_string()
            }
        }
    };
    truncate_display(&summary, PAYLOAD_COL_WIDTH)
}

/// Truncate to `max_width` terminal cells, appending an ellipsis when cut.
fn truncate_display(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(3) {
            break;
        }
        width += ch_width;
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn timeline_title(state: &TimelineState, count: usize) -> String {
    let order = if state.newest_first {
        "newest first"
    } else {
        "oldest first"
    };
    match &state.type_filter {
        Some(tag) => format!(" Timeline · {} · {} shown · {} ", tag, count, order),
        None => format!(" Timeline · {} shown · {} ", count, order),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
