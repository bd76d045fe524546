//! Main application state and TUI event loop for proctor-view.
//!
//! [`App`] owns the theme, view mode, and the last accepted review snapshot.
//! It drives both the live event loop (fed by the refresh orchestrator) and
//! the static one-shot views.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use telemetry_core::time_utils::{self, TimezoneHandler};
use telemetry_data::review::ReviewResult;
use telemetry_runtime::orchestrator::ReviewSnapshot;
use telemetry_runtime::review_monitor::ReviewMonitor;

use crate::report_view::{self, ReportViewData};
use crate::themes::Theme;
use crate::timeline_view::{self, TimelineState};

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Reconciled per-student report dashboard.
    Report,
    /// Raw signal timeline table.
    Timeline,
}

impl ViewMode {
    fn toggled(self) -> Self {
        match self {
            ViewMode::Report => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Report,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the proctor-view TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Assignment under review.
    pub assignment: String,
    /// Student device under review.
    pub device: String,
    /// Display timezone name.
    pub timezone: String,
    /// `true` for 12-hour clock display.
    pub use_12h: bool,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent accepted review result, `None` until the first snapshot.
    pub last_result: Option<ReviewResult>,
    /// Timeline sort order and type filter.
    pub timeline: TimelineState,
    /// Staleness guard for incoming snapshots.
    monitor: ReviewMonitor,
    /// Resolved display timezone.
    tz: TimezoneHandler,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        assignment: String,
        device: String,
        timezone: String,
        use_12h: bool,
    ) -> Self {
        let tz = TimezoneHandler::new(&timezone);
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            assignment,
            device,
            timezone,
            use_12h,
            should_quit: false,
            last_result: None,
            timeline: TimelineState::new(),
            monitor: ReviewMonitor::new(),
            tz,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the live review TUI, receiving snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while review
    /// snapshots arrive on the async channel via `try_recv`.
    ///
    /// The loop exits on `q`, `Q`, or `Ctrl+C`.
    pub async fn run_live(mut self, mut rx: mpsc::Receiver<ReviewSnapshot>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            // Drain any pending snapshots (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.apply_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Run a static view over an already-fetched result, then wait for `q` /
    /// `Ctrl+C`. View switching and timeline keys stay available.
    pub async fn run_static(mut self, result: ReviewResult) -> io::Result<()> {
        self.last_result = Some(result);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Snapshot handling ─────────────────────────────────────────────────────

    /// Store an incoming snapshot if the staleness guard accepts it.
    pub fn apply_snapshot(&mut self, snapshot: ReviewSnapshot) {
        if self.monitor.accept(&snapshot) {
            self.last_result = Some(snapshot.result);
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Translate one key press into state changes.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.view_mode = self.view_mode.toggled(),
            KeyCode::Char('o') if self.view_mode == ViewMode::Timeline => {
                self.timeline.toggle_order();
            }
            KeyCode::Char('t') if self.view_mode == ViewMode::Timeline => {
                let available = self
                    .last_result
                    .as_ref()
                    .map(|r| timeline_view::distinct_types(&r.signals))
                    .unwrap_or_default();
                self.timeline.cycle_filter(&available);
            }
            _ => {}
        }
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let Some(result) = self.last_result.as_ref() else {
            timeline_view::render_no_signals(frame, area, &self.timeline, &self.theme);
            return;
        };

        match self.view_mode {
            ViewMode::Report => {
                let now = self.tz.to_display(chrono::Utc::now());
                let data = ReportViewData {
                    assignment: self.assignment.clone(),
                    device: self.device.clone(),
                    timezone: self.timezone.clone(),
                    metrics: result.metrics.clone(),
                    summary: result.summary.clone(),
                    report: result.report.clone(),
                    current_time: time_utils::format_boundary_time(&now),
                };
                report_view::render_report_view(frame, area, &data, &self.theme);
            }
            ViewMode::Timeline => {
                timeline_view::render_timeline_view(
                    frame,
                    area,
                    &result.signals,
                    &self.timeline,
                    &self.tz,
                    self.use_12h,
                    &self.theme,
                );
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
