use ratatui::style::{Color, Modifier, Style};

use telemetry_core::models::{tags, Severity};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned as the safe
/// default.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Complete theme definition carrying all UI styles used by telemetry-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Focus-ratio bar ──────────────────────────────────────────────────────
    /// Filled portion when the ratio is below 50 %.
    pub progress_low: Style,
    /// Filled portion when the ratio is between 50 % and 80 %.
    pub progress_medium: Style,
    /// Filled portion when the ratio is at or above 80 %.
    pub progress_high: Style,
    /// Unfilled (empty) portion of a bar.
    pub progress_empty: Style,
    pub progress_label: Style,

    // ── Burst severity ───────────────────────────────────────────────────────
    pub severity_low: Style,
    pub severity_medium: Style,
    pub severity_high: Style,

    // ── Signal types ─────────────────────────────────────────────────────────
    pub signal_session: Style,
    pub signal_tick: Style,
    pub signal_burst: Style,
    pub signal_checkpoint: Style,
    pub signal_integrity: Style,
    pub signal_other: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            progress_low: Style::default().fg(Color::Red),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Green),
            progress_empty: Style::default().fg(Color::DarkGray),
            progress_label: Style::default().fg(Color::Gray),

            severity_low: Style::default().fg(Color::Green),
            severity_medium: Style::default().fg(Color::Yellow),
            severity_high: Style::default().fg(Color::Red),

            signal_session: Style::default().fg(Color::Cyan),
            signal_tick: Style::default().fg(Color::Gray),
            signal_burst: Style::default().fg(Color::Yellow),
            signal_checkpoint: Style::default().fg(Color::Green),
            signal_integrity: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            signal_other: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text and bright accent colours so that content
    /// remains legible against a white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            progress_low: Style::default().fg(Color::Red),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Green),
            progress_empty: Style::default().fg(Color::Gray),
            progress_label: Style::default().fg(Color::DarkGray),

            severity_low: Style::default().fg(Color::Green),
            severity_medium: Style::default().fg(Color::Yellow),
            severity_high: Style::default().fg(Color::Red),

            signal_session: Style::default().fg(Color::Blue),
            signal_tick: Style::default().fg(Color::DarkGray),
            signal_burst: Style::default().fg(Color::Yellow),
            signal_checkpoint: Style::default().fg(Color::Green),
            signal_integrity: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            signal_other: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// Avoids bold modifiers to maintain a retro aesthetic and maximise
    /// compatibility with minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            progress_low: Style::default().fg(Color::Red),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Green),
            progress_empty: Style::default().fg(Color::DarkGray),
            progress_label: Style::default().fg(Color::White),

            severity_low: Style::default().fg(Color::Green),
            severity_medium: Style::default().fg(Color::Yellow),
            severity_high: Style::default().fg(Color::Red),

            signal_session: Style::default().fg(Color::Cyan),
            signal_tick: Style::default().fg(Color::Gray),
            signal_burst: Style::default().fg(Color::Yellow),
            signal_checkpoint: Style::default().fg(Color::Green),
            signal_integrity: Style::default().fg(Color::Red),
            signal_other: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Return the focus-ratio bar fill style for a given percentage.
    ///
    /// Unlike a utilisation gauge, a high focus ratio is a GOOD sign, so the
    /// colour scale runs red → yellow → green:
    /// * `< 50 %`  → `progress_low` (red)
    /// * `50–80 %` → `progress_medium` (yellow)
    /// * `≥ 80 %`  → `progress_high` (green)
    pub fn progress_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.progress_high
        } else if percentage >= 50.0 {
            self.progress_medium
        } else {
            self.progress_low
        }
    }

    /// Return the style for a burst severity level.
    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Low => self.severity_low,
            Severity::Medium => self.severity_medium,
            Severity::High => self.severity_high,
        }
    }

    /// Return the style that best matches a raw signal type tag.
    pub fn signal_style(&self, signal_type: &str) -> Style {
        match signal_type {
            tags::SESSION_START | tags::SESSION_END => self.signal_session,
            tags::TIME_TICK => self.signal_tick,
            tags::BURST_FLAG => self.signal_burst,
            tags::CHECKPOINT_CREATED => self.signal_checkpoint,
            tags::UNVERIFIED_CHANGES | tags::INTEGRITY_COMPROMISED => self.signal_integrity,
            _ => self.signal_other,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert_eq!(t.severity_high.fg, Some(Color::Red));
        assert_eq!(t.signal_session.fg, Some(Color::Cyan));
        assert_eq!(t.signal_checkpoint.fg, Some(Color::Green));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.signal_session.fg, Some(Color::Blue));
        assert_eq!(t.table_row.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_creation() {
        let t = Theme::classic();
        // Classic has no bold modifiers on primary text fields.
        assert!(!t.bold.add_modifier.contains(Modifier::BOLD));
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.table_total.fg, Some(Color::Yellow));
        // Classic signal_integrity must NOT have BOLD (unlike dark/light).
        assert!(!t.signal_integrity.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_dark() {
        let t = Theme::from_name("dark");
        assert_eq!(t.header.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_from_name_light() {
        let t = Theme::from_name("light");
        assert_eq!(t.header.fg, Some(Color::Blue));
    }

    #[test]
    fn test_from_name_classic() {
        let t = Theme::from_name("classic");
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        // Unknown names must not panic and must return a valid theme.
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    // ── progress_style thresholds ────────────────────────────────────────────

    #[test]
    fn test_progress_style_below_50() {
        let t = Theme::dark();
        assert_eq!(t.progress_style(0.0).fg, Some(Color::Red));
        assert_eq!(t.progress_style(49.9).fg, Some(Color::Red));
    }

    #[test]
    fn test_progress_style_50_to_80() {
        let t = Theme::dark();
        assert_eq!(t.progress_style(50.0).fg, Some(Color::Yellow));
        assert_eq!(t.progress_style(79.9).fg, Some(Color::Yellow));
    }

    #[test]
    fn test_progress_style_at_80_and_above() {
        let t = Theme::dark();
        assert_eq!(t.progress_style(80.0).fg, Some(Color::Green));
        assert_eq!(t.progress_style(100.0).fg, Some(Color::Green));
    }

    // ── severity_style ───────────────────────────────────────────────────────

    #[test]
    fn test_severity_style_levels() {
        let t = Theme::dark();
        assert_eq!(t.severity_style(Severity::Low).fg, Some(Color::Green));
        assert_eq!(t.severity_style(Severity::Medium).fg, Some(Color::Yellow));
        assert_eq!(t.severity_style(Severity::High).fg, Some(Color::Red));
    }

    // ── signal_style ─────────────────────────────────────────────────────────

    #[test]
    fn test_signal_style_session_tags() {
        let t = Theme::dark();
        assert_eq!(t.signal_style(tags::SESSION_START).fg, Some(Color::Cyan));
        assert_eq!(t.signal_style(tags::SESSION_END).fg, Some(Color::Cyan));
    }

    #[test]
    fn test_signal_style_integrity_tags() {
        let t = Theme::dark();
        assert_eq!(
            t.signal_style(tags::INTEGRITY_COMPROMISED).fg,
            Some(Color::Red)
        );
        assert_eq!(
            t.signal_style(tags::UNVERIFIED_CHANGES).fg,
            Some(Color::Red)
        );
    }

    #[test]
    fn test_signal_style_unknown_tag() {
        let t = Theme::dark();
        assert_eq!(t.signal_style("SOMETHING_ELSE").fg, Some(Color::DarkGray));
        assert_eq!(t.signal_style("").fg, Some(Color::DarkGray));
    }
}
