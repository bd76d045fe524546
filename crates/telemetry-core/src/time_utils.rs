use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Signal timestamp parsing ──────────────────────────────────────────────────

/// Parse a raw signal `ts` string into a UTC [`DateTime`].
///
/// Accepts RFC 3339 with a `Z` suffix or a fixed offset, plus naive
/// datetime forms (interpreted as UTC, since the exporting agent always
/// records UTC). Returns `None` for empty or unrecognised strings; callers
/// treat such signals as having no position on the time axis.
pub fn parse_signal_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.with_timezone(&Utc));
    }

    const FMTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FMTS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    debug!("unparseable signal timestamp \"{}\"", s);
    None
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Converts UTC timestamps into the instructor's display timezone.
pub struct TimezoneHandler {
    display_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { display_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Convert a UTC [`DateTime`] into the display timezone.
    pub fn to_display(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.display_tz)
    }

    /// Expose the configured display timezone.
    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }
}

// ── 12-hour / 24-hour format detection ────────────────────────────────────────

/// IANA timezone prefixes whose users conventionally use 12-hour clocks.
const TWELVE_HOUR_PREFIXES: &[&str] = &[
    "america/",
    "australia/",
    "pacific/auckland",
    "asia/manila",
    "asia/kolkata",
    "asia/calcutta",
    "asia/karachi",
    "asia/dhaka",
    "asia/riyadh",
    "asia/dubai",
];

/// Decide whether to use 12-hour clock display.
///
/// Priority: explicit `"12h"` / `"24h"` override, then the configured
/// timezone, then the system timezone. Unknown regions default to 24-hour.
pub fn detect_time_format(timezone: Option<&str>, explicit: Option<&str>) -> bool {
    if let Some(fmt) = explicit {
        match fmt.to_lowercase().as_str() {
            "12h" => return true,
            "24h" => return false,
            _ => {} // fall through
        }
    }

    let tz = timezone
        .map(|s| s.to_string())
        .unwrap_or_else(get_system_timezone);
    let lower = tz.to_lowercase();
    TWELVE_HOUR_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

// ── Display formatting ────────────────────────────────────────────────────────

/// Format a timestamp for the timeline table.
///
/// * `use_12h = true`  → e.g. `"Mar 10 02:30:05 PM"`.
/// * `use_12h = false` → e.g. `"Mar 10 14:30:05"`.
pub fn format_timeline_time(dt: &DateTime<Tz>, use_12h: bool) -> String {
    if use_12h {
        dt.format("%b %d %I:%M:%S %p").to_string()
    } else {
        dt.format("%b %d %H:%M:%S").to_string()
    }
}

/// Format a session boundary timestamp for the report dashboard,
/// e.g. `"2024-03-10 14:30 UTC"`.
pub fn format_boundary_time(dt: &DateTime<Tz>) -> String {
    dt.format("%Y-%m-%d %H:%M %Z").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Timelike as _};

    // ── parse_signal_timestamp ───────────────────────────────────────────────

    #[test]
    fn test_parse_z_suffix() {
        let dt = parse_signal_timestamp("2024-03-10T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_fixed_offset() {
        let dt = parse_signal_timestamp("2024-03-10T12:00:00+02:00").unwrap();
        // 12:00 +02:00 = 10:00 UTC
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let dt = parse_signal_timestamp("2024-03-10T12:00:00").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let dt = parse_signal_timestamp("2024-03-10T12:00:00.250Z").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_empty_returns_none() {
        assert!(parse_signal_timestamp("").is_none());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_signal_timestamp("not-a-date").is_none());
    }

    // ── TimezoneHandler ──────────────────────────────────────────────────────

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("America/New_York"));
        assert!(TimezoneHandler::validate_timezone("UTC"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
        assert!(!TimezoneHandler::validate_timezone(""));
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Invalid/Timezone");
        assert_eq!(handler.display_tz(), Tz::UTC);
    }

    #[test]
    fn test_to_display_converts() {
        let handler = TimezoneHandler::new("America/New_York");
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        // New York is UTC-4 in summer (EDT)
        assert_eq!(handler.to_display(utc).hour(), 8);
    }

    // ── detect_time_format ───────────────────────────────────────────────────

    #[test]
    fn test_detect_explicit_overrides() {
        assert!(detect_time_format(Some("Europe/Berlin"), Some("12h")));
        assert!(!detect_time_format(Some("America/New_York"), Some("24h")));
    }

    #[test]
    fn test_detect_us_timezone_is_12h() {
        assert!(detect_time_format(Some("America/New_York"), None));
        assert!(detect_time_format(Some("America/Chicago"), None));
    }

    #[test]
    fn test_detect_europe_is_24h() {
        assert!(!detect_time_format(Some("Europe/Berlin"), None));
        assert!(!detect_time_format(Some("Asia/Tokyo"), None));
    }

    // ── Display formatting ───────────────────────────────────────────────────

    #[test]
    fn test_format_timeline_time_24h() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.to_display(Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 5).unwrap());
        assert_eq!(format_timeline_time(&dt, false), "Mar 10 14:30:05");
    }

    #[test]
    fn test_format_timeline_time_12h() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.to_display(Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 5).unwrap());
        let formatted = format_timeline_time(&dt, true);
        assert!(formatted.contains("PM"), "12h format: {}", formatted);
    }

    #[test]
    fn test_format_boundary_time() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.to_display(Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 5).unwrap());
        assert_eq!(format_boundary_time(&dt), "2024-03-10 14:30 UTC");
    }
}
