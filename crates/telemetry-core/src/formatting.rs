/// Format a duration in seconds as a compact human-readable string.
///
/// Non-finite or non-positive inputs render as `"0s"`. Seconds are shown
/// only when the duration is under a minute.
///
/// # Examples
///
/// ```
/// use telemetry_core::formatting::format_duration;
///
/// assert_eq!(format_duration(0.0),     "0s");
/// assert_eq!(format_duration(42.9),    "42s");
/// assert_eq!(format_duration(300.0),   "5m");
/// assert_eq!(format_duration(3900.0),  "1h 5m");
/// assert_eq!(format_duration(7200.0),  "2h 0m");
/// ```
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0s".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", total)
    }
}

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use telemetry_core::formatting::format_count;
///
/// assert_eq!(format_count(0),         "0");
/// assert_eq!(format_count(1_234),     "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Shorten an identifier for table display: the first eight characters plus
/// an ellipsis. Identifiers of eight characters or fewer pass through.
///
/// # Examples
///
/// ```
/// use telemetry_core::formatting::short_id;
///
/// assert_eq!(short_id("0f8b2c41-93aa-4e02"), "0f8b2c41...");
/// assert_eq!(short_id("sess-1"), "sess-1");
/// ```
pub fn short_id(id: &str) -> String {
    if id.chars().count() <= 8 {
        id.to_string()
    } else {
        let prefix: String = id.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_duration ──────────────────────────────────────────────────────

    #[test]
    fn test_format_duration_zero_and_negative() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(-10.0), "0s");
    }

    #[test]
    fn test_format_duration_non_finite() {
        assert_eq!(format_duration(f64::NAN), "0s");
        assert_eq!(format_duration(f64::INFINITY), "0s");
    }

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(1.0), "1s");
        assert_eq!(format_duration(59.9), "59s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(60.0), "1m");
        assert_eq!(format_duration(300.0), "5m");
        assert_eq!(format_duration(3599.0), "59m");
    }

    #[test]
    fn test_format_duration_hours_always_show_minutes() {
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(3900.0), "1h 5m");
        assert_eq!(format_duration(9000.0), "2h 30m");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_format_count_grouped() {
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    // ── short_id ─────────────────────────────────────────────────────────────

    #[test]
    fn test_short_id_truncates() {
        assert_eq!(short_id("0f8b2c41-93aa-4e02-b1c7"), "0f8b2c41...");
    }

    #[test]
    fn test_short_id_passes_through_short_values() {
        assert_eq!(short_id("sess-1"), "sess-1");
        assert_eq!(short_id(""), "");
        assert_eq!(short_id("12345678"), "12345678");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-2, "percentage = {p}");
    }
}
