//! Shared formatting utilities for the V2Scope views.

use chrono::{Local, TimeZone};

/// Format a byte count with a binary-scale suffix (B/KB/MB/GB/TB).
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} TB", value)
}

/// Format a memory size in megabytes.
pub fn format_memory(bytes: f64) -> String {
    format!("{:.2} MB", bytes / 1024.0 / 1024.0)
}

/// Format a numeric value for display with appropriate scale suffix.
///
/// - Values >= 1M display as "X.XM"
/// - Values >= 1K display as "X.XK"
/// - Integer values display without decimal places
/// - Other values display with 2 decimal places
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format an integer count with thousands separators.
pub fn format_count(value: f64) -> String {
    let negative = value < 0.0;
    let digits = format!("{:.0}", value.abs());

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a 0..1 fraction as a percentage.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Format a duration in seconds as fractional hours.
pub fn format_uptime_hours(seconds: f64) -> String {
    format!("{:.1} h", seconds / 3600.0)
}

/// Format a Unix timestamp (seconds) as a local time of day, or `None`
/// for non-positive timestamps (e.g. "no GC has run yet").
pub fn format_clock_time(epoch_seconds: f64) -> Option<String> {
    if epoch_seconds <= 0.0 {
        return None;
    }
    Local
        .timestamp_opt(epoch_seconds as i64, 0)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
}

/// Format a time offset for chart axis labels.
///
/// Returns strings like "now", "-30s", "-5m", "-1h".
pub fn format_time_offset(offset_ms: i64) -> String {
    if offset_ms == 0 {
        "now".to_string()
    } else if offset_ms < 60_000 {
        format!("-{}s", offset_ms / 1000)
    } else if offset_ms < 3_600_000 {
        format!("-{}m", offset_ms / 60_000)
    } else {
        format!("-{}h", offset_ms / 3_600_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512.00 B");
        assert_eq!(format_bytes(2048.0), "2.00 KB");
        assert_eq!(format_bytes(3.5 * 1024.0 * 1024.0), "3.50 MB");
        assert_eq!(format_bytes(1024.0 * 1024.0 * 1024.0), "1.00 GB");
        assert_eq!(format_bytes(2.0_f64.powi(42)), "4.00 TB");
    }

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory(1024.0 * 1024.0), "1.00 MB");
        assert_eq!(format_memory(1536.0 * 1024.0), "1.50 MB");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(3.14159), "3.14");
        assert_eq!(format_value(1500.0), "1.5K");
        assert_eq!(format_value(2500000.0), "2.5M");
        assert_eq!(format_value(-1500.0), "-1.5K");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1000.0), "1,000");
        assert_eq!(format_count(1234567.0), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0123), "1.23%");
        assert_eq!(format_percent(1.0), "100.00%");
    }

    #[test]
    fn test_format_uptime_hours() {
        assert_eq!(format_uptime_hours(3600.0), "1.0 h");
        assert_eq!(format_uptime_hours(5400.0), "1.5 h");
    }

    #[test]
    fn test_format_clock_time_for_never() {
        assert_eq!(format_clock_time(0.0), None);
        assert_eq!(format_clock_time(-1.0), None);
        assert!(format_clock_time(1_700_000_000.0).is_some());
    }

    #[test]
    fn test_format_time_offset() {
        assert_eq!(format_time_offset(0), "now");
        assert_eq!(format_time_offset(30_000), "-30s");
        assert_eq!(format_time_offset(300_000), "-5m");
        assert_eq!(format_time_offset(3_600_000), "-1h");
    }
}
