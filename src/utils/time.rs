//! Clock-time conversions
//!
//! Event times are carried as `HH:MM` strings. Some sources send absolute
//! minute counts instead, which are normalized here before they reach the
//! waitlist.

/// Parse `H:M` / `HH:MM` (extra `:SS` ignored) into minutes from midnight
///
/// Only times within one day (`00:00` to `23:59`) are accepted.
pub fn parse_clock(value: &str) -> Option<u32> {
    let mut parts = value.trim().split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;

    if hours > 23 || minutes >= 60 {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Format a minute count as zero-padded `HH:MM`
///
/// Non-positive counts mean "no time" and yield `None`.
pub fn minutes_to_clock(minutes: i64) -> Option<String> {
    if minutes <= 0 {
        return None;
    }
    Some(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("09:30"), Some(570));
        assert_eq!(parse_clock("9:5"), Some(545));
        assert_eq!(parse_clock("23:59:00"), Some(1439));
        assert_eq!(parse_clock("00:00"), Some(0));
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("noon"), None);
        assert_eq!(parse_clock("10"), None);
        assert_eq!(parse_clock("10:75"), None);
        assert_eq!(parse_clock("-1:00"), None);
    }

    #[test]
    fn test_parse_clock_rejects_hours_past_midnight() {
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("23:00"), Some(1380));
    }

    #[test]
    fn test_minutes_to_clock() {
        assert_eq!(minutes_to_clock(810).as_deref(), Some("13:30"));
        assert_eq!(minutes_to_clock(5).as_deref(), Some("00:05"));
        assert_eq!(minutes_to_clock(0), None);
        assert_eq!(minutes_to_clock(-30), None);
    }
}
