//! Human-readable timecode parsing and formatting.
//!
//! Transcription oracles emit timestamps as `SS[.mmm]`, `MM:SS[.mmm]` or
//! `H:MM:SS[.mmm]`. Parsing is deliberately lenient: anything unparseable
//! maps to 0.0 so transcript parsing degrades instead of aborting.

/// Parse a timecode into a seconds offset. Never fails; garbage yields 0.0.
pub fn parse_timestamp(text: &str) -> f64 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return 0.0;
    }

    // Last component may carry a fractional-second suffix; the rest are
    // whole minute/hour counts.
    let seconds = match parts[parts.len() - 1].parse::<f64>() {
        Ok(s) if s >= 0.0 => s,
        _ => return 0.0,
    };

    let mut total = seconds;
    let mut scale = 60.0;
    for part in parts[..parts.len() - 1].iter().rev() {
        match part.parse::<u64>() {
            Ok(n) => total += n as f64 * scale,
            Err(_) => return 0.0,
        }
        scale *= 60.0;
    }

    total
}

/// Format a seconds offset as `MM:SS.mmm`, or `H:MM:SS.mmm` once the
/// offset reaches an hour.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_ms = (seconds * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
    } else {
        format!("{:02}:{:02}.{:03}", mins, secs, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(parse_timestamp("01:05.500"), 65.5);
        assert_eq!(parse_timestamp("00:07"), 7.0);
    }

    #[test]
    fn parses_hours() {
        assert_eq!(parse_timestamp("1:02:03.250"), 3723.25);
    }

    #[test]
    fn parses_bare_seconds() {
        assert_eq!(parse_timestamp("42"), 42.0);
        assert_eq!(parse_timestamp("3.5"), 3.5);
    }

    #[test]
    fn garbage_yields_zero() {
        assert_eq!(parse_timestamp("garbage"), 0.0);
        assert_eq!(parse_timestamp(""), 0.0);
        assert_eq!(parse_timestamp("1:2:3:4"), 0.0);
        assert_eq!(parse_timestamp("xx:05"), 0.0);
        assert_eq!(parse_timestamp("-4"), 0.0);
    }

    #[test]
    fn formats_round_trip_shapes() {
        assert_eq!(format_timestamp(65.5), "01:05.500");
        assert_eq!(format_timestamp(3723.25), "1:02:03.250");
        assert_eq!(format_timestamp(0.0), "00:00.000");
    }
}
