// LogLens - GPL-3.0-or-later
// This file is part of LogLens.
//
// LogLens is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LogLens is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LogLens.  If not, see <https://www.gnu.org/licenses/>.

//! Per-line extraction: timestamp, severity level, stripped message.

use super::line::{LogLevel, LogLine};
use crate::core::time::{display_time_from_micros, iso_to_micros};
use fancy_regex::Regex;
use std::sync::LazyLock;

// ISO 8601 anywhere in the line: 2025-11-20T14:23:45.123456Z,
// 2025-11-20 14:23:45+02:00, zone marker optional.
static ISO_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d{1,6})?)(Z|[+-]\d{2}:?\d{2})?",
    )
    .unwrap()
});

// Severity token surrounded by whitespace (or line boundaries).
static LOG_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(TRACE|DEBUG|INFO|WARN(?:ING)?|ERROR)(?:\s|$)").unwrap()
});

// Same vocabulary, anchored, for prefix stripping only.
static LEVEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:TRACE|DEBUG|INFO|WARN(?:ING)?|ERROR)(?:\s+|$)").unwrap()
});

/// Parse a single raw line into a [`LogLine`].
///
/// Extraction order: timestamp first (canonicalized with a trailing zone
/// marker when the source omits one), then the severity token, then the
/// microsecond epoch value and UTC display time, then the stripped message
/// with the leading timestamp/level prefix removed. Total: a line without
/// any recognizable parts still yields a record with `Unknown` level and a
/// zero timestamp.
pub fn parse_log_line(raw: &str, line_number: usize) -> LogLine {
    let mut iso_timestamp = String::new();
    let mut timestamp_micros = 0_i64;
    let mut display_time = String::new();
    let mut remainder = raw;

    if let Ok(Some(caps)) = ISO_TIMESTAMP.captures(raw) {
        let whole = caps.get(0).expect("capture 0 always present");
        let body = caps
            .get(1)
            .map(|m| m.as_str().replace(' ', "T"))
            .unwrap_or_default();
        iso_timestamp = match caps.get(2) {
            Some(zone) => format!("{body}{}", zone.as_str()),
            None => format!("{body}Z"),
        };
        match iso_to_micros(&iso_timestamp) {
            Some(micros) => {
                timestamp_micros = micros;
                display_time = display_time_from_micros(micros);
            }
            None => {
                // Pattern matched but the calendar rejected it (e.g. Feb 30).
                iso_timestamp.clear();
            }
        }
        if !iso_timestamp.is_empty() {
            remainder = &raw[whole.end()..];
        }
    }

    let level = LOG_LEVEL
        .captures(raw)
        .ok()
        .flatten()
        .and_then(|caps| caps.get(1))
        .map_or(LogLevel::Unknown, |m| LogLevel::from_token(m.as_str()));

    let mut stripped = remainder.trim_start();
    if let Ok(Some(m)) = LEVEL_PREFIX.find(stripped) {
        stripped = &stripped[m.end()..];
    }

    LogLine {
        line_number,
        raw: raw.to_string(),
        iso_timestamp,
        timestamp_micros,
        display_time,
        level,
        stripped_message: stripped.trim_start().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_timestamp_level_and_message() {
        let line = parse_log_line("2025-11-20T14:23:45.123Z ERROR Connection failed", 1);
        assert_eq!(line.iso_timestamp, "2025-11-20T14:23:45.123Z");
        assert_eq!(line.level, LogLevel::Error);
        assert_eq!(line.stripped_message, "Connection failed");
        assert_eq!(line.display_time, "14:23:45.123000");
        assert!(line.timestamp_micros > 0);
    }

    #[test]
    fn appends_zone_marker_when_missing() {
        let line = parse_log_line("2025-11-20T14:23:45 INFO started", 3);
        assert_eq!(line.iso_timestamp, "2025-11-20T14:23:45Z");
        assert_eq!(line.display_time, "14:23:45");
        assert_eq!(line.line_number, 3);
    }

    #[test]
    fn space_separated_timestamp_is_canonicalized() {
        let line = parse_log_line("2025-11-20 14:23:45.5 WARN disk almost full", 1);
        assert_eq!(line.iso_timestamp, "2025-11-20T14:23:45.5Z");
        assert_eq!(line.level, LogLevel::Warn);
        assert_eq!(line.display_time, "14:23:45.500000");
    }

    #[test]
    fn display_time_is_utc_for_offset_zones() {
        let line = parse_log_line("2025-11-20T15:00:00+01:00 INFO tick", 1);
        assert_eq!(line.display_time, "14:00:00");
    }

    #[test]
    fn line_without_timestamp_still_produces_record() {
        let line = parse_log_line("    at com.example.Foo.bar(Foo.java:42)", 7);
        assert_eq!(line.iso_timestamp, "");
        assert_eq!(line.timestamp_micros, 0);
        assert_eq!(line.display_time, "");
        assert_eq!(line.level, LogLevel::Unknown);
        assert_eq!(line.stripped_message, "at com.example.Foo.bar(Foo.java:42)");
    }

    #[test]
    fn level_token_requires_whitespace_boundary() {
        // "INFOrmation" must not register as INFO
        let line = parse_log_line("reading INFOrmation block", 1);
        assert_eq!(line.level, LogLevel::Unknown);
    }

    #[test]
    fn invalid_calendar_date_is_not_a_timestamp() {
        let line = parse_log_line("2025-02-30T10:00:00Z oops", 1);
        assert_eq!(line.iso_timestamp, "");
        assert_eq!(line.timestamp_micros, 0);
    }

    #[test]
    fn raw_text_is_preserved_unmodified() {
        let raw = "2025-01-01T00:00:00Z INFO hello";
        let line = parse_log_line(raw, 1);
        assert_eq!(line.raw, raw);
    }
}
