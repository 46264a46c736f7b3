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

//! Time codec: lossless conversion between raw timestamp text, canonical
//! integer microseconds since the Unix epoch, and URL-safe string forms.
//!
//! Everything here is a pure function. Malformed input never panics or
//! errors out of these functions; it yields `None` (or passes through
//! unchanged for the URL forms), and the caller decides whether that is a
//! validation failure worth surfacing.
//!
//! All display formatting is UTC, never local time, so the same log file
//! renders identically on every machine.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Relative time-range shortcuts accepted from the user and preserved
/// verbatim in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shortcut {
    Start,
    End,
    LastMin,
    Last5Min,
    Last10Min,
    LastHour,
    LastDay,
}

impl Shortcut {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "last-min" => Some(Self::LastMin),
            "last-5-min" => Some(Self::Last5Min),
            "last-10-min" => Some(Self::Last10Min),
            "last-hour" => Some(Self::LastHour),
            "last-day" => Some(Self::LastDay),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::LastMin => "last-min",
            Self::Last5Min => "last-5-min",
            Self::Last10Min => "last-10-min",
            Self::LastHour => "last-hour",
            Self::LastDay => "last-day",
        }
    }

    /// Lookback window for the `last-*` members; `start`/`end` have none.
    pub fn offset_micros(self) -> Option<i64> {
        match self {
            Self::Start | Self::End => None,
            Self::LastMin => Some(MICROS_PER_MINUTE),
            Self::Last5Min => Some(5 * MICROS_PER_MINUTE),
            Self::Last10Min => Some(10 * MICROS_PER_MINUTE),
            Self::LastHour => Some(MICROS_PER_HOUR),
            Self::LastDay => Some(MICROS_PER_DAY),
        }
    }
}

/// A bare `HH:MM:SS[.ffffff]` time of day, kept at microsecond precision
/// so that log entries within the same second remain orderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub micros: u32,
}

impl TimeOfDay {
    /// Microseconds since midnight, computed arithmetically.
    pub fn to_micros(self) -> i64 {
        i64::from(self.hour) * MICROS_PER_HOUR
            + i64::from(self.minute) * MICROS_PER_MINUTE
            + i64::from(self.second) * MICROS_PER_SECOND
            + i64::from(self.micros)
    }
}

/// A validated time filter value: a shortcut, a bare time of day, or a
/// full ISO-8601 datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFilter {
    Shortcut(Shortcut),
    TimeOfDay(TimeOfDay),
    Absolute(DateTime<Utc>),
}

impl TimeFilter {
    /// Canonical microsecond value for absolute filters; shortcuts have
    /// none (they resolve against the observed range).
    pub fn to_micros(&self) -> Option<i64> {
        match self {
            Self::Shortcut(_) => None,
            Self::TimeOfDay(tod) => Some(tod.to_micros()),
            Self::Absolute(dt) => Some(dt.timestamp_micros()),
        }
    }
}

/// A resolved `[start, end]` window in microseconds. An inverted window
/// (`start > end`) is a legal value meaning "matches nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_micros: i64,
    pub end_micros: i64,
}

impl TimeRange {
    pub fn contains(&self, micros: i64) -> bool {
        micros >= self.start_micros && micros <= self.end_micros
    }
}

fn two_digits(s: &str) -> Option<(u32, &str)> {
    let (head, rest) = s.split_at_checked(2)?;
    if head.bytes().all(|b| b.is_ascii_digit()) {
        Some((head.parse().ok()?, rest))
    } else {
        None
    }
}

fn expect_char(s: &str, c: char) -> Option<&str> {
    s.strip_prefix(c)
}

/// Parse a bare `HH:MM:SS[.ffffff]` string. Hours 0-23, minutes and
/// seconds 0-59, at most six fraction digits.
pub fn parse_time_of_day(text: &str) -> Option<TimeOfDay> {
    let (hour, rest) = two_digits(text)?;
    let rest = expect_char(rest, ':')?;
    let (minute, rest) = two_digits(rest)?;
    let rest = expect_char(rest, ':')?;
    let (second, rest) = two_digits(rest)?;

    let micros = if rest.is_empty() {
        0
    } else {
        let frac = expect_char(rest, '.')?;
        if frac.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Pad to microsecond precision: ".5" means 500_000 µs.
        let padded = format!("{frac:0<6}");
        padded.parse().ok()?
    };

    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some(TimeOfDay {
        hour,
        minute,
        second,
        micros,
    })
}

/// Parse a full ISO-8601 datetime. Zone-qualified input converts to UTC;
/// zone-less input is taken as already UTC.
fn parse_iso_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Validate user-entered time text into a [`TimeFilter`].
///
/// Accepts the relative shortcuts, a bare `HH:MM:SS[.ffffff]`, or a full
/// ISO-8601 datetime. Anything else is `None`; callers surface that as a
/// validation failure rather than silently coercing.
pub fn parse_time_input(text: &str) -> Option<TimeFilter> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(shortcut) = Shortcut::parse(text) {
        return Some(TimeFilter::Shortcut(shortcut));
    }
    if let Some(tod) = parse_time_of_day(text) {
        return Some(TimeFilter::TimeOfDay(tod));
    }
    parse_iso_datetime(text).map(TimeFilter::Absolute)
}

/// Microseconds for a canonical ISO timestamp string, `None` if malformed.
pub fn iso_to_micros(iso: &str) -> Option<i64> {
    parse_iso_datetime(iso).map(|dt| dt.timestamp_micros())
}

/// Microseconds for either a bare time of day or a full ISO datetime.
pub fn text_to_micros(text: &str) -> Option<i64> {
    if let Some(tod) = parse_time_of_day(text) {
        return Some(tod.to_micros());
    }
    iso_to_micros(text)
}

/// `HH:MM:SS[.ffffff]` in UTC for a microsecond epoch value. Empty string
/// if the value does not map to a representable datetime.
pub fn display_time_from_micros(micros: i64) -> String {
    let Some(dt) = DateTime::<Utc>::from_timestamp_micros(micros) else {
        return String::new();
    };
    if micros.rem_euclid(MICROS_PER_SECOND) == 0 {
        dt.format("%H:%M:%S").to_string()
    } else {
        dt.format("%H:%M:%S%.6f").to_string()
    }
}

/// `HH:MM:SS[.ffffff]` in UTC for an ISO timestamp or bare time-of-day
/// string. Used verbatim in every UI surface.
pub fn display_time(text: &str) -> String {
    text_to_micros(text).map_or_else(String::new, display_time_from_micros)
}

/// Resolve start/end filters against the observed timestamp range.
///
/// Absent or `start` start filters resolve to absolute zero, not the first
/// observed timestamp. Absent or `end` end filters resolve to
/// `max_observed`. A
/// relative shortcut resolves as `max(0, resolved_end - offset)`. The
/// result is not ordered: callers treat an inverted range as an
/// empty-result filter, not an error.
pub fn resolve_range(
    start: Option<&TimeFilter>,
    end: Option<&TimeFilter>,
    _min_observed: i64,
    max_observed: i64,
) -> TimeRange {
    let end_micros = match end {
        None | Some(TimeFilter::Shortcut(Shortcut::End)) => max_observed,
        Some(TimeFilter::Shortcut(Shortcut::Start)) => 0,
        Some(TimeFilter::Shortcut(s)) => {
            (max_observed - s.offset_micros().unwrap_or(0)).max(0)
        }
        Some(filter) => filter.to_micros().unwrap_or(max_observed),
    };
    let start_micros = match start {
        None | Some(TimeFilter::Shortcut(Shortcut::Start)) => 0,
        Some(TimeFilter::Shortcut(Shortcut::End)) => end_micros,
        Some(TimeFilter::Shortcut(s)) => {
            (end_micros - s.offset_micros().unwrap_or(0)).max(0)
        }
        Some(filter) => filter.to_micros().unwrap_or(0),
    };
    TimeRange {
        start_micros,
        end_micros,
    }
}

const EPOCH_DATE_PREFIX: &str = "1970-01-01T";

/// URL-safe form of a time filter string. Shortcuts pass through, bare
/// time-of-day values are encoded as ISO on the epoch placeholder date,
/// everything else passes through unchanged.
pub fn to_url_form(text: &str) -> String {
    if Shortcut::parse(text).is_some() {
        return text.to_string();
    }
    if parse_time_of_day(text).is_some() {
        return format!("{EPOCH_DATE_PREFIX}{text}Z");
    }
    text.to_string()
}

/// Inverse of [`to_url_form`]: epoch-dated ISO decodes back to a bare
/// time of day, real-dated ISO and shortcuts are left untouched.
pub fn from_url_form(text: &str) -> String {
    if let Some(rest) = text.strip_prefix(EPOCH_DATE_PREFIX) {
        if let Some(tod) = rest.strip_suffix('Z') {
            if parse_time_of_day(tod).is_some() {
                return tod.to_string();
            }
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_parse_and_survive() {
        for s in [
            "start",
            "end",
            "last-min",
            "last-5-min",
            "last-10-min",
            "last-hour",
            "last-day",
        ] {
            let parsed = parse_time_input(s);
            assert_eq!(
                parsed,
                Some(TimeFilter::Shortcut(Shortcut::parse(s).unwrap())),
                "shortcut {s} should validate"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(parse_time_input("12:60:00"), None);
        assert_eq!(parse_time_input("24:00:00"), None);
        assert_eq!(parse_time_input("12:00:60"), None);
        assert_eq!(parse_time_input(""), None);
        assert_eq!(parse_time_input("yesterday"), None);
        assert_eq!(parse_time_input("12:00"), None);
        assert_eq!(parse_time_input("12:00:00.1234567"), None);
    }

    #[test]
    fn time_of_day_keeps_microsecond_precision() {
        let tod = parse_time_of_day("01:02:03.000004").unwrap();
        assert_eq!(
            tod.to_micros(),
            MICROS_PER_HOUR + 2 * MICROS_PER_MINUTE + 3 * MICROS_PER_SECOND + 4
        );
        // A short fraction is a leading fraction, not a trailing one.
        let half = parse_time_of_day("00:00:00.5").unwrap();
        assert_eq!(half.to_micros(), 500_000);
    }

    #[test]
    fn full_iso_parses_to_utc() {
        let filter = parse_time_input("2025-01-01T00:00:01Z").unwrap();
        assert_eq!(filter.to_micros(), Some(1_735_689_601_000_000));
        // Offset input converts to the same instant.
        let offset = parse_time_input("2025-01-01T01:00:01+01:00").unwrap();
        assert_eq!(offset.to_micros(), filter.to_micros());
    }

    #[test]
    fn display_time_is_utc_and_keeps_fraction() {
        assert_eq!(display_time("2025-01-01T12:34:56Z"), "12:34:56");
        assert_eq!(display_time("2025-01-01T12:34:56.250000Z"), "12:34:56.250000");
        assert_eq!(display_time("2025-01-01T13:34:56+01:00"), "12:34:56");
        assert_eq!(display_time("not a time"), "");
    }

    #[test]
    fn absent_filters_resolve_to_full_range() {
        let range = resolve_range(None, None, 5_000_000, 90_000_000);
        assert_eq!(range.start_micros, 0); // start-of-log is absolute zero
        assert_eq!(range.end_micros, 90_000_000);
    }

    #[test]
    fn relative_start_resolves_against_end() {
        let start = TimeFilter::Shortcut(Shortcut::LastMin);
        let range = resolve_range(Some(&start), None, 0, 2 * MICROS_PER_MINUTE);
        assert_eq!(range.start_micros, MICROS_PER_MINUTE);
        assert_eq!(range.end_micros, 2 * MICROS_PER_MINUTE);
    }

    #[test]
    fn relative_start_clamps_underflow_to_zero() {
        let start = TimeFilter::Shortcut(Shortcut::LastHour);
        let range = resolve_range(Some(&start), None, 0, 30 * MICROS_PER_SECOND);
        assert_eq!(range.start_micros, 0);
    }

    #[test]
    fn inverted_range_is_not_corrected() {
        let start = parse_time_input("2025-01-01T00:10:00Z").unwrap();
        let end = parse_time_input("2025-01-01T00:00:00Z").unwrap();
        let range = resolve_range(Some(&start), Some(&end), 0, i64::MAX);
        assert!(range.start_micros > range.end_micros);
        assert!(!range.contains(range.start_micros - 1));
    }

    #[test]
    fn url_round_trip_law() {
        let cases = [
            "start",
            "end",
            "last-min",
            "last-5-min",
            "last-10-min",
            "last-hour",
            "last-day",
            "00:00:00",
            "12:34:56",
            "23:59:59.999999",
            "08:15:00.5",
            "2025-06-01T10:20:30Z",
            "2025-06-01T10:20:30.123456Z",
        ];
        for case in cases {
            assert_eq!(from_url_form(&to_url_form(case)), case, "case {case}");
        }
    }

    #[test]
    fn url_form_encodes_bare_time_on_epoch_date() {
        assert_eq!(to_url_form("12:34:56"), "1970-01-01T12:34:56Z");
        assert_eq!(from_url_form("1970-01-01T12:34:56Z"), "12:34:56");
        // Real-dated ISO is untouched in both directions.
        assert_eq!(to_url_form("2025-06-01T10:20:30Z"), "2025-06-01T10:20:30Z");
        assert_eq!(
            from_url_form("2025-06-01T10:20:30Z"),
            "2025-06-01T10:20:30Z"
        );
    }
}
