use serde::{Deserialize, Serialize};

/// Severity vocabulary recognized in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Unknown,
}

impl LogLevel {
    pub fn from_token(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "TRACE" => Self::Trace,
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARN" | "WARNING" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Numeric rank for minimum-level filtering. Unknown ranks lowest so
    /// unrecognized lines are only dropped by an explicit level filter.
    pub fn severity(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Trace => 1,
            Self::Debug => 2,
            Self::Info => 3,
            Self::Warn => 4,
            Self::Error => 5,
        }
    }
}

/// One parsed log line. Immutable once constructed; only the parser
/// builds these, every other component borrows them read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// 1-based position in the original file. Blank lines count toward
    /// numbering even though they produce no record.
    pub line_number: usize,
    /// Original line content, unmodified.
    pub raw: String,
    /// Canonical ISO-8601 timestamp extracted from the line, empty if none.
    pub iso_timestamp: String,
    /// Microseconds since the Unix epoch, 0 if no timestamp was found.
    pub timestamp_micros: i64,
    /// `HH:MM:SS[.ffffff]` in UTC, precomputed once at parse time.
    pub display_time: String,
    pub level: LogLevel,
    /// Line content with the leading timestamp/level prefix removed.
    pub stripped_message: String,
}
