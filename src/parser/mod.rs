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

//! Log text parsing: raw multi-line text in, structured records out.
//!
//! Parsing is a single linear pass per concern: the line parser produces
//! ordered [`LogLine`] records, the correlator produces paired request
//! records over the same text. A parse either succeeds completely or fails
//! with a fatal [`ParsingError`]; no partial record set is ever returned,
//! so a bad file cannot corrupt a previously loaded session.

pub mod correlate;
pub mod extract;
pub mod grammar;
pub mod line;
pub mod request;

use crate::error::ParsingError;
use line::LogLine;
use request::{HttpRequest, SyncRequest};
use serde::{Deserialize, Serialize};

/// Below this share of timestamped lines (past the probe threshold), the
/// input is probably not the expected log format.
const MIN_TIMESTAMP_DENSITY: f64 = 0.1;
const DENSITY_PROBE_LINES: usize = 100;

/// Everything one parse invocation produces. A fresh parse fully replaces
/// the previous output; nothing is appended incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub lines: Vec<LogLine>,
    pub requests: Vec<HttpRequest>,
    pub sync_requests: Vec<SyncRequest>,
    /// Unique sync connection ids, in first-observed order.
    pub connection_ids: Vec<String>,
}

/// Parse raw log text into ordered line records.
///
/// Line numbers are 1-based and count every input line; blank lines are
/// skipped from the output but still advance the numbering. Output order
/// is input order: callers may rely on line-number sortedness but never
/// on timestamp sortedness.
pub fn parse_lines(text: &str) -> Result<Vec<LogLine>, ParsingError> {
    if text.trim().is_empty() {
        return Err(ParsingError::fatal("Log file is empty"));
    }

    let mut lines = Vec::new();
    let mut with_timestamp = 0_usize;
    for (idx, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let log_line = extract::parse_log_line(raw, idx + 1);
        if !log_line.iso_timestamp.is_empty() {
            with_timestamp += 1;
        }
        lines.push(log_line);
    }

    let processed = lines.len();
    if processed > DENSITY_PROBE_LINES
        && (with_timestamp as f64) < (processed as f64) * MIN_TIMESTAMP_DENSITY
    {
        tracing::warn!(
            processed,
            with_timestamp,
            "timestamp density below threshold, rejecting input"
        );
        return Err(ParsingError::fatal(
            "This file does not look like a recognized log format",
        )
        .with_detail(format!(
            "{with_timestamp} of {processed} lines carry a timestamp"
        )));
    }

    tracing::debug!(processed, with_timestamp, "parsed log lines");
    Ok(lines)
}

/// Full parse: line records, correlated requests, sync requests and the
/// derived connection id list.
pub fn parse_log(text: &str) -> Result<ParseOutput, ParsingError> {
    let lines = parse_lines(text)?;
    let requests = correlate::correlate_requests(text);
    let (sync_requests, connection_ids) = correlate::correlate_sync(text, &requests);
    tracing::info!(
        lines = lines.len(),
        requests = requests.len(),
        sync_requests = sync_requests.len(),
        connections = connection_ids.len(),
        "parse complete"
    );
    Ok(ParseOutput {
        lines,
        requests,
        sync_requests,
        connection_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use line::LogLevel;

    #[test]
    fn empty_input_is_a_fatal_parse_error() {
        assert!(parse_lines("").is_err());
        assert!(parse_lines("   \n\t\n  ").is_err());
    }

    #[test]
    fn blank_lines_keep_numbering_but_produce_no_record() {
        let text = "2025-01-01T00:00:00Z INFO one\n\n2025-01-01T00:00:01Z INFO two\n";
        let lines = parse_lines(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[1].line_number, 3);
    }

    #[test]
    fn line_numbers_are_strictly_increasing() {
        let text = "a\nb\n\nc\nd\n";
        let lines = parse_lines(text).unwrap();
        let numbers: Vec<usize> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 4, 5]);
    }

    #[test]
    fn low_timestamp_density_is_rejected_past_probe() {
        // 101 lines, none with a timestamp: not our format.
        let text = "plain text line\n".repeat(101);
        let err = parse_lines(&text).unwrap_err();
        assert!(err.message.contains("recognized log format"));
        assert!(err.detail.is_some());
    }

    #[test]
    fn short_files_skip_the_density_heuristic() {
        // 100 lines without timestamps stay under the probe threshold.
        let text = "plain text line\n".repeat(100);
        assert_eq!(parse_lines(&text).unwrap().len(), 100);
    }

    #[test]
    fn dense_timestamps_pass_the_heuristic() {
        let mut text = String::new();
        for i in 0..200 {
            if i % 5 == 0 {
                text.push_str("2025-01-01T00:00:00Z INFO tick\n");
            } else {
                text.push_str("continuation line\n");
            }
        }
        // 20% density is above the 10% floor.
        assert_eq!(parse_lines(&text).unwrap().len(), 200);
    }

    #[test]
    fn end_to_end_two_line_scenario() {
        let text = "2025-01-01T00:00:00Z INFO send{request_id=\"A\" method=GET uri=\"/x\" request_size=\"10\"}\n2025-01-01T00:00:01Z INFO send{request_id=\"A\" method=GET uri=\"/x\" request_size=\"10\" status=200 response_size=\"20\" request_duration=0.25s}";
        let output = parse_log(text).unwrap();

        assert_eq!(output.lines.len(), 2);
        assert_eq!(output.lines[0].level, LogLevel::Info);

        assert_eq!(output.requests.len(), 1);
        let req = &output.requests[0];
        assert_eq!(req.request_id, "A");
        assert_eq!(req.status, "200");
        assert_eq!(req.request_duration_ms, 250);
        assert_eq!(req.send_line_number, 1);
        assert_eq!(req.response_line_number, 2);

        assert!(output.sync_requests.is_empty());
        assert!(output.connection_ids.is_empty());
    }

    #[test]
    fn parse_output_exposes_sync_side() {
        let text = "\
2025-01-01T00:00:00Z DEBUG send{request_id=\"S1\" method=GET uri=\"/sync\" request_size=\"2\" conn_id=\"c-9\" timeout=30000}\n\
2025-01-01T00:00:02Z DEBUG request_id=\"S1\" status=200 response_size=\"4\" request_duration=1.5s\n";
        let output = parse_log(text).unwrap();
        assert_eq!(output.sync_requests.len(), 1);
        assert_eq!(output.connection_ids, vec!["c-9".to_string()]);
        let sync = &output.sync_requests[0];
        assert!(sync.is_long_poll());
        assert_eq!(sync.request.request_duration_ms, 1500);
    }
}
