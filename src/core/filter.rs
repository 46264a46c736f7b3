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

//! Filter engine: pure, side-effect-free predicate application.
//!
//! Every consuming view filters through these functions so that no two
//! surfaces can ever disagree on what is "in range". The base request
//! filter and the sync filter differ only in which criteria apply; both
//! share the identical time-range resolution and the identical
//! incomplete-always-passes rule via [`TimeContext`].

use crate::core::time::{resolve_range, TimeFilter, TimeRange};
use crate::error::ValidationError;
use crate::parser::line::{LogLevel, LogLine};
use crate::parser::request::{HttpRequest, SyncRequest};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Sentinel status key that an empty (no response yet) status maps to
/// before the status-set membership test.
pub const INCOMPLETE_STATUS_KEY: &str = "Incomplete";

/// Criteria for the base HTTP request view. All active criteria combine
/// with logical AND; `None`/empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCriteria {
    pub hide_incomplete: bool,
    /// `None` passes every status; membership is tested after mapping an
    /// empty status to [`INCOMPLETE_STATUS_KEY`].
    pub status_codes: Option<HashSet<String>>,
    /// Case-insensitive substring match against the uri.
    pub uri_filter: Option<String>,
    pub start: Option<TimeFilter>,
    pub end: Option<TimeFilter>,
}

/// Criteria for the sync request view: the shared criteria plus exact
/// connection id and exact timeout matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCriteria {
    pub hide_incomplete: bool,
    pub status_codes: Option<HashSet<String>>,
    /// Exact match; `None` or empty means no constraint.
    pub conn_id: Option<String>,
    /// Exact match against the request's timeout; `None` means no
    /// constraint.
    pub timeout_ms: Option<u64>,
    pub start: Option<TimeFilter>,
    pub end: Option<TimeFilter>,
}

/// Time-range state resolved once per filter invocation and shared by
/// every predicate in that invocation.
struct TimeContext {
    range: TimeRange,
    micros_by_line: HashMap<usize, i64>,
}

impl TimeContext {
    fn resolve(lines: &[LogLine], start: Option<&TimeFilter>, end: Option<&TimeFilter>) -> Self {
        let max_observed = lines.iter().map(|l| l.timestamp_micros).max().unwrap_or(0);
        let min_observed = lines
            .iter()
            .filter(|l| l.timestamp_micros > 0)
            .map(|l| l.timestamp_micros)
            .min()
            .unwrap_or(0);
        let range = resolve_range(start, end, min_observed, max_observed);
        let micros_by_line = lines
            .iter()
            .filter(|l| l.timestamp_micros > 0)
            .map(|l| (l.line_number, l.timestamp_micros))
            .collect();
        Self {
            range,
            micros_by_line,
        }
    }

    /// A request's temporal anchor is its response line. A request whose
    /// response was never observed belongs to every time window, since
    /// pending work must not be hidden by narrowing the clock. A response line
    /// that doesn't resolve to a known timestamped line also passes (fail
    /// open, not fail closed).
    fn passes(&self, request: &HttpRequest) -> bool {
        if request.response_line_number == 0 {
            return true;
        }
        match self.micros_by_line.get(&request.response_line_number) {
            None => true,
            Some(&micros) => self.range.contains(micros),
        }
    }

    fn passes_line(&self, line: &LogLine) -> bool {
        if line.timestamp_micros == 0 {
            return true;
        }
        self.range.contains(line.timestamp_micros)
    }
}

fn passes_status(
    status: &str,
    hide_incomplete: bool,
    status_codes: Option<&HashSet<String>>,
) -> bool {
    if hide_incomplete && status.is_empty() {
        return false;
    }
    match status_codes {
        None => true,
        Some(set) => {
            let key = if status.is_empty() {
                INCOMPLETE_STATUS_KEY
            } else {
                status
            };
            set.contains(key)
        }
    }
}

/// Filter the base HTTP request view. Returns a new vector; inputs are
/// never mutated, so repeated application with the same criteria is
/// idempotent.
pub fn filter_requests(
    requests: &[HttpRequest],
    lines: &[LogLine],
    criteria: &RequestCriteria,
) -> Vec<HttpRequest> {
    let time = TimeContext::resolve(lines, criteria.start.as_ref(), criteria.end.as_ref());
    let uri_needle = criteria
        .uri_filter
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);

    requests
        .iter()
        .filter(|req| {
            passes_status(
                &req.status,
                criteria.hide_incomplete,
                criteria.status_codes.as_ref(),
            )
        })
        .filter(|req| {
            uri_needle
                .as_deref()
                .is_none_or(|needle| req.uri.to_lowercase().contains(needle))
        })
        .filter(|req| time.passes(req))
        .cloned()
        .collect()
}

/// Filter the sync request view. Shares the status and time predicates
/// with [`filter_requests`] and adds exact connection/timeout matching.
pub fn filter_sync_requests(
    requests: &[SyncRequest],
    lines: &[LogLine],
    criteria: &SyncCriteria,
) -> Vec<SyncRequest> {
    let time = TimeContext::resolve(lines, criteria.start.as_ref(), criteria.end.as_ref());
    let conn_filter = criteria.conn_id.as_deref().filter(|c| !c.is_empty());

    requests
        .iter()
        .filter(|sync| conn_filter.is_none_or(|conn| sync.conn_id == conn))
        .filter(|sync| {
            criteria
                .timeout_ms
                .is_none_or(|t| sync.timeout_ms == Some(t))
        })
        .filter(|sync| {
            passes_status(
                &sync.request.status,
                criteria.hide_incomplete,
                criteria.status_codes.as_ref(),
            )
        })
        .filter(|sync| time.passes(&sync.request))
        .cloned()
        .collect()
}

/// Criteria for the free-text log line view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCriteria {
    /// Regex pattern; empty means no text constraint.
    pub search_text: String,
    pub case_insensitive: bool,
    /// Minimum severity; `None` passes every level.
    pub min_level: Option<LogLevel>,
    pub start: Option<TimeFilter>,
    pub end: Option<TimeFilter>,
}

/// Filter log lines, returning indices into `lines` (the input feeding
/// the gap manager). An unparsable search pattern is a non-fatal
/// [`ValidationError`]; the caller keeps its prior filter state.
pub fn filter_lines(lines: &[LogLine], criteria: &LineCriteria) -> Result<Vec<usize>, ValidationError> {
    let search_regex = if criteria.search_text.is_empty() {
        None
    } else {
        // Inline (?i) flag for case-insensitive matching.
        let pattern = if criteria.case_insensitive {
            format!("(?i){}", criteria.search_text)
        } else {
            criteria.search_text.clone()
        };
        match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                return Err(ValidationError::warning("Invalid search pattern")
                    .with_detail(e.to_string()))
            }
        }
    };

    let time = TimeContext::resolve(lines, criteria.start.as_ref(), criteria.end.as_ref());

    Ok(lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            criteria
                .min_level
                .is_none_or(|min| line.level.severity() >= min.severity())
        })
        .filter(|(_, line)| time.passes_line(line))
        .filter(|(_, line)| {
            search_regex.as_ref().is_none_or(|regex| {
                regex.is_match(&line.stripped_message).unwrap_or(false)
                    || regex.is_match(&line.raw).unwrap_or(false)
            })
        })
        .map(|(idx, _)| idx)
        .collect())
}
