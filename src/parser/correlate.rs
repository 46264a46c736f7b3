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

//! Request correlation: pair send and response trace fragments by request
//! id across arbitrary line distance.
//!
//! State is an explicit builder keyed by request id for the whole pass;
//! [`RequestCorrelator::finalize`] turns accumulated partial records into
//! the final request list. Two states exist per id: pending (send seen,
//! no response) and complete.

use super::grammar::{Fragment, FragmentShape};
use super::request::{HttpRequest, SyncRequest, SYNC_PATH_MARKER};
use indexmap::{IndexMap, IndexSet};

/// Accumulated fields for one request id. Every field keeps its
/// first-seen value; later fragments never overwrite.
#[derive(Debug, Clone, Default)]
struct PendingRequest {
    method: Option<String>,
    uri: Option<String>,
    status: Option<String>,
    request_size: Option<String>,
    response_size: Option<String>,
    duration_ms: Option<u64>,
    send_line: usize,
    response_line: usize,
}

impl PendingRequest {
    fn merge(&mut self, frag: Fragment) {
        merge_first(&mut self.method, frag.method);
        merge_first(&mut self.uri, frag.uri);
        merge_first(&mut self.status, frag.status);
        merge_first(&mut self.request_size, frag.request_size);
        merge_first(&mut self.response_size, frag.response_size);
        if self.duration_ms.is_none() {
            self.duration_ms = frag.request_duration_ms;
        }
    }
}

fn merge_first(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Streaming correlation state for one parse pass.
#[derive(Debug, Default)]
pub struct RequestCorrelator {
    by_id: IndexMap<String, PendingRequest>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Lines that match neither fragment shape are
    /// ignored.
    pub fn observe(&mut self, line_number: usize, text: &str) {
        let frag = Fragment::from_line(text);
        let Some(shape) = frag.shape() else {
            return;
        };
        let Some(id) = frag.request_id.clone() else {
            return;
        };
        let entry = self.by_id.entry(id).or_default();
        match shape {
            FragmentShape::Send => {
                if entry.send_line == 0 {
                    entry.send_line = line_number;
                }
            }
            FragmentShape::Response => {
                if entry.response_line == 0 {
                    entry.response_line = line_number;
                }
            }
        }
        entry.merge(frag);
    }

    /// Produce the final request list: ids with at least one observed
    /// line and a non-empty uri, sorted by send line number ascending.
    /// A send line of 0 (send never observed) sorts first; callers that
    /// need chronological order treat 0 specially.
    pub fn finalize(self) -> Vec<HttpRequest> {
        let mut requests: Vec<HttpRequest> = self
            .by_id
            .into_iter()
            .filter(|(_, pending)| {
                (pending.send_line != 0 || pending.response_line != 0)
                    && pending.uri.as_deref().is_some_and(|u| !u.is_empty())
            })
            .map(|(request_id, pending)| HttpRequest {
                request_id,
                method: pending.method.unwrap_or_default(),
                uri: pending.uri.unwrap_or_default(),
                status: pending.status.unwrap_or_default(),
                request_size: pending.request_size.unwrap_or_default(),
                response_size: pending.response_size.unwrap_or_default(),
                request_duration_ms: pending.duration_ms.unwrap_or(0),
                send_line_number: pending.send_line,
                response_line_number: pending.response_line,
            })
            .collect();
        requests.sort_by_key(|r| r.send_line_number);
        tracing::debug!(requests = requests.len(), "correlation finalized");
        requests
    }
}

/// Correlate every line of the raw text. Line numbers are 1-based and
/// count blank lines, matching the log line parser.
pub fn correlate_requests(text: &str) -> Vec<HttpRequest> {
    let mut correlator = RequestCorrelator::new();
    for (idx, line) in text.lines().enumerate() {
        correlator.observe(idx + 1, line);
    }
    correlator.finalize()
}

#[derive(Debug, Default)]
struct SyncAttrs {
    conn_id: Option<String>,
    timeout_ms: Option<u64>,
}

/// Second pass restricted to lines whose uri contains the `/sync` marker:
/// extract connection id and timeout per request id and merge them onto
/// the matching base requests. Also returns the unique connection ids in
/// first-observed order.
pub fn correlate_sync(text: &str, requests: &[HttpRequest]) -> (Vec<SyncRequest>, Vec<String>) {
    let mut attrs: IndexMap<String, SyncAttrs> = IndexMap::new();
    let mut conn_ids: IndexSet<String> = IndexSet::new();

    for line in text.lines() {
        let frag = Fragment::from_line(line);
        let Some(uri) = frag.uri.as_deref() else {
            continue;
        };
        if !uri.contains(SYNC_PATH_MARKER) {
            continue;
        }
        let Some(id) = frag.request_id.clone() else {
            continue;
        };
        let entry = attrs.entry(id).or_default();
        if entry.conn_id.is_none() {
            entry.conn_id.clone_from(&frag.conn_id);
        }
        if entry.timeout_ms.is_none() {
            entry.timeout_ms = frag.timeout_ms;
        }
        if let Some(conn) = frag.conn_id {
            conn_ids.insert(conn);
        }
    }

    let sync_requests = requests
        .iter()
        .filter_map(|request| {
            attrs.get(&request.request_id).map(|a| SyncRequest {
                request: request.clone(),
                conn_id: a.conn_id.clone().unwrap_or_default(),
                timeout_ms: a.timeout_ms,
            })
        })
        .collect();

    (sync_requests, conn_ids.into_iter().collect())
}
