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

//! Token scanner and field extractor for protocol trace fragments.
//!
//! Trace lines carry `key=value` pairs, e.g.
//! `send{request_id="A" method=GET uri="/x" request_size="10"}`.
//! Values are either double-quoted or bare (terminated by whitespace,
//! `}` or `,`). The scanner is explicit rather than regex-driven so that
//! partial matches and per-field failures stay visible and testable.

use serde::{Deserialize, Serialize};

/// Scan every `key=value` token in a line, in order of appearance.
pub fn scan_fields(line: &str) -> Vec<(&str, &str)> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !(bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
            i += 1;
            continue;
        }
        let key_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            // Bare word without a value, e.g. the `send` in `send{...}`.
            continue;
        }
        let key = &line[key_start..i];
        i += 1;
        if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            let value_start = i;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            fields.push((key, &line[value_start..i]));
            if i < bytes.len() {
                i += 1; // closing quote
            }
        } else {
            let value_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'}'
                && bytes[i] != b','
            {
                i += 1;
            }
            fields.push((key, &line[value_start..i]));
        }
    }
    fields
}

/// Parse a duration value (`120ms`, `0.5s`) into integer milliseconds,
/// rounding to nearest. `0.5s` is 500, by contract.
pub fn parse_duration_ms(value: &str) -> Option<u64> {
    let value = value.trim();
    let (number, to_millis) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000.0)
    } else {
        return None;
    };
    let parsed: f64 = number.trim().parse().ok()?;
    if !parsed.is_finite() || parsed < 0.0 {
        return None;
    }
    Some((parsed * to_millis).round() as u64)
}

/// The recognized fields of one trace fragment line. Fields missing from
/// the line stay `None`; a repeated key keeps its first value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub request_id: Option<String>,
    pub method: Option<String>,
    pub uri: Option<String>,
    pub status: Option<String>,
    pub request_size: Option<String>,
    pub response_size: Option<String>,
    pub request_duration_ms: Option<u64>,
    pub conn_id: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// The two line shapes the correlator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentShape {
    Send,
    Response,
}

impl Fragment {
    pub fn from_line(line: &str) -> Self {
        let mut frag = Self::default();
        for (key, value) in scan_fields(line) {
            match key {
                "request_id" => set_first(&mut frag.request_id, value),
                "method" => set_first(&mut frag.method, value),
                "uri" => set_first(&mut frag.uri, value),
                "status" => set_first(&mut frag.status, value),
                "request_size" => set_first(&mut frag.request_size, value),
                "response_size" => set_first(&mut frag.response_size, value),
                "request_duration" => {
                    if frag.request_duration_ms.is_none() {
                        frag.request_duration_ms = parse_duration_ms(value);
                    }
                }
                "conn_id" => set_first(&mut frag.conn_id, value),
                "timeout" => {
                    if frag.timeout_ms.is_none() {
                        frag.timeout_ms =
                            value.parse().ok().or_else(|| parse_duration_ms(value));
                    }
                }
                _ => {}
            }
        }
        frag
    }

    /// Classify the fragment. The response shape is checked before the
    /// send shape because a response line's field set is a superset of a
    /// send line's required fields.
    pub fn shape(&self) -> Option<FragmentShape> {
        self.request_id.as_ref()?;
        if self.status.is_some() {
            return Some(FragmentShape::Response);
        }
        if self.method.is_some() && self.uri.is_some() {
            return Some(FragmentShape::Send);
        }
        None
    }
}

fn set_first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}
