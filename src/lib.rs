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

//! LogLens core: parsing and time-indexed filtering for SDK
//! request/response trace logs.
//!
//! The crate turns raw log text into immutable, line-numbered records
//! ([`LogLine`]) and correlated request records ([`HttpRequest`] /
//! [`SyncRequest`]), then answers range and attribute queries over them
//! with a single set of filter predicates so that every consuming view
//! agrees on what is "in range".
//!
//! All components are pure functions over borrowed, immutable inputs:
//! re-running a filter or gap computation with the same arguments is
//! idempotent and side-effect free. The embedding application owns the
//! one piece of mutable state (the loaded record set and the active
//! criteria) and threads it through explicitly.

pub mod core;
pub mod error;
pub mod parser;

pub use crate::core::filter::{
    filter_lines, filter_requests, filter_sync_requests, LineCriteria, RequestCriteria,
    SyncCriteria, INCOMPLETE_STATUS_KEY,
};
pub use crate::core::gaps::{
    build_display_items, display_indices, expand_gap, gap_info, merge_ranges, DisplayItem,
    ExpandAmount, ForcedRange, Gap, GapDirection, GapId, GapInfo,
};
pub use crate::core::time::{
    display_time, display_time_from_micros, from_url_form, parse_time_input, resolve_range,
    text_to_micros, to_url_form, Shortcut, TimeFilter, TimeOfDay, TimeRange,
};
pub use crate::error::{Error, FileError, ParsingError, Severity, ValidationError};
pub use crate::parser::line::{LogLevel, LogLine};
pub use crate::parser::request::{HttpRequest, SyncRequest, LONG_POLL_TIMEOUT_MS, SYNC_PATH_MARKER};
pub use crate::parser::{parse_lines, parse_log, ParseOutput};
