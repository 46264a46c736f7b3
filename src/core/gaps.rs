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

//! Gap/range management for progressive disclosure of context around
//! search matches.
//!
//! The matched line indices stay fixed; the user reveals hidden context
//! by adding *forced ranges*, closed intervals of otherwise-filtered-out
//! indices. The display list is the merge of matched indices and forced
//! ranges, ascending and de-duplicated. All functions are pure; the
//! caller owns the forced-range value and threads it through each call.

use crate::parser::line::LogLine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed interval `[start, end]` of line indices kept visible even
/// though they didn't match the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedRange {
    pub start: usize,
    pub end: usize,
}

/// Canonicalize: sort and merge overlapping or adjacent ranges.
pub fn merge_ranges(mut ranges: Vec<ForcedRange>) -> Vec<ForcedRange> {
    ranges.sort_unstable_by_key(|r| (r.start, r.end));
    let mut merged: Vec<ForcedRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end.saturating_add(1) {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// The full display list: matched indices merged with every forced range,
/// ascending, de-duplicated, clamped to `total`.
pub fn display_indices(matched: &[usize], forced: &[ForcedRange], total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let mut out: Vec<usize> = matched.iter().copied().filter(|&i| i < total).collect();
    for range in forced {
        let end = range.end.min(total - 1);
        for i in range.start..=end {
            out.push(i);
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// One hidden run next to a displayed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Size of the original gap between matched neighbors (or the file
    /// edge), before any forced expansion.
    pub gap_size: usize,
    /// Lines still hidden between this line and the next displayed one in
    /// that direction.
    pub remaining_gap: usize,
    /// The hidden run reaches the absolute start of the file.
    pub is_first: bool,
    /// The hidden run reaches the absolute end of the file.
    pub is_last: bool,
}

/// Hidden-run report for one displayed line: toward index 0 (`up`) and
/// toward the end of the file (`down`). Adjacent displayed lines report
/// no gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapInfo {
    pub up: Option<Gap>,
    pub down: Option<Gap>,
}

/// Direction a gap opens from its anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapDirection {
    Up,
    Down,
}

/// A gap identity: direction plus the displayed line it is anchored on,
/// encoded as `"up-<idx>"` / `"down-<idx>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapId {
    pub direction: GapDirection,
    pub anchor: usize,
}

impl GapId {
    pub fn parse(s: &str) -> Option<Self> {
        let (direction, rest) = if let Some(rest) = s.strip_prefix("up-") {
            (GapDirection::Up, rest)
        } else if let Some(rest) = s.strip_prefix("down-") {
            (GapDirection::Down, rest)
        } else {
            return None;
        };
        rest.parse().ok().map(|anchor| Self { direction, anchor })
    }
}

impl fmt::Display for GapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            GapDirection::Up => write!(f, "up-{}", self.anchor),
            GapDirection::Down => write!(f, "down-{}", self.anchor),
        }
    }
}

/// How much of a gap to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpandAmount {
    /// Reveal up to this many lines nearest the anchor. Clamps to the
    /// remaining gap.
    Lines(usize),
    /// Reveal the entire remaining gap.
    All,
    /// Reveal everything up to the next displayed match below. Only
    /// meaningful on a `down` gap.
    NextMatch,
    /// Reveal everything up to the previous displayed match above. Only
    /// meaningful on an `up` gap.
    PrevMatch,
}

// Original gap run around `at`, bounded by matched neighbors or the file
// edges. `matched` must be ascending.
fn original_run(matched: &[usize], total: usize, at: usize, direction: GapDirection) -> usize {
    let split = match direction {
        GapDirection::Up => matched.partition_point(|&m| m < at),
        GapDirection::Down => matched.partition_point(|&m| m <= at),
    };
    let low = if split > 0 {
        matched[split - 1] as i64
    } else {
        -1
    };
    let high = matched.get(split).map_or(total as i64, |&m| m as i64);
    (high - low - 1).max(0) as usize
}

fn gap_for(displayed: &[usize], matched: &[usize], total: usize, at: usize) -> GapInfo {
    let Ok(pos) = displayed.binary_search(&at) else {
        return GapInfo::default();
    };

    let up = {
        let hidden = if pos == 0 {
            at
        } else {
            at - displayed[pos - 1] - 1
        };
        if hidden == 0 {
            None
        } else {
            Some(Gap {
                gap_size: original_run(matched, total, at, GapDirection::Up),
                remaining_gap: hidden,
                is_first: pos == 0,
                is_last: false,
            })
        }
    };

    let down = {
        let hidden = match displayed.get(pos + 1) {
            Some(&next) => next - at - 1,
            None => total - at - 1,
        };
        if hidden == 0 {
            None
        } else {
            Some(Gap {
                gap_size: original_run(matched, total, at, GapDirection::Down),
                remaining_gap: hidden,
                is_first: false,
                is_last: pos + 1 == displayed.len(),
            })
        }
    };

    GapInfo { up, down }
}

/// Report the hidden runs immediately above and below a displayed line.
/// A line that isn't currently displayed reports no gaps.
pub fn gap_info(
    line_index: usize,
    matched: &[usize],
    total: usize,
    forced: &[ForcedRange],
) -> GapInfo {
    let displayed = display_indices(matched, forced, total);
    gap_for(&displayed, matched, total, line_index)
}

/// Apply one gap-expansion request, returning the new canonical forced
/// range set. `None` means nothing changed (an unrecognized gap id, an
/// already-fully-expanded gap, or a zero amount), so callers get cheap
/// change detection.
pub fn expand_gap(
    gap_id: &str,
    amount: ExpandAmount,
    matched: &[usize],
    total: usize,
    forced: &[ForcedRange],
) -> Option<Vec<ForcedRange>> {
    let id = GapId::parse(gap_id)?;
    if total == 0 {
        return None;
    }
    let displayed = display_indices(matched, forced, total);
    let pos = displayed.binary_search(&id.anchor).ok()?;

    // The hidden region this gap covers, bounded by the neighboring
    // displayed line (forced lines included) or the file edge.
    let (region_start, region_end) = match id.direction {
        GapDirection::Up => {
            if id.anchor == 0 {
                return None;
            }
            let low = if pos == 0 { 0 } else { displayed[pos - 1] + 1 };
            (low, id.anchor - 1)
        }
        GapDirection::Down => {
            let high = displayed.get(pos + 1).map_or(total - 1, |&next| next - 1);
            (id.anchor + 1, high)
        }
    };
    if region_start > region_end {
        return None; // fully expanded already
    }
    let remaining = region_end - region_start + 1;

    let reveal = match (id.direction, amount) {
        (_, ExpandAmount::Lines(0)) => return None,
        (GapDirection::Up, ExpandAmount::Lines(n)) => {
            let n = n.min(remaining);
            ForcedRange {
                start: region_end + 1 - n,
                end: region_end,
            }
        }
        (GapDirection::Down, ExpandAmount::Lines(n)) => {
            let n = n.min(remaining);
            ForcedRange {
                start: region_start,
                end: region_start + n - 1,
            }
        }
        (_, ExpandAmount::All)
        | (GapDirection::Up, ExpandAmount::PrevMatch)
        | (GapDirection::Down, ExpandAmount::NextMatch) => ForcedRange {
            start: region_start,
            end: region_end,
        },
        (GapDirection::Up, ExpandAmount::NextMatch)
        | (GapDirection::Down, ExpandAmount::PrevMatch) => return None,
    };

    let mut next = forced.to_vec();
    next.push(reveal);
    Some(merge_ranges(next))
}

/// One line of the final rendered sequence, with its gap annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayItem<'a> {
    pub line_index: usize,
    pub line: &'a LogLine,
    pub gap_above: Option<Gap>,
    pub gap_below: Option<Gap>,
}

/// Build the final display sequence: every matched or forced line in
/// ascending order, annotated with the gaps around it. An empty match set
/// yields an empty result; no gap computation is attempted.
pub fn build_display_items<'a>(
    matched: &[usize],
    lines: &'a [LogLine],
    forced: &[ForcedRange],
) -> Vec<DisplayItem<'a>> {
    if matched.is_empty() {
        return Vec::new();
    }
    let total = lines.len();
    let displayed = display_indices(matched, forced, total);
    displayed
        .iter()
        .filter_map(|&idx| {
            let info = gap_for(&displayed, matched, total, idx);
            lines.get(idx).map(|line| DisplayItem {
                line_index: idx,
                line,
                gap_above: info.up,
                gap_below: info.down,
            })
        })
        .collect()
}
