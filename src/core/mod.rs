pub mod filter;
pub mod gaps;
pub mod time;

pub use filter::{filter_lines, filter_requests, filter_sync_requests};
pub use gaps::{build_display_items, expand_gap, gap_info};
pub use time::{parse_time_input, resolve_range};
