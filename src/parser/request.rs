use serde::{Deserialize, Serialize};

/// Timeouts at or above this are long-poll requests; a timeout of zero is
/// a catch-up request. Domain thresholds, not tunables.
pub const LONG_POLL_TIMEOUT_MS: u64 = 30_000;

/// The `/sync` path marker that identifies sync-protocol requests.
pub const SYNC_PATH_MARKER: &str = "/sync";

/// One correlated request, merged from its send and response fragments.
/// Immutable once the correlator finalizes; filters only select subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Correlation key assigned by the log producer. Treated as unique
    /// per parse.
    pub request_id: String,
    pub method: String,
    pub uri: String,
    /// Empty string means no response observed yet.
    pub status: String,
    /// Raw size strings as logged, e.g. "1.2k".
    pub request_size: String,
    pub response_size: String,
    /// 0 means unknown.
    pub request_duration_ms: u64,
    /// 0 means the send fragment was never observed (request predates the
    /// start of the log).
    pub send_line_number: usize,
    /// 0 means the response fragment was never observed (still pending).
    pub response_line_number: usize,
}

impl HttpRequest {
    /// A request without an observed response.
    pub fn is_incomplete(&self) -> bool {
        self.status.is_empty()
    }
}

/// A sync-protocol request: the base request plus connection and timeout
/// metadata extracted from `/sync` trace lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(flatten)]
    pub request: HttpRequest,
    /// Connection/session identifier, empty if the line carried none.
    pub conn_id: String,
    pub timeout_ms: Option<u64>,
}

impl SyncRequest {
    /// `timeout == 0`: poll immediately, don't hold the request open.
    pub fn is_catch_up(&self) -> bool {
        self.timeout_ms == Some(0)
    }

    /// `timeout >= 30000` ms: held open awaiting server-side events.
    pub fn is_long_poll(&self) -> bool {
        self.timeout_ms.is_some_and(|t| t >= LONG_POLL_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_with_timeout(timeout_ms: Option<u64>) -> SyncRequest {
        SyncRequest {
            request: HttpRequest {
                request_id: "S".into(),
                method: "GET".into(),
                uri: "/sync".into(),
                status: "200".into(),
                request_size: String::new(),
                response_size: String::new(),
                request_duration_ms: 0,
                send_line_number: 1,
                response_line_number: 2,
            },
            conn_id: "c-1".into(),
            timeout_ms,
        }
    }

    #[test]
    fn catch_up_and_long_poll_thresholds() {
        assert!(sync_with_timeout(Some(0)).is_catch_up());
        assert!(!sync_with_timeout(Some(0)).is_long_poll());
        assert!(sync_with_timeout(Some(30_000)).is_long_poll());
        assert!(sync_with_timeout(Some(60_000)).is_long_poll());
        assert!(!sync_with_timeout(Some(29_999)).is_long_poll());
        assert!(!sync_with_timeout(None).is_catch_up());
        assert!(!sync_with_timeout(None).is_long_poll());
    }

    #[test]
    fn empty_status_means_incomplete() {
        let mut req = sync_with_timeout(None).request;
        assert!(!req.is_incomplete());
        req.status.clear();
        assert!(req.is_incomplete());
    }
}
