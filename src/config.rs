#![forbid(unsafe_code)]

/// Per-graph handle options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Timeout in milliseconds appended to queries that do not set their own.
    pub default_timeout_ms: Option<u64>,
    /// Routes [`crate::Graph::query`] through `GRAPH.RO_QUERY`.
    pub read_only: bool,
    /// Fetches all three schema lists when the handle is created.
    pub warm_cache_on_open: bool,
}

impl GraphOptions {
    /// Replica-safe handle: every query is read-only.
    pub fn read_only() -> Self {
        Self {
            default_timeout_ms: None,
            read_only: true,
            warm_cache_on_open: false,
        }
    }

    /// Long-lived service handle: bounded queries and a warm cache.
    pub fn service(timeout_ms: u64) -> Self {
        Self {
            default_timeout_ms: Some(timeout_ms),
            read_only: false,
            warm_cache_on_open: true,
        }
    }

    /// Sets the default timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = Some(timeout_ms);
        self
    }
}
