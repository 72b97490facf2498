// ── Coordinator configuration ──
//
// The API client itself is injected by the consumer (the CLI builds it
// from its own config file); core only needs polling behavior here and
// never touches disk.

/// Configuration for the polling coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How often to poll the controller for door state (seconds).
    /// 0 = never poll; refreshes then only happen on explicit request.
    pub refresh_interval_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 10,
        }
    }
}
