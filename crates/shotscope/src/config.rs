//! Configuration constants for the shotscope engine

/// Playback configuration
pub mod playback {
    /// Command channel capacity
    pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

    /// Event channel capacity
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;

    /// Engine tick interval while waiting for commands (milliseconds).
    /// Bounds how often progress updates and end-of-clip detection run.
    pub const TICK_INTERVAL_MS: u64 = 100;
}

/// Timeout configuration
pub mod timeouts {
    /// Maximum time to wait for format probing (seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 10;
}
