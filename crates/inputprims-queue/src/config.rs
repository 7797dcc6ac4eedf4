use inputprims_event::DEFAULT_MAX_EVENT_SIZE;

/// Controls queue capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum bytes buffered between reclaims.
    pub capacity_bytes: usize,
    /// Maximum events buffered between reclaims.
    pub max_events: usize,
    /// Largest single event accepted.
    pub max_event_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: 4 * 1024 * 1024,
            max_events: 16 * 1024,
            max_event_size: DEFAULT_MAX_EVENT_SIZE,
        }
    }
}
