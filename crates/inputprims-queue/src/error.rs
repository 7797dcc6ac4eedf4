use inputprims_event::EventError;

/// Errors that can occur in queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The event itself is malformed or too large.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Not enough buffer space left before the next reclaim.
    #[error("queue full ({needed} bytes needed, {available} available)")]
    Full { needed: usize, available: usize },

    /// The event count limit has been reached.
    #[error("queue holds the maximum of {max} events")]
    TooManyEvents { max: usize },
}

pub type Result<T> = std::result::Result<T, QueueError>;
