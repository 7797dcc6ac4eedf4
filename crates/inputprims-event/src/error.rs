use crate::tag::FourCC;

/// Errors that can occur while building or interpreting events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The event's tag does not match the kind it was interpreted as.
    #[error("event type mismatch (expected '{expected}', found '{actual}')")]
    TypeMismatch { expected: FourCC, actual: FourCC },

    /// The declared size is smaller than the kind's fixed layout.
    #[error("event size underflow ({size} bytes, need at least {required})")]
    SizeUnderflow { size: usize, required: usize },

    /// A field range falls outside the event.
    #[error("field out of bounds (offset {offset}, width {width}, event size {size})")]
    OutOfBounds {
        offset: usize,
        width: usize,
        size: usize,
    },

    /// The buffer holds fewer bytes than the header declares.
    #[error("event truncated (declared {declared} bytes, {available} available)")]
    Truncated { declared: usize, available: usize },

    /// The event exceeds the representable or configured maximum size.
    #[error("event too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    /// The phase code is not part of the known phase enumeration.
    #[error("invalid action phase code {0}")]
    InvalidPhase(i32),

    /// An I/O error occurred while reading or writing an event stream.
    #[error("event I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete event was received.
    #[error("end of event stream (incomplete event)")]
    EndOfStream,
}

pub type Result<T> = std::result::Result<T, EventError>;
