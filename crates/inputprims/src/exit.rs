use std::fmt;
use std::io;

use inputprims_event::EventError;
use inputprims_queue::QueueError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<QueueError> for CliError {
    fn from(err: QueueError) -> Self {
        queue_error("queue", err)
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn event_error(context: &str, err: EventError) -> CliError {
    match err {
        EventError::Io(source) => io_error(context, source),
        EventError::TypeMismatch { .. }
        | EventError::SizeUnderflow { .. }
        | EventError::OutOfBounds { .. }
        | EventError::Truncated { .. }
        | EventError::TooLarge { .. }
        | EventError::InvalidPhase(_)
        | EventError::EndOfStream => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn queue_error(context: &str, err: QueueError) -> CliError {
    match err {
        QueueError::Event(err) => event_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_events_are_data_invalid() {
        let err = event_error("inspect", EventError::SizeUnderflow { size: 4, required: 20 });
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("inspect: "));
    }

    #[test]
    fn io_errors_map_by_kind() {
        let err = event_error(
            "open",
            EventError::Io(io::Error::from(io::ErrorKind::PermissionDenied)),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn queue_capacity_is_internal() {
        let err = queue_error("queue", QueueError::TooManyEvents { max: 1 });
        assert_eq!(err.code, INTERNAL);
        let err: CliError = QueueError::Event(EventError::EndOfStream).into();
        assert_eq!(err.code, DATA_INVALID);
    }
}
