use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_event, EventConfig};
use crate::error::{EventError, Result};
use crate::view::EventRecord;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete events from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete events.
pub struct EventReader<T> {
    inner: T,
    buf: BytesMut,
    config: EventConfig,
}

impl<T: Read> EventReader<T> {
    /// Create a new event reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, EventConfig::default())
    }

    /// Create a new event reader with explicit configuration.
    pub fn with_config(inner: T, config: EventConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete event (blocking).
    ///
    /// Returns `Ok(None)` at a clean end of stream, and
    /// `Err(EventError::EndOfStream)` if the stream ends inside an event.
    pub fn next_event(&mut self) -> Result<Option<EventRecord>> {
        loop {
            if let Some(record) = decode_event(&mut self.buf, self.config.max_event_size)? {
                return Ok(Some(record));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                tracing::debug!(buffered = self.buf.len(), "stream ended inside an event");
                return Err(EventError::EndOfStream);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read the next complete event (blocking).
    ///
    /// Returns `Err(EventError::EndOfStream)` when EOF is reached.
    pub fn read_event(&mut self) -> Result<EventRecord> {
        self.next_event()?.ok_or(EventError::EndOfStream)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum event size for subsequent decoding.
    pub fn set_max_event_size(&mut self, max_event_size: usize) {
        self.config.max_event_size = max_event_size;
    }

    /// Current event reader configuration.
    pub fn config(&self) -> &EventConfig {
        &self.config
    }
}

impl<T: Read> Iterator for EventReader<T> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
