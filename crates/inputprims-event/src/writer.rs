use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_event, EventConfig};
use crate::error::{EventError, Result};
use crate::view::{EventRecord, EventRef};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete events to any `Write` stream.
pub struct EventWriter<T> {
    inner: T,
    buf: BytesMut,
    config: EventConfig,
}

impl<T: Write> EventWriter<T> {
    /// Create a new event writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, EventConfig::default())
    }

    /// Create a new event writer with explicit configuration.
    pub fn with_config(inner: T, config: EventConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write an owned record (blocking).
    pub fn write_record(&mut self, record: &EventRecord) -> Result<()> {
        self.write_event(&record.as_event())
    }

    /// Write a complete event (blocking).
    pub fn write_event(&mut self, event: &EventRef<'_>) -> Result<()> {
        if event.size_in_bytes() > self.config.max_event_size {
            return Err(EventError::TooLarge {
                size: event.size_in_bytes(),
                max: self.config.max_event_size,
            });
        }

        self.buf.clear();
        encode_event(event, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(EventError::EndOfStream),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventError::Io(err)),
            }
        }

        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current event writer configuration.
    pub fn config(&self) -> &EventConfig {
        &self.config
    }
}
