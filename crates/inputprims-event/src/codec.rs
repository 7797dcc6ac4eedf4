//! Event streams.
//!
//! A trace is a plain concatenation of events. Each event is self-delimiting
//! through its header size, so no extra framing is added:
//! ```text
//! ┌────────────────────────────┬────────────────────────────┬─────
//! │ event 0 (size_0 bytes)     │ event 1 (size_1 bytes)     │ ...
//! └────────────────────────────┴────────────────────────────┴─────
//! ```

use bytes::{BufMut, BytesMut};

use crate::error::{EventError, Result};
use crate::header::EventHeader;
use crate::layout::HEADER_SIZE;
use crate::view::{EventRecord, EventRef};

/// Default maximum event size: 1 MiB.
pub const DEFAULT_MAX_EVENT_SIZE: usize = 1024 * 1024;

/// Configuration for event stream encoding and decoding.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Maximum accepted event size in bytes, header included. Default: 1 MiB.
    pub max_event_size: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            max_event_size: DEFAULT_MAX_EVENT_SIZE,
        }
    }
}

/// Append an event to a stream buffer.
pub fn encode_event(event: &EventRef<'_>, dst: &mut BytesMut) {
    dst.reserve(event.size_in_bytes());
    dst.put_slice(event.as_bytes());
}

/// Decode one event from the front of a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete event yet.
/// On success, consumes the event bytes from the buffer.
pub fn decode_event(src: &mut BytesMut, max_event_size: usize) -> Result<Option<EventRecord>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let header = EventHeader::read(src)?;
    let size = header.size();
    if size < HEADER_SIZE {
        return Err(EventError::SizeUnderflow {
            size,
            required: HEADER_SIZE,
        });
    }
    if size > max_event_size {
        return Err(EventError::TooLarge {
            size,
            max: max_event_size,
        });
    }
    if src.len() < size {
        src.reserve(size - src.len());
        return Ok(None); // Need more data
    }

    EventRecord::from_bytes(src.split_to(size).freeze()).map(Some)
}

/// `tokio_util` codec over event streams.
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct EventCodec {
    config: EventConfig,
}

#[cfg(feature = "async")]
impl EventCodec {
    pub fn new() -> Self {
        Self::with_config(EventConfig::default())
    }

    pub fn with_config(config: EventConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "async")]
impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Decoder for EventCodec {
    type Item = EventRecord;
    type Error = EventError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<EventRecord>> {
        decode_event(src, self.config.max_event_size)
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Encoder<EventRecord> for EventCodec {
    type Error = EventError;

    fn encode(&mut self, record: EventRecord, dst: &mut BytesMut) -> Result<()> {
        if record.size_in_bytes() > self.config.max_event_size {
            return Err(EventError::TooLarge {
                size: record.size_in_bytes(),
                max: self.config.max_event_size,
            });
        }
        encode_event(&record.as_event(), dst);
        Ok(())
    }
}
