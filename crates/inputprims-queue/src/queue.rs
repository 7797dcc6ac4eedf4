use std::cell::Cell;

use bytes::BytesMut;
use inputprims_event::layout::total_size;
use inputprims_event::{
    encode_event, encode_state_event, EventError, EventRecord, EventRef, StateBlob, STATE_DELTA,
};

use crate::config::QueueConfig;
use crate::error::{QueueError, Result};

/// Counters for one drained update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub events: usize,
    pub bytes: usize,
}

/// Append-only event buffer with a single owner.
///
/// Views returned by [`EventQueue::dequeue_next`] and [`EventQueue::iter`]
/// borrow the queue; appending and reclaiming need `&mut self`, so no view
/// survives either.
#[derive(Debug)]
pub struct EventQueue {
    buf: BytesMut,
    read_pos: Cell<usize>,
    dequeued: Cell<usize>,
    events: usize,
    config: QueueConfig,
}

impl EventQueue {
    /// Create an empty queue with default config.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Create an empty queue with explicit config.
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            buf: BytesMut::new(),
            read_pos: Cell::new(0),
            dequeued: Cell::new(0),
            events: 0,
            config,
        }
    }

    /// Copy a validated event into the queue.
    pub fn enqueue(&mut self, event: &EventRef<'_>) -> Result<()> {
        self.check_capacity(event.size_in_bytes())?;
        encode_event(event, &mut self.buf);
        self.events += 1;
        tracing::trace!(
            tag = %event.type_tag(),
            device_id = event.device_id(),
            size = event.size_in_bytes(),
            "event queued"
        );
        Ok(())
    }

    /// Copy an owned record into the queue.
    pub fn enqueue_record(&mut self, record: &EventRecord) -> Result<()> {
        self.enqueue(&record.as_event())
    }

    /// Encode a state delta straight into the queue buffer.
    pub fn queue_state_event(&mut self, device_id: u32, timestamp: f64, blob: StateBlob<'_>) -> Result<()> {
        let size = total_size(STATE_DELTA, blob.data.len())?;
        self.check_capacity(size)?;
        encode_state_event(device_id, timestamp, &blob, &mut self.buf)?;
        self.events += 1;
        tracing::trace!(device_id, size, "state event queued");
        Ok(())
    }

    /// Next event after the read cursor, or `None` at the end of the queue.
    pub fn dequeue_next(&self) -> Result<Option<EventRef<'_>>> {
        let pos = self.read_pos.get();
        if pos >= self.buf.len() {
            return Ok(None);
        }
        let event = EventRef::parse(&self.buf[pos..])?;
        self.read_pos.set(pos + event.size_in_bytes());
        self.dequeued.set(self.dequeued.get() + 1);
        Ok(Some(event))
    }

    /// Move the read cursor back to the first event.
    pub fn rewind(&self) {
        self.read_pos.set(0);
        self.dequeued.set(0);
    }

    /// Iterate every queued event without touching the read cursor.
    pub fn iter(&self) -> Events<'_> {
        Events {
            buf: &self.buf,
            pos: 0,
        }
    }

    /// Dispatch every event after the read cursor, then reclaim the buffer.
    ///
    /// A handler error stops dispatch; the buffer is still reclaimed, so the
    /// remaining events of this tick are dropped.
    pub fn update<F, E>(&mut self, mut handler: F) -> std::result::Result<UpdateStats, E>
    where
        F: FnMut(EventRef<'_>) -> std::result::Result<(), E>,
        E: From<QueueError>,
    {
        let result = self.dispatch(&mut handler);
        match &result {
            Ok(stats) => tracing::debug!(events = stats.events, bytes = stats.bytes, "queue drained"),
            Err(_) => tracing::warn!(
                dropped_bytes = self.buf.len() - self.read_pos.get(),
                "update aborted, dropping remaining events"
            ),
        }
        self.reclaim();
        result
    }

    fn dispatch<F, E>(&self, handler: &mut F) -> std::result::Result<UpdateStats, E>
    where
        F: FnMut(EventRef<'_>) -> std::result::Result<(), E>,
        E: From<QueueError>,
    {
        let mut stats = UpdateStats::default();
        while let Some(event) = self.dequeue_next().map_err(E::from)? {
            let size = event.size_in_bytes();
            handler(event)?;
            stats.events += 1;
            stats.bytes += size;
        }
        Ok(stats)
    }

    /// Drop every slot and reset the read cursor.
    pub fn reclaim(&mut self) {
        self.buf.clear();
        self.read_pos.set(0);
        self.dequeued.set(0);
        self.events = 0;
    }

    /// Events buffered since the last reclaim, dequeued or not.
    pub fn len(&self) -> usize {
        self.events
    }

    /// True when nothing has been buffered since the last reclaim.
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Events after the read cursor, not yet returned by `dequeue_next`.
    pub fn pending(&self) -> usize {
        self.events - self.dequeued.get()
    }

    /// Bytes currently buffered.
    pub fn size_in_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Bytes left before the queue is full.
    pub fn remaining_capacity(&self) -> usize {
        self.config.capacity_bytes.saturating_sub(self.buf.len())
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn check_capacity(&self, size: usize) -> Result<()> {
        let rejection = if size > self.config.max_event_size {
            Some(QueueError::Event(EventError::TooLarge {
                size,
                max: self.config.max_event_size,
            }))
        } else if self.events >= self.config.max_events {
            Some(QueueError::TooManyEvents {
                max: self.config.max_events,
            })
        } else if size > self.remaining_capacity() {
            Some(QueueError::Full {
                needed: size,
                available: self.remaining_capacity(),
            })
        } else {
            None
        };

        match rejection {
            Some(err) => {
                tracing::warn!(size, error = %err, "event rejected");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over queued events.
#[derive(Debug, Clone)]
pub struct Events<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Events<'a> {
    type Item = Result<EventRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        match EventRef::parse(&self.buf[self.pos..]) {
            Ok(event) => {
                self.pos += event.size_in_bytes();
                Some(Ok(event))
            }
            Err(err) => {
                self.pos = self.buf.len();
                Some(Err(err.into()))
            }
        }
    }
}

impl<'a> IntoIterator for &'a EventQueue {
    type Item = Result<EventRef<'a>>;
    type IntoIter = Events<'a>;

    fn into_iter(self) -> Events<'a> {
        self.iter()
    }
}
