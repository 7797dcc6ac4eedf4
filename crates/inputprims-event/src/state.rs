//! State delta events.
//!
//! A state delta carries a format-tagged blob covering part of a device's
//! state, starting `state_offset` bytes into that device's state layout.
//! Action events share this exact prefix, so a [`StateDeltaEvent`] view also
//! opens `'ACTN'` records and sees only their state blob.

use bytes::{BufMut, BytesMut};

use crate::error::{EventError, Result};
use crate::header::EventHeader;
use crate::layout::{
    self, read_u32, write_u32, SIZE_IN_BYTES, STATE_FORMAT, STATE_OFFSET, STATE_PREFIX_SIZE,
};
use crate::tag::{FourCC, STATE_DELTA};
use crate::view::{EventKind, EventKindMut, EventMut, EventRecord, EventRef};

/// Producer-side description of a state blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateBlob<'a> {
    /// Shape of the blob, defined by the device's state struct.
    pub format: FourCC,
    /// Byte offset into the device's full state where the blob begins.
    pub offset: u32,
    pub data: &'a [u8],
}

impl<'a> StateBlob<'a> {
    /// A blob starting at the beginning of the device state.
    pub fn new(format: FourCC, data: &'a [u8]) -> Self {
        Self {
            format,
            offset: 0,
            data,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Encode a state delta event into `dst`.
pub fn encode_state_event(
    device_id: u32,
    timestamp: f64,
    blob: &StateBlob<'_>,
    dst: &mut BytesMut,
) -> Result<()> {
    encode_state_kind(STATE_DELTA, device_id, timestamp, blob, dst, |_| {})
}

/// Build an owned state delta event.
pub fn create_state_event(device_id: u32, timestamp: f64, blob: StateBlob<'_>) -> Result<EventRecord> {
    let mut buf = BytesMut::new();
    encode_state_event(device_id, timestamp, &blob, &mut buf)?;
    EventRecord::from_bytes(buf.freeze())
}

/// Append a state-carrying event of kind `tag`, then let `trailer` append the
/// kind's fixed trailing block.
///
/// The size field stays zero until everything else is written. Sizes are
/// checked before the first byte is appended, so a failed encode leaves `dst`
/// untouched.
pub(crate) fn encode_state_kind<F>(
    tag: FourCC,
    device_id: u32,
    timestamp: f64,
    blob: &StateBlob<'_>,
    dst: &mut BytesMut,
    trailer: F,
) -> Result<()>
where
    F: FnOnce(&mut BytesMut),
{
    let total = layout::total_size(tag, blob.data.len())?;
    let size_field = u32::try_from(total).map_err(|_| EventError::TooLarge {
        size: total,
        max: u32::MAX as usize,
    })?;
    let start = dst.len();
    dst.reserve(total);

    let header = EventHeader {
        type_tag: tag,
        size_in_bytes: 0,
        device_id,
        timestamp,
    };
    header.put(dst);
    dst.put_u32_le(blob.format.code());
    dst.put_u32_le(blob.offset);
    dst.put_slice(blob.data);
    trailer(dst);

    debug_assert_eq!(dst.len() - start, total, "trailer size disagrees with layout");
    let size_at = start + SIZE_IN_BYTES.offset;
    dst[size_at..size_at + SIZE_IN_BYTES.width].copy_from_slice(&size_field.to_le_bytes());

    tracing::trace!(tag = %tag, device_id, size = total, "encoded event");
    Ok(())
}

/// Read-only view of a state delta.
#[derive(Debug, Clone, Copy)]
pub struct StateDeltaEvent<'a> {
    event: EventRef<'a>,
    state_format: FourCC,
    state_offset: u32,
    state_size: usize,
}

impl<'a> EventKind<'a> for StateDeltaEvent<'a> {
    const TYPE: FourCC = STATE_DELTA;

    fn accepts(tag: FourCC) -> bool {
        layout::carries_state(tag)
    }

    fn from_event(event: EventRef<'a>) -> Result<Self> {
        let state_size = layout::state_size(event.type_tag(), event.size_in_bytes())?;
        let bytes = event.as_bytes();
        Ok(Self {
            event,
            state_format: FourCC::from_code(read_u32(bytes, STATE_FORMAT.offset)?),
            state_offset: read_u32(bytes, STATE_OFFSET.offset)?,
            state_size,
        })
    }
}

impl<'a> StateDeltaEvent<'a> {
    pub fn header(&self) -> EventHeader {
        self.event.header()
    }

    pub fn device_id(&self) -> u32 {
        self.event.device_id()
    }

    pub fn timestamp(&self) -> f64 {
        self.event.timestamp()
    }

    pub fn state_format(&self) -> FourCC {
        self.state_format
    }

    pub fn state_offset(&self) -> u32 {
        self.state_offset
    }

    pub fn state_size_in_bytes(&self) -> usize {
        self.state_size
    }

    /// The state blob, excluding any trailing block of the underlying kind.
    pub fn state(&self) -> &'a [u8] {
        &self.event.as_bytes()[STATE_PREFIX_SIZE..STATE_PREFIX_SIZE + self.state_size]
    }

    pub fn into_event(self) -> EventRef<'a> {
        self.event
    }
}

/// Mutable view of a state delta.
#[derive(Debug)]
pub struct StateDeltaEventMut<'a> {
    tag: FourCC,
    bytes: &'a mut [u8],
    state_size: usize,
}

impl<'a> EventKindMut<'a> for StateDeltaEventMut<'a> {
    const TYPE: FourCC = STATE_DELTA;

    fn accepts(tag: FourCC) -> bool {
        layout::carries_state(tag)
    }

    fn from_event_mut(event: EventMut<'a>) -> Result<Self> {
        let tag = event.type_tag();
        let state_size = layout::state_size(tag, event.size_in_bytes())?;
        Ok(Self {
            tag,
            bytes: event.into_bytes(),
            state_size,
        })
    }
}

impl<'a> StateDeltaEventMut<'a> {
    /// Reborrow as a read-only view.
    pub fn as_state_event(&self) -> Result<StateDeltaEvent<'_>> {
        EventRef::parse(&*self.bytes)?.reinterpret()
    }

    pub fn type_tag(&self) -> FourCC {
        self.tag
    }

    pub fn state_size_in_bytes(&self) -> usize {
        self.state_size
    }

    pub fn state_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[STATE_PREFIX_SIZE..STATE_PREFIX_SIZE + self.state_size]
    }

    pub fn set_state_format(&mut self, format: FourCC) -> Result<()> {
        write_u32(self.bytes, STATE_FORMAT.offset, format.code())
    }

    pub fn set_state_offset(&mut self, offset: u32) -> Result<()> {
        write_u32(self.bytes, STATE_OFFSET.offset, offset)
    }
}
