//! Validated windows over event bytes.
//!
//! An [`EventRef`] or [`EventMut`] only exists once the header has been read
//! and its declared size checked against the buffer. Concrete kinds are
//! reached through [`EventRef::reinterpret`], which checks the type tag first.

use bytes::Bytes;

use crate::error::{EventError, Result};
use crate::header::EventHeader;
use crate::layout::{write_f64, write_u32, DEVICE_ID, HEADER_SIZE, TIMESTAMP};
use crate::tag::FourCC;

/// An event kind that can be viewed over a shared [`EventRef`].
pub trait EventKind<'a>: Sized {
    /// Tag produced by this kind's constructor.
    const TYPE: FourCC;

    /// Whether records carrying `tag` may be viewed as this kind.
    fn accepts(tag: FourCC) -> bool {
        tag == Self::TYPE
    }

    /// Build the view. Called only after [`EventKind::accepts`] passed.
    fn from_event(event: EventRef<'a>) -> Result<Self>;
}

/// An event kind that can be viewed over an [`EventMut`].
pub trait EventKindMut<'a>: Sized {
    const TYPE: FourCC;

    fn accepts(tag: FourCC) -> bool {
        tag == Self::TYPE
    }

    /// Build the view. Called only after [`EventKindMut::accepts`] passed.
    fn from_event_mut(event: EventMut<'a>) -> Result<Self>;
}

/// Read-only view of exactly one event.
#[derive(Debug, Clone, Copy)]
pub struct EventRef<'a> {
    header: EventHeader,
    bytes: &'a [u8],
}

impl<'a> EventRef<'a> {
    /// Validate the event at the start of `buf`.
    ///
    /// Bytes past the declared size are ignored, so `buf` may hold further events.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let (header, size) = validate_header(buf)?;
        Ok(Self {
            header,
            bytes: &buf[..size],
        })
    }

    pub(crate) fn from_parts(header: EventHeader, bytes: &'a [u8]) -> Self {
        Self { header, bytes }
    }

    pub fn header(&self) -> EventHeader {
        self.header
    }

    pub fn type_tag(&self) -> FourCC {
        self.header.type_tag
    }

    pub fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn device_id(&self) -> u32 {
        self.header.device_id
    }

    pub fn timestamp(&self) -> f64 {
        self.header.timestamp
    }

    /// The full record, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Whether this event may be viewed as `K`.
    pub fn is<K: EventKind<'a>>(&self) -> bool {
        K::accepts(self.type_tag())
    }

    /// View this event as kind `K`, failing on a tag mismatch.
    pub fn reinterpret<K: EventKind<'a>>(self) -> Result<K> {
        check_tag(K::TYPE, self.type_tag(), K::accepts)?;
        K::from_event(self)
    }

    /// Copy the record into an owned [`EventRecord`].
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            header: self.header,
            bytes: Bytes::copy_from_slice(self.bytes),
        }
    }
}

/// Returns the dispatch tag of an event.
pub fn type_tag(event: &EventRef<'_>) -> FourCC {
    event.type_tag()
}

/// Mutable view of exactly one event.
#[derive(Debug)]
pub struct EventMut<'a> {
    header: EventHeader,
    bytes: &'a mut [u8],
}

impl<'a> EventMut<'a> {
    /// Validate the event at the start of `buf`.
    pub fn parse(buf: &'a mut [u8]) -> Result<Self> {
        let (header, size) = validate_header(buf)?;
        Ok(Self {
            header,
            bytes: &mut buf[..size],
        })
    }

    pub fn header(&self) -> EventHeader {
        self.header
    }

    pub fn type_tag(&self) -> FourCC {
        self.header.type_tag
    }

    pub fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Reborrow as a read-only view.
    pub fn as_event(&self) -> EventRef<'_> {
        EventRef::from_parts(self.header, self.bytes)
    }

    pub fn set_device_id(&mut self, device_id: u32) -> Result<()> {
        write_u32(self.bytes, DEVICE_ID.offset, device_id)?;
        self.header.device_id = device_id;
        Ok(())
    }

    pub fn set_timestamp(&mut self, timestamp: f64) -> Result<()> {
        write_f64(self.bytes, TIMESTAMP.offset, timestamp)?;
        self.header.timestamp = timestamp;
        Ok(())
    }

    /// View this event as kind `K`, failing on a tag mismatch.
    pub fn reinterpret_mut<K: EventKindMut<'a>>(self) -> Result<K> {
        check_tag(K::TYPE, self.type_tag(), K::accepts)?;
        K::from_event_mut(self)
    }

    pub(crate) fn into_bytes(self) -> &'a mut [u8] {
        self.bytes
    }
}

/// An owned, validated event record.
///
/// This is what producers hand to a queue; it holds exactly one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    header: EventHeader,
    bytes: Bytes,
}

impl EventRecord {
    /// Validate and wrap an encoded record.
    ///
    /// Trailing bytes past the declared size are dropped.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let mut bytes = bytes.into();
        let (header, size) = validate_header(&bytes)?;
        bytes.truncate(size);
        Ok(Self { header, bytes })
    }

    pub fn as_event(&self) -> EventRef<'_> {
        EventRef::from_parts(self.header, &self.bytes)
    }

    pub fn header(&self) -> EventHeader {
        self.header
    }

    pub fn type_tag(&self) -> FourCC {
        self.header.type_tag
    }

    pub fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

fn validate_header(buf: &[u8]) -> Result<(EventHeader, usize)> {
    let header = EventHeader::read(buf)?;
    let size = header.size();
    if size < HEADER_SIZE {
        return Err(EventError::SizeUnderflow {
            size,
            required: HEADER_SIZE,
        });
    }
    if size > buf.len() {
        return Err(EventError::Truncated {
            declared: size,
            available: buf.len(),
        });
    }
    Ok((header, size))
}

fn check_tag(expected: FourCC, actual: FourCC, accepts: fn(FourCC) -> bool) -> Result<()> {
    if accepts(actual) {
        Ok(())
    } else {
        Err(EventError::TypeMismatch { expected, actual })
    }
}
