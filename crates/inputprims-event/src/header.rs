use bytes::BufMut;

use crate::error::{EventError, Result};
use crate::layout::{
    read_f64, read_u32, write_f64, write_u32, DEVICE_ID, HEADER_SIZE, SIZE_IN_BYTES, TIMESTAMP,
    TYPE_TAG,
};
use crate::tag::FourCC;

/// The fixed preamble of every event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventHeader {
    /// Kind of the event.
    pub type_tag: FourCC,
    /// Total record size, header included.
    pub size_in_bytes: u32,
    /// Device the event belongs to.
    pub device_id: u32,
    /// Capture time in seconds.
    pub timestamp: f64,
}

impl EventHeader {
    /// Create a header, rejecting sizes that cannot hold the header itself.
    pub fn new(type_tag: FourCC, size_in_bytes: usize, device_id: u32, timestamp: f64) -> Result<Self> {
        if size_in_bytes < HEADER_SIZE {
            return Err(EventError::SizeUnderflow {
                size: size_in_bytes,
                required: HEADER_SIZE,
            });
        }
        let size_in_bytes = u32::try_from(size_in_bytes).map_err(|_| EventError::TooLarge {
            size: size_in_bytes,
            max: u32::MAX as usize,
        })?;
        Ok(Self {
            type_tag,
            size_in_bytes,
            device_id,
            timestamp,
        })
    }

    /// Total record size as a `usize`.
    pub fn size(&self) -> usize {
        self.size_in_bytes as usize
    }

    /// Read the header fields from the start of `bytes`.
    ///
    /// The declared size is not validated here; see [`crate::EventRef::parse`].
    pub fn read(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            type_tag: FourCC::from_code(read_u32(bytes, TYPE_TAG.offset)?),
            size_in_bytes: read_u32(bytes, SIZE_IN_BYTES.offset)?,
            device_id: read_u32(bytes, DEVICE_ID.offset)?,
            timestamp: read_f64(bytes, TIMESTAMP.offset)?,
        })
    }

    /// Overwrite the header fields at the start of `bytes`.
    pub fn write(&self, bytes: &mut [u8]) -> Result<()> {
        write_u32(bytes, TYPE_TAG.offset, self.type_tag.code())?;
        write_u32(bytes, SIZE_IN_BYTES.offset, self.size_in_bytes)?;
        write_u32(bytes, DEVICE_ID.offset, self.device_id)?;
        write_f64(bytes, TIMESTAMP.offset, self.timestamp)
    }

    /// Append the header to a growable buffer.
    pub(crate) fn put(&self, dst: &mut impl BufMut) {
        dst.put_u32_le(self.type_tag.code());
        dst.put_u32_le(self.size_in_bytes);
        dst.put_u32_le(self.device_id);
        dst.put_f64_le(self.timestamp);
    }
}
