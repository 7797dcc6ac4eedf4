//! Size and offset calculus shared by every event constructor and view.
//!
//! Layout (little-endian, packed, no padding):
//! ```text
//! ┌──────────┬──────────┬──────────┬───────────┬────────┬────────┬──────────────┬───────────────┐
//! │ Type (4) │ Size (4) │ Device   │ Timestamp │ Format │ Offset │ State blob   │ Action block  │
//! │ FourCC   │ total    │ (4)      │ (8, f64)  │ (4)    │ (4)    │ (variable)   │ (32, ACTN)    │
//! └──────────┴──────────┴──────────┴───────────┴────────┴────────┴──────────────┴───────────────┘
//!  0          4          8          12          20       24       28             28 + state size
//! ```
//!
//! The variable region is always located from the declared total size; the
//! trailing action block sits at `total - ACTION_METADATA_SIZE`.

use std::ops::Range;

use crate::error::{EventError, Result};
use crate::tag::{FourCC, ACTION, STATE_DELTA};

/// A fixed-width field at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    /// First byte past the field.
    pub const fn end(self) -> usize {
        self.offset + self.width
    }

    /// The same field displaced by `base` bytes.
    pub const fn at(self, base: usize) -> Self {
        Self::new(base + self.offset, self.width)
    }
}

pub const TYPE_TAG: Field = Field::new(0, 4);
pub const SIZE_IN_BYTES: Field = Field::new(4, 4);
pub const DEVICE_ID: Field = Field::new(8, 4);
pub const TIMESTAMP: Field = Field::new(12, 8);

/// Header size shared by every event kind.
pub const HEADER_SIZE: usize = TIMESTAMP.end();

pub const STATE_FORMAT: Field = Field::new(HEADER_SIZE, 4);
pub const STATE_OFFSET: Field = Field::new(HEADER_SIZE + 4, 4);

/// Header plus state format and state offset; the blob starts here.
pub const STATE_PREFIX_SIZE: usize = STATE_OFFSET.end();

/// Trailing action fields, relative to the end of the state blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionField {
    ActionIndex,
    BindingIndex,
    ModifierIndex,
    StartTime,
    EndTime,
    Phase,
}

impl ActionField {
    pub const ALL: [ActionField; 6] = [
        ActionField::ActionIndex,
        ActionField::BindingIndex,
        ActionField::ModifierIndex,
        ActionField::StartTime,
        ActionField::EndTime,
        ActionField::Phase,
    ];

    pub const fn field(self) -> Field {
        match self {
            ActionField::ActionIndex => Field::new(0, 4),
            ActionField::BindingIndex => Field::new(4, 4),
            ActionField::ModifierIndex => Field::new(8, 4),
            ActionField::StartTime => Field::new(12, 8),
            ActionField::EndTime => Field::new(20, 8),
            ActionField::Phase => Field::new(28, 4),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ActionField::ActionIndex => "action_index",
            ActionField::BindingIndex => "binding_index",
            ActionField::ModifierIndex => "modifier_index",
            ActionField::StartTime => "start_time",
            ActionField::EndTime => "end_time",
            ActionField::Phase => "phase",
        }
    }
}

/// Size of the action block appended after the state blob.
pub const ACTION_METADATA_SIZE: usize = ActionField::Phase.field().end();

/// Whether records of kind `tag` start with the state delta prefix.
pub fn carries_state(tag: FourCC) -> bool {
    tag == STATE_DELTA || tag == ACTION
}

/// Bytes a kind appends after its state blob.
pub fn trailing_size(tag: FourCC) -> usize {
    if tag == ACTION {
        ACTION_METADATA_SIZE
    } else {
        0
    }
}

/// Fixed bytes of a state-carrying kind: prefix plus trailing block.
pub fn fixed_size(tag: FourCC) -> usize {
    STATE_PREFIX_SIZE + trailing_size(tag)
}

/// Length of the state blob for a record of kind `tag` and declared `total` size.
///
/// Fails instead of clamping when `total` cannot hold the kind's fixed layout.
pub fn state_size(tag: FourCC, total: usize) -> Result<usize> {
    let required = fixed_size(tag);
    total
        .checked_sub(required)
        .ok_or(EventError::SizeUnderflow {
            size: total,
            required,
        })
}

/// Offset of the first byte after the state blob.
pub fn state_end(tag: FourCC, total: usize) -> Result<usize> {
    Ok(STATE_PREFIX_SIZE + state_size(tag, total)?)
}

/// Total record size for a blob of `blob_len` bytes.
pub fn total_size(tag: FourCC, blob_len: usize) -> Result<usize> {
    let max = u32::MAX as usize;
    let total = fixed_size(tag)
        .checked_add(blob_len)
        .ok_or(EventError::TooLarge {
            size: usize::MAX,
            max,
        })?;
    if total > max {
        return Err(EventError::TooLarge { size: total, max });
    }
    Ok(total)
}

/// Range of `field` within a buffer of `len` bytes.
pub fn field_range(len: usize, field: Field) -> Result<Range<usize>> {
    let out_of_bounds = EventError::OutOfBounds {
        offset: field.offset,
        width: field.width,
        size: len,
    };
    match field.offset.checked_add(field.width) {
        Some(end) if end <= len => Ok(field.offset..end),
        _ => Err(out_of_bounds),
    }
}

fn read_array<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N]> {
    let range = field_range(bytes.len(), Field::new(at, N))?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[range]);
    Ok(out)
}

fn write_array<const N: usize>(bytes: &mut [u8], at: usize, value: [u8; N]) -> Result<()> {
    let range = field_range(bytes.len(), Field::new(at, N))?;
    bytes[range].copy_from_slice(&value);
    Ok(())
}

pub fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    read_array(bytes, at).map(u32::from_le_bytes)
}

pub fn read_i32(bytes: &[u8], at: usize) -> Result<i32> {
    read_array(bytes, at).map(i32::from_le_bytes)
}

pub fn read_f64(bytes: &[u8], at: usize) -> Result<f64> {
    read_array(bytes, at).map(f64::from_le_bytes)
}

pub fn write_u32(bytes: &mut [u8], at: usize, value: u32) -> Result<()> {
    write_array(bytes, at, value.to_le_bytes())
}

pub fn write_i32(bytes: &mut [u8], at: usize, value: i32) -> Result<()> {
    write_array(bytes, at, value.to_le_bytes())
}

pub fn write_f64(bytes: &mut [u8], at: usize, value: f64) -> Result<()> {
    write_array(bytes, at, value.to_le_bytes())
}
