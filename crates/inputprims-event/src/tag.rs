//! Four-character type codes.
//!
//! Every event starts with a [`FourCC`] naming its kind. Codes pack four ASCII
//! characters with the first character in the most significant byte, so
//! `'ACTN'` is `0x4143544E`. On the wire the packed `u32` is little-endian like
//! every other field.

use std::fmt;

/// A four-character code used for event dispatch and state formats.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FourCC(u32);

impl FourCC {
    /// Pack four characters into a code.
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((c as u32) << 8) | (d as u32))
    }

    /// Pack a 4-byte character array into a code.
    pub const fn from_bytes(chars: [u8; 4]) -> Self {
        Self::new(chars[0], chars[1], chars[2], chars[3])
    }

    /// Wrap an already packed code.
    pub const fn from_code(code: u32) -> Self {
        Self(code)
    }

    /// The packed numeric code.
    pub const fn code(self) -> u32 {
        self.0
    }

    /// The four characters, first character first.
    pub const fn to_chars(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for FourCC {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl From<FourCC> for u32 {
    fn from(tag: FourCC) -> Self {
        tag.0
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.to_chars() {
            if ch.is_ascii_graphic() || ch == b' ' {
                write!(f, "{}", ch as char)?;
            } else {
                write!(f, "\\x{ch:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC('{self}' = {:#010x})", self.0)
    }
}

/// Partial device state: a blob covering part of a device's state layout.
pub const STATE_DELTA: FourCC = FourCC::new(b'D', b'L', b'T', b'A');

/// Action phase change carrying the state delta that triggered it.
pub const ACTION: FourCC = FourCC::new(b'A', b'C', b'T', b'N');

/// Full device state. Reserved; no constructor in this crate produces it.
pub const STATE_FULL: FourCC = FourCC::new(b'S', b'T', b'A', b'T');

/// Returns a human-readable name for an event tag.
pub fn tag_name(tag: FourCC) -> &'static str {
    match tag {
        STATE_DELTA => "STATE_DELTA",
        ACTION => "ACTION",
        STATE_FULL => "STATE_FULL",
        _ => "UNKNOWN",
    }
}

/// Returns true if the tag names an event kind reserved by this crate.
pub fn is_known(tag: FourCC) -> bool {
    matches!(tag, STATE_DELTA | ACTION | STATE_FULL)
}
