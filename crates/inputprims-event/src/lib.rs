//! Self-describing binary input events.
//!
//! Every event starts with a 20-byte header:
//! - A 4-byte type tag ([`FourCC`]) used for dispatch
//! - A 4-byte little-endian total size, header included
//! - A 4-byte device id and an 8-byte timestamp
//!
//! State deltas append a state format, a state offset and a variable blob.
//! Action events reuse that exact prefix and append a 32-byte action block
//! after the blob, so every consumer of state deltas also reads action events.
//!
//! Events are never copied to be interpreted: [`EventRef`] validates the
//! header once, and [`EventRef::reinterpret`] checks the tag before handing
//! out a typed view.

pub mod action;
pub mod codec;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod state;
pub mod tag;
pub mod view;
pub mod writer;

pub use action::{
    create_action_event, encode_action_event, ActionEvent, ActionEventMut, ActionMetadata,
    ActionPhase,
};
#[cfg(feature = "async")]
pub use codec::EventCodec;
pub use codec::{decode_event, encode_event, EventConfig, DEFAULT_MAX_EVENT_SIZE};
pub use error::{EventError, Result};
pub use header::EventHeader;
pub use layout::{ACTION_METADATA_SIZE, HEADER_SIZE, STATE_PREFIX_SIZE};
pub use reader::EventReader;
pub use state::{
    create_state_event, encode_state_event, StateBlob, StateDeltaEvent, StateDeltaEventMut,
};
pub use tag::{FourCC, ACTION, STATE_DELTA, STATE_FULL};
pub use view::{type_tag, EventKind, EventKindMut, EventMut, EventRecord, EventRef};
pub use writer::EventWriter;
