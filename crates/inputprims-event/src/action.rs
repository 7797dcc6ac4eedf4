//! Action events.
//!
//! An action event is a state delta with a fixed 32-byte block appended after
//! the state blob. The state portion captures the control state that caused
//! the phase change; the block says which action, binding and modifier were
//! involved and when the phase started and ended.
//!
//! Action events are produced by action evaluation, never by device capture.
//! Because the prefix is identical to a state delta, any consumer that expects
//! a [`StateDeltaEvent`] can be handed an action event unchanged.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{EventError, Result};
use crate::header::EventHeader;
use crate::layout::{
    self, read_f64, read_i32, write_f64, write_i32, ActionField, STATE_PREFIX_SIZE,
};
use crate::state::{encode_state_kind, StateBlob, StateDeltaEvent, StateDeltaEventMut};
use crate::tag::{FourCC, ACTION};
use crate::view::{EventKind, EventKindMut, EventMut, EventRecord, EventRef};

/// Phase of an action at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ActionPhase {
    Disabled = 0,
    Waiting = 1,
    Started = 2,
    Performed = 3,
    Cancelled = 4,
}

impl ActionPhase {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn name(self) -> &'static str {
        match self {
            ActionPhase::Disabled => "disabled",
            ActionPhase::Waiting => "waiting",
            ActionPhase::Started => "started",
            ActionPhase::Performed => "performed",
            ActionPhase::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<i32> for ActionPhase {
    type Error = EventError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(ActionPhase::Disabled),
            1 => Ok(ActionPhase::Waiting),
            2 => Ok(ActionPhase::Started),
            3 => Ok(ActionPhase::Performed),
            4 => Ok(ActionPhase::Cancelled),
            other => Err(EventError::InvalidPhase(other)),
        }
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The trailing block of an action event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionMetadata {
    pub action_index: i32,
    pub binding_index: i32,
    pub modifier_index: i32,
    pub start_time: f64,
    pub end_time: f64,
    pub phase: ActionPhase,
}

impl ActionMetadata {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_i32_le(self.action_index);
        dst.put_i32_le(self.binding_index);
        dst.put_i32_le(self.modifier_index);
        dst.put_f64_le(self.start_time);
        dst.put_f64_le(self.end_time);
        dst.put_i32_le(self.phase.code());
    }
}

/// Encode an action event into `dst`.
pub fn encode_action_event(
    device_id: u32,
    timestamp: f64,
    blob: &StateBlob<'_>,
    metadata: &ActionMetadata,
    dst: &mut BytesMut,
) -> Result<()> {
    encode_state_kind(ACTION, device_id, timestamp, blob, dst, |dst| metadata.put(dst))
}

/// Build an owned action event.
pub fn create_action_event(
    device_id: u32,
    timestamp: f64,
    blob: StateBlob<'_>,
    metadata: &ActionMetadata,
) -> Result<EventRecord> {
    let mut buf = BytesMut::new();
    encode_action_event(device_id, timestamp, &blob, metadata, &mut buf)?;
    EventRecord::from_bytes(buf.freeze())
}

/// Read-only view of an action event.
#[derive(Debug, Clone, Copy)]
pub struct ActionEvent<'a> {
    state: StateDeltaEvent<'a>,
    action_base: usize,
}

impl<'a> EventKind<'a> for ActionEvent<'a> {
    const TYPE: FourCC = ACTION;

    fn from_event(event: EventRef<'a>) -> Result<Self> {
        let action_base = layout::state_end(ACTION, event.size_in_bytes())?;
        Ok(Self {
            state: StateDeltaEvent::from_event(event)?,
            action_base,
        })
    }
}

impl<'a> ActionEvent<'a> {
    pub fn header(&self) -> EventHeader {
        self.state.header()
    }

    pub fn device_id(&self) -> u32 {
        self.state.device_id()
    }

    pub fn timestamp(&self) -> f64 {
        self.state.timestamp()
    }

    pub fn state_format(&self) -> FourCC {
        self.state.state_format()
    }

    pub fn state_offset(&self) -> u32 {
        self.state.state_offset()
    }

    /// Blob length; the trailing block is not part of it.
    pub fn state_size_in_bytes(&self) -> usize {
        self.state.state_size_in_bytes()
    }

    pub fn state(&self) -> &'a [u8] {
        self.state.state()
    }

    /// The same bytes seen as a plain state delta.
    pub fn as_state_event(&self) -> StateDeltaEvent<'a> {
        self.state
    }

    pub fn into_event(self) -> EventRef<'a> {
        self.state.into_event()
    }

    // `from_event` already required room for the whole trailing block, so
    // these reads only fail if that check and the layout disagree.
    fn read_i32(&self, field: ActionField) -> Result<i32> {
        read_i32(self.bytes(), field.field().at(self.action_base).offset)
    }

    fn read_f64(&self, field: ActionField) -> Result<f64> {
        read_f64(self.bytes(), field.field().at(self.action_base).offset)
    }

    fn bytes(&self) -> &'a [u8] {
        self.state.into_event().as_bytes()
    }

    pub fn action_index(&self) -> Result<i32> {
        self.read_i32(ActionField::ActionIndex)
    }

    pub fn binding_index(&self) -> Result<i32> {
        self.read_i32(ActionField::BindingIndex)
    }

    pub fn modifier_index(&self) -> Result<i32> {
        self.read_i32(ActionField::ModifierIndex)
    }

    pub fn start_time(&self) -> Result<f64> {
        self.read_f64(ActionField::StartTime)
    }

    pub fn end_time(&self) -> Result<f64> {
        self.read_f64(ActionField::EndTime)
    }

    /// Raw phase code, including codes this crate does not know.
    pub fn phase_code(&self) -> Result<i32> {
        self.read_i32(ActionField::Phase)
    }

    pub fn phase(&self) -> Result<ActionPhase> {
        ActionPhase::try_from(self.phase_code()?)
    }

    /// All trailing fields at once.
    pub fn metadata(&self) -> Result<ActionMetadata> {
        Ok(ActionMetadata {
            action_index: self.action_index()?,
            binding_index: self.binding_index()?,
            modifier_index: self.modifier_index()?,
            start_time: self.start_time()?,
            end_time: self.end_time()?,
            phase: self.phase()?,
        })
    }
}

/// Mutable view of an action event.
#[derive(Debug)]
pub struct ActionEventMut<'a> {
    bytes: &'a mut [u8],
    action_base: usize,
}

impl<'a> EventKindMut<'a> for ActionEventMut<'a> {
    const TYPE: FourCC = ACTION;

    fn from_event_mut(event: EventMut<'a>) -> Result<Self> {
        let action_base = layout::state_end(ACTION, event.size_in_bytes())?;
        Ok(Self {
            bytes: event.into_bytes(),
            action_base,
        })
    }
}

impl<'a> ActionEventMut<'a> {
    /// Reborrow as a read-only view.
    pub fn as_action_event(&self) -> Result<ActionEvent<'_>> {
        EventRef::parse(&*self.bytes)?.reinterpret()
    }

    /// Reborrow the state portion as a mutable state delta.
    pub fn as_state_event_mut(&mut self) -> Result<StateDeltaEventMut<'_>> {
        EventMut::parse(&mut *self.bytes)?.reinterpret_mut()
    }

    pub fn state_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[STATE_PREFIX_SIZE..self.action_base]
    }

    fn write_i32(&mut self, field: ActionField, value: i32) -> Result<()> {
        write_i32(self.bytes, field.field().at(self.action_base).offset, value)
    }

    fn write_f64(&mut self, field: ActionField, value: f64) -> Result<()> {
        write_f64(self.bytes, field.field().at(self.action_base).offset, value)
    }

    pub fn set_action_index(&mut self, value: i32) -> Result<()> {
        self.write_i32(ActionField::ActionIndex, value)
    }

    pub fn set_binding_index(&mut self, value: i32) -> Result<()> {
        self.write_i32(ActionField::BindingIndex, value)
    }

    pub fn set_modifier_index(&mut self, value: i32) -> Result<()> {
        self.write_i32(ActionField::ModifierIndex, value)
    }

    pub fn set_start_time(&mut self, value: f64) -> Result<()> {
        self.write_f64(ActionField::StartTime, value)
    }

    pub fn set_end_time(&mut self, value: f64) -> Result<()> {
        self.write_f64(ActionField::EndTime, value)
    }

    pub fn set_phase(&mut self, phase: ActionPhase) -> Result<()> {
        self.set_phase_code(phase.code())
    }

    pub fn set_phase_code(&mut self, code: i32) -> Result<()> {
        self.write_i32(ActionField::Phase, code)
    }

    pub fn set_metadata(&mut self, metadata: &ActionMetadata) -> Result<()> {
        self.set_action_index(metadata.action_index)?;
        self.set_binding_index(metadata.binding_index)?;
        self.set_modifier_index(metadata.modifier_index)?;
        self.set_start_time(metadata.start_time)?;
        self.set_end_time(metadata.end_time)?;
        self.set_phase(metadata.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ACTION_METADATA_SIZE, HEADER_SIZE};
    use crate::tag::STATE_DELTA;

    const MOUSE: FourCC = FourCC::new(b'M', b'O', b'U', b'S');

    fn performed() -> ActionMetadata {
        ActionMetadata {
            action_index: 2,
            binding_index: 0,
            modifier_index: -1,
            start_time: 1.0,
            end_time: 1.5,
            phase: ActionPhase::Performed,
        }
    }

    #[test]
    fn concrete_action_event() {
        let blob = [0xAA, 0xBB];
        let record = create_action_event(7, 1.5, StateBlob::new(MOUSE, &blob), &performed()).unwrap();

        assert_eq!(record.type_tag(), ActionEvent::TYPE);
        assert_eq!(record.size_in_bytes(), HEADER_SIZE + 8 + 2 + 32);

        let action: ActionEvent<'_> = record.as_event().reinterpret().unwrap();
        assert_eq!(action.device_id(), 7);
        assert_eq!(action.timestamp(), 1.5);
        assert_eq!(action.state_size_in_bytes(), 2);
        assert_eq!(action.state(), &blob);
        assert_eq!(action.action_index().unwrap(), 2);
        assert_eq!(action.binding_index().unwrap(), 0);
        assert_eq!(action.modifier_index().unwrap(), -1);
        assert_eq!(action.start_time().unwrap(), 1.0);
        assert_eq!(action.end_time().unwrap(), 1.5);
        assert_eq!(action.phase().unwrap(), ActionPhase::Performed);
        assert_eq!(action.metadata().unwrap(), performed());
    }

    #[test]
    fn overlay_matches_state_delta_view() {
        for len in [0usize, 1, 7, 32, 33, 200] {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let blob = StateBlob::new(MOUSE, &data).with_offset(len as u32 * 3);
            let record = create_action_event(1, 0.5, blob, &performed()).unwrap();

            let action: ActionEvent<'_> = record.as_event().reinterpret().unwrap();
            let delta: StateDeltaEvent<'_> = record.as_event().reinterpret().unwrap();

            assert_eq!(delta.state_format(), action.state_format());
            assert_eq!(delta.state_offset(), action.state_offset());
            assert_eq!(delta.state(), action.state());
            assert_eq!(delta.state(), data.as_slice());
            assert_eq!(
                &record.as_bytes()[..STATE_PREFIX_SIZE],
                &action.as_state_event().into_event().as_bytes()[..STATE_PREFIX_SIZE]
            );
        }
    }

    #[test]
    fn trailing_fields_survive_blob_writes() {
        for len in [0usize, 1, 4, 31, 64] {
            let zeros = vec![0u8; len];
            let mut buf = BytesMut::new();
            let blank = ActionMetadata {
                action_index: 0,
                binding_index: 0,
                modifier_index: 0,
                start_time: 0.0,
                end_time: 0.0,
                phase: ActionPhase::Disabled,
            };
            encode_action_event(5, 2.0, &StateBlob::new(MOUSE, &zeros), &blank, &mut buf).unwrap();

            let mut action: ActionEventMut<'_> =
                EventMut::parse(&mut buf).unwrap().reinterpret_mut().unwrap();
            action.set_action_index(0x1111_1111).unwrap();
            action.set_binding_index(0x2222_2222).unwrap();
            action.set_modifier_index(-0x3333_3333).unwrap();
            action.set_start_time(44.25).unwrap();
            action.set_end_time(-55.5).unwrap();
            action.set_phase_code(0x6666_6666).unwrap();
            action.state_mut().fill(0xEE);

            let view: ActionEvent<'_> = EventRef::parse(&buf).unwrap().reinterpret().unwrap();
            assert_eq!(view.state_size_in_bytes(), len);
            assert!(view.state().iter().all(|b| *b == 0xEE));
            assert_eq!(view.action_index().unwrap(), 0x1111_1111);
            assert_eq!(view.binding_index().unwrap(), 0x2222_2222);
            assert_eq!(view.modifier_index().unwrap(), -0x3333_3333);
            assert_eq!(view.start_time().unwrap(), 44.25);
            assert_eq!(view.end_time().unwrap(), -55.5);
            assert_eq!(view.phase_code().unwrap(), 0x6666_6666);
            assert!(matches!(view.phase(), Err(EventError::InvalidPhase(0x6666_6666))));
        }
    }

    #[test]
    fn state_delta_tag_is_not_an_action() {
        let record = crate::state::create_state_event(1, 0.0, StateBlob::new(MOUSE, &[0; 40])).unwrap();
        let err = record
            .as_event()
            .reinterpret::<ActionEvent<'_>>()
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::TypeMismatch {
                expected: ACTION,
                actual: STATE_DELTA
            }
        ));
        assert!(!record.as_event().is::<ActionEvent<'_>>());
        assert!(record.as_event().is::<StateDeltaEvent<'_>>());
    }

    #[test]
    fn action_too_small_for_trailing_block() {
        let size = STATE_PREFIX_SIZE + ACTION_METADATA_SIZE - 1;
        let mut buf = vec![0u8; size];
        EventHeader::new(ACTION, size, 1, 0.0)
            .unwrap()
            .write(&mut buf)
            .unwrap();

        let event = EventRef::parse(&buf).unwrap();
        let err = event.reinterpret::<ActionEvent<'_>>().unwrap_err();
        assert!(matches!(
            err,
            EventError::SizeUnderflow {
                size: 59,
                required: 60
            }
        ));
        // The overlay view must not hand out the short trailing block as state.
        assert!(event.reinterpret::<StateDeltaEvent<'_>>().is_err());
    }

    #[test]
    fn accessors_succeed_on_smallest_action() {
        let record = create_action_event(1, 0.0, StateBlob::new(MOUSE, b""), &performed()).unwrap();
        assert_eq!(record.size_in_bytes(), STATE_PREFIX_SIZE + ACTION_METADATA_SIZE);

        let view: ActionEvent<'_> = record.as_event().reinterpret().unwrap();
        assert_eq!(view.metadata().unwrap(), performed());
        assert_eq!(view.phase_code().unwrap(), ActionPhase::Performed.code());
    }

    #[test]
    fn layout_reader_rejects_truncated_trailing_field() {
        let record = create_action_event(1, 0.0, StateBlob::new(MOUSE, b"xy"), &performed()).unwrap();
        let bytes = record.as_bytes();
        let base = layout::state_end(ACTION, bytes.len()).unwrap();
        let phase = ActionField::Phase.field().at(base);

        let err = read_i32(&bytes[..bytes.len() - 1], phase.offset).unwrap_err();
        assert!(matches!(err, EventError::OutOfBounds { width: 4, .. }));
    }

    #[test]
    fn mutable_state_view_over_action() {
        let mut buf = BytesMut::new();
        encode_action_event(1, 0.0, &StateBlob::new(MOUSE, &[1, 2, 3]), &performed(), &mut buf).unwrap();

        let mut action: ActionEventMut<'_> = EventMut::parse(&mut buf).unwrap().reinterpret_mut().unwrap();
        {
            let mut delta = action.as_state_event_mut().unwrap();
            assert_eq!(delta.state_size_in_bytes(), 3);
            delta.state_mut().copy_from_slice(&[7, 7, 7]);
        }
        assert_eq!(action.as_action_event().unwrap().metadata().unwrap(), performed());
        assert_eq!(action.as_action_event().unwrap().state(), &[7, 7, 7]);
    }

    #[test]
    fn phase_codes() {
        assert_eq!(ActionPhase::try_from(3).unwrap(), ActionPhase::Performed);
        assert!(ActionPhase::try_from(-1).is_err());
        assert_eq!(ActionPhase::Cancelled.to_string(), "cancelled");
    }
}
