use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use inputprims_event::tag::tag_name;
use inputprims_event::{ActionEvent, EventError, EventRef, StateDeltaEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EventOutput {
    pub index: usize,
    pub type_tag: String,
    pub kind: &'static str,
    pub size_in_bytes: usize,
    pub device_id: u32,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionOutput>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StateOutput {
    pub format: String,
    pub offset: u32,
    pub size_in_bytes: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActionOutput {
    pub action_index: i32,
    pub binding_index: i32,
    pub modifier_index: i32,
    pub start_time: f64,
    pub end_time: f64,
    pub phase: String,
    pub phase_code: i32,
}

impl EventOutput {
    /// Describe one event. Unknown tags only get their header fields.
    pub fn from_event(index: usize, event: EventRef<'_>) -> Result<Self, EventError> {
        let mut out = Self {
            index,
            type_tag: event.type_tag().to_string(),
            kind: tag_name(event.type_tag()),
            size_in_bytes: event.size_in_bytes(),
            device_id: event.device_id(),
            timestamp: event.timestamp(),
            state: None,
            action: None,
        };

        if event.is::<StateDeltaEvent<'_>>() {
            let state: StateDeltaEvent<'_> = event.reinterpret()?;
            out.state = Some(StateOutput {
                format: state.state_format().to_string(),
                offset: state.state_offset(),
                size_in_bytes: state.state_size_in_bytes(),
            });
        }

        if event.is::<ActionEvent<'_>>() {
            let action: ActionEvent<'_> = event.reinterpret()?;
            let phase_code = action.phase_code()?;
            let phase = match action.phase() {
                Ok(phase) => phase.name().to_string(),
                Err(EventError::InvalidPhase(code)) => format!("unknown({code})"),
                Err(err) => return Err(err),
            };
            out.action = Some(ActionOutput {
                action_index: action.action_index()?,
                binding_index: action.binding_index()?,
                modifier_index: action.modifier_index()?,
                start_time: action.start_time()?,
                end_time: action.end_time()?,
                phase,
                phase_code,
            });
        }

        Ok(out)
    }
}

pub fn print_events(events: &[EventOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for event in events {
                println!(
                    "{}",
                    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "#", "TAG", "SIZE", "DEVICE", "TIME", "FORMAT", "STATE", "PHASE",
                ]);
            for event in events {
                table.add_row(vec![
                    event.index.to_string(),
                    event.type_tag.clone(),
                    event.size_in_bytes.to_string(),
                    event.device_id.to_string(),
                    format!("{:.6}", event.timestamp),
                    event
                        .state
                        .as_ref()
                        .map(|s| s.format.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    event
                        .state
                        .as_ref()
                        .map(|s| s.size_in_bytes.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    event
                        .action
                        .as_ref()
                        .map(|a| a.phase.clone())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for event in events {
                println!("{}", pretty_line(event));
            }
        }
        // Raw bytes are written while draining, nothing left to print.
        OutputFormat::Raw => {}
    }
}

fn pretty_line(event: &EventOutput) -> String {
    let mut line = format!(
        "#{} {} ({}) size={} device={} t={:.6}",
        event.index,
        event.type_tag,
        event.kind,
        event.size_in_bytes,
        event.device_id,
        event.timestamp
    );
    if let Some(state) = &event.state {
        line.push_str(&format!(
            " format={} offset={} state={}",
            state.format, state.offset, state.size_in_bytes
        ));
    }
    if let Some(action) = &event.action {
        line.push_str(&format!(
            " action={} binding={} modifier={} phase={} start={:.6} end={:.6}",
            action.action_index,
            action.binding_index,
            action.modifier_index,
            action.phase,
            action.start_time,
            action.end_time
        ));
    }
    line
}

#[derive(Serialize)]
struct SynthOutput<'a> {
    path: &'a str,
    events: usize,
    actions: usize,
    bytes: usize,
}

pub fn print_synth_summary(path: &Path, events: usize, actions: usize, bytes: usize, format: OutputFormat) {
    let path = path.display().to_string();
    match format {
        OutputFormat::Json => {
            let out = SynthOutput {
                path: &path,
                events,
                actions,
                bytes,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "EVENTS", "ACTIONS", "BYTES"])
                .add_row(vec![
                    path,
                    events.to_string(),
                    actions.to_string(),
                    bytes.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("wrote {events} events ({actions} actions, {bytes} bytes) to {path}");
        }
        OutputFormat::Raw => println!("{path}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputprims_event::{
        create_action_event, create_state_event, ActionMetadata, ActionPhase, FourCC, StateBlob,
    };

    const GPAD: FourCC = FourCC::new(b'G', b'P', b'A', b'D');

    #[test]
    fn describes_state_delta() {
        let record = create_state_event(3, 1.5, StateBlob::new(GPAD, b"abcd").with_offset(8)).unwrap();
        let out = EventOutput::from_event(0, record.as_event()).unwrap();

        assert_eq!(out.type_tag, "DLTA");
        assert_eq!(out.kind, "STATE_DELTA");
        assert_eq!(out.size_in_bytes, 32);
        let state = out.state.unwrap();
        assert_eq!(state.format, "GPAD");
        assert_eq!(state.offset, 8);
        assert_eq!(state.size_in_bytes, 4);
        assert!(out.action.is_none());
    }

    #[test]
    fn describes_action_with_state_prefix() {
        let metadata = ActionMetadata {
            action_index: 2,
            binding_index: 0,
            modifier_index: -1,
            start_time: 1.0,
            end_time: 1.25,
            phase: ActionPhase::Performed,
        };
        let record = create_action_event(1, 1.25, StateBlob::new(GPAD, b"xy"), &metadata).unwrap();
        let out = EventOutput::from_event(7, record.as_event()).unwrap();

        assert_eq!(out.index, 7);
        assert_eq!(out.kind, "ACTION");
        assert_eq!(out.state.as_ref().unwrap().size_in_bytes, 2);
        let action = out.action.unwrap();
        assert_eq!(action.phase, "performed");
        assert_eq!(action.phase_code, 3);
        assert_eq!(action.modifier_index, -1);
    }

    #[test]
    fn unknown_phase_is_reported_not_rejected() {
        let metadata = ActionMetadata {
            action_index: 0,
            binding_index: 0,
            modifier_index: 0,
            start_time: 0.0,
            end_time: 0.0,
            phase: ActionPhase::Waiting,
        };
        let record = create_action_event(1, 0.0, StateBlob::new(GPAD, b""), &metadata).unwrap();
        let mut bytes = record.as_bytes().to_vec();
        let phase_at = bytes.len() - 4;
        bytes[phase_at..].copy_from_slice(&9i32.to_le_bytes());
        let event = EventRef::parse(&bytes).unwrap();

        let out = EventOutput::from_event(0, event).unwrap();
        assert_eq!(out.action.unwrap().phase, "unknown(9)");
    }

    #[test]
    fn json_skips_absent_sections() {
        let mut bytes = create_state_event(1, 0.0, StateBlob::new(GPAD, b""))
            .unwrap()
            .as_bytes()
            .to_vec();
        bytes[0..4].copy_from_slice(&FourCC::new(b'W', b'H', b'A', b'T').code().to_le_bytes());
        let out = EventOutput::from_event(0, EventRef::parse(&bytes).unwrap()).unwrap();

        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"kind\":\"UNKNOWN\""));
        assert!(!json.contains("\"state\""));
        assert!(!json.contains("\"action\""));
    }
}
