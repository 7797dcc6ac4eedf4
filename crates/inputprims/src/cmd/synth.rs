use std::fs::File;
use std::io::BufWriter;

use inputprims_event::{
    create_action_event, create_state_event, ActionMetadata, ActionPhase, EventWriter, FourCC,
    StateBlob,
};

use crate::cmd::SynthArgs;
use crate::exit::{event_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_synth_summary, OutputFormat};

/// Format tag of the synthetic gamepad state.
const SYNTH_FORMAT: FourCC = FourCC::new(b'G', b'P', b'A', b'D');

/// Seconds between synthetic samples (120 Hz).
const SAMPLE_INTERVAL: f64 = 1.0 / 120.0;

const PHASES: [ActionPhase; 3] = [
    ActionPhase::Started,
    ActionPhase::Performed,
    ActionPhase::Cancelled,
];

pub fn run(args: SynthArgs, format: OutputFormat) -> CliResult<i32> {
    if args.events == 0 {
        return Err(CliError::new(USAGE, "--events must be greater than zero"));
    }

    let file = File::create(&args.path)
        .map_err(|err| io_error(&format!("failed creating {}", args.path.display()), err))?;
    let mut writer = EventWriter::new(BufWriter::new(file));

    let mut actions = 0usize;
    let mut bytes = 0usize;
    for i in 0..args.events {
        let timestamp = i as f64 * SAMPLE_INTERVAL;
        let state = sample_state(i);
        // Offsets walk through an 8-byte device state block.
        let blob = StateBlob::new(SYNTH_FORMAT, &state).with_offset((i % 4) as u32 * 2);

        let encoded = if args.action_every > 0 && (i + 1) % args.action_every == 0 {
            let metadata = ActionMetadata {
                action_index: (actions % 8) as i32,
                binding_index: 0,
                modifier_index: -1,
                start_time: timestamp - SAMPLE_INTERVAL,
                end_time: timestamp,
                phase: PHASES[actions % PHASES.len()],
            };
            actions += 1;
            create_action_event(args.device, timestamp, blob, &metadata)
        } else {
            create_state_event(args.device, timestamp, blob)
        };
        let record = encoded.map_err(|err| event_error("encode failed", err))?;

        writer
            .write_record(&record)
            .map_err(|err| event_error("write failed", err))?;
        bytes += record.size_in_bytes();
    }
    writer
        .flush()
        .map_err(|err| event_error("flush failed", err))?;

    tracing::info!(
        path = %args.path.display(),
        events = args.events,
        actions,
        bytes,
        "trace written"
    );
    print_synth_summary(&args.path, args.events, actions, bytes, format);
    Ok(SUCCESS)
}

fn sample_state(i: usize) -> [u8; 2] {
    (i as u16).to_le_bytes()
}
