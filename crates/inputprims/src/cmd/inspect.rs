use std::fs::File;
use std::io::BufReader;

use inputprims_event::{EventConfig, EventReader};
use inputprims_queue::{EventQueue, QueueConfig};

use crate::cmd::InspectArgs;
use crate::exit::{event_error, io_error, queue_error, CliError, CliResult, SUCCESS};
use crate::output::{print_events, print_raw, EventOutput, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.path)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    let mut reader = EventReader::with_config(
        BufReader::new(file),
        EventConfig {
            max_event_size: args.max_event_size,
        },
    );
    // Any event the reader accepts must fit an empty queue.
    let defaults = QueueConfig::default();
    let mut queue = EventQueue::with_config(QueueConfig {
        capacity_bytes: defaults.capacity_bytes.max(args.max_event_size),
        max_event_size: args.max_event_size,
        ..defaults
    });

    let limit = args.count.unwrap_or(usize::MAX);
    let mut rows = Vec::new();
    let mut read = 0usize;
    while read < limit {
        let Some(record) = reader
            .next_event()
            .map_err(|err| event_error("read failed", err))?
        else {
            break;
        };
        read += 1;

        // Drain early instead of letting the queue reject the event.
        let full = queue.len() >= queue.config().max_events
            || record.size_in_bytes() > queue.remaining_capacity();
        if full {
            drain(&mut queue, &mut rows, format)?;
        }
        queue
            .enqueue_record(&record)
            .map_err(|err| queue_error("enqueue failed", err))?;
    }
    drain(&mut queue, &mut rows, format)?;

    tracing::info!(path = %args.path.display(), events = read, "trace inspected");
    print_events(&rows, format);
    Ok(SUCCESS)
}

fn drain(queue: &mut EventQueue, rows: &mut Vec<EventOutput>, format: OutputFormat) -> CliResult<()> {
    let mut index = rows.len();
    let stats = queue.update(|event| -> Result<(), CliError> {
        if let OutputFormat::Raw = format {
            print_raw(event.as_bytes());
        } else {
            let row = EventOutput::from_event(index, event)
                .map_err(|err| event_error(&format!("event {index}"), err))?;
            rows.push(row);
        }
        index += 1;
        Ok(())
    })?;
    tracing::debug!(events = stats.events, bytes = stats.bytes, "batch drained");
    Ok(())
}
