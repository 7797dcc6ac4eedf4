use clap::{Args, Subcommand};
use std::path::PathBuf;

use inputprims_event::DEFAULT_MAX_EVENT_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod inspect;
pub mod synth;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode an event trace and describe every event.
    Inspect(InspectArgs),
    /// Write a synthetic event trace.
    Synth(SynthArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Inspect(args) => inspect::run(args, format),
        Command::Synth(args) => synth::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Trace file to read.
    pub path: PathBuf,
    /// Stop after N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Reject events larger than this many bytes.
    #[arg(
        long,
        value_name = "BYTES",
        env = "INPUTPRIMS_MAX_EVENT_SIZE",
        default_value_t = DEFAULT_MAX_EVENT_SIZE
    )]
    pub max_event_size: usize,
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Trace file to create (overwritten if present).
    pub path: PathBuf,
    /// Device id stamped on every event.
    #[arg(long, default_value = "1")]
    pub device: u32,
    /// Number of events to write.
    #[arg(long, default_value = "16")]
    pub events: usize,
    /// Write an action event every N events (0 disables actions).
    #[arg(long, default_value = "4")]
    pub action_every: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
