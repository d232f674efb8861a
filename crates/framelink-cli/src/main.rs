use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

/// Framelink frame-exchange manager.
///
/// Loads a frame tree from a JSON document and drives it through a binary
/// control instruction stream, exchanging slot payloads in the peer's
/// wire format.
///
/// EXAMPLES:
///     framelink run master_instructions.bin      Process a stream
///     framelink run stream.bin -d                Trace every record
///     framelink inspect code.json                Print a frame tree
///     framelink encode code.json -o output.bin   Persist a full snapshot
///
/// ENVIRONMENT VARIABLES:
///     FRAMELINK_FRAME     Default frame document path for `run`
///     NO_COLOR            Set to disable colored output
#[derive(Parser)]
#[command(name = "framelink")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a control instruction stream against a frame document
    ///
    /// Splits the stream into records and dispatches them one at a time:
    /// call payloads update the active frame's slots, calls descend into
    /// nested frames, returns climb back out.
    ///
    /// EXAMPLES:
    ///     framelink run stream.bin                    Use ./code.json
    ///     framelink run stream.bin -f tree.json       Explicit document
    ///     framelink run stream.bin -d                 Trace records
    #[command(visible_alias = "r")]
    Run {
        /// Path to the binary instruction stream
        stream: String,
        /// Path to the JSON frame document
        #[arg(long, short = 'f', env = "FRAMELINK_FRAME", default_value = "code.json")]
        frame: String,
        /// Trace every record and dump frame state
        #[arg(long, short = 'd')]
        debug: bool,
    },

    /// Print a frame document's tree
    ///
    /// Renders every frame slot by slot, descending into nested frames.
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to the JSON frame document
        frame: String,
    },

    /// Encode a frame document into full-profile wire bytes
    ///
    /// Writes raw bytes with -o, or a hex dump to stdout without it.
    #[command(visible_alias = "e")]
    Encode {
        /// Path to the JSON frame document
        frame: String,
        /// Write raw bytes to this file instead of hex to stdout
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let config = config::Config::from_env();
    if config.no_color {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            stream,
            frame,
            debug,
        } => commands::run::run(&stream, &frame, debug),
        Commands::Inspect { frame } => commands::inspect::inspect(&frame),
        Commands::Encode { frame, output } => commands::encode::encode(&frame, output.as_deref()),
    }
}
