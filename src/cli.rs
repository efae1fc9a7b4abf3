//! Command line arguments.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use steply_lookup::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "steply-lookup",
    version,
    about = "Debounced record lookup with stale-response discard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Selector and provider context (YAML, or JSON by extension).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a scripted interaction on a virtual clock and print the outcome.
    Replay(ReplayArgs),

    /// Drive the lookup field from the terminal.
    Interactive(InteractiveArgs),
}

#[derive(Parser)]
pub struct ReplayArgs {
    /// Record store file.
    #[arg(long = "records", value_name = "FILE")]
    pub records: PathBuf,

    /// Timed input script.
    #[arg(long = "script", value_name = "FILE")]
    pub script: PathBuf,
}

#[derive(Parser)]
pub struct InteractiveArgs {
    /// Record store file.
    #[arg(long = "records", value_name = "FILE")]
    pub records: PathBuf,

    /// Preselect this record id; its label is loaded on start.
    #[arg(long = "selected-id", value_name = "ID")]
    pub selected_id: Option<String>,
}
