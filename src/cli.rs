//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rust-data-cleaning",
    version,
    about = "Apply declarative cleaning plans to tabular files and profile them",
    long_about = "Apply declarative cleaning plans to tabular files and profile them.\n\n\
                  Reads and writes CSV, JSON and Parquet (and Excel with the `excel` feature).\n\
                  Results are printed to stdout as JSON; logs go to stderr."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level for this tool (RUST_LOG is used when omitted).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Indent the JSON printed to stdout.
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a file, apply a cleaning plan and save the result.
    Clean(CleanArgs),

    /// Load a file and print its statistical profile.
    Profile(InputArgs),

    /// Load a file and print a suggested cleaning plan for it.
    Plan(InputArgs),
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Input file; the format follows the extension.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; unknown extensions are written as CSV with `.csv` appended.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Plan file path, or an inline JSON array of steps.
    #[arg(value_name = "PLAN")]
    pub plan: String,
}

#[derive(Parser)]
pub struct InputArgs {
    /// Input file; the format follows the extension.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
