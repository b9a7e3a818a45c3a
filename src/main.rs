//! Command-line entry point: `clean`, `profile` and `plan`.

use std::io::{self, IsTerminal, Write};

use clap::Parser;
use rust_data_cleaning::envelope::render;
use rust_data_cleaning::logging::{init_logging, LogConfig, LogFormat};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_clean, run_plan, run_profile};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let (rendered, ok) = match &cli.command {
        Command::Clean(args) => {
            let envelope = run_clean(args);
            (render(&envelope, cli.pretty), envelope.is_success())
        }
        Command::Profile(args) => {
            let envelope = run_profile(args);
            (render(&envelope, cli.pretty), envelope.is_success())
        }
        Command::Plan(args) => {
            let envelope = run_plan(args);
            (render(&envelope, cli.pretty), envelope.is_success())
        }
    };

    let exit_code = match rendered {
        Ok(text) => {
            let mut stdout = io::stdout().lock();
            match writeln!(stdout, "{text}") {
                Ok(()) if ok => 0,
                Ok(()) => 1,
                Err(error) => {
                    eprintln!("error: {error}");
                    1
                }
            }
        }
        Err(error) => {
            eprintln!("error: failed to render result: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        use_env_filter: cli.log_level.is_none(),
        with_ansi: io::stderr().is_terminal(),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config
}
