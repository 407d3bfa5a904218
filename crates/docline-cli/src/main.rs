//! docline - resumable PDF ingestion into gzip JSONL parts
//!
//! Reads every document in an input directory, extracts its text, and
//! appends the results to `part_NNNNN.jsonl.gz` files. Rerunning the same
//! job skips documents already present in the output.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use docline_core::{ProgressContext, Verbosity};

mod cmd;
mod config;

/// Exit status for an unusable config file or override
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "docline")]
#[command(about = "Resumable chunked document ingestion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Process pending documents, resuming from existing parts
    Run(cmd::run::RunArgs),
    /// Show processed/pending counts without writing anything
    Status(cmd::status::StatusArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     warn unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let verbosity = match (cli.debug, progress.is_tty()) {
        (true, _) => Verbosity::Debug,
        (false, true) => Verbosity::Quiet,
        (false, false) => Verbosity::Normal,
    };
    let multi = progress.is_tty().then(|| progress.multi());
    docline_core::init_logging(verbosity, multi);

    let result = match cli.command {
        Command::Run(args) => match args.pipeline_config() {
            Ok(config) => cmd::run::run(&config, &progress),
            Err(e) => return config_error(e),
        },
        Command::Status(args) => match args.pipeline_config() {
            Ok(config) => cmd::status::run(&config).map(|()| ExitCode::SUCCESS),
            Err(e) => return config_error(e),
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn config_error(e: anyhow::Error) -> ExitCode {
    log::error!("{e:#}");
    ExitCode::from(EXIT_CONFIG)
}
