//! `docline run` - ingest pending documents into numbered parts

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use docline_core::progress::fmt_num;
use docline_core::{PipelineConfig, ProgressContext};
use docline_pdf::PdfProcessor;

use crate::config::Config;

/// Exit status after a SIGINT/SIGTERM stop
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the job's TOML config
    pub config: PathBuf,

    /// Number of parallel workers (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Files per output part (overrides config)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl RunArgs {
    /// Config file with command-line overrides applied
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = Config::from_file(&self.config)?;
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        config.into_pipeline_config()
    }
}

pub fn run(config: &PipelineConfig, progress: &ProgressContext) -> Result<ExitCode> {
    docline_core::install_signal_handlers().context("Failed to install signal handlers")?;

    let summary = docline_core::run(config, &PdfProcessor::new(), progress)?;

    // Summary lines are logged at info, which a TTY run filters out
    if progress.is_tty() {
        progress.println(format!(
            "{} records written to {} parts, {} failed, {} still pending",
            fmt_num(summary.records_written),
            summary.chunks_written,
            fmt_num(summary.failed_items),
            fmt_num(summary.pending.saturating_sub(summary.records_written)),
        ));
    }

    if summary.interrupted {
        log::warn!("Interrupted; rerun the same command to resume");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("job.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            config: write_config(
                dir.path(),
                "input_dir = \"in\"\noutput_dir = \"out\"\nworkers = 2\nchunk_size = 10\n",
            ),
            workers: Some(6),
            chunk_size: None,
        };

        let config = args.pipeline_config().unwrap();
        assert_eq!(config.workers, 6);
        assert_eq!(config.chunk_size.get(), 10);
    }

    #[test]
    fn zero_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            config: write_config(dir.path(), "input_dir = \"in\"\noutput_dir = \"out\"\n"),
            workers: None,
            chunk_size: Some(0),
        };
        assert!(args.pipeline_config().is_err());
    }
}
