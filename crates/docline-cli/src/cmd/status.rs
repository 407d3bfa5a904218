//! `docline status` - compare input against existing parts

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use docline_core::progress::fmt_num;
use docline_core::{Inspection, PipelineConfig, part_file_name};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to the job's TOML config
    pub config: PathBuf,
}

impl StatusArgs {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        Config::from_file(&self.config)?.into_pipeline_config()
    }
}

pub fn run(config: &PipelineConfig) -> Result<()> {
    let inspection = docline_core::inspect(config)?;
    eprintln!("\n{}", render(config, &inspection));
    Ok(())
}

fn render(config: &PipelineConfig, inspection: &Inspection) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Item").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Input directory",
        &config.input_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Output directory",
        &config.output_dir.display().to_string(),
    ]);
    table.add_row(vec!["Discovered", &fmt_num(inspection.discovered)]);
    table.add_row(vec!["Processed", &fmt_num(inspection.processed)]);

    let pending = Cell::new(fmt_num(inspection.pending));
    table.add_row(vec![
        Cell::new("Pending"),
        if inspection.pending > 0 {
            pending.fg(Color::Yellow)
        } else {
            pending.fg(Color::Green)
        },
    ]);
    table.add_row(vec!["Parts", &inspection.parts.to_string()]);
    table.add_row(vec!["Next part", &part_file_name(inspection.next_part)]);

    let scan = &inspection.scan;
    if scan.malformed > 0 || scan.truncated > 0 {
        table.add_row(vec![
            Cell::new("Damaged"),
            Cell::new(format!(
                "{} malformed lines, {} truncated parts",
                scan.malformed, scan.truncated
            ))
            .fg(Color::Red),
        ]);
    }
    table
}
