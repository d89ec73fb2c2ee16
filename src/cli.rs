// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::path::PathBuf;

use clap::Parser;

use crate::ChartKind;

/// kchart: GPU kernel time distribution charts
///
/// Reads a profiler report with per-kernel time percentages and renders the
/// distribution as a donut or horizontal bar chart. A JSON configuration can
/// select, merge, relabel and color kernels through `manual_display`.
#[derive(Debug, Parser)]
#[command(author, version, verbatim_doc_comment)]
pub struct Cli {
    /// Path to the GPU profiling results JSON file.
    pub json_file: PathBuf,

    /// Display configuration JSON file.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory. Defaults to the directory of the results file.
    #[clap(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Chart type to render.
    #[clap(long, value_enum, default_value_t = ChartKind::Pie)]
    pub chart: ChartKind,

    /// Print the available kernels and exit.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub show_kernels: bool,

    /// Save the chart without printing a preview.
    #[clap(short = 'n', long, action = clap::ArgAction::SetTrue)]
    pub no_display: bool,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the loaded configuration and trace every selection step.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub debug: bool,
}

impl Cli {
    /// Log level implied by `--verbose` and `--debug`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            return log::LevelFilter::Trace;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Directory charts are written to.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match self.json_file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}
