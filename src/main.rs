// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};

use kchart::chart;
use kchart::cli::Cli;
use kchart::summary;
use kchart::{prepare, ChartConfig, Report, APP};

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let config = ChartConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            if cli.debug {
                debug!("Configuration content: {:#?}", config);
            }
            config
        }
        None => ChartConfig::default(),
    };
    let names = config.name_mapper();

    let report = Report::load(&cli.json_file)
        .with_context(|| format!("failed to load {}", cli.json_file.display()))?;

    let mut out = std::io::stdout().lock();
    if cli.show_kernels {
        summary::format_available_kernels(&mut out, &report, &names)?;
        return Ok(());
    }

    let output_dir = cli.output_dir();
    if cli.output_dir.is_some() {
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("failed to create output directory {}", output_dir.display())
        })?;
    }

    summary::format_profiling_summary(&mut out, &report, &names)?;

    let slots = prepare(report.kernels(), &config.manual_display, &names)?;
    writeln!(out)?;
    summary::format_data_summary(&mut out, &slots)?;
    out.flush()?;

    let path = chart::chart_path(&output_dir, cli.chart, chrono::Local::now());
    chart::render(&path, cli.chart, &slots, &config, report.summary())?;

    if !cli.no_display {
        writeln!(out)?;
        summary::format_preview(&mut out, &slots)?;
    }

    writeln!(
        out,
        "\nAnalysis complete, {} chart saved to: {}",
        cli.chart,
        path.display()
    )?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Off)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    if let Err(e) = simplelog::TermLogger::init(
        cli.log_level(),
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("{}: failed to initialize logging: {}", APP, e);
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
