// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

pub mod chart;
pub mod cli;
pub mod color;
pub mod config;
pub mod display;
pub mod names;
pub mod normalize;
pub mod report;
pub mod summary;

pub use color::{resolve_colors, ChartSlot, Color};
pub use config::{ChartConfig, ChartStyle, ConfigError};
pub use display::{prepare, resolve, DisplayDirective, DisplayError, DisplaySlot, Selection};
pub use names::NameMapper;
pub use normalize::normalize;
pub use report::{KernelRecord, ProfilingSummary, Report, ReportError};

use clap::ValueEnum;

pub const APP: &str = "kchart";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ChartKind {
    /// Donut chart with external labels.
    #[default]
    Pie,
    /// Horizontal bar chart, largest share on top.
    Bar,
}

impl ChartKind {
    /// File name prefix for rendered charts.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ChartKind::Pie => "academic_gpu_chart",
            ChartKind::Bar => "academic_gpu_bar_chart",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChartKind::Pie => write!(f, "pie"),
            ChartKind::Bar => write!(f, "bar"),
        }
    }
}
