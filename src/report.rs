// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Loader for GPU profiler JSON reports.
//!
//! A report carries a `kernel_statistics` array with one entry per kernel and
//! an optional `profiling_summary` object. Records are kept sorted by
//! percentage, largest first, and are read-only once loaded.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

/// Errors from loading a profiler report.
#[derive(Debug)]
pub enum ReportError {
    /// The report file could not be read.
    Io(std::io::Error),
    /// The report is not valid JSON or has malformed entries.
    Json(serde_json::Error),
    /// The `kernel_statistics` key is absent.
    MissingKernelStatistics,
    /// `kernel_statistics` is present but empty.
    NoKernels,
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "failed to read profiling results: {e}"),
            ReportError::Json(e) => write!(f, "invalid JSON format: {e}"),
            ReportError::MissingKernelStatistics => {
                write!(f, "invalid JSON format: missing 'kernel_statistics'")
            }
            ReportError::NoKernels => write!(f, "no kernel statistics found in the data"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            ReportError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e)
    }
}

/// Aggregate statistics for a single GPU kernel.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KernelRecord {
    pub name: String,
    /// Share of total GPU time, in percent.
    pub percentage: f64,
    /// Average execution time per invocation.
    #[serde(default)]
    pub avg_time_ms: Option<f64>,
}

impl KernelRecord {
    pub fn new(name: &str, percentage: f64) -> Self {
        Self {
            name: name.to_string(),
            percentage,
            avg_time_ms: None,
        }
    }
}

/// Frame-level summary emitted alongside the kernel statistics.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProfilingSummary {
    pub total_frames: Option<u64>,
    pub avg_frame_time_ms: Option<f64>,
}

impl ProfilingSummary {
    /// Frame time used when the summary does not carry one (60 FPS).
    pub const DEFAULT_FRAME_TIME_MS: f64 = 16.67;

    /// True when the summary carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.total_frames.is_none() && self.avg_frame_time_ms.is_none()
    }

    /// Estimated frames per second from the average frame time.
    pub fn estimated_fps(&self) -> f64 {
        let frame_time = match self.avg_frame_time_ms {
            Some(ms) if ms > 0.0 => ms,
            _ => Self::DEFAULT_FRAME_TIME_MS,
        };
        1000.0 / frame_time
    }
}

#[derive(Deserialize)]
struct RawReport {
    kernel_statistics: Option<Vec<KernelRecord>>,
    #[serde(default)]
    profiling_summary: Option<ProfilingSummary>,
}

/// Kernel statistics of one profiling run, sorted by percentage descending.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    kernels: Vec<KernelRecord>,
    summary: Option<ProfilingSummary>,
}

impl Report {
    /// Builds a report from raw records. Records are stably sorted by
    /// percentage descending and duplicate names keep their first entry.
    pub fn new(
        records: Vec<KernelRecord>,
        summary: Option<ProfilingSummary>,
    ) -> Result<Self, ReportError> {
        if records.is_empty() {
            return Err(ReportError::NoKernels);
        }

        let mut seen = HashSet::new();
        let mut kernels = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.name.clone()) {
                warn!("Dropping duplicate kernel entry '{}'", record.name);
                continue;
            }
            kernels.push(record);
        }
        kernels.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        Ok(Self {
            kernels,
            summary: summary.filter(|s| !s.is_empty()),
        })
    }

    /// Parses a report from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let raw: RawReport = serde_json::from_str(json)?;
        let kernels = raw
            .kernel_statistics
            .ok_or(ReportError::MissingKernelStatistics)?;
        Report::new(kernels, raw.profiling_summary)
    }

    /// Reads and parses a report file.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = fs::read_to_string(path)?;
        Report::from_json(&contents)
    }

    pub fn kernels(&self) -> &[KernelRecord] {
        &self.kernels
    }

    pub fn summary(&self) -> Option<&ProfilingSummary> {
        self.summary.as_ref()
    }

    /// Looks up a kernel by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&KernelRecord> {
        self.kernels.iter().find(|k| k.name == name)
    }

    /// Sum of all kernel percentages.
    pub fn total_percentage(&self) -> f64 {
        self.kernels.iter().map(|k| k.percentage).sum()
    }

    /// Kernel with the largest share.
    pub fn top_kernel(&self) -> &KernelRecord {
        // Construction rejects empty reports.
        &self.kernels[0]
    }
}
