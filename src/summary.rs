// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Console reports.

use std::io::Write;

use anyhow::Result;

use crate::color::ChartSlot;
use crate::names::NameMapper;
use crate::report::Report;

/// Kernels listed in the configuration example.
const EXAMPLE_KERNELS: usize = 3;
/// Width of the longest bar in the text preview.
const PREVIEW_WIDTH: usize = 40;

/// Frame and kernel overview of a report.
pub fn format_profiling_summary<W: Write>(
    w: &mut W,
    report: &Report,
    names: &NameMapper,
) -> Result<()> {
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w, "GPU PERFORMANCE SUMMARY")?;
    writeln!(w, "{}", "=".repeat(60))?;

    if let Some(summary) = report.summary() {
        writeln!(w, "\nSIMULATION DATA:")?;
        writeln!(
            w,
            "{:<20} {}",
            "Total Frames:",
            summary.total_frames.unwrap_or(0)
        )?;
        writeln!(
            w,
            "{:<20} {:.3} ms",
            "Average Frame Time:",
            summary.avg_frame_time_ms.unwrap_or(0.0)
        )?;
        writeln!(w, "{:<20} {:.1}", "Estimated FPS:", summary.estimated_fps())?;
    }

    let top = report.top_kernel();
    writeln!(w, "\nKERNEL STATISTICS:")?;
    writeln!(w, "{:<20} {}", "Total Kernels:", report.kernels().len())?;
    writeln!(
        w,
        "{:<20} {} ({:.1}%)",
        "Top Kernel:",
        names.map(&top.name),
        top.percentage
    )?;
    Ok(())
}

/// Table of every kernel with a `manual_display` example.
pub fn format_available_kernels<W: Write>(
    w: &mut W,
    report: &Report,
    names: &NameMapper,
) -> Result<()> {
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(w, "AVAILABLE KERNELS FOR CONFIGURATION")?;
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(
        w,
        "\n{:<35} {:<30} {:<12} {:<10}",
        "Original Name", "Display Name", "Percentage", "Time(ms)"
    )?;
    writeln!(w, "{}", "-".repeat(87))?;

    for kernel in report.kernels() {
        writeln!(
            w,
            "{:<35} {:<30} {:<11.2}% {:<9.3}",
            kernel.name,
            names.map(&kernel.name),
            kernel.percentage,
            kernel.avg_time_ms.unwrap_or(0.0)
        )?;
    }

    writeln!(w, "\nTotal kernels available: {}", report.kernels().len())?;
    writeln!(w, "Total percentage: {:.1}%", report.total_percentage())?;

    writeln!(w, "\nConfiguration example:")?;
    writeln!(w, "    \"manual_display\": [")?;
    let shown = report.kernels().len().min(EXAMPLE_KERNELS);
    for (i, kernel) in report.kernels().iter().take(shown).enumerate() {
        let entry = serde_json::json!({
            "type": "individual",
            "kernel": kernel.name,
            "display_name": names.map(&kernel.name),
        });
        let sep = if i + 1 < shown { "," } else { "" };
        writeln!(w, "        {}{}", entry, sep)?;
    }
    writeln!(w, "    ]")?;
    Ok(())
}

/// Final slot listing.
pub fn format_data_summary<W: Write>(w: &mut W, slots: &[ChartSlot]) -> Result<()> {
    let total: f64 = slots.iter().map(|s| s.value).sum();
    writeln!(w, "Final data summary:")?;
    writeln!(w, "   Components: {}", slots.len())?;
    writeln!(w, "   Total percentage: {:.1}%", total)?;
    for slot in slots {
        writeln!(w, "   - {}: {:.1}% ({})", slot.label, slot.value, slot.color)?;
    }
    Ok(())
}

/// Text rendering of the chart, one bar per slot.
pub fn format_preview<W: Write>(w: &mut W, slots: &[ChartSlot]) -> Result<()> {
    let max = slots.iter().map(|s| s.value).fold(0.0, f64::max);
    let label_width = slots
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);

    for slot in slots {
        let len = if max > 0.0 {
            (slot.value / max * PREVIEW_WIDTH as f64).round() as usize
        } else {
            0
        };
        writeln!(
            w,
            "{:>width$} | {:<bar_width$} {:.1}%",
            slot.label,
            "#".repeat(len),
            slot.value,
            width = label_width,
            bar_width = PREVIEW_WIDTH
        )?;
    }
    Ok(())
}
