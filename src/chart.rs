// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! PNG rendering of normalized chart slots.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use log::info;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::Color as _;
use plotters::style::FontStyle;

use crate::color::{ChartSlot, Color};
use crate::config::{ChartConfig, ChartStyle};
use crate::report::ProfilingSummary;
use crate::ChartKind;

const FONT: &str = "serif";
/// Legend column width as a fraction of the image width.
const LEGEND_FRACTION: f64 = 0.28;
/// Gap in pixels kept between drawn elements and the edges of their area.
const EDGE_MARGIN: i32 = 10;

fn rgb(c: Color) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Converts a point size to pixels at `dpi`.
fn font_px(points: f64, dpi: f64) -> f64 {
    (points * dpi / 72.0).max(1.0)
}

/// Output path for a chart rendered at `now`.
pub fn chart_path(output_dir: &Path, kind: ChartKind, now: DateTime<Local>) -> PathBuf {
    output_dir.join(format!(
        "{}_{}.png",
        kind.file_prefix(),
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// Lines of the statistics box, `None` without a profiling summary.
pub fn statistics_lines(
    slots: &[ChartSlot],
    summary: Option<&ProfilingSummary>,
) -> Option<Vec<String>> {
    let summary = summary?;
    let mut values: Vec<f64> = slots.iter().map(|s| s.value).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    let top3: f64 = values.iter().take(3).sum();
    Some(vec![
        "Performance Summary:".to_string(),
        format!("Components: {}", slots.len()),
        format!("Top 3 Total: {:.1}%", top3),
        format!("Estimated FPS: {:.1}", summary.estimated_fps()),
        format!("Frame Time: {:.2} ms", summary.avg_frame_time_ms.unwrap_or(0.0)),
    ])
}

/// Renders `slots` to a PNG at `path`.
pub fn render(
    path: &Path,
    kind: ChartKind,
    slots: &[ChartSlot],
    config: &ChartConfig,
    summary: Option<&ProfilingSummary>,
) -> Result<()> {
    if slots.is_empty() {
        bail!("no data to display");
    }

    let style = &config.chart_style;
    let (width, height) = style.pixel_size(kind);
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let area = match style.title(kind) {
        Some(title) => root.titled(
            title,
            (FONT, font_px(style.title_fontsize(), style.dpi()))
                .into_font()
                .style(FontStyle::Bold)
                .color(&BLACK),
        )?,
        None => root.clone(),
    };

    let mut chart_area = if config.show_legend() {
        let split = (width as f64 * (1.0 - LEGEND_FRACTION)) as u32;
        let (chart_area, legend_area) = area.split_horizontally(split);
        draw_legend(&legend_area, slots, style)?;
        chart_area
    } else {
        area
    };

    // The statistics box gets its own band above the plot so it never
    // covers labels or bars.
    if config.add_statistics_box() {
        if let Some(lines) = statistics_lines(slots, summary) {
            let (_, box_h) = statistics_box_size(&chart_area, &lines, style)?;
            let (band, plot) = chart_area.split_vertically(box_h + 2 * EDGE_MARGIN);
            draw_statistics_box(&band, kind, &lines, style)?;
            chart_area = plot;
        }
    }

    match kind {
        ChartKind::Pie => draw_pie(&chart_area, slots, style)?,
        ChartKind::Bar => draw_bar(&chart_area, slots, style)?,
    }

    root.present()
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    info!("Chart saved to: {}", path.display());
    Ok(())
}

/// Largest pie radius that keeps every label of `label_size` inside a
/// `w` x `h` area when labels sit at `label_distance` times the radius.
fn pie_radius(w: u32, h: u32, label_size: Option<(u32, u32)>, label_distance: f64) -> f64 {
    let half_w = w as f64 / 2.0 - EDGE_MARGIN as f64;
    let half_h = h as f64 / 2.0 - EDGE_MARGIN as f64;
    let radius = match label_size {
        Some((label_w, label_h)) => {
            let distance = label_distance.max(1.0);
            let by_w = (half_w - label_w as f64) / distance;
            let by_h = (half_h - label_h as f64) / distance;
            by_w.min(by_h)
        }
        None => half_w.min(half_h) * 0.9,
    };
    // Very long labels may not leave room for a readable pie at all.
    radius.max(w.min(h) as f64 * 0.1)
}

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    slots: &[ChartSlot],
    style: &ChartStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let dpi = style.dpi();
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let external = style.use_external_labels();

    let labels: Vec<String> = slots
        .iter()
        .map(|s| {
            if external {
                format!("{} ({:.1}%)", s.label, s.value)
            } else {
                s.label.clone()
            }
        })
        .collect();
    let label_style = (FONT, font_px(style.label_fontsize(ChartKind::Pie), dpi))
        .into_font()
        .color(&BLACK);

    let label_size = if external {
        let mut widest = (0, 0);
        for label in &labels {
            let (lw, lh) = area.estimate_text_size(label, &label_style)?;
            widest = (widest.0.max(lw), widest.1.max(lh));
        }
        Some(widest)
    } else {
        None
    };
    let radius = pie_radius(w, h, label_size, style.label_distance());

    let sizes: Vec<f64> = slots.iter().map(|s| s.value).collect();
    let colors: Vec<RGBColor> = slots.iter().map(|s| rgb(s.color)).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    // Screen y grows downward, so angles are negated.
    pie.start_angle(-style.start_angle());
    pie.label_style(label_style.clone());
    if external {
        pie.label_offset(radius * (style.label_distance() - 1.0).max(0.0));
    }
    if style.show_percentages() {
        pie.percentages(
            (FONT, font_px(style.percentage_fontsize(), dpi))
                .into_font()
                .style(FontStyle::Bold)
                .color(&BLACK),
        );
    }
    let donut = style.donut_width();
    if donut > 0.0 && donut < 1.0 {
        pie.donut_hole(radius * (1.0 - donut));
    }

    area.draw(&pie)?;
    Ok(())
}

fn draw_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    slots: &[ChartSlot],
    style: &ChartStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let dpi = style.dpi();
    let (w, _) = area.dim_in_pixel();
    let n = slots.len();
    let max = slots.iter().map(|s| s.value).fold(0.0, f64::max);
    let x_max = (max * style.x_limit_factor()).max(1.0);

    let label_px = font_px(style.label_fontsize(ChartKind::Bar), dpi);
    let longest = slots.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let y_area = (longest as f64 * label_px * 0.55 + 20.0)
        .clamp(w as f64 * 0.15, w as f64 * 0.4) as u32;
    let x_area =
        (font_px(style.xlabel_fontsize(), dpi) + font_px(style.xtick_fontsize(), dpi)) * 1.8;

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(x_area as u32)
        .y_label_area_size(y_area)
        .build_cartesian_2d(0f64..x_max, -0.5f64..(n as f64 - 0.5))?;

    // Row 0 is the top of the chart.
    let row_y = |i: usize| (n - 1 - i) as f64;
    let y_formatter = |y: &f64| {
        let k = y.round();
        if (y - k).abs() > 1e-6 || k < 0.0 || k >= n as f64 {
            return String::new();
        }
        slots[n - 1 - k as usize].label.clone()
    };
    let x_formatter = |x: &f64| format!("{:.0}", x);

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(style.xlabel_text())
        .axis_desc_style(
            (FONT, font_px(style.xlabel_fontsize(), dpi))
                .into_font()
                .style(FontStyle::Bold)
                .color(&rgb(style.xlabel_color())),
        )
        .x_label_style(
            (FONT, font_px(style.xtick_fontsize(), dpi))
                .into_font()
                .color(&rgb(style.xtick_color())),
        )
        .y_label_style((FONT, label_px).into_font().color(&rgb(style.label_color())))
        .x_label_formatter(&x_formatter)
        .y_labels(n)
        .y_label_formatter(&y_formatter)
        .disable_y_mesh();
    if style.show_grid() {
        mesh.bold_line_style(BLACK.mix(style.grid_alpha()))
            .light_line_style(TRANSPARENT);
    } else {
        mesh.disable_x_mesh();
    }
    mesh.draw()?;

    let half = style.bar_height() / 2.0;
    let alpha = style.alpha();
    chart.draw_series(slots.iter().enumerate().map(|(i, slot)| {
        let y = row_y(i);
        Rectangle::new(
            [(0.0, y - half), (slot.value, y + half)],
            rgb(slot.color).mix(alpha).filled(),
        )
    }))?;

    if style.show_values() {
        let offset = max * 0.01;
        let value_style = (FONT, font_px(style.value_fontsize(), dpi))
            .into_font()
            .style(FontStyle::Bold)
            .color(&rgb(style.value_color()))
            .pos(Pos::new(HPos::Left, VPos::Center));
        chart.draw_series(slots.iter().enumerate().map(|(i, slot)| {
            Text::new(
                format!("{:.1}%", slot.value),
                (slot.value + offset, row_y(i)),
                value_style.clone(),
            )
        }))?;
    }

    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    slots: &[ChartSlot],
    style: &ChartStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let px = font_px(10.0, style.dpi());
    let row = (px * 1.6) as i32;
    let swatch = px as i32;
    let (_, h) = area.dim_in_pixel();
    let top = (h as i32 - row * slots.len() as i32).max(0) / 2;
    let text_style = (FONT, px).into_font().color(&BLACK);

    for (i, slot) in slots.iter().enumerate() {
        let y = top + i as i32 * row;
        area.draw(&Rectangle::new(
            [(10, y), (10 + swatch, y + swatch)],
            rgb(slot.color).filled(),
        ))?;
        area.draw(&Text::new(
            format!("{} ({:.1}%)", slot.label, slot.value),
            (16 + swatch, y),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

fn statistics_style(style: &ChartStyle) -> TextStyle<'static> {
    (FONT, font_px(9.0, style.dpi())).into_font().color(&BLACK)
}

/// Pixel size of the statistics box holding `lines`.
fn statistics_box_size<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lines: &[String],
    style: &ChartStyle,
) -> Result<(i32, i32)>
where
    DB::ErrorType: 'static,
{
    let text_style = statistics_style(style);
    let mut text_w = 0;
    let mut line_h = 0;
    for line in lines {
        let (lw, lh) = area.estimate_text_size(line, &text_style)?;
        text_w = text_w.max(lw);
        line_h = line_h.max(lh);
    }
    let line_h = (line_h as f64 * 1.3).ceil() as i32;
    Ok((text_w as i32 + 16, line_h * lines.len() as i32 + 12))
}

fn draw_statistics_box<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    kind: ChartKind,
    lines: &[String],
    style: &ChartStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (box_w, box_h) = statistics_box_size(area, lines, style)?;
    let line_h = (box_h - 12) / lines.len().max(1) as i32;
    let (w, _) = area.dim_in_pixel();
    let x0 = match kind {
        ChartKind::Pie => EDGE_MARGIN,
        ChartKind::Bar => (w as i32 - box_w - EDGE_MARGIN).max(0),
    };
    let y0 = EDGE_MARGIN;

    let background = rgb(Color::LIGHT_GRAY).mix(0.8).filled();
    area.draw(&Rectangle::new([(x0, y0), (x0 + box_w, y0 + box_h)], background))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        BLACK.stroke_width(1),
    ))?;

    let text_style = statistics_style(style);
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.clone(),
            (x0 + 8, y0 + 6 + i as i32 * line_h),
            text_style.clone(),
        ))?;
    }
    Ok(())
}
