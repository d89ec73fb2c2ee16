// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::color::Color;
use crate::display::DisplayDirective;
use crate::names::NameMapper;
use crate::ChartKind;

/// Errors from loading a display configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// Invalid JSON, an unknown directive type or an unparseable color.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Json(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Treats an explicit `null` like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// User display configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChartConfig {
    /// Ordered display directives. Empty selects the top kernels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub manual_display: Vec<DisplayDirective>,
    /// Styling options.
    #[serde(default, deserialize_with = "null_as_default")]
    pub chart_style: ChartStyle,
    /// Draw a legend.
    show_legend: Option<bool>,
    /// Draw a profiling statistics box.
    add_statistics_box: Option<bool>,
    /// Extra raw to display name mappings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub kernel_name_mapping: HashMap<String, String>,
}

impl ChartConfig {
    /// Parses a configuration from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        ChartConfig::from_json(&contents)
    }

    /// Draw a legend.
    pub fn show_legend(&self) -> bool {
        self.show_legend.unwrap_or(false)
    }

    /// Draw a profiling statistics box.
    pub fn add_statistics_box(&self) -> bool {
        self.add_statistics_box.unwrap_or(false)
    }

    /// Name mapper with the configured overrides applied.
    pub fn name_mapper(&self) -> NameMapper {
        NameMapper::with_overrides(&self.kernel_name_mapping)
    }
}

/// Font settings for an axis label or tick labels.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LabelStyle {
    pub text: Option<String>,
    pub fontsize: Option<f64>,
    pub color: Option<Color>,
}

/// Chart styling. Every option has a default; options that only apply to
/// one chart kind are ignored by the other.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChartStyle {
    /// Figure size in inches.
    figsize: Option<[f64; 2]>,
    /// Pixels per inch.
    dpi: Option<f64>,
    /// Chart title. An empty title draws nothing.
    title: Option<String>,
    title_fontsize: Option<f64>,
    label_fontsize: Option<f64>,

    /// Ring width as a fraction of the radius, 0 for a full pie.
    donut_width: Option<f64>,
    /// Draw labels outside the wedges.
    use_external_labels: Option<bool>,
    /// Draw percentages on the wedges.
    show_percentages: Option<bool>,
    /// Angle of the first wedge in degrees.
    start_angle: Option<f64>,
    /// Distance of external labels as a fraction of the radius.
    label_distance: Option<f64>,
    percentage_fontsize: Option<f64>,

    /// Bar thickness as a fraction of the row height.
    bar_height: Option<f64>,
    /// Bar opacity.
    alpha: Option<f64>,
    /// Draw the value next to each bar.
    show_values: Option<bool>,
    value_fontsize: Option<f64>,
    value_color: Option<Color>,
    /// The x axis spans the largest value times this factor.
    x_limit_factor: Option<f64>,
    show_grid: Option<bool>,
    grid_alpha: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    xlabel_config: LabelStyle,
    #[serde(default, deserialize_with = "null_as_default")]
    ylabel_config: LabelStyle,
    #[serde(default, deserialize_with = "null_as_default")]
    xtick_config: LabelStyle,
}

impl ChartStyle {
    /// Figure size in inches.
    pub fn figsize(&self, kind: ChartKind) -> (f64, f64) {
        match self.figsize {
            Some([w, h]) => (w, h),
            None => match kind {
                ChartKind::Pie => (10.0, 8.0),
                ChartKind::Bar => (12.0, 8.0),
            },
        }
    }

    /// Pixels per inch.
    pub fn dpi(&self) -> f64 {
        self.dpi.unwrap_or(100.0)
    }

    /// Output image size in pixels.
    pub fn pixel_size(&self, kind: ChartKind) -> (u32, u32) {
        let (w, h) = self.figsize(kind);
        let dpi = self.dpi();
        (((w * dpi).round() as u32).max(1), ((h * dpi).round() as u32).max(1))
    }

    /// Chart title, `None` when no title is drawn.
    pub fn title(&self, kind: ChartKind) -> Option<&str> {
        let title = match (&self.title, kind) {
            (Some(title), _) => title.as_str(),
            (None, ChartKind::Pie) => return None,
            (None, ChartKind::Bar) => "GPU Kernel Performance Distribution",
        };
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }

    pub fn title_fontsize(&self) -> f64 {
        self.title_fontsize.unwrap_or(14.0)
    }

    /// Font size of slot labels. For bar charts `ylabel_config.fontsize`
    /// takes precedence.
    pub fn label_fontsize(&self, kind: ChartKind) -> f64 {
        match kind {
            ChartKind::Pie => self.label_fontsize.unwrap_or(10.0),
            ChartKind::Bar => self
                .ylabel_config
                .fontsize
                .or(self.label_fontsize)
                .unwrap_or(11.0),
        }
    }

    /// Color of slot labels.
    pub fn label_color(&self) -> Color {
        self.ylabel_config.color.unwrap_or(Color::BLACK)
    }

    pub fn donut_width(&self) -> f64 {
        self.donut_width.unwrap_or(0.4).clamp(0.0, 1.0)
    }

    pub fn use_external_labels(&self) -> bool {
        self.use_external_labels.unwrap_or(true)
    }

    pub fn show_percentages(&self) -> bool {
        self.show_percentages.unwrap_or(false)
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle.unwrap_or(90.0)
    }

    pub fn label_distance(&self) -> f64 {
        self.label_distance.unwrap_or(1.25)
    }

    pub fn percentage_fontsize(&self) -> f64 {
        self.percentage_fontsize.unwrap_or(10.0)
    }

    pub fn bar_height(&self) -> f64 {
        self.bar_height.unwrap_or(0.7).clamp(0.05, 1.0)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(0.85).clamp(0.0, 1.0)
    }

    pub fn show_values(&self) -> bool {
        self.show_values.unwrap_or(true)
    }

    pub fn value_fontsize(&self) -> f64 {
        self.value_fontsize.unwrap_or(12.0)
    }

    pub fn value_color(&self) -> Color {
        self.value_color.unwrap_or(Color::BLACK)
    }

    pub fn x_limit_factor(&self) -> f64 {
        self.x_limit_factor.unwrap_or(1.15)
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid.unwrap_or(true)
    }

    pub fn grid_alpha(&self) -> f64 {
        self.grid_alpha.unwrap_or(0.3).clamp(0.0, 1.0)
    }

    /// X axis description.
    pub fn xlabel_text(&self) -> &str {
        self.xlabel_config
            .text
            .as_deref()
            .unwrap_or("Percentage (%)")
    }

    pub fn xlabel_fontsize(&self) -> f64 {
        self.xlabel_config.fontsize.unwrap_or(12.0)
    }

    pub fn xlabel_color(&self) -> Color {
        self.xlabel_config.color.unwrap_or(Color::BLACK)
    }

    pub fn xtick_fontsize(&self) -> f64 {
        self.xtick_config.fontsize.unwrap_or(10.0)
    }

    pub fn xtick_color(&self) -> Color {
        self.xtick_config.color.unwrap_or(Color::BLACK)
    }
}
