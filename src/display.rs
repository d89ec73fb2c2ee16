// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Selection of the slots a chart displays.
//!
//! Without directives the top [`DEFAULT_TOP_KERNELS`] kernels are shown
//! individually and the rest are folded into one "Others" slot. With
//! directives, each one is applied in order against the kernels that are
//! still unconsumed:
//!
//! - `individual`: one kernel, relabeled and optionally colored
//! - `merged`: several kernels summed into one slot
//! - `others`: everything not consumed by earlier directives
//!
//! Unknown kernel names never fail a directive; they are logged and skipped.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::color::{resolve_colors, ChartSlot, Color};
use crate::names::NameMapper;
use crate::normalize::normalize;
use crate::report::KernelRecord;

/// Kernels shown individually by the default selection.
pub const DEFAULT_TOP_KERNELS: usize = 8;

/// A user-authored instruction selecting kernels into a slot.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DisplayDirective {
    Individual {
        kernel: String,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        color: Option<Color>,
    },
    Merged {
        #[serde(default)]
        kernels: Vec<String>,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        color: Option<Color>,
    },
    Others {
        #[serde(default)]
        include_remaining: bool,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        color: Option<Color>,
    },
}

impl DisplayDirective {
    fn kind(&self) -> &'static str {
        match self {
            DisplayDirective::Individual { .. } => "individual",
            DisplayDirective::Merged { .. } => "merged",
            DisplayDirective::Others { .. } => "others",
        }
    }
}

/// A chart entry before color resolution and normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySlot {
    pub label: String,
    pub value: f64,
    pub color: Option<Color>,
}

impl DisplaySlot {
    fn new(label: String, value: f64, color: Option<Color>) -> Self {
        Self {
            label,
            value,
            color,
        }
    }
}

/// Names of kernels already attributed to a slot.
pub type ConsumedSet = BTreeSet<String>;

/// Output of [`resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    /// Slots in directive order.
    pub slots: Vec<DisplaySlot>,
    /// Every kernel that contributed to a slot.
    pub consumed: ConsumedSet,
}

/// Returned when selection produced nothing to draw.
#[derive(Debug, Eq, PartialEq)]
pub enum DisplayError {
    NoData,
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayError::NoData => {
                write!(f, "no data to display, check the display configuration")
            }
        }
    }
}

impl std::error::Error for DisplayError {}

fn find<'a>(records: &'a [KernelRecord], name: &str) -> Option<&'a KernelRecord> {
    records.iter().find(|r| r.name == name)
}

fn select_default(records: &[KernelRecord], names: &NameMapper) -> Selection {
    let mut selection = Selection::default();

    for record in records.iter().take(DEFAULT_TOP_KERNELS) {
        selection.slots.push(DisplaySlot::new(
            names.map(&record.name).to_string(),
            record.percentage,
            None,
        ));
        selection.consumed.insert(record.name.clone());
    }

    if records.len() > DEFAULT_TOP_KERNELS {
        let rest = &records[DEFAULT_TOP_KERNELS..];
        let total: f64 = rest.iter().map(|r| r.percentage).sum();
        selection.slots.push(DisplaySlot::new(
            format!("Others ({})", rest.len()),
            total,
            None,
        ));
        selection
            .consumed
            .extend(rest.iter().map(|r| r.name.clone()));
    }

    selection
}

/// Applies one directive, marking the kernels it takes in `consumed`.
/// Returns `None` when the directive matched nothing.
pub fn apply_directive(
    records: &[KernelRecord],
    directive: &DisplayDirective,
    names: &NameMapper,
    consumed: &mut ConsumedSet,
) -> Option<DisplaySlot> {
    match directive {
        DisplayDirective::Individual {
            kernel,
            display_name,
            color,
        } => {
            let Some(record) = find(records, kernel) else {
                warn!("Kernel '{}' not found in data", kernel);
                debug!(
                    "Available kernels: {:?}",
                    records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>()
                );
                return None;
            };
            let label = display_name
                .clone()
                .unwrap_or_else(|| names.map(&record.name).to_string());
            consumed.insert(record.name.clone());
            debug!("Added individual: {} ({:.1}%)", label, record.percentage);
            Some(DisplaySlot::new(label, record.percentage, *color))
        }
        DisplayDirective::Merged {
            kernels,
            display_name,
            color,
        } => {
            let mut total = 0.0;
            let mut found = 0;
            for name in kernels {
                match find(records, name) {
                    Some(record) => {
                        total += record.percentage;
                        found += 1;
                        consumed.insert(record.name.clone());
                        debug!("  found: {} ({:.1}%)", name, record.percentage);
                    }
                    None => warn!("Merged kernel '{}' not found in data", name),
                }
            }
            if found == 0 {
                warn!("No kernels found for merged item: {:?}", kernels);
                return None;
            }
            let label = display_name
                .clone()
                .unwrap_or_else(|| format!("Merged ({})", found));
            debug!("Added merged: {} ({:.1}%, {} kernels)", label, total, found);
            Some(DisplaySlot::new(label, total, *color))
        }
        DisplayDirective::Others {
            include_remaining,
            display_name,
            color,
        } => {
            if !include_remaining {
                return None;
            }
            let remaining: Vec<&KernelRecord> = records
                .iter()
                .filter(|r| !consumed.contains(&r.name))
                .collect();
            if remaining.is_empty() {
                debug!("No remaining kernels for others item");
                return None;
            }
            let total: f64 = remaining.iter().map(|r| r.percentage).sum();
            let label = display_name
                .clone()
                .unwrap_or_else(|| format!("Others ({})", remaining.len()));
            consumed.extend(remaining.iter().map(|r| r.name.clone()));
            debug!(
                "Added others: {} ({:.1}%, {} kernels)",
                label,
                total,
                remaining.len()
            );
            Some(DisplaySlot::new(label, total, *color))
        }
    }
}

/// Selects display slots from `records`, which must be sorted by
/// percentage descending.
pub fn resolve(
    records: &[KernelRecord],
    directives: &[DisplayDirective],
    names: &NameMapper,
) -> Selection {
    if directives.is_empty() {
        info!("No manual display configuration found, using top kernels");
        return select_default(records, names);
    }

    debug!("Processing {} display items", directives.len());
    let mut consumed = ConsumedSet::new();
    let mut slots = Vec::new();
    for (i, directive) in directives.iter().enumerate() {
        debug!("{}. Processing {} item", i + 1, directive.kind());
        if let Some(slot) = apply_directive(records, directive, names, &mut consumed) {
            slots.push(slot);
        }
    }

    let unused = unused_kernels(records, &consumed);
    if !unused.is_empty() {
        warn!("Unused kernels found:");
        for kernel in unused {
            warn!("  {}: {:.1}%", kernel.name, kernel.percentage);
        }
    }

    Selection { slots, consumed }
}

/// Kernels that no slot accounts for.
pub fn unused_kernels<'a>(
    records: &'a [KernelRecord],
    consumed: &ConsumedSet,
) -> Vec<&'a KernelRecord> {
    records
        .iter()
        .filter(|r| !consumed.contains(&r.name))
        .collect()
}

/// Runs selection, color resolution and normalization, producing the slots
/// handed to the renderer.
pub fn prepare(
    records: &[KernelRecord],
    directives: &[DisplayDirective],
    names: &NameMapper,
) -> Result<Vec<ChartSlot>, DisplayError> {
    let selection = resolve(records, directives, names);
    if selection.slots.is_empty() {
        return Err(DisplayError::NoData);
    }
    Ok(normalize(resolve_colors(selection.slots)))
}
