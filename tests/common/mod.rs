// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::path::PathBuf;

use kchart::{ChartSlot, KernelRecord};

/// Path of a file under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn records(entries: &[(&str, f64)]) -> Vec<KernelRecord> {
    entries
        .iter()
        .map(|(name, pct)| KernelRecord::new(name, *pct))
        .collect()
}

pub fn total(slots: &[ChartSlot]) -> f64 {
    slots.iter().map(|s| s.value).sum()
}

/// Asserts the invariants every prepared chart holds.
pub fn assert_chart_invariants(slots: &[ChartSlot]) {
    assert!(!slots.is_empty(), "chart has no slots");
    assert!(
        (total(slots) - 100.0).abs() <= 0.05 + 1e-9,
        "slots sum to {}",
        total(slots)
    );
    for pair in slots.windows(2) {
        assert!(
            pair[0].value >= pair[1].value,
            "{} ({}) sorted before {} ({})",
            pair[0].label,
            pair[0].value,
            pair[1].label,
            pair[1].value
        );
    }
    for slot in slots {
        assert_eq!(
            (slot.value * 10.0).round() / 10.0,
            slot.value,
            "{} is not rounded to one decimal",
            slot.label
        );
    }
}
