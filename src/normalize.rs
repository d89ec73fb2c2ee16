// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use log::{info, warn};

use crate::color::ChartSlot;

/// Totals this close to 100 are not rescaled.
const SCALE_TOLERANCE: f64 = 0.01;
/// Rounded totals further than this from 100 are corrected.
const ROUNDING_TOLERANCE: f64 = 0.05;

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Index of the first maximal value.
fn max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= *v => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Rescales slot values to sum to 100.0 at one decimal place and orders
/// them largest first.
///
/// Totals within 0.01 of 100 are rounded without rescaling. On both paths,
/// when the rounded total is off by more than 0.05 the difference is added
/// to the slot with the largest value before rounding, so the result always
/// sums to 100 within 0.05. A non-positive total is only rounded. Equal
/// values keep their relative order.
pub fn normalize(mut slots: Vec<ChartSlot>) -> Vec<ChartSlot> {
    let total: f64 = slots.iter().map(|s| s.value).sum();
    let rescale = (total - 100.0).abs() > SCALE_TOLERANCE;

    if rescale && total <= 0.0 {
        warn!(
            "Cannot normalize percentages with total {:.2}%, using raw values",
            total
        );
        for slot in slots.iter_mut() {
            slot.value = round1(slot.value);
        }
        slots.sort_by(|a, b| b.value.total_cmp(&a.value));
        return slots;
    }

    let original: Vec<f64> = slots.iter().map(|s| s.value).collect();
    let scale = if rescale { 100.0 / total } else { 1.0 };
    for slot in slots.iter_mut() {
        slot.value = round1(slot.value * scale);
    }

    let rounded_total: f64 = slots.iter().map(|s| s.value).sum();
    if (rounded_total - 100.0).abs() > ROUNDING_TOLERANCE {
        let difference = 100.0 - rounded_total;
        if let Some(idx) = max_index(&original) {
            slots[idx].value = round1(slots[idx].value + difference);
        }
        info!(
            "Normalized percentages (total was {:.2}%, adjusted by {:.1}%)",
            total, difference
        );
    }

    slots.sort_by(|a, b| b.value.total_cmp(&a.value));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn slots(values: &[f64]) -> Vec<ChartSlot> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ChartSlot {
                label: format!("s{i}"),
                value: *v,
                color: Color::BLACK,
            })
            .collect()
    }

    fn values(slots: &[ChartSlot]) -> Vec<f64> {
        slots.iter().map(|s| s.value).collect()
    }

    fn sum(slots: &[ChartSlot]) -> f64 {
        slots.iter().map(|s| s.value).sum()
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(12.25), 12.3);
        assert_eq!(round1(0.04), 0.0);
    }

    #[test]
    fn test_exact_hundred_unchanged() {
        let out = normalize(slots(&[60.0, 25.0, 15.0]));
        assert_eq!(values(&out), vec![60.0, 25.0, 15.0]);
    }

    #[test]
    fn test_within_tolerance_only_rounds() {
        let out = normalize(slots(&[60.04, 24.96, 15.005]));
        assert_eq!(values(&out), vec![60.0, 25.0, 15.0]);
    }

    #[test]
    fn test_rescale_and_correct_largest() {
        let out = normalize(slots(&[10.0, 10.0, 10.0]));
        assert_eq!(values(&out), vec![33.4, 33.3, 33.3]);
        // The first of the tied maxima absorbs the drift.
        assert_eq!(out[0].label, "s0");
        assert!((sum(&out) - 100.0).abs() <= 0.05);
    }

    #[test]
    fn test_rescale_without_correction() {
        let out = normalize(slots(&[25.0, 25.0]));
        assert_eq!(values(&out), vec![50.0, 50.0]);
    }

    #[test]
    fn test_correction_uses_pre_rounding_maximum() {
        // Scaled: 14.2855 x6 and 14.2871, all rounding to 14.3 for a total
        // of 100.1. The largest original value absorbs the drift even though
        // it ends up smallest.
        let out = normalize(slots(&[1.0, 1.0, 1.0, 1.0001, 1.0, 1.0, 1.0]));
        assert_eq!(out.len(), 7);
        assert_eq!(out[6].label, "s3");
        assert_eq!(out[6].value, 14.2);
        assert!(out[..6].iter().all(|s| s.value == 14.3));
        assert!((sum(&out) - 100.0).abs() <= 0.05);
    }

    #[test]
    fn test_rounding_drift_corrected_without_rescale() {
        // Total is 100.0, but each rounds down to 33.3.
        let out = normalize(slots(&[33.33, 33.33, 33.34]));
        assert_eq!(out[0].label, "s2");
        assert_eq!(values(&out), vec![33.4, 33.3, 33.3]);
    }

    #[test]
    fn test_sorted_descending_stable() {
        let out = normalize(slots(&[20.0, 50.0, 20.0, 10.0]));
        let labels: Vec<&str> = out.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["s1", "s0", "s2", "s3"]);
    }

    #[test]
    fn test_single_slot() {
        let out = normalize(slots(&[42.0]));
        assert_eq!(values(&out), vec![100.0]);
    }

    #[test]
    fn test_empty() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_zero_total_is_left_alone() {
        let out = normalize(slots(&[0.0, 0.0]));
        assert_eq!(values(&out), vec![0.0, 0.0]);
    }

    #[test]
    fn test_idempotent() {
        let inputs: &[&[f64]] = &[
            &[10.0, 10.0, 10.0],
            &[33.34, 33.35, 33.31],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
            &[99.0],
            &[47.3, 22.1, 18.9, 7.2, 3.1, 0.8],
        ];
        for input in inputs {
            let once = normalize(slots(input));
            let twice = normalize(once.clone());
            assert_eq!(once, twice, "input {:?}", input);
            assert!((sum(&once) - 100.0).abs() <= 0.05, "input {:?}", input);
        }
    }
}
