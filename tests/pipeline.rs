// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! End-to-end tests from report and configuration files to the slots handed
//! to the renderer.

use std::io::Write;

use kchart::color::{TABLEAU_10, TAB_20};
use kchart::display::DEFAULT_TOP_KERNELS;
use kchart::*;

mod common;

use common::{assert_chart_invariants, fixture, records};

fn load_fixtures() -> (Report, ChartConfig) {
    let report = Report::load(&fixture("xpbd_report.json")).unwrap();
    let config = ChartConfig::load(&fixture("display_config.json")).unwrap();
    (report, config)
}

#[test]
fn test_report_fixture_loads_sorted() {
    let (report, _) = load_fixtures();
    assert_eq!(report.kernels().len(), 12);
    assert_eq!(report.top_kernel().name, "SolveXPBDHydrostatic");
    assert!((report.total_percentage() - 99.8).abs() < 1e-9);

    let summary = report.summary().unwrap();
    assert_eq!(summary.total_frames, Some(3600));
    assert!((summary.estimated_fps() - 80.0).abs() < 1e-9);
}

#[test]
fn test_config_fixture_loads() {
    let (_, config) = load_fixtures();
    assert_eq!(config.manual_display.len(), 6);
    assert!(config.show_legend());
    assert!(config.add_statistics_box());
    assert_eq!(
        config.chart_style.title(ChartKind::Pie),
        Some("XPBD Frame Breakdown")
    );
    assert_eq!(config.chart_style.pixel_size(ChartKind::Pie), (800, 600));
    assert!(config.chart_style.show_percentages());

    let names = config.name_mapper();
    assert_eq!(names.map("XPBDFinalize"), "Finalize");
    assert_eq!(names.map("CollideSDF"), "SDF Collision");
}

#[test]
fn test_default_selection_from_fixture() {
    let (report, _) = load_fixtures();
    let names = NameMapper::default();

    let selection = resolve(report.kernels(), &[], &names);
    assert_eq!(selection.slots.len(), DEFAULT_TOP_KERNELS + 1);
    assert_eq!(selection.consumed.len(), 12);
    assert_eq!(selection.slots[0].label, "Hydrostatic Solver");
    assert_eq!(selection.slots[DEFAULT_TOP_KERNELS].label, "Others (4)");

    let slots = prepare(report.kernels(), &[], &names).unwrap();
    assert_chart_invariants(&slots);
    assert_eq!(slots[0].label, "Hydrostatic Solver");
    // Rounding drift lands on the largest slot.
    assert_eq!(slots[0].value, 31.8);
    // Surface Update and Others tie at 8.1 and keep selection order.
    assert_eq!(slots[3].label, "Surface Update");
    assert_eq!(slots[4].label, "Others (4)");
    assert_eq!(slots[4].value, 8.1);
    // Colors follow selection position, not final rank.
    assert_eq!(slots[4].color, TABLEAU_10[DEFAULT_TOP_KERNELS]);
}

#[test]
fn test_configured_selection_from_fixture() {
    let (report, config) = load_fixtures();
    let names = config.name_mapper();

    let selection = resolve(report.kernels(), &config.manual_display, &names);
    let labels: Vec<&str> = selection.slots.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Hydrostatic Solver",
            "Deviatoric",
            "Collision",
            "Merged (3)",
            "Others (5)"
        ]
    );
    assert_eq!(unused_count(&report, &selection), 0);

    let slots = prepare(report.kernels(), &config.manual_display, &names).unwrap();
    assert_chart_invariants(&slots);
    let got: Vec<(&str, f64)> = slots.iter().map(|s| (s.label.as_str(), s.value)).collect();
    assert_eq!(
        got,
        vec![
            ("Hydrostatic Solver", 31.8),
            ("Deviatoric", 22.4),
            ("Others (5)", 18.8),
            ("Collision", 15.0),
            ("Merged (3)", 12.0),
        ]
    );

    assert_eq!(slots[0].color, TABLEAU_10[0]);
    assert_eq!(slots[1].color, TABLEAU_10[1]);
    assert_eq!(slots[2].color, Color::LIGHT_GRAY);
    assert_eq!(slots[3].color, TABLEAU_10[2]);
    assert_eq!(slots[4].color, TABLEAU_10[3]);
}

fn unused_count(report: &Report, selection: &Selection) -> usize {
    kchart::display::unused_kernels(report.kernels(), &selection.consumed).len()
}

#[test]
fn test_partial_directives_leave_kernels_unused() {
    let records = records(&[("A", 60.0), ("B", 30.0), ("C", 10.0)]);
    let directives: Vec<DisplayDirective> = serde_json::from_str(
        r#"[{"type": "individual", "kernel": "A"}, {"type": "individual", "kernel": "B"}]"#,
    )
    .unwrap();

    let selection = resolve(&records, &directives, &NameMapper::empty());
    let unused = kchart::display::unused_kernels(&records, &selection.consumed);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].name, "C");

    // Selected shares are rescaled to fill the chart.
    let slots = prepare(&records, &directives, &NameMapper::empty()).unwrap();
    assert_chart_invariants(&slots);
    assert_eq!(slots[0].value, 66.7);
    assert_eq!(slots[1].value, 33.3);
}

#[test]
fn test_directives_matching_nothing() {
    let records = records(&[("A", 60.0), ("B", 40.0)]);
    let directives: Vec<DisplayDirective> = serde_json::from_str(
        r#"[
            {"type": "individual", "kernel": "Missing"},
            {"type": "merged", "kernels": ["AlsoMissing"]},
            {"type": "others", "include_remaining": false}
        ]"#,
    )
    .unwrap();

    let err = prepare(&records, &directives, &NameMapper::empty()).unwrap_err();
    assert_eq!(err, DisplayError::NoData);
}

#[test]
fn test_many_slots_use_ramp_palette() {
    let entries: Vec<(String, f64)> = (0..12).map(|i| (format!("k{i:02}"), 8.0)).collect();
    let entries: Vec<(&str, f64)> = entries.iter().map(|(n, p)| (n.as_str(), *p)).collect();
    let records = records(&entries);
    let directives: Vec<DisplayDirective> = records
        .iter()
        .map(|r| DisplayDirective::Individual {
            kernel: r.name.clone(),
            display_name: None,
            color: None,
        })
        .collect();

    let slots = prepare(&records, &directives, &NameMapper::empty()).unwrap();
    assert_eq!(slots.len(), 12);
    assert_chart_invariants(&slots);
    // Slot 11 of 12 samples the ramp at 11/12 * 20 = 18.3.
    let last = slots.iter().find(|s| s.label == "k11").unwrap();
    assert_eq!(last.color, TAB_20[18]);
}

#[test]
fn test_report_errors_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(Report::load(&missing), Err(ReportError::Io(_))));

    let no_stats = dir.path().join("no_stats.json");
    let mut file = std::fs::File::create(&no_stats).unwrap();
    writeln!(file, r#"{{"profiling_summary": {{"total_frames": 10}}}}"#).unwrap();
    assert!(matches!(
        Report::load(&no_stats),
        Err(ReportError::MissingKernelStatistics)
    ));

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, r#"{"kernel_statistics": []}"#).unwrap();
    assert!(matches!(Report::load(&empty), Err(ReportError::NoKernels)));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "kernel_statistics: yes").unwrap();
    assert!(matches!(Report::load(&garbage), Err(ReportError::Json(_))));
}

#[test]
fn test_config_rejects_bad_color() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("display.json");
    std::fs::write(
        &path,
        r##"{"manual_display": [{"type": "individual", "kernel": "A", "color": "#zzzzzz"}]}"##,
    )
    .unwrap();
    assert!(matches!(ChartConfig::load(&path), Err(ConfigError::Json(_))));
}

#[test]
fn test_render_fixture_charts() {
    let (report, config) = load_fixtures();
    let names = config.name_mapper();
    let slots = prepare(report.kernels(), &config.manual_display, &names).unwrap();

    let dir = tempfile::tempdir().unwrap();
    for kind in [ChartKind::Pie, ChartKind::Bar] {
        let path = kchart::chart::chart_path(dir.path(), kind, chrono::Local::now());
        kchart::chart::render(&path, kind, &slots, &config, report.summary()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
