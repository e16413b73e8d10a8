use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

use arena_terminal::heatmap::{
    DeviceClass, MatrixKind, build_heatmaps, clamp_cursor, compute_layout, dense_grid,
    estimate_text_width, label_universe, tooltip,
};
use arena_terminal::i18n::Locale;
use arena_terminal::normalize::parse_matrices_json;
use arena_terminal::state::{Matrix, MatrixPayload};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn matrix(entries: &[(&str, &str, f64)]) -> Matrix {
    let mut out: Matrix = BTreeMap::new();
    for (row, col, v) in entries {
        out.entry(row.to_string())
            .or_default()
            .insert(col.to_string(), *v);
    }
    out
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn labels_are_sorted_union_of_both_matrices() {
    let wr = matrix(&[("b", "c", 0.5)]);
    let mc = matrix(&[("a", "b", 3.0), ("d", "a", 1.0)]);
    assert_eq!(label_universe(&wr, &mc), labels(&["a", "b", "c", "d"]));
}

#[test]
fn missing_reverse_pair_stays_absent() {
    let wr = matrix(&[("A", "B", 0.5)]);
    let names = labels(&["A", "B"]);
    let cells = dense_grid(&names, &wr, MatrixKind::WinRate);
    assert_eq!(cells.len(), 4);
    let ab = cells
        .iter()
        .find(|c| c.row_label == "A" && c.col_label == "B")
        .expect("A,B cell");
    assert_eq!(ab.value, Some(50.0));
    let ba = cells
        .iter()
        .find(|c| c.row_label == "B" && c.col_label == "A")
        .expect("B,A cell");
    assert_eq!(ba.value, None);
}

#[test]
fn every_index_pair_appears_once() {
    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 960);
    let n = pair.win_rate.labels.len();
    assert_eq!(n, 4);
    for view in [&pair.win_rate, &pair.match_count] {
        let seen: HashSet<(usize, usize)> = view.cells.iter().map(|c| (c.col, c.row)).collect();
        assert_eq!(view.cells.len(), n * n);
        assert_eq!(seen.len(), n * n);
        assert!(seen.iter().all(|(c, r)| *c < n && *r < n));
    }
    assert_eq!(pair.win_rate.labels, pair.match_count.labels);
}

#[test]
fn win_rate_rounds_to_whole_percent() {
    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 960);
    let wr = &pair.win_rate;
    // labels: claude-opus, deepseek-r1, gemini-pro, qwen-max
    assert_eq!(wr.cell(2, 0).and_then(|c| c.value), Some(62.0));
    assert_eq!(wr.cell(1, 0).and_then(|c| c.value), Some(56.0));
    assert_eq!(wr.cell(0, 2).and_then(|c| c.value), Some(38.0));
    assert_eq!(wr.cell(0, 0).and_then(|c| c.value), None);
    assert_eq!(wr.cell(3, 1).and_then(|c| c.value), None);
    assert!(wr.cell(0, 0).and_then(|c| c.color).is_none());
    assert!(wr.cell(2, 0).and_then(|c| c.color).is_some());
}

#[test]
fn color_domains() {
    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 960);
    assert_eq!((pair.win_rate.domain.min, pair.win_rate.domain.max), (0.0, 100.0));
    assert_eq!(pair.match_count.domain.max, 40.0);
    assert_eq!(pair.match_count.legend_max, "40");

    let zeros = MatrixPayload {
        win_rate: Matrix::new(),
        match_count: matrix(&[("a", "b", 0.0)]),
    };
    let pair = build_heatmaps(&zeros, 960);
    assert_eq!(pair.match_count.domain.max, 1.0);
}

#[test]
fn text_width_heuristic() {
    assert_eq!(estimate_text_width("a", 11), 8);
    assert_eq!(estimate_text_width("ab", 11), 13);
    assert_eq!(estimate_text_width("模型", 11), 21);
    assert_eq!(estimate_text_width("claude-opus", 11), 67);
    assert_eq!(estimate_text_width("", 11), 8);
}

#[test]
fn desktop_layout_geometry() {
    let names = labels(&["claude-opus", "deepseek-r1", "gemini-pro", "qwen-max"]);
    let layout = compute_layout(960, &names, "100", DeviceClass::Desktop);
    assert_eq!(layout.font_size, 11);
    assert_eq!(layout.label_rotation_deg, 45);
    assert_eq!(layout.grid.left, 81);
    assert_eq!(layout.grid.bottom, 66);
    assert_eq!(layout.grid.right, 92);
    assert_eq!(layout.grid.top, 24);
    assert_eq!(layout.grid.width, 787);
    assert_eq!(layout.grid.height, layout.grid.width);
    assert_eq!(layout.container_height, 24 + 787 + 66);
}

#[test]
fn mobile_layout_geometry() {
    let names = labels(&["claude-opus", "deepseek-r1"]);
    let layout = compute_layout(400, &names, "100", DeviceClass::from_width(400));
    assert_eq!(layout.font_size, 10);
    assert_eq!(layout.label_rotation_deg, 60);
    assert_eq!(layout.grid.left, 75);
    assert_eq!(layout.grid.bottom, 71);
    assert_eq!(layout.grid.width, 233);
    assert_eq!(layout.grid.height, 233);
    assert_eq!(layout.container_height, 328);
}

#[test]
fn long_labels_hit_caps_and_grid_stays_square() {
    let names = labels(&["an-extraordinarily-long-model-identifier-for-testing-caps"]);
    let layout = compute_layout(320, &names, "12345", DeviceClass::Mobile);
    assert_eq!(layout.grid.left, 220);
    assert_eq!(layout.grid.bottom, 160);
    assert_eq!(layout.grid.width, 100);
    assert_eq!(layout.grid.width, layout.grid.height);
}

#[test]
fn degenerate_inputs_still_lay_out() {
    let layout = compute_layout(0, &[], "", DeviceClass::Desktop);
    assert_eq!(layout.container_width, 600);
    assert_eq!(layout.grid.left, 64);
    assert_eq!(layout.grid.bottom, 56);
    assert_eq!(layout.grid.width, 444);
    assert_eq!(layout.grid.width, layout.grid.height);

    let pair = build_heatmaps(&MatrixPayload::default(), 0);
    assert!(pair.win_rate.is_empty());
    assert!(pair.win_rate.cells.is_empty());
    assert_eq!(pair.match_count.domain.max, 1.0);
}

#[test]
fn single_label_gives_one_cell() {
    let payload = MatrixPayload {
        win_rate: matrix(&[("solo", "solo", 0.5)]),
        match_count: Matrix::new(),
    };
    let pair = build_heatmaps(&payload, 800);
    assert_eq!(pair.win_rate.cells.len(), 1);
    assert_eq!(pair.match_count.cells.len(), 1);
    assert_eq!(pair.match_count.cells[0].value, None);
}

#[test]
fn tooltip_looks_up_companion_symmetrically() {
    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 960);
    // gemini-pro (row 2) vs claude-opus (col 0): match count only stored as
    // claude-opus -> gemini-pro.
    let tip = tooltip(&payload, &pair.win_rate, 0, 2).expect("cell in range");
    assert_eq!(
        tip.lines(Locale::En),
        vec![
            "gemini-pro × claude-opus: 38%".to_string(),
            "Match Count Heatmap: 40".to_string(),
        ]
    );

    let tip = tooltip(&payload, &pair.match_count, 0, 0).expect("cell in range");
    assert_eq!(tip.lines(Locale::En), vec!["claude-opus × claude-opus: No matches".to_string()]);

    let tip = tooltip(&payload, &pair.match_count, 2, 0).expect("cell in range");
    assert_eq!(
        tip.lines(Locale::Zh),
        vec![
            "claude-opus × gemini-pro: 40".to_string(),
            "胜率热力图(%): 62%".to_string(),
        ]
    );

    assert!(tooltip(&payload, &pair.win_rate, 9, 0).is_none());
}

#[test]
fn zero_width_uses_desktop_fallback() {
    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 0);
    let layout = pair.win_rate.layout;
    assert_eq!(layout.container_width, 600);
    assert_eq!(layout.label_rotation_deg, 45);
    assert_eq!(layout.font_size, 11);
}

#[test]
fn cursor_clamps_when_labels_shrink() {
    assert_eq!(clamp_cursor((3, 2), 4), (3, 2));
    assert_eq!(clamp_cursor((7, 5), 2), (1, 1));
    assert_eq!(clamp_cursor((4, 0), 0), (0, 0));

    let payload = parse_matrices_json(&read_fixture("heatmap.json"));
    let pair = build_heatmaps(&payload, 960);
    let (col, row) = clamp_cursor((9, 9), pair.win_rate.labels.len());
    assert!(tooltip(&payload, &pair.win_rate, col, row).is_some());
}
