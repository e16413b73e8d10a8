use std::fs;
use std::path::PathBuf;

use arena_terminal::i18n::Locale;
use arena_terminal::layout::LayoutMode;
use arena_terminal::normalize::{parse_health_json, parse_matrices_json, parse_snapshot_json};
use arena_terminal::query::{SortDir, SortKey};
use arena_terminal::state::{
    AppState, Command, Delta, Health, Row, Screen, Snapshot, Theme, apply_command, apply_delta,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn loaded_state(width: u32) -> AppState {
    let mut state = AppState::with_viewport(width, Locale::En, Theme::Light);
    apply_delta(
        &mut state,
        Delta::SetCurrent(parse_snapshot_json(&read_fixture("leaderboard.json"))),
    );
    apply_delta(
        &mut state,
        Delta::SetPrevious(parse_snapshot_json(&read_fixture("leaderboard_prev.json"))),
    );
    apply_delta(
        &mut state,
        Delta::SetHealth(parse_health_json(&read_fixture("health.json"))),
    );
    apply_delta(
        &mut state,
        Delta::SetMatrices(parse_matrices_json(&read_fixture("heatmap.json"))),
    );
    state
}

fn identities(state: &AppState) -> Vec<String> {
    state
        .presentation()
        .table
        .rows
        .iter()
        .map(|r| r.identity.clone())
        .collect()
}

#[test]
fn loading_clears_flags_and_builds_rows() {
    let state = loaded_state(960);
    assert!(!state.is_loading());
    assert_eq!(state.rows.len(), 4);
    let view = state.presentation();
    assert!(!view.loading);
    assert_eq!(view.table.mode, LayoutMode::Wide);
    assert_eq!(view.total_battles, 5120);
    assert!(view.health.ok);
    assert_eq!(view.heatmaps.win_rate.labels.len(), 4);
    assert!(view.updated_at.is_some());
}

#[test]
fn search_filters_and_normalizes() {
    let mut state = loaded_state(960);
    let view = apply_command(&mut state, Command::SearchChanged("  GEM ".to_string()));
    assert_eq!(view.query.search_query, "gem");
    assert_eq!(identities(&state), vec!["gemini-pro".to_string()]);

    let view = apply_command(&mut state, Command::SearchChanged("zzz".to_string()));
    assert!(view.table.rows.is_empty());
    assert!(view.table.empty);

    apply_command(&mut state, Command::SearchChanged(String::new()));
    assert_eq!(identities(&state).len(), 4);
}

#[test]
fn repeated_sort_request_flips_direction() {
    let mut state = loaded_state(960);
    let view = apply_command(&mut state, Command::SortRequested(SortKey::Rating));
    assert_eq!(view.query.sort_dir, SortDir::Desc);
    assert_eq!(
        identities(&state),
        vec!["claude-opus", "gemini-pro", "deepseek-r1", "qwen-max"]
    );

    let view = apply_command(&mut state, Command::SortRequested(SortKey::Rating));
    assert_eq!(view.query.sort_dir, SortDir::Asc);
    assert_eq!(
        identities(&state),
        vec!["qwen-max", "deepseek-r1", "gemini-pro", "claude-opus"]
    );
}

#[test]
fn crossing_the_breakpoint_resets_query_and_expansion() {
    let mut state = loaded_state(960);
    apply_command(&mut state, Command::SortRequested(SortKey::Wins));
    apply_command(&mut state, Command::SearchChanged("claude".to_string()));

    let view = apply_command(&mut state, Command::ViewportResized(480));
    assert_eq!(view.table.mode, LayoutMode::Compact);
    assert_eq!(view.query.sort_key, SortKey::Rank);
    assert_eq!(view.query.search_query, "");
    assert!(
        state
            .logs
            .back()
            .is_some_and(|line| line.contains("compact"))
    );

    apply_command(&mut state, Command::ToggleExpanded("qwen-max".to_string()));
    assert!(state.expanded.contains("qwen-max"));

    let view = apply_command(&mut state, Command::ViewportResized(481));
    assert_eq!(view.table.mode, LayoutMode::Wide);
    assert!(state.expanded.is_empty());
}

#[test]
fn resize_within_a_class_keeps_state() {
    let mut state = loaded_state(960);
    apply_command(&mut state, Command::SortRequested(SortKey::Ties));
    let logs_before = state.logs.len();
    let view = apply_command(&mut state, Command::ViewportResized(1280));
    assert_eq!(view.query.sort_key, SortKey::Ties);
    assert_eq!(state.logs.len(), logs_before);
    assert_eq!(state.viewport_width, 1280);
}

#[test]
fn viewport_class_observation_drives_layout() {
    let mut state = loaded_state(960);
    let view = apply_command(&mut state, Command::ViewportClassChanged(true));
    assert_eq!(view.table.mode, LayoutMode::Compact);
    let view = apply_command(&mut state, Command::ViewportClassChanged(true));
    assert_eq!(view.table.mode, LayoutMode::Compact);
}

#[test]
fn expansion_only_applies_to_compact_cards() {
    let mut state = loaded_state(960);
    apply_command(&mut state, Command::ToggleExpanded("gemini-pro".to_string()));
    assert!(state.expanded.is_empty());

    let mut state = loaded_state(375);
    let view = apply_command(&mut state, Command::ToggleExpanded("gemini-pro".to_string()));
    let card = view
        .table
        .rows
        .iter()
        .find(|r| r.identity == "gemini-pro")
        .expect("gemini card");
    assert!(card.expanded);

    let view = apply_command(&mut state, Command::ToggleExpanded("gemini-pro".to_string()));
    assert!(view.table.rows.iter().all(|r| !r.expanded));
}

#[test]
fn locale_and_theme_keep_the_query() {
    let mut state = loaded_state(960);
    apply_command(&mut state, Command::SortRequested(SortKey::Battles));
    let view = apply_command(&mut state, Command::LocaleChanged(Locale::Ja));
    assert_eq!(view.locale, Locale::Ja);
    assert_eq!(view.query.sort_key, SortKey::Battles);

    let view = apply_command(&mut state, Command::ThemeToggled);
    assert_eq!(view.theme, Theme::Dark);
    assert_eq!(view.query.sort_key, SortKey::Battles);

    let view = apply_command(&mut state, Command::ShowScreen(Screen::Heatmap));
    assert_eq!(view.screen, Screen::Heatmap);
}

#[test]
fn presentation_is_idempotent() {
    let mut state = loaded_state(960);
    apply_command(&mut state, Command::SortRequested(SortKey::ModelName));
    assert_eq!(state.presentation(), state.presentation());
}

#[test]
fn empty_data_still_presents() {
    let mut state = AppState::with_viewport(0, Locale::Zh, Theme::Light);
    apply_delta(&mut state, Delta::SetCurrent(Snapshot::empty()));
    apply_delta(&mut state, Delta::SetPrevious(Snapshot::empty()));
    let view = state.presentation();
    assert!(view.table.empty);
    assert!(view.table.rows.is_empty());
    assert_eq!(view.total_battles, 0);
    assert!(!view.health.ok);
    assert!(view.heatmaps.win_rate.is_empty());
    assert_eq!(view.heatmaps.win_rate.layout.container_width, 600);
}

#[test]
fn total_battles_falls_back_to_row_sum() {
    let mut state = loaded_state(960);
    apply_delta(&mut state, Delta::SetHealth(Health::unavailable("timeout")));
    let view = state.presentation();
    assert_eq!(view.total_battles, 420 + 390 + 300 + 150);
    assert!(!view.health.ok);
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.starts_with("[WARN]") && line.contains("timeout"))
    );
}

#[test]
fn selection_wraps_and_clamps() {
    let mut state = loaded_state(960);
    state.select_prev();
    assert_eq!(state.selected, 3);
    state.select_next();
    assert_eq!(state.selected, 0);

    state.selected = 3;
    apply_command(&mut state, Command::SearchChanged("claude".to_string()));
    assert_eq!(state.selected, 0);
    assert_eq!(
        state.selected_row().map(|r| r.row.identity),
        Some("claude-opus".to_string())
    );
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::with_viewport(960, Locale::En, Theme::Light);
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
}

#[test]
fn typed_search_keeps_inner_spaces() {
    let mut state = AppState::with_viewport(960, Locale::En, Theme::Light);
    apply_delta(
        &mut state,
        Delta::SetCurrent(Snapshot {
            updated_at: None,
            rows: vec![Row::new("GPT 4", 1), Row::new("gpt4-mini", 2)],
        }),
    );

    for c in "gpt 4".chars() {
        let mut input = state.search_input.clone();
        input.push(c);
        apply_command(&mut state, Command::SearchChanged(input));
    }
    assert_eq!(state.search_input, "gpt 4");
    assert_eq!(state.query.search_query, "gpt 4");
    assert_eq!(identities(&state), vec!["gpt 4".to_string()]);

    let mut input = state.search_input.clone();
    input.pop();
    input.pop();
    let view = apply_command(&mut state, Command::SearchChanged(input));
    assert_eq!(state.search_input, "gpt");
    assert_eq!(view.table.rows.len(), 2);

    apply_command(&mut state, Command::ViewportResized(320));
    assert!(state.search_input.is_empty());
}
