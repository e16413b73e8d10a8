use arena_terminal::query::{
    QueryState, SortDir, SortKey, apply_query, filter_rows, numeric_sort_value, sort_rows,
};
use arena_terminal::reconcile::{RankedRow, RowDelta};
use arena_terminal::state::Row;

fn ranked(name: &str, rank: u32) -> RankedRow {
    RankedRow {
        row: Row::new(name, rank),
        delta: RowDelta::default(),
    }
}

fn names(rows: &[RankedRow]) -> Vec<&str> {
    rows.iter().map(|r| r.row.display_name.as_str()).collect()
}

fn sample() -> Vec<RankedRow> {
    let mut a = ranked("Alpha", 2);
    a.row.rating = Some(1500.0);
    a.row.battles = 10;
    a.row.tier = Some("b".to_string());
    let mut b = ranked("beta", 1);
    b.row.rating_realtime = Some(1550.0);
    b.row.battles = 30;
    b.row.tier = Some("A".to_string());
    let mut c = ranked("Gamma-2", 3);
    c.row.battles = 10;
    let mut d = ranked("alphabet", 4);
    d.row.rating = Some(1400.0);
    d.row.rating_realtime = Some(1600.0);
    d.row.battles = 20;
    vec![a, b, c, d]
}

#[test]
fn default_state_is_rank_ascending() {
    let q = QueryState::default();
    assert_eq!(q.sort_key, SortKey::Rank);
    assert_eq!(q.sort_dir, SortDir::Asc);
    assert!(q.search_query.is_empty());
    assert_eq!(names(&apply_query(&sample(), &q)), vec!["beta", "Alpha", "Gamma-2", "alphabet"]);
}

#[test]
fn filter_is_case_insensitive_substring() {
    let rows = sample();
    assert_eq!(names(&filter_rows(&rows, "ALPHA")), vec!["Alpha", "alphabet"]);
    assert_eq!(filter_rows(&rows, "").len(), 4);
    assert!(filter_rows(&rows, "zzz").is_empty());
}

#[test]
fn filter_is_idempotent() {
    let rows = sample();
    let once = filter_rows(&rows, "a");
    let twice = filter_rows(&once, "a");
    assert_eq!(once, twice);
}

#[test]
fn sort_toggles_on_same_key_and_resets_on_new_key() {
    let mut q = QueryState::default();
    q.request_sort(SortKey::Rank);
    assert_eq!(q.sort_dir, SortDir::Desc);
    q.request_sort(SortKey::Battles);
    assert_eq!((q.sort_key, q.sort_dir), (SortKey::Battles, SortDir::Desc));
    q.request_sort(SortKey::Battles);
    assert_eq!(q.sort_dir, SortDir::Asc);
    q.request_sort(SortKey::Rank);
    assert_eq!((q.sort_key, q.sort_dir), (SortKey::Rank, SortDir::Asc));
}

#[test]
fn search_is_stored_lowercased() {
    let mut q = QueryState::default();
    q.set_search("  GeMiNi ");
    assert_eq!(q.search_query, "gemini");
}

#[test]
fn rating_sort_prefers_realtime_and_treats_absent_as_zero() {
    let mut rows = sample();
    sort_rows(&mut rows, SortKey::Rating, SortDir::Desc);
    // alphabet: realtime 1600 beats its primary 1400.
    assert_eq!(names(&rows), vec!["alphabet", "beta", "Alpha", "Gamma-2"]);
    sort_rows(&mut rows, SortKey::Rating, SortDir::Asc);
    assert_eq!(rows[0].row.display_name, "Gamma-2");
    assert_eq!(numeric_sort_value(&rows[0].row, SortKey::Rating), 0.0);
    assert_eq!(rows[0].row.rating, None);
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let mut rows = sample();
    sort_rows(&mut rows, SortKey::Battles, SortDir::Asc);
    assert_eq!(names(&rows), vec!["Alpha", "Gamma-2", "alphabet", "beta"]);
    let mut rows = sample();
    sort_rows(&mut rows, SortKey::Battles, SortDir::Desc);
    assert_eq!(names(&rows), vec!["beta", "alphabet", "Alpha", "Gamma-2"]);
}

#[test]
fn absent_metrics_never_panic() {
    let mut rows = vec![ranked("x", 1), ranked("y", 2), ranked("z", 3)];
    for key in SortKey::ALL {
        sort_rows(&mut rows, key, SortDir::Desc);
        sort_rows(&mut rows, key, SortDir::Asc);
    }
    assert_eq!(rows.len(), 3);
}

#[test]
fn model_name_sort_ignores_case() {
    let mut rows = sample();
    sort_rows(&mut rows, SortKey::ModelName, SortDir::Asc);
    assert_eq!(names(&rows), vec!["Alpha", "alphabet", "beta", "Gamma-2"]);
}

#[test]
fn tier_sorts_as_text_with_absent_first() {
    let mut rows = sample();
    sort_rows(&mut rows, SortKey::Tier, SortDir::Asc);
    assert_eq!(names(&rows), vec!["Gamma-2", "alphabet", "beta", "Alpha"]);
}

#[test]
fn empty_input_returns_empty() {
    let q = QueryState::default();
    assert!(apply_query(&[], &q).is_empty());
}
