use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};
use serde_json::json;

use arena_terminal::data_source::{
    DataSource, HEALTH_FILE, LEADERBOARD_FILE, PREVIOUS_LEADERBOARD_FILE,
};
use arena_terminal::refresh::{
    Target, health_document, health_error_document, heatmap_document, leaderboard_document,
    prompts_document, rotate_previous, write_document,
};

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("arena_terminal_{tag}_{nanos}"));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[test]
fn leaderboard_document_keeps_rows_verbatim() {
    let payload = json!({ "leaderboard": [{ "model_name": "a", "rating": 1500 }], "extra": 1 });
    let doc = leaderboard_document(&payload, now());
    assert_eq!(doc["updatedAt"], "2025-06-01T08:30:00.000Z");
    assert_eq!(doc["leaderboard"][0]["model_name"], "a");
    assert!(doc.get("extra").is_none());

    let doc = leaderboard_document(&json!({ "leaderboard": "nope" }), now());
    assert_eq!(doc["leaderboard"], json!([]));
}

#[test]
fn health_documents() {
    let doc = health_document(&json!({ "status": "OK", "models_count": 12 }), now());
    assert_eq!(doc["ok"], true);
    assert_eq!(doc["models_count"], 12);
    assert!(doc["completed_battles_count"].is_null());

    let doc = health_document(&json!({}), now());
    assert_eq!(doc["ok"], false);
    assert_eq!(doc["status"], "unknown");

    let doc = health_error_document("connection refused", now());
    assert_eq!(doc["ok"], false);
    assert_eq!(doc["status"], "error");
    assert_eq!(doc["error"], "connection refused");
}

#[test]
fn heatmap_and_prompt_documents_default_missing_parts() {
    let doc = heatmap_document(&json!({ "win_rate_matrix": { "a": { "b": 0.5 } } }), now());
    assert_eq!(doc["win_rate_matrix"]["a"]["b"], 0.5);
    assert_eq!(doc["match_count_matrix"], json!({}));

    let doc = prompts_document(&json!({}), now());
    assert_eq!(doc["prompt_statistics"], json!([]));
}

#[test]
fn written_files_read_back_through_the_viewer() {
    let dir = scratch_dir("roundtrip");
    assert!(!rotate_previous(&dir).expect("rotate on empty dir"));

    let payload = json!({ "leaderboard": [
        { "rank": 1, "model_name": "Alpha", "rating": 1600 },
        { "rank": 2, "model_name": "Beta", "rating": 1550 }
    ]});
    write_document(&dir, LEADERBOARD_FILE, &leaderboard_document(&payload, now()))
        .expect("write leaderboard");
    assert!(rotate_previous(&dir).expect("rotate"));
    assert!(dir.join(PREVIOUS_LEADERBOARD_FILE).exists());

    write_document(
        &dir,
        HEALTH_FILE,
        &health_error_document("boom", now()),
    )
    .expect("write health");

    let source = DataSource::Dir(dir.clone());
    let current = source.load_current().expect("current");
    let previous = source.load_previous().expect("previous");
    assert_eq!(current.rows.len(), 2);
    assert_eq!(current, previous);
    let health = source.load_health().expect("health");
    assert!(!health.is_healthy());
    assert_eq!(health.error.as_deref(), Some("boom"));
    assert!(source.load_matrices().is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn target_file_names_match_viewer() {
    assert_eq!(Target::Leaderboard.file_name(), LEADERBOARD_FILE);
    assert_eq!(Target::Health.file_name(), HEALTH_FILE);
}
