//! Data-refresh job: pulls the upstream arena API and writes the JSON files
//! the viewer reads. Shaping is split from I/O so it can be tested offline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::data_source::{
    HEALTH_FILE, HEATMAP_FILE, LEADERBOARD_FILE, PREVIOUS_LEADERBOARD_FILE, PROMPTS_FILE,
};
use crate::http_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Leaderboard,
    Health,
    Heatmap,
    Prompts,
}

impl Target {
    pub const ALL: [Target; 4] = [
        Target::Leaderboard,
        Target::Health,
        Target::Heatmap,
        Target::Prompts,
    ];

    pub fn parse_list(raw: &str) -> Option<Vec<Target>> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "leaderboard" => Some(vec![Target::Leaderboard]),
            "health" => Some(vec![Target::Health]),
            "heatmap" | "battle_statistics" => Some(vec![Target::Heatmap]),
            "prompts" | "prompt_statistics" => Some(vec![Target::Prompts]),
            "all" => Some(Target::ALL.to_vec()),
            _ => None,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Target::Leaderboard => "/leaderboard",
            Target::Health => "/health",
            Target::Heatmap => "/api/battle_statistics",
            Target::Prompts => "/prompt_statistics",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Target::Leaderboard => LEADERBOARD_FILE,
            Target::Health => HEALTH_FILE,
            Target::Heatmap => HEATMAP_FILE,
            Target::Prompts => PROMPTS_FILE,
        }
    }
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn endpoint_url(base: &str, target: Target) -> String {
    format!("{}{}", base.trim().trim_end_matches('/'), target.endpoint())
}

pub fn fetch_payload(base: &str, target: Target) -> Result<Value> {
    let url = endpoint_url(base, target);
    let body = http_client::get_text(&url)?;
    serde_json::from_str(&body).with_context(|| format!("invalid json from {url}"))
}

/// Keeps the upstream `leaderboard` array untouched; a wrong shape becomes `[]`.
pub fn leaderboard_document(payload: &Value, now: DateTime<Utc>) -> Value {
    let rows = payload
        .get("leaderboard")
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    json!({ "updatedAt": timestamp(now), "leaderboard": rows })
}

pub fn health_document(payload: &Value, now: DateTime<Utc>) -> Value {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");
    let count = |key: &str| payload.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "updatedAt": timestamp(now),
        "ok": status.eq_ignore_ascii_case("ok"),
        "status": status,
        "models_count": count("models_count"),
        "fixed_prompts_count": count("fixed_prompts_count"),
        "recorded_users_count": count("recorded_users_count"),
        "completed_battles_count": count("completed_battles_count"),
    })
}

pub fn health_error_document(reason: &str, now: DateTime<Utc>) -> Value {
    json!({
        "updatedAt": timestamp(now),
        "ok": false,
        "status": "error",
        "error": reason,
    })
}

pub fn heatmap_document(payload: &Value, now: DateTime<Utc>) -> Value {
    let matrix = |key: &str| {
        payload
            .get(key)
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    };
    json!({
        "updatedAt": timestamp(now),
        "win_rate_matrix": matrix("win_rate_matrix"),
        "match_count_matrix": matrix("match_count_matrix"),
    })
}

pub fn prompts_document(payload: &Value, now: DateTime<Utc>) -> Value {
    let stats = payload
        .get("prompt_statistics")
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    json!({ "updatedAt": timestamp(now), "prompt_statistics": stats })
}

/// Copies the current leaderboard aside so the next write has a previous
/// snapshot to diff against. Returns false when there was nothing to copy.
pub fn rotate_previous(dir: &Path) -> Result<bool> {
    let current = dir.join(LEADERBOARD_FILE);
    if !current.exists() {
        return Ok(false);
    }
    let previous = dir.join(PREVIOUS_LEADERBOARD_FILE);
    fs::copy(&current, &previous).with_context(|| {
        format!(
            "failed to copy {} to {}",
            current.display(),
            previous.display()
        )
    })?;
    Ok(true)
}

pub fn write_document(dir: &Path, name: &str, doc: &Value) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(doc).context("failed to encode json")?;
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
