//! Turns raw JSON payloads into canonical values.
//!
//! Nothing in here fails: unreadable or wrongly shaped input degrades to an
//! empty snapshot, an unhealthy health record, or empty matrices.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::state::{Health, Matrix, MatrixPayload, Row, Snapshot};

/// The two historical leaderboard schemas, resolved once at this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotPayload<'a> {
    /// `{ leaderboard: [{ model_name, rank, rating, ... }] }`
    Leaderboard(&'a [Value]),
    /// `{ entries: [{ rank, name, score }] }`
    Legacy(&'a [Value]),
    Unrecognized,
}

pub fn classify_payload(root: &Value) -> SnapshotPayload<'_> {
    if let Some(rows) = root.get("leaderboard").and_then(Value::as_array) {
        return SnapshotPayload::Leaderboard(rows);
    }
    if let Some(rows) = root.get("entries").and_then(Value::as_array) {
        return SnapshotPayload::Legacy(rows);
    }
    SnapshotPayload::Unrecognized
}

pub fn parse_snapshot_json(raw: &str) -> Snapshot {
    match parse_root(raw) {
        Some(root) => normalize_snapshot(&root),
        None => Snapshot::empty(),
    }
}

pub fn normalize_snapshot(root: &Value) -> Snapshot {
    let candidates: Vec<Row> = match classify_payload(root) {
        SnapshotPayload::Leaderboard(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| canonical_row(item, idx))
            .collect(),
        SnapshotPayload::Legacy(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| legacy_row(item, idx))
            .collect(),
        SnapshotPayload::Unrecognized => return Snapshot::empty(),
    };

    // Identities are unique per snapshot; the first occurrence wins.
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    let rows = candidates
        .into_iter()
        .filter(|row| seen.insert(row.identity.clone()))
        .collect();

    Snapshot {
        updated_at: root.get("updatedAt").and_then(parse_timestamp),
        rows,
    }
}

fn canonical_row(item: &Value, idx: usize) -> Option<Row> {
    if !item.is_object() {
        return None;
    }
    let name = pick_string(item, &["model_name", "name"])?;
    let mut row = Row::new(&name, pick_rank(item, idx));
    if row.identity.is_empty() {
        return None;
    }
    row.rating = pick_f64(item, &["rating", "score"]);
    row.rating_realtime = pick_f64(item, &["rating_realtime"]);
    row.rating_deviation = pick_f64(item, &["rating_deviation"]);
    row.rating_deviation_realtime = pick_f64(item, &["rating_deviation_realtime"]);
    row.volatility = pick_f64(item, &["volatility"]);
    row.volatility_realtime = pick_f64(item, &["volatility_realtime"]);
    row.tier = pick_string(item, &["tier"]).filter(|t| !t.is_empty());
    row.battles = pick_count(item, &["battles"]).unwrap_or(0);
    row.wins = pick_count(item, &["wins"]).unwrap_or(0);
    row.ties = pick_count(item, &["ties"]).unwrap_or(0);
    row.skips = pick_count(item, &["skips"]).unwrap_or(0);
    row.win_rate_pct = pick_f64(item, &["win_rate_percentage"]);
    Some(row)
}

fn legacy_row(item: &Value, idx: usize) -> Option<Row> {
    if !item.is_object() {
        return None;
    }
    let name = pick_string(item, &["name"])?;
    let mut row = Row::new(&name, pick_rank(item, idx));
    if row.identity.is_empty() {
        return None;
    }
    row.rating = pick_f64(item, &["score"]);
    Some(row)
}

// Missing or zero ranks fall back to the 1-based position in the payload.
fn pick_rank(item: &Value, idx: usize) -> u32 {
    pick_count(item, &["rank"])
        .filter(|rank| *rank >= 1)
        .unwrap_or_else(|| u32::try_from(idx + 1).unwrap_or(u32::MAX))
}

pub fn parse_health_json(raw: &str) -> Health {
    let Some(root) = parse_root(raw) else {
        return Health::unavailable("invalid health json");
    };
    if !root.is_object() {
        return Health::unavailable("health payload is not an object");
    }
    Health {
        ok: root.get("ok").and_then(Value::as_bool).unwrap_or(false),
        status: pick_string(&root, &["status"]).unwrap_or_else(|| "unknown".to_string()),
        models_count: pick_u64(&root, &["models_count"]),
        fixed_prompts_count: pick_u64(&root, &["fixed_prompts_count"]),
        recorded_users_count: pick_u64(&root, &["recorded_users_count"]),
        completed_battles_count: pick_u64(&root, &["completed_battles_count"]),
        error: pick_string(&root, &["error"]),
    }
}

pub fn parse_matrices_json(raw: &str) -> MatrixPayload {
    let Some(root) = parse_root(raw) else {
        return MatrixPayload::default();
    };
    MatrixPayload {
        win_rate: parse_matrix(root.get("win_rate_matrix")),
        match_count: parse_matrix(root.get("match_count_matrix")),
    }
}

/// Keeps only numeric cells; `null` and non-numeric values become absent.
pub fn parse_matrix(value: Option<&Value>) -> Matrix {
    let mut matrix = Matrix::new();
    let Some(Value::Object(rows)) = value else {
        return matrix;
    };
    for (row_label, cols) in rows {
        let mut out = BTreeMap::new();
        if let Value::Object(cols) = cols {
            for (col_label, cell) in cols {
                if let Some(v) = as_f64(cell) {
                    out.insert(col_label.clone(), v);
                }
            }
        }
        // Rows with no numeric cells still contribute their label.
        matrix.insert(row_label.clone(), out);
    }
    matrix
}

fn parse_root(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    let raw = value.as_str()?.trim();
    DateTime::parse_from_rfc3339(raw).ok()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| value.get(*key).and_then(as_f64))
}

fn pick_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    pick_f64(value, keys)
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u64)
}

fn pick_count(value: &Value, keys: &[&str]) -> Option<u32> {
    pick_u64(value, keys).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn as_f64(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    num.is_finite().then_some(num)
}
