use std::collections::HashMap;

use serde::Serialize;

use crate::state::{Row, Snapshot};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// Signed differences between a current row and its previous counterpart.
/// All fields are `None` when the identity was not present before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RowDelta {
    /// `current.rank - previous.rank`; negative means the model climbed.
    pub rank_delta: Option<i64>,
    pub rating_delta: Option<f64>,
    pub win_rate_delta: Option<f64>,
}

impl RowDelta {
    pub fn is_matched(&self) -> bool {
        self.rank_delta.is_some()
    }

    /// Rank polarity is inverted: a smaller rank number is an improvement.
    pub fn rank_trend(&self) -> Option<Trend> {
        match self.rank_delta? {
            d if d < 0 => Some(Trend::Up),
            d if d > 0 => Some(Trend::Down),
            _ => None,
        }
    }

    pub fn rating_trend(&self) -> Option<Trend> {
        metric_trend(self.rating_delta)
    }

    pub fn win_rate_trend(&self) -> Option<Trend> {
        metric_trend(self.win_rate_delta)
    }
}

fn metric_trend(delta: Option<f64>) -> Option<Trend> {
    let d = delta?;
    if d > EPSILON {
        Some(Trend::Up)
    } else if d < -EPSILON {
        Some(Trend::Down)
    } else {
        None
    }
}

/// A current row paired with its delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub row: Row,
    pub delta: RowDelta,
}

/// Deltas aligned index-for-index with `current.rows`.
pub fn reconcile(current: &Snapshot, previous: &Snapshot) -> Vec<RowDelta> {
    let lookup = previous_lookup(previous);
    current
        .rows
        .iter()
        .map(|row| match lookup.get(row.identity.as_str()) {
            Some(prev) => row_delta(row, prev),
            None => RowDelta::default(),
        })
        .collect()
}

pub fn attach_deltas(current: &Snapshot, previous: &Snapshot) -> Vec<RankedRow> {
    current
        .rows
        .iter()
        .zip(reconcile(current, previous))
        .map(|(row, delta)| RankedRow {
            row: row.clone(),
            delta,
        })
        .collect()
}

pub fn row_delta(current: &Row, previous: &Row) -> RowDelta {
    RowDelta {
        rank_delta: Some(i64::from(current.rank) - i64::from(previous.rank)),
        rating_delta: paired_delta(
            (current.rating_realtime, current.rating),
            (previous.rating_realtime, previous.rating),
        ),
        win_rate_delta: match (current.win_rate_pct, previous.win_rate_pct) {
            (Some(cur), Some(prev)) => Some(cur - prev),
            _ => None,
        },
    }
}

// Both sides must read the same field: realtime when both have it, else
// primary when both have it.
fn paired_delta(current: (Option<f64>, Option<f64>), previous: (Option<f64>, Option<f64>)) -> Option<f64> {
    match (current, previous) {
        ((Some(cur), _), (Some(prev), _)) => Some(cur - prev),
        ((_, Some(cur)), (_, Some(prev))) => Some(cur - prev),
        _ => None,
    }
}

fn previous_lookup(previous: &Snapshot) -> HashMap<&str, &Row> {
    let mut lookup = HashMap::with_capacity(previous.rows.len());
    for row in &previous.rows {
        lookup.entry(row.identity.as_str()).or_insert(row);
    }
    lookup
}
