use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::reconcile::RankedRow;
use crate::state::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Rank,
    ModelName,
    Rating,
    Tier,
    RatingDeviation,
    Volatility,
    Battles,
    Wins,
    Ties,
    Skips,
    WinRatePercentage,
}

impl SortKey {
    /// Wide-table column order.
    pub const ALL: [SortKey; 11] = [
        SortKey::Rank,
        SortKey::ModelName,
        SortKey::Rating,
        SortKey::Tier,
        SortKey::RatingDeviation,
        SortKey::Volatility,
        SortKey::Battles,
        SortKey::Wins,
        SortKey::Ties,
        SortKey::Skips,
        SortKey::WinRatePercentage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Rank => "rank",
            SortKey::ModelName => "model_name",
            SortKey::Rating => "rating",
            SortKey::Tier => "tier",
            SortKey::RatingDeviation => "rating_deviation",
            SortKey::Volatility => "volatility",
            SortKey::Battles => "battles",
            SortKey::Wins => "wins",
            SortKey::Ties => "ties",
            SortKey::Skips => "skips",
            SortKey::WinRatePercentage => "win_rate_percentage",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        SortKey::ALL.into_iter().find(|key| key.as_str() == needle)
    }

    /// Direction used when this key becomes active. Lower rank is better,
    /// every other metric reads best first when descending.
    pub fn default_dir(self) -> SortDir {
        match self {
            SortKey::Rank => SortDir::Asc,
            _ => SortDir::Desc,
        }
    }

    pub fn is_textual(self) -> bool {
        matches!(self, SortKey::ModelName | SortKey::Tier)
    }

    pub fn next(self) -> Self {
        let idx = SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn toggled(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDir::Asc),
            "desc" => Some(SortDir::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Always stored trimmed and lowercased.
    pub search_query: String,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            sort_key: SortKey::Rank,
            sort_dir: SortDir::Asc,
        }
    }
}

impl QueryState {
    pub fn set_search(&mut self, raw: &str) {
        self.search_query = raw.trim().to_lowercase();
    }

    /// Same key flips direction; a new key starts at its default direction.
    pub fn request_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_dir = self.sort_dir.toggled();
        } else {
            self.sort_key = key;
            self.sort_dir = key.default_dir();
        }
    }
}

pub fn filter_rows(rows: &[RankedRow], query: &str) -> Vec<RankedRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| r.row.identity.contains(&needle))
        .cloned()
        .collect()
}

/// Stable in both directions: equal keys keep their input order.
pub fn sort_rows(rows: &mut [RankedRow], key: SortKey, dir: SortDir) {
    rows.sort_by(|a, b| {
        let ord = compare_rows(&a.row, &b.row, key);
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

pub fn apply_query(rows: &[RankedRow], query: &QueryState) -> Vec<RankedRow> {
    let mut out = filter_rows(rows, &query.search_query);
    sort_rows(&mut out, query.sort_key, query.sort_dir);
    out
}

fn compare_rows(a: &Row, b: &Row, key: SortKey) -> Ordering {
    match key {
        SortKey::ModelName => collate(&a.identity, &b.identity),
        SortKey::Tier => collate(
            a.tier.as_deref().unwrap_or(""),
            b.tier.as_deref().unwrap_or(""),
        ),
        _ => {
            let va = numeric_sort_value(a, key);
            let vb = numeric_sort_value(b, key);
            va.partial_cmp(&vb).unwrap_or(Ordering::Equal)
        }
    }
}

/// Value used for ordering only. Absent metrics order as 0.
pub fn numeric_sort_value(row: &Row, key: SortKey) -> f64 {
    let value = match key {
        SortKey::Rank => Some(f64::from(row.rank)),
        SortKey::Rating => row.effective_rating(),
        SortKey::RatingDeviation => row.effective_rating_deviation(),
        SortKey::Volatility => row.effective_volatility(),
        SortKey::Battles => Some(f64::from(row.battles)),
        SortKey::Wins => Some(f64::from(row.wins)),
        SortKey::Ties => Some(f64::from(row.ties)),
        SortKey::Skips => Some(f64::from(row.skips)),
        SortKey::WinRatePercentage => row.win_rate_pct,
        SortKey::ModelName | SortKey::Tier => None,
    };
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

// Case-insensitive ordering close to a dictionary collation: punctuation and
// symbols before digits, digits before letters, then codepoint order.
fn collate(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().flat_map(char::to_lowercase);
    let mut right = b.chars().flat_map(char::to_lowercase);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = char_class(x).cmp(&char_class(y)).then(x.cmp(&y));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn char_class(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if c.is_alphanumeric() {
        if c.is_numeric() { 2 } else { 3 }
    } else {
        1
    }
}
