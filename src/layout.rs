//! Column-set selection for the leaderboard table.
//!
//! The table has two mutually exclusive shapes chosen from the viewport
//! width: a wide table with every column, and a compact two-line card per
//! row with an optional highlighted metric and collapsible detail cells.

use std::collections::HashSet;

use serde::Serialize;

use crate::query::{QueryState, SortDir, SortKey};
use crate::reconcile::{RankedRow, Trend};
use crate::state::Row;

/// Widths at or below this many pixels use the compact table and the mobile
/// heatmap geometry.
pub const BREAKPOINT_TABLE: u32 = 480;

pub fn is_compact_viewport(width: u32) -> bool {
    width <= BREAKPOINT_TABLE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Wide,
    Compact,
}

impl LayoutMode {
    pub fn from_viewport(width: u32) -> Self {
        Self::from_compact(is_compact_viewport(width))
    }

    pub fn from_compact(is_compact: bool) -> Self {
        if is_compact {
            LayoutMode::Compact
        } else {
            LayoutMode::Wide
        }
    }

    pub fn is_compact(self) -> bool {
        self == LayoutMode::Compact
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Wide => "wide",
            LayoutMode::Compact => "compact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutTransition {
    Unchanged,
    /// The breakpoint was crossed. Callers drop presentation state.
    Reload(LayoutMode),
}

/// Two-state machine driven by `is_compact` observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSelector {
    mode: LayoutMode,
}

impl LayoutSelector {
    pub fn new(mode: LayoutMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn observe(&mut self, is_compact: bool) -> LayoutTransition {
        let next = LayoutMode::from_compact(is_compact);
        if next == self.mode {
            return LayoutTransition::Unchanged;
        }
        self.mode = next;
        LayoutTransition::Reload(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Wide columns and the first line of a compact card.
    Main,
    /// Rating sub-metrics on the second compact line.
    Sub,
    /// Compact-only: the active sort metric when not already visible.
    Highlight,
    /// Compact-only: shown when the card is expanded.
    Detail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub key: SortKey,
    pub role: ColumnRole,
    pub with_delta: bool,
    /// Direction marker when this column is the active sort key.
    pub sort: Option<SortDir>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Integer(i64),
    Decimal { value: f64, places: usize },
    Text(String),
    Absent,
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            CellValue::Integer(v) => v.to_string(),
            CellValue::Decimal { value, places } => format!("{value:.places$}"),
            CellValue::Text(s) => s.clone(),
            CellValue::Absent => String::new(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaBadge {
    pub trend: Trend,
    /// Raw signed delta. For rank, negative is an improvement.
    pub delta: f64,
    pub places: usize,
}

impl DeltaBadge {
    pub fn marker(&self) -> &'static str {
        match self.trend {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }

    pub fn label(&self) -> String {
        let places = self.places;
        format!("{}{:.places$}", self.marker(), self.delta.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub key: SortKey,
    pub role: ColumnRole,
    pub value: CellValue,
    pub delta: Option<DeltaBadge>,
}

impl Cell {
    pub fn display(&self) -> String {
        self.value.display()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub identity: String,
    pub expanded: bool,
    pub cells: Vec<Cell>,
}

impl RowView {
    pub fn cell(&self, key: SortKey) -> Option<&Cell> {
        self.cells.iter().find(|c| c.key == key)
    }

    pub fn cells_with_role(&self, role: ColumnRole) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.role == role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDescriptor {
    pub mode: LayoutMode,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<RowView>,
    pub sort_options: Vec<SortKey>,
    /// True when `rows` is empty; drivers show the no-data placeholder.
    pub empty: bool,
}

const WIDE_COLUMNS: [SortKey; 11] = SortKey::ALL;

// Already on the first or second compact line.
const COMPACT_VISIBLE: [SortKey; 5] = [
    SortKey::Rank,
    SortKey::ModelName,
    SortKey::Rating,
    SortKey::RatingDeviation,
    SortKey::Volatility,
];

const COMPACT_DETAIL: [SortKey; 5] = [
    SortKey::Battles,
    SortKey::Wins,
    SortKey::Ties,
    SortKey::Skips,
    SortKey::WinRatePercentage,
];

pub fn select_layout(
    mode: LayoutMode,
    rows: &[RankedRow],
    query: &QueryState,
    expanded: &HashSet<String>,
) -> LayoutDescriptor {
    let columns = match mode {
        LayoutMode::Wide => wide_columns(query),
        LayoutMode::Compact => compact_columns(query),
    };
    let rows: Vec<RowView> = rows
        .iter()
        .map(|ranked| RowView {
            identity: ranked.row.identity.clone(),
            expanded: mode.is_compact() && expanded.contains(&ranked.row.identity),
            cells: columns.iter().map(|col| build_cell(ranked, col)).collect(),
        })
        .collect();
    LayoutDescriptor {
        mode,
        empty: rows.is_empty(),
        columns,
        rows,
        sort_options: SortKey::ALL.to_vec(),
    }
}

fn wide_columns(query: &QueryState) -> Vec<ColumnSpec> {
    WIDE_COLUMNS
        .iter()
        .map(|key| column(*key, ColumnRole::Main, query))
        .collect()
}

fn compact_columns(query: &QueryState) -> Vec<ColumnSpec> {
    let mut cols = vec![
        column(SortKey::Rank, ColumnRole::Main, query),
        column(SortKey::ModelName, ColumnRole::Main, query),
        column(SortKey::Rating, ColumnRole::Main, query),
        column(SortKey::RatingDeviation, ColumnRole::Sub, query),
        column(SortKey::Volatility, ColumnRole::Sub, query),
    ];
    if !COMPACT_VISIBLE.contains(&query.sort_key) {
        cols.push(column(query.sort_key, ColumnRole::Highlight, query));
    }
    cols.extend(
        COMPACT_DETAIL
            .iter()
            .map(|key| column(*key, ColumnRole::Detail, query)),
    );
    if query.sort_key != SortKey::Tier {
        cols.push(column(SortKey::Tier, ColumnRole::Detail, query));
    }
    cols
}

fn column(key: SortKey, role: ColumnRole, query: &QueryState) -> ColumnSpec {
    ColumnSpec {
        key,
        role,
        with_delta: carries_delta(key) && role != ColumnRole::Highlight,
        sort: (query.sort_key == key).then_some(query.sort_dir),
    }
}

fn carries_delta(key: SortKey) -> bool {
    matches!(
        key,
        SortKey::Rank | SortKey::Rating | SortKey::WinRatePercentage
    )
}

fn build_cell(ranked: &RankedRow, col: &ColumnSpec) -> Cell {
    Cell {
        key: col.key,
        role: col.role,
        value: cell_value(&ranked.row, col.key),
        delta: if col.with_delta {
            delta_badge(ranked, col.key)
        } else {
            None
        },
    }
}

/// Display value for one metric. Absent stays absent; it is never shown as 0.
pub fn cell_value(row: &Row, key: SortKey) -> CellValue {
    let decimal = |value: Option<f64>, places: usize| match value {
        Some(value) => CellValue::Decimal { value, places },
        None => CellValue::Absent,
    };
    match key {
        SortKey::Rank => CellValue::Integer(i64::from(row.rank)),
        SortKey::ModelName => CellValue::Text(row.display_name.clone()),
        SortKey::Rating => decimal(row.effective_rating(), 1),
        SortKey::Tier => match &row.tier {
            Some(tier) => CellValue::Text(tier.clone()),
            None => CellValue::Absent,
        },
        SortKey::RatingDeviation => decimal(row.effective_rating_deviation(), 1),
        SortKey::Volatility => decimal(row.effective_volatility(), 4),
        SortKey::Battles => CellValue::Integer(i64::from(row.battles)),
        SortKey::Wins => CellValue::Integer(i64::from(row.wins)),
        SortKey::Ties => CellValue::Integer(i64::from(row.ties)),
        SortKey::Skips => CellValue::Integer(i64::from(row.skips)),
        SortKey::WinRatePercentage => decimal(row.win_rate_pct, 2),
    }
}

fn delta_badge(ranked: &RankedRow, key: SortKey) -> Option<DeltaBadge> {
    let delta = &ranked.delta;
    let (trend, value, places) = match key {
        SortKey::Rank => (delta.rank_trend()?, delta.rank_delta? as f64, 0),
        SortKey::Rating => (delta.rating_trend()?, delta.rating_delta?, 1),
        SortKey::WinRatePercentage => (delta.win_rate_trend()?, delta.win_rate_delta?, 2),
        _ => return None,
    };
    Some(DeltaBadge {
        trend,
        delta: value,
        places,
    })
}
