//! Pairwise matrix layout: label universe, dense value grid, pixel geometry
//! and color scale for the win-rate and match-count heatmaps.
//!
//! Every function here is a pure function of its inputs. Empty matrices and
//! zero container widths produce valid, possibly zero-row, layouts.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::i18n::Locale;
use crate::layout::is_compact_viewport;
use crate::state::{Matrix, MatrixPayload};

/// Container width assumed when the caller reports zero.
pub const FALLBACK_CONTAINER_WIDTH: u32 = 600;

const TOP_MARGIN: i64 = 24;
const LEFT_CAP: i64 = 220;
const LEFT_FLOOR: i64 = 64;
const LABEL_PAD: i64 = 14;
const BOTTOM_CAP: i64 = 160;
const BOTTOM_FLOOR: i64 = 56;
const LEGEND_GUTTER: i64 = 18;
const RIGHT_FLOOR: i64 = 92;
const LEGEND_CHAR_PX: i64 = 8;
const MIN_GRID: i64 = 100;

const WIN_RATE_STOPS: [Rgb; 7] = [
    Rgb::hex(0x0b3d91),
    Rgb::hex(0x4f86c6),
    Rgb::hex(0xa7c7e7),
    Rgb::hex(0xf9f1dc),
    Rgb::hex(0xf2c572),
    Rgb::hex(0xe58e26),
    Rgb::hex(0xc44536),
];

const MATCH_COUNT_STOPS: [Rgb; 7] = [
    Rgb::hex(0x00429d),
    Rgb::hex(0x4771b2),
    Rgb::hex(0x7fb0d5),
    Rgb::hex(0xf9f1dc),
    Rgb::hex(0xf7b267),
    Rgb::hex(0xf4845f),
    Rgb::hex(0xdc2f02),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    WinRate,
    MatchCount,
}

impl MatrixKind {
    /// Win rates arrive as fractions and are shown as whole percents.
    pub fn transform(self, raw: f64) -> f64 {
        match self {
            MatrixKind::WinRate => (raw * 100.0).round(),
            MatrixKind::MatchCount => raw,
        }
    }

    fn stops(self) -> &'static [Rgb; 7] {
        match self {
            MatrixKind::WinRate => &WIN_RATE_STOPS,
            MatrixKind::MatchCount => &MATCH_COUNT_STOPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn from_width(width: u32) -> Self {
        if is_compact_viewport(width) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn font_size(self) -> u32 {
        match self {
            DeviceClass::Mobile => 10,
            DeviceClass::Desktop => 11,
        }
    }

    /// Column label rotation; steeper on narrow screens.
    pub fn label_rotation_deg(self) -> u32 {
        match self {
            DeviceClass::Mobile => 60,
            DeviceClass::Desktop => 45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn hex(code: u32) -> Self {
        Self {
            r: ((code >> 16) & 0xff) as u8,
            g: ((code >> 8) & 0xff) as u8,
            b: (code & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub col: usize,
    pub row: usize,
    pub row_label: String,
    pub col_label: String,
    /// Transformed value; `None` means the pair was never reported.
    pub value: Option<f64>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridRect {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapLayout {
    pub grid: GridRect,
    pub container_width: i64,
    pub container_height: i64,
    pub label_rotation_deg: u32,
    pub font_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapView {
    pub kind: MatrixKind,
    pub labels: Vec<String>,
    /// Row-major: `cells[row * labels.len() + col]`.
    pub cells: Vec<HeatCell>,
    pub domain: ColorDomain,
    pub legend_max: String,
    pub layout: HeatmapLayout,
}

impl HeatmapView {
    pub fn cell(&self, col: usize, row: usize) -> Option<&HeatCell> {
        let n = self.labels.len();
        if col >= n || row >= n {
            return None;
        }
        self.cells.get(row * n + col)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPair {
    pub win_rate: HeatmapView,
    pub match_count: HeatmapView,
}

/// Sorted union of every row and column key across both matrices.
pub fn label_universe(win_rate: &Matrix, match_count: &Matrix) -> Vec<String> {
    let mut set: BTreeSet<&str> = BTreeSet::new();
    for matrix in [win_rate, match_count] {
        for (row, cols) in matrix {
            set.insert(row.as_str());
            set.extend(cols.keys().map(String::as_str));
        }
    }
    set.into_iter().map(str::to_string).collect()
}

/// One cell per `(col, row)` pair, row-major. Pairs missing from the matrix
/// stay `None`; the reverse pair is never consulted.
pub fn dense_grid(labels: &[String], matrix: &Matrix, kind: MatrixKind) -> Vec<HeatCell> {
    let mut cells = Vec::with_capacity(labels.len() * labels.len());
    for (row, row_label) in labels.iter().enumerate() {
        let row_values = matrix.get(row_label);
        for (col, col_label) in labels.iter().enumerate() {
            let value = row_values
                .and_then(|cols| cols.get(col_label))
                .map(|raw| kind.transform(*raw));
            cells.push(HeatCell {
                col,
                row,
                row_label: row_label.clone(),
                col_label: col_label.clone(),
                value,
                color: None,
            });
        }
    }
    cells
}

fn is_wide_glyph(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3040}'..='\u{30ff}' | '\u{ff00}'..='\u{ffef}')
}

/// Rough pixel width of a label. Any CJK glyph widens the whole label's
/// per-character estimate.
pub fn estimate_text_width(text: &str, font_size: u32) -> i64 {
    let per = if text.chars().any(is_wide_glyph) {
        0.95
    } else {
        0.55
    };
    let len = text.encode_utf16().count() as f64;
    let est = (len * per * f64::from(font_size)).ceil() as i64;
    est.max(8)
}

pub fn effective_container_width(container_width: u32) -> u32 {
    if container_width == 0 {
        FALLBACK_CONTAINER_WIDTH
    } else {
        container_width
    }
}

pub fn compute_layout(
    container_width: u32,
    labels: &[String],
    legend_text: &str,
    device: DeviceClass,
) -> HeatmapLayout {
    let font = device.font_size();
    let angle = f64::from(device.label_rotation_deg()).to_radians();
    let longest = labels
        .iter()
        .map(|label| estimate_text_width(label, font))
        .max()
        .unwrap_or(0);

    let left_min = (longest + LABEL_PAD).max(LEFT_FLOOR).min(LEFT_CAP);
    let bottom_needed = (longest as f64 * angle.sin()).ceil() as i64 + LEGEND_GUTTER;
    let bottom = bottom_needed.max(BOTTOM_FLOOR).min(BOTTOM_CAP);
    let legend_len = match legend_text.encode_utf16().count() {
        0 => 3,
        n => n as i64,
    };
    let right = RIGHT_FLOOR.max(LABEL_PAD + legend_len * LEGEND_CHAR_PX + 22);

    let width = i64::from(effective_container_width(container_width));
    let grid_width = MIN_GRID.max(width - left_min - right);
    let left = left_min.max((width - right - grid_width).div_euclid(2));

    HeatmapLayout {
        grid: GridRect {
            top: TOP_MARGIN,
            right,
            bottom,
            left,
            width: grid_width,
            height: grid_width,
        },
        container_width: width,
        container_height: TOP_MARGIN + grid_width + bottom,
        label_rotation_deg: device.label_rotation_deg(),
        font_size: font,
    }
}

/// Win rate is fixed to `[0, 100]`; match count spans `[0, max(observed, 1)]`.
pub fn color_domain(kind: MatrixKind, cells: &[HeatCell]) -> ColorDomain {
    match kind {
        MatrixKind::WinRate => ColorDomain {
            min: 0.0,
            max: 100.0,
        },
        MatrixKind::MatchCount => {
            let observed = cells
                .iter()
                .filter_map(|c| c.value)
                .fold(0.0_f64, f64::max);
            ColorDomain {
                min: 0.0,
                max: observed.max(1.0),
            }
        }
    }
}

pub fn color_for(value: Option<f64>, domain: ColorDomain, kind: MatrixKind) -> Option<Rgb> {
    let v = value.filter(|v| v.is_finite())?;
    let stops = kind.stops();
    let span = domain.max - domain.min;
    let t = if span > 0.0 {
        ((v - domain.min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let pos = t * (stops.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(stops.len() - 2);
    Some(stops[idx].lerp(stops[idx + 1], pos - idx as f64))
}

/// Formats like a JS number: integers without a fraction.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn build_view(
    kind: MatrixKind,
    labels: &[String],
    matrix: &Matrix,
    container_width: u32,
) -> HeatmapView {
    let mut cells = dense_grid(labels, matrix, kind);
    let domain = color_domain(kind, &cells);
    for cell in &mut cells {
        cell.color = color_for(cell.value, domain, kind);
    }
    let legend_max = format_number(domain.max);
    let width = effective_container_width(container_width);
    let layout = compute_layout(width, labels, &legend_max, DeviceClass::from_width(width));
    HeatmapView {
        kind,
        labels: labels.to_vec(),
        cells,
        domain,
        legend_max,
        layout,
    }
}

/// Both heatmaps share one label ordering.
pub fn build_heatmaps(payload: &MatrixPayload, container_width: u32) -> HeatmapPair {
    let labels = label_universe(&payload.win_rate, &payload.match_count);
    HeatmapPair {
        win_rate: build_view(
            MatrixKind::WinRate,
            &labels,
            &payload.win_rate,
            container_width,
        ),
        match_count: build_view(
            MatrixKind::MatchCount,
            &labels,
            &payload.match_count,
            container_width,
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub kind: MatrixKind,
    pub row_label: String,
    pub col_label: String,
    pub value: Option<f64>,
    /// The other matrix's value for the same pair, transformed.
    pub companion: Option<f64>,
}

impl Tooltip {
    pub fn lines(&self, locale: Locale) -> Vec<String> {
        let texts = locale.texts();
        let pair = format!("{} × {}", self.row_label, self.col_label);
        let first = match (self.value, self.kind) {
            (None, _) => format!("{pair}: {}", texts.tooltip_na),
            (Some(v), MatrixKind::WinRate) => format!("{pair}: {}%", format_number(v)),
            (Some(v), MatrixKind::MatchCount) => format!("{pair}: {}", format_number(v)),
        };
        let mut lines = vec![first];
        match (self.companion, self.kind) {
            (Some(count), MatrixKind::WinRate) => {
                lines.push(format!("{}: {}", texts.match_count_title, format_number(count)))
            }
            (Some(pct), MatrixKind::MatchCount) => {
                lines.push(format!("{}: {}%", texts.win_rate_title, format_number(pct)))
            }
            (None, _) => {}
        }
        lines
    }
}

/// Hover details for cell `(col, row)` of `view`. The companion value is
/// looked up at `[row][col]`, then `[col][row]`.
pub fn tooltip(payload: &MatrixPayload, view: &HeatmapView, col: usize, row: usize) -> Option<Tooltip> {
    let cell = view.cell(col, row)?;
    let (companion_matrix, companion_kind) = match view.kind {
        MatrixKind::WinRate => (&payload.match_count, MatrixKind::MatchCount),
        MatrixKind::MatchCount => (&payload.win_rate, MatrixKind::WinRate),
    };
    let companion = symmetric_lookup(companion_matrix, &cell.row_label, &cell.col_label)
        .map(|raw| companion_kind.transform(raw));
    Some(Tooltip {
        kind: view.kind,
        row_label: cell.row_label.clone(),
        col_label: cell.col_label.clone(),
        value: cell.value,
        companion,
    })
}

/// Keeps a `(col, row)` cursor inside an `n`-label grid after a reload.
pub fn clamp_cursor((col, row): (usize, usize), n: usize) -> (usize, usize) {
    let last = n.saturating_sub(1);
    (col.min(last), row.min(last))
}

fn symmetric_lookup(matrix: &Matrix, row: &str, col: &str) -> Option<f64> {
    matrix
        .get(row)
        .and_then(|cols| cols.get(col))
        .or_else(|| matrix.get(col).and_then(|cols| cols.get(row)))
        .copied()
}
