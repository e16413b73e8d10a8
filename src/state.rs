use std::collections::{BTreeMap, HashSet, VecDeque};
use std::env;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::health::{self, HealthView};
use crate::heatmap::{self, HeatmapPair};
use crate::i18n::Locale;
use crate::layout::{self, LayoutDescriptor, LayoutMode, LayoutSelector, LayoutTransition};
use crate::query::{self, QueryState, SortKey};
use crate::reconcile::{self, RankedRow};

/// One model on the leaderboard, after normalization.
///
/// Metrics that the source omitted stay `None`; they are never defaulted to
/// zero here. Counters (`battles`, `wins`, ...) default to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Lowercased, trimmed display name. Matching key across snapshots.
    pub identity: String,
    pub display_name: String,
    pub rank: u32,
    pub rating: Option<f64>,
    pub rating_realtime: Option<f64>,
    pub rating_deviation: Option<f64>,
    pub rating_deviation_realtime: Option<f64>,
    pub volatility: Option<f64>,
    pub volatility_realtime: Option<f64>,
    pub tier: Option<String>,
    pub battles: u32,
    pub wins: u32,
    pub ties: u32,
    pub skips: u32,
    pub win_rate_pct: Option<f64>,
}

impl Row {
    pub fn new(display_name: &str, rank: u32) -> Self {
        Self {
            identity: identity_key(display_name),
            display_name: display_name.trim().to_string(),
            rank,
            rating: None,
            rating_realtime: None,
            rating_deviation: None,
            rating_deviation_realtime: None,
            volatility: None,
            volatility_realtime: None,
            tier: None,
            battles: 0,
            wins: 0,
            ties: 0,
            skips: 0,
            win_rate_pct: None,
        }
    }

    // realtime -> primary -> absent, shared by sorting, display and deltas.
    pub fn effective_rating(&self) -> Option<f64> {
        self.rating_realtime.or(self.rating)
    }

    pub fn effective_rating_deviation(&self) -> Option<f64> {
        self.rating_deviation_realtime.or(self.rating_deviation)
    }

    pub fn effective_volatility(&self) -> Option<f64> {
        self.volatility_realtime.or(self.volatility)
    }
}

pub fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub rows: Vec<Row>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub ok: bool,
    pub status: String,
    pub models_count: Option<u64>,
    pub fixed_prompts_count: Option<u64>,
    pub recorded_users_count: Option<u64>,
    pub completed_battles_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Health {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: "error".to_string(),
            models_count: None,
            fixed_prompts_count: None,
            recorded_users_count: None,
            completed_battles_count: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.ok && self.status.trim().eq_ignore_ascii_case("ok")
    }
}

/// Square-ish pairwise matrix: `row label -> column label -> value`.
/// Pairs the source did not report are simply missing.
pub type Matrix = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixPayload {
    pub win_rate: Matrix,
    pub match_count: Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Leaderboard,
    Heatmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Default viewport used before the driver reports a real width.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 960;

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub locale: Locale,
    pub theme: Theme,
    pub viewport_width: u32,
    pub layout: LayoutSelector,
    pub current: Snapshot,
    pub previous: Snapshot,
    pub rows: Vec<RankedRow>,
    pub health: Option<Health>,
    pub matrices: MatrixPayload,
    pub query: QueryState,
    /// Search text as typed. `query.search_query` is its normalized form.
    pub search_input: String,
    pub selected: usize,
    pub expanded: HashSet<String>,
    pub search_active: bool,
    pub loading_current: bool,
    pub loading_previous: bool,
    pub loading_health: bool,
    pub loading_matrices: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let locale = env::var("ARENA_LANG")
            .ok()
            .and_then(|raw| Locale::parse(&raw))
            .unwrap_or(Locale::Zh);
        let theme = env::var("ARENA_THEME")
            .ok()
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or(Theme::Light);
        Self::with_viewport(DEFAULT_VIEWPORT_WIDTH, locale, theme)
    }

    pub fn with_viewport(viewport_width: u32, locale: Locale, theme: Theme) -> Self {
        Self {
            screen: Screen::Leaderboard,
            locale,
            theme,
            viewport_width,
            layout: LayoutSelector::new(LayoutMode::from_viewport(viewport_width)),
            current: Snapshot::empty(),
            previous: Snapshot::empty(),
            rows: Vec::new(),
            health: None,
            matrices: MatrixPayload::default(),
            query: QueryState::default(),
            search_input: String::new(),
            selected: 0,
            expanded: HashSet::new(),
            search_active: false,
            loading_current: true,
            loading_previous: true,
            loading_health: true,
            loading_matrices: true,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout.mode()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_current || self.loading_previous
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn rebuild_rows(&mut self) {
        self.rows = reconcile::attach_deltas(&self.current, &self.previous);
        self.clamp_selection();
    }

    /// Rows after the active search and sort, in display order.
    pub fn visible_rows(&self) -> Vec<RankedRow> {
        query::apply_query(&self.rows, &self.query)
    }

    pub fn selected_row(&self) -> Option<RankedRow> {
        self.visible_rows().into_iter().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    /// Recomputes every derived view. Pure with respect to `self`: calling it
    /// twice without intervening mutation yields equal output.
    pub fn presentation(&self) -> Presentation {
        let visible = self.visible_rows();
        let table =
            layout::select_layout(self.layout_mode(), &visible, &self.query, &self.expanded);
        let heatmaps = heatmap::build_heatmaps(&self.matrices, self.viewport_width);
        let all_rows: Vec<Row> = self.rows.iter().map(|r| r.row.clone()).collect();
        Presentation {
            screen: self.screen,
            locale: self.locale,
            theme: self.theme,
            query: self.query.clone(),
            table,
            heatmaps,
            total_battles: health::total_battles(self.health.as_ref(), &all_rows),
            health: health::health_view(self.health.as_ref()),
            updated_at: self.current.updated_at.map(|ts| ts.to_rfc3339()),
            loading: self.is_loading(),
        }
    }

    fn reload_presentation(&mut self) {
        self.query = QueryState::default();
        self.search_input.clear();
        self.expanded.clear();
        self.selected = 0;
        self.search_active = false;
    }
}

/// Everything a driver needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub screen: Screen,
    pub locale: Locale,
    pub theme: Theme,
    pub query: QueryState,
    pub table: LayoutDescriptor,
    pub heatmaps: HeatmapPair,
    pub total_battles: u64,
    pub health: HealthView,
    pub updated_at: Option<String>,
    pub loading: bool,
}

/// Data arriving from the loaders.
#[derive(Debug, Clone)]
pub enum Delta {
    SetCurrent(Snapshot),
    SetPrevious(Snapshot),
    SetHealth(Health),
    SetMatrices(MatrixPayload),
    Log(String),
}

/// Discrete user interactions.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SearchChanged(String),
    SortRequested(SortKey),
    ViewportResized(u32),
    ViewportClassChanged(bool),
    LocaleChanged(Locale),
    ThemeToggled,
    ToggleExpanded(String),
    ShowScreen(Screen),
}

/// Requests from the driver to the loader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    Reload,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetCurrent(snapshot) => {
            state.loading_current = false;
            state.push_log(format!(
                "[INFO] Leaderboard loaded: {} rows",
                snapshot.rows.len()
            ));
            state.current = snapshot;
            state.rebuild_rows();
        }
        Delta::SetPrevious(snapshot) => {
            state.loading_previous = false;
            if snapshot.is_empty() {
                state.push_log("[INFO] No previous leaderboard; deltas hidden");
            }
            state.previous = snapshot;
            state.rebuild_rows();
        }
        Delta::SetHealth(health) => {
            state.loading_health = false;
            if !health.is_healthy() {
                let reason = health.error.clone().unwrap_or_else(|| health.status.clone());
                state.push_log(format!("[WARN] Backend unhealthy: {reason}"));
            }
            state.health = Some(health);
        }
        Delta::SetMatrices(matrices) => {
            state.loading_matrices = false;
            state.matrices = matrices;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

/// Applies one interaction and returns the recomputed presentation.
pub fn apply_command(state: &mut AppState, command: Command) -> Presentation {
    match command {
        Command::SearchChanged(raw) => {
            state.query.set_search(&raw);
            state.search_input = raw;
            state.selected = 0;
        }
        Command::SortRequested(key) => {
            state.query.request_sort(key);
            state.selected = 0;
        }
        Command::ViewportResized(width) => {
            state.viewport_width = width;
            observe_viewport_class(state, layout::is_compact_viewport(width));
        }
        Command::ViewportClassChanged(is_compact) => observe_viewport_class(state, is_compact),
        Command::LocaleChanged(locale) => state.locale = locale,
        Command::ThemeToggled => state.theme = state.theme.toggled(),
        Command::ToggleExpanded(identity) => {
            if state.layout_mode() == LayoutMode::Compact && !state.expanded.remove(&identity) {
                state.expanded.insert(identity);
            }
        }
        Command::ShowScreen(screen) => state.screen = screen,
    }
    state.clamp_selection();
    state.presentation()
}

fn observe_viewport_class(state: &mut AppState, is_compact: bool) {
    if let LayoutTransition::Reload(mode) = state.layout.observe(is_compact) {
        state.reload_presentation();
        state.push_log(format!("[INFO] Layout switched to {}", mode.as_str()));
    }
}
