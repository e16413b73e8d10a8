//! Static UI text for the three supported locales.
//!
//! The core never formats labels itself; it hands semantic keys
//! (`SortKey`, `HealthCount`) to the driver, which looks them up here.

use serde::{Deserialize, Serialize};

use crate::health::HealthCount;
use crate::query::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Zh,
    En,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Zh, Locale::En, Locale::Ja];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" => Some(Locale::Zh),
            "en" => Some(Locale::En),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Zh => "zh",
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }

    /// Name of the locale in its own language, for the picker.
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::Zh => "中文",
            Locale::En => "English",
            Locale::Ja => "日本語",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Locale::Zh => Locale::En,
            Locale::En => Locale::Ja,
            Locale::Ja => Locale::Zh,
        }
    }

    pub fn texts(self) -> &'static Texts {
        match self {
            Locale::Zh => &ZH,
            Locale::En => &EN,
            Locale::Ja => &JA,
        }
    }

    /// Separator between a label and its value.
    pub fn kv_separator(self) -> &'static str {
        match self {
            Locale::En => ": ",
            Locale::Zh | Locale::Ja => "：",
        }
    }
}

#[derive(Debug)]
pub struct Texts {
    pub html_lang: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub heatmap_title: &'static str,
    pub heatmap_subtitle: &'static str,
    pub leaderboard_link: &'static str,
    pub heatmap_link: &'static str,
    pub search_placeholder: &'static str,
    pub total_battles: &'static str,
    pub last_updated: &'static str,
    pub loading: &'static str,
    pub no_data: &'static str,
    pub theme_to_light: &'static str,
    pub theme_to_dark: &'static str,
    pub sort_label: &'static str,
    pub health_prefix: &'static str,
    pub health_ok: &'static str,
    pub health_error: &'static str,
    pub win_rate_title: &'static str,
    pub match_count_title: &'static str,
    pub tooltip_na: &'static str,
    pub key_hints: &'static str,
}

static ZH: Texts = Texts {
    html_lang: "zh-CN",
    title: "类脑AI创意写作竞技场",
    subtitle: "Odysseia AI Creative Writing Arena",
    heatmap_title: "对战热力图",
    heatmap_subtitle: "Win Rate & Matches Heatmap",
    leaderboard_link: "排行榜",
    heatmap_link: "热力图",
    search_placeholder: "搜索模型名称...",
    total_battles: "总对战",
    last_updated: "最后更新",
    loading: "加载中...",
    no_data: "暂无数据",
    theme_to_light: "亮色模式",
    theme_to_dark: "暗色模式",
    sort_label: "排序",
    health_prefix: "后端状态",
    health_ok: "正常",
    health_error: "异常",
    win_rate_title: "胜率热力图(%)",
    match_count_title: "对战场次热力图",
    tooltip_na: "未对战",
    key_hints: "/ 搜索  o 排序  d 方向  Enter 展开  1/2 页面  l 语言  t 主题  r 刷新  q 退出",
};

static EN: Texts = Texts {
    html_lang: "en",
    title: "Odysseia AI Creative Writing Arena",
    subtitle: "类脑AI创意写作竞技场",
    heatmap_title: "Battle Heatmap",
    heatmap_subtitle: "Win Rate & Matches Heatmap",
    leaderboard_link: "Leaderboard",
    heatmap_link: "Heatmap",
    search_placeholder: "Search model name...",
    total_battles: "Total Battles",
    last_updated: "Last Updated",
    loading: "Loading...",
    no_data: "No data",
    theme_to_light: "Light Mode",
    theme_to_dark: "Dark Mode",
    sort_label: "Sort by",
    health_prefix: "Backend",
    health_ok: "OK",
    health_error: "Error",
    win_rate_title: "Win Rate Heatmap (%)",
    match_count_title: "Match Count Heatmap",
    tooltip_na: "No matches",
    key_hints: "/ search  o sort  d direction  Enter expand  1/2 screen  l language  t theme  r reload  q quit",
};

static JA: Texts = Texts {
    html_lang: "ja",
    title: "類脳AI創作競技場",
    subtitle: "类脑AI创意写作竞技场",
    heatmap_title: "対戦ヒートマップ",
    heatmap_subtitle: "勝率と対戦数のヒートマップ",
    leaderboard_link: "ランキング",
    heatmap_link: "ヒートマップ",
    search_placeholder: "モデル名を検索...",
    total_battles: "総対戦数",
    last_updated: "最終更新",
    loading: "読み込み中...",
    no_data: "データなし",
    theme_to_light: "ライトモード",
    theme_to_dark: "ダークモード",
    sort_label: "ソート",
    health_prefix: "バックエンド",
    health_ok: "正常",
    health_error: "異常",
    win_rate_title: "勝率ヒートマップ(%)",
    match_count_title: "対戦数ヒートマップ",
    tooltip_na: "対戦なし",
    key_hints: "/ 検索  o ソート  d 方向  Enter 展開  1/2 画面  l 言語  t テーマ  r 更新  q 終了",
};

pub fn column_label(locale: Locale, key: SortKey) -> &'static str {
    match (locale, key) {
        (Locale::Zh, SortKey::Rank) => "名次",
        (Locale::Zh, SortKey::ModelName) => "AI模型名",
        (Locale::Zh, SortKey::Rating) => "ELO评分",
        (Locale::Zh, SortKey::Tier) => "段位",
        (Locale::Zh, SortKey::RatingDeviation) => "评分偏差",
        (Locale::Zh, SortKey::Volatility) => "波动率",
        (Locale::Zh, SortKey::Battles) => "对战",
        (Locale::Zh, SortKey::Wins) => "胜",
        (Locale::Zh, SortKey::Ties) => "平",
        (Locale::Zh, SortKey::Skips) => "跳过",
        (Locale::Zh, SortKey::WinRatePercentage) => "胜率%",

        (Locale::En, SortKey::Rank) => "Rank",
        (Locale::En, SortKey::ModelName) => "Model",
        (Locale::En, SortKey::Rating) => "ELO",
        (Locale::En, SortKey::Tier) => "Tier",
        (Locale::En, SortKey::RatingDeviation) => "RD",
        (Locale::En, SortKey::Volatility) => "Volatility",
        (Locale::En, SortKey::Battles) => "Battles",
        (Locale::En, SortKey::Wins) => "Wins",
        (Locale::En, SortKey::Ties) => "Ties",
        (Locale::En, SortKey::Skips) => "Skips",
        (Locale::En, SortKey::WinRatePercentage) => "Win Rate %",

        (Locale::Ja, SortKey::Rank) => "順位",
        (Locale::Ja, SortKey::ModelName) => "モデル",
        (Locale::Ja, SortKey::Rating) => "ELO",
        (Locale::Ja, SortKey::Tier) => "ティア",
        (Locale::Ja, SortKey::RatingDeviation) => "RD",
        (Locale::Ja, SortKey::Volatility) => "ボラティリティ",
        (Locale::Ja, SortKey::Battles) => "対戦",
        (Locale::Ja, SortKey::Wins) => "勝",
        (Locale::Ja, SortKey::Ties) => "分",
        (Locale::Ja, SortKey::Skips) => "スキップ",
        (Locale::Ja, SortKey::WinRatePercentage) => "勝率%",
    }
}

pub fn health_count_label(locale: Locale, key: HealthCount) -> &'static str {
    match (locale, key) {
        (Locale::Zh, HealthCount::Models) => "模型",
        (Locale::Zh, HealthCount::FixedPrompts) => "固定题",
        (Locale::Zh, HealthCount::Users) => "用户",
        (Locale::Zh, HealthCount::CompletedBattles) => "完成对战",
        (Locale::En, HealthCount::Models) => "Models",
        (Locale::En, HealthCount::FixedPrompts) => "Fixed Prompts",
        (Locale::En, HealthCount::Users) => "Users",
        (Locale::En, HealthCount::CompletedBattles) => "Completed",
        (Locale::Ja, HealthCount::Models) => "モデル",
        (Locale::Ja, HealthCount::FixedPrompts) => "固定課題",
        (Locale::Ja, HealthCount::Users) => "ユーザー",
        (Locale::Ja, HealthCount::CompletedBattles) => "完了対戦",
    }
}
