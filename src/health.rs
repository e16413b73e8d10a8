use serde::Serialize;

use crate::state::{Health, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCount {
    Models,
    FixedPrompts,
    Users,
    CompletedBattles,
}

impl HealthCount {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthCount::Models => "models",
            HealthCount::FixedPrompts => "fixed_prompts",
            HealthCount::Users => "users",
            HealthCount::CompletedBattles => "completed_battles",
        }
    }
}

/// Indicator state for the footer. Counts appear only when reported, in a
/// fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthView {
    pub ok: bool,
    pub status: String,
    pub counts: Vec<(HealthCount, u64)>,
    pub error: Option<String>,
}

/// Health that has not arrived yet reads as not ok.
pub fn health_view(health: Option<&Health>) -> HealthView {
    let Some(health) = health else {
        return HealthView {
            ok: false,
            status: "unknown".to_string(),
            counts: Vec::new(),
            error: None,
        };
    };
    let counts = [
        (HealthCount::Models, health.models_count),
        (HealthCount::FixedPrompts, health.fixed_prompts_count),
        (HealthCount::Users, health.recorded_users_count),
        (HealthCount::CompletedBattles, health.completed_battles_count),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect();
    HealthView {
        ok: health.is_healthy(),
        status: health.status.clone(),
        counts,
        error: health.error.clone(),
    }
}

/// Header total: the backend's completed count when reported, else the sum
/// of per-model battles.
pub fn total_battles(health: Option<&Health>, rows: &[Row]) -> u64 {
    if let Some(total) = health.and_then(|h| h.completed_battles_count) {
        return total;
    }
    rows.iter().map(|r| u64::from(r.battles)).sum()
}
