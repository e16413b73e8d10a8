use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::http_client;
use crate::normalize;
use crate::state::{Health, MatrixPayload, Snapshot};

pub const LEADERBOARD_FILE: &str = "leaderboard.json";
pub const PREVIOUS_LEADERBOARD_FILE: &str = "leaderboard_prev.json";
pub const HEALTH_FILE: &str = "health.json";
pub const HEATMAP_FILE: &str = "heatmap.json";
pub const PROMPTS_FILE: &str = "prompts.json";

pub const DEFAULT_DATA_DIR: &str = "data";

/// Where the refreshed JSON files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Dir(PathBuf),
    /// Base URL serving the same file names.
    Url(String),
}

impl DataSource {
    /// `ARENA_DATA_URL` wins over `ARENA_DATA_DIR`.
    pub fn from_env() -> Self {
        if let Some(url) = env::var("ARENA_DATA_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            return DataSource::Url(url);
        }
        DataSource::Dir(data_dir_from_env())
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Dir(dir) => dir.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }

    pub fn read(&self, name: &str) -> Result<String> {
        match self {
            DataSource::Dir(dir) => read_file(&dir.join(name)),
            DataSource::Url(base) => {
                let url = format!("{}/{}", base.trim_end_matches('/'), name);
                http_client::get_text(&url)
            }
        }
    }

    pub fn load_current(&self) -> Result<Snapshot> {
        let raw = self.read(LEADERBOARD_FILE)?;
        Ok(normalize::parse_snapshot_json(&raw))
    }

    pub fn load_previous(&self) -> Result<Snapshot> {
        let raw = self.read(PREVIOUS_LEADERBOARD_FILE)?;
        Ok(normalize::parse_snapshot_json(&raw))
    }

    pub fn load_health(&self) -> Result<Health> {
        let raw = self.read(HEALTH_FILE)?;
        Ok(normalize::parse_health_json(&raw))
    }

    pub fn load_matrices(&self) -> Result<MatrixPayload> {
        let raw = self.read(HEATMAP_FILE)?;
        Ok(normalize::parse_matrices_json(&raw))
    }
}

pub fn data_dir_from_env() -> PathBuf {
    env::var("ARENA_DATA_DIR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
