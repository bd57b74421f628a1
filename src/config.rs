// src/config.rs
//! Service configuration: TOML file selected by env var with a conventional
//! fallback path, defaults when neither exists.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::AnalysisConfig;

const ENV_PATH: &str = "WHYLAYER_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/whylayer.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub fetch: FetchConfig,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            fetch: FetchConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-provider cap on normalized entries for the capped sources.
    pub max_entries: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub demo_feed_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_entries: 30,
            timeout_secs: 10,
            user_agent: concat!("whylayer/", env!("CARGO_PKG_VERSION")).to_string(),
            demo_feed_url: crate::ingest::providers::synthetic::DEMO_FEED_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load order: $WHYLAYER_CONFIG_PATH, then config/whylayer.toml, then
    /// built-in defaults.
    pub fn load() -> Result<AppConfig> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_PATH} points to a non-existent path"));
            }
            return Self::from_path(&pb);
        }
        let fallback = Path::new(DEFAULT_PATH);
        if fallback.exists() {
            return Self::from_path(fallback);
        }
        Ok(AppConfig::default())
    }

    pub fn from_path(path: &Path) -> Result<AppConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config from {}", path.display()))
    }
}
