//! Process configuration: app credentials loaded from the environment.
//!
//! Credentials come from `FEISHU_APP_ID` / `FEISHU_APP_SECRET`, optionally
//! seeded from a local `.env` file applied once at startup. The config is an
//! explicit struct passed into client construction, never a mutable global,
//! so multiple independently-configured bridges can coexist in one process.

use anyhow::{Context, Result};
use std::path::Path;

/// Application credentials for the open-platform API.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_id: String,
    pub app_secret: String,
}

impl AppConfig {
    /// Load credentials from the environment. A `.env` file in the working
    /// directory is applied first when present; a missing file is not an
    /// error. Missing or empty credentials are.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Load credentials after applying a specific dotenv file. Unlike
    /// [`AppConfig::from_env`], a missing file here is an error since the
    /// caller asked for it by path.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenvy::from_path(path)
            .with_context(|| format!("loading env file {}", path.display()))?;
        Self::from_env_only()
    }

    fn from_env_only() -> Result<Self> {
        let config = Self::from_values(
            std::env::var("FEISHU_APP_ID").ok(),
            std::env::var("FEISHU_APP_SECRET").ok(),
        )?;
        log::info!(
            "config loaded: app_id={} app_secret={}",
            preview(&config.app_id),
            preview(&config.app_secret)
        );
        Ok(config)
    }

    /// Validate raw values into a config. Whitespace-only counts as missing.
    fn from_values(app_id: Option<String>, app_secret: Option<String>) -> Result<Self> {
        Ok(Self {
            app_id: require("FEISHU_APP_ID", app_id)?,
            app_secret: require("FEISHU_APP_SECRET", app_secret)?,
        })
    }
}

fn require(name: &str, value: Option<String>) -> Result<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .with_context(|| format!("missing required environment variable {}", name))
}

/// Short redacted preview for logging credentials. Prefix is taken in whole
/// characters so multi-byte values cannot split a char boundary.
fn preview(val: &str) -> String {
    let prefix: String = val.chars().take(4).collect();
    format!("{}...({} chars)", prefix, val.chars().count())
}
