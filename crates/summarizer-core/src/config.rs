use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::length::SummaryLength;

pub const DEFAULT_SUMMARIZE_URL: &str = "http://localhost:5000/summarize";
pub const SUMMARIZE_URL_ENV: &str = "SUMMARIZE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub summarize_url: Option<String>,
    pub default_length: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            summarize_url: Some(DEFAULT_SUMMARIZE_URL.to_string()),
            default_length: Some(SummaryLength::default().as_str().to_string()),
            timeout_secs: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_default_length(length: SummaryLength) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.default_length = Some(length.as_str().to_string());
        config.save()
    }

    /// Flag, then `SUMMARIZE_URL`, then the file, then the built-in default.
    pub fn resolve_url(&self, flag: Option<&str>) -> String {
        let from_env = std::env::var(SUMMARIZE_URL_ENV).ok();
        pick_url(flag, from_env.as_deref(), self.summarize_url.as_deref())
    }

    /// Flag, then the file. Unknown values fall back to the default length.
    pub fn resolve_length(&self, flag: Option<SummaryLength>) -> SummaryLength {
        flag.or_else(|| {
            self.default_length
                .as_deref()
                .and_then(SummaryLength::from_str)
        })
        .unwrap_or_default()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("summarizer"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("summarizer.log"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

fn pick_url(flag: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_SUMMARIZE_URL)
        .to_string()
}
