use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Server
    pub server_ip: String,
    pub server_port: u16,
    pub request_timeout_secs: u64,
    pub request_retries: usize,
    pub retry_interval_ms: u64,

    // Players
    /// Player used when a command names none; updated with the last player used
    pub default_player: Option<String>,

    // Matching
    /// Ranked matches must score strictly below this
    pub match_threshold: i32,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_ip: "localhost".to_string(),
            server_port: 9000,
            request_timeout_secs: 10,
            request_retries: 2,
            retry_interval_ms: 1000,
            default_player: None,
            match_threshold: 5,
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from `path`, falling back to defaults when missing or corrupt
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Graceful degradation: keep the broken file around for inspection
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Base URL of the server's web interface
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server_ip, self.server_port)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("squeezectl")
        .join("config.json")
}
