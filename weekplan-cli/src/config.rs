use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the configured data directory.
pub const DATA_DIR_ENV: &str = "WEEKPLAN_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Where the planner's JSON files live. Defaults to `<data_dir>/weekplan`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub daily_capacity_minutes: u32,
    pub save_debounce_ms: u64,
    pub default_duration_minutes: u32,
    /// Filter used when `RUST_LOG` is unset, e.g. "warn" or "weekplan=debug".
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            daily_capacity_minutes: weekplan::DAILY_CAPACITY_MINUTES,
            save_debounce_ms: weekplan::DEFAULT_DEBOUNCE.as_millis() as u64,
            default_duration_minutes: weekplan::DEFAULT_ADD_DURATION,
            log_level: "warn".to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("weekplan")
            .join("config.toml"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    /// Resolved data directory: env override, then config, then the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Ok(dirs::data_dir()
            .context("Cannot determine data directory")?
            .join("weekplan"))
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
