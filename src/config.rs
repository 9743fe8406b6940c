//! Persistent app preferences and the file-backed manager for them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default seconds between automatic refreshes of the remote ticket list.
fn default_refresh_interval() -> u64 {
    300
}

/// Default seconds between elapsed-time accrual ticks.
fn default_tick_interval() -> u64 {
    1
}

/// App preferences persisted on disk. Independent of the tracked-ticket
/// snapshot, which lives in the session store.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            tick_interval_secs: default_tick_interval(),
        }
    }
}

impl Config {
    /// Clamps nonsensical values back to usable ones.
    pub fn normalized(mut self) -> Self {
        if self.tick_interval_secs == 0 {
            self.tick_interval_secs = default_tick_interval();
        }
        if self.refresh_interval_secs == 0 {
            self.refresh_interval_secs = default_refresh_interval();
        }
        self
    }
}

/// Loads and saves preferences as JSON in the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        let dirs = directories::ProjectDirs::from("com", "tickbar", "tickbar")
            .expect("could not determine config directory");
        Self {
            path: dirs.config_dir().join("config.json"),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        let config = if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Config::default()
        };
        config.normalized()
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
