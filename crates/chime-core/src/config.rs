use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Scan cadence of the poll loop.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
/// Simulated execution time per job run.
pub const DEFAULT_WORK_SECS: u64 = 2;

/// Top-level config (chime.toml + CHIME_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifications: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Job-set file. Point this at a `.db` file for the sqlite backend.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_work_secs")]
    pub work_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            work_secs: default_work_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Desktop popups and sounds instead of log-only notifications.
    #[serde(default)]
    pub desktop: bool,
    #[serde(default = "bool_true")]
    pub sound: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            desktop: false,
            sound: true,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_work_secs() -> u64 {
    DEFAULT_WORK_SECS
}
fn default_store_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.chime/jobs.json")
}
fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.chime/chime.toml")
}

impl ChimeConfig {
    /// Load config from a TOML file with CHIME_* env var overrides.
    ///
    /// Falls back to `~/.chime/chime.toml` when no explicit path is given; a
    /// missing file yields the defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CHIME_").split("_"))
            .extract()
            .map_err(|e| crate::error::ChimeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ChimeConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Json);
        assert_eq!(config.scheduler.poll_interval_secs, 1);
        assert_eq!(config.scheduler.work_secs, 2);
        assert!(!config.notifications.desktop);
        assert!(config.notifications.sound);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = ChimeConfig::load(Some("/nonexistent/chime.toml")).unwrap();
        assert_eq!(config.scheduler.poll_interval_secs, 1);
    }
}
