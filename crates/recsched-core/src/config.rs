use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// File name of the persisted event table inside `global.recorddir`.
pub const EVENTS_FILE_NAME: &str = "events.dat";

/// Top-level config (recsched.toml + RECSCHED_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default)]
    pub global: GlobalConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Directory holding recordings and the persisted event table.
    /// Unset means the installation is not configured for persistence yet.
    pub recorddir: Option<String>,
}

impl RecorderConfig {
    /// Load config from a TOML file with RECSCHED_* env var overrides
    /// (`RECSCHED_GLOBAL_RECORDDIR` → `global.recorddir`).
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.recsched/recsched.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RecorderConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RECSCHED_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        tracing::debug!(%path, recorddir = ?config.global.recorddir, "configuration loaded");
        Ok(config)
    }

    /// Full path of the persisted event table, or `None` when `recorddir`
    /// is unset. Callers must treat `None` as a configuration error before
    /// any load/save call.
    pub fn events_file(&self) -> Option<PathBuf> {
        let dir = self.global.recorddir.as_deref()?;
        if dir.is_empty() {
            return None;
        }
        Some(PathBuf::from(dir).join(EVENTS_FILE_NAME))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.recsched/recsched.toml")
}
