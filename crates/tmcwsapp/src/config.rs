//! # Configuration
//!
//! Settings are loaded with [`confique`] from, in priority order:
//!
//! 1. **Environment variables**: `TMCWS_EXERCISES_DIR`, `TMCWS_CLOSED_DIR`,
//!    `TMCWS_SWEEP_INTERVAL`.
//! 2. **Config file**: `config.toml` in the data directory.
//! 3. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `exercises_dir` | `<data>/exercises` | Managed root shown to the editor |
//! | `closed_dir` | `<data>/closed` | Staging area for closed exercises |
//! | `sweep_interval_secs` | `0` | Idle time before the watcher re-sweeps; `0` disables |
//!
//! Relative directories are resolved against the data directory.

use crate::error::Result;
use crate::paths::WorkspacePaths;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TmcwsConfig {
    /// Folder the editor opens. Everything under it not tracked as an open exercise is removed.
    #[config(env = "TMCWS_EXERCISES_DIR")]
    pub exercises_dir: Option<PathBuf>,

    /// Where closed exercises are kept, one folder per exercise id.
    #[config(env = "TMCWS_CLOSED_DIR")]
    pub closed_dir: Option<PathBuf>,

    /// Seconds without filesystem activity before the watcher sweeps again. 0 disables.
    #[config(env = "TMCWS_SWEEP_INTERVAL", default = 0)]
    pub sweep_interval_secs: u64,
}

impl Default for TmcwsConfig {
    fn default() -> Self {
        Self {
            exercises_dir: None,
            closed_dir: None,
            sweep_interval_secs: 0,
        }
    }
}

impl TmcwsConfig {
    /// Loads the configuration for a data directory. A missing config file is fine.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    pub fn workspace_paths(&self, data_dir: &Path) -> WorkspacePaths {
        let resolve = |configured: &Option<PathBuf>, fallback: &str| match configured {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => data_dir.join(dir),
            None => data_dir.join(fallback),
        };
        WorkspacePaths::new(
            resolve(&self.exercises_dir, "exercises"),
            resolve(&self.closed_dir, "closed"),
        )
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}
