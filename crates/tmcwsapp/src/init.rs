//! # Context Initialization
//!
//! Resolves where tmcws keeps its data and builds the production API over it.
//!
//! ## Data Directory
//!
//! In priority order:
//! 1. The `data_override` argument (the CLI's `--data` flag).
//! 2. The `TMCWS_DATA` environment variable (also how tests isolate their state).
//! 3. The OS data directory from [`directories::ProjectDirs`].
//!
//! The data directory holds `exercises.json` and `config.toml`. The managed root and the
//! staging folder default to subfolders of it (see [`crate::config`]).

use crate::api::TmcwsApi;
use crate::config::TmcwsConfig;
use crate::error::{Result, TmcError};
use crate::index::ExerciseIndex;
use crate::paths::WorkspacePaths;
use crate::store::fs::JsonStorage;
use crate::workspace::Workspace;
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "TMCWS_DATA";
pub const STORAGE_FILE: &str = "exercises.json";

pub struct TmcwsContext {
    pub api: TmcwsApi<JsonStorage>,
    pub config: TmcwsConfig,
    pub data_dir: PathBuf,
    pub paths: WorkspacePaths,
}

pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("fi", "mooc", "tmcws")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(TmcError::NoDataDir)
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<TmcwsContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = TmcwsConfig::load(&data_dir)?;
    let paths = config.workspace_paths(&data_dir);
    tracing::debug!(
        data_dir = %data_dir.display(),
        exercises_root = %paths.exercises_root.display(),
        closed_root = %paths.closed_root.display(),
        "initializing workspace"
    );

    let storage = JsonStorage::new(data_dir.join(STORAGE_FILE));
    let index = ExerciseIndex::load(storage, paths.clone())?;
    let api = TmcwsApi::new(Workspace::new(index));

    Ok(TmcwsContext {
        api,
        config,
        data_dir,
        paths,
    })
}
