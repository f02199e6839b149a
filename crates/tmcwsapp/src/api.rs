//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every tmcws
//! operation, whatever the client.
//!
//! The facade:
//! - **Owns the shared workspace** (`Arc<Mutex<Workspace>>`) and takes the lock for the
//!   duration of each command
//! - **Dispatches** to the matching `commands::*::run`
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic and no presentation.
//!
//! ## Sharing with the Watcher
//!
//! [`TmcwsApi::watcher`] builds a [`WorkspaceWatcher`] over the same workspace handle, so
//! commands issued while watching are serialized against the reconciler.
//!
//! ## Generic Over Storage
//!
//! - Production: `TmcwsApi<JsonStorage>`
//! - Testing: `TmcwsApi<MemStorage>`

use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::notifier::UserNotifier;
use crate::store::ExerciseStorage;
use crate::watcher::WorkspaceWatcher;
use crate::workspace::{lock, Workspace};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use commands::download::DownloadRequest;
pub use commands::list::ExerciseFilter;

pub struct TmcwsApi<S: ExerciseStorage> {
    workspace: Arc<Mutex<Workspace<S>>>,
}

impl<S: ExerciseStorage> TmcwsApi<S> {
    pub fn new(workspace: Workspace<S>) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
        }
    }

    /// The shared workspace handle.
    pub fn workspace(&self) -> Arc<Mutex<Workspace<S>>> {
        Arc::clone(&self.workspace)
    }

    pub fn download(&self, request: &DownloadRequest) -> Result<CmdResult> {
        commands::download::run(&mut lock(&self.workspace), request)
    }

    pub fn open(&self, ids: &[u64]) -> Result<CmdResult> {
        commands::open::run(&mut lock(&self.workspace), ids)
    }

    pub fn close(&self, ids: &[u64]) -> Result<CmdResult> {
        commands::close::run(&mut lock(&self.workspace), ids)
    }

    pub fn delete(&self, ids: &[u64]) -> Result<CmdResult> {
        commands::delete::run(&mut lock(&self.workspace), ids)
    }

    pub fn remove_course(&self, organization: &str, course: &str) -> Result<CmdResult> {
        commands::remove_course::run(&mut lock(&self.workspace), organization, course)
    }

    pub fn list(&self, filter: &ExerciseFilter) -> Result<CmdResult> {
        commands::list::run(&lock(&self.workspace), filter)
    }

    pub fn which(&self, path: &Path) -> Result<CmdResult> {
        commands::which::run(&lock(&self.workspace), path)
    }

    pub fn set_deadlines(
        &self,
        id: u64,
        soft_deadline: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<CmdResult> {
        commands::deadline::run(&mut lock(&self.workspace), id, soft_deadline, deadline)
    }

    pub fn sweep(&self) -> Result<CmdResult> {
        commands::sweep::run(&lock(&self.workspace))
    }

    pub fn doctor(&self) -> Result<CmdResult> {
        commands::doctor::run(&mut lock(&self.workspace))
    }

    pub fn paths(&self, ids: &[u64]) -> Result<CmdResult> {
        commands::paths::run(&lock(&self.workspace), ids)
    }
}

impl<S: ExerciseStorage + Send + 'static> TmcwsApi<S> {
    pub fn watcher(
        &self,
        notifier: Arc<dyn UserNotifier>,
        sweep_interval: Option<Duration>,
    ) -> WorkspaceWatcher<S> {
        WorkspaceWatcher::new(self.workspace(), notifier).with_sweep_interval(sweep_interval)
    }
}
