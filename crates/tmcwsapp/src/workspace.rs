//! # Workspace: Index and Watch Tree in Lockstep
//!
//! The [`ExerciseIndex`] knows every exercise; the [`WatchTree`] knows which of them the
//! reconciler must leave alone. They must agree at all times:
//!
//! > an exercise is in the watch tree **iff** its status is `Open`.
//!
//! [`Workspace`] owns both and is the only type that mutates them, so every public method
//! here updates the tree before returning. Higher-level actions (the command layer) and the
//! reconciler (via the watcher worker) share one `Workspace` behind a `Mutex`.

use crate::error::Result;
use crate::fsops;
use crate::index::ExerciseIndex;
use crate::model::{ExerciseIdentity, ExerciseRecord, ExerciseStatus};
use crate::paths::WorkspacePaths;
use crate::store::ExerciseStorage;
use crate::watch_tree::WatchTree;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

pub struct Workspace<S: ExerciseStorage> {
    index: ExerciseIndex<S>,
    tree: WatchTree,
}

impl<S: ExerciseStorage> Workspace<S> {
    /// Wraps a loaded index, watching every exercise it reports as open.
    pub fn new(index: ExerciseIndex<S>) -> Self {
        let mut tree = WatchTree::new();
        for record in index.all_exercises().filter(|r| r.is_open()) {
            tree.watch(&record.organization, &record.course, &record.name);
        }
        Self { index, tree }
    }

    pub fn index(&self) -> &ExerciseIndex<S> {
        &self.index
    }

    pub fn tree(&self) -> &WatchTree {
        &self.tree
    }

    pub fn paths(&self) -> &WorkspacePaths {
        self.index.paths()
    }

    /// Registers a download and returns the staging path its content belongs in.
    ///
    /// Re-downloading an open exercise closes it: the old canonical folder is removed so the
    /// fresh content can be opened in its place.
    pub fn download(
        &mut self,
        organization: &str,
        checksum: &str,
        exercise: &ExerciseIdentity,
    ) -> Result<PathBuf> {
        let previous = self.index.get_by_id(exercise.id).ok().cloned();
        let staging = self
            .index
            .create_download_path(organization, checksum, exercise)?;
        if let Some(old) = previous.filter(|r| r.is_open()) {
            tracing::info!(id = old.id, "re-downloaded an open exercise, it is now closed");
            self.unwatch(&old);
            fsops::remove_entry(&old.path)?;
        }
        Ok(staging)
    }

    pub fn open(&mut self, id: u64) -> Result<()> {
        self.index.open(id)?;
        let record = self.index.get_by_id(id)?;
        self.tree
            .watch(&record.organization, &record.course, &record.name);
        tracing::info!(id, path = %record.path.display(), "opened exercise");
        Ok(())
    }

    pub fn close(&mut self, id: u64) -> Result<()> {
        self.index.close(id)?;
        let record = self.index.get_by_id(id)?.clone();
        self.unwatch(&record);
        tracing::info!(id, "closed exercise");
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> Result<ExerciseRecord> {
        let record = self.index.delete(id)?;
        self.unwatch(&record);
        tracing::info!(id, "deleted exercise");
        Ok(record)
    }

    pub fn clear(&mut self, id: u64) -> Result<Option<ExerciseRecord>> {
        let removed = self.index.clear(id)?;
        if let Some(record) = &removed {
            self.unwatch(record);
        }
        Ok(removed)
    }

    /// Marks an exercise whose folder disappeared. Its content, if any, is left where it is.
    pub fn mark_missing(&mut self, id: u64) -> Result<()> {
        self.index.set_missing(id)?;
        let record = self.index.get_by_id(id)?.clone();
        self.unwatch(&record);
        tracing::warn!(id, path = %record.path.display(), "exercise folder is missing");
        Ok(())
    }

    /// Deletes every exercise of a course of one organization, open or not.
    pub fn remove_course(
        &mut self,
        organization: &str,
        course: &str,
    ) -> Result<Vec<ExerciseRecord>> {
        let ids: Vec<u64> = self
            .index
            .exercises_in_course(organization, course)
            .map(|r| r.id)
            .collect();
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            removed.push(self.delete(id)?);
        }
        Ok(removed)
    }

    pub fn update_deadlines(
        &mut self,
        id: u64,
        soft_deadline: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.index.update_deadlines(id, soft_deadline, deadline)
    }

    /// Marks missing every exercise whose folder is absent or empty. Returns their ids.
    pub fn check_folders(&mut self) -> Result<Vec<u64>> {
        let mut lost = Vec::new();
        let candidates: Vec<u64> = self
            .index
            .all_exercises()
            .filter(|r| r.status != ExerciseStatus::Missing)
            .map(|r| r.id)
            .collect();
        for id in candidates {
            if !self.index.folder_present(id)? {
                self.mark_missing(id)?;
                lost.push(id);
            }
        }
        Ok(lost)
    }

    fn unwatch(&mut self, record: &ExerciseRecord) {
        self.tree
            .unwatch(&record.organization, &record.course, &record.name);
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.index.assert_consistent();
        for record in self.index.all_exercises() {
            assert_eq!(
                record.is_open(),
                self.tree
                    .has_exercise(&record.organization, &record.course, &record.name),
                "watch tree disagrees with status of exercise {}",
                record.id
            );
        }
        assert_eq!(
            self.tree.len(),
            self.index.all_exercises().filter(|r| r.is_open()).count()
        );
    }
}

/// Locks a shared workspace, recovering the guard if a previous holder panicked.
pub(crate) fn lock<S: ExerciseStorage>(
    shared: &Mutex<Workspace<S>>,
) -> MutexGuard<'_, Workspace<S>> {
    shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
