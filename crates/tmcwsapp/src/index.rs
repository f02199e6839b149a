//! # Exercise Index: Path ↔ Id
//!
//! Exercises are addressed two ways. The server and the persisted data use the integer id;
//! the editor and the filesystem only ever hand us paths. The index keeps both directions:
//!
//! - `path_to_id`: canonical path → id
//! - `id_to_data`: id → [`ExerciseRecord`]
//!
//! The two maps are exact inverses at all times. Every insertion goes through one place that
//! first drops the stale reverse entry, and every removal drops both sides together.
//!
//! ## Persistence
//!
//! Every mutating call saves the full record set through the [`ExerciseStorage`]
//! collaborator before returning, so a successful call never leaves the persisted index
//! behind the in-memory one.
//!
//! ## Moving Content
//!
//! `open` and `close` physically move the exercise folder between its staging path and its
//! canonical path. Failures there are returned as `Io` errors and leave the record untouched.
//!
//! This type only knows about records. Keeping the watch tree in step with open/close is the
//! job of [`crate::workspace::Workspace`], which is what callers should use.

use crate::error::{Result, TmcError};
use crate::fsops;
use crate::model::{ExerciseIdentity, ExerciseRecord, ExerciseStatus};
use crate::paths::{validate_segment, WorkspacePaths};
use crate::store::ExerciseStorage;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub struct ExerciseIndex<S: ExerciseStorage> {
    path_to_id: HashMap<PathBuf, u64>,
    id_to_data: BTreeMap<u64, ExerciseRecord>,
    paths: WorkspacePaths,
    storage: S,
}

impl<S: ExerciseStorage> ExerciseIndex<S> {
    /// Builds the index from whatever the storage holds.
    ///
    /// Stored paths that do not match the canonical derivation (legacy records, or a managed
    /// root that moved) are re-derived and the corrected set is saved back.
    pub fn load(storage: S, paths: WorkspacePaths) -> Result<Self> {
        let records = storage.load()?;
        let mut index = Self {
            path_to_id: HashMap::new(),
            id_to_data: BTreeMap::new(),
            paths,
            storage,
        };

        let mut repaired = false;
        for mut record in records {
            let canonical =
                index
                    .paths
                    .exercise_path(&record.organization, &record.course, &record.name);
            if record.path != canonical {
                tracing::debug!(
                    id = record.id,
                    from = %record.path.display(),
                    to = %canonical.display(),
                    "re-deriving exercise path"
                );
                record.path = canonical;
                repaired = true;
            }
            if let Some(&owner) = index.path_to_id.get(&record.path) {
                if owner != record.id {
                    tracing::warn!(
                        id = record.id,
                        owner,
                        path = %record.path.display(),
                        "dropping exercise record that shadows another exercise's path"
                    );
                    repaired = true;
                    continue;
                }
            }
            index.insert(record);
        }

        if repaired {
            index.persist()?;
        }
        Ok(index)
    }

    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Registers a freshly downloaded exercise and returns where its content should be written.
    ///
    /// The returned path is the staging path: content stays there until the exercise is
    /// opened. Downloading an id that is already known replaces its record and resets it to
    /// `Closed`.
    pub fn create_download_path(
        &mut self,
        organization: &str,
        checksum: &str,
        exercise: &ExerciseIdentity,
    ) -> Result<PathBuf> {
        validate_segment("organization", organization)?;
        validate_segment("course", &exercise.course)?;
        validate_segment("exercise", &exercise.name)?;

        let path = self
            .paths
            .exercise_path(organization, &exercise.course, &exercise.name);
        if let Some(&owner) = self.path_to_id.get(&path) {
            if owner != exercise.id {
                return Err(TmcError::PathConflict { path, id: owner });
            }
        }

        let (soft_deadline, deadline) = self
            .id_to_data
            .get(&exercise.id)
            .map(|old| (old.soft_deadline, old.deadline))
            .unwrap_or_default();

        self.insert(ExerciseRecord {
            id: exercise.id,
            name: exercise.name.clone(),
            course: exercise.course.clone(),
            organization: organization.to_string(),
            path,
            checksum: checksum.to_string(),
            status: ExerciseStatus::Closed,
            soft_deadline,
            deadline,
        });
        self.persist()?;

        Ok(self.paths.closed_path(exercise.id))
    }

    pub fn get_by_id(&self, id: u64) -> Result<&ExerciseRecord> {
        self.id_to_data
            .get(&id)
            .ok_or(TmcError::ExerciseNotFound(id))
    }

    pub fn get_by_path(&self, path: &Path) -> Result<&ExerciseRecord> {
        let id = self.get_id_by_path(path)?;
        self.get_by_id(id)
    }

    pub fn get_id_by_path(&self, path: &Path) -> Result<u64> {
        self.path_to_id
            .get(path)
            .copied()
            .ok_or_else(|| TmcError::PathNotFound(path.to_path_buf()))
    }

    /// Finds the exercise whose canonical folder contains `file_path`.
    ///
    /// Returns `None` for paths outside the managed root and for paths that stop short of
    /// the third (exercise) level.
    pub fn resolve_owning_exercise(&self, file_path: &Path) -> Option<u64> {
        let segments = self.paths.relative_segments(file_path, 3)?;
        if segments.len() < 3 {
            return None;
        }
        self.get_id_by_path(&self.paths.join_segments(&segments))
            .ok()
    }

    /// Moves the staged content to the canonical path and marks the exercise open.
    ///
    /// Opening an exercise that is already open does nothing.
    pub fn open(&mut self, id: u64) -> Result<()> {
        let record = self.get_by_id(id)?;
        if record.is_open() {
            tracing::debug!(id, "exercise already open");
            return Ok(());
        }
        let staging = self.paths.closed_path(id);
        fsops::move_dir(&staging, &record.path)?;

        self.set_status(id, ExerciseStatus::Open)
    }

    /// Moves the canonical content back to staging and marks the exercise closed.
    ///
    /// Closing an exercise that is already closed does nothing.
    pub fn close(&mut self, id: u64) -> Result<()> {
        let record = self.get_by_id(id)?;
        if record.status == ExerciseStatus::Closed {
            tracing::debug!(id, "exercise already closed");
            return Ok(());
        }
        let staging = self.paths.closed_path(id);
        fsops::move_dir(&record.path, &staging)?;

        self.set_status(id, ExerciseStatus::Closed)
    }

    /// Removes the exercise content wherever it lives, then forgets the record.
    pub fn delete(&mut self, id: u64) -> Result<ExerciseRecord> {
        let record = self.get_by_id(id)?;
        for path in [record.path.clone(), self.paths.closed_path(id)] {
            if let Err(e) = fsops::remove_entry(&path) {
                tracing::warn!(id, path = %path.display(), error = %e, "failed to remove exercise folder");
            }
        }
        self.clear(id)?.ok_or(TmcError::ExerciseNotFound(id))
    }

    /// Forgets a record without touching the disk. Unknown ids are a no-op.
    pub fn clear(&mut self, id: u64) -> Result<Option<ExerciseRecord>> {
        let Some(record) = self.id_to_data.remove(&id) else {
            return Ok(None);
        };
        self.path_to_id.remove(&record.path);
        self.persist()?;
        Ok(Some(record))
    }

    pub fn set_missing(&mut self, id: u64) -> Result<()> {
        self.set_status(id, ExerciseStatus::Missing)
    }

    pub fn update_deadlines(
        &mut self,
        id: u64,
        soft_deadline: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let record = self
            .id_to_data
            .get_mut(&id)
            .ok_or(TmcError::ExerciseNotFound(id))?;
        record.soft_deadline = soft_deadline;
        record.deadline = deadline;
        self.persist()
    }

    /// Whether the folder an exercise's status promises actually has content.
    pub fn folder_present(&self, id: u64) -> Result<bool> {
        let record = self.get_by_id(id)?;
        Ok(match record.status {
            ExerciseStatus::Open => fsops::is_populated_dir(&record.path),
            ExerciseStatus::Closed => fsops::is_populated_dir(&self.paths.closed_path(id)),
            ExerciseStatus::Missing => false,
        })
    }

    /// Where the exercise content currently lives according to its status.
    pub fn location(&self, id: u64) -> Result<PathBuf> {
        let record = self.get_by_id(id)?;
        Ok(match record.status {
            ExerciseStatus::Closed => self.paths.closed_path(id),
            ExerciseStatus::Open | ExerciseStatus::Missing => record.path.clone(),
        })
    }

    /// All records ordered by id.
    pub fn all_exercises(&self) -> impl Iterator<Item = &ExerciseRecord> {
        self.id_to_data.values()
    }

    pub fn exercises_by_course<'a>(
        &'a self,
        course: &'a str,
    ) -> impl Iterator<Item = &'a ExerciseRecord> + 'a {
        self.id_to_data.values().filter(move |r| r.course == course)
    }

    /// Exercises of one course of one organization. Course names are only unique per
    /// organization.
    pub fn exercises_in_course<'a>(
        &'a self,
        organization: &'a str,
        course: &'a str,
    ) -> impl Iterator<Item = &'a ExerciseRecord> + 'a {
        self.id_to_data
            .values()
            .filter(move |r| r.organization == organization && r.course == course)
    }

    pub fn len(&self) -> usize {
        self.id_to_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_data.is_empty()
    }

    fn set_status(&mut self, id: u64, status: ExerciseStatus) -> Result<()> {
        let record = self
            .id_to_data
            .get_mut(&id)
            .ok_or(TmcError::ExerciseNotFound(id))?;
        record.status = status;
        self.persist()
    }

    fn insert(&mut self, record: ExerciseRecord) {
        if let Some(old) = self.id_to_data.get(&record.id) {
            self.path_to_id.remove(&old.path);
        }
        self.path_to_id.insert(record.path.clone(), record.id);
        self.id_to_data.insert(record.id, record);
    }

    fn persist(&self) -> Result<()> {
        let records: Vec<ExerciseRecord> = self.id_to_data.values().cloned().collect();
        self.storage.save(&records)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.path_to_id.len(), self.id_to_data.len());
        for (id, record) in &self.id_to_data {
            assert_eq!(*id, record.id);
            assert_eq!(self.path_to_id.get(&record.path), Some(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStorage;
    use crate::test_utils::TestEnv;
    use std::fs;

    fn identity() -> ExerciseIdentity {
        ExerciseIdentity::new(1337, "intro", "hello-world")
    }

    #[test]
    fn create_returns_staging_path_and_persists() {
        let env = TestEnv::new();
        let mut index = env.index();

        let staging = index
            .create_download_path("HY", "abc123", &identity())
            .unwrap();

        assert_eq!(staging, env.paths.closed_path(1337));
        assert!(staging.ends_with("1337"));
        assert!(!staging.to_string_lossy().contains("hello-world"));

        let record = index.get_by_id(1337).unwrap();
        assert_eq!(record.status, ExerciseStatus::Closed);
        assert_eq!(record.path, env.paths.exercise_path("HY", "intro", "hello-world"));
        assert_eq!(index.storage().save_count(), 1);
        assert_eq!(index.storage().records().len(), 1);
        index.assert_consistent();
    }

    #[test]
    fn lookups_miss_with_not_found() {
        let env = TestEnv::new();
        let index = env.index();

        assert!(matches!(index.get_by_id(1), Err(TmcError::ExerciseNotFound(1))));
        let err = index.get_by_path(Path::new("no/such/path")).unwrap_err();
        assert!(err.is_not_found());
        assert!(index.get_id_by_path(Path::new("")).unwrap_err().is_not_found());
    }

    #[test]
    fn lookups_agree_both_ways() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();

        let record = index.get_by_id(1337).unwrap().clone();
        assert_eq!(index.get_by_path(&record.path).unwrap().id, 1337);
        assert_eq!(index.get_id_by_path(&record.path).unwrap(), 1337);
    }

    #[test]
    fn create_rejects_invalid_names() {
        let env = TestEnv::new();
        let mut index = env.index();

        let err = index
            .create_download_path("HY", "a", &ExerciseIdentity::new(1, "..", "x"))
            .unwrap_err();
        assert!(matches!(err, TmcError::InvalidName { kind: "course", .. }));
        assert!(index.is_empty());
        assert_eq!(index.storage().save_count(), 0);
    }

    #[test]
    fn create_rejects_path_owned_by_other_id() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();

        let err = index
            .create_download_path("HY", "a", &ExerciseIdentity::new(9, "intro", "hello-world"))
            .unwrap_err();
        assert!(matches!(err, TmcError::PathConflict { id: 1337, .. }));
        index.assert_consistent();
    }

    #[test]
    fn redownload_same_id_replaces_record() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "old", &identity()).unwrap();
        index
            .create_download_path("HY", "new", &ExerciseIdentity::new(1337, "intro", "renamed"))
            .unwrap();

        assert_eq!(index.len(), 1);
        let record = index.get_by_id(1337).unwrap();
        assert_eq!(record.checksum, "new");
        assert_eq!(record.name, "renamed");
        assert!(index
            .get_by_path(&env.paths.exercise_path("HY", "intro", "hello-world"))
            .is_err());
        index.assert_consistent();
    }

    #[test]
    fn resolve_owning_exercise_matches_three_level_prefix() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();

        let inside = env
            .paths
            .exercise_path("HY", "intro", "hello-world")
            .join("src")
            .join("Main.java");
        assert_eq!(index.resolve_owning_exercise(&inside), Some(1337));

        let folder = env.paths.exercise_path("HY", "intro", "hello-world");
        assert_eq!(index.resolve_owning_exercise(&folder), Some(1337));

        let partial = env.paths.exercises_root.join("HY").join("intro");
        assert_eq!(index.resolve_owning_exercise(&partial), None);

        let other = env.paths.exercise_path("HY", "intro", "other").join("a.txt");
        assert_eq!(index.resolve_owning_exercise(&other), None);

        assert_eq!(index.resolve_owning_exercise(Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn open_and_close_move_content() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        env.stage(&staging);

        index.open(1337).unwrap();
        let canonical = env.paths.exercise_path("HY", "intro", "hello-world");
        assert!(canonical.join("README.md").exists());
        assert!(!staging.exists());
        assert_eq!(index.get_by_id(1337).unwrap().status, ExerciseStatus::Open);

        index.close(1337).unwrap();
        assert!(staging.join("README.md").exists());
        assert!(!canonical.exists());
        assert_eq!(index.get_by_id(1337).unwrap().status, ExerciseStatus::Closed);

        // create + open + close
        assert_eq!(index.storage().save_count(), 3);
        index.assert_consistent();
    }

    #[test]
    fn open_twice_is_a_noop() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        env.stage(&staging);

        index.open(1337).unwrap();
        let saves = index.storage().save_count();
        index.open(1337).unwrap();
        assert_eq!(index.storage().save_count(), saves);
    }

    #[test]
    fn open_without_staged_content_fails_with_io() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();

        let err = index.open(1337).unwrap_err();
        assert!(matches!(err, TmcError::Io(_)));
        assert_eq!(index.get_by_id(1337).unwrap().status, ExerciseStatus::Closed);
    }

    #[test]
    fn open_unknown_id_is_not_found() {
        let env = TestEnv::new();
        let mut index = env.index();
        assert!(index.open(5).unwrap_err().is_not_found());
        assert!(index.close(5).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_removes_folder_and_record() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        env.stage(&staging);
        index.open(1337).unwrap();

        let removed = index.delete(1337).unwrap();
        assert_eq!(removed.id, 1337);
        assert!(!removed.path.exists());
        assert!(index.get_by_id(1337).is_err());
        assert!(index.storage().records().is_empty());
        index.assert_consistent();
    }

    #[test]
    fn delete_removes_staged_content_of_closed_exercise() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        env.stage(&staging);

        index.delete(1337).unwrap();
        assert!(!staging.exists());
    }

    #[test]
    fn clear_leaves_disk_alone() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        env.stage(&staging);

        assert!(index.clear(1337).unwrap().is_some());
        assert!(staging.join("README.md").exists());
        assert!(index.clear(1337).unwrap().is_none());
        index.assert_consistent();
    }

    #[test]
    fn load_rederives_stale_paths() {
        let env = TestEnv::new();
        let stale = ExerciseRecord {
            id: 7,
            name: "hello".into(),
            course: "intro".into(),
            organization: "HY".into(),
            path: PathBuf::from("/old/root/HY/intro/hello"),
            checksum: "x".into(),
            status: ExerciseStatus::Closed,
            soft_deadline: None,
            deadline: None,
        };
        let legacy = ExerciseRecord {
            id: 8,
            name: "world".into(),
            path: PathBuf::new(),
            ..stale.clone()
        };
        let storage = MemStorage::with_records(vec![stale, legacy]);

        let index = ExerciseIndex::load(storage, env.paths.clone()).unwrap();
        assert_eq!(
            index.get_by_id(7).unwrap().path,
            env.paths.exercise_path("HY", "intro", "hello")
        );
        assert_eq!(
            index.get_by_id(8).unwrap().path,
            env.paths.exercise_path("HY", "intro", "world")
        );
        assert_eq!(index.storage().save_count(), 1);
        index.assert_consistent();
    }

    #[test]
    fn load_without_repairs_does_not_save() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();
        let records = index.storage().records();

        let reloaded =
            ExerciseIndex::load(MemStorage::with_records(records), env.paths.clone()).unwrap();
        assert_eq!(reloaded.storage().save_count(), 0);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn failed_save_is_reported() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.storage().set_simulate_write_error(true);

        let result = index.create_download_path("HY", "a", &identity());
        assert!(matches!(result, Err(TmcError::Store(_))));
    }

    #[test]
    fn folder_present_follows_status() {
        let env = TestEnv::new();
        let mut index = env.index();
        let staging = index.create_download_path("HY", "a", &identity()).unwrap();
        assert!(!index.folder_present(1337).unwrap());

        env.stage(&staging);
        assert!(index.folder_present(1337).unwrap());

        index.open(1337).unwrap();
        assert!(index.folder_present(1337).unwrap());

        fs::remove_dir_all(env.paths.exercise_path("HY", "intro", "hello-world")).unwrap();
        assert!(!index.folder_present(1337).unwrap());
    }

    #[test]
    fn exercises_by_course_filters() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();
        index
            .create_download_path("HY", "a", &ExerciseIdentity::new(2, "advanced", "x"))
            .unwrap();

        let intro: Vec<u64> = index.exercises_by_course("intro").map(|r| r.id).collect();
        assert_eq!(intro, vec![1337]);
        assert_eq!(index.all_exercises().count(), 2);
    }

    #[test]
    fn exercises_in_course_is_scoped_by_organization() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();
        index
            .create_download_path("Aalto", "a", &ExerciseIdentity::new(2, "intro", "hello-world"))
            .unwrap();

        let hy: Vec<u64> = index.exercises_in_course("HY", "intro").map(|r| r.id).collect();
        assert_eq!(hy, vec![1337]);
        assert_eq!(index.exercises_by_course("intro").count(), 2);
    }

    #[test]
    fn update_deadlines_persists_and_survives_redownload() {
        let env = TestEnv::new();
        let mut index = env.index();
        index.create_download_path("HY", "a", &identity()).unwrap();

        let deadline = Utc::now();
        index.update_deadlines(1337, None, Some(deadline)).unwrap();
        assert_eq!(index.storage().records()[0].deadline, Some(deadline));

        index.create_download_path("HY", "b", &identity()).unwrap();
        assert_eq!(index.get_by_id(1337).unwrap().deadline, Some(deadline));
    }
}
