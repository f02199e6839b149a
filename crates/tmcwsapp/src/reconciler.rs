//! # Reconciler
//!
//! Enforces the watch tree as a whitelist over the managed root. Anything under the root that
//! the tree does not account for is deleted; the marker file is kept at its fixed content; and
//! exercises whose open folder disappears are marked missing.
//!
//! Two entry points:
//!
//! - [`sweep`]: a full three-level walk of the root. Run at watcher start, on demand and
//!   periodically.
//! - [`handle_event`]: reacts to one [`FsEvent`] at a time.
//!
//! Both are idempotent. Removing an entry that is already gone is not an error, so an event
//! for a path the sweep just deleted does nothing.
//!
//! ## Depth
//!
//! ```text
//! <root>/                    level 0: marker file + organization folders
//!   <organization>/          level 1: must be a watched organization
//!     <course>/              level 2: must be a watched course
//!       <exercise>/          level 3: must be a watched exercise
//!         ...                never inspected
//! ```
//!
//! Non-directory entries at any of the three levels are removed, except the marker.

use crate::error::Result;
use crate::fsops;
use crate::paths::{WorkspacePaths, ROOT_MARKER_FILE, ROOT_MARKER_TEXT};
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A filesystem change under the managed root, normalized from whatever the OS reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Created(PathBuf),
    Deleted(PathBuf),
    Changed(PathBuf),
}

impl FsEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Deleted(path) | Self::Changed(path) => path,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub marker_rewritten: bool,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && !self.marker_rewritten
    }
}

/// Walks the managed root and removes everything the watch tree does not list.
///
/// The first I/O failure aborts the sweep and is returned.
pub fn sweep<S: ExerciseStorage>(workspace: &Workspace<S>) -> Result<SweepReport> {
    let paths = workspace.paths();
    let tree = workspace.tree();
    let mut report = SweepReport::default();

    fs::create_dir_all(&paths.exercises_root)?;
    report.marker_rewritten = ensure_marker(paths)?;

    for org in fs::read_dir(&paths.exercises_root)? {
        let org = org?;
        let org_name = org.file_name().to_string_lossy().into_owned();
        if org_name == ROOT_MARKER_FILE {
            continue;
        }
        if !org.file_type()?.is_dir() || !tree.has_organization(&org_name) {
            remove_unknown(&org.path(), &mut report)?;
            continue;
        }

        for course in fs::read_dir(org.path())? {
            let course = course?;
            let course_name = course.file_name().to_string_lossy().into_owned();
            if !course.file_type()?.is_dir() || !tree.has_course(&org_name, &course_name) {
                remove_unknown(&course.path(), &mut report)?;
                continue;
            }

            for exercise in fs::read_dir(course.path())? {
                let exercise = exercise?;
                let exercise_name = exercise.file_name().to_string_lossy().into_owned();
                if !exercise.file_type()?.is_dir()
                    || !tree.has_exercise(&org_name, &course_name, &exercise_name)
                {
                    remove_unknown(&exercise.path(), &mut report)?;
                }
            }
        }
    }

    if !report.is_clean() {
        tracing::info!(
            removed = report.removed.len(),
            marker_rewritten = report.marker_rewritten,
            "sweep repaired the managed root"
        );
    }
    Ok(report)
}

/// Applies one filesystem event to the workspace.
pub fn handle_event<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    event: &FsEvent,
) -> Result<()> {
    tracing::debug!(?event, "handling filesystem event");
    match event {
        FsEvent::Created(path) => handle_create(workspace, path),
        FsEvent::Deleted(path) => handle_delete(workspace, path),
        FsEvent::Changed(path) => {
            if *path == workspace.paths().marker_path() && ensure_marker(workspace.paths())? {
                tracing::info!("restored modified root marker");
            }
            Ok(())
        }
    }
}

fn handle_create<S: ExerciseStorage>(workspace: &Workspace<S>, path: &Path) -> Result<()> {
    let paths = workspace.paths();
    let tree = workspace.tree();
    let Some(segments) = paths.relative_segments(path, 3) else {
        return Ok(());
    };

    let unknown_depth = match segments.as_slice() {
        [] => None,
        [marker, ..] if marker == ROOT_MARKER_FILE => None,
        [org, ..] if !tree.has_organization(org) => Some(1),
        [org, course, ..] if !tree.has_course(org, course) => Some(2),
        [org, course, exercise] if !tree.has_exercise(org, course, exercise) => Some(3),
        _ => None,
    };

    if let Some(target) = unknown_depth.and_then(|depth| paths.ancestor_at_depth(path, depth)) {
        if fsops::remove_entry(&target)? {
            tracing::warn!(path = %target.display(), "removed unknown entry from managed root");
        }
    }
    Ok(())
}

fn handle_delete<S: ExerciseStorage>(workspace: &mut Workspace<S>, path: &Path) -> Result<()> {
    if path == workspace.paths().marker_path() {
        fs::create_dir_all(&workspace.paths().exercises_root)?;
        ensure_marker(workspace.paths())?;
        tracing::info!("restored deleted root marker");
        return Ok(());
    }

    let Some(segments) = workspace.paths().relative_segments(path, 4) else {
        return Ok(());
    };
    let Some(org) = segments.first() else {
        return Ok(());
    };
    if !workspace.tree().has_organization(org) {
        return Ok(());
    }

    // Something inside an exercise went away; only the folder itself going matters.
    if segments.len() == 4 {
        let folder = workspace.paths().join_segments(&segments[..3]);
        if folder.exists() {
            return Ok(());
        }
    }

    let course = segments.get(1);
    let exercise = segments.get(2);
    let lost: Vec<u64> = workspace
        .index()
        .all_exercises()
        .filter(|r| r.is_open() && r.organization == *org)
        .filter(|r| course.map_or(true, |c| r.course == *c))
        .filter(|r| exercise.map_or(true, |e| r.name == *e))
        .map(|r| r.id)
        .collect();

    for id in lost {
        workspace.mark_missing(id)?;
    }
    Ok(())
}

/// Writes the marker when it is absent or its content drifted. Returns whether it wrote.
fn ensure_marker(paths: &WorkspacePaths) -> io::Result<bool> {
    let marker = paths.marker_path();
    if marker.is_dir() {
        fsops::remove_entry(&marker)?;
    }
    match fs::read_to_string(&marker) {
        Ok(content) if content == ROOT_MARKER_TEXT => return Ok(false),
        Ok(_) => {}
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::InvalidData) => {}
        Err(e) => return Err(e),
    }
    fs::write(&marker, ROOT_MARKER_TEXT)?;
    Ok(true)
}

fn remove_unknown(path: &Path, report: &mut SweepReport) -> io::Result<()> {
    if fsops::remove_entry(path)? {
        tracing::warn!(path = %path.display(), "removed unknown entry from managed root");
        report.removed.push(path.to_path_buf());
    }
    Ok(())
}
