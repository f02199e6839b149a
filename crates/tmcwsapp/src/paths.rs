//! # Path Derivation
//!
//! Every on-disk location the workspace manages is computed here and nowhere else:
//!
//! ```text
//! <exercises_root>/
//! ├── .tmc-root                     # Marker file, fixed content
//! └── <organization>/
//!     └── <course>/
//!         └── <name>/               # Canonical path of an open exercise
//!
//! <closed_root>/
//! └── <id>/                         # Staging path of a closed exercise
//! ```
//!
//! Derivation is pure: the same identity always yields the same path, which is what lets the
//! index treat the canonical path as a key.

use crate::error::{Result, TmcError};
use std::path::{Component, Path, PathBuf};

/// File name of the marker that identifies the managed root to the host editor.
pub const ROOT_MARKER_FILE: &str = ".tmc-root";

/// Exact content the marker file must always have.
pub const ROOT_MARKER_TEXT: &str =
    "This folder is managed by tmcws. Unknown files and folders placed here will be removed.\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub exercises_root: PathBuf,
    pub closed_root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(exercises_root: impl Into<PathBuf>, closed_root: impl Into<PathBuf>) -> Self {
        Self {
            exercises_root: exercises_root.into(),
            closed_root: closed_root.into(),
        }
    }

    /// `<exercises_root>/<organization>/<course>/<name>`
    pub fn exercise_path(&self, organization: &str, course: &str, name: &str) -> PathBuf {
        self.exercises_root
            .join(organization)
            .join(course)
            .join(name)
    }

    /// `<closed_root>/<id>`
    pub fn closed_path(&self, id: u64) -> PathBuf {
        self.closed_root.join(id.to_string())
    }

    pub fn marker_path(&self) -> PathBuf {
        self.exercises_root.join(ROOT_MARKER_FILE)
    }

    /// Splits `path` into at most `limit` segments relative to the managed root.
    ///
    /// Returns `None` when the path is not under the root. The root itself yields an
    /// empty list.
    pub fn relative_segments(&self, path: &Path, limit: usize) -> Option<Vec<String>> {
        let relative = path.strip_prefix(&self.exercises_root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            if segments.len() == limit {
                break;
            }
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => continue,
                _ => return None,
            }
        }
        Some(segments)
    }

    /// The first `depth` components of `path` below the managed root, joined back onto it.
    ///
    /// Unlike [`relative_segments`](Self::relative_segments) the names are kept exactly as
    /// the OS reported them, so the result always names the entry on disk.
    pub fn ancestor_at_depth(&self, path: &Path, depth: usize) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.exercises_root).ok()?;
        let mut ancestor = self.exercises_root.clone();
        let mut taken = 0;
        for component in relative.components() {
            if taken == depth {
                break;
            }
            match component {
                Component::Normal(part) => {
                    ancestor.push(part);
                    taken += 1;
                }
                Component::CurDir => continue,
                _ => return None,
            }
        }
        (taken == depth).then_some(ancestor)
    }

    /// Joins the given segments back onto the managed root.
    pub fn join_segments(&self, segments: &[String]) -> PathBuf {
        segments
            .iter()
            .fold(self.exercises_root.clone(), |acc, segment| acc.join(segment))
    }
}

/// Ensures `value` is usable as exactly one path segment.
pub fn validate_segment(kind: &'static str, value: &str) -> Result<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0');
    if invalid {
        return Err(TmcError::InvalidName {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}
