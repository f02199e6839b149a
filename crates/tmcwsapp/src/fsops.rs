//! Small filesystem primitives shared by the index, the reconciler and the commands.
//!
//! All of them are blocking and tolerate the target already being in the desired state, so
//! handlers that race with the user or the editor can call them repeatedly.

use std::fs;
use std::io;
use std::path::Path;

/// Removes a file, symlink or directory tree.
///
/// Returns `Ok(false)` when nothing existed at `path`.
pub fn remove_entry(path: &Path) -> io::Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Moves a directory to `to`, creating its parents.
///
/// An empty directory already sitting at `to` is replaced; anything else there is an
/// `AlreadyExists` error.
pub fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if to.exists() {
        if is_empty_dir(to)? {
            fs::remove_dir(to)?;
        } else {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
    }
    fs::rename(from, to)
}

/// True if `path` is a directory with at least one entry.
pub fn is_populated_dir(path: &Path) -> bool {
    path.is_dir() && matches!(is_empty_dir(path), Ok(false))
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Recursively copies the contents of `from` into `to`.
pub fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
