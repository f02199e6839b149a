//! # Workspace Lock
//!
//! Only one `tmcws` process may change a data directory at a time. A long-running `watch`
//! keeps its index and watch tree in memory, so an `open` from a second process would
//! change the disk behind its back and the reconciler would delete the freshly opened
//! folder as foreign.
//!
//! Every command that mutates the workspace holds a [`WorkspaceLock`] for its whole run. The
//! lock is a sentinel file (`tmcws.lock`) in the data directory naming the holder:
//!
//! ```text
//! { "pid": 4242, "command": "watch", "since": "2026-10-14T09:00:00Z" }
//! ```
//!
//! The file is written to a temporary name first and hard-linked into place, so it appears
//! atomically and always with its content. A sentinel left behind by a process that is no
//! longer alive is recovered on the next acquire. Dropping the lock removes the file.

use crate::error::{Result, TmcError};
use crate::fsops;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOCK_FILE: &str = "tmcws.lock";

const ACQUIRE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub command: String,
    pub since: DateTime<Utc>,
}

impl LockHolder {
    fn current(command: &str) -> Self {
        Self {
            pid: std::process::id(),
            command: command.to_string(),
            since: Utc::now(),
        }
    }

    pub fn is_alive(&self) -> bool {
        pid_alive(self.pid)
    }
}

#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
    holder: LockHolder,
}

impl WorkspaceLock {
    /// Takes the lock of `data_dir` for `command`, or fails with [`TmcError::Locked`] naming
    /// the live process that holds it.
    pub fn acquire(data_dir: &Path, command: &str) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILE);
        let holder = LockHolder::current(command);

        let pending = data_dir.join(format!(".{LOCK_FILE}-{}", Uuid::new_v4()));
        fs::write(&pending, serde_json::to_vec_pretty(&holder)?)?;
        let outcome = Self::link(&pending, &path);
        fsops::remove_entry(&pending)?;
        outcome?;

        tracing::debug!(pid = holder.pid, command, "acquired workspace lock");
        Ok(Self { path, holder })
    }

    fn link(pending: &Path, path: &Path) -> Result<()> {
        for _ in 0..ACQUIRE_ATTEMPTS {
            match fs::hard_link(pending, path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }

            match read_holder(path)? {
                Some(existing) if existing.is_alive() => {
                    return Err(TmcError::Locked {
                        pid: existing.pid,
                        command: existing.command,
                    });
                }
                Some(existing) => {
                    tracing::warn!(
                        pid = existing.pid,
                        command = %existing.command,
                        "recovering stale workspace lock"
                    );
                    fsops::remove_entry(path)?;
                }
                // Released between our attempt and the read.
                None => {}
            }
        }
        Err(TmcError::UnsupportedState(format!(
            "could not acquire {} after {ACQUIRE_ATTEMPTS} attempts",
            path.display()
        )))
    }

    /// Who holds the lock of `data_dir` right now, if anyone alive does.
    pub fn holder_of(data_dir: &Path) -> Result<Option<LockHolder>> {
        Ok(read_holder(&data_dir.join(LOCK_FILE))?.filter(LockHolder::is_alive))
    }

    pub fn holder(&self) -> &LockHolder {
        &self.holder
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        match fsops::remove_entry(&self.path) {
            Ok(_) => tracing::debug!(command = %self.holder.command, "released workspace lock"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to release workspace lock"),
        }
    }
}

/// An unparsable sentinel is treated as stale; complete files are the only ones ever linked.
fn read_holder(path: &Path) -> Result<Option<LockHolder>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes).unwrap_or(LockHolder {
        pid: 0,
        command: "unknown".to_string(),
        since: DateTime::<Utc>::MIN_UTC,
    })))
}

#[cfg(target_os = "linux")]
fn pid_alive(pid: u32) -> bool {
    pid != 0 && Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(target_os = "linux"))]
fn pid_alive(pid: u32) -> bool {
    pid != 0
}
