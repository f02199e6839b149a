//! Downloads are staged in two steps. The content is first assembled in a hidden folder
//! next to the staging path, and only a complete copy is registered and swapped into place.
//! A bad source therefore leaves neither a record nor a half-written folder behind.

use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::{Result, TmcError};
use crate::fsops;
use crate::model::ExerciseIdentity;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub organization: String,
    pub exercise: ExerciseIdentity,
    pub checksum: String,
    /// Local folder whose content becomes the exercise. Without it an empty folder is staged.
    pub source: Option<PathBuf>,
}

pub fn run<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    request: &DownloadRequest,
) -> Result<CmdResult> {
    let id = request.exercise.id;
    let closed_root = workspace.paths().closed_root.clone();
    fs::create_dir_all(&closed_root)?;

    let incoming = closed_root.join(format!(".incoming-{id}-{}", Uuid::new_v4()));
    if let Err(e) = assemble(&incoming, request.source.as_deref()) {
        discard(&incoming);
        return Err(e);
    }

    let known = workspace.index().get_by_id(id).is_ok();
    let staging = match workspace.download(
        &request.organization,
        &request.checksum,
        &request.exercise,
    ) {
        Ok(staging) => staging,
        Err(e) => {
            discard(&incoming);
            return Err(e);
        }
    };

    if let Err(e) = swap_in(&incoming, &staging) {
        discard(&incoming);
        if !known {
            workspace.clear(id)?;
        }
        return Err(e);
    }

    let record = workspace.index().get_by_id(id)?.clone();
    let mut result = CmdResult::default().with_paths(vec![staging.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Downloaded {} to {}",
        label(&record),
        staging.display()
    )));
    result.affected_exercises.push(record);
    Ok(result)
}

fn assemble(incoming: &Path, source: Option<&Path>) -> Result<()> {
    match source {
        Some(source) if !source.is_dir() => Err(TmcError::SourceNotFound(source.to_path_buf())),
        Some(source) => Ok(fsops::copy_dir(source, incoming)?),
        None => Ok(fs::create_dir_all(incoming)?),
    }
}

/// Replaces whatever is staged for the exercise with the assembled folder.
fn swap_in(incoming: &Path, staging: &Path) -> Result<()> {
    fsops::remove_entry(staging)?;
    fs::rename(incoming, staging)?;
    Ok(())
}

fn discard(incoming: &Path) {
    if let Err(e) = fsops::remove_entry(incoming) {
        tracing::warn!(path = %incoming.display(), error = %e, "failed to discard partial download");
    }
}
