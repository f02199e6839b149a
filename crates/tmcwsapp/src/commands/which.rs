use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;
use std::path::Path;

/// Finds the exercise whose folder contains `path`, e.g. the file open in the editor.
pub fn run<S: ExerciseStorage>(workspace: &Workspace<S>, path: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match workspace.index().resolve_owning_exercise(path) {
        Some(id) => {
            let record = workspace.index().get_by_id(id)?.clone();
            result.listed_exercises.push(record);
        }
        None => result.add_message(CmdMessage::info(format!(
            "{} is not inside a managed exercise",
            path.display()
        ))),
    }
    Ok(result)
}
