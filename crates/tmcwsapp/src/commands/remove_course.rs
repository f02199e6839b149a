use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

pub fn run<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    organization: &str,
    course: &str,
) -> Result<CmdResult> {
    let removed = workspace.remove_course(organization, course)?;
    let mut result = CmdResult::default();

    if removed.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "No exercises found for course {organization}/{course}"
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Removed course {organization}/{course} ({} exercise(s))",
            removed.len()
        )));
    }
    result.affected_exercises = removed;
    Ok(result)
}
