use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ExerciseStatus;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    pub course: Option<String>,
    pub status: Option<ExerciseStatus>,
}

pub fn run<S: ExerciseStorage>(
    workspace: &Workspace<S>,
    filter: &ExerciseFilter,
) -> Result<CmdResult> {
    let listed: Vec<_> = workspace
        .index()
        .all_exercises()
        .filter(|r| filter.course.as_deref().map_or(true, |c| r.course == c))
        .filter(|r| filter.status.map_or(true, |s| r.status == s))
        .cloned()
        .collect();

    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info("No exercises found."));
    }
    Ok(result.with_listed_exercises(listed))
}
