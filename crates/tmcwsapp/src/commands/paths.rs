use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

/// Current content locations of the given exercises, or the two roots when none are given.
pub fn run<S: ExerciseStorage>(workspace: &Workspace<S>, ids: &[u64]) -> Result<CmdResult> {
    if ids.is_empty() {
        let paths = workspace.paths();
        return Ok(CmdResult::default()
            .with_paths(vec![paths.exercises_root.clone(), paths.closed_root.clone()]));
    }

    let mut locations = Vec::with_capacity(ids.len());
    for &id in ids {
        locations.push(workspace.index().location(id)?);
    }
    Ok(CmdResult::default().with_paths(locations))
}
