use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::reconciler;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

/// Marks exercises whose folders vanished, then sweeps the managed root.
pub fn run<S: ExerciseStorage>(workspace: &mut Workspace<S>) -> Result<CmdResult> {
    let lost = workspace.check_folders()?;
    let report = reconciler::sweep(workspace)?;
    let mut result = CmdResult::default();

    if lost.is_empty() && report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
    if !lost.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "  - Marked {} exercise(s) missing, their folders are absent or empty.",
            lost.len()
        )));
    }
    if !report.removed.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "  - Removed {} unknown entries from the managed root.",
            report.removed.len()
        )));
    }
    if report.marker_rewritten {
        result.add_message(CmdMessage::info("  - Restored the root marker file."));
    }

    for id in lost {
        let record = workspace.index().get_by_id(id)?.clone();
        result.affected_exercises.push(record);
    }
    Ok(result)
}
