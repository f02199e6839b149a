use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::reconciler;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

pub fn run<S: ExerciseStorage>(workspace: &Workspace<S>) -> Result<CmdResult> {
    let report = reconciler::sweep(workspace)?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("Managed root is clean."));
        return Ok(result);
    }
    if report.marker_rewritten {
        result.add_message(CmdMessage::info("Restored the root marker file."));
    }
    for path in &report.removed {
        result.add_message(CmdMessage::warning(format!(
            "Removed unknown entry {}",
            path.display()
        )));
    }
    Ok(result.with_paths(report.removed))
}
