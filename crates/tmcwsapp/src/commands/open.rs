use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ExerciseRecord;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;
use chrono::Utc;

/// Opens each id in turn. A failing id is reported as an error message and the rest are
/// still opened.
pub fn run<S: ExerciseStorage>(workspace: &mut Workspace<S>, ids: &[u64]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let now = Utc::now();

    for &id in ids {
        let (was_open, record) = match open_one(workspace, id) {
            Ok(opened) => opened,
            Err(e) => {
                result.add_message(CmdMessage::error(format!("Could not open {id}: {e}")));
                continue;
            }
        };

        if was_open {
            result.add_message(CmdMessage::info(format!("{} is already open", label(&record))));
        } else {
            result.add_message(CmdMessage::success(format!(
                "Opened {} at {}",
                label(&record),
                record.path.display()
            )));
        }
        if record.is_expired(now) {
            result.add_message(CmdMessage::warning(format!(
                "The deadline of {} has passed",
                label(&record)
            )));
        }
        result.affected_exercises.push(record);
    }

    Ok(result)
}

fn open_one<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    id: u64,
) -> Result<(bool, ExerciseRecord)> {
    let was_open = workspace.index().get_by_id(id)?.is_open();
    workspace.open(id)?;
    Ok((was_open, workspace.index().get_by_id(id)?.clone()))
}
