use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{ExerciseRecord, ExerciseStatus};
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

pub fn run<S: ExerciseStorage>(workspace: &mut Workspace<S>, ids: &[u64]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for &id in ids {
        let (was_closed, record) = match close_one(workspace, id) {
            Ok(closed) => closed,
            Err(e) => {
                result.add_message(CmdMessage::error(format!("Could not close {id}: {e}")));
                continue;
            }
        };
        if was_closed {
            result.add_message(CmdMessage::info(format!(
                "{} is already closed",
                label(&record)
            )));
        } else {
            result.add_message(CmdMessage::success(format!("Closed {}", label(&record))));
        }
        result.affected_exercises.push(record);
    }

    Ok(result)
}

fn close_one<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    id: u64,
) -> Result<(bool, ExerciseRecord)> {
    let was_closed = workspace.index().get_by_id(id)?.status == ExerciseStatus::Closed;
    workspace.close(id)?;
    Ok((was_closed, workspace.index().get_by_id(id)?.clone()))
}
