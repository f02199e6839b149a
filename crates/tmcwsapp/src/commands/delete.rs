use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;

pub fn run<S: ExerciseStorage>(workspace: &mut Workspace<S>, ids: &[u64]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for &id in ids {
        let record = match workspace.delete(id) {
            Ok(record) => record,
            Err(e) => {
                result.add_message(CmdMessage::error(format!("Could not delete {id}: {e}")));
                continue;
            }
        };
        result.add_message(CmdMessage::success(format!("Deleted {}", label(&record))));
        result.affected_exercises.push(record);
    }

    Ok(result)
}
