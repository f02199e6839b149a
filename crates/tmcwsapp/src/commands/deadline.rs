use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ExerciseStorage;
use crate::workspace::Workspace;
use chrono::{DateTime, Utc};

pub fn run<S: ExerciseStorage>(
    workspace: &mut Workspace<S>,
    id: u64,
    soft_deadline: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
) -> Result<CmdResult> {
    workspace.update_deadlines(id, soft_deadline, deadline)?;
    let record = workspace.index().get_by_id(id)?.clone();

    let mut result = CmdResult::default();
    let message = match (record.soft_deadline, record.deadline) {
        (None, None) => format!("Cleared deadlines of {}", label(&record)),
        (_, Some(hard)) => format!("Deadline of {} set to {}", label(&record), hard.to_rfc3339()),
        (Some(soft), None) => format!(
            "Soft deadline of {} set to {}",
            label(&record),
            soft.to_rfc3339()
        ),
    };
    result.add_message(CmdMessage::success(message));
    if record.is_expired(Utc::now()) {
        result.add_message(CmdMessage::warning("That deadline has already passed"));
    }
    result.affected_exercises.push(record);
    Ok(result)
}
