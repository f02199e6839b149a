use super::styles;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::PathBuf;
use tmcwsapp::commands::{CmdMessage, MessageLevel};
use tmcwsapp::model::{ExerciseRecord, ExerciseStatus};

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut output = String::new();
    for message in messages {
        let style = match message.level {
            MessageLevel::Info => console::Style::new().dim(),
            MessageLevel::Success => console::Style::new().green(),
            MessageLevel::Warning => console::Style::new().yellow(),
            MessageLevel::Error => console::Style::new().red(),
        };
        let _ = writeln!(output, "{}", style.apply_to(&message.content));
    }
    output
}

/// Prints to stdout, except errors, which go to stderr prefixed with `Error:`.
pub fn print_messages(messages: &[CmdMessage]) {
    let (errors, others): (Vec<CmdMessage>, Vec<CmdMessage>) = messages
        .iter()
        .cloned()
        .partition(|m| m.level == MessageLevel::Error);
    let output = render_messages(&others);
    if !output.is_empty() {
        print!("{}", output);
    }
    for error in &errors {
        eprintln!("Error: {}", console::style(&error.content).red());
    }
}

/// One line per exercise: id, status, course/name, deadline.
pub fn render_exercise_list(exercises: &[ExerciseRecord], now: DateTime<Utc>) -> String {
    let name_width = exercises
        .iter()
        .map(|r| r.course.len() + r.name.len() + 1)
        .max()
        .unwrap_or(0);
    let id_width = exercises
        .iter()
        .map(|r| r.id.to_string().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for record in exercises {
        let mut line = String::new();
        let status = match record.status {
            ExerciseStatus::Open => styles::status_open(),
            ExerciseStatus::Closed => styles::status_closed(),
            ExerciseStatus::Missing => styles::status_missing(),
        };
        let id = format!("{:>id_width$}", record.id);
        let name = format!("{}/{}", record.course, record.name);
        let _ = write!(
            line,
            "{}  {}  {:<name_width$}",
            styles::exercise_id().apply_to(id),
            status.apply_to(format!("{:<7}", record.status.as_str())),
            name,
        );
        if let Some(deadline) = record.deadline.or(record.soft_deadline) {
            let style = if record.is_expired(now) {
                styles::deadline_passed()
            } else {
                styles::deadline()
            };
            let _ = write!(
                line,
                "  {}",
                style.apply_to(deadline.format("%Y-%m-%d %H:%M UTC"))
            );
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

pub fn render_paths(paths: &[PathBuf]) -> String {
    let mut output = String::new();
    for path in paths {
        let _ = writeln!(output, "{}", styles::path().apply_to(path.display()));
    }
    output
}
