//! # Command Layer
//!
//! The business operations of tmcws, one submodule each. Every command is a plain function
//! over a [`Workspace`](crate::workspace::Workspace) that returns a structured [`CmdResult`].
//!
//! ## What Commands Do NOT Do
//!
//! - **Terminal I/O**: no stdout or stderr, no colors
//! - **Argument parsing**: that's the CLI layer's job
//! - **Exit codes**: return `Result`, let the caller decide
//! - **Locking**: the [API facade](crate::api) takes the workspace lock and hands commands a
//!   plain `&mut Workspace`
//!
//! ## Structured Returns
//!
//! [`CmdResult`] carries:
//! - `affected_exercises`: records changed by the command, in their post-command state
//! - `listed_exercises`: records to display
//! - `paths`: filesystem locations (for `download`, `paths`)
//! - `messages`: leveled messages (info, success, warning, error)
//!
//! ## Command Modules
//!
//! - [`download`]: Register an exercise and stage its content
//! - [`open`] / [`close`]: Move exercises in and out of the managed root
//! - [`delete`]: Remove an exercise and its content
//! - [`remove_course`]: Remove every exercise of a course
//! - [`list`]: List exercises
//! - [`which`]: Find the exercise owning a path
//! - [`deadline`]: Record deadlines
//! - [`sweep`]: Enforce the whitelist over the managed root once
//! - [`doctor`]: Detect missing folders, then sweep
//! - [`paths`]: Show where things live

use crate::model::ExerciseRecord;
use serde::Serialize;
use std::path::PathBuf;

pub mod close;
pub mod deadline;
pub mod delete;
pub mod doctor;
pub mod download;
pub mod list;
pub mod open;
pub mod paths;
pub mod remove_course;
pub mod sweep;
pub mod which;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_exercises: Vec<ExerciseRecord>,
    pub listed_exercises: Vec<ExerciseRecord>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_exercises(mut self, exercises: Vec<ExerciseRecord>) -> Self {
        self.listed_exercises = exercises;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }
}

/// `course/name (id)`, the way exercises are named in messages.
pub(crate) fn label(record: &ExerciseRecord) -> String {
    format!("{}/{} ({})", record.course, record.name, record.id)
}
