use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tmcwsapp::model::ExerciseStatus;

#[derive(Parser, Debug)]
#[command(name = "tmcws", bin_name = "tmcws", version)]
#[command(
    about = "Keeps a folder of coding exercises in sync with its index",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (default: $TMCWS_DATA or the OS data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register an exercise and stage its content (closed)
    Download {
        /// Server-assigned exercise id
        #[arg(long)]
        id: u64,

        #[arg(long = "org")]
        organization: String,

        #[arg(long)]
        course: String,

        /// Exercise name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        checksum: String,

        /// Copy content from this folder instead of staging an empty one
        #[arg(long, value_name = "DIR")]
        from: Option<PathBuf>,
    },

    /// Move exercises into the managed root
    Open {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Move exercises out of the managed root
    Close {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Delete exercises and their content
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Delete every exercise of a course
    RemoveCourse {
        course: String,

        #[arg(long = "org")]
        organization: String,
    },

    /// List exercises
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        course: Option<String>,

        /// open, closed or missing
        #[arg(long, value_parser = parse_status)]
        status: Option<ExerciseStatus>,
    },

    /// Show the exercise a file or folder belongs to
    Which { path: PathBuf },

    /// Set or clear deadlines (RFC 3339 timestamps). No flags clears both.
    Deadline {
        id: u64,

        #[arg(long, value_parser = parse_datetime)]
        soft: Option<DateTime<Utc>>,

        #[arg(long, value_parser = parse_datetime)]
        hard: Option<DateTime<Utc>>,
    },

    /// Remove everything under the managed root that is not an open exercise
    Sweep,

    /// Mark exercises with vanished folders as missing, then sweep
    Doctor,

    /// Keep the managed root clean while running
    Watch {
        /// Stop after this many seconds instead of waiting on stdin
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Print where exercises live, or the managed roots when no ids are given
    Paths { ids: Vec<u64> },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Open { .. } => "open",
            Self::Close { .. } => "close",
            Self::Delete { .. } => "delete",
            Self::RemoveCourse { .. } => "remove-course",
            Self::List { .. } => "list",
            Self::Which { .. } => "which",
            Self::Deadline { .. } => "deadline",
            Self::Sweep => "sweep",
            Self::Doctor => "doctor",
            Self::Watch { .. } => "watch",
            Self::Paths { .. } => "paths",
        }
    }

    /// Commands that change the index or the managed root and so need the workspace lock.
    pub fn modifies_workspace(&self) -> bool {
        !matches!(
            self,
            Self::List { .. } | Self::Which { .. } | Self::Paths { .. }
        )
    }
}

fn parse_status(value: &str) -> Result<ExerciseStatus, String> {
    value.parse().map_err(|e: tmcwsapp::error::TmcError| e.to_string())
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
