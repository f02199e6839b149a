//! # CLI Layer
//!
//! The CLI layer is the **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Installs the log subscriber
//! - Formats output for human consumption
//! - Decides the exit code
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Builds `AppContext` with the API and configuration
//! - `handle_*()`: Per-command handlers that call the API and print the result
//!
//! Mutating commands take the [`WorkspaceLock`] before the index is loaded and keep it until
//! they return. `watch` holds it for as long as it runs, so while it does, exercises are
//! opened and closed by typing the command into its prompt.

use super::logging;
use super::render::{print_messages, render_exercise_list, render_paths};
use super::setup::{Cli, Commands};
use chrono::Utc;
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tmcwsapp::api::{DownloadRequest, ExerciseFilter, TmcwsApi};
use tmcwsapp::commands::CmdResult;
use tmcwsapp::config::TmcwsConfig;
use tmcwsapp::error::Result;
use tmcwsapp::init::{initialize, resolve_data_dir};
use tmcwsapp::lock::WorkspaceLock;
use tmcwsapp::model::{ExerciseIdentity, ExerciseStatus};
use tmcwsapp::notifier::UserNotifier;
use tmcwsapp::paths::WorkspacePaths;
use tmcwsapp::store::fs::JsonStorage;
use tmcwsapp::watcher::WorkspaceWatcher;

const WATCH_HELP: &str =
    "Commands: open <ids>, close <ids>, delete <ids>, list, sweep, quit (or EOF)";

struct AppContext {
    api: TmcwsApi<JsonStorage>,
    config: TmcwsConfig,
    data_dir: PathBuf,
    paths: WorkspacePaths,
}

/// Prints watcher failures where the person running `tmcws watch` will see them.
pub struct StderrNotifier;

impl UserNotifier for StderrNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("{}", console::style(message).red());
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let data_dir = resolve_data_dir(cli.data.clone())?;
    let _lock = match &cli.command {
        Some(command) if command.modifies_workspace() => {
            Some(WorkspaceLock::acquire(&data_dir, command.name())?)
        }
        _ => None,
    };

    let ctx = init_context(data_dir)?;
    tracing::debug!(command = ?cli.command, "dispatching");

    let result = match cli.command {
        Some(Commands::Download {
            id,
            organization,
            course,
            name,
            checksum,
            from,
        }) => {
            let request = DownloadRequest {
                organization,
                exercise: ExerciseIdentity::new(id, course, name),
                checksum,
                source: from,
            };
            print_result(ctx.api.download(&request)?)
        }
        Some(Commands::Open { ids }) => print_result(ctx.api.open(&ids)?),
        Some(Commands::Close { ids }) => print_result(ctx.api.close(&ids)?),
        Some(Commands::Delete { ids }) => print_result(ctx.api.delete(&ids)?),
        Some(Commands::RemoveCourse {
            course,
            organization,
        }) => print_result(ctx.api.remove_course(&organization, &course)?),
        Some(Commands::List { course, status }) => handle_list(&ctx, course, status)?,
        Some(Commands::Which { path }) => handle_which(&ctx, path)?,
        Some(Commands::Deadline { id, soft, hard }) => {
            print_result(ctx.api.set_deadlines(id, soft, hard)?)
        }
        Some(Commands::Sweep) => print_result(ctx.api.sweep()?),
        Some(Commands::Doctor) => print_result(ctx.api.doctor()?),
        Some(Commands::Watch { duration }) => handle_watch(&ctx, duration)?,
        Some(Commands::Paths { ids }) => handle_paths(&ctx, &ids)?,
        None => handle_list(&ctx, None, None)?,
    };

    Ok(if result.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_context(data_dir: PathBuf) -> Result<AppContext> {
    let ctx = initialize(Some(data_dir))?;
    Ok(AppContext {
        api: ctx.api,
        config: ctx.config,
        data_dir: ctx.data_dir,
        paths: ctx.paths,
    })
}

fn print_result(result: CmdResult) -> CmdResult {
    print_messages(&result.messages);
    result
}

fn handle_list(
    ctx: &AppContext,
    course: Option<String>,
    status: Option<ExerciseStatus>,
) -> Result<CmdResult> {
    let result = ctx.api.list(&ExerciseFilter { course, status })?;
    print!(
        "{}",
        render_exercise_list(&result.listed_exercises, Utc::now())
    );
    Ok(print_result(result))
}

fn handle_which(ctx: &AppContext, path: PathBuf) -> Result<CmdResult> {
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    let result = ctx.api.which(&path)?;
    print!(
        "{}",
        render_exercise_list(&result.listed_exercises, Utc::now())
    );
    Ok(print_result(result))
}

fn handle_paths(ctx: &AppContext, ids: &[u64]) -> Result<CmdResult> {
    let result = ctx.api.paths(ids)?;
    if ids.is_empty() {
        println!("data:      {}", ctx.data_dir.display());
        println!("exercises: {}", ctx.paths.exercises_root.display());
        println!("closed:    {}", ctx.paths.closed_root.display());
    } else {
        print!("{}", render_paths(&result.paths));
    }
    Ok(result)
}

fn handle_watch(ctx: &AppContext, duration: Option<u64>) -> Result<CmdResult> {
    let mut watcher = ctx
        .api
        .watcher(Arc::new(StderrNotifier), ctx.config.sweep_interval());
    watcher.start()?;
    println!("Watching {}", ctx.paths.exercises_root.display());

    match duration {
        Some(secs) => thread::sleep(Duration::from_secs(secs)),
        None => {
            println!("{WATCH_HELP}");
            for line in io::stdin().lock().lines() {
                if !handle_watch_line(ctx, &watcher, line?.trim()) {
                    break;
                }
            }
        }
    }

    watcher.stop();
    println!("Stopped watching.");
    Ok(CmdResult::default())
}

/// Runs one line typed into `watch`. Returns `false` when watching should stop.
///
/// Commands go through the same API, and so the same workspace mutex, as the watcher's
/// worker. Their failures are printed and watching goes on.
fn handle_watch_line(
    ctx: &AppContext,
    watcher: &WorkspaceWatcher<JsonStorage>,
    line: &str,
) -> bool {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return true;
    };
    let ids: std::result::Result<Vec<u64>, _> = words.map(str::parse::<u64>).collect();

    let outcome = match (command, ids) {
        ("quit" | "exit", _) => return false,
        ("sweep", _) => {
            watcher.request_sweep();
            return true;
        }
        ("list" | "ls", _) => handle_list(ctx, None, None).map(|_| ()),
        ("help", _) => {
            println!("{WATCH_HELP}");
            return true;
        }
        ("open" | "close" | "delete", Ok(ids)) if ids.is_empty() => {
            eprintln!("{command} needs at least one exercise id");
            return true;
        }
        ("open", Ok(ids)) => ctx.api.open(&ids).map(|r| print_messages(&r.messages)),
        ("close", Ok(ids)) => ctx.api.close(&ids).map(|r| print_messages(&r.messages)),
        ("delete", Ok(ids)) => ctx.api.delete(&ids).map(|r| print_messages(&r.messages)),
        ("open" | "close" | "delete", Err(e)) => {
            eprintln!("Invalid exercise id: {e}");
            return true;
        }
        (other, _) => {
            eprintln!("Unknown input: {other}. {WATCH_HELP}");
            return true;
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
    }
    true
}
