//! # tmcws CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, and this file only invokes
//! `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/tmcwsapp/`: the library, with index, watch tree, reconciler, watcher, commands
//! - `crates/tmcws/`: this CLI, a client of the library's API facade
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/tmcws/src/cli/)                          │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering with console styles (render.rs)       │
//! │  - Log subscriber (logging.rs)                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/tmcwsapp/src/api.rs)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Approach
//!
//! - Argument parsing is tested with `Cli::try_parse_from` in `setup.rs`.
//! - Rendering is tested by feeding canned records and messages to `render.rs`.
//! - `tests/cli_e2e.rs` runs the real binary against a temporary data directory
//!   (`TMCWS_DATA`).

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
