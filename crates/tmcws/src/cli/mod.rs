//! # CLI Behavior
//!
//! This is **one possible client** for tmcws. It is the only place that knows about terminal
//! I/O, exit codes and output formatting.
//!
//! ## Watching
//!
//! `tmcws watch` sweeps the managed root, then keeps it clean until stdin closes or the user
//! types `quit`. With `--duration <secs>` it watches for a fixed time instead of reading
//! stdin. Lines typed while watching:
//!
//! ```text
//! open 1 2       open exercises through the watching process
//! close 1        close them again
//! delete 3       delete them
//! list           print the index
//! sweep          force an immediate sweep
//! quit           stop watching
//! ```
//!
//! ## Locking
//!
//! Every command that changes the workspace takes the data directory's lock first. While
//! `watch` runs it holds that lock, and another `tmcws open` fails naming the watching
//! process. Use the watch prompt instead.
//!
//! Errors the watcher cannot return are printed to stderr by [`commands::StderrNotifier`].
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the API and print results
//! - `logging`: `tracing` subscriber setup
//! - `render`: Output formatting
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styles

mod commands;
mod logging;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
