//! # tmcws Architecture
//!
//! tmcws keeps a student's exercise folders in order. Each exercise is either **open**
//! (a folder under the managed root the editor shows) or **closed** (archived in a staging
//! folder keyed by id). A persisted index, an in-memory index and the real directory tree
//! must agree even though the user and the editor can change the tree at any moment.
//!
//! This crate is UI-agnostic. The `tmcws` binary is one thin client over it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (the tmcws CLI)                                     │
//! │  - Parses arguments, prints, installs the log subscriber    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)              Watcher (watcher.rs)             │
//! │  - Locks the workspace,    - notify → channel → one worker  │
//! │    dispatches commands     - Drives the reconciler          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)  Reconciler (reconciler.rs)       │
//! │  - Business operations     - Whitelist sweep + events       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Workspace (workspace.rs)                                   │
//! │  - ExerciseIndex (index.rs) + WatchTree (watch_tree.rs)     │
//! │  - Open ⇔ watched, enforced on every mutation               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - ExerciseStorage trait: JsonStorage, MemStorage           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - The index's `path → id` and `id → record` maps are exact inverses.
//! - An exercise is in the watch tree iff its status is `Open`.
//! - The canonical path of an exercise is a pure function of organization, course and name
//!   (see [`paths`]).
//!
//! ## No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout or stderr or exits the process. Diagnostics go
//! through `tracing`; failures the watcher cannot return go to a [`notifier::UserNotifier`].
//!
//! ## One Writer per Data Directory
//!
//! The in-memory index is only authoritative while no other process changes the same data
//! directory. Clients hold a [`lock::WorkspaceLock`] around every mutating command and for
//! the whole life of a watcher.
//!
//! ## Testing Strategy
//!
//! - Unit tests live next to the code and mostly use [`store::memory::MemStorage`] over a
//!   temporary directory.
//! - Integration tests under `tests/` drive full scenarios through the public API and the
//!   real watcher.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod fsops;
pub mod index;
pub mod init;
pub mod lock;
pub mod model;
pub mod notifier;
pub mod paths;
pub mod reconciler;
pub mod store;
pub mod watch_tree;
pub mod watcher;
pub mod workspace;

#[cfg(test)]
mod test_utils;
