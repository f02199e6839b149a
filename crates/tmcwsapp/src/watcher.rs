//! # Watcher Lifecycle
//!
//! Connects the OS file watcher to the [reconciler](crate::reconciler).
//!
//! ```text
//! notify thread ──FsEvent──▶ mpsc channel ──▶ worker thread ──lock──▶ Workspace
//!                               ▲
//!      request_sweep() ─Sweep───┘      (periodic Sweep on recv timeout)
//! ```
//!
//! The notify callback does nothing but normalize native events and forward them, so only
//! the single worker thread ever runs reconciler code. The workspace mutex serializes the
//! worker against higher-level actions.
//!
//! ## Failure Handling
//!
//! Nothing the worker does can return an error to a caller. Sweep and handler failures are
//! logged and passed to the [`UserNotifier`] with a hint that restarting repairs the
//! workspace (the startup sweep is the repair path). The worker itself keeps running.
//!
//! ## Stop Semantics
//!
//! `stop()` clears the running flag before detaching. Events already queued may still reach
//! the worker; it drops them without touching the workspace.

use crate::error::Result;
use crate::notifier::UserNotifier;
use crate::reconciler::{self, FsEvent};
use crate::store::ExerciseStorage;
use crate::workspace::{lock, Workspace};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
pub enum WatchMessage {
    Event(FsEvent),
    Sweep,
    Shutdown,
}

struct ActiveWatch {
    // Dropping the watcher detaches it from the root.
    watcher: RecommendedWatcher,
    sender: Sender<WatchMessage>,
    worker: JoinHandle<()>,
}

pub struct WorkspaceWatcher<S: ExerciseStorage + Send + 'static> {
    workspace: Arc<Mutex<Workspace<S>>>,
    notifier: Arc<dyn UserNotifier>,
    sweep_interval: Option<Duration>,
    running: Arc<AtomicBool>,
    active: Option<ActiveWatch>,
}

impl<S: ExerciseStorage + Send + 'static> WorkspaceWatcher<S> {
    pub fn new(workspace: Arc<Mutex<Workspace<S>>>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            workspace,
            notifier,
            sweep_interval: None,
            running: Arc::new(AtomicBool::new(false)),
            active: None,
        }
    }

    /// Sweeps whenever this long passes without any other message.
    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval.filter(|d| !d.is_zero());
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sweeps the managed root once, then starts watching it.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            tracing::warn!("workspace watcher is already running");
            return Ok(());
        }

        let root = {
            let workspace = lock(&self.workspace);
            if let Err(e) = reconciler::sweep(&workspace) {
                report(self.notifier.as_ref(), "Startup sweep failed", &e);
            }
            workspace.paths().exercises_root.clone()
        };

        let (sender, receiver) = mpsc::channel();
        let events = sender.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for fs_event in normalize(event) {
                    let _ = events.send(WatchMessage::Event(fs_event));
                }
            }
            Err(e) => tracing::warn!(error = %e, "file watcher reported an error"),
        })?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        self.running.store(true, Ordering::SeqCst);
        let worker = Worker {
            workspace: Arc::clone(&self.workspace),
            notifier: Arc::clone(&self.notifier),
            running: Arc::clone(&self.running),
            sweep_interval: self.sweep_interval,
        };
        let spawned = thread::Builder::new()
            .name("tmcws-watcher".to_string())
            .spawn(move || worker.run(receiver));
        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        self.active = Some(ActiveWatch {
            watcher,
            sender,
            worker,
        });
        tracing::info!(root = %root.display(), "watching managed root");
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            tracing::warn!("workspace watcher is not running");
            return;
        }
        if let Some(active) = self.active.take() {
            drop(active.watcher);
            let _ = active.sender.send(WatchMessage::Shutdown);
            if active.worker.join().is_err() {
                tracing::error!("watcher worker panicked");
            }
        }
        tracing::info!("stopped watching managed root");
    }

    /// Queues a sweep on the worker. Returns `false` when the watcher is not running.
    pub fn request_sweep(&self) -> bool {
        match &self.active {
            Some(active) if self.is_running() => active.sender.send(WatchMessage::Sweep).is_ok(),
            _ => false,
        }
    }
}

impl<S: ExerciseStorage + Send + 'static> Drop for WorkspaceWatcher<S> {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

struct Worker<S: ExerciseStorage> {
    workspace: Arc<Mutex<Workspace<S>>>,
    notifier: Arc<dyn UserNotifier>,
    running: Arc<AtomicBool>,
    sweep_interval: Option<Duration>,
}

impl<S: ExerciseStorage> Worker<S> {
    fn run(self, receiver: Receiver<WatchMessage>) {
        loop {
            let message = match self.sweep_interval {
                Some(interval) => match receiver.recv_timeout(interval) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => WatchMessage::Sweep,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match receiver.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };

            if matches!(message, WatchMessage::Shutdown) {
                break;
            }
            if !self.running.load(Ordering::SeqCst) {
                continue;
            }

            let mut workspace = lock(&self.workspace);
            match message {
                WatchMessage::Event(event) => {
                    if let Err(e) = reconciler::handle_event(&mut workspace, &event) {
                        let context = format!("Failed to handle change at {}", event.path().display());
                        report(self.notifier.as_ref(), &context, &e);
                    }
                }
                WatchMessage::Sweep => {
                    if let Err(e) = reconciler::sweep(&workspace) {
                        report(self.notifier.as_ref(), "Workspace sweep failed", &e);
                    }
                }
                WatchMessage::Shutdown => break,
            }
        }
        tracing::debug!("watcher worker exited");
    }
}

/// Maps a native event to zero or more [`FsEvent`]s. Renames become a delete plus a create.
pub fn normalize(event: Event) -> Vec<FsEvent> {
    let Event { kind, paths, .. } = event;
    match kind {
        EventKind::Create(_) => paths.into_iter().map(FsEvent::Created).collect(),
        EventKind::Remove(_) => paths.into_iter().map(FsEvent::Deleted).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths.into_iter().map(FsEvent::Deleted).collect(),
            RenameMode::To => paths.into_iter().map(FsEvent::Created).collect(),
            RenameMode::Both => {
                let mut paths = paths.into_iter();
                let mut events = Vec::with_capacity(2);
                if let Some(from) = paths.next() {
                    events.push(FsEvent::Deleted(from));
                }
                if let Some(to) = paths.next() {
                    events.push(FsEvent::Created(to));
                }
                events
            }
            // The backend could not tell which side of the rename this is.
            _ => paths
                .into_iter()
                .map(|path| {
                    if path.exists() {
                        FsEvent::Created(path)
                    } else {
                        FsEvent::Deleted(path)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => {
            paths.into_iter().map(FsEvent::Changed).collect()
        }
        EventKind::Access(_) => Vec::new(),
    }
}

fn report(notifier: &dyn UserNotifier, context: &str, error: &dyn Display) {
    tracing::error!(error = %error, "{context}");
    notifier.show_error(&format!(
        "{context}: {error}. Restart tmcws to repair the workspace."
    ));
}
