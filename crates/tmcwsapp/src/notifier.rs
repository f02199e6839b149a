//! Where the watcher reports failures that nobody is waiting on.
//!
//! The watcher worker runs detached from any command, so when a sweep or an event handler
//! fails there is no caller to return an error to. It logs, then hands a short message to a
//! [`UserNotifier`]. Clients plug in whatever surface they have; the CLI prints to stderr.

pub trait UserNotifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Sends notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn show_error(&self, message: &str) {
        tracing::error!(target: "tmcws::notify", "{message}");
    }
}
