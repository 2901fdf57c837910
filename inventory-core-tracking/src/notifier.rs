use tracing::{error, info, warn};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Toast-style notices shown to the user.
///
/// The tracking components report every outcome the user should see through
/// this trait and never decide how it is rendered.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Notifier for headless use: every notice becomes a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success | NoticeLevel::Info => info!(target: "inventory::notice", ?level, "{message}"),
            NoticeLevel::Warning => warn!(target: "inventory::notice", "{message}"),
            NoticeLevel::Error => error!(target: "inventory::notice", "{message}"),
        }
    }
}
