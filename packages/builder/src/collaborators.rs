//! External collaborators the controller consults but never implements:
//! permission checks, user-facing notifications, and the online/offline
//! signal. Defaults suitable for tests and single-user tooling live here too.

use crate::router::EditorMode;
use tracing::{error, info, warn};

/// Authorization checks consulted before manual save/publish.
pub trait PermissionGate: Send + Sync {
    fn can_edit(&self, mode: EditorMode) -> bool;
    fn can_publish(&self, mode: EditorMode) -> bool;
}

/// Grants edit everywhere and publish wherever the mode supports it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn can_edit(&self, _mode: EditorMode) -> bool {
        true
    }

    fn can_publish(&self, mode: EditorMode) -> bool {
        mode.supports_publish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A fire-and-forget user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Presents notices to the user. The controller never blocks on it.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that forwards to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(title = %notice.title, "{}", notice.body),
            NoticeLevel::Warning => warn!(title = %notice.title, "{}", notice.body),
            NoticeLevel::Error => error!(title = %notice.title, "{}", notice.body),
        }
    }
}

/// Online/offline signal, sampled at save time to label outcomes.
pub trait Liveness: Send + Sync {
    fn is_online(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Liveness for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}
