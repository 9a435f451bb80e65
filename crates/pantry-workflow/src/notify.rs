//! User-visible notifications.
//!
//! The workflow never touches a global toast queue; it is handed a
//! [`Notifier`] at construction and fires messages at it without waiting.
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::model::SessionId;

pub(crate) const NO_FILE_SELECTED: &str = "Please select a video file first.";
pub(crate) const UPLOAD_BUSY: &str = "An upload is already in progress.";
pub(crate) const SESSION_FINISHED: &str = "Select a new video to start again.";
pub(crate) const UPLOAD_SUCCEEDED: &str = "Video uploaded successfully!";
pub(crate) const UPLOAD_FAILED: &str = "Video upload failed.";
pub(crate) const UPLOAD_ERRORED: &str = "An error occurred during upload.";
pub(crate) const NO_INGREDIENTS: &str = "No ingredients detected.";
pub(crate) const RECIPES_SUCCEEDED: &str = "Recipes generated successfully!";
pub(crate) const RECIPES_FAILED: &str = "Recipe generation failed.";
pub(crate) const RECIPES_ERRORED: &str = "An error occurred during recipe generation.";
pub(crate) const RECIPES_MALFORMED: &str = "Invalid recipe format received from API.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// Transient message for the user.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Session the message refers to.
    pub session_id: SessionId,
}

impl Notification {
    pub fn success(session_id: SessionId, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, session_id, message)
    }

    pub fn warning(session_id: SessionId, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, session_id, message)
    }

    pub fn error(session_id: SessionId, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, session_id, message)
    }

    fn new(level: NotificationLevel, session_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            session_id,
        }
    }
}

/// Sink for notifications. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => info!(session_id = %n.session_id, "{}", n.message),
            NotificationLevel::Warning => warn!(session_id = %n.session_id, "{}", n.message),
            NotificationLevel::Error => error!(session_id = %n.session_id, "{}", n.message),
        }
    }
}

/// Forwards notifications over an unbounded channel, e.g. to a UI task.
///
/// Messages sent after the receiver is dropped are discarded.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_delivers_in_order_and_ignores_closed_receiver() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let id = SessionId::new();
        notifier.notify(Notification::success(id, "a"));
        notifier.notify(Notification::error(id, "b"));
        assert_eq!(rx.try_recv().expect("first").message, "a");
        assert_eq!(
            rx.try_recv().expect("second").level,
            NotificationLevel::Error
        );
        drop(rx);
        notifier.notify(Notification::warning(id, "dropped"));
    }
}
