use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}

/// A user-facing message. `message == None` means nothing is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: Option<String>,
    pub kind: NotificationKind,
}

impl Notification {
    fn empty() -> Self {
        Self {
            id: 0,
            message: None,
            kind: NotificationKind::Info,
        }
    }
}

/// Single-slot broadcast of the latest notification.
///
/// Subscribers see the current value immediately and only ever the newest
/// one; rapid publishes overwrite each other.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<watch::Sender<Notification>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (sender, _) = watch::channel(Notification::empty());
        Self {
            sender: Arc::new(sender),
            next_id: Arc::new(AtomicU64::new(1)),
            ttl,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn latest(&self) -> Notification {
        self.sender.borrow().clone()
    }

    /// Publish a message and schedule its removal after the configured delay.
    ///
    /// Clearing needs a tokio runtime; outside one the message stays until
    /// replaced.
    pub fn publish(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = message.into();
        debug!("Notification {} ({}): {}", id, kind, message);
        self.sender.send_replace(Notification {
            id,
            message: Some(message),
            kind,
        });

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let sender = Arc::clone(&self.sender);
            let ttl = self.ttl;
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                clear_if_current(&sender, id);
            });
        }
        id
    }

    /// Clear the message with `id` unless something newer replaced it
    pub fn clear(&self, id: u64) {
        clear_if_current(&self.sender, id);
    }
}

fn clear_if_current(sender: &watch::Sender<Notification>, id: u64) {
    sender.send_if_modified(|current| {
        if current.id == id && current.message.is_some() {
            current.message = None;
            true
        } else {
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_replay() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        assert_eq!(notifier.latest().message, None);

        notifier.publish("first", NotificationKind::Info);
        notifier.publish("second", NotificationKind::Error);

        // A late subscriber only sees the newest message
        let receiver = notifier.subscribe();
        let current = receiver.borrow().clone();
        assert_eq!(current.message.as_deref(), Some("second"));
        assert_eq!(current.kind, NotificationKind::Error);
    }

    #[test]
    fn test_clear_ignores_stale_ids() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        let old = notifier.publish("old", NotificationKind::Info);
        let new = notifier.publish("new", NotificationKind::Success);

        notifier.clear(old);
        assert_eq!(notifier.latest().message.as_deref(), Some("new"));

        notifier.clear(new);
        assert_eq!(notifier.latest().message, None);
    }

    #[tokio::test]
    async fn test_subscriber_is_woken() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        let mut receiver = notifier.subscribe();

        notifier.publish("Login successful!", NotificationKind::Success);
        receiver.changed().await.unwrap();
        assert_eq!(
            receiver.borrow().message.as_deref(),
            Some("Login successful!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_clear_after_ttl() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        notifier.publish("will vanish", NotificationKind::Info);

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert_eq!(notifier.latest().message.as_deref(), Some("will vanish"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(notifier.latest().message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_survives_older_timer() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        notifier.publish("older", NotificationKind::Info);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        notifier.publish("newer", NotificationKind::Error);

        // The first timer fires at 5000 ms but must not clear "newer"
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(notifier.latest().message.as_deref(), Some("newer"));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(notifier.latest().message, None);
    }
}
