pub mod channel;

pub use channel::{Notification, NotificationKind, Notifier};
