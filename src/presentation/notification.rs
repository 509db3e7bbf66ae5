//! Dismissible, self-expiring notifications.

use std::time::{Duration, Instant};

/// How long a notification stays up unless dismissed.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTIFICATION_TTL
    }
}

/// Stack of visible notifications, newest last.
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.push_at(kind, message, Instant::now());
    }

    fn push_at(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.items.push(Notification {
            message: message.into(),
            kind,
            raised_at: now,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Warning, message);
    }

    pub fn danger(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Danger, message);
    }

    /// Remove the newest notification. Returns false if there was none.
    pub fn dismiss_latest(&mut self) -> bool {
        self.items.pop().is_some()
    }

    /// Drop every notification older than [`NOTIFICATION_TTL`].
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| !n.is_expired(now));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_after_ttl() {
        let start = Instant::now();
        let mut list = Notifications::default();
        list.push_at(NotificationKind::Info, "Form cleared successfully", start);
        list.push_at(NotificationKind::Danger, "Error: boom", start + Duration::from_secs(3));

        list.prune(start + Duration::from_millis(4_999));
        assert_eq!(list.iter().count(), 2);

        list.prune(start + NOTIFICATION_TTL);
        let left: Vec<_> = list.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(left, vec!["Error: boom"]);

        list.prune(start + Duration::from_secs(8));
        assert!(list.is_empty());
    }

    #[test]
    fn test_dismiss_latest() {
        let mut list = Notifications::default();
        assert!(!list.dismiss_latest());

        list.success("one");
        list.warning("two");
        assert!(list.dismiss_latest());

        let left: Vec<_> = list.iter().map(|n| (n.kind, n.message.clone())).collect();
        assert_eq!(left, vec![(NotificationKind::Success, "one".to_string())]);
    }
}
