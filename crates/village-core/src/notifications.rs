//! Bounded queue of player-facing notifications.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use village_types::{Notification, NotificationId, NotificationKind};

/// FIFO of notifications, keeping only the most recent `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    limit: usize,
}

impl NotificationQueue {
    /// An empty queue holding at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Rebuild from persisted notifications, keeping the newest `limit`.
    pub fn restore(items: Vec<Notification>, limit: usize) -> Self {
        let mut queue = Self::new(limit);
        for item in items {
            queue.push_existing(item);
        }
        queue
    }

    fn push_existing(&mut self, notification: Notification) {
        if self.limit == 0 {
            return;
        }
        while self.items.len() >= self.limit {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    /// Append a new notification. Returns its id.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> NotificationId {
        let id = NotificationId::new();
        self.push_existing(Notification {
            id,
            message: message.into(),
            kind,
            created_at: now,
        });
        id
    }

    /// Remove the notification with `id`. Returns whether it was present.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drop every notification.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy out, oldest first.
    pub fn to_vec(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_are_dropped_past_limit() {
        let mut queue = NotificationQueue::new(2);
        let now = Utc::now();
        queue.push(NotificationKind::Info, "one", now);
        queue.push(NotificationKind::Info, "two", now);
        queue.push(NotificationKind::Info, "three", now);
        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn dismiss_removes_by_id() {
        let mut queue = NotificationQueue::new(10);
        let now = Utc::now();
        let keep = queue.push(NotificationKind::Success, "keep", now);
        let drop = queue.push(NotificationKind::Error, "drop", now);
        assert!(queue.dismiss(drop));
        assert!(!queue.dismiss(drop));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|n| n.id), Some(keep));
    }

    #[test]
    fn restore_truncates_to_newest() {
        let mut source = NotificationQueue::new(10);
        let now = Utc::now();
        for i in 0..5 {
            source.push(NotificationKind::Info, format!("n{i}"), now);
        }
        let restored = NotificationQueue::restore(source.to_vec(), 3);
        let messages: Vec<_> = restored.iter().map(|n| n.message.clone()).collect();
        assert_eq!(messages, vec!["n2", "n3", "n4"]);
    }
}
