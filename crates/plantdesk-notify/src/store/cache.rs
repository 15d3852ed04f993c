//! Pure edits of the cached notification list.

use plantdesk_core::types::{Notification, NotificationId};

/// Sort newest first. Stable for equal timestamps.
pub fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Result of merging a pushed notification into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// A new entry was added.
    Inserted,
    /// An entry with the same id was replaced.
    Replaced,
}

/// Insert `notification` keeping newest-first order, replacing any entry with the same id.
///
/// A notification newer than everything cached lands at the front.
pub fn merge(notifications: &mut Vec<Notification>, notification: Notification) -> Merge {
    let outcome = match notifications.iter().position(|n| n.id == notification.id) {
        Some(index) => {
            notifications.remove(index);
            Merge::Replaced
        }
        None => Merge::Inserted,
    };

    let index = notifications.partition_point(|n| n.created_at > notification.created_at);
    notifications.insert(index, notification);
    outcome
}

/// What marking one entry read changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadChange {
    /// The entry was unread and is now read.
    Flipped,
    /// The entry was already read.
    AlreadyRead,
    /// No cached entry has this id.
    NotCached,
}

/// Mark one cached entry read.
pub fn mark_read(notifications: &mut [Notification], id: &NotificationId) -> ReadChange {
    match notifications.iter_mut().find(|n| &n.id == id) {
        Some(n) if n.is_read_by_user => ReadChange::AlreadyRead,
        Some(n) => {
            n.is_read_by_user = true;
            ReadChange::Flipped
        }
        None => ReadChange::NotCached,
    }
}

/// Mark every cached entry read.
pub fn mark_all_read(notifications: &mut [Notification]) {
    for n in notifications.iter_mut() {
        n.is_read_by_user = true;
    }
}

/// Whether the list is ordered newest first.
pub fn is_newest_first(notifications: &[Notification]) -> bool {
    notifications
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at)
}
