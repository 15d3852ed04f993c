//! Client-side filtering for the notification listing page.

use serde::{Deserialize, Serialize};

use plantdesk_core::types::{Notification, NotificationPriority, NotificationType};

/// Listing tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingTab {
    /// Every cached notification.
    #[default]
    All,
    /// Only notifications not yet read.
    Unread,
}

/// Filters applied over the cached list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Only this category.
    pub kind: Option<NotificationType>,
    /// Only this priority.
    pub priority: Option<NotificationPriority>,
    /// Case-insensitive substring of title or message.
    pub search: Option<String>,
    /// All or unread only.
    pub tab: ListingTab,
}

impl ListingFilter {
    /// Whether `notification` passes every filter.
    pub fn matches(&self, notification: &Notification) -> bool {
        if self.tab == ListingTab::Unread && !notification.is_unread() {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != notification.kind) {
            return false;
        }
        if self
            .priority
            .is_some_and(|priority| priority != notification.priority)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                notification.title.to_lowercase().contains(&needle)
                    || notification.message.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    /// The matching entries, in cache order.
    pub fn apply<'a>(&self, notifications: &'a [Notification]) -> Vec<&'a Notification> {
        notifications.iter().filter(|n| self.matches(n)).collect()
    }
}

/// Entry counts for the tab headers: `(all, unread)`.
pub fn tab_counts(notifications: &[Notification]) -> (usize, usize) {
    let unread = notifications.iter().filter(|n| n.is_unread()).count();
    (notifications.len(), unread)
}
