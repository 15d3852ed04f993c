//! Notification bell view model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use plantdesk_core::types::{Notification, NotificationId, NotificationPriority, NotificationType};
use plantdesk_realtime::ConnectionState;

use crate::store::FeedState;

use super::navigation::target_for;

/// Entries shown in the bell dropdown.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Largest count printed on the badge.
const BADGE_MAX: u64 = 99;

/// Badge text for an unread count; no badge at zero.
pub fn badge_label(unread: u64) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_MAX => Some(format!("{BADGE_MAX}+")),
        n => Some(n.to_string()),
    }
}

/// Live-connection indicator next to the bell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Pushes arrive in real time.
    Live,
    /// Handshake or reconnection in progress.
    Connecting,
    /// Poll-only mode.
    Offline,
}

impl From<ConnectionState> for Connectivity {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Connected => Self::Live,
            ConnectionState::Initialized | ConnectionState::Connecting => Self::Connecting,
            ConnectionState::Unavailable
            | ConnectionState::Failed
            | ConnectionState::Disconnected => Self::Offline,
        }
    }
}

/// Icon name for a notification category.
pub fn icon(kind: NotificationType) -> &'static str {
    match kind {
        NotificationType::Order => "shopping-cart",
        NotificationType::Inventory => "package",
        NotificationType::Customer => "users",
        NotificationType::System => "settings",
        NotificationType::General => "bell",
    }
}

/// Accent colour for a priority.
pub fn accent(priority: NotificationPriority) -> &'static str {
    match priority {
        NotificationPriority::Low => "gray",
        NotificationPriority::Medium => "blue",
        NotificationPriority::High => "orange",
        NotificationPriority::Urgent => "red",
    }
}

/// Human "time ago" text, e.g. `"just now"`, `"5 minutes ago"`.
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds().max(0);

    let (value, unit) = match seconds {
        s if s < 60 => return "just now".to_string(),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// One row in the bell dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BellItem {
    /// Notification id, used when the row is clicked.
    pub id: NotificationId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Icon name for the notification category.
    pub icon: &'static str,
    /// Colour keyed on priority.
    pub accent: &'static str,
    /// Relative age such as "5 minutes ago".
    pub time_ago: String,
    /// Rendered highlighted until read.
    pub unread: bool,
    /// In-app route opened on click, if the payload names one.
    pub link: Option<String>,
}

impl BellItem {
    fn build(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: notification.id.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            icon: icon(notification.kind),
            accent: accent(notification.priority),
            time_ago: relative_time(notification.created_at, now),
            unread: notification.is_unread(),
            link: target_for(notification),
        }
    }
}

/// Everything the bell widget renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BellView {
    /// Badge text, `None` when nothing is unread.
    pub badge: Option<String>,
    /// Most recent notifications, newest first.
    pub items: Vec<BellItem>,
    /// State of the sound toggle.
    pub sound_enabled: bool,
    /// Live push or polling fallback.
    pub connectivity: Connectivity,
}

impl BellView {
    /// Build from a store snapshot, showing at most `limit` recent entries.
    pub fn build(
        state: &FeedState,
        connection: ConnectionState,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Self {
        Self {
            badge: badge_label(state.unread_count),
            items: state
                .notifications
                .iter()
                .take(limit)
                .map(|n| BellItem::build(n, now))
                .collect(),
            sound_enabled: state.sound_enabled,
            connectivity: connection.into(),
        }
    }
}
