//! Transient user-facing messages.

use serde::Serialize;
use tracing::{info, warn};

use plantdesk_core::error::AppError;
use plantdesk_core::types::Notification;

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    /// Regular informational toast.
    #[default]
    Default,
    /// Red toast for urgent notifications and failures.
    Destructive,
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Style.
    pub variant: ToastVariant,
}

impl Toast {
    /// An informational toast.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    /// A destructive toast.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Toast announcing a pushed notification. Urgent ones are destructive.
    pub fn for_notification(notification: &Notification) -> Self {
        if notification.priority.is_urgent() {
            Self::destructive(&notification.title, &notification.message)
        } else {
            Self::info(&notification.title, &notification.message)
        }
    }

    /// Toast reporting a failed request.
    pub fn for_error(title: impl Into<String>, error: &AppError) -> Self {
        Self::destructive(title, error.message.clone())
    }
}

/// Where toasts go.
pub trait ToastSink: Send + Sync + std::fmt::Debug + 'static {
    /// Show a toast. Must not block.
    fn show(&self, toast: Toast);
}

/// Headless sink that writes toasts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => {
                info!(title = %toast.title, description = %toast.description, "Toast")
            }
            ToastVariant::Destructive => {
                warn!(title = %toast.title, description = %toast.description, "Toast")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use plantdesk_core::types::{NotificationId, NotificationPriority, NotificationType};

    use super::*;

    #[test]
    fn test_urgent_notification_is_destructive() {
        let mut n = Notification {
            id: NotificationId::new("1"),
            kind: NotificationType::Order,
            priority: NotificationPriority::Urgent,
            title: "Line 3 stopped".into(),
            message: "Press fault".into(),
            data: None,
            is_read_by_user: false,
            created_at: Utc::now(),
        };
        assert_eq!(Toast::for_notification(&n).variant, ToastVariant::Destructive);

        n.priority = NotificationPriority::High;
        let toast = Toast::for_notification(&n);
        assert_eq!(toast.variant, ToastVariant::Default);
        assert_eq!(toast.title, "Line 3 stopped");
        assert_eq!(toast.description, "Press fault");
    }
}
