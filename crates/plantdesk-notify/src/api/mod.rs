//! Backend notification endpoints.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use plantdesk_core::error::AppError;
use plantdesk_core::result::AppResult;
use plantdesk_core::types::{ListParams, Notification, NotificationId, Pagination};

pub use self::http::HttpNotificationApi;

/// One page of the notification list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    /// Notifications on this page.
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Paging metadata; absent from some older endpoints.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Body of `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    /// Server-side unread count for the current user.
    pub unread_count: u64,
}

/// The backend sometimes wraps payloads as `{ success, data }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped {
        #[serde(default)]
        success: Option<bool>,
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> AppResult<T> {
        match self {
            Self::Wrapped {
                success: Some(false),
                message,
                ..
            } => Err(AppError::fetch(
                message.unwrap_or_else(|| "Backend reported failure".to_string()),
            )),
            Self::Wrapped { data, .. } | Self::Bare(data) => Ok(data),
        }
    }
}

/// Notification endpoints consumed by the store.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// `GET /notifications`.
    async fn list(&self, params: &ListParams) -> AppResult<NotificationPage>;

    /// `GET /notifications/unread-count`.
    async fn unread_count(&self) -> AppResult<u64>;

    /// `PATCH /notifications/{id}/read`.
    async fn mark_read(&self, id: &NotificationId) -> AppResult<()>;

    /// `PATCH /notifications/mark-all-read`.
    async fn mark_all_read(&self) -> AppResult<()>;
}
