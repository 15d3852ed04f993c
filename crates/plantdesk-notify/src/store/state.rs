//! Observable notification feed state.

use serde::Serialize;

use plantdesk_core::error::AppError;
use plantdesk_core::types::{Notification, Pagination};

/// Lifecycle of the cached feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// First fetch in flight.
    Loading,
    /// Data available. Later failures keep the feed here.
    Ready,
    /// The first fetch failed and nothing is cached.
    Error,
}

/// Snapshot of everything the presentation layer reads.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    /// Load status.
    pub status: FeedStatus,
    /// Cached notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Paging metadata of the last list fetch.
    pub pagination: Option<Pagination>,
    /// Unread count shown on the bell.
    pub unread_count: u64,
    /// Whether `unread_count` came from the server at least once this session.
    pub count_from_server: bool,
    /// Failure of the list poll, cleared by the next successful list fetch.
    pub list_error: Option<AppError>,
    /// Failure of the count poll, cleared by the next successful count fetch.
    pub count_error: Option<AppError>,
    /// Mirrors the sound preference.
    pub sound_enabled: bool,
}

impl FeedState {
    /// Initial state for a session.
    pub fn new(sound_enabled: bool) -> Self {
        Self {
            sound_enabled,
            ..Self::default()
        }
    }

    /// Number of cached entries not yet read.
    pub fn cached_unread(&self) -> u64 {
        self.notifications.iter().filter(|n| n.is_unread()).count() as u64
    }

    /// Whichever poll is currently failing, list first.
    pub fn last_error(&self) -> Option<&AppError> {
        self.list_error.as_ref().or(self.count_error.as_ref())
    }
}
