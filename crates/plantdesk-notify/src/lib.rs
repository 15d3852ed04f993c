//! # plantdesk-notify
//!
//! Client-side notification pipeline for PlantDesk:
//!
//! - [`store::NotificationStore`] reconciles polled lists, the unread count,
//!   and realtime pushes into one observable view, with optimistic
//!   read/unread mutations
//! - [`api::HttpNotificationApi`] talks to the backend notification endpoints
//! - [`sound::SoundAlertEngine`] plays the alert cue with layered fallback
//! - [`session::NotificationSession`] wires polling, the push bridge, and
//!   reconnection for one signed-in user
//! - [`view`] builds bell and listing view models from store snapshots

pub mod api;
pub mod session;
pub mod sound;
pub mod store;
pub mod toast;
pub mod view;

pub use api::{HttpNotificationApi, NotificationApi, NotificationPage};
pub use session::NotificationSession;
pub use sound::{SoundAlertEngine, SoundLayer};
pub use store::{FeedState, FeedStatus, NotificationStore};
pub use toast::{Toast, ToastSink, ToastVariant, TracingToastSink};
