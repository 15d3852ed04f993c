//! Core type definitions used across the PlantDesk workspace.

pub mod notification;
pub mod pagination;
pub mod user;

pub use notification::{
    Notification, NotificationData, NotificationId, NotificationPriority, NotificationType,
};
pub use pagination::{ListParams, Pagination};
pub use user::{SessionUser, UserId};
