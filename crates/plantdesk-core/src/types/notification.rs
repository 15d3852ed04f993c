//! Notification wire model shared by the REST API and the realtime transport.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque server-assigned notification identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Notification category, drives icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NotificationType {
    /// Sales/production order events.
    Order,
    /// Stock and inventory events.
    Inventory,
    /// Customer account events.
    Customer,
    /// System-level announcements.
    System,
    /// Anything else.
    #[default]
    General,
}

impl NotificationType {
    /// All variants, in display order.
    pub const ALL: [Self; 5] = [
        Self::Order,
        Self::Inventory,
        Self::Customer,
        Self::System,
        Self::General,
    ];

    /// Parse from string; unknown values map to [`NotificationType::General`].
    pub fn from_str_value(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "order" => Self::Order,
            "inventory" => Self::Inventory,
            "customer" => Self::Customer,
            "system" => Self::System,
            _ => Self::General,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Inventory => "inventory",
            Self::Customer => "customer",
            Self::System => "system",
            Self::General => "general",
        }
    }
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        Self::from_str_value(&value)
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification priority levels, drive visual weight and toast variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Standard events.
    #[default]
    Medium,
    /// Important events.
    High,
    /// Needs immediate attention; toasted as destructive.
    Urgent,
}

impl NotificationPriority {
    /// All variants, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Parse from string; unknown values map to [`NotificationPriority::Medium`].
    pub fn from_str_value(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Medium,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Whether this priority calls for a destructive (alarming) toast.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Urgent)
    }
}

impl From<String> for NotificationPriority {
    fn from(value: String) -> Self {
        Self::from_str_value(&value)
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-references carried by a notification, used for post-click navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Related order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Related customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Related inventory item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Any other payload keys, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A notification as cached by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    #[serde(alias = "_id")]
    pub id: NotificationId,
    /// Category.
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    /// Priority level.
    #[serde(default)]
    pub priority: NotificationPriority,
    /// Title line.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// Optional cross-reference payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
    /// Read flag for the viewing user.
    #[serde(default)]
    pub is_read_by_user: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification is unread by the viewing user.
    pub fn is_unread(&self) -> bool {
        !self.is_read_by_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "_id": "66a1f0c2",
            "type": "order",
            "priority": "urgent",
            "title": "Order delayed",
            "message": "Order SO-1042 missed its dispatch slot",
            "data": { "orderId": "SO-1042", "plant": "unit-2" },
            "isReadByUser": false,
            "createdAt": "2026-03-01T10:15:00Z"
        }"#;

        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.id.as_str(), "66a1f0c2");
        assert_eq!(n.kind, NotificationType::Order);
        assert_eq!(n.priority, NotificationPriority::Urgent);
        assert!(n.is_unread());
        let data = n.data.unwrap();
        assert_eq!(data.order_id.as_deref(), Some("SO-1042"));
        assert_eq!(data.extra.get("plant").unwrap(), "unit-2");
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let json = r#"{
            "id": "n1",
            "type": "dispatch",
            "priority": "critical",
            "title": "t",
            "createdAt": "2026-03-01T10:15:00Z"
        }"#;

        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationType::General);
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert!(!n.is_read_by_user);
        assert!(n.message.is_empty());
    }

    #[test]
    fn test_serializes_wire_names() {
        let n = Notification {
            id: NotificationId::new("n2"),
            kind: NotificationType::Inventory,
            priority: NotificationPriority::High,
            title: "Low stock".into(),
            message: "Steel coil below threshold".into(),
            data: None,
            is_read_by_user: true,
            created_at: "2026-03-01T10:15:00Z".parse().unwrap(),
        };

        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], "inventory");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["isReadByUser"], true);
        assert!(value.get("data").is_none());
    }
}
