//! Where clicking a notification leads.

use plantdesk_core::types::Notification;

/// Route for the entity a notification refers to.
///
/// Orders win over customers, customers over inventory items.
pub fn target_for(notification: &Notification) -> Option<String> {
    let data = notification.data.as_ref()?;

    if let Some(id) = non_empty(&data.order_id) {
        return Some(format!("/orders?highlight={id}"));
    }
    if let Some(id) = non_empty(&data.customer_id) {
        return Some(format!("/customers?highlight={id}"));
    }
    non_empty(&data.item_id).map(|id| format!("/inventory?highlight={id}"))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
