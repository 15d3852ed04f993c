//! Notification listing and read-state CLI commands.

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use plantdesk_core::error::AppError;
use plantdesk_core::types::{
    ListParams, Notification, NotificationId, NotificationPriority, NotificationType, Pagination,
};
use plantdesk_notify::NotificationApi;
use plantdesk_notify::view::bell::{badge_label, relative_time};
use plantdesk_notify::view::listing::tab_counts;
use plantdesk_notify::view::navigation::target_for;
use plantdesk_notify::view::{ListingFilter, ListingTab};

use crate::output::{self, OutputFormat};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    /// Page size (defaults to `api.page_size`)
    #[arg(long)]
    pub limit: Option<u64>,
    /// Only unread notifications
    #[arg(long)]
    pub unread: bool,
    /// Filter by type (order, inventory, customer, system, general)
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Filter by priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<String>,
    /// Case-insensitive text search over title and message
    #[arg(long)]
    pub search: Option<String>,
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// ID
    id: String,
    /// Type
    #[tabled(rename = "type")]
    kind: String,
    /// Priority
    priority: String,
    /// Title
    title: String,
    /// Age
    age: String,
    /// Read
    read: String,
    /// Link
    link: String,
}

impl NotificationRow {
    fn from_notification(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind.as_str().to_string(),
            priority: n.priority.as_str().to_string(),
            title: n.title.clone(),
            age: relative_time(n.created_at, Utc::now()),
            read: if n.is_read_by_user { "✓" } else { "✗" }.to_string(),
            link: target_for(n).unwrap_or_default(),
        }
    }
}

fn parse_kind(value: &str) -> Result<NotificationType, AppError> {
    NotificationType::ALL
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| AppError::configuration(format!("Unknown notification type '{value}'")))
}

fn parse_priority(value: &str) -> Result<NotificationPriority, AppError> {
    NotificationPriority::ALL
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| AppError::configuration(format!("Unknown priority '{value}'")))
}

/// Execute `list`
pub async fn list(args: &ListArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let api = super::api_client(&config, super::open_storage(&config)?)?;

    let filter = ListingFilter {
        kind: args.kind.as_deref().map(parse_kind).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        search: args.search.clone(),
        tab: if args.unread {
            ListingTab::Unread
        } else {
            ListingTab::All
        },
    };
    let params = ListParams::new(args.page, args.limit.unwrap_or(config.api.page_size))
        .unread_only(args.unread);

    let mut page = api.list(&params).await?;
    page.notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rows: Vec<NotificationRow> = filter
        .apply(&page.notifications)
        .into_iter()
        .map(NotificationRow::from_notification)
        .collect();
    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        println!("{}", summary_line(&page.notifications, page.pagination.as_ref()));
    }
    Ok(())
}

/// Tab counts for the fetched page, plus paging when the server sent it.
fn summary_line(notifications: &[Notification], pagination: Option<&Pagination>) -> String {
    let (all, unread) = tab_counts(notifications);
    let mut line = format!("All ({all}) | Unread ({unread})");
    if let Some(p) = pagination {
        line.push_str(&format!(
            " | Page {}/{} ({} total)",
            p.current_page, p.total_pages, p.total_count
        ));
    }
    line
}

/// Execute `count`
pub async fn count(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let api = super::api_client(&config, super::open_storage(&config)?)?;
    let unread = api.unread_count().await?;

    match format {
        OutputFormat::Json => output::print_item(&serde_json::json!({ "unreadCount": unread }), format),
        OutputFormat::Table => {
            let badge = badge_label(unread).unwrap_or_else(|| "none".to_string());
            println!("Unread notifications: {unread} (badge: {badge})");
        }
    }
    Ok(())
}

/// Execute `read <id>`
pub async fn read(id: &str, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let api = super::api_client(&config, super::open_storage(&config)?)?;

    api.mark_read(&NotificationId::new(id)).await?;
    output::print_success(&format!("Notification {id} marked as read"));
    Ok(())
}

/// Execute `read-all`
pub async fn read_all(force: bool, config_path: &str) -> Result<(), AppError> {
    if !force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Mark ALL notifications as read?")
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let config = super::load_config(config_path)?;
    let api = super::api_client(&config, super::open_storage(&config)?)?;
    api.mark_all_read().await?;
    output::print_success("All notifications marked as read");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_case_insensitively() {
        assert_eq!(parse_kind("Inventory").unwrap(), NotificationType::Inventory);
        assert_eq!(parse_priority("URGENT").unwrap(), NotificationPriority::Urgent);
        assert!(parse_kind("invoice").is_err());
    }

    #[test]
    fn test_summary_line_counts_tabs_and_pages() {
        let notification = |id: &str, read: bool| Notification {
            id: NotificationId::new(id),
            kind: NotificationType::Order,
            priority: NotificationPriority::Medium,
            title: id.to_string(),
            message: String::new(),
            data: None,
            is_read_by_user: read,
            created_at: Utc::now(),
        };
        let fetched = vec![
            notification("a", false),
            notification("b", true),
            notification("c", false),
        ];

        assert_eq!(summary_line(&fetched, None), "All (3) | Unread (2)");
        assert_eq!(
            summary_line(&fetched, Some(&Pagination::new(2, 20, 45))),
            "All (3) | Unread (2) | Page 2/3 (45 total)"
        );
    }
}
