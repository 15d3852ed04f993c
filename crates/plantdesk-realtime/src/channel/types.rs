//! Channel naming and derivation of a session's channel set.

use std::fmt;

use plantdesk_core::types::{SessionUser, UserId};

/// Broadcast channel every session subscribes to.
pub const BROADCAST_CHANNEL: &str = "notifications-all";

/// Role whose notifications are delivered on the broadcast channel.
const SUPER_USER_ROLE: &str = "super user";

/// Typed channel identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelName {
    /// Personal user channel: `user-{id}`.
    User(UserId),
    /// Role channel: `notifications-{normalized role}`.
    Role(String),
    /// Global broadcast channel: `notifications-all`.
    Broadcast,
}

impl ChannelName {
    /// Channel for a role; "Super User" maps to the broadcast channel.
    pub fn for_role(role: &str) -> Option<Self> {
        let trimmed = role.trim();
        if trimmed.eq_ignore_ascii_case(SUPER_USER_ROLE) {
            return Some(Self::Broadcast);
        }
        let normalized = normalize_role(trimmed);
        if normalized.is_empty() {
            None
        } else {
            Some(Self::Role(normalized))
        }
    }

    /// Converts back to a channel string.
    pub fn to_channel_string(&self) -> String {
        match self {
            Self::User(id) => format!("user-{id}"),
            Self::Role(role) => format!("notifications-{role}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_channel_string())
    }
}

/// Lower-case a role and replace each run of whitespace with a hyphen.
pub fn normalize_role(role: &str) -> String {
    role.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// The channels a session subscribes to, in subscription order, without duplicates.
pub fn session_channels(user: &SessionUser) -> Vec<ChannelName> {
    let mut channels = vec![ChannelName::User(user.id.clone())];

    if let Some(role_channel) = ChannelName::for_role(&user.role) {
        channels.push(role_channel);
    }

    if !channels.contains(&ChannelName::Broadcast) {
        channels.push(ChannelName::Broadcast);
    }

    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(user: &SessionUser) -> Vec<String> {
        session_channels(user)
            .iter()
            .map(ChannelName::to_channel_string)
            .collect()
    }

    #[test]
    fn test_regular_role_gets_three_channels() {
        let user = SessionUser::new("42", "Unit Head");
        assert_eq!(
            names(&user),
            vec!["user-42", "notifications-unit-head", "notifications-all"]
        );
    }

    #[test]
    fn test_super_user_maps_to_broadcast_once() {
        let user = SessionUser::new("1", "Super User");
        assert_eq!(names(&user), vec!["user-1", "notifications-all"]);

        let shouting = SessionUser::new("1", "  SUPER USER ");
        assert_eq!(names(&shouting), vec!["user-1", "notifications-all"]);
    }

    #[test]
    fn test_blank_role_skips_role_channel() {
        let user = SessionUser::new("9", "   ");
        assert_eq!(names(&user), vec!["user-9", "notifications-all"]);
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_role("Dispatch  Team Lead"), "dispatch-team-lead");
        assert_eq!(normalize_role("Accounts"), "accounts");
    }
}
