//! Single subscribed channel with its bound listeners.

use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use plantdesk_core::types::Notification;

use crate::listener::{Listener, ListenerId};

/// A subscribed channel and the notification handlers bound to it.
pub struct ChannelHandle {
    /// Channel name.
    pub name: String,
    /// When the subscription was created.
    pub subscribed_at: DateTime<Utc>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
}

impl ChannelHandle {
    /// Creates a new channel handle with no listeners.
    pub fn new(name: String) -> Self {
        Self {
            name,
            subscribed_at: Utc::now(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Binds a listener. Binding the same id twice is a no-op.
    pub fn bind(&self, id: ListenerId, listener: Listener) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        if !listeners.iter().any(|(existing, _)| *existing == id) {
            listeners.push((id, listener));
        }
    }

    /// Unbinds a listener.
    pub fn unbind(&self, id: ListenerId) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.retain(|(existing, _)| *existing != id);
    }

    /// Returns the number of bound listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Invokes every bound listener with the notification.
    ///
    /// Listeners are cloned out of the lock first so a listener may
    /// (un)register without deadlocking. Returns the number invoked.
    pub fn dispatch(&self, notification: &Notification) -> usize {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for listener in &listeners {
            listener(notification.clone());
        }
        listeners.len()
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("name", &self.name)
            .field("subscribed_at", &self.subscribed_at)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
