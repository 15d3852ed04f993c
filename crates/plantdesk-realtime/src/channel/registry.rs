//! Channel registry: maps each subscribed channel name to its handle.

use std::sync::Arc;

use dashmap::DashMap;

use crate::listener::{Listener, ListenerId};

use super::handle::ChannelHandle;

/// Registry of the channels subscribed by the current session.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel name → handle.
    channels: DashMap<String, Arc<ChannelHandle>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel, returning `false` if it was already present.
    pub fn insert(&self, name: &str) -> bool {
        if self.channels.contains_key(name) {
            return false;
        }
        self.channels
            .insert(name.to_string(), Arc::new(ChannelHandle::new(name.to_string())));
        true
    }

    /// Looks up a channel handle.
    pub fn get(&self, name: &str) -> Option<Arc<ChannelHandle>> {
        self.channels.get(name).map(|entry| entry.value().clone())
    }

    /// Removes every channel, returning their names.
    pub fn drain(&self) -> Vec<String> {
        let names = self.names();
        for name in &names {
            self.channels.remove(name);
        }
        names
    }

    /// Binds a listener on every channel.
    pub fn bind_all(&self, id: ListenerId, listener: &Listener) {
        for entry in self.channels.iter() {
            entry.value().bind(id, listener.clone());
        }
    }

    /// Unbinds a listener from every channel.
    pub fn unbind_all(&self, id: ListenerId) {
        for entry in self.channels.iter() {
            entry.value().unbind(id);
        }
    }

    /// Returns all channel names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
