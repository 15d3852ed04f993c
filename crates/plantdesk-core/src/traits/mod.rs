//! Core traits defined in `plantdesk-core` and implemented by other modules.

pub mod key_value;

pub use key_value::KeyValueStore;
