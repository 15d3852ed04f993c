//! Client-local persisted storage: a JSON file (or memory) key/value store
//! plus typed accessors for the session token, session user, and the sound
//! preference.

pub mod file;
pub mod keys;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionStorage;
