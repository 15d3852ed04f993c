//! Logical channels multiplexed over the single push connection.

pub mod handle;
pub mod registry;
pub mod types;

pub use handle::ChannelHandle;
pub use registry::ChannelRegistry;
pub use types::ChannelName;
