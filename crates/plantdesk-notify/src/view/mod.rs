//! View models for the notification bell and the listing page.

pub mod bell;
pub mod listing;
pub mod navigation;

pub use bell::{BellItem, BellView, Connectivity, badge_label, relative_time};
pub use listing::{ListingFilter, ListingTab};
pub use navigation::target_for;
