//! # plantdesk-core
//!
//! Core crate for the PlantDesk notification client. Contains configuration
//! schemas, notification and session types, pagination metadata, the
//! persisted client-local key/value storage, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PlantDesk crates.

pub mod config;
pub mod error;
pub mod local;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
