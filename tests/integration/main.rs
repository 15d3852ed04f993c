//! Integration tests for the PlantDesk notification pipeline.

mod helpers;

mod realtime_test;
mod session_test;
mod store_test;
