//! Academy API check
//!
//! End-to-end integration test client for the academy school-management
//! backend: accounts, courses and assignment CRUD over its REST API.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use testing::{RunSummary, TestRunner};
