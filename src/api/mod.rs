//! Typed access to the academy backend's REST API

mod client;
pub mod types;

pub use client::{ApiClient, Created};
