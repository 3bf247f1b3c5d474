//! End-to-end workflow against a running academy backend
//!
//! The runner talks to the backend through the typed [`ApiClient`](crate::api::ApiClient)
//! and records every step in a [`Report`] so assertions are made against
//! structured outcomes rather than console output.

pub mod fixtures;
mod report;
mod runner;

pub use report::{Outcome, Report, RunSummary, StepRecord};
pub use runner::{pick_teacher, steps, TestRunner};
