//! Command implementations

pub mod completions;
pub mod fetch;
pub mod show;
pub mod summarize;
pub mod triage;
