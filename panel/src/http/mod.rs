//! Workflow API client

pub mod actions;
pub mod client;
