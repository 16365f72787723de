//! Deployment trigger, monitoring and session ownership

pub mod controller;
pub mod monitor;
pub mod trigger;
