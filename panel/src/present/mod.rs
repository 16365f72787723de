//! Status presentation

pub mod console;
pub mod status;
