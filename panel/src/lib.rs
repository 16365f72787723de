//! Golden Path deployment panel
//!
//! Pick a deployment template, dispatch its CI/CD workflow and follow the
//! resulting run until it finishes.

pub mod app;
pub mod authn;
pub mod catalog;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod form;
pub mod http;
pub mod logs;
pub mod models;
pub mod present;
pub mod storage;
pub mod utils;
