//! Configuration form: per-template fields and deploy gating

pub mod builder;
pub mod repo_url;
