//! Credential acquisition

pub mod credentials;
