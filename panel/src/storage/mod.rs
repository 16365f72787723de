//! Local persistence: layout, settings and the key-value config store

pub mod layout;
pub mod settings;
pub mod store;
