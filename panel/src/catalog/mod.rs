//! Template catalog: loading, rendering and selection

pub mod loader;
pub mod view;
