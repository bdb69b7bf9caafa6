//! Adapters Layer

pub mod json;
pub mod memory;

pub use json::JsonContactSource;
pub use memory::InMemoryContactSource;
