//! # Client Container
//!
//! Composition root: builds every subsystem from [`ClientConfig`] and turns
//! them into the frozen init step table.

pub mod config;
pub mod subsystems;

pub use config::{
    AlertConfig, CacheConfig, ClientConfig, SchedulerConfig, SecurityConfig, StorageConfig,
};
pub use subsystems::ClientContainer;
