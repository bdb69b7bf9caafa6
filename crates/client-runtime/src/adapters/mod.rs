//! # Runtime Adapters
//!
//! Platform-facing implementations of subsystem outbound ports.

pub mod install_id;

pub use install_id::{InstallIdAttributes, INSTALL_ID_FILE};
