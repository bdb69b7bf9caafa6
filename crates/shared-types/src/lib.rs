//! # Shared Types Crate
//!
//! This crate contains the domain entities, the init-step contract and the
//! error taxonomy shared by every client crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Frozen Configuration**: The `SubsystemRegistry` is built once and never
//!   mutated afterwards.
//! - **Forward-only Identity**: `IdentityState` transitions never downgrade.

pub mod entities;
pub mod errors;
pub mod subsystem_registry;
pub mod subsystem_trait;

pub use entities::*;
pub use errors::*;
pub use subsystem_registry::{SubsystemRegistry, SubsystemRegistryBuilder};
pub use subsystem_trait::{Criticality, FnAction, InitAction, InitStep};
