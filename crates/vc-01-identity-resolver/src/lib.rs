//! # Identity Resolver Subsystem
//!
//! Produces a stable identity for the client without ever minting a second
//! anonymous account for the same device.
//!
//! ## Fallback Chain
//!
//! | Layer | Source | Result |
//! |-------|--------|--------|
//! | 1 | Persisted, non-expired session | `Authenticated(token)` |
//! | 2 | Device fingerprint + backend binding | `Anonymous(fingerprint)` |
//! | 3 | Everything failed | `Unresolved` + alert |
//!
//! ## Architecture
//!
//! Hexagonal: pure `domain`, `ports` for the platform seams, the resolver
//! `service`, and `adapters` (file, in-memory, clock, backend).
//!
//! ## Usage
//!
//! ```ignore
//! let resolver = IdentityResolver::new(deps, router.clone(), IdentityConfig::default());
//! match resolver.resolve().await {
//!     IdentityState::Authenticated(_) => { /* ... */ }
//!     IdentityState::Anonymous(fp) => { /* ... */ }
//!     IdentityState::Unresolved => { /* alert already published */ }
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    derive_fingerprint, AnonymousBinding, DeviceAttributes, ExpiredSessionPolicy, IdentityConfig,
};
pub use error::{AttributeError, BackendError, MergeError, PromotionError, StoreError};
pub use ports::{
    BindingStore, Clock, DeviceAttributeSource, FailureLedger, IdentityApi, IdentityBackend,
    MergeCoordinator, SessionStore,
};
pub use service::{IdentityDependencies, IdentityResolver};
