//! Domain Layer
//!
//! Pure identity logic, no I/O.

pub mod binding;
pub mod config;
pub mod fingerprint;

pub use binding::AnonymousBinding;
pub use config::{ExpiredSessionPolicy, IdentityConfig};
pub use fingerprint::{derive_fingerprint, DeviceAttributes, FINGERPRINT_DOMAIN};
