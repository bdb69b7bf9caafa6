//! Domain Layer
//!
//! Pure sanitizing logic, no I/O.

pub mod entities;
pub mod errors;
pub mod normalize;

pub use entities::{ContactStats, RawContact};
pub use errors::ContactError;
pub use normalize::{normalize_phone, sanitize, Rejection};
