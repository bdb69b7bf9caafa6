//! # Contact Normalizer Subsystem
//!
//! Loads raw `(name, phone)` records from the platform contact store and
//! turns them into [`Contact`](shared_types::Contact) values.
//!
//! ## Rules
//!
//! - A record without a name (or with a blank one) is dropped.
//! - A record without a phone is dropped.
//! - The phone keeps ASCII digits and a single leading `+`; if no digit is
//!   left the record is dropped.
//! - Store order is preserved. Nothing is cached between calls.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): normalization, no I/O
//! - **Ports Layer** (`ports/`): `ContactApi` in, `ContactSource` out
//! - **Service Layer** (`service.rs`): `ContactNormalizer`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryContactSource, JsonContactSource};
pub use domain::{normalize_phone, ContactError, ContactStats, RawContact};
pub use ports::{ContactApi, ContactSource};
pub use service::ContactNormalizer;
