//! Service Layer

mod resolver;

pub use resolver::{IdentityDependencies, IdentityResolver};
