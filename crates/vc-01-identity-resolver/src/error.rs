//! Error types for the Identity Resolver subsystem

use thiserror::Error;

/// Errors from the session and binding stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Corrupt record in {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("Store locked by another writer: {0}")]
    Locked(String),
}

/// Errors from the device attribute source
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("Device attribute source unavailable: {0}")]
    Unavailable(String),

    #[error("No stable device attribute present")]
    NoStableAttribute,
}

/// Errors from the identity backend
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),
}

/// Errors from the anonymous-to-authenticated merge collaborator
#[derive(Debug, Error)]
#[error("Identity merge failed: {0}")]
pub struct MergeError(pub String);

/// Errors from an explicit login promotion
#[derive(Debug, Error)]
pub enum PromotionError {
    #[error("Cannot promote with an expired session")]
    ExpiredSession,

    #[error("Failed to carry anonymous data over: {0}")]
    Merge(#[from] MergeError),

    #[error("Failed to persist session: {0}")]
    Store(#[from] StoreError),
}
