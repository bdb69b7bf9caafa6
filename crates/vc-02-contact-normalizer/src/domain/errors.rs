//! Contact loading errors

use thiserror::Error;

/// Errors from loading contacts.
///
/// Individual malformed records are never errors; they are skipped. Only a
/// failure of the contact store itself is reported.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Contact store unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Contact store permission denied")]
    PermissionDenied,

    #[error("Malformed contact export {path}: {message}")]
    MalformedExport { path: String, message: String },
}
