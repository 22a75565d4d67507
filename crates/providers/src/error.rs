//! Provider-level error type.

use thiserror::Error;

/// Errors returned by a `CalendarProvider` implementation.
///
/// The sync engine treats every variant as a recoverable per-item failure:
/// the error message is appended to the sync result and the remaining items
/// are still processed.
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    /// The provider's backend could not be reached or returned a failure.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The stored credentials were rejected.
    #[error("provider rejected credentials: {0}")]
    Auth(String),

    /// The referenced remote calendar or event does not exist.
    #[error("remote object not found: {0}")]
    NotFound(String),
}
