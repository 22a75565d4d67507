//! Sync-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Configuration errors raised before a sync pass touches any data.
///
/// Per-task provider failures are *not* represented here; they are caught
/// individually and reported as strings in the sync result's error list.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The explicitly requested or configured calendar id does not exist.
    #[error("calendar '{0}' not found")]
    UnknownCalendar(Uuid),

    /// No explicit id, no configured default, and no local calendar.
    #[error("no calendar available for sync")]
    NoCalendar,

    /// A resolution was recorded against an unknown conflict id.
    #[error("conflict '{0}' not found")]
    UnknownConflict(Uuid),
}
