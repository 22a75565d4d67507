//! `calsync` crate — the calendar synchronization engine.
//!
//! Reconciles tasks with calendar events inside a sliding window, detects
//! conflicts without auto-resolving them, translates recurrence patterns to
//! RRULE strings, and exports events as iCalendar documents.

pub mod conflict;
pub mod error;
pub mod ics;
pub mod rrule;
pub mod settings;
pub mod sync;

pub use conflict::{ConflictKind, ConflictResolution, ConflictResolver, SyncConflict};
pub use error::SyncError;
pub use ics::export_ics;
pub use rrule::rrule_from_pattern;
pub use settings::SyncSettings;
pub use sync::{CalendarSyncEngine, SyncResult};
