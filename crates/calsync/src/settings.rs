//! Sync configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-facing knobs of the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Also walk calendar-sourced events back towards the task store.
    pub bidirectional: bool,
    /// Keep completed tasks in the sync scope.
    pub sync_completed_tasks: bool,
    /// Window half-width in days, applied symmetrically past and future.
    pub window_days: i64,
    /// Calendar used when `sync` is called without an explicit id.
    pub default_calendar_id: Option<Uuid>,
    /// Synthesize events for tasks that have none yet.
    pub auto_create_events: bool,
    /// Update task-originated events in place when the task changed.
    pub auto_update_events: bool,
    /// Poll cadence for timed syncs, in minutes.
    pub poll_interval_minutes: u32,
    /// Append project/label lines to generated event descriptions.
    pub embed_metadata: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            bidirectional: false,
            sync_completed_tasks: false,
            window_days: 7,
            default_calendar_id: None,
            auto_create_events: true,
            auto_update_events: true,
            poll_interval_minutes: 15,
            embed_metadata: false,
        }
    }
}
