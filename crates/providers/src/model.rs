//! Calendar and event data types shared by the sync engine and providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// CalendarSource
// ---------------------------------------------------------------------------

/// Where a calendar's data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSource {
    Google,
    Outlook,
    Local,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Opaque sync credentials.
///
/// The core never inspects these; they are stored on the calendar and handed
/// back to the provider verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials(pub serde_json::Value);

impl Credentials {
    /// Empty credentials, used for local calendars.
    pub fn none() -> Self {
        Self(serde_json::Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// A calendar the user has connected (or the built-in local one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub source: CalendarSource,
    pub is_primary: bool,
    pub is_writable: bool,
    /// IANA timezone name, e.g. `Europe/Berlin`.  Carried for providers;
    /// the core computes in UTC.
    pub timezone: String,
    pub credentials: Credentials,
    pub sync_enabled: bool,
}

impl Calendar {
    /// A writable local calendar with sane defaults.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: "#4073ff".into(),
            source: CalendarSource::Local,
            is_primary: false,
            is_writable: true,
            timezone: "UTC".into(),
            credentials: Credentials::none(),
            sync_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// CalendarEvent
// ---------------------------------------------------------------------------

/// A single calendar event.
///
/// An event with a `task_id` is task-originated: it was synthesized from a
/// task by the sync engine and is excluded from the reverse (event → task)
/// sync direction to avoid duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    /// Back-reference to the task this event was synthesized from.
    #[serde(default)]
    pub task_id: Option<Uuid>,
    pub calendar_id: Uuid,
    pub source: CalendarSource,
    /// iCalendar recurrence rule, e.g. `FREQ=Weekly;INTERVAL=2`.
    #[serde(default)]
    pub rrule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventPatch
// ---------------------------------------------------------------------------

/// Partial update applied to an existing event.  `None` fields are left
/// untouched by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub rrule: Option<String>,
}

// ---------------------------------------------------------------------------
// SyncWindow
// ---------------------------------------------------------------------------

/// The half-open time range a sync pass considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Symmetric window of `days` around `now`.
    pub fn around(now: DateTime<Utc>, days: i64) -> Self {
        let span = chrono::Duration::days(days);
        Self {
            start: now - span,
            end: now + span,
        }
    }

    /// Whether `instant` lies inside the window (inclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
