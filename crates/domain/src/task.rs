//! Task input types.
//!
//! A `Task` is consumed, never owned: the external task store is the source
//! of truth and the engines only read these fields.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Task priority, p1 (highest) through p4 (lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    /// Numeric rank, 1 (highest) through 4.
    pub fn rank(self) -> u8 {
        match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
            Self::P4 => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A repeating schedule attached to a task.
///
/// `days_of_week` uses zero-based indices with Sunday = 0, matching the
/// SU..SA ordering of iCalendar weekday codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    #[serde(rename = "type")]
    pub kind: RecurrenceType,
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A task as handed to us by the external task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Calendar day the task is due, if any.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Time of day on `due_date`, when the task is due at a specific time.
    #[serde(default)]
    pub due_time: Option<NaiveTime>,
    /// Estimated duration in minutes.
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub recurrence: Option<RecurrencePattern>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Minimal constructor used by tests and demos.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            description: None,
            due_date: None,
            due_time: None,
            duration_minutes: None,
            priority: Priority::P4,
            labels: Vec::new(),
            project_id: None,
            recurrence: None,
            completed: false,
            completed_at: None,
        }
    }
}
