//! Conflict detection and bookkeeping.
//!
//! Conflicts are surfaced as data and nothing else: the engine never deletes
//! or silently merges. A resolution choice is recorded against a conflict by
//! an external decision-maker (UI or operator) and stays inert here.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use domain::Task;
use providers::CalendarEvent;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::sync::event_span_for;
use crate::SyncError;

// ---------------------------------------------------------------------------
// Conflict data
// ---------------------------------------------------------------------------

/// Classification of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// An event references a task id that no longer exists.
    EventTaskMismatch,
    /// The event's time span diverges from the task-derived span.
    TimeConflict,
    /// More than one event in a calendar references the same task.
    DuplicateEvent,
    /// Event and task disagree on data fields (title).
    DataConflict,
}

/// The manual choice an operator can attach to a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    KeepTask,
    KeepEvent,
    Ignore,
}

/// One detected conflict, carrying the offending event/task pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConflict {
    pub id: Uuid,
    pub kind: ConflictKind,
    pub event_id: Uuid,
    pub task_id: Option<Uuid>,
    pub description: String,
    /// Populated only by an external decision-maker; never auto-applied.
    #[serde(default)]
    pub resolution: Option<ConflictResolution>,
    pub detected_at: chrono::DateTime<Utc>,
}

impl SyncConflict {
    fn new(kind: ConflictKind, event_id: Uuid, task_id: Option<Uuid>, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            event_id,
            task_id,
            description,
            resolution: None,
            detected_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Classify the conflicts between `tasks` and the task-originated events in
/// `events`.  Pure: nothing is mutated, deleted, or merged.
pub fn detect_conflicts(tasks: &[Task], events: &[CalendarEvent]) -> Vec<SyncConflict> {
    let task_by_id: HashMap<Uuid, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut conflicts = Vec::new();

    // Duplicate events: more than one event per (calendar, task) pair.
    let mut per_task: HashMap<(Uuid, Uuid), Vec<&CalendarEvent>> = HashMap::new();
    for event in events {
        if let Some(task_id) = event.task_id {
            per_task
                .entry((event.calendar_id, task_id))
                .or_default()
                .push(event);
        }
    }
    for ((_, task_id), group) in &per_task {
        if group.len() > 1 {
            for event in &group[1..] {
                conflicts.push(SyncConflict::new(
                    ConflictKind::DuplicateEvent,
                    event.id,
                    Some(*task_id),
                    format!(
                        "{} events reference task {task_id} in the same calendar",
                        group.len()
                    ),
                ));
            }
        }
    }

    for event in events {
        let Some(task_id) = event.task_id else {
            continue;
        };

        let Some(task) = task_by_id.get(&task_id) else {
            conflicts.push(SyncConflict::new(
                ConflictKind::EventTaskMismatch,
                event.id,
                Some(task_id),
                format!("event '{}' references missing task {task_id}", event.title),
            ));
            continue;
        };

        if event.title != task.content {
            conflicts.push(SyncConflict::new(
                ConflictKind::DataConflict,
                event.id,
                Some(task_id),
                format!(
                    "event titled '{}' but task reads '{}'",
                    event.title, task.content
                ),
            ));
        }

        if let Some((start, end, _)) = event_span_for(task) {
            if event.start != start || event.end != end {
                conflicts.push(SyncConflict::new(
                    ConflictKind::TimeConflict,
                    event.id,
                    Some(task_id),
                    format!(
                        "event spans {}..{} but task implies {start}..{end}",
                        event.start, event.end
                    ),
                ));
            }
        }
    }

    conflicts
}

// ---------------------------------------------------------------------------
// ConflictResolver
// ---------------------------------------------------------------------------

/// Holds detected conflicts and the resolutions recorded against them.
#[derive(Default)]
pub struct ConflictResolver {
    conflicts: RwLock<Vec<SyncConflict>>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface newly detected conflicts.
    pub fn record(&self, detected: Vec<SyncConflict>) {
        if detected.is_empty() {
            return;
        }
        warn!("{} sync conflict(s) detected", detected.len());
        self.conflicts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .extend(detected);
    }

    /// Every conflict seen so far, resolved or not.
    pub fn all(&self) -> Vec<SyncConflict> {
        self.conflicts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Conflicts still awaiting a decision.
    pub fn unresolved(&self) -> Vec<SyncConflict> {
        self.conflicts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.resolution.is_none())
            .cloned()
            .collect()
    }

    /// Attach an external decision to a conflict.  The engine stores the
    /// choice as data; applying it is the caller's concern.
    pub fn set_resolution(
        &self,
        conflict_id: Uuid,
        resolution: ConflictResolution,
    ) -> Result<(), SyncError> {
        let mut conflicts = self.conflicts.write().unwrap_or_else(|e| e.into_inner());
        let slot = conflicts
            .iter_mut()
            .find(|c| c.id == conflict_id)
            .ok_or(SyncError::UnknownConflict(conflict_id))?;
        slot.resolution = Some(resolution);
        Ok(())
    }
}
