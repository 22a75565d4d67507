//! The calendar synchronization engine.
//!
//! `CalendarSyncEngine` reconciles tasks with calendar events inside a
//! symmetric time window around "now".  Local calendars persist into an
//! in-memory collection owned by the engine; non-local calendars are reached
//! exclusively through the injected [`CalendarProvider`] capability.
//!
//! Per-task failures are caught individually and reported in the result's
//! error list without aborting the batch.  The `success` flag turns false
//! only when the sync setup itself fails (an unresolvable calendar); this
//! asymmetry is part of the observable contract and is preserved on purpose.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use domain::Task;
use providers::{Calendar, CalendarEvent, CalendarProvider, CalendarSource, EventPatch, SyncWindow};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::conflict::{detect_conflicts, ConflictKind, ConflictResolver, SyncConflict};
use crate::rrule::rrule_from_pattern;
use crate::settings::SyncSettings;
use crate::SyncError;

// ---------------------------------------------------------------------------
// SyncResult
// ---------------------------------------------------------------------------

/// Summary of one sync pass.  Produced fresh per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub events_created: usize,
    pub events_updated: usize,
    pub events_deleted: usize,
    /// Task-creation opportunities counted during the reverse pass.  The
    /// engine only counts; creating the task is the task store's job.
    pub tasks_created: usize,
    pub conflicts: Vec<SyncConflict>,
    pub errors: Vec<String>,
    pub success: bool,
    pub synced_at: DateTime<Utc>,
}

impl SyncResult {
    fn empty(synced_at: DateTime<Utc>) -> Self {
        Self {
            events_created: 0,
            events_updated: 0,
            events_deleted: 0,
            tasks_created: 0,
            conflicts: Vec::new(),
            errors: Vec::new(),
            success: true,
            synced_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Event span derivation
// ---------------------------------------------------------------------------

/// Derive the event time span a task implies: `(start, end, all_day)`.
///
/// Start: the due time when the task has one; otherwise due-date midnight
/// minus the duration when a duration exists; otherwise 09:00 on the due
/// date.  End: start plus the duration, or plus 60 minutes.  The all-day
/// flag is set exactly when the task has no due time.
///
/// Returns `None` for tasks without a due date.
pub fn event_span_for(task: &Task) -> Option<(DateTime<Utc>, DateTime<Utc>, bool)> {
    let date = task.due_date?;
    let duration = task.duration_minutes.map(Duration::minutes);

    if let Some(time) = task.due_time {
        let start = date.and_time(time).and_utc();
        let end = start + duration.unwrap_or_else(|| Duration::minutes(60));
        return Some((start, end, false));
    }

    if let Some(span) = duration {
        // No due time: the task is due by end of `date`, so the event is
        // back-computed to finish at that boundary.
        let due = date.and_time(NaiveTime::MIN).and_utc();
        return Some((due - span, due, true));
    }

    let start = date.and_hms_opt(9, 0, 0)?.and_utc();
    Some((start, start + Duration::minutes(60), true))
}

// ---------------------------------------------------------------------------
// CalendarSyncEngine
// ---------------------------------------------------------------------------

/// The sync service.  Explicitly constructed; owns the calendar registry,
/// the local event collection, and the conflict ledger.
pub struct CalendarSyncEngine {
    calendars: RwLock<Vec<Calendar>>,
    /// Events of local calendars.  Append-or-replace only.
    events: RwLock<Vec<CalendarEvent>>,
    settings: RwLock<SyncSettings>,
    resolver: ConflictResolver,
    provider: Arc<dyn CalendarProvider>,
}

impl CalendarSyncEngine {
    pub fn new(provider: Arc<dyn CalendarProvider>, settings: SyncSettings) -> Self {
        Self {
            calendars: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
            settings: RwLock::new(settings),
            resolver: ConflictResolver::new(),
            provider,
        }
    }

    // -----------------------------------------------------------------------
    // Calendar registry
    // -----------------------------------------------------------------------

    /// Add a calendar.  At most one local calendar is primary: marking a new
    /// local calendar primary demotes any previous one.
    pub fn add_calendar(&self, calendar: Calendar) {
        let mut calendars = self.calendars.write().unwrap_or_else(|e| e.into_inner());
        if calendar.is_primary && calendar.source == CalendarSource::Local {
            for existing in calendars.iter_mut() {
                if existing.source == CalendarSource::Local && existing.is_primary {
                    let mut demoted = existing.clone();
                    demoted.is_primary = false;
                    *existing = demoted;
                }
            }
        }
        calendars.push(calendar);
    }

    pub fn calendars(&self) -> Vec<Calendar> {
        self.calendars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Seed or restore a local event (testing and import paths).
    pub fn add_event(&self, event: CalendarEvent) {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    /// Snapshot of the locally stored events.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn settings(&self) -> SyncSettings {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn update_settings(&self, settings: SyncSettings) {
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings;
    }

    /// Conflict ledger accessor.
    pub fn conflicts(&self) -> &ConflictResolver {
        &self.resolver
    }

    // -----------------------------------------------------------------------
    // Sync
    // -----------------------------------------------------------------------

    /// Reconcile `tasks` with the target calendar's events.
    ///
    /// The target is the explicit `calendar_id` when given, else the
    /// configured default, else the (primary) local calendar.  An
    /// unresolvable target is a configuration failure: the result comes back
    /// with `success = false` and nothing applied.
    #[instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub async fn sync(&self, tasks: &[Task], calendar_id: Option<Uuid>) -> SyncResult {
        let now = Utc::now();
        let mut result = SyncResult::empty(now);

        let settings = self.settings();
        let calendar = match self.resolve_calendar(calendar_id, &settings) {
            Ok(c) => c,
            Err(e) => {
                result.success = false;
                result.errors.push(e.to_string());
                return result;
            }
        };

        let window = SyncWindow::around(now, settings.window_days);
        let existing = match self.events_in_calendar(&calendar, &window).await {
            Ok(events) => events,
            Err(msg) => {
                // Integration failure: reported, batch skipped, success kept.
                result.errors.push(msg);
                return result;
            }
        };

        let in_scope: Vec<&Task> = tasks
            .iter()
            .filter(|t| self.in_window(t, &window))
            .filter(|t| settings.sync_completed_tasks || !t.completed)
            .collect();

        for task in &in_scope {
            if let Err(msg) = self
                .sync_task(task, &calendar, &settings, &existing, now, &mut result)
                .await
            {
                result.errors.push(msg);
            }
        }

        if settings.bidirectional {
            result.tasks_created = count_reverse_candidates(tasks, &existing);
        }

        let scoped: Vec<Task> = in_scope.into_iter().cloned().collect();
        let mut conflicts = detect_conflicts(&scoped, &existing);
        if settings.auto_update_events {
            // Data/time divergence was just reconciled; only structural
            // conflicts remain meaningful.
            conflicts.retain(|c| {
                matches!(
                    c.kind,
                    ConflictKind::DuplicateEvent | ConflictKind::EventTaskMismatch
                )
            });
        }
        result.conflicts = conflicts.clone();
        self.resolver.record(conflicts);

        info!(
            created = result.events_created,
            updated = result.events_updated,
            errors = result.errors.len(),
            "sync pass finished"
        );
        result
    }

    async fn sync_task(
        &self,
        task: &Task,
        calendar: &Calendar,
        settings: &SyncSettings,
        existing: &[CalendarEvent],
        now: DateTime<Utc>,
        result: &mut SyncResult,
    ) -> Result<(), String> {
        let Some((start, end, all_day)) = event_span_for(task) else {
            return Ok(());
        };

        let current = existing.iter().find(|e| e.task_id == Some(task.id));
        match current {
            Some(event) if settings.auto_update_events => {
                let mut updated = event.clone();
                updated.title = task.content.clone();
                updated.description = self.description_for(task, settings);
                updated.start = start;
                updated.end = end;
                updated.all_day = all_day;
                updated.rrule = task.recurrence.as_ref().map(rrule_from_pattern);
                updated.updated_at = now;

                if calendar.source == CalendarSource::Local {
                    self.replace_event(updated);
                } else {
                    let patch = EventPatch {
                        title: Some(task.content.clone()),
                        description: updated.description.clone(),
                        start: Some(start),
                        end: Some(end),
                        all_day: Some(all_day),
                        rrule: updated.rrule.clone(),
                    };
                    self.provider
                        .update_event(calendar, event.id, &patch)
                        .await
                        .map_err(|e| format!("task {}: {e}", task.id))?;
                }
                result.events_updated += 1;
            }
            Some(_) => {} // updates disabled; divergence surfaces as a conflict
            None if settings.auto_create_events => {
                let event = CalendarEvent {
                    id: Uuid::new_v4(),
                    title: task.content.clone(),
                    description: self.description_for(task, settings),
                    location: None,
                    start,
                    end,
                    all_day,
                    task_id: Some(task.id),
                    calendar_id: calendar.id,
                    source: calendar.source,
                    rrule: task.recurrence.as_ref().map(rrule_from_pattern),
                    created_at: now,
                    updated_at: now,
                };

                if calendar.source == CalendarSource::Local {
                    self.add_event(event);
                } else {
                    self.provider
                        .create_event(calendar, &event)
                        .await
                        .map_err(|e| format!("task {}: {e}", task.id))?;
                }
                result.events_created += 1;
            }
            None => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn resolve_calendar(
        &self,
        explicit: Option<Uuid>,
        settings: &SyncSettings,
    ) -> Result<Calendar, SyncError> {
        let calendars = self.calendars.read().unwrap_or_else(|e| e.into_inner());

        if let Some(id) = explicit.or(settings.default_calendar_id) {
            return calendars
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or(SyncError::UnknownCalendar(id));
        }

        calendars
            .iter()
            .filter(|c| c.source == CalendarSource::Local)
            .max_by_key(|c| c.is_primary)
            .cloned()
            .ok_or(SyncError::NoCalendar)
    }

    /// Events of the target calendar: the local snapshot, or a provider
    /// fetch bounded by the window.
    async fn events_in_calendar(
        &self,
        calendar: &Calendar,
        window: &SyncWindow,
    ) -> Result<Vec<CalendarEvent>, String> {
        if calendar.source == CalendarSource::Local {
            Ok(self
                .events
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .filter(|e| e.calendar_id == calendar.id)
                .cloned()
                .collect())
        } else {
            self.provider
                .fetch_events(calendar, window)
                .await
                .map_err(|e| format!("fetch from {:?}: {e}", calendar.source))
        }
    }

    fn in_window(&self, task: &Task, window: &SyncWindow) -> bool {
        match task.due_date {
            Some(date) => {
                date >= window.start.date_naive() && date <= window.end.date_naive()
            }
            None => false,
        }
    }

    fn description_for(&self, task: &Task, settings: &SyncSettings) -> Option<String> {
        let mut description = task.description.clone().unwrap_or_default();
        if settings.embed_metadata {
            if let Some(project_id) = task.project_id {
                description.push_str(&format!("\nProject: {project_id}"));
            }
            if !task.labels.is_empty() {
                description.push_str(&format!("\nLabels: {}", task.labels.join(", ")));
            }
        }
        if description.is_empty() {
            None
        } else {
            Some(description)
        }
    }

    /// Install the replacement event atomically (whole entity swap).
    fn replace_event(&self, updated: CalendarEvent) {
        let mut events = self.events.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = events.iter_mut().find(|e| e.id == updated.id) {
            *slot = updated;
        }
    }
}

/// Count calendar-sourced events (no `task_id`) that have no matching task:
/// same title and same due-date day.  These are task-creation opportunities
/// for the task store; the engine never creates the tasks itself.
fn count_reverse_candidates(tasks: &[Task], events: &[CalendarEvent]) -> usize {
    events
        .iter()
        .filter(|e| e.task_id.is_none())
        .filter(|e| {
            !tasks.iter().any(|t| {
                t.content == e.title && t.due_date == Some(e.start.date_naive())
            })
        })
        .count()
}
