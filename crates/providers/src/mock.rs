//! `MockProvider` — a test double for `CalendarProvider`.
//!
//! Records every call it receives and returns scripted results, so sync
//! tests can assert exactly which provider operations were issued without
//! any network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Calendar, CalendarEvent, Credentials, EventPatch, SyncWindow};
use crate::{CalendarProvider, ProviderError};

/// One recorded provider invocation.
#[derive(Debug, Clone)]
pub enum ProviderCall {
    ListCalendars,
    FetchEvents { calendar_id: Uuid },
    CreateEvent { calendar_id: Uuid, event: CalendarEvent },
    UpdateEvent { calendar_id: Uuid, event_id: Uuid, patch: EventPatch },
}

/// Behaviour injected into `MockProvider` at construction time.
pub enum MockBehaviour {
    /// Serve the scripted calendars/events and accept all writes.
    Succeed,
    /// Fail every call with a `Request` error carrying this message.
    FailRequests(String),
}

/// A mock calendar backend.
pub struct MockProvider {
    pub behaviour: MockBehaviour,
    /// Calendars returned by `list_calendars`.
    pub calendars: Vec<Calendar>,
    /// Events returned by `fetch_events` (window filtering applied).
    pub events: Vec<CalendarEvent>,
    /// All invocations seen by this provider (in call order).
    pub calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockProvider {
    /// A provider that accepts everything and serves the given events.
    pub fn serving(events: Vec<CalendarEvent>) -> Self {
        Self {
            behaviour: MockBehaviour::Succeed,
            calendars: Vec::new(),
            events,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose every call fails with a `Request` error.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::FailRequests(msg.into()),
            calendars: Vec::new(),
            events: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Events passed to `create_event`, in call order.
    pub fn created_events(&self) -> Vec<CalendarEvent> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                ProviderCall::CreateEvent { event, .. } => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call);
        match &self.behaviour {
            MockBehaviour::Succeed => Ok(()),
            MockBehaviour::FailRequests(msg) => Err(ProviderError::Request(msg.clone())),
        }
    }
}

#[async_trait]
impl CalendarProvider for MockProvider {
    async fn list_calendars(
        &self,
        _credentials: &Credentials,
    ) -> Result<Vec<Calendar>, ProviderError> {
        self.record(ProviderCall::ListCalendars)?;
        Ok(self.calendars.clone())
    }

    async fn fetch_events(
        &self,
        calendar: &Calendar,
        window: &SyncWindow,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        self.record(ProviderCall::FetchEvents { calendar_id: calendar.id })?;
        Ok(self
            .events
            .iter()
            .filter(|e| e.calendar_id == calendar.id && window.contains(e.start))
            .cloned()
            .collect())
    }

    async fn create_event(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> Result<(), ProviderError> {
        self.record(ProviderCall::CreateEvent {
            calendar_id: calendar.id,
            event: event.clone(),
        })
    }

    async fn update_event(
        &self,
        calendar: &Calendar,
        event_id: Uuid,
        patch: &EventPatch,
    ) -> Result<(), ProviderError> {
        self.record(ProviderCall::UpdateEvent {
            calendar_id: calendar.id,
            event_id,
            patch: patch.clone(),
        })
    }
}
