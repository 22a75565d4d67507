//! The `CalendarProvider` trait — the contract every calendar backend fulfils.

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Calendar, CalendarEvent, Credentials, EventPatch, SyncWindow};
use crate::ProviderError;

/// Abstract calendar backend.
///
/// Implementations own all network I/O.  The sync engine calls through this
/// trait for every non-local calendar and treats failures as recoverable
/// per-item errors.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List the calendars reachable with the given credentials.
    async fn list_calendars(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Calendar>, ProviderError>;

    /// Fetch the events of `calendar` whose span intersects `window`.
    async fn fetch_events(
        &self,
        calendar: &Calendar,
        window: &SyncWindow,
    ) -> Result<Vec<CalendarEvent>, ProviderError>;

    /// Create a new event in `calendar`.
    async fn create_event(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> Result<(), ProviderError>;

    /// Apply a partial update to an existing event.
    async fn update_event(
        &self,
        calendar: &Calendar,
        event_id: Uuid,
        patch: &EventPatch,
    ) -> Result<(), ProviderError>;
}
