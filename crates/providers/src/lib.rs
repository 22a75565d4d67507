//! `providers` crate — the `CalendarProvider` trait and calendar data types.
//!
//! Concrete network clients (Google, Outlook) implement [`CalendarProvider`]
//! outside this workspace.  The sync engine dispatches through the trait
//! object and never talks to a network directly.
//!
//! Calendar/event types live here (rather than in `calsync`) so both the
//! sync engine and provider implementations can import them without a
//! circular dependency.

pub mod error;
pub mod mock;
pub mod model;
pub mod traits;

pub use error::ProviderError;
pub use model::{Calendar, CalendarEvent, CalendarSource, Credentials, EventPatch, SyncWindow};
pub use traits::CalendarProvider;
