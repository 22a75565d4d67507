//! `domain` crate — task-manager boundary types consumed by the engines.
//!
//! The task store itself (CRUD, persistence) lives outside this workspace.
//! These types describe the shape of the data it hands us; they carry no
//! behaviour beyond a few read-only helpers.

pub mod task;

pub use task::{Priority, RecurrencePattern, RecurrenceType, Task};
