//! The `ActionEffects` trait — the seam between declarative actions and the
//! task store that actually applies them.
//!
//! The executor owns the dispatch (one exhaustive match over [`crate::ActionOp`])
//! and calls exactly one of these methods per action.  The host wires in an
//! implementation backed by its task store; tests inject a recording fake.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use domain::Priority;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Failure of a single action's effect.
///
/// The executor turns this into a failed execution (fail-fast); it never
/// crashes the engine or affects other workflows.
#[derive(Debug, Error, Clone)]
#[error("action effect failed: {0}")]
pub struct EffectError(pub String);

/// The side-effect surface a workflow action can touch.
///
/// `task_id` is the task the triggering event concerned, when there was one;
/// effects that target "the current task" receive it explicitly.
#[async_trait]
pub trait ActionEffects: Send + Sync {
    async fn create_task(
        &self,
        content: &str,
        priority: Option<Priority>,
        project_id: Option<Uuid>,
        labels: &[String],
    ) -> Result<(), EffectError>;

    async fn update_task(
        &self,
        task_id: Option<Uuid>,
        content: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), EffectError>;

    async fn send_notification(&self, message: &str) -> Result<(), EffectError>;

    async fn add_label(&self, task_id: Option<Uuid>, label: &str) -> Result<(), EffectError>;

    async fn remove_label(&self, task_id: Option<Uuid>, label: &str) -> Result<(), EffectError>;

    async fn set_priority(
        &self,
        task_id: Option<Uuid>,
        priority: Priority,
    ) -> Result<(), EffectError>;

    async fn set_due_date(
        &self,
        task_id: Option<Uuid>,
        due_date: NaiveDate,
        due_time: Option<NaiveTime>,
    ) -> Result<(), EffectError>;

    async fn move_project(&self, task_id: Option<Uuid>, project_id: Uuid)
        -> Result<(), EffectError>;

    async fn create_comment(&self, task_id: Option<Uuid>, text: &str) -> Result<(), EffectError>;

    async fn start_timer(&self, task_id: Option<Uuid>) -> Result<(), EffectError>;

    async fn stop_timer(&self, task_id: Option<Uuid>) -> Result<(), EffectError>;
}

// ---------------------------------------------------------------------------
// NullEffects
// ---------------------------------------------------------------------------

/// An effects sink that logs each call and succeeds.  Used by the CLI demo
/// and anywhere a real task store is not wired in.
pub struct NullEffects;

#[async_trait]
impl ActionEffects for NullEffects {
    async fn create_task(
        &self,
        content: &str,
        _priority: Option<Priority>,
        _project_id: Option<Uuid>,
        _labels: &[String],
    ) -> Result<(), EffectError> {
        info!("create_task: {content}");
        Ok(())
    }

    async fn update_task(
        &self,
        task_id: Option<Uuid>,
        _content: Option<&str>,
        _description: Option<&str>,
    ) -> Result<(), EffectError> {
        info!("update_task: {task_id:?}");
        Ok(())
    }

    async fn send_notification(&self, message: &str) -> Result<(), EffectError> {
        info!("send_notification: {message}");
        Ok(())
    }

    async fn add_label(&self, task_id: Option<Uuid>, label: &str) -> Result<(), EffectError> {
        info!("add_label '{label}' to {task_id:?}");
        Ok(())
    }

    async fn remove_label(&self, task_id: Option<Uuid>, label: &str) -> Result<(), EffectError> {
        info!("remove_label '{label}' from {task_id:?}");
        Ok(())
    }

    async fn set_priority(
        &self,
        task_id: Option<Uuid>,
        priority: Priority,
    ) -> Result<(), EffectError> {
        info!("set_priority {priority:?} on {task_id:?}");
        Ok(())
    }

    async fn set_due_date(
        &self,
        task_id: Option<Uuid>,
        due_date: NaiveDate,
        _due_time: Option<NaiveTime>,
    ) -> Result<(), EffectError> {
        info!("set_due_date {due_date} on {task_id:?}");
        Ok(())
    }

    async fn move_project(
        &self,
        task_id: Option<Uuid>,
        project_id: Uuid,
    ) -> Result<(), EffectError> {
        info!("move_project {task_id:?} -> {project_id}");
        Ok(())
    }

    async fn create_comment(&self, task_id: Option<Uuid>, text: &str) -> Result<(), EffectError> {
        info!("create_comment on {task_id:?}: {text}");
        Ok(())
    }

    async fn start_timer(&self, task_id: Option<Uuid>) -> Result<(), EffectError> {
        info!("start_timer on {task_id:?}");
        Ok(())
    }

    async fn stop_timer(&self, task_id: Option<Uuid>) -> Result<(), EffectError> {
        info!("stop_timer on {task_id:?}");
        Ok(())
    }
}
