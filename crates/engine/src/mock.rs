//! `MockEffects` — a test double for `ActionEffects`.
//!
//! Records every effect call (as the action's kind tag) and can be scripted
//! to fail on a specific kind, which is how the fail-fast executor tests
//! inject a mid-list failure.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use domain::Priority;
use uuid::Uuid;

use crate::effects::{ActionEffects, EffectError};

/// A mock effects sink that records calls in order.
pub struct MockEffects {
    /// Kind tags of every effect invoked, in call order.
    pub calls: Arc<Mutex<Vec<String>>>,
    /// When set, any call whose kind matches fails with this message.
    fail_on: Option<(String, String)>,
}

impl MockEffects {
    /// A sink that records everything and always succeeds.
    pub fn recording() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// A sink that fails any call of the given kind with `msg`.
    pub fn failing_on(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: Some((kind.into(), msg.into())),
        }
    }

    /// Number of effect calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Kind tags recorded so far, in order.
    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str) -> Result<(), EffectError> {
        self.calls.lock().unwrap().push(kind.to_string());
        match &self.fail_on {
            Some((k, msg)) if k == kind => Err(EffectError(msg.clone())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ActionEffects for MockEffects {
    async fn create_task(
        &self,
        _content: &str,
        _priority: Option<Priority>,
        _project_id: Option<Uuid>,
        _labels: &[String],
    ) -> Result<(), EffectError> {
        self.record("create_task")
    }

    async fn update_task(
        &self,
        _task_id: Option<Uuid>,
        _content: Option<&str>,
        _description: Option<&str>,
    ) -> Result<(), EffectError> {
        self.record("update_task")
    }

    async fn send_notification(&self, _message: &str) -> Result<(), EffectError> {
        self.record("send_notification")
    }

    async fn add_label(&self, _task_id: Option<Uuid>, _label: &str) -> Result<(), EffectError> {
        self.record("add_label")
    }

    async fn remove_label(&self, _task_id: Option<Uuid>, _label: &str) -> Result<(), EffectError> {
        self.record("remove_label")
    }

    async fn set_priority(
        &self,
        _task_id: Option<Uuid>,
        _priority: Priority,
    ) -> Result<(), EffectError> {
        self.record("set_priority")
    }

    async fn set_due_date(
        &self,
        _task_id: Option<Uuid>,
        _due_date: NaiveDate,
        _due_time: Option<NaiveTime>,
    ) -> Result<(), EffectError> {
        self.record("set_due_date")
    }

    async fn move_project(
        &self,
        _task_id: Option<Uuid>,
        _project_id: Uuid,
    ) -> Result<(), EffectError> {
        self.record("move_project")
    }

    async fn create_comment(&self, _task_id: Option<Uuid>, _text: &str) -> Result<(), EffectError> {
        self.record("create_comment")
    }

    async fn start_timer(&self, _task_id: Option<Uuid>) -> Result<(), EffectError> {
        self.record("start_timer")
    }

    async fn stop_timer(&self, _task_id: Option<Uuid>) -> Result<(), EffectError> {
        self.record("stop_timer")
    }
}
