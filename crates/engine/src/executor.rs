//! Action execution.
//!
//! `ActionExecutor` runs a workflow's action list strictly sequentially:
//! 1. Honours the optional per-action delay.
//! 2. Dispatches the action through the injected [`ActionEffects`] seam via
//!    one exhaustive match (the fixed dispatch table).
//! 3. Records an [`ActionOutcome`] per completed action.
//! 4. Aborts on the first failure (fail-fast) and marks the execution
//!    `Failed`, keeping the outcomes gathered so far.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::effects::{ActionEffects, EffectError};
use crate::models::{
    Action, ActionOp, ActionOutcome, ExecutionStatus, TriggerPayload, Workflow, WorkflowExecution,
};

/// Runs a single workflow's actions against an effects sink.
///
/// Stateless apart from the sink handle; the registry bookkeeping
/// (`run_count`, `last_run`) belongs to [`crate::WorkflowEngine`].
pub struct ActionExecutor {
    effects: Arc<dyn ActionEffects>,
}

impl ActionExecutor {
    pub fn new(effects: Arc<dyn ActionEffects>) -> Self {
        Self { effects }
    }

    /// Execute all of `workflow`'s actions for the given payload and return
    /// the finished execution record (terminal status, never mutated again).
    #[instrument(skip(self, workflow, payload), fields(workflow_id = %workflow.id))]
    pub async fn run(&self, workflow: &Workflow, payload: &TriggerPayload) -> WorkflowExecution {
        let mut execution = WorkflowExecution::pending(
            workflow.id,
            serde_json::to_value(payload).unwrap_or(Value::Null),
        );
        execution.status = ExecutionStatus::Running;
        execution.started_at = Utc::now();

        for action in &workflow.actions {
            if let Some(delay_ms) = action.delay_ms {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self.apply(action, payload).await {
                Ok(()) => {
                    execution.results.push(outcome_for(action));
                    info!("action '{}' completed", action.op.kind());
                }
                Err(EffectError(msg)) => {
                    error!("action '{}' failed: {msg}", action.op.kind());
                    execution.status = ExecutionStatus::Failed;
                    execution.error = Some(msg);
                    execution.finished_at = Some(Utc::now());
                    return execution;
                }
            }
        }

        execution.status = ExecutionStatus::Completed;
        execution.finished_at = Some(Utc::now());
        execution
    }

    // The dispatch table: exhaustive over every action kind.
    async fn apply(&self, action: &Action, payload: &TriggerPayload) -> Result<(), EffectError> {
        let task_id = payload.task_id;

        match &action.op {
            ActionOp::CreateTask {
                content,
                priority,
                project_id,
                labels,
            } => {
                self.effects
                    .create_task(content, *priority, *project_id, labels)
                    .await
            }
            ActionOp::UpdateTask { content, description } => {
                self.effects
                    .update_task(task_id, content.as_deref(), description.as_deref())
                    .await
            }
            ActionOp::SendNotification { message } => self.effects.send_notification(message).await,
            ActionOp::AddLabel { label } => self.effects.add_label(task_id, label).await,
            ActionOp::RemoveLabel { label } => self.effects.remove_label(task_id, label).await,
            ActionOp::SetPriority { priority } => {
                self.effects.set_priority(task_id, *priority).await
            }
            ActionOp::SetDueDate { due_date, due_time } => {
                self.effects.set_due_date(task_id, *due_date, *due_time).await
            }
            ActionOp::MoveProject { project_id } => {
                self.effects.move_project(task_id, *project_id).await
            }
            ActionOp::CreateComment { text } => self.effects.create_comment(task_id, text).await,
            ActionOp::StartTimer => self.effects.start_timer(task_id).await,
            ActionOp::StopTimer => self.effects.stop_timer(task_id).await,
        }
    }
}

/// Build the result object for a completed action: its kind tag plus the
/// parameters it ran with.
fn outcome_for(action: &Action) -> ActionOutcome {
    let mut params = serde_json::to_value(&action.op).unwrap_or(Value::Null);
    if let Some(obj) = params.as_object_mut() {
        obj.remove("kind");
    }
    ActionOutcome {
        kind: action.op.kind().to_string(),
        params,
        completed_at: Utc::now(),
    }
}
