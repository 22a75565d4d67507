//! `WorkflowEngine` — the explicitly constructed service owning the workflow
//! registry, the executor, and the execution log.
//!
//! There is no global instance: the host constructs one engine, shares it by
//! `Arc`, and shuts it down by dropping it (the scheduler's lifecycle is
//! separate, see [`crate::Scheduler`]).
//!
//! Registry mutations install whole replacement entities under a write lock,
//! so concurrent readers observe either the pre- or post-mutation snapshot,
//! never a half-written workflow.  Two overlapping dispatches of the same
//! workflow are deliberately not serialized (at-least-once, non-exclusive).

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::effects::ActionEffects;
use crate::executor::ActionExecutor;
use crate::log::ExecutionLog;
use crate::matcher::{matching_workflows, validate_workflow};
use crate::models::{TriggerPayload, Workflow, WorkflowExecution};
use crate::EngineError;

pub struct WorkflowEngine {
    workflows: RwLock<Vec<Workflow>>,
    executor: ActionExecutor,
    log: ExecutionLog,
}

impl WorkflowEngine {
    pub fn new(effects: Arc<dyn ActionEffects>) -> Self {
        Self {
            workflows: RwLock::new(Vec::new()),
            executor: ActionExecutor::new(effects),
            log: ExecutionLog::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Registration API
    // -----------------------------------------------------------------------

    /// Register a new workflow.
    ///
    /// # Errors
    /// [`EngineError::InvalidCondition`] if any trigger condition pairs an
    /// operator with an incompatible value type; nothing is registered then.
    pub fn register(&self, workflow: Workflow) -> Result<(), EngineError> {
        validate_workflow(&workflow)?;
        info!("registering workflow '{}' ({})", workflow.name, workflow.id);
        self.write_registry().push(workflow);
        Ok(())
    }

    /// Replace an existing workflow wholesale (matched by id).
    pub fn update(&self, workflow: Workflow) -> Result<(), EngineError> {
        validate_workflow(&workflow)?;
        let mut registry = self.write_registry();
        let slot = registry
            .iter_mut()
            .find(|w| w.id == workflow.id)
            .ok_or(EngineError::WorkflowNotFound(workflow.id))?;
        *slot = workflow;
        Ok(())
    }

    /// Delete a workflow by id.
    pub fn remove(&self, id: Uuid) -> Result<(), EngineError> {
        let mut registry = self.write_registry();
        let before = registry.len();
        registry.retain(|w| w.id != id);
        if registry.len() == before {
            return Err(EngineError::WorkflowNotFound(id));
        }
        Ok(())
    }

    /// Snapshot of every registered workflow, in registration order.
    pub fn workflows(&self) -> Vec<Workflow> {
        self.read_registry().clone()
    }

    /// Fetch one workflow by id.
    pub fn workflow(&self, id: Uuid) -> Option<Workflow> {
        self.read_registry().iter().find(|w| w.id == id).cloned()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Match `payload` against the registry and execute every match in
    /// registration order.  Returns the ids of the executions appended to
    /// the log (empty when nothing matched).
    #[instrument(skip(self, payload), fields(kind = ?payload.kind))]
    pub async fn dispatch(&self, payload: &TriggerPayload) -> Vec<Uuid> {
        // Snapshot the matches so no lock is held across an await point.
        let matched: Vec<Workflow> = {
            let registry = self.read_registry();
            matching_workflows(&registry, payload)
                .into_iter()
                .cloned()
                .collect()
        };

        if matched.is_empty() {
            return Vec::new();
        }
        info!("{} workflow(s) matched", matched.len());

        let mut execution_ids = Vec::with_capacity(matched.len());
        for workflow in &matched {
            let execution = self.executor.run(workflow, payload).await;
            if execution.status == crate::models::ExecutionStatus::Completed {
                self.mark_ran(workflow.id);
            }
            execution_ids.push(execution.id);
            self.log.append(execution);
        }
        execution_ids
    }

    /// Bump `run_count`/`last_run` exactly once, after a fully successful
    /// execution.  The replacement entity is built before being installed.
    fn mark_ran(&self, workflow_id: Uuid) {
        let mut registry = self.write_registry();
        if let Some(slot) = registry.iter_mut().find(|w| w.id == workflow_id) {
            let mut updated = slot.clone();
            updated.run_count += 1;
            updated.last_run = Some(Utc::now());
            *slot = updated;
        }
    }

    // -----------------------------------------------------------------------
    // Execution log access
    // -----------------------------------------------------------------------

    /// All executions of one workflow, oldest first.
    pub fn executions_for(&self, workflow_id: Uuid) -> Vec<WorkflowExecution> {
        self.log.for_workflow(workflow_id)
    }

    /// The most recent `n` executions across all workflows, newest first.
    pub fn recent_executions(&self, n: usize) -> Vec<WorkflowExecution> {
        self.log.recent(n)
    }

    /// Total executions recorded since construction.
    pub fn execution_count(&self) -> usize {
        self.log.len()
    }

    // Lock poisoning cannot leave a half-written entity (entities are
    // installed whole), so a poisoned lock is still safe to read through.
    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, Vec<Workflow>> {
        self.workflows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_registry(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Workflow>> {
        self.workflows.write().unwrap_or_else(|e| e.into_inner())
    }
}
