//! Append-only execution log.
//!
//! Unbounded by design: the current behaviour accepts unbounded growth and
//! specifies no eviction.  Readers always observe whole records, never a
//! partially written one.

use std::sync::RwLock;

use uuid::Uuid;

use crate::models::WorkflowExecution;

/// Ordered, append-only record of workflow executions.
#[derive(Default)]
pub struct ExecutionLog {
    entries: RwLock<Vec<WorkflowExecution>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished execution.  Records are never mutated afterwards.
    pub fn append(&self, execution: WorkflowExecution) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(execution);
    }

    /// All executions of one workflow, oldest first.
    pub fn for_workflow(&self, workflow_id: Uuid) -> Vec<WorkflowExecution> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.workflow_id == workflow_id)
            .cloned()
            .collect()
    }

    /// The most recent `n` executions, newest first.
    pub fn recent(&self, n: usize) -> Vec<WorkflowExecution> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().take(n).cloned().collect()
    }

    /// Total number of executions recorded.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
