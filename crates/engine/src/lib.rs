//! `engine` crate — workflow rule model, trigger matching, action execution,
//! the tick scheduler, and the append-only execution log.

pub mod effects;
pub mod error;
pub mod executor;
pub mod log;
pub mod matcher;
pub mod mock;
pub mod models;
pub mod scheduler;
pub mod service;

pub use effects::{ActionEffects, EffectError, NullEffects};
pub use error::EngineError;
pub use executor::ActionExecutor;
pub use log::ExecutionLog;
pub use matcher::{matching_workflows, validate_workflow};
pub use models::{
    Action, ActionOp, ActionOutcome, Condition, ConditionOperator, ExecutionStatus, FieldValue,
    Trigger, TriggerKind, TriggerPayload, Workflow, WorkflowExecution,
};
pub use scheduler::Scheduler;
pub use service::WorkflowEngine;

#[cfg(test)]
mod engine_tests;
