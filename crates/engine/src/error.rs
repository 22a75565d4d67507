//! Engine-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::models::ConditionOperator;

/// Errors produced by the workflow engine (validation + registry).
///
/// These are configuration errors in the taxonomy sense: they fail the whole
/// operation before any state is mutated.  Action failures inside a run are
/// not errors at this level; they are captured in the execution record.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A condition pairs an operator with a value type it cannot compare.
    #[error("condition on '{field}': operator {operator:?} cannot be applied to a {value_type} value")]
    InvalidCondition {
        field: String,
        operator: ConditionOperator,
        value_type: &'static str,
    },

    /// An update/delete referenced a workflow id the registry doesn't hold.
    #[error("workflow '{0}' not found")]
    WorkflowNotFound(Uuid),
}
