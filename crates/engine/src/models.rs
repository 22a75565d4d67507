//! Core domain models for the workflow engine.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory.  They serialise to/from JSON, which is also the registration
//! format accepted by the CLI's `validate` command.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::{Priority, Task};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TriggerKind
// ---------------------------------------------------------------------------

/// The event class a trigger listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    TaskCreated,
    TaskCompleted,
    TaskDue,
    TaskOverdue,
    TimeBased,
    LabelAdded,
    ProjectChanged,
    PriorityChanged,
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A typed value carried by a payload field or a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    TextSet(BTreeSet<String>),
    /// A duration in minutes; only meaningful as the operand of `within`.
    Minutes(i64),
}

impl FieldValue {
    /// Human-readable type name used in configuration error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::TextSet(_) => "text_set",
            Self::Minutes(_) => "minutes",
        }
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Comparison applied to one payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    Before,
    After,
    Within,
}

/// One condition of a trigger.  All of a trigger's conditions are ANDed.
///
/// The operator/value pairing is validated when the workflow is registered;
/// an incompatible pairing is a configuration error and never reaches the
/// matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Payload field the condition reads, e.g. `priority` or `labels`.
    pub field: String,
    pub operator: ConditionOperator,
    pub value: FieldValue,
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// What starts a workflow: an event kind plus zero or more conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Gates whether this trigger participates in matching at all.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The effect a single action performs, with its strongly-typed parameters.
///
/// Actions are data, never code: the executor interprets each variant
/// through an exhaustive match, so an unknown kind cannot exist past
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOp {
    CreateTask {
        content: String,
        #[serde(default)]
        priority: Option<Priority>,
        #[serde(default)]
        project_id: Option<Uuid>,
        #[serde(default)]
        labels: Vec<String>,
    },
    UpdateTask {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    SendNotification {
        message: String,
    },
    AddLabel {
        label: String,
    },
    RemoveLabel {
        label: String,
    },
    SetPriority {
        priority: Priority,
    },
    SetDueDate {
        due_date: NaiveDate,
        #[serde(default)]
        due_time: Option<NaiveTime>,
    },
    MoveProject {
        project_id: Uuid,
    },
    CreateComment {
        text: String,
    },
    StartTimer,
    StopTimer,
}

impl ActionOp {
    /// The snake_case kind tag, as used in outcome records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTask { .. } => "create_task",
            Self::UpdateTask { .. } => "update_task",
            Self::SendNotification { .. } => "send_notification",
            Self::AddLabel { .. } => "add_label",
            Self::RemoveLabel { .. } => "remove_label",
            Self::SetPriority { .. } => "set_priority",
            Self::SetDueDate { .. } => "set_due_date",
            Self::MoveProject { .. } => "move_project",
            Self::CreateComment { .. } => "create_comment",
            Self::StartTimer => "start_timer",
            Self::StopTimer => "stop_timer",
        }
    }
}

/// One step of a workflow's ordered action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub op: ActionOp,
    /// Optional pause before the action runs, in milliseconds.
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl Action {
    pub fn new(op: ActionOp) -> Self {
        Self { op, delay_ms: None }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A complete workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub run_count: u64,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Convenience constructor used by tests and the CLI.
    pub fn new(name: impl Into<String>, trigger: Trigger, actions: Vec<Action>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            trigger,
            actions,
            is_active: true,
            run_count: 0,
            last_run: None,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerPayload
// ---------------------------------------------------------------------------

/// The context an external event carries into the matcher.
///
/// `fields` maps condition field names to typed values; a condition on a
/// field the payload does not carry evaluates to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerPayload {
    pub kind: TriggerKind,
    /// The task the event concerns, when there is one.
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    pub occurred_at: DateTime<Utc>,
}

impl TriggerPayload {
    /// Synthetic payload for a scheduler tick.
    pub fn time_based(now: DateTime<Utc>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("now".into(), FieldValue::Date(now));
        Self {
            kind: TriggerKind::TimeBased,
            task_id: None,
            fields,
            occurred_at: now,
        }
    }

    /// Payload describing a task event, with the standard task fields
    /// exposed to conditions.
    pub fn for_task(kind: TriggerKind, task: &Task, now: DateTime<Utc>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("content".into(), FieldValue::Text(task.content.clone()));
        fields.insert(
            "priority".into(),
            FieldValue::Number(f64::from(task.priority.rank())),
        );
        fields.insert(
            "labels".into(),
            FieldValue::TextSet(task.labels.iter().cloned().collect()),
        );
        if let Some(project_id) = task.project_id {
            fields.insert("project_id".into(), FieldValue::Text(project_id.to_string()));
        }
        if let Some(date) = task.due_date {
            let time = task
                .due_time
                .or_else(|| NaiveTime::from_hms_opt(9, 0, 0))
                .unwrap_or(NaiveTime::MIN);
            fields.insert("due_date".into(), FieldValue::Date(date.and_time(time).and_utc()));
        }
        Self {
            kind,
            task_id: Some(task.id),
            fields,
            occurred_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowExecution
// ---------------------------------------------------------------------------

/// Lifecycle of a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one completed action, tagged with its kind and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub kind: String,
    /// The action's parameters as they were executed.
    pub params: serde_json::Value,
    pub completed_at: DateTime<Utc>,
}

/// One run of a workflow.  Append-only once it reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Opaque snapshot of the payload that triggered the run.
    pub trigger: serde_json::Value,
    pub status: ExecutionStatus,
    /// Outcomes of the actions that completed, in order.
    pub results: Vec<ActionOutcome>,
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowExecution {
    /// Fresh record for a run that has been admitted but not yet started.
    pub fn pending(workflow_id: Uuid, trigger: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            trigger,
            status: ExecutionStatus::Pending,
            results: Vec::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}
