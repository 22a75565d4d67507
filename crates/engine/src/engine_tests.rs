//! Integration tests for the workflow engine.
//!
//! These tests wire the real matcher, executor, registry, and scheduler
//! together with `MockEffects`, so no external task store is required.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use uuid::Uuid;

use crate::mock::MockEffects;
use crate::models::{
    Action, ActionOp, ExecutionStatus, Trigger, TriggerKind, TriggerPayload, WorkflowExecution,
};
use crate::{Scheduler, Workflow, WorkflowEngine};

fn notify(message: &str) -> Action {
    Action::new(ActionOp::SendNotification {
        message: message.into(),
    })
}

fn workflow(kind: TriggerKind, actions: Vec<Action>) -> Workflow {
    Workflow::new(
        "test",
        Trigger {
            kind,
            conditions: vec![],
            is_active: true,
        },
        actions,
    )
}

fn engine_with(effects: Arc<MockEffects>) -> Arc<WorkflowEngine> {
    Arc::new(WorkflowEngine::new(effects))
}

// ============================================================
// Executor: fail-fast policy
// ============================================================

#[tokio::test]
async fn failing_action_aborts_remaining_actions() {
    let effects = Arc::new(MockEffects::failing_on("add_label", "label service down"));
    let engine = engine_with(effects.clone());

    let wf = workflow(
        TriggerKind::TaskCreated,
        vec![
            notify("first"),
            Action::new(ActionOp::AddLabel { label: "x".into() }),
            notify("never sent"),
        ],
    );
    let wf_id = wf.id;
    engine.register(wf).expect("valid workflow");

    let payload = TriggerPayload {
        kind: TriggerKind::TaskCreated,
        task_id: None,
        fields: Default::default(),
        occurred_at: Utc::now(),
    };
    engine.dispatch(&payload).await;

    let executions = engine.executions_for(wf_id);
    assert_eq!(executions.len(), 1);
    let exec = &executions[0];

    assert_eq!(exec.status, ExecutionStatus::Failed);
    assert_eq!(exec.error.as_deref(), Some("label service down"));
    // Only the first action's outcome is retained.
    assert_eq!(exec.results.len(), 1);
    assert_eq!(exec.results[0].kind, "send_notification");
    // The third action was never dispatched.
    assert_eq!(effects.recorded(), vec!["send_notification", "add_label"]);
    assert!(exec.finished_at.is_some());
}

#[tokio::test]
async fn run_count_increments_only_on_full_success() {
    let effects = Arc::new(MockEffects::recording());
    let engine = engine_with(effects);

    let ok = workflow(TriggerKind::TaskCompleted, vec![notify("done")]);
    let ok_id = ok.id;
    engine.register(ok).expect("valid workflow");

    let failing_effects = Arc::new(MockEffects::failing_on("send_notification", "boom"));
    let failing_engine = engine_with(failing_effects);
    let bad = workflow(TriggerKind::TaskCompleted, vec![notify("boom")]);
    let bad_id = bad.id;
    failing_engine.register(bad).expect("valid workflow");

    let payload = TriggerPayload {
        kind: TriggerKind::TaskCompleted,
        task_id: None,
        fields: Default::default(),
        occurred_at: Utc::now(),
    };

    engine.dispatch(&payload).await;
    engine.dispatch(&payload).await;
    failing_engine.dispatch(&payload).await;

    let ok_wf = engine.workflow(ok_id).expect("still registered");
    assert_eq!(ok_wf.run_count, 2);
    assert!(ok_wf.last_run.is_some());

    let bad_wf = failing_engine.workflow(bad_id).expect("still registered");
    assert_eq!(bad_wf.run_count, 0);
    assert!(bad_wf.last_run.is_none());
}

#[tokio::test]
async fn action_delay_is_honoured() {
    let effects = Arc::new(MockEffects::recording());
    let engine = engine_with(effects.clone());

    let mut delayed = notify("later");
    delayed.delay_ms = Some(50);
    let wf = workflow(TriggerKind::TaskCreated, vec![delayed]);
    engine.register(wf).expect("valid workflow");

    let payload = TriggerPayload {
        kind: TriggerKind::TaskCreated,
        task_id: None,
        fields: Default::default(),
        occurred_at: Utc::now(),
    };

    let before = std::time::Instant::now();
    engine.dispatch(&payload).await;
    assert!(before.elapsed() >= Duration::from_millis(50));
    assert_eq!(effects.call_count(), 1);
}

#[test]
fn executions_are_admitted_pending_before_any_action_runs() {
    let exec = WorkflowExecution::pending(Uuid::new_v4(), serde_json::Value::Null);
    assert_eq!(exec.status, ExecutionStatus::Pending);
    assert!(exec.results.is_empty());
    assert!(exec.error.is_none());
    assert!(exec.finished_at.is_none());
}

// ============================================================
// Dispatch + registry
// ============================================================

#[tokio::test]
async fn dispatch_skips_non_matching_kinds() {
    let effects = Arc::new(MockEffects::recording());
    let engine = engine_with(effects.clone());
    engine
        .register(workflow(TriggerKind::TaskDue, vec![notify("due")]))
        .expect("valid workflow");

    let payload = TriggerPayload {
        kind: TriggerKind::TaskCreated,
        task_id: None,
        fields: Default::default(),
        occurred_at: Utc::now(),
    };
    let ids = engine.dispatch(&payload).await;

    assert!(ids.is_empty());
    assert_eq!(engine.execution_count(), 0);
    assert_eq!(effects.call_count(), 0);
}

#[tokio::test]
async fn update_and_remove_require_known_ids() {
    let engine = engine_with(Arc::new(MockEffects::recording()));
    let ghost = workflow(TriggerKind::TaskCreated, vec![]);

    assert!(matches!(
        engine.update(ghost.clone()),
        Err(crate::EngineError::WorkflowNotFound(id)) if id == ghost.id
    ));
    assert!(engine.remove(ghost.id).is_err());

    engine.register(ghost.clone()).expect("valid workflow");
    let mut renamed = ghost.clone();
    renamed.name = "renamed".into();
    engine.update(renamed).expect("update succeeds");
    assert_eq!(engine.workflow(ghost.id).unwrap().name, "renamed");
    engine.remove(ghost.id).expect("remove succeeds");
    assert!(engine.workflows().is_empty());
}

/// Two overlapping dispatches of the same workflow are not serialized; the
/// contract is only that the log stays well-formed (whole records, correct
/// count), not that runs are mutually exclusive.
#[tokio::test]
async fn concurrent_dispatches_do_not_corrupt_the_log() {
    let effects = Arc::new(MockEffects::recording());
    let engine = engine_with(effects);
    let wf = workflow(TriggerKind::TaskCreated, vec![notify("hi")]);
    let wf_id = wf.id;
    engine.register(wf).expect("valid workflow");

    let payload = TriggerPayload {
        kind: TriggerKind::TaskCreated,
        task_id: None,
        fields: Default::default(),
        occurred_at: Utc::now(),
    };

    let (a, b) = tokio::join!(engine.dispatch(&payload), engine.dispatch(&payload));
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);

    let executions = engine.executions_for(wf_id);
    assert_eq!(executions.len(), 2);
    for exec in &executions {
        assert_eq!(exec.status, ExecutionStatus::Completed);
        assert_eq!(exec.results.len(), 1);
        assert!(exec.finished_at.is_some());
    }
}

// ============================================================
// Scheduler
// ============================================================

const TICK: Duration = Duration::from_secs(60);

async fn settle() {
    // Give the spawned tick task a chance to run to completion.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn tick_executes_time_based_workflows() {
    let engine = engine_with(Arc::new(MockEffects::recording()));
    engine
        .register(workflow(TriggerKind::TimeBased, vec![notify("tick")]))
        .expect("valid workflow");

    let scheduler = Scheduler::new(Arc::clone(&engine), TICK);
    scheduler.start();
    assert!(scheduler.is_running());

    tokio::time::sleep(TICK + Duration::from_secs(1)).await;
    settle().await;

    assert_eq!(engine.execution_count(), 1);
    scheduler.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_future_ticks() {
    let engine = engine_with(Arc::new(MockEffects::recording()));
    engine
        .register(workflow(TriggerKind::TimeBased, vec![notify("tick")]))
        .expect("valid workflow");

    let scheduler = Scheduler::new(Arc::clone(&engine), TICK);
    scheduler.start();
    tokio::time::sleep(TICK + Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(engine.execution_count(), 1);

    scheduler.stop();
    assert!(!scheduler.is_running());
    // Stopping twice is safe.
    scheduler.stop();

    tokio::time::sleep(TICK * 3).await;
    settle().await;
    // Missed occurrences are lost, not queued: no executions after stop.
    assert_eq!(engine.execution_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_lets_the_in_flight_execution_finish() {
    let effects = Arc::new(MockEffects::recording());
    let engine = engine_with(effects.clone());

    let mut late = notify("late");
    late.delay_ms = Some(5_000);
    let wf = workflow(TriggerKind::TimeBased, vec![notify("early"), late]);
    let wf_id = wf.id;
    engine.register(wf).expect("valid workflow");

    let scheduler = Scheduler::new(Arc::clone(&engine), TICK);
    scheduler.start();

    // Let one tick fire: the first action runs, the second is still in its
    // delay and the execution has not reached the log yet.
    tokio::time::sleep(TICK + Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(effects.call_count(), 1);
    assert_eq!(engine.execution_count(), 0);

    scheduler.stop();
    assert!(!scheduler.is_running());

    // Stopping mid-run must not cut the execution short: the delayed action
    // still fires and the finished record is logged.
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(effects.call_count(), 2);

    let executions = engine.executions_for(wf_id);
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, ExecutionStatus::Completed);
    assert_eq!(executions[0].results.len(), 2);

    // Only future ticks are lost.
    tokio::time::sleep(TICK * 3).await;
    settle().await;
    assert_eq!(engine.execution_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn double_start_does_not_double_ticks() {
    let engine = engine_with(Arc::new(MockEffects::recording()));
    engine
        .register(workflow(TriggerKind::TimeBased, vec![notify("tick")]))
        .expect("valid workflow");

    let scheduler = Scheduler::new(Arc::clone(&engine), TICK);
    scheduler.start();
    scheduler.start(); // no-op

    tokio::time::sleep(TICK + Duration::from_secs(1)).await;
    settle().await;

    // One timer, one execution per tick.
    assert_eq!(engine.execution_count(), 1);
    scheduler.stop();
}
