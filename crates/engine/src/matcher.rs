//! Trigger matching — run at registration time for validation, and for every
//! incoming event to select the workflows that fire.
//!
//! Condition evaluation is pure and side-effect-free.  Operator/value-type
//! compatibility is checked by [`validate_workflow`] before a workflow enters
//! the registry, so a malformed rule is rejected up front instead of crashing
//! unrelated evaluations later.

use crate::models::{
    Condition, ConditionOperator, FieldValue, TriggerPayload, Workflow,
};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Registration-time validation
// ---------------------------------------------------------------------------

/// Check every condition of the workflow for operator/value compatibility.
///
/// # Errors
/// [`EngineError::InvalidCondition`] naming the first offending condition.
pub fn validate_workflow(workflow: &Workflow) -> Result<(), EngineError> {
    for condition in &workflow.trigger.conditions {
        validate_condition(condition)?;
    }
    Ok(())
}

fn validate_condition(condition: &Condition) -> Result<(), EngineError> {
    use ConditionOperator::*;

    let compatible = match condition.operator {
        // Typed equality works for every value type.
        Equals | NotEquals => true,
        // The needle of a containment check is always text; the payload side
        // may be text or a set.
        Contains | NotContains => matches!(condition.value, FieldValue::Text(_)),
        GreaterThan | LessThan => {
            matches!(condition.value, FieldValue::Number(_) | FieldValue::Date(_))
        }
        Before | After => matches!(condition.value, FieldValue::Date(_)),
        Within => matches!(condition.value, FieldValue::Minutes(_)),
    };

    if compatible {
        Ok(())
    } else {
        Err(EngineError::InvalidCondition {
            field: condition.field.clone(),
            operator: condition.operator,
            value_type: condition.value.type_name(),
        })
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Return the active workflows whose trigger fires for `payload`, in
/// registration (slice) order.
pub fn matching_workflows<'a>(
    workflows: &'a [Workflow],
    payload: &TriggerPayload,
) -> Vec<&'a Workflow> {
    workflows
        .iter()
        .filter(|w| {
            w.is_active
                && w.trigger.is_active
                && w.trigger.kind == payload.kind
                && w.trigger
                    .conditions
                    .iter()
                    .all(|c| evaluate_condition(c, payload))
        })
        .collect()
}

/// Evaluate one condition against the payload.
///
/// A condition on a field the payload does not carry is false, and a payload
/// value of an unexpected type never matches (except through `not_equals`,
/// which is the strict negation of `equals`).
pub fn evaluate_condition(condition: &Condition, payload: &TriggerPayload) -> bool {
    use ConditionOperator::*;

    let Some(actual) = payload.fields.get(&condition.field) else {
        return false;
    };

    match condition.operator {
        Equals => actual == &condition.value,
        NotEquals => actual != &condition.value,
        Contains => contains(actual, &condition.value),
        NotContains => !contains(actual, &condition.value),
        GreaterThan => match (actual, &condition.value) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a > b,
            (FieldValue::Date(a), FieldValue::Date(b)) => a > b,
            _ => false,
        },
        LessThan => match (actual, &condition.value) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a < b,
            (FieldValue::Date(a), FieldValue::Date(b)) => a < b,
            _ => false,
        },
        Before => match (actual, &condition.value) {
            (FieldValue::Date(a), FieldValue::Date(b)) => a < b,
            _ => false,
        },
        After => match (actual, &condition.value) {
            (FieldValue::Date(a), FieldValue::Date(b)) => a > b,
            _ => false,
        },
        Within => match (actual, &condition.value) {
            // Matches when the payload date lies within the duration of "now",
            // where "now" is the payload's own occurrence instant.
            (FieldValue::Date(a), FieldValue::Minutes(m)) => {
                let distance = (*a - payload.occurred_at).num_minutes().abs();
                distance <= *m
            }
            _ => false,
        },
    }
}

fn contains(actual: &FieldValue, needle: &FieldValue) -> bool {
    match (actual, needle) {
        (FieldValue::Text(haystack), FieldValue::Text(n)) => haystack.contains(n.as_str()),
        (FieldValue::TextSet(set), FieldValue::Text(n)) => set.contains(n),
        _ => false,
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::{Trigger, TriggerKind};

    fn payload_with(field: &str, value: FieldValue) -> TriggerPayload {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), value);
        TriggerPayload {
            kind: TriggerKind::TaskCreated,
            task_id: Some(Uuid::new_v4()),
            fields,
            occurred_at: Utc::now(),
        }
    }

    fn condition(field: &str, operator: ConditionOperator, value: FieldValue) -> Condition {
        Condition {
            field: field.into(),
            operator,
            value,
        }
    }

    fn workflow_with_conditions(conditions: Vec<Condition>) -> Workflow {
        Workflow::new(
            "test",
            Trigger {
                kind: TriggerKind::TaskCreated,
                conditions,
                is_active: true,
            },
            vec![],
        )
    }

    #[test]
    fn equals_compares_typed_values() {
        let p = payload_with("priority", FieldValue::Number(1.0));
        assert!(evaluate_condition(
            &condition("priority", ConditionOperator::Equals, FieldValue::Number(1.0)),
            &p,
        ));
        assert!(!evaluate_condition(
            &condition("priority", ConditionOperator::Equals, FieldValue::Number(2.0)),
            &p,
        ));
    }

    #[test]
    fn contains_applies_to_text_and_sets() {
        let text = payload_with("content", FieldValue::Text("buy milk today".into()));
        assert!(evaluate_condition(
            &condition("content", ConditionOperator::Contains, FieldValue::Text("milk".into())),
            &text,
        ));

        let set = payload_with(
            "labels",
            FieldValue::TextSet(["urgent".to_string(), "home".to_string()].into()),
        );
        assert!(evaluate_condition(
            &condition("labels", ConditionOperator::Contains, FieldValue::Text("urgent".into())),
            &set,
        ));
        assert!(evaluate_condition(
            &condition("labels", ConditionOperator::NotContains, FieldValue::Text("work".into())),
            &set,
        ));
    }

    #[test]
    fn within_measures_distance_from_occurrence_instant() {
        let now = Utc::now();
        let mut p = payload_with("due_date", FieldValue::Date(now + Duration::minutes(30)));
        p.occurred_at = now;

        assert!(evaluate_condition(
            &condition("due_date", ConditionOperator::Within, FieldValue::Minutes(60)),
            &p,
        ));
        assert!(!evaluate_condition(
            &condition("due_date", ConditionOperator::Within, FieldValue::Minutes(10)),
            &p,
        ));
    }

    #[test]
    fn task_payloads_expose_the_standard_fields() {
        let mut task = domain::Task::new("pay rent");
        task.priority = domain::Priority::P1;
        task.labels = vec!["home".into()];

        let p = TriggerPayload::for_task(TriggerKind::TaskCreated, &task, Utc::now());

        assert_eq!(p.task_id, Some(task.id));
        assert!(evaluate_condition(
            &condition("content", ConditionOperator::Contains, FieldValue::Text("rent".into())),
            &p,
        ));
        assert!(evaluate_condition(
            &condition("priority", ConditionOperator::Equals, FieldValue::Number(1.0)),
            &p,
        ));
        assert!(evaluate_condition(
            &condition("labels", ConditionOperator::Contains, FieldValue::Text("home".into())),
            &p,
        ));
    }

    #[test]
    fn missing_field_never_matches() {
        let p = payload_with("content", FieldValue::Text("x".into()));
        assert!(!evaluate_condition(
            &condition("ghost", ConditionOperator::Equals, FieldValue::Text("x".into())),
            &p,
        ));
    }

    #[test]
    fn incompatible_operator_is_a_registration_error() {
        let wf = workflow_with_conditions(vec![condition(
            "labels",
            ConditionOperator::GreaterThan,
            FieldValue::Text("oops".into()),
        )]);
        assert!(matches!(
            validate_workflow(&wf),
            Err(EngineError::InvalidCondition { field, .. }) if field == "labels"
        ));
    }

    #[test]
    fn within_requires_a_minutes_operand() {
        let wf = workflow_with_conditions(vec![condition(
            "due_date",
            ConditionOperator::Within,
            FieldValue::Number(60.0),
        )]);
        assert!(validate_workflow(&wf).is_err());
    }

    #[test]
    fn matching_is_deterministic_and_ordered() {
        let a = workflow_with_conditions(vec![]);
        let b = workflow_with_conditions(vec![]);
        let workflows = vec![a.clone(), b.clone()];
        let p = payload_with("content", FieldValue::Text("anything".into()));

        let first: Vec<Uuid> = matching_workflows(&workflows, &p).iter().map(|w| w.id).collect();
        let second: Vec<Uuid> = matching_workflows(&workflows, &p).iter().map(|w| w.id).collect();

        assert_eq!(first, vec![a.id, b.id]);
        assert_eq!(first, second);
    }

    #[test]
    fn inactive_workflow_never_matches() {
        let mut wf = workflow_with_conditions(vec![]);
        wf.is_active = false;
        let p = payload_with("content", FieldValue::Text("anything".into()));
        assert!(matching_workflows(std::slice::from_ref(&wf), &p).is_empty());
    }

    #[test]
    fn inactive_trigger_never_matches() {
        let mut wf = workflow_with_conditions(vec![]);
        wf.trigger.is_active = false;
        let p = payload_with("content", FieldValue::Text("anything".into()));
        assert!(matching_workflows(std::slice::from_ref(&wf), &p).is_empty());
    }
}
