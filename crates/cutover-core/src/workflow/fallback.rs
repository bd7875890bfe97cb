//! Fallback substitution planning.
//!
//! A step that cannot proceed moves through
//! `Normal → PendingFallbackApproval → Approved → Substituted`:
//!
//! 1. [`build_fallback_approval_step`] creates a go/no-go checkpoint assigned
//!    to everybody involved in the origin step's fallback definitions.
//! 2. Once that checkpoint is unanimously approved,
//!    [`ensure_ready_to_substitute`] lets the substitution through.
//! 3. [`steps_to_cancel`] and [`build_substitute_steps`] describe the
//!    cancellations and the recovery steps to append.
//!
//! These functions only compute; the store applies the result in one
//! transaction.

use crate::{
    error::{CutoverError, Result},
    models::{Execution, ExecutionStep, FallbackStep, StepType},
    workflow::{is_step_complete, snapshot::resolve_members},
};

/// Name of the approval checkpoint created for a fallback request.
pub fn fallback_approval_name(origin_name: &str) -> String {
    format!("Fallback Approval for {origin_name}")
}

/// Order following the current maximum of the execution.
fn next_order(execution: &Execution) -> i32 {
    execution
        .max_order()
        .map_or(0, |max| max.saturating_add(1))
}

/// Builds the unsaved go/no-go checkpoint deciding a fallback for `origin`.
///
/// # Errors
///
/// Returns `CutoverError::PreconditionFailed` when `definitions` is empty.
pub fn build_fallback_approval_step(
    execution: &Execution,
    origin: &ExecutionStep,
    definitions: &[FallbackStep],
    reason: &str,
) -> Result<ExecutionStep> {
    if definitions.is_empty() {
        return Err(CutoverError::precondition(format!(
            "Step {} has no fallback steps defined",
            origin.id
        )));
    }

    let affected = resolve_members(
        definitions.iter().flat_map(|d| d.assigned_members.iter()),
        &execution.members,
    );

    Ok(ExecutionStep {
        execution_id: execution.id,
        name: fallback_approval_name(&origin.name),
        summary: reason.to_string(),
        order: next_order(execution),
        step_type: StepType::GoNoGo,
        assigned_members: affected,
        fallback_origin_step_id: Some(origin.id),
        fallback_reason: reason.to_string(),
        ..Default::default()
    })
}

/// Checks that `approval_step` is an unanimously approved fallback checkpoint.
///
/// # Errors
///
/// Returns `CutoverError::PreconditionFailed` when the step is not a fallback
/// approval step or is not complete yet.
pub fn ensure_ready_to_substitute(approval_step: &ExecutionStep) -> Result<u64> {
    let origin_id = match approval_step.fallback_origin_step_id {
        Some(origin_id) if approval_step.is_fallback_approval() => origin_id,
        _ => {
            return Err(CutoverError::precondition(format!(
                "Step {} is not a fallback approval step",
                approval_step.id
            )))
        }
    };

    if !is_step_complete(approval_step) {
        return Err(CutoverError::precondition(format!(
            "Fallback approval step {} has not been approved by every assigned member",
            approval_step.id
        )));
    }

    Ok(origin_id)
}

/// Checks that the fallback decided by `approval_step` has not been carried
/// out yet.
///
/// Any step linked to the same origin and ordered after the checkpoint was
/// added by an earlier substitution (or a later request, which supersedes
/// this one).
///
/// # Errors
///
/// Returns `CutoverError::PreconditionFailed` when such a step exists.
pub fn ensure_not_substituted(execution: &Execution, approval_step: &ExecutionStep) -> Result<()> {
    let origin_id = approval_step.fallback_origin_step_id;
    let replayed = execution.steps.iter().any(|s| {
        s.id != approval_step.id
            && s.fallback_origin_step_id == origin_id
            && s.order > approval_step.order
    });

    if replayed {
        return Err(CutoverError::precondition(format!(
            "Fallback approval step {} has already been carried out or superseded",
            approval_step.id
        )));
    }
    Ok(())
}

/// Steps to cancel once a fallback is taken: every step ordered after the
/// origin that is not cancelled yet, apart from the approval checkpoint.
pub fn steps_to_cancel(
    execution: &Execution,
    origin: &ExecutionStep,
    approval_step_id: u64,
) -> Vec<u64> {
    execution
        .steps
        .iter()
        .filter(|s| s.order > origin.order && !s.is_cancelled && s.id != approval_step_id)
        .map(|s| s.id)
        .collect()
}

/// Builds the unsaved recovery steps replacing `origin`.
///
/// Definitions are taken in their own order (ties keep declaration order)
/// and appended after the current maximum order. `Fallback`-typed
/// definitions become plain `Execution` steps.
pub fn build_substitute_steps(
    execution: &Execution,
    origin: &ExecutionStep,
    definitions: &[FallbackStep],
) -> Vec<ExecutionStep> {
    let mut ordered: Vec<_> = definitions.iter().collect();
    ordered.sort_by_key(|d| d.order);

    let mut order = next_order(execution);
    ordered
        .into_iter()
        .map(|definition| {
            let step = ExecutionStep {
                execution_id: execution.id,
                name: definition.name.clone(),
                summary: definition.summary.clone(),
                screenshot: definition.screenshot.clone(),
                order,
                step_type: match definition.step_type {
                    StepType::Fallback => StepType::Execution,
                    other => other,
                },
                assigned_members: resolve_members(&definition.assigned_members, &execution.members),
                fallback_origin_step_id: Some(origin.id),
                ..Default::default()
            };
            order = order.saturating_add(1);
            step
        })
        .collect()
}
