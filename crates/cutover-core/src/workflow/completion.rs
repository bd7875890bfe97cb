//! Step completion and start gating.

use crate::models::{Execution, ExecutionStep, StepType};

/// Whether a step counts as complete.
///
/// Evaluated against the step as given; the caller must hand in a step with
/// its assigned members and approvals loaded, otherwise go/no-go steps read
/// as incomplete.
///
/// - a cancelled step is always complete;
/// - plain tasks are complete once `complete_on` is set;
/// - go/no-go steps need at least one assigned member and an approved record
///   for every one of them, matched by member identity;
/// - any other step type is never complete.
pub fn is_step_complete(step: &ExecutionStep) -> bool {
    if step.is_cancelled {
        return true;
    }

    match step.step_type {
        StepType::Activity | StepType::Execution => step.complete_on.is_some(),
        StepType::GoNoGo => {
            !step.assigned_members.is_empty()
                && step
                    .assigned_members
                    .iter()
                    .all(|member| step.approval_for(member.id).is_some_and(|a| a.is_approved))
        }
        StepType::Fallback => false,
    }
}

/// Whether every other step with a strictly lower order is complete.
pub fn can_start_step(step: &ExecutionStep, execution: &Execution) -> bool {
    execution
        .steps
        .iter()
        .filter(|other| other.id != step.id && other.order < step.order)
        .all(is_step_complete)
}

