//! Building an unsaved execution from a plan.

use jiff::Timestamp;

use crate::models::{
    Execution, ExecutionMember, ExecutionStep, ExecutionStepApproval, Plan, PlanMember,
};

/// Builds the execution snapshot of a plan without touching storage.
///
/// Every identity in the result is 0. Members are copied by value, steps are
/// stably sorted by order and their assigned members point at the copies
/// (matched by name and email).
pub fn snapshot_plan(plan: &Plan, created_on: Timestamp) -> Execution {
    let members: Vec<ExecutionMember> = plan
        .members
        .iter()
        .map(|m| ExecutionMember {
            id: 0,
            name: m.name.clone(),
            email_address: m.email_address.clone(),
        })
        .collect();

    let mut ordered: Vec<_> = plan.steps.iter().collect();
    ordered.sort_by_key(|s| s.order);

    let steps = ordered
        .into_iter()
        .map(|s| ExecutionStep {
            plan_step_id: (s.id != 0).then_some(s.id),
            name: s.name.clone(),
            summary: s.summary.clone(),
            screenshot: s.screenshot.clone(),
            order: s.order,
            step_type: s.step_type,
            assigned_members: resolve_members(&s.assigned_members, &members),
            ..Default::default()
        })
        .collect();

    Execution {
        id: 0,
        name: Execution::default_name(&plan.name),
        created_on,
        plan_id: (plan.id != 0).then_some(plan.id),
        members,
        steps,
    }
}

/// Translates plan member references into execution member copies.
///
/// Matching is by name and email. References without a counterpart in the
/// pool are dropped, duplicates are kept once in first-seen order.
pub fn resolve_members<'a, I>(assigned: I, pool: &[ExecutionMember]) -> Vec<ExecutionMember>
where
    I: IntoIterator<Item = &'a PlanMember>,
{
    let mut resolved: Vec<ExecutionMember> = Vec::new();
    for reference in assigned {
        let Some(member) = pool
            .iter()
            .find(|m| reference.same_person(&m.name, &m.email_address))
        else {
            continue;
        };
        if !resolved
            .iter()
            .any(|r| r.name == member.name && r.email_address == member.email_address)
        {
            resolved.push(member.clone());
        }
    }
    resolved
}

/// Pending approval records a stored step needs: one per assigned member for
/// go/no-go steps, none otherwise.
pub fn pending_approvals(step: &ExecutionStep) -> Vec<ExecutionStepApproval> {
    if !step.step_type.requires_approval() {
        return Vec::new();
    }
    step.assigned_members
        .iter()
        .map(|member| ExecutionStepApproval::pending(step.id, member.id))
        .collect()
}
