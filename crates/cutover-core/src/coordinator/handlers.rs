//! Runner-facing operations that take params and return display types.
//!
//! These sit on top of the plain operations: each one loads what it needs,
//! applies a workflow rule and records the result, all on one connection.

use jiff::Timestamp;
use log::{debug, info};

use super::Coordinator;
use crate::{
    display::{Executions, Plans, StepReport, Steps},
    error::{CutoverError, Result},
    models::{
        ExecutionFilter, ExecutionStep, ExecutionStepApproval, ExecutionStepMessage, StepProgress,
    },
    params::{
        AddApproval, CompleteStep, ExecuteFallback, GrantApproval, Id, ListExecutions,
        PostMessage, RequestFallback,
    },
    workflow,
};

impl Coordinator {
    /// Lists every plan for display.
    pub async fn list_plans_summary(&self) -> Result<Plans> {
        Ok(Plans(self.list_plans().await?))
    }

    /// Lists executions for display, newest first.
    pub async fn list_executions_summary(&self, params: &ListExecutions) -> Result<Executions> {
        let filter = ExecutionFilter::from(params);
        Ok(Executions(self.list_executions(filter).await?))
    }

    /// Marks a step as started.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the step is cancelled or an earlier
    /// step is not complete yet.
    pub async fn start_step(&self, params: &Id) -> Result<ExecutionStep> {
        let id = params.id;
        self.with_database(move |db| {
            let mut step = db
                .get_execution_step(id)?
                .ok_or(CutoverError::StepNotFound { id })?;
            let execution = db
                .get_execution(step.execution_id)?
                .ok_or(CutoverError::ExecutionNotFound {
                    id: step.execution_id,
                })?;

            if step.is_cancelled {
                return Err(CutoverError::precondition(format!("Step {id} is cancelled")));
            }
            if !workflow::can_start_step(&step, &execution) {
                return Err(CutoverError::precondition(format!(
                    "Step {id} cannot start before the steps ordered before it are complete"
                )));
            }

            if step.started_on.is_none() {
                step.started_on = Some(Timestamp::now());
            }
            info!("Started step {id} of execution {}", step.execution_id);
            db.update_execution_step(&step)
        })
        .await
    }

    /// Marks a plain step as finished, optionally recording its result.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the step is cancelled, already
    /// complete, or is not a plain task (go/no-go steps complete through
    /// their approvals).
    pub async fn complete_step(&self, params: &CompleteStep) -> Result<ExecutionStep> {
        let id = params.id;
        let result_summary = params.result_summary.clone();
        self.with_database(move |db| {
            let mut step = db
                .get_execution_step(id)?
                .ok_or(CutoverError::StepNotFound { id })?;

            if !step.step_type.is_plain_task() {
                return Err(CutoverError::precondition(format!(
                    "Step {id} is a {} step and cannot be completed directly",
                    step.step_type
                )));
            }
            if step.is_cancelled {
                return Err(CutoverError::precondition(format!("Step {id} is cancelled")));
            }
            if step.complete_on.is_some() {
                return Err(CutoverError::precondition(format!(
                    "Step {id} is already complete"
                )));
            }

            let now = Timestamp::now();
            step.started_on.get_or_insert(now);
            step.complete_on = Some(now);
            if let Some(result_summary) = result_summary {
                step.result_summary = result_summary;
            }
            info!("Completed step {id} of execution {}", step.execution_id);
            db.update_execution_step(&step)
        })
        .await
    }

    /// Cancels a step. Cancelling twice is harmless.
    pub async fn cancel_step(&self, params: &Id) -> Result<ExecutionStep> {
        let id = params.id;
        self.with_database(move |db| {
            let mut step = db
                .get_execution_step(id)?
                .ok_or(CutoverError::StepNotFound { id })?;
            step.is_cancelled = true;
            info!("Cancelled step {id} of execution {}", step.execution_id);
            db.update_execution_step(&step)
        })
        .await
    }

    /// Reports a step's progress and whether it may start.
    pub async fn step_report(&self, params: &Id) -> Result<StepReport> {
        let id = params.id;
        self.with_database(move |db| {
            let step = db
                .get_execution_step(id)?
                .ok_or(CutoverError::StepNotFound { id })?;
            let execution = db
                .get_execution(step.execution_id)?
                .ok_or(CutoverError::ExecutionNotFound {
                    id: step.execution_id,
                })?;

            Ok(StepReport {
                progress: StepProgress::of(&step),
                can_start: workflow::can_start_step(&step, &execution),
                step,
            })
        })
        .await
    }

    /// Posts a message on a step.
    pub async fn post_message(&self, params: &PostMessage) -> Result<ExecutionStepMessage> {
        let message = ExecutionStepMessage::new(params.step_id, params.author_id, &*params.content);
        self.add_message_to_step(&message).await
    }

    /// Adds a pending approval record for a member.
    pub async fn add_approval(&self, params: &AddApproval) -> Result<ExecutionStepApproval> {
        let approval = ExecutionStepApproval::pending(params.step_id, params.member_id);
        self.add_approval_to_step(&approval).await
    }

    /// Grants an approval now, with an optional comment.
    pub async fn grant_approval(&self, params: &GrantApproval) -> Result<ExecutionStepApproval> {
        let id = params.id;
        let comment = params.comment.clone();
        self.with_database(move |db| {
            let mut approval = db
                .get_approval(id)?
                .ok_or(CutoverError::ApprovalNotFound { id })?;
            approval.approve(Timestamp::now(), comment);
            debug!("Granting approval {id} on step {}", approval.execution_step_id);
            db.update_step_approval(&approval)
        })
        .await
    }

    /// Withdraws a granted approval.
    pub async fn revoke_approval(&self, params: &Id) -> Result<ExecutionStepApproval> {
        let id = params.id;
        self.with_database(move |db| {
            let mut approval = db
                .get_approval(id)?
                .ok_or(CutoverError::ApprovalNotFound { id })?;
            approval.revoke();
            debug!("Revoking approval {id} on step {}", approval.execution_step_id);
            db.update_step_approval(&approval)
        })
        .await
    }

    /// Requests a fallback and returns the approval step to vote on.
    pub async fn request_fallback(&self, params: &RequestFallback) -> Result<ExecutionStep> {
        self.create_fallback_approval_step(
            params.execution_id,
            params.origin_step_id,
            &params.reason,
        )
        .await
    }

    /// Carries out an approved fallback and returns the substituted steps.
    pub async fn run_fallback(&self, params: &ExecuteFallback) -> Result<Steps> {
        let steps = self
            .execute_fallback(params.execution_id, params.approval_step_id)
            .await?;
        Ok(Steps(steps))
    }
}
