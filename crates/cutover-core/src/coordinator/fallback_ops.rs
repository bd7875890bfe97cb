//! Fallback operations for the Coordinator.

use super::Coordinator;
use crate::{error::Result, models::ExecutionStep};

impl Coordinator {
    /// Requests a fallback for `origin_step_id` by appending a go/no-go
    /// approval step to the execution.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionNotFound` or `StepNotFound` when the execution or the
    /// origin step (within it) is missing, and `PreconditionFailed` when the
    /// origin has no fallback steps defined.
    pub async fn create_fallback_approval_step(
        &self,
        execution_id: u64,
        origin_step_id: u64,
        reason: &str,
    ) -> Result<ExecutionStep> {
        let reason = reason.to_string();
        self.with_database(move |db| {
            db.create_fallback_approval_step(execution_id, origin_step_id, &reason)
        })
        .await
    }

    /// Cancels the steps after the origin and appends its fallback steps,
    /// once the approval step is unanimously approved.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionNotFound` or `StepNotFound` for missing targets, and
    /// `PreconditionFailed` when the step is not a fallback approval step or
    /// has not been approved by everyone assigned.
    pub async fn execute_fallback(
        &self,
        execution_id: u64,
        approval_step_id: u64,
    ) -> Result<Vec<ExecutionStep>> {
        self.with_database(move |db| db.execute_fallback(execution_id, approval_step_id))
            .await
    }
}
