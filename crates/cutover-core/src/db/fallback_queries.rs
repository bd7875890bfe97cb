//! Fallback requests and substitution.

use log::info;
use rusqlite::Connection;

use super::{
    execution_queries::load_execution,
    plan_queries::load_fallback_steps,
    step_queries::{cancel_step, insert_pending_approvals, insert_step},
};
use crate::{
    error::{CutoverError, DatabaseResultExt, Result},
    models::{ExecutionStep, FallbackStep},
    workflow,
};

impl super::Database {
    /// Requests a fallback for a step by appending a go/no-go checkpoint.
    ///
    /// The checkpoint is assigned to every member involved in the origin's
    /// fallback steps and gets one pending approval per member.
    pub fn create_fallback_approval_step(
        &mut self,
        execution_id: u64,
        origin_step_id: u64,
        reason: &str,
    ) -> Result<ExecutionStep> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let execution = load_execution(&tx, execution_id)?
            .ok_or(CutoverError::ExecutionNotFound { id: execution_id })?;
        let origin = execution
            .step(origin_step_id)
            .ok_or(CutoverError::StepNotFound { id: origin_step_id })?;

        let definitions = definitions_for(&tx, origin)?;
        let mut approval_step =
            workflow::build_fallback_approval_step(&execution, origin, &definitions, reason)?;

        insert_step(&tx, &mut approval_step)?;
        insert_pending_approvals(&tx, &mut approval_step)?;

        tx.commit().db_context("Failed to commit transaction")?;

        info!(
            "Requested fallback for step {origin_step_id} of execution {execution_id} (approval step {})",
            approval_step.id
        );
        Ok(approval_step)
    }

    /// Carries out an approved fallback.
    ///
    /// Cancels every step ordered after the origin (the checkpoint excepted)
    /// and appends the origin's fallback steps as new execution steps, all in
    /// one transaction. Returns the appended steps. A checkpoint can be
    /// carried out once.
    pub fn execute_fallback(
        &mut self,
        execution_id: u64,
        approval_step_id: u64,
    ) -> Result<Vec<ExecutionStep>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let execution = load_execution(&tx, execution_id)?
            .ok_or(CutoverError::ExecutionNotFound { id: execution_id })?;
        let approval_step = execution
            .step(approval_step_id)
            .ok_or(CutoverError::StepNotFound { id: approval_step_id })?;

        let origin_id = workflow::ensure_ready_to_substitute(approval_step)?;
        workflow::ensure_not_substituted(&execution, approval_step)?;
        let origin = execution
            .step(origin_id)
            .ok_or(CutoverError::StepNotFound { id: origin_id })?;

        let definitions = definitions_for(&tx, origin)?;
        if definitions.is_empty() {
            return Err(CutoverError::precondition(format!(
                "Step {origin_id} no longer has fallback steps defined"
            )));
        }

        let cancelled = workflow::steps_to_cancel(&execution, origin, approval_step_id);
        for step_id in &cancelled {
            cancel_step(&tx, *step_id)?;
        }

        let mut substitutes = workflow::build_substitute_steps(&execution, origin, &definitions);
        for step in &mut substitutes {
            insert_step(&tx, step)?;
        }
        for step in &mut substitutes {
            insert_pending_approvals(&tx, step)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        info!(
            "Executed fallback for step {origin_id} of execution {execution_id}: cancelled {}, added {}",
            cancelled.len(),
            substitutes.len()
        );
        Ok(substitutes)
    }
}

/// Fallback definitions of the plan step an execution step was copied from.
///
/// Steps without a plan link (or whose plan step is gone) have none.
fn definitions_for(conn: &Connection, step: &ExecutionStep) -> Result<Vec<FallbackStep>> {
    match step.plan_step_id {
        Some(plan_step_id) => load_fallback_steps(conn, plan_step_id),
        None => Ok(Vec::new()),
    }
}
