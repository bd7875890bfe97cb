//! Approval record operations.

use log::debug;
use rusqlite::{params, OptionalExtension};

use super::{
    step_queries::{build_approval_from_row, ensure_member_of_execution, execution_of_step},
    utils::optional_timestamp_to_sql,
};
use crate::{
    error::{CutoverError, DatabaseResultExt, Result},
    models::ExecutionStepApproval,
};

const CHECK_APPROVAL_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM execution_step_approvals WHERE execution_step_id = ?1 AND execution_member_id = ?2)";
const INSERT_APPROVAL_SQL: &str = "INSERT INTO execution_step_approvals (execution_step_id, execution_member_id, is_approved, approval_date, comments) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_APPROVAL_SQL: &str = "UPDATE execution_step_approvals SET is_approved = ?1, approval_date = ?2, comments = ?3 WHERE id = ?4";
const SELECT_APPROVAL_SQL: &str = "SELECT id, execution_step_id, execution_member_id, is_approved, approval_date, comments FROM execution_step_approvals WHERE id = ?1";

impl super::Database {
    /// Retrieves an approval record by its ID.
    pub fn get_approval(&self, id: u64) -> Result<Option<ExecutionStepApproval>> {
        self.connection
            .query_row(SELECT_APPROVAL_SQL, params![id as i64], build_approval_from_row)
            .optional()
            .db_context("Failed to query approval")
    }

    /// Adds an approval record for a member of the step's execution.
    ///
    /// A member has at most one record per step; a second one is refused
    /// with `PreconditionFailed`.
    pub fn add_approval_to_step(
        &mut self,
        approval: &ExecutionStepApproval,
    ) -> Result<ExecutionStepApproval> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let execution_id = execution_of_step(&tx, approval.execution_step_id)?;
        ensure_member_of_execution(&tx, approval.execution_member_id, execution_id)?;

        let exists: bool = tx
            .query_row(
                CHECK_APPROVAL_EXISTS_SQL,
                params![
                    approval.execution_step_id as i64,
                    approval.execution_member_id as i64
                ],
                |row| row.get(0),
            )
            .db_context("Failed to check approval existence")?;

        if exists {
            return Err(CutoverError::precondition(format!(
                "Member {} already has an approval on step {}",
                approval.execution_member_id, approval.execution_step_id
            )));
        }

        tx.execute(
            INSERT_APPROVAL_SQL,
            params![
                approval.execution_step_id as i64,
                approval.execution_member_id as i64,
                approval.is_approved,
                optional_timestamp_to_sql(approval.approval_date.as_ref()),
                approval.comments
            ],
        )
        .db_context("Failed to insert approval")?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!(
            "Added approval {id} for member {} on step {}",
            approval.execution_member_id, approval.execution_step_id
        );
        Ok(ExecutionStepApproval {
            id,
            ..approval.clone()
        })
    }

    /// Persists the decision fields of an approval record.
    ///
    /// Step completion is derived from approvals on every read, so nothing
    /// else changes here.
    pub fn update_step_approval(
        &mut self,
        approval: &ExecutionStepApproval,
    ) -> Result<ExecutionStepApproval> {
        let updated = self
            .connection
            .execute(
                UPDATE_APPROVAL_SQL,
                params![
                    approval.is_approved,
                    optional_timestamp_to_sql(approval.approval_date.as_ref()),
                    approval.comments,
                    approval.id as i64
                ],
            )
            .db_context("Failed to update approval")?;

        if updated == 0 {
            return Err(CutoverError::ApprovalNotFound { id: approval.id });
        }

        self.get_approval(approval.id)?
            .ok_or(CutoverError::ApprovalNotFound { id: approval.id })
    }
}
