//! Execution step operations: recording progress and messages.

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{
    id_column, optional_id_column, optional_timestamp_column, optional_timestamp_to_sql,
    step_type_column, timestamp_column, timestamp_to_sql,
};
use crate::{
    error::{CutoverError, DatabaseResultExt, Result},
    models::{ExecutionMember, ExecutionStep, ExecutionStepApproval, ExecutionStepMessage},
    workflow,
};

const STEP_COLUMNS: &str = "id, execution_id, plan_step_id, step_order, name, summary, screenshot, step_type, started_on, complete_on, is_cancelled, fallback_origin_step_id, fallback_reason, result_summary, result_screenshot, what_went_well, what_could_be_better";

const INSERT_STEP_SQL: &str = "INSERT INTO execution_steps (execution_id, plan_step_id, step_order, name, summary, screenshot, step_type, started_on, complete_on, is_cancelled, fallback_origin_step_id, fallback_reason, result_summary, result_screenshot, what_went_well, what_could_be_better) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";
const UPDATE_STEP_SQL: &str = "UPDATE execution_steps SET screenshot = ?1, started_on = ?2, complete_on = ?3, is_cancelled = ?4, result_summary = ?5, result_screenshot = ?6, what_went_well = ?7, what_could_be_better = ?8 WHERE id = ?9";
const CANCEL_STEP_SQL: &str = "UPDATE execution_steps SET is_cancelled = 1 WHERE id = ?1";
const SELECT_EXECUTION_OF_STEP_SQL: &str = "SELECT execution_id FROM execution_steps WHERE id = ?1";
const LINK_STEP_MEMBER_SQL: &str = "INSERT OR IGNORE INTO execution_step_members (execution_step_id, execution_member_id) VALUES (?1, ?2)";
const SELECT_STEP_MEMBERS_SQL: &str = "SELECT m.id, m.name, m.email_address FROM execution_step_members sm JOIN execution_members m ON m.id = sm.execution_member_id WHERE sm.execution_step_id = ?1 ORDER BY m.id";
const CHECK_MEMBER_IN_EXECUTION_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM execution_members WHERE id = ?1 AND execution_id = ?2)";

const INSERT_APPROVAL_SQL: &str = "INSERT INTO execution_step_approvals (execution_step_id, execution_member_id, is_approved, approval_date, comments) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_STEP_APPROVALS_SQL: &str = "SELECT id, execution_step_id, execution_member_id, is_approved, approval_date, comments FROM execution_step_approvals WHERE execution_step_id = ?1 ORDER BY id";

const INSERT_MESSAGE_SQL: &str = "INSERT INTO execution_step_messages (execution_step_id, author_id, content, created_on) VALUES (?1, ?2, ?3, ?4)";
const SELECT_STEP_MESSAGES_SQL: &str = "SELECT id, execution_step_id, author_id, content, created_on FROM execution_step_messages WHERE execution_step_id = ?1 ORDER BY created_on, id";

impl super::Database {
    /// Retrieves a step with its assigned members, approvals and messages.
    pub fn get_execution_step(&self, id: u64) -> Result<Option<ExecutionStep>> {
        load_step(&self.connection, id)
    }

    /// Records progress on a step and returns the reloaded step.
    ///
    /// Only the fields a runner records are written: start and completion
    /// times, cancellation, the result fields and the screenshot. Identity,
    /// ordering, type and fallback linkage are fixed once a step exists.
    pub fn update_execution_step(&mut self, step: &ExecutionStep) -> Result<ExecutionStep> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(
                UPDATE_STEP_SQL,
                params![
                    step.screenshot.as_deref(),
                    optional_timestamp_to_sql(step.started_on.as_ref()),
                    optional_timestamp_to_sql(step.complete_on.as_ref()),
                    step.is_cancelled,
                    step.result_summary,
                    step.result_screenshot.as_deref(),
                    step.what_went_well,
                    step.what_could_be_better,
                    step.id as i64
                ],
            )
            .db_context("Failed to update execution step")?;

        if updated == 0 {
            return Err(CutoverError::StepNotFound { id: step.id });
        }

        let reloaded = load_step(&tx, step.id)?.ok_or(CutoverError::StepNotFound { id: step.id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(reloaded)
    }

    /// Attaches a message to a step. The author must be a member of the
    /// step's execution.
    pub fn add_message_to_step(
        &mut self,
        message: &ExecutionStepMessage,
    ) -> Result<ExecutionStepMessage> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let execution_id = execution_of_step(&tx, message.execution_step_id)?;
        ensure_member_of_execution(&tx, message.author_id, execution_id)?;

        tx.execute(
            INSERT_MESSAGE_SQL,
            params![
                message.execution_step_id as i64,
                message.author_id as i64,
                message.content,
                timestamp_to_sql(&message.created_on)
            ],
        )
        .db_context("Failed to insert message")?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Added message {id} to step {}", message.execution_step_id);
        Ok(ExecutionStepMessage {
            id,
            ..message.clone()
        })
    }
}

/// Execution a step belongs to.
pub(super) fn execution_of_step(conn: &Connection, step_id: u64) -> Result<u64> {
    conn.query_row(SELECT_EXECUTION_OF_STEP_SQL, params![step_id as i64], |row| {
        id_column(row, 0)
    })
    .optional()
    .db_context("Failed to query step")?
    .ok_or(CutoverError::StepNotFound { id: step_id })
}

pub(super) fn ensure_member_of_execution(
    conn: &Connection,
    member_id: u64,
    execution_id: u64,
) -> Result<()> {
    let exists: bool = conn
        .query_row(
            CHECK_MEMBER_IN_EXECUTION_SQL,
            params![member_id as i64, execution_id as i64],
            |row| row.get(0),
        )
        .db_context("Failed to check member existence")?;

    if exists {
        Ok(())
    } else {
        Err(CutoverError::MemberNotFound { id: member_id })
    }
}

/// Inserts a step and its member links, assigning the step's id.
///
/// Assigned members must already be persisted.
pub(super) fn insert_step(conn: &Connection, step: &mut ExecutionStep) -> Result<()> {
    conn.execute(
        INSERT_STEP_SQL,
        params![
            step.execution_id as i64,
            step.plan_step_id.map(|id| id as i64),
            step.order,
            step.name,
            step.summary,
            step.screenshot.as_deref(),
            step.step_type.as_str(),
            optional_timestamp_to_sql(step.started_on.as_ref()),
            optional_timestamp_to_sql(step.complete_on.as_ref()),
            step.is_cancelled,
            step.fallback_origin_step_id.map(|id| id as i64),
            step.fallback_reason,
            step.result_summary,
            step.result_screenshot.as_deref(),
            step.what_went_well,
            step.what_could_be_better
        ],
    )
    .db_context("Failed to insert execution step")?;
    step.id = conn.last_insert_rowid() as u64;

    for member in &step.assigned_members {
        conn.execute(LINK_STEP_MEMBER_SQL, params![step.id as i64, member.id as i64])
            .db_context("Failed to assign step member")?;
    }
    Ok(())
}

/// Inserts the pending approvals a freshly inserted step needs.
pub(super) fn insert_pending_approvals(conn: &Connection, step: &mut ExecutionStep) -> Result<()> {
    for mut approval in workflow::pending_approvals(step) {
        conn.execute(
            INSERT_APPROVAL_SQL,
            params![
                approval.execution_step_id as i64,
                approval.execution_member_id as i64,
                approval.is_approved,
                optional_timestamp_to_sql(approval.approval_date.as_ref()),
                approval.comments
            ],
        )
        .db_context("Failed to insert pending approval")?;
        approval.id = conn.last_insert_rowid() as u64;
        step.approvals.push(approval);
    }
    Ok(())
}

pub(super) fn cancel_step(conn: &Connection, step_id: u64) -> Result<()> {
    conn.execute(CANCEL_STEP_SQL, params![step_id as i64])
        .db_context("Failed to cancel step")?;
    Ok(())
}

/// Loads the steps of an execution ordered by order, ties in creation
/// sequence.
pub(super) fn load_steps(conn: &Connection, execution_id: u64) -> Result<Vec<ExecutionStep>> {
    let sql = format!(
        "SELECT {STEP_COLUMNS} FROM execution_steps WHERE execution_id = ?1 ORDER BY step_order, id"
    );
    let mut stmt = conn.prepare(&sql).db_context("Failed to prepare query")?;
    let mut steps = stmt
        .query_map(params![execution_id as i64], build_step_from_row)
        .db_context("Failed to query execution steps")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect execution steps")?;

    for step in &mut steps {
        load_step_children(conn, step)?;
    }
    Ok(steps)
}

/// Loads a single step with its children.
pub(super) fn load_step(conn: &Connection, id: u64) -> Result<Option<ExecutionStep>> {
    let sql = format!("SELECT {STEP_COLUMNS} FROM execution_steps WHERE id = ?1");
    let step = conn
        .query_row(&sql, params![id as i64], build_step_from_row)
        .optional()
        .db_context("Failed to query execution step")?;

    match step {
        Some(mut step) => {
            load_step_children(conn, &mut step)?;
            Ok(Some(step))
        }
        None => Ok(None),
    }
}

fn build_step_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExecutionStep> {
    Ok(ExecutionStep {
        id: id_column(row, 0)?,
        execution_id: id_column(row, 1)?,
        plan_step_id: optional_id_column(row, 2)?,
        order: row.get(3)?,
        name: row.get(4)?,
        summary: row.get(5)?,
        screenshot: row.get(6)?,
        step_type: step_type_column(row, 7)?,
        started_on: optional_timestamp_column(row, 8)?,
        complete_on: optional_timestamp_column(row, 9)?,
        is_cancelled: row.get(10)?,
        fallback_origin_step_id: optional_id_column(row, 11)?,
        fallback_reason: row.get(12)?,
        result_summary: row.get(13)?,
        result_screenshot: row.get(14)?,
        what_went_well: row.get(15)?,
        what_could_be_better: row.get(16)?,
        assigned_members: Vec::new(),
        approvals: Vec::new(),
        messages: Vec::new(),
    })
}

fn load_step_children(conn: &Connection, step: &mut ExecutionStep) -> Result<()> {
    let mut stmt = conn
        .prepare(SELECT_STEP_MEMBERS_SQL)
        .db_context("Failed to prepare query")?;
    step.assigned_members = stmt
        .query_map(params![step.id as i64], |row| {
            Ok(ExecutionMember {
                id: id_column(row, 0)?,
                name: row.get(1)?,
                email_address: row.get(2)?,
            })
        })
        .db_context("Failed to query step members")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect step members")?;

    let mut stmt = conn
        .prepare(SELECT_STEP_APPROVALS_SQL)
        .db_context("Failed to prepare query")?;
    step.approvals = stmt
        .query_map(params![step.id as i64], build_approval_from_row)
        .db_context("Failed to query step approvals")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect step approvals")?;

    let mut stmt = conn
        .prepare(SELECT_STEP_MESSAGES_SQL)
        .db_context("Failed to prepare query")?;
    step.messages = stmt
        .query_map(params![step.id as i64], |row| {
            Ok(ExecutionStepMessage {
                id: id_column(row, 0)?,
                execution_step_id: id_column(row, 1)?,
                author_id: id_column(row, 2)?,
                content: row.get(3)?,
                created_on: timestamp_column(row, 4)?,
            })
        })
        .db_context("Failed to query step messages")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect step messages")?;

    Ok(())
}

pub(super) fn build_approval_from_row(
    row: &rusqlite::Row,
) -> rusqlite::Result<ExecutionStepApproval> {
    Ok(ExecutionStepApproval {
        id: id_column(row, 0)?,
        execution_step_id: id_column(row, 1)?,
        execution_member_id: id_column(row, 2)?,
        is_approved: row.get(3)?,
        approval_date: optional_timestamp_column(row, 4)?,
        comments: row.get(5)?,
    })
}
