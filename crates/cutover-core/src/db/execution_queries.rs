//! Execution snapshot creation, lookup, listing and deletion.

use jiff::Timestamp;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    plan_queries::load_plan,
    step_queries::{insert_pending_approvals, insert_step, load_steps},
    utils::{escape_like, id_column, optional_id_column, timestamp_column, timestamp_to_sql},
};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Execution, ExecutionFilter, ExecutionMember},
    workflow,
};

const INSERT_EXECUTION_SQL: &str =
    "INSERT INTO executions (name, created_on, plan_id) VALUES (?1, ?2, ?3)";
const SELECT_EXECUTION_SQL: &str =
    "SELECT id, name, created_on, plan_id FROM executions WHERE id = ?1";
const DELETE_EXECUTION_SQL: &str = "DELETE FROM executions WHERE id = ?1";
const INSERT_MEMBER_SQL: &str =
    "INSERT INTO execution_members (execution_id, name, email_address) VALUES (?1, ?2, ?3)";
const SELECT_MEMBERS_SQL: &str =
    "SELECT id, name, email_address FROM execution_members WHERE execution_id = ?1 ORDER BY id";

impl super::Database {
    /// Snapshots a plan into a new execution.
    ///
    /// Returns `None` when the plan does not exist. Steps are written first
    /// so that they have identities, then the pending approvals of go/no-go
    /// steps are written against them; both passes share one transaction.
    pub fn create_execution_from_plan(&mut self, plan_id: u64) -> Result<Option<Execution>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(plan) = load_plan(&tx, plan_id)? else {
            debug!("Plan {plan_id} not found, no execution created");
            return Ok(None);
        };

        let mut execution = workflow::snapshot_plan(&plan, Timestamp::now());

        tx.execute(
            INSERT_EXECUTION_SQL,
            params![
                execution.name,
                timestamp_to_sql(&execution.created_on),
                execution.plan_id.map(|id| id as i64)
            ],
        )
        .db_context("Failed to insert execution")?;
        execution.id = tx.last_insert_rowid() as u64;

        for member in &mut execution.members {
            tx.execute(
                INSERT_MEMBER_SQL,
                params![execution.id as i64, member.name, member.email_address],
            )
            .db_context("Failed to insert execution member")?;
            member.id = tx.last_insert_rowid() as u64;
        }

        let members = &execution.members;
        for step in &mut execution.steps {
            step.execution_id = execution.id;
            bind_members(&mut step.assigned_members, members);
            insert_step(&tx, step)?;
        }

        for step in &mut execution.steps {
            insert_pending_approvals(&tx, step)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        info!(
            "Created execution {} of plan {plan_id} with {} steps",
            execution.id,
            execution.steps.len()
        );
        Ok(Some(execution))
    }

    /// Retrieves a fully loaded execution.
    pub fn get_execution(&self, id: u64) -> Result<Option<Execution>> {
        load_execution(&self.connection, id)
    }

    /// Lists executions matching the filter, newest first.
    pub fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>> {
        let mut query = String::from("SELECT id FROM executions");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(plan_id) = filter.plan_id {
            conditions.push("plan_id = ?");
            params_vec.push(Box::new(plan_id as i64));
        }

        if let Some(ref name) = filter.name_contains {
            conditions.push("name LIKE ? ESCAPE '\\'");
            params_vec.push(Box::new(format!("%{}%", escape_like(name))));
        }

        if let Some(ref after) = filter.created_after {
            conditions.push("created_on >= ?");
            params_vec.push(Box::new(timestamp_to_sql(after)));
        }

        if let Some(ref before) = filter.created_before {
            conditions.push("created_on <= ?");
            params_vec.push(Box::new(timestamp_to_sql(before)));
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY created_on DESC, id DESC");

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
        if filter.limit.is_some() || filter.offset.is_some() {
            query.push_str(" LIMIT ? OFFSET ?");
            params_vec.push(Box::new(filter.limit.map_or(-1, i64::from)));
            params_vec.push(Box::new(filter.offset.map_or(0, i64::from)));
        }

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let ids = stmt
            .query_map(&params_refs[..], |row| id_column(row, 0))
            .db_context("Failed to query executions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to collect execution results")?;

        let mut executions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(execution) = load_execution(&self.connection, id)? {
                executions.push(execution);
            }
        }
        Ok(executions)
    }

    /// Deletes an execution with its steps, members, approvals and messages.
    ///
    /// Returns whether an execution was deleted.
    pub fn delete_execution(&mut self, id: u64) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_EXECUTION_SQL, params![id as i64])
            .db_context("Failed to delete execution")?;

        if deleted > 0 {
            info!("Deleted execution {id}");
        }
        Ok(deleted > 0)
    }
}

/// Points assigned member copies at their persisted counterparts.
fn bind_members(assigned: &mut [ExecutionMember], pool: &[ExecutionMember]) {
    for member in assigned {
        if let Some(persisted) = pool
            .iter()
            .find(|p| p.name == member.name && p.email_address == member.email_address)
        {
            member.id = persisted.id;
        }
    }
}

/// Loads an execution with members and fully populated steps.
pub(super) fn load_execution(conn: &Connection, id: u64) -> Result<Option<Execution>> {
    let execution = conn
        .query_row(SELECT_EXECUTION_SQL, params![id as i64], |row| {
            Ok(Execution {
                id: id_column(row, 0)?,
                name: row.get(1)?,
                created_on: timestamp_column(row, 2)?,
                plan_id: optional_id_column(row, 3)?,
                members: Vec::new(),
                steps: Vec::new(),
            })
        })
        .optional()
        .db_context("Failed to query execution")?;

    let Some(mut execution) = execution else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare(SELECT_MEMBERS_SQL)
        .db_context("Failed to prepare query")?;
    execution.members = stmt
        .query_map(params![id as i64], |row| {
            Ok(ExecutionMember {
                id: id_column(row, 0)?,
                name: row.get(1)?,
                email_address: row.get(2)?,
            })
        })
        .db_context("Failed to query execution members")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect execution members")?;

    execution.steps = load_steps(conn, id)?;
    Ok(Some(execution))
}
